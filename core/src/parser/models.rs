//! # Syntax Models
//!
//! Intermediate Representation (IR) of parsed C# source: compilation units,
//! type declarations, members and attributes. Only the declaration shape is
//! kept; method bodies and initializers are skipped by the parser.

use serde::Serialize;

/// A syntax diagnostic before it is bound to a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line.
    pub line: usize,
    /// Message, prefixed with its diagnostic code.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic at a line.
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A (possibly qualified, possibly generic) type reference as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeName {
    /// Source text with whitespace removed, e.g. `List<IPublishedContent>`.
    pub text: String,
    /// Qualified path segments without generic arguments, e.g. `["System", "Xml", "IHasXmlNode"]`.
    pub path: Vec<String>,
    /// Generic arity of the last segment.
    pub arity: usize,
    /// Whether the name was written with the `global::` alias.
    pub global: bool,
}

impl TypeName {
    /// Last path segment (the simple name).
    pub fn simple_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Last path segment with its generic arguments, e.g. `IEquatable<Page>`.
    pub fn display_name(&self) -> String {
        let text = self.text.trim_start_matches("global::");
        let generic_start = text.find('<').unwrap_or(text.len());
        match text[..generic_start].rfind(|c: char| c == '.' || c == ':') {
            Some(dot) => text[dot + 1..].to_string(),
            None => text.to_string(),
        }
    }
}

/// Kind of a `using` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UsingKind {
    /// `using Some.Namespace;`
    Namespace,
    /// `using static Some.Type;`
    Static,
    /// `using Alias = Some.Type;`
    Alias(String),
}

/// A `using` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsingDirective {
    /// Directive kind.
    pub kind: UsingKind,
    /// Target namespace or type.
    pub target: TypeName,
}

/// A single attribute argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttributeValue {
    /// A non-interpolated string literal (or `nameof(X)` which folds to `"X"`).
    Str(String),
    /// `typeof(T)`.
    TypeOf(TypeName),
    /// Any other expression, kept as text.
    Expr(String),
}

impl AttributeValue {
    /// Returns the string value if this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// An attribute argument, positional or named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeArg {
    /// `Name = value` / `name: value` argument name.
    pub name: Option<String>,
    /// Value.
    pub value: AttributeValue,
}

/// An attribute application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSyntax {
    /// Attribute type name as written.
    pub name: TypeName,
    /// Arguments in source order.
    pub args: Vec<AttributeArg>,
    /// Line of the attribute name.
    pub line: usize,
}

impl AttributeSyntax {
    /// Matches `Foo`, `FooAttribute`, `Ns.Foo` and `Ns.FooAttribute` against `Foo`.
    pub fn is(&self, short_name: &str) -> bool {
        let simple = self.name.simple_name();
        simple == short_name || simple.strip_suffix("Attribute") == Some(short_name)
    }

    /// Positional (unnamed) arguments.
    pub fn positional(&self) -> Vec<&AttributeValue> {
        self.args
            .iter()
            .filter(|a| a.name.is_none())
            .map(|a| &a.value)
            .collect()
    }
}

/// A method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Parameter type.
    pub ty: TypeName,
    /// Parameter name.
    pub name: String,
    /// Modifiers such as `this`, `ref`, `out`, `params`.
    pub modifiers: Vec<String>,
}

/// The shape of a member declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MemberKind {
    /// Instance or static constructor.
    Constructor {
        /// Parameters.
        parameters: Vec<Parameter>,
    },
    /// Method.
    Method {
        /// Return type.
        ty: TypeName,
        /// Parameters.
        parameters: Vec<Parameter>,
    },
    /// Property.
    Property {
        /// Property type.
        ty: TypeName,
    },
    /// Field (one entry per declarator).
    Field {
        /// Field type.
        ty: TypeName,
    },
    /// Event.
    Event,
    /// Indexer.
    Indexer,
    /// Operator or conversion operator.
    Operator,
    /// Finalizer.
    Destructor,
}

/// A member declaration inside a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberDecl {
    /// Member name (`this` for indexers, `operator` for operators).
    pub name: String,
    /// Member shape.
    pub kind: MemberKind,
    /// Attributes applied to the member.
    pub attributes: Vec<AttributeSyntax>,
    /// Modifiers.
    pub modifiers: Vec<String>,
    /// Line of the member name.
    pub line: usize,
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `struct`
    Struct,
    /// `enum`
    Enum,
    /// `record` / `record class` / `record struct`
    Record,
    /// `delegate`
    Delegate,
}

/// A type declaration. Nested types are flattened into the unit with their
/// containing type names recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    /// Declaration kind.
    pub kind: DeclKind,
    /// Simple name.
    pub name: String,
    /// Number of generic type parameters.
    pub arity: usize,
    /// Enclosing namespace (dotted, empty for the global namespace).
    pub namespace: String,
    /// Enclosing type names, outermost first.
    pub containing: Vec<String>,
    /// Modifiers (`public`, `partial`, ...).
    pub modifiers: Vec<String>,
    /// Attributes applied to the type.
    pub attributes: Vec<AttributeSyntax>,
    /// Base list entries in order.
    pub base_list: Vec<TypeName>,
    /// Declared members.
    pub members: Vec<MemberDecl>,
    /// `using` directives in scope (file level first, then enclosing namespaces).
    pub usings: Vec<UsingDirective>,
    /// Line of the type name.
    pub line: usize,
}

impl TypeDecl {
    /// Fully qualified metadata-like name (`Ns.Outer.Inner`).
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.namespace.is_empty() {
            parts.push(&self.namespace);
        }
        parts.extend(self.containing.iter().map(String::as_str));
        parts.push(&self.name);
        parts.join(".")
    }

    /// Containing type names followed by this type's name.
    pub fn path(&self) -> Vec<String> {
        let mut path = self.containing.clone();
        path.push(self.name.clone());
        path
    }

    /// Whether the declaration carries the `partial` modifier.
    pub fn is_partial(&self) -> bool {
        self.modifiers.iter().any(|m| m == "partial")
    }
}

/// One parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationUnit {
    /// Logical file name.
    pub file: String,
    /// True when the file carries an `<auto-generated>` header.
    pub is_generated: bool,
    /// File-level `using` directives.
    pub usings: Vec<UsingDirective>,
    /// `[assembly: ...]` attributes.
    pub assembly_attributes: Vec<AttributeSyntax>,
    /// All type declarations, nested ones included.
    pub types: Vec<TypeDecl>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str, path: &[&str]) -> TypeName {
        TypeName {
            text: text.to_string(),
            path: path.iter().map(|s| s.to_string()).collect(),
            arity: 0,
            global: false,
        }
    }

    #[test]
    fn test_display_name_strips_qualifier() {
        let n = name("System.Xml.IHasXmlNode", &["System", "Xml", "IHasXmlNode"]);
        assert_eq!(n.display_name(), "IHasXmlNode");
        assert_eq!(n.simple_name(), "IHasXmlNode");

        let g = name("System.IEquatable<Ns.Page>", &["System", "IEquatable"]);
        assert_eq!(g.display_name(), "IEquatable<Ns.Page>");
    }

    #[test]
    fn test_attribute_suffix_matching() {
        let attr = AttributeSyntax {
            name: name("ImplementPropertyTypeAttribute", &["ImplementPropertyTypeAttribute"]),
            args: vec![],
            line: 1,
        };
        assert!(attr.is("ImplementPropertyType"));
        assert!(!attr.is("IgnorePropertyType"));
    }
}
