//! # Compilation
//!
//! Semantic view over all parsed units plus reference assemblies: a symbol
//! table of declared types and C# name lookup rules for resolving base-list
//! and attribute names.

use crate::error::{AppError, AppResult};
use crate::parser::models::{
    CompilationUnit, DeclKind, TypeDecl, TypeName, UsingDirective, UsingKind,
};
use crate::parser::references::{ReferenceAssembly, SymbolKind};
use std::collections::BTreeMap;

/// A resolved type symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Fully qualified name (nested types joined with `.`).
    pub full_name: String,
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Generic arity.
    pub arity: usize,
    /// Assembly name, or `None` for types declared in source.
    pub assembly: Option<String>,
}

/// The lexical position a name is looked up from.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Enclosing namespace.
    pub namespace: &'a str,
    /// Enclosing type names, outermost first, the innermost being the type itself.
    pub types: &'a [String],
    /// `using` directives in effect.
    pub usings: &'a [UsingDirective],
}

impl<'a> Scope<'a> {
    /// Scope of the body of a type declaration.
    pub fn of(decl: &'a TypeDecl, path: &'a [String]) -> Self {
        Self {
            namespace: &decl.namespace,
            types: path,
            usings: &decl.usings,
        }
    }

    /// Scope of file-level declarations such as assembly attributes.
    pub fn file(unit: &'a CompilationUnit) -> Self {
        Self {
            namespace: "",
            types: &[],
            usings: &unit.usings,
        }
    }
}

/// All units and references of one parse.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    units: Vec<CompilationUnit>,
    symbols: BTreeMap<(String, usize), Symbol>,
}

fn decl_symbol_kind(kind: DeclKind) -> SymbolKind {
    match kind {
        DeclKind::Class | DeclKind::Record => SymbolKind::Class,
        DeclKind::Interface => SymbolKind::Interface,
        DeclKind::Struct => SymbolKind::Struct,
        DeclKind::Enum => SymbolKind::Enum,
        DeclKind::Delegate => SymbolKind::Delegate,
    }
}

impl Compilation {
    /// Builds the symbol table.
    ///
    /// Two non-partial declarations of the same type in source are a
    /// compilation error, as are declarations clashing on `partial`-ness.
    pub fn new(units: Vec<CompilationUnit>, references: &[ReferenceAssembly]) -> AppResult<Self> {
        let mut symbols: BTreeMap<(String, usize), Symbol> = BTreeMap::new();

        for asm in references {
            for ty in &asm.types {
                symbols.insert(
                    (ty.full_name(), ty.arity),
                    Symbol {
                        full_name: ty.full_name(),
                        kind: ty.kind,
                        arity: ty.arity,
                        assembly: Some(asm.name.clone()),
                    },
                );
            }
        }

        let mut declared: BTreeMap<(String, usize), (&TypeDecl, &str)> = BTreeMap::new();
        for unit in &units {
            for decl in &unit.types {
                let key = (decl.full_name(), decl.arity);
                if let Some((previous, _)) = declared.get(&key) {
                    if !(previous.is_partial() && decl.is_partial()) {
                        let ns = if decl.namespace.is_empty() {
                            "<global namespace>"
                        } else {
                            decl.namespace.as_str()
                        };
                        return Err(AppError::compilation(
                            &unit.file,
                            decl.line,
                            format!("CS0101: The namespace '{}' already contains a definition for '{}'", ns, decl.name),
                        ));
                    }
                    continue;
                }
                declared.insert(key.clone(), (decl, &unit.file));
                symbols.insert(
                    key,
                    Symbol {
                        full_name: decl.full_name(),
                        kind: decl_symbol_kind(decl.kind),
                        arity: decl.arity,
                        assembly: None,
                    },
                );
            }
        }

        Ok(Self { units, symbols })
    }

    /// Parsed units in input order.
    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    /// Looks up a symbol by fully qualified name.
    pub fn symbol(&self, full_name: &str, arity: usize) -> Option<&Symbol> {
        self.symbols.get(&(full_name.to_string(), arity))
    }

    /// Resolves a type name as written at `scope`.
    ///
    /// Lookup order: nested and containing types, enclosing namespaces from the
    /// innermost outwards, using aliases, then using namespaces.
    pub fn resolve(&self, name: &TypeName, scope: &Scope<'_>) -> Option<&Symbol> {
        if name.path.is_empty() {
            return None;
        }
        let written = name.path.join(".");

        if name.global {
            return self.symbol(&written, name.arity);
        }

        // Nested types of the scope type and of its containing types
        for depth in (1..=scope.types.len()).rev() {
            let mut parts = Vec::new();
            if !scope.namespace.is_empty() {
                parts.push(scope.namespace.to_string());
            }
            parts.extend(scope.types[..depth].iter().cloned());
            parts.push(written.clone());
            if let Some(s) = self.symbol(&parts.join("."), name.arity) {
                return Some(s);
            }
        }

        // Enclosing namespaces, innermost first, then the global namespace
        let mut ns: Vec<&str> = scope.namespace.split('.').filter(|p| !p.is_empty()).collect();
        loop {
            let candidate = if ns.is_empty() {
                written.clone()
            } else {
                format!("{}.{}", ns.join("."), written)
            };
            if let Some(s) = self.symbol(&candidate, name.arity) {
                return Some(s);
            }
            if ns.pop().is_none() {
                break;
            }
        }

        // Using aliases apply to the first segment
        let first = &name.path[0];
        for using in scope.usings.iter().rev() {
            if let UsingKind::Alias(alias) = &using.kind {
                if alias == first {
                    let mut path = using.target.path.clone();
                    path.extend(name.path[1..].iter().cloned());
                    let arity = if name.path.len() == 1 {
                        using.target.arity
                    } else {
                        name.arity
                    };
                    return self.symbol(&path.join("."), arity);
                }
            }
        }

        // Using namespaces import types, not nested namespaces
        if name.path.len() == 1 {
            for using in scope.usings {
                if using.kind == UsingKind::Namespace {
                    let candidate = format!("{}.{}", using.target.path.join("."), written);
                    if let Some(s) = self.symbol(&candidate, name.arity) {
                        return Some(s);
                    }
                }
            }
        }

        None
    }

    /// Resolves an attribute name, trying the `Attribute` suffix first.
    pub fn resolve_attribute(&self, name: &TypeName, scope: &Scope<'_>) -> Option<&Symbol> {
        let mut suffixed = name.clone();
        if let Some(last) = suffixed.path.last_mut() {
            if !last.ends_with("Attribute") {
                last.push_str("Attribute");
                return self
                    .resolve(&suffixed, scope)
                    .or_else(|| self.resolve(name, scope));
            }
        }
        self.resolve(name, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::language::LanguageVersion;
    use crate::parser::syntax::parse_unit;

    fn compile(sources: &[(&str, &str)], refs: &[ReferenceAssembly]) -> AppResult<Compilation> {
        let units = sources
            .iter()
            .map(|(f, s)| parse_unit(f, s, LanguageVersion::LATEST))
            .collect::<AppResult<Vec<_>>>()?;
        Compilation::new(units, refs)
    }

    fn base_kind(c: &Compilation, type_name: &str, index: usize) -> Option<SymbolKind> {
        let decl = c
            .units()
            .iter()
            .flat_map(|u| &u.types)
            .find(|t| t.name == type_name)
            .unwrap();
        let path = decl.path();
        c.resolve(&decl.base_list[index], &Scope::of(decl, &path)).map(|s| s.kind)
    }

    #[test]
    fn test_resolves_through_using_and_namespace_chain() {
        let c = compile(
            &[
                ("A.cs", "using System.Xml;\nnamespace My.Models { public partial class Type1 : IHasXmlNode { } }"),
                ("B.cs", "namespace My { public interface IShared { } }\nnamespace My.Models.Deep { class X : IShared { } }"),
            ],
            &[ReferenceAssembly::system_xml()],
        )
        .unwrap();
        assert_eq!(base_kind(&c, "Type1", 0), Some(SymbolKind::Interface));
        assert_eq!(base_kind(&c, "X", 0), Some(SymbolKind::Interface));
    }

    #[test]
    fn test_unresolved_without_reference() {
        let c = compile(&[("A.cs", "class Type1 : IHasXmlNode { }")], &ReferenceAssembly::defaults()).unwrap();
        assert_eq!(base_kind(&c, "Type1", 0), None);
    }

    #[test]
    fn test_alias_global_and_nested() {
        let c = compile(
            &[(
                "A.cs",
                r#"
                using Node = System.Xml.IHasXmlNode;
                namespace N
                {
                    class Outer
                    {
                        interface IInner { }
                        class Impl : IInner { }
                    }
                    class ViaAlias : Node { }
                    class ViaGlobal : global::System.Xml.XmlNode { }
                }
                "#,
            )],
            &[ReferenceAssembly::system_xml()],
        )
        .unwrap();
        assert_eq!(base_kind(&c, "Impl", 0), Some(SymbolKind::Interface));
        assert_eq!(base_kind(&c, "ViaAlias", 0), Some(SymbolKind::Interface));
        assert_eq!(base_kind(&c, "ViaGlobal", 0), Some(SymbolKind::Class));
    }

    #[test]
    fn test_duplicate_non_partial_types() {
        let err = compile(
            &[("A.cs", "namespace N { class Page { } }"), ("B.cs", "namespace N {\nclass Page { } }")],
            &[],
        )
        .unwrap_err();
        match err {
            AppError::Compilation { file, line, message } => {
                assert_eq!(file, "B.cs");
                assert_eq!(line, 2);
                assert!(message.starts_with("CS0101"));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(compile(
            &[("A.cs", "partial class Page { }"), ("B.cs", "partial class Page { }")],
            &[]
        )
        .is_ok());
    }

    #[test]
    fn test_attribute_suffix_resolution() {
        let c = compile(
            &[("A.cs", "using Umbraco.ModelsBuilder;\n[ImplementContentType(\"x\")] class C { }")],
            &ReferenceAssembly::defaults(),
        )
        .unwrap();
        let decl = &c.units()[0].types[0];
        let path = decl.path();
        let sym = c.resolve_attribute(&decl.attributes[0].name, &Scope::of(decl, &path)).unwrap();
        assert_eq!(sym.full_name, "Umbraco.ModelsBuilder.ImplementContentTypeAttribute");
        assert_eq!(sym.assembly.as_deref(), Some("Umbraco.ModelsBuilder"));
    }
}
