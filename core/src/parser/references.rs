//! # Reference Assemblies
//!
//! Metadata descriptions of the binary assemblies user code compiles against.
//! Only what symbol resolution needs is kept: namespace, name, arity and kind
//! of every exported type.
//!
//! The built-in set resolves the marker attributes, the published-content base
//! types and the common framework types. Hosts can add more from JSON
//! descriptors (see [`ReferenceAssembly::from_json`]).

use crate::error::AppResult;
use serde::{Deserialize, Serialize};

/// Kind of a resolved type symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Reference type.
    Class,
    /// Interface.
    Interface,
    /// Value type.
    Struct,
    /// Enumeration.
    Enum,
    /// Delegate type.
    Delegate,
}

/// One exported type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceType {
    /// Containing namespace.
    pub namespace: String,
    /// Simple name without generic arguments.
    pub name: String,
    /// Number of generic parameters.
    #[serde(default)]
    pub arity: usize,
    /// Symbol kind.
    pub kind: SymbolKind,
}

impl ReferenceType {
    fn new(namespace: &str, name: &str, arity: usize, kind: SymbolKind) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            arity,
            kind,
        }
    }

    /// `Namespace.Name`.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// A referenced assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceAssembly {
    /// Assembly name.
    pub name: String,
    /// Exported types.
    pub types: Vec<ReferenceType>,
}

use SymbolKind::{Class, Delegate, Enum, Interface, Struct};

impl ReferenceAssembly {
    /// Loads a descriptor from JSON.
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn build(name: &str, types: &[(&str, &str, usize, SymbolKind)]) -> Self {
        Self {
            name: name.to_string(),
            types: types
                .iter()
                .map(|(ns, n, arity, kind)| ReferenceType::new(ns, n, *arity, *kind))
                .collect(),
        }
    }

    /// Core framework types.
    pub fn mscorlib() -> Self {
        Self::build(
            "mscorlib",
            &[
                ("System", "Object", 0, Class),
                ("System", "String", 0, Class),
                ("System", "Attribute", 0, Class),
                ("System", "Exception", 0, Class),
                ("System", "Type", 0, Class),
                ("System", "Uri", 0, Class),
                ("System", "Int32", 0, Struct),
                ("System", "Int64", 0, Struct),
                ("System", "Decimal", 0, Struct),
                ("System", "Double", 0, Struct),
                ("System", "Boolean", 0, Struct),
                ("System", "DateTime", 0, Struct),
                ("System", "Guid", 0, Struct),
                ("System", "Nullable", 1, Struct),
                ("System", "IDisposable", 0, Interface),
                ("System", "ICloneable", 0, Interface),
                ("System", "IComparable", 0, Interface),
                ("System", "IComparable", 1, Interface),
                ("System", "IEquatable", 1, Interface),
                ("System", "IFormattable", 0, Interface),
                ("System", "Action", 0, Delegate),
                ("System", "Action", 1, Delegate),
                ("System", "Func", 1, Delegate),
                ("System", "Func", 2, Delegate),
                ("System", "StringComparison", 0, Enum),
                ("System.Collections", "IEnumerable", 0, Interface),
                ("System.Collections.Generic", "IEnumerable", 1, Interface),
                ("System.Collections.Generic", "ICollection", 1, Interface),
                ("System.Collections.Generic", "IList", 1, Interface),
                ("System.Collections.Generic", "IReadOnlyList", 1, Interface),
                ("System.Collections.Generic", "IDictionary", 2, Interface),
                ("System.Collections.Generic", "List", 1, Class),
                ("System.Collections.Generic", "Dictionary", 2, Class),
                ("System.ComponentModel", "INotifyPropertyChanged", 0, Interface),
                ("System.Linq.Expressions", "Expression", 1, Class),
            ],
        )
    }

    /// `System.Web` types used by rendered models.
    pub fn system_web() -> Self {
        Self::build(
            "System.Web",
            &[
                ("System.Web", "IHtmlString", 0, Interface),
                ("System.Web", "HtmlString", 0, Class),
            ],
        )
    }

    /// `System.Xml`. Not part of the default set.
    pub fn system_xml() -> Self {
        Self::build(
            "System.Xml",
            &[
                ("System.Xml", "IHasXmlNode", 0, Interface),
                ("System.Xml", "IXmlLineInfo", 0, Interface),
                ("System.Xml", "XmlNode", 0, Class),
                ("System.Xml", "XmlDocument", 0, Class),
                ("System.Xml.XPath", "IXPathNavigable", 0, Interface),
            ],
        )
    }

    /// Published-content abstractions of the CMS.
    pub fn cms_core() -> Self {
        const NS: &str = "Umbraco.Core.Models.PublishedContent";
        Self::build(
            "Umbraco.Core",
            &[
                (NS, "IPublishedElement", 0, Interface),
                (NS, "IPublishedContent", 0, Interface),
                (NS, "IPublishedContentType", 0, Interface),
                (NS, "IPublishedPropertyType", 0, Interface),
                (NS, "IPublishedProperty", 0, Interface),
                (NS, "PublishedElementModel", 0, Class),
                (NS, "PublishedContentModel", 0, Class),
                (NS, "PublishedElementWrapped", 0, Class),
                (NS, "PublishedContentWrapped", 0, Class),
                (NS, "PublishedModelAttribute", 0, Class),
                (NS, "PublishedItemType", 0, Enum),
                ("Umbraco.Core.Models", "IMember", 0, Interface),
                ("Umbraco.Core.Models", "IContent", 0, Interface),
                ("Umbraco.Web", "PublishedModelUtility", 0, Class),
                ("Umbraco.Web", "PublishedElementExtensions", 0, Class),
                ("Umbraco.Web", "PublishedContentExtensions", 0, Class),
            ],
        )
    }

    /// Marker attributes understood by the code parser.
    pub fn models_builder() -> Self {
        const NS: &str = "Umbraco.ModelsBuilder";
        Self::build(
            "Umbraco.ModelsBuilder",
            &[
                (NS, "ImplementPropertyTypeAttribute", 0, Class),
                (NS, "IgnorePropertyTypeAttribute", 0, Class),
                (NS, "RenamePropertyTypeAttribute", 0, Class),
                (NS, "IgnoreContentTypeAttribute", 0, Class),
                (NS, "RenameContentTypeAttribute", 0, Class),
                (NS, "ImplementContentTypeAttribute", 0, Class),
                (NS, "ModelsNamespaceAttribute", 0, Class),
                (NS, "ModelsUsingAttribute", 0, Class),
                (NS, "ModelsBaseClassAttribute", 0, Class),
            ],
        )
    }

    /// The standard reference set used when none is supplied.
    pub fn defaults() -> Vec<ReferenceAssembly> {
        vec![
            Self::mscorlib(),
            Self::system_web(),
            Self::cms_core(),
            Self::models_builder(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_do_not_include_xml() {
        let defaults = ReferenceAssembly::defaults();
        assert!(defaults.iter().all(|a| a.name != "System.Xml"));
        assert!(defaults
            .iter()
            .flat_map(|a| &a.types)
            .any(|t| t.full_name() == "Umbraco.Core.Models.PublishedContent.IPublishedContent"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "name": "My.Lib",
            "types": [
                { "namespace": "My.Lib", "name": "IThing", "kind": "Interface" },
                { "namespace": "My.Lib", "name": "Box", "arity": 1, "kind": "Class" }
            ]
        }"#;
        let asm = ReferenceAssembly::from_json(json).unwrap();
        assert_eq!(asm.types.len(), 2);
        assert_eq!(asm.types[0].arity, 0);
        assert_eq!(asm.types[1].kind, SymbolKind::Class);
    }
}
