#![deny(missing_docs)]

//! # Code Model
//!
//! The read-only generation plan: content types with resolved CLR names, base
//! classes, mixin sets and per-property decisions. Computed once per pass by
//! [`CodeModelBuilder`] and consumed by the writer.

pub mod builder;
pub mod strategies;
pub mod value_types;

pub use builder::CodeModelBuilder;
pub use strategies::{
    BaseClassContext, BaseClassResolver, DefaultBaseClassResolver, IncludeAll, PropertyFilter,
};

use crate::schema::{ContentKind, Variations};
use serde::Serialize;

/// What the writer does with a property on a given class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PropertyState {
    /// Emit an accessor.
    Generate,
    /// Excluded by an ignore rule or the property filter.
    Ignored,
    /// User code already implements it.
    Implemented,
}

/// A property type of a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyModel {
    /// Schema alias.
    pub alias: String,
    /// CLR name.
    pub clr_name: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Property editor alias.
    pub editor_alias: String,
    /// Variation flags.
    pub variations: Variations,
    /// Resolved CLR value type.
    pub value_type: String,
    /// Decision on the declaring type.
    pub state: PropertyState,
}

/// A property a class gets from one of the mixin interfaces it introduces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixinPropertyRef {
    /// Index of the mixin content type in [`CodeModel::types`].
    pub mixin: usize,
    /// Index of the property in the mixin's [`ContentTypeModel::properties`].
    pub property: usize,
    /// Decision on the implementing class.
    pub state: PropertyState,
}

/// A content type in the generation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentTypeModel {
    /// Schema id.
    pub id: i64,
    /// Schema alias.
    pub alias: String,
    /// Kind.
    pub kind: ContentKind,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Variation flags.
    pub variations: Variations,
    /// Generated class name.
    pub clr_name: String,
    /// Whether some type composes this one (directly or through a descendant).
    pub is_mixin: bool,
    /// Index of the parent type in [`CodeModel::types`].
    pub parent: Option<usize>,
    /// Indices of directly composed mixins, excluding the parent and ancestors.
    pub mixins: Vec<usize>,
    /// Own properties, in schema order.
    pub properties: Vec<PropertyModel>,
    /// Properties implemented for newly introduced mixin interfaces.
    pub mixin_properties: Vec<MixinPropertyRef>,
    /// Base class to emit, `None` when the user declares one.
    pub base_class: Option<String>,
    /// Base class declared in user code.
    pub user_base_class: Option<String>,
    /// Interfaces to list on the class.
    pub interfaces: Vec<String>,
    /// Interfaces the mixin interface extends (mixins only).
    pub interface_bases: Vec<String>,
    /// Whether the user already declares the content constructor.
    pub omit_constructor: bool,
}

impl ContentTypeModel {
    /// Name of the generated mixin interface.
    pub fn interface_name(&self) -> String {
        format!("I{}", self.clr_name)
    }

    /// Name of the generated extension methods class.
    pub fn extensions_name(&self) -> String {
        format!("{}Extensions", self.clr_name)
    }

    /// Whether this is an element type.
    pub fn is_element(&self) -> bool {
        self.kind == ContentKind::Element
    }
}

/// The generation plan of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeModel {
    /// Namespace of generated models.
    pub namespace: String,
    /// Extra `using` directives, deduplicated and sorted.
    pub using_namespaces: Vec<String>,
    /// Content types in schema order, ignored ones removed.
    pub types: Vec<ContentTypeModel>,
}

impl CodeModel {
    /// Finds a type by alias (case-insensitive).
    pub fn type_by_alias(&self, alias: &str) -> Option<&ContentTypeModel> {
        self.types
            .iter()
            .find(|t| t.alias.eq_ignore_ascii_case(alias))
    }
}
