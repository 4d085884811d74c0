#![deny(missing_docs)]

//! # Code Options
//!
//! Customizations applied on top of the schema: ignored and renamed content
//! types and properties, user-declared base classes, interfaces and
//! constructors. Collected from several [`OptionsSource`]s into a
//! [`CodeOptionsBuilder`], then frozen into [`CodeOptions`].

pub mod builder;
pub mod content_types;
pub mod identity;
pub mod sources;

pub use builder::CodeOptionsBuilder;
pub use content_types::{matches_pattern, ContentTypeOptions, ContentTypesCodeOptions};
pub use identity::ContentTypeIdentity;
pub use sources::OptionsSource;

use serde::Serialize;

/// Frozen options for one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeOptions {
    /// Namespace override for generated models.
    pub models_namespace: Option<String>,
    /// Extra namespaces for generated `using` directives.
    pub using_namespaces: Vec<String>,
    /// Base class override for non-element models.
    pub models_base_class: Option<String>,
    /// Per content type customizations.
    pub content_types: ContentTypesCodeOptions,
}
