//! # Content Type Identity
//!
//! The two key spaces content-type options can be declared in.

use serde::Serialize;
use std::fmt::Display;

/// Identifies a content type either by its schema alias or by its CLR name.
///
/// Options collected before CLR names are known (static configuration,
/// two-argument markers) are keyed by alias; options discovered on user classes
/// are keyed by CLR name. The two spaces are reconciled once by
/// [`crate::options::ContentTypesCodeOptions::map_content_type_aliases_to_clr_names`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ContentTypeIdentity {
    /// Schema alias, e.g. `seoComposition`.
    Alias(String),
    /// Generated or user CLR name, e.g. `SeoComposition`.
    ClrName(String),
}

impl ContentTypeIdentity {
    /// Alias identity.
    pub fn alias(alias: impl Into<String>) -> Self {
        ContentTypeIdentity::Alias(alias.into())
    }

    /// CLR name identity.
    pub fn clr_name(name: impl Into<String>) -> Self {
        ContentTypeIdentity::ClrName(name.into())
    }

    /// The raw value regardless of key space.
    pub fn value(&self) -> &str {
        match self {
            ContentTypeIdentity::Alias(v) | ContentTypeIdentity::ClrName(v) => v,
        }
    }

    /// Case-insensitive lookup key.
    pub(crate) fn key(&self) -> String {
        self.value().to_lowercase()
    }

    /// Whether this is an alias identity.
    pub fn is_alias(&self) -> bool {
        matches!(self, ContentTypeIdentity::Alias(_))
    }
}

impl Display for ContentTypeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentTypeIdentity::Alias(a) => write!(f, "alias '{}'", a),
            ContentTypeIdentity::ClrName(n) => write!(f, "CLR name '{}'", n),
        }
    }
}
