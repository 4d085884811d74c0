#![deny(missing_docs)]

//! # Schema
//!
//! Raw content type descriptions supplied by the CMS, and the checks applied
//! when they are ingested.
//!
//! Field names follow the CMS wire format (`PascalCase`).

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Kind of content a type describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// Document.
    #[default]
    Content,
    /// Media item.
    Media,
    /// Member.
    Member,
    /// Element (nested content block, no URL).
    Element,
}

impl ContentKind {
    /// Name of the matching `PublishedItemType` member.
    pub fn item_type(&self) -> &'static str {
        match self {
            ContentKind::Content => "Content",
            ContentKind::Media => "Media",
            ContentKind::Member => "Member",
            ContentKind::Element => "Element",
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.item_type())
    }
}

/// Culture and segment variation flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variations {
    /// Invariant.
    #[default]
    Nothing,
    /// Varies by culture.
    Culture,
    /// Varies by segment.
    Segment,
    /// Varies by culture and segment.
    CultureAndSegment,
}

/// A property type of a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyTypeDef {
    /// Alias, unique (case-insensitively) within its content type.
    pub alias: String,
    /// Alias of the property editor.
    #[serde(default)]
    pub editor_alias: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Variation flags.
    #[serde(default)]
    pub variations: Variations,
    /// CLR value type, possibly containing `{model:alias}` placeholders.
    #[serde(default)]
    pub value_type: Option<String>,
}

/// A content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentTypeDef {
    /// Identifier.
    pub id: i64,
    /// Alias, unique (case-insensitively) across all kinds.
    pub alias: String,
    /// Parent content type id; absent, zero or negative means no parent.
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// Kind.
    #[serde(default)]
    pub kind: ContentKind,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Variation flags.
    #[serde(default)]
    pub variations: Variations,
    /// Property types in declaration order.
    #[serde(default)]
    pub properties: Vec<PropertyTypeDef>,
    /// Ids of composed content types (may include the parent).
    #[serde(default)]
    pub composition_type_ids: Vec<i64>,
}

impl ContentTypeDef {
    /// The effective parent id.
    pub fn parent(&self) -> Option<i64> {
        self.parent_id.filter(|id| *id > 0)
    }
}

/// Parses a schema from JSON and validates it.
pub fn from_json(text: &str) -> AppResult<Vec<ContentTypeDef>> {
    let types: Vec<ContentTypeDef> = serde_json::from_str(text)?;
    validate(&types)?;
    Ok(types)
}

/// Parses a schema from YAML and validates it.
pub fn from_yaml(text: &str) -> AppResult<Vec<ContentTypeDef>> {
    let types: Vec<ContentTypeDef> = serde_yaml::from_str(text)?;
    validate(&types)?;
    Ok(types)
}

/// Checks id uniqueness, case-insensitive alias uniqueness across kinds and
/// property alias uniqueness within each type.
pub fn validate(types: &[ContentTypeDef]) -> AppResult<()> {
    let mut ids: BTreeMap<i64, &str> = BTreeMap::new();
    let mut aliases: BTreeMap<String, &ContentTypeDef> = BTreeMap::new();

    for ct in types {
        if ct.alias.trim().is_empty() {
            return Err(AppError::Configuration(format!(
                "Content type with id {} has an empty alias",
                ct.id
            )));
        }
        if let Some(other) = ids.insert(ct.id, &ct.alias) {
            return Err(AppError::Configuration(format!(
                "Duplicate content type id {} ('{}' and '{}')",
                ct.id, other, ct.alias
            )));
        }
        if let Some(other) = aliases.insert(ct.alias.to_lowercase(), ct) {
            return Err(AppError::Configuration(format!(
                "Duplicate content type alias '{}': {} type '{}' and {} type '{}'",
                ct.alias, other.kind, other.alias, ct.kind, ct.alias
            )));
        }

        let mut props: BTreeMap<String, &str> = BTreeMap::new();
        for p in &ct.properties {
            if let Some(other) = props.insert(p.alias.to_lowercase(), &p.alias) {
                return Err(AppError::Configuration(format!(
                    "Duplicate property alias '{}' on content type '{}' (conflicts with '{}')",
                    p.alias, ct.alias, other
                )));
            }
        }
    }
    Ok(())
}
