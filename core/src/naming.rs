#![deny(missing_docs)]

//! # Naming
//!
//! Derivation and validation of CLR identifiers for content types and properties.

use crate::config::ClrNameSource;
use crate::error::{AppError, AppResult};
use heck::ToPascalCase;
use regex::Regex;
use std::sync::OnceLock;

/// C# reserved keywords, which cannot be used as plain identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Strategy producing CLR names from schema identifiers.
pub trait NamingStrategy {
    /// CLR name of a content type.
    fn content_type_name(&self, alias: &str, name: &str) -> String;

    /// CLR name of a property.
    fn property_name(&self, alias: &str, name: &str) -> String {
        self.content_type_name(alias, name)
    }
}

/// Naming driven by [`ClrNameSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamingStrategy {
    /// What names are derived from.
    pub source: ClrNameSource,
}

impl DefaultNamingStrategy {
    /// Creates a strategy for the given source.
    pub fn new(source: ClrNameSource) -> Self {
        Self { source }
    }
}

impl NamingStrategy for DefaultNamingStrategy {
    fn content_type_name(&self, alias: &str, name: &str) -> String {
        match self.source {
            ClrNameSource::Alias => to_clr_identifier(alias),
            ClrNameSource::RawAlias => sanitize(&upper_first(alias)),
            ClrNameSource::Name if !name.trim().is_empty() => to_clr_identifier(name),
            ClrNameSource::Name => to_clr_identifier(alias),
        }
    }
}

/// Pascal-cases `value` into a valid identifier (`seoComposition` -> `SeoComposition`).
///
/// Leading digits get a `_` prefix.
pub fn to_clr_identifier(value: &str) -> String {
    sanitize(&value.to_pascal_case())
}

fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn sanitize(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    match cleaned.chars().next() {
        None => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", cleaned),
        Some(_) => cleaned,
    }
}

/// Whether `value` is a usable C# identifier.
pub fn is_valid_identifier(value: &str) -> bool {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    let re = IDENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"));
    re.is_match(value) && !KEYWORDS.contains(&value)
}

/// Fails with a configuration error when an override is not a usable identifier.
pub fn validate_identifier(value: &str, what: &str) -> AppResult<()> {
    if is_valid_identifier(value) {
        Ok(())
    } else {
        Err(AppError::Configuration(format!(
            "Invalid CLR name '{}' for {}",
            value, what
        )))
    }
}
