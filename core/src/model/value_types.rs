//! # Value Types
//!
//! Resolution of the CLR value type of a property. Schemas may refer to other
//! generated models through a `{model:alias}` placeholder, which can only be
//! resolved once every content type has its CLR name.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Value type used when the schema declares none.
pub const FALLBACK_VALUE_TYPE: &str = "object";

fn placeholder_re() -> &'static Regex {
    static MODEL_RE: OnceLock<Regex> = OnceLock::new();
    MODEL_RE.get_or_init(|| Regex::new(r"\{model:([^}]+)\}").expect("Invalid regex"))
}

/// Replaces every `{model:alias}` in `value_type`.
///
/// `clr_names` maps lowercased aliases of generated types to their CLR names.
/// A placeholder naming a type that is not generated becomes `fallback`
/// (the published content or element interface).
pub fn resolve_value_type(
    value_type: Option<&str>,
    clr_names: &BTreeMap<String, String>,
    fallback: &str,
) -> String {
    let value_type = match value_type.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return FALLBACK_VALUE_TYPE.to_string(),
    };

    placeholder_re()
        .replace_all(value_type, |caps: &Captures<'_>| {
            let alias = caps[1].trim().to_lowercase();
            clr_names
                .get(&alias)
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> BTreeMap<String, String> {
        BTreeMap::from([("newsitem".to_string(), "NewsItem".to_string())])
    }

    #[test]
    fn test_missing_value_type_is_object() {
        assert_eq!(resolve_value_type(None, &names(), "IPublishedContent"), "object");
        assert_eq!(resolve_value_type(Some("  "), &names(), "IPublishedContent"), "object");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            resolve_value_type(
                Some("IEnumerable<{model:newsItem}>"),
                &names(),
                "IPublishedContent"
            ),
            "IEnumerable<NewsItem>"
        );
        assert_eq!(
            resolve_value_type(Some("{model:gone}"), &names(), "IPublishedElement"),
            "IPublishedElement"
        );
        assert_eq!(resolve_value_type(Some("string"), &names(), "x"), "string");
    }
}
