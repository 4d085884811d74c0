//! # Content Type Options
//!
//! Per content type customizations collected from every options source.
//!
//! Entries live in two key spaces (see [`ContentTypeIdentity`]). Until
//! [`ContentTypesCodeOptions::map_content_type_aliases_to_clr_names`] runs only
//! alias-keyed property queries are valid; afterwards only name-keyed ones are.
//! Crossing key spaces is reported as [`AppError::InvalidState`].

use crate::error::{AppError, AppResult};
use crate::options::identity::ContentTypeIdentity;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Options attached to one content type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentTypeOptions {
    /// Lowercased property alias patterns to ignore (`foo`, `fo*`).
    pub ignored_properties: BTreeSet<String>,
    /// Property CLR name overrides, keyed by lowercased property alias.
    pub property_clr_names: BTreeMap<String, String>,
    /// Lowercased property aliases already implemented by user code.
    pub implemented_properties: BTreeSet<String>,
}

impl ContentTypeOptions {
    fn merge_from(&mut self, other: ContentTypeOptions) {
        self.ignored_properties.extend(other.ignored_properties);
        self.implemented_properties.extend(other.implemented_properties);
        for (alias, name) in other.property_clr_names {
            self.property_clr_names.entry(alias).or_insert(name);
        }
    }

    fn is_ignored(&self, property_alias: &str) -> bool {
        self.ignored_properties
            .iter()
            .any(|p| matches_pattern(p, property_alias))
    }
}

/// Content type customizations in both key spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentTypesCodeOptions {
    ignored_content_types: BTreeSet<String>,
    content_type_clr_names: BTreeMap<String, String>,
    by_alias: BTreeMap<String, ContentTypeOptions>,
    by_name: BTreeMap<String, ContentTypeOptions>,
    base_classes: BTreeMap<String, String>,
    interfaces: BTreeMap<String, Vec<String>>,
    constructors: BTreeSet<String>,
    mapped: bool,
}

/// Case-insensitive match with an optional trailing `*` wildcard.
/// `pattern` must already be lowercased.
pub fn matches_pattern(pattern: &str, value: &str) -> bool {
    let value = value.to_lowercase();
    match pattern.strip_suffix('*') {
        Some(prefix) => value.starts_with(prefix),
        None => value == pattern,
    }
}

impl ContentTypesCodeOptions {
    // --- Declarations (used by the builder) ---

    pub(crate) fn ignore_content_type(&mut self, pattern: &str) {
        self.ignored_content_types.insert(pattern.to_lowercase());
    }

    pub(crate) fn set_content_type_clr_name(&mut self, alias: &str, name: &str) {
        self.content_type_clr_names
            .insert(alias.to_lowercase(), name.to_string());
    }

    fn entry(&mut self, identity: &ContentTypeIdentity) -> &mut ContentTypeOptions {
        let map = match identity {
            ContentTypeIdentity::Alias(_) => &mut self.by_alias,
            ContentTypeIdentity::ClrName(_) => &mut self.by_name,
        };
        map.entry(identity.key()).or_default()
    }

    pub(crate) fn ignore_property_type(&mut self, identity: &ContentTypeIdentity, pattern: &str) {
        self.entry(identity)
            .ignored_properties
            .insert(pattern.to_lowercase());
    }

    pub(crate) fn set_property_type_clr_name(
        &mut self,
        identity: &ContentTypeIdentity,
        property_alias: &str,
        name: &str,
    ) {
        self.entry(identity)
            .property_clr_names
            .insert(property_alias.to_lowercase(), name.to_string());
    }

    pub(crate) fn implement_property_type(
        &mut self,
        identity: &ContentTypeIdentity,
        property_alias: &str,
    ) {
        self.entry(identity)
            .implemented_properties
            .insert(property_alias.to_lowercase());
    }

    pub(crate) fn content_type_model_has_base_class(&mut self, clr_name: &str, base: &str) {
        self.base_classes
            .insert(clr_name.to_lowercase(), base.to_string());
    }

    pub(crate) fn content_type_model_has_interface(&mut self, clr_name: &str, interface: &str) {
        let list = self.interfaces.entry(clr_name.to_lowercase()).or_default();
        if !list.iter().any(|i| i == interface) {
            list.push(interface.to_string());
        }
    }

    pub(crate) fn content_type_model_has_constructor(&mut self, clr_name: &str) {
        self.constructors.insert(clr_name.to_lowercase());
    }

    // --- Key space reconciliation ---

    /// Re-indexes alias-keyed entries under the CLR names given by `map`
    /// (alias -> CLR name, matched case-insensitively) and merges them into the
    /// name-keyed entries. Name-keyed overrides win; sets are unioned.
    ///
    /// Aliases absent from the map (ignored or unknown content types) are dropped.
    pub fn map_content_type_aliases_to_clr_names(
        &mut self,
        map: &BTreeMap<String, String>,
    ) -> AppResult<()> {
        if self.mapped {
            return Err(AppError::InvalidState(
                "Content type aliases have already been mapped to CLR names".into(),
            ));
        }

        let lowered: BTreeMap<String, &String> =
            map.iter().map(|(a, n)| (a.to_lowercase(), n)).collect();

        for (alias, options) in std::mem::take(&mut self.by_alias) {
            match lowered.get(&alias) {
                Some(name) => self
                    .by_name
                    .entry(name.to_lowercase())
                    .or_default()
                    .merge_from(options),
                None => debug!(alias = %alias, "Dropping options for unmapped content type alias"),
            }
        }
        self.mapped = true;
        Ok(())
    }

    fn check_key_space(&self, identity: &ContentTypeIdentity) -> AppResult<()> {
        match (identity, self.mapped) {
            (ContentTypeIdentity::ClrName(_), false) => Err(AppError::InvalidState(format!(
                "Cannot query property options by {} before aliases are mapped to CLR names",
                identity
            ))),
            (ContentTypeIdentity::Alias(_), true) => Err(AppError::InvalidState(format!(
                "Cannot query property options by {} after aliases are mapped to CLR names",
                identity
            ))),
            _ => Ok(()),
        }
    }

    /// Walks `identity`, then its declared base class and interfaces
    /// (by CLR name, recursively) and returns the first hit of `f`.
    fn walk<T>(
        &self,
        identity: &ContentTypeIdentity,
        f: &dyn Fn(&ContentTypeOptions) -> Option<T>,
    ) -> AppResult<Option<T>> {
        self.check_key_space(identity)?;

        let map = if self.mapped { &self.by_name } else { &self.by_alias };
        if !self.mapped {
            return Ok(map.get(&identity.key()).and_then(f));
        }

        let mut visited = BTreeSet::new();
        let mut pending = vec![identity.key()];
        while let Some(key) = pending.pop() {
            if !visited.insert(key.clone()) {
                continue;
            }
            if let Some(found) = map.get(&key).and_then(f) {
                return Ok(Some(found));
            }
            // Push in reverse so the base class is visited before interfaces.
            if let Some(ifaces) = self.interfaces.get(&key) {
                pending.extend(ifaces.iter().rev().map(|i| i.to_lowercase()));
            }
            if let Some(base) = self.base_classes.get(&key) {
                pending.push(base.to_lowercase());
            }
        }
        Ok(None)
    }

    // --- Queries ---

    /// Whether the content type alias matches an ignore pattern.
    pub fn is_content_type_ignored(&self, alias: &str) -> bool {
        self.ignored_content_types
            .iter()
            .any(|p| matches_pattern(p, alias))
    }

    /// CLR name override for a content type alias.
    pub fn content_type_clr_name(&self, alias: &str) -> Option<&str> {
        self.content_type_clr_names
            .get(&alias.to_lowercase())
            .map(String::as_str)
    }

    /// Whether the property is ignored on the content type or, once mapped,
    /// on its declared base class or interfaces.
    pub fn is_property_ignored(
        &self,
        identity: &ContentTypeIdentity,
        property_alias: &str,
    ) -> AppResult<bool> {
        let hit = self.walk(identity, &|o: &ContentTypeOptions| {
            o.is_ignored(property_alias).then_some(())
        })?;
        Ok(hit.is_some())
    }

    /// CLR name override for a property.
    pub fn property_type_clr_name(
        &self,
        identity: &ContentTypeIdentity,
        property_alias: &str,
    ) -> AppResult<Option<String>> {
        let key = property_alias.to_lowercase();
        self.walk(identity, &|o: &ContentTypeOptions| o.property_clr_names.get(&key).cloned())
    }

    /// Whether user code already implements the property.
    pub fn is_property_implemented(
        &self,
        identity: &ContentTypeIdentity,
        property_alias: &str,
    ) -> AppResult<bool> {
        let key = property_alias.to_lowercase();
        let hit = self.walk(identity, &|o: &ContentTypeOptions| {
            o.implemented_properties.contains(&key).then_some(())
        })?;
        Ok(hit.is_some())
    }

    /// Whether the user declared a base class, so the generated one is omitted.
    pub fn omit_content_type_base_class(&self, clr_name: &str) -> bool {
        self.base_classes.contains_key(&clr_name.to_lowercase())
    }

    /// The user-declared base class name.
    pub fn content_type_base_class(&self, clr_name: &str) -> Option<&str> {
        self.base_classes
            .get(&clr_name.to_lowercase())
            .map(String::as_str)
    }

    /// Interfaces the user declared on the class.
    pub fn content_type_interfaces(&self, clr_name: &str) -> &[String] {
        self.interfaces
            .get(&clr_name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the user declared a content constructor.
    pub fn omit_content_type_constructor(&self, clr_name: &str) -> bool {
        self.constructors.contains(&clr_name.to_lowercase())
    }
}
