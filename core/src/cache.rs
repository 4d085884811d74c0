#![deny(missing_docs)]

//! # Models Cache
//!
//! Keeps the output of the last generation pass for hosts that regenerate on
//! demand. Entries are keyed by a fingerprint of every pass input and replaced
//! atomically: readers holding an earlier [`Arc`] keep a consistent snapshot.

use crate::error::{AppError, AppResult};
use crate::generator::{GeneratedModels, Generator};
use crate::parser::{CodeParser, SourceFiles};
use crate::schema::ContentTypeDef;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Debug)]
struct Entry {
    fingerprint: u64,
    models: Arc<GeneratedModels>,
}

/// Last generated models with explicit invalidation.
#[derive(Debug, Default)]
pub struct ModelsCache {
    current: RwLock<Option<Entry>>,
}

fn poisoned<T>(_: T) -> AppError {
    AppError::InvalidState("Models cache lock is poisoned".into())
}

impl ModelsCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint of the inputs of a pass: schema, sources, generation
    /// options, the parser configuration and the generator's cache key.
    pub fn fingerprint<P: CodeParser>(
        generator: &Generator<P>,
        types: &[ContentTypeDef],
        sources: &SourceFiles,
    ) -> AppResult<u64> {
        let mut hasher = DefaultHasher::new();
        serde_json::to_string(types)?.hash(&mut hasher);
        serde_json::to_string(generator.options())?.hash(&mut hasher);
        generator.parser().cache_key()?.hash(&mut hasher);
        generator.cache_key().hash(&mut hasher);
        sources.hash(&mut hasher);
        Ok(hasher.finish())
    }

    /// The cached models, if any.
    pub fn current(&self) -> AppResult<Option<Arc<GeneratedModels>>> {
        let guard = self.current.read().map_err(poisoned)?;
        Ok(guard.as_ref().map(|e| Arc::clone(&e.models)))
    }

    /// Returns the cached models when the inputs are unchanged, otherwise runs
    /// a pass and replaces the entry. A failed pass leaves the entry untouched.
    pub fn get_or_generate<P: CodeParser>(
        &self,
        generator: &Generator<P>,
        types: &[ContentTypeDef],
        sources: &SourceFiles,
    ) -> AppResult<Arc<GeneratedModels>> {
        let fingerprint = Self::fingerprint(generator, types, sources)?;
        {
            let guard = self.current.read().map_err(poisoned)?;
            if let Some(entry) = guard.as_ref().filter(|e| e.fingerprint == fingerprint) {
                debug!(fingerprint, "Models cache hit");
                return Ok(Arc::clone(&entry.models));
            }
        }

        debug!(fingerprint, "Models cache miss");
        let models = Arc::new(generator.generate(types, sources)?);
        let mut guard = self.current.write().map_err(poisoned)?;
        *guard = Some(Entry {
            fingerprint,
            models: Arc::clone(&models),
        });
        Ok(models)
    }

    /// Drops the cached entry so the next request regenerates.
    pub fn invalidate(&self) -> AppResult<()> {
        let mut guard = self.current.write().map_err(poisoned)?;
        if guard.take().is_some() {
            debug!("Models cache invalidated");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationOptions;
    use crate::parser::{CSharpCodeParser, ReferenceAssembly};
    use crate::schema::ContentKind;

    fn schema(alias: &str) -> Vec<ContentTypeDef> {
        vec![ContentTypeDef {
            id: 1,
            alias: alias.into(),
            parent_id: None,
            kind: ContentKind::Content,
            name: alias.into(),
            description: None,
            variations: Default::default(),
            properties: vec![],
            composition_type_ids: vec![],
        }]
    }

    #[test]
    fn test_hit_miss_and_invalidate() {
        let generator = Generator::new(GenerationOptions::default()).unwrap();
        let cache = ModelsCache::new();
        let sources = SourceFiles::new();
        assert!(cache.current().unwrap().is_none());

        let first = cache.get_or_generate(&generator, &schema("page"), &sources).unwrap();
        let again = cache.get_or_generate(&generator, &schema("page"), &sources).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let changed = cache.get_or_generate(&generator, &schema("home"), &sources).unwrap();
        assert!(!Arc::ptr_eq(&first, &changed));
        // Earlier readers keep their snapshot.
        assert!(first.get("Page").is_some());
        assert!(changed.get("Home").is_some());

        cache.invalidate().unwrap();
        assert!(cache.current().unwrap().is_none());
        let fresh = cache.get_or_generate(&generator, &schema("home"), &sources).unwrap();
        assert!(!Arc::ptr_eq(&changed, &fresh));
        assert_eq!(*changed, *fresh);
    }

    #[test]
    fn test_failed_pass_keeps_entry() {
        let generator = Generator::new(GenerationOptions::default()).unwrap();
        let cache = ModelsCache::new();
        let good = cache
            .get_or_generate(&generator, &schema("page"), &SourceFiles::new())
            .unwrap();
        let bad = SourceFiles::from([("Bad.cs".to_string(), "class {".to_string())]);
        assert!(cache.get_or_generate(&generator, &schema("page"), &bad).is_err());
        assert!(Arc::ptr_eq(&good, &cache.current().unwrap().unwrap()));
    }

    #[test]
    fn test_parser_and_generator_configuration_are_keyed() {
        let sources = SourceFiles::from([(
            "Type1.cs".to_string(),
            "using System.Xml;\npublic partial class Type1 : IHasXmlNode {}".to_string(),
        )]);
        let cache = ModelsCache::new();

        let plain = Generator::new(GenerationOptions::default()).unwrap();
        let first = cache.get_or_generate(&plain, &schema("type1"), &sources).unwrap();
        assert!(first.get("Type1").unwrap().contains("public partial class Type1\n"));

        let parser = CSharpCodeParser::default().add_reference(ReferenceAssembly::system_xml());
        let with_xml = Generator::new(GenerationOptions::default())
            .unwrap()
            .with_parser(parser);
        let second = cache.get_or_generate(&with_xml, &schema("type1"), &sources).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second
            .get("Type1")
            .unwrap()
            .contains("public partial class Type1 : PublishedContentModel"));

        let tagged = Generator::new(GenerationOptions::default())
            .unwrap()
            .with_cache_key("tagged");
        let third = cache.get_or_generate(&tagged, &schema("type1"), &sources).unwrap();
        assert!(!Arc::ptr_eq(&second, &third));
        assert_eq!(*first, *third);
    }
}
