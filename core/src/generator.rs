#![deny(missing_docs)]

//! # Generator
//!
//! Sequences one generation pass in memory: collect code options (static
//! configuration, existing user code, extra sources), build the code model,
//! write the source text and compile it together with the user code. Any
//! failure aborts the pass before output is returned.

use crate::config::GenerationOptions;
use crate::error::AppResult;
use crate::model::{CodeModel, CodeModelBuilder};
use crate::options::{sources::apply_all, CodeOptions, CodeOptionsBuilder, OptionsSource};
use crate::parser::{CSharpCodeParser, CodeParser, CodeSource, SourceFiles};
use crate::schema::ContentTypeDef;
use crate::writer::{generated_file_name, CodeWriter};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

/// Logical file name of the combined output.
pub const SINGLE_FILE_NAME: &str = "models.generated.cs";

/// Output of a generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedModels {
    /// Namespace of the generated models.
    pub namespace: String,
    /// Source text keyed by model CLR name, in schema order.
    pub files: IndexMap<String, String>,
}

impl GeneratedModels {
    /// Source text of one model.
    pub fn get(&self, clr_name: &str) -> Option<&str> {
        self.files.get(clr_name).map(String::as_str)
    }

    /// Pairs of `{ClrName}.generated.cs` and source text.
    pub fn by_file_name(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.files
            .iter()
            .map(|(name, text)| (generated_file_name(name), text.as_str()))
    }

    /// Number of generated models.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was generated.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Runs generation passes.
pub struct Generator<P: CodeParser = CSharpCodeParser> {
    options: GenerationOptions,
    parser: P,
    model_builder: CodeModelBuilder,
    cache_key: Option<String>,
}

impl Generator<CSharpCodeParser> {
    /// Generator with the stock C# parser for `options`.
    pub fn new(options: GenerationOptions) -> AppResult<Self> {
        options.validate()?;
        Ok(Self {
            parser: CSharpCodeParser::from_options(&options)?,
            model_builder: CodeModelBuilder::new(options.clone()),
            options,
            cache_key: None,
        })
    }
}

impl<P: CodeParser> Generator<P> {
    /// Replaces the code parser.
    pub fn with_parser<Q: CodeParser>(self, parser: Q) -> Generator<Q> {
        Generator {
            options: self.options,
            parser,
            model_builder: self.model_builder,
            cache_key: self.cache_key,
        }
    }

    /// Replaces the model builder, e.g. to install custom strategies.
    pub fn with_model_builder(mut self, model_builder: CodeModelBuilder) -> Self {
        self.model_builder = model_builder;
        self
    }

    /// Tags the passes of this generator for [`crate::ModelsCache`]. Needed
    /// when a custom model builder changes the output for the same inputs.
    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// The tag set by [`Generator::with_cache_key`].
    pub fn cache_key(&self) -> Option<&str> {
        self.cache_key.as_deref()
    }

    /// The generation options.
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// The code parser.
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Collects code options from the configuration, `sources` and `extra`,
    /// applied in that order.
    pub fn collect_options(
        &self,
        sources: &SourceFiles,
        extra: &[&dyn OptionsSource],
    ) -> AppResult<CodeOptions> {
        let code = CodeSource {
            parser: &self.parser,
            sources,
        };
        let mut all: Vec<&dyn OptionsSource> = Vec::with_capacity(extra.len() + 2);
        all.push(&self.options);
        all.push(&code);
        all.extend_from_slice(extra);

        let mut builder = CodeOptionsBuilder::new();
        apply_all(&all, &mut builder)?;
        Ok(builder.build())
    }

    /// Builds the code model for `types` against the existing `sources`.
    pub fn build_model(
        &self,
        types: &[ContentTypeDef],
        sources: &SourceFiles,
        extra: &[&dyn OptionsSource],
    ) -> AppResult<CodeModel> {
        let code_options = self.collect_options(sources, extra)?;
        self.model_builder.build(types, code_options)
    }

    /// Generates one source file per model.
    pub fn generate(
        &self,
        types: &[ContentTypeDef],
        sources: &SourceFiles,
    ) -> AppResult<GeneratedModels> {
        self.generate_with(types, sources, &[])
    }

    /// Generates one source file per model, with additional option sources.
    pub fn generate_with(
        &self,
        types: &[ContentTypeDef],
        sources: &SourceFiles,
        extra: &[&dyn OptionsSource],
    ) -> AppResult<GeneratedModels> {
        let model = self.build_model(types, sources, extra)?;
        let files = CodeWriter::new(&model, &self.options)?.write_all();

        let mut check = sources.clone();
        for (clr_name, text) in &files {
            check.insert(generated_file_name(clr_name), text.clone());
        }
        self.parser.validate(&check)?;
        debug!(files = files.len(), "Generated sources compile");

        info!(models = files.len(), namespace = %model.namespace, "Generated models");
        Ok(GeneratedModels {
            namespace: model.namespace,
            files,
        })
    }

    /// Generates every model into one source text.
    pub fn generate_single_file(
        &self,
        types: &[ContentTypeDef],
        sources: &SourceFiles,
    ) -> AppResult<String> {
        let model = self.build_model(types, sources, &[])?;
        let text = CodeWriter::new(&model, &self.options)?.write_single_file();

        let mut check = sources.clone();
        check.insert(SINGLE_FILE_NAME.to_string(), text.clone());
        self.parser.validate(&check)?;

        info!(models = model.types.len(), namespace = %model.namespace, "Generated single models file");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::options::ContentTypeIdentity;
    use crate::schema::{ContentKind, PropertyTypeDef};

    fn schema() -> Vec<ContentTypeDef> {
        vec![ContentTypeDef {
            id: 1,
            alias: "page".into(),
            parent_id: None,
            kind: ContentKind::Content,
            name: "Page".into(),
            description: None,
            variations: Default::default(),
            properties: vec![PropertyTypeDef {
                alias: "title".into(),
                editor_alias: "Umbraco.TextBox".into(),
                name: "Title".into(),
                description: None,
                variations: Default::default(),
                value_type: Some("string".into()),
            }],
            composition_type_ids: vec![],
        }]
    }

    #[test]
    fn test_generate_and_feed_back() {
        let generator = Generator::new(GenerationOptions::default()).unwrap();
        let first = generator.generate(&schema(), &SourceFiles::new()).unwrap();
        assert_eq!(first.len(), 1);
        let (file, _) = first.by_file_name().next().unwrap();
        assert_eq!(file, "Page.generated.cs");

        let fed: SourceFiles = first.by_file_name().map(|(f, t)| (f, t.to_string())).collect();
        let second = generator.generate(&schema(), &fed).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extra_sources_apply_last() {
        let generator = Generator::new(GenerationOptions::default()).unwrap();
        let ignore_title = |b: &mut CodeOptionsBuilder| -> AppResult<()> {
            b.ignore_property_type(&ContentTypeIdentity::alias("page"), "title");
            Ok(())
        };
        let out = generator
            .generate_with(&schema(), &SourceFiles::new(), &[&ignore_title])
            .unwrap();
        assert!(!out.get("Page").unwrap().contains("Title"));
    }

    #[test]
    fn test_user_code_errors_abort_the_pass() {
        let generator = Generator::new(GenerationOptions::default()).unwrap();
        let sources = SourceFiles::from([("Page.cs".to_string(), "public partial class Page {".to_string())]);
        let err = generator.generate(&schema(), &sources).unwrap_err();
        assert!(matches!(err, AppError::Compilation { ref file, .. } if file == "Page.cs"));
    }

    #[test]
    fn test_single_file() {
        let generator = Generator::new(GenerationOptions::default()).unwrap();
        let text = generator.generate_single_file(&schema(), &SourceFiles::new()).unwrap();
        assert!(text.contains("public partial class Page"));
    }
}
