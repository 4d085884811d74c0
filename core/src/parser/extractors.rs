//! # Extraction Logic
//!
//! Derives code options from parsed user source: which properties are already
//! implemented, which classes declare their own base class, interfaces or
//! constructor, and the option attributes applied to classes and the assembly.

use crate::config::GenerationOptions;
use crate::error::{AppError, AppResult};
use crate::options::{CodeOptionsBuilder, ContentTypeIdentity, OptionsSource};
use crate::parser::attributes::{string_args, type_arg, Marker};
use crate::parser::compilation::{Compilation, Scope};
use crate::parser::language::LanguageVersion;
use crate::parser::models::{CompilationUnit, DeclKind, MemberKind, TypeDecl, TypeName};
use crate::parser::references::{ReferenceAssembly, SymbolKind};
use crate::parser::syntax::parse_unit;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Source files keyed by logical file name.
pub type SourceFiles = BTreeMap<String, String>;

/// Parses existing source into code options.
pub trait CodeParser {
    /// Parses `sources` and writes the facts found into `builder`.
    ///
    /// Pure: no I/O, deterministic for identical inputs.
    fn parse(&self, sources: &SourceFiles, builder: &mut CodeOptionsBuilder) -> AppResult<()>;

    /// Checks that `sources` compile, without collecting facts.
    fn validate(&self, sources: &SourceFiles) -> AppResult<()> {
        self.parse(sources, &mut CodeOptionsBuilder::new())
    }

    /// Everything besides the sources that shapes what [`CodeParser::parse`]
    /// reports, so cached passes of differently configured parsers never mix.
    fn cache_key(&self) -> AppResult<String> {
        Ok(String::new())
    }
}

/// [`CodeParser`] for C# source.
#[derive(Debug, Clone)]
pub struct CSharpCodeParser {
    language_version: LanguageVersion,
    references: Vec<ReferenceAssembly>,
    generated_base_classes: Vec<String>,
    reference_types: Vec<String>,
}

impl Default for CSharpCodeParser {
    fn default() -> Self {
        Self::new(LanguageVersion::default())
    }
}

fn simple_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}

impl CSharpCodeParser {
    /// Parser with the default references and the stock CMS base types.
    pub fn new(language_version: LanguageVersion) -> Self {
        Self {
            language_version,
            references: ReferenceAssembly::defaults(),
            generated_base_classes: vec![
                "Umbraco.Core.Models.PublishedContent.PublishedContentModel".into(),
                "Umbraco.Core.Models.PublishedContent.PublishedElementModel".into(),
            ],
            reference_types: vec!["IPublishedContent".into(), "IPublishedElement".into()],
        }
    }

    /// Parser configured from generation options.
    pub fn from_options(options: &GenerationOptions) -> AppResult<Self> {
        let mut parser = Self::new(options.language_version()?);
        for base in [&options.content_base_class, &options.element_base_class] {
            if !parser.generated_base_classes.contains(base) {
                parser.generated_base_classes.push(base.clone());
            }
        }
        for reference in [&options.content_reference_type, &options.element_reference_type] {
            let simple = simple_name(reference).to_string();
            if !parser.reference_types.contains(&simple) {
                parser.reference_types.push(simple);
            }
        }
        Ok(parser)
    }

    /// Replaces the reference set.
    pub fn with_references(mut self, references: Vec<ReferenceAssembly>) -> Self {
        self.references = references;
        self
    }

    /// Adds a reference to the current set.
    pub fn add_reference(mut self, reference: ReferenceAssembly) -> Self {
        self.references.push(reference);
        self
    }

    /// The language version sources are parsed against.
    pub fn language_version(&self) -> LanguageVersion {
        self.language_version
    }

    /// Parses every unit and builds the semantic compilation.
    pub fn compile(&self, sources: &SourceFiles) -> AppResult<Compilation> {
        let units = sources
            .iter()
            .map(|(file, text)| parse_unit(file, text, self.language_version))
            .collect::<AppResult<Vec<CompilationUnit>>>()?;
        debug!(units = units.len(), references = self.references.len(), "Building compilation");
        Compilation::new(units, &self.references)
    }

    fn is_generated_base(&self, name: &TypeName, resolved: Option<&str>) -> bool {
        self.generated_base_classes.iter().any(|full| {
            resolved == Some(full.as_str()) || name.path.join(".") == *full || name.simple_name() == simple_name(full)
        })
    }

    fn extract_assembly_attributes(
        &self,
        unit: &CompilationUnit,
        compilation: &Compilation,
        builder: &mut CodeOptionsBuilder,
    ) -> AppResult<()> {
        let scope = Scope::file(unit);
        let file = unit.file.as_str();

        for attr in &unit.assembly_attributes {
            let Some(marker) = Marker::identify(attr, compilation, &scope) else {
                continue;
            };
            match marker {
                Marker::IgnoreContentType => {
                    let args = string_args(attr, marker, file, &[1])?;
                    builder.ignore_content_type(&args[0]);
                }
                Marker::RenameContentType => {
                    let args = string_args(attr, marker, file, &[2])?;
                    builder.set_content_type_clr_name(&args[0], &args[1]);
                }
                Marker::IgnorePropertyType => {
                    let args = string_args(attr, marker, file, &[2])?;
                    builder.ignore_property_type(&ContentTypeIdentity::alias(&args[0]), &args[1]);
                }
                Marker::RenamePropertyType => {
                    let args = string_args(attr, marker, file, &[3])?;
                    builder.set_property_type_clr_name(
                        &ContentTypeIdentity::alias(&args[0]),
                        &args[1],
                        &args[2],
                    );
                }
                Marker::ModelsNamespace => {
                    let args = string_args(attr, marker, file, &[1])?;
                    builder.set_models_namespace(&args[0]);
                }
                Marker::ModelsUsing => {
                    let args = string_args(attr, marker, file, &[1])?;
                    builder.use_namespace(&args[0]);
                }
                Marker::ModelsBaseClass => {
                    let ty = type_arg(attr, marker, file)?;
                    let name = compilation
                        .resolve(&ty, &scope)
                        .map(|s| s.full_name.clone())
                        .unwrap_or_else(|| ty.text.trim_start_matches("global::").to_string());
                    builder.set_models_base_class(&name);
                }
                Marker::ImplementPropertyType
                | Marker::ImplementContentType
                | Marker::PublishedModel => {
                    debug!(file, line = attr.line, attribute = marker.short_name(), "Ignoring assembly-level marker");
                }
            }
        }
        Ok(())
    }

    fn extract_type(
        &self,
        unit: &CompilationUnit,
        decl: &TypeDecl,
        compilation: &Compilation,
        builder: &mut CodeOptionsBuilder,
    ) -> AppResult<()> {
        let path = decl.path();
        let scope = Scope::of(decl, &path);
        let file = unit.file.as_str();
        let class_name = decl.name.as_str();
        let identity = ContentTypeIdentity::clr_name(class_name);

        for attr in &decl.attributes {
            let Some(marker) = Marker::identify(attr, compilation, &scope) else {
                continue;
            };
            match marker {
                Marker::ImplementContentType | Marker::PublishedModel => {
                    let args = string_args(attr, marker, file, &[1])?;
                    builder.set_content_type_clr_name(&args[0], class_name);
                }
                Marker::IgnorePropertyType => {
                    let args = string_args(attr, marker, file, &[1])?;
                    builder.ignore_property_type(&identity, &args[0]);
                }
                Marker::RenamePropertyType => {
                    let args = string_args(attr, marker, file, &[2])?;
                    builder.set_property_type_clr_name(&identity, &args[0], &args[1]);
                }
                other => debug!(file, line = attr.line, attribute = other.short_name(), "Ignoring class-level marker"),
            }
        }

        for (index, base) in decl.base_list.iter().enumerate() {
            let resolved = compilation.resolve(base, &scope);
            let display = base.display_name();
            match resolved.map(|s| s.kind) {
                Some(SymbolKind::Interface) => {
                    builder.content_type_model_has_interface(class_name, &display);
                }
                Some(_) if decl.kind == DeclKind::Interface => {
                    builder.content_type_model_has_interface(class_name, &display);
                }
                Some(_) => {
                    if !self.is_generated_base(base, resolved.map(|s| s.full_name.as_str())) {
                        builder.content_type_model_has_base_class(class_name, &display);
                    }
                }
                None if decl.kind == DeclKind::Interface || index > 0 => {
                    builder.content_type_model_has_interface(class_name, &display);
                }
                None => {
                    if !self.is_generated_base(base, None) {
                        warn!(
                            file,
                            line = decl.line,
                            class = class_name,
                            base = %base.text,
                            "Unresolved base type, assuming it is a base class"
                        );
                        builder.content_type_model_has_base_class(class_name, &display);
                    }
                }
            }
        }

        for member in &decl.members {
            match &member.kind {
                MemberKind::Constructor { parameters }
                    if parameters.len() == 1
                        && !member.modifiers.iter().any(|m| m == "static")
                        && self
                            .reference_types
                            .iter()
                            .any(|r| r == parameters[0].ty.simple_name()) =>
                {
                    builder.content_type_model_has_constructor(class_name);
                }
                _ => {}
            }

            for attr in &member.attributes {
                let marker = Marker::identify(attr, compilation, &scope);
                if marker != Some(Marker::ImplementPropertyType) {
                    continue;
                }
                if !matches!(member.kind, MemberKind::Property { .. } | MemberKind::Method { .. }) {
                    return Err(AppError::compilation(
                        file,
                        attr.line,
                        "CS0592: Attribute 'ImplementPropertyType' is not valid on this declaration type. It is only valid on 'property, indexer, method' declarations.",
                    ));
                }
                let args = string_args(attr, Marker::ImplementPropertyType, file, &[1, 2])?;
                match args.as_slice() {
                    [alias] => {
                        builder.implement_property_type(&identity, alias);
                    }
                    [content_type, alias] => {
                        builder.implement_property_type(
                            &ContentTypeIdentity::alias(content_type),
                            alias,
                        );
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

impl CodeParser for CSharpCodeParser {
    fn parse(&self, sources: &SourceFiles, builder: &mut CodeOptionsBuilder) -> AppResult<()> {
        let compilation = self.compile(sources)?;

        for unit in compilation.units() {
            if unit.is_generated {
                debug!(file = %unit.file, "Skipping generated unit");
                continue;
            }
            self.extract_assembly_attributes(unit, &compilation, builder)?;
            for decl in &unit.types {
                let top_level = decl.containing.is_empty();
                if top_level && matches!(decl.kind, DeclKind::Class | DeclKind::Interface) {
                    self.extract_type(unit, decl, &compilation, builder)?;
                }
            }
        }
        Ok(())
    }

    fn validate(&self, sources: &SourceFiles) -> AppResult<()> {
        self.compile(sources).map(|_| ())
    }

    fn cache_key(&self) -> AppResult<String> {
        Ok(serde_json::to_string(&(
            self.language_version,
            &self.references,
            &self.generated_base_classes,
            &self.reference_types,
        ))?)
    }
}

/// Parsed source as an [`OptionsSource`].
pub struct CodeSource<'a, P: CodeParser + ?Sized> {
    /// Parser.
    pub parser: &'a P,
    /// Existing source files.
    pub sources: &'a SourceFiles,
}

impl<P: CodeParser + ?Sized> OptionsSource for CodeSource<'_, P> {
    fn name(&self) -> &str {
        "code"
    }

    fn apply(&self, builder: &mut CodeOptionsBuilder) -> AppResult<()> {
        self.parser.parse(self.sources, builder)
    }
}
