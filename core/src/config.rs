#![deny(missing_docs)]

//! # Generation Options
//!
//! Explicit configuration passed into every pipeline stage. Loaded by hosts
//! from YAML or JSON; every field has a default so partial files are valid.

use crate::error::{AppError, AppResult};
use crate::options::{CodeOptionsBuilder, ContentTypeIdentity, OptionsSource};
use crate::parser::LanguageVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default namespace of generated models.
pub const DEFAULT_NAMESPACE: &str = "Umbraco.Web.PublishedModels";

/// What generated CLR names are derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClrNameSource {
    /// Pascal-cased alias (`seoComposition` -> `SeoComposition`).
    #[default]
    Alias,
    /// Alias with only the first letter upper-cased.
    RawAlias,
    /// Pascal-cased display name.
    Name,
}

/// How property accessors are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyStyle {
    /// Instance properties.
    #[default]
    Property,
    /// Static extension methods in a `{Name}Extensions` class.
    ExtensionMethod,
    /// Both properties and extension methods.
    PropertyAndExtensionMethod,
    /// Instance getter methods.
    Method,
}

impl PropertyStyle {
    /// Whether instance properties are emitted.
    pub fn has_properties(&self) -> bool {
        matches!(self, PropertyStyle::Property | PropertyStyle::PropertyAndExtensionMethod)
    }

    /// Whether an extensions class is emitted.
    pub fn has_extension_methods(&self) -> bool {
        matches!(
            self,
            PropertyStyle::ExtensionMethod | PropertyStyle::PropertyAndExtensionMethod
        )
    }
}

/// Configuration of a generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Namespace of generated models.
    pub namespace: String,
    /// Extra `using` directives for generated files.
    pub using_namespaces: Vec<String>,
    /// Full name of the base class of content, media and member models.
    pub content_base_class: String,
    /// Full name of the base class of element models.
    pub element_base_class: String,
    /// Full name of the interface every content mixin interface extends.
    pub content_base_interface: String,
    /// Full name of the interface every element mixin interface extends.
    pub element_base_interface: String,
    /// Constructor parameter type of content models.
    pub content_reference_type: String,
    /// Constructor parameter type of element models.
    pub element_reference_type: String,
    /// Source of generated CLR names.
    pub clr_name_source: ClrNameSource,
    /// Accessor generation style.
    pub property_style: PropertyStyle,
    /// Getter method name pattern, `{0}` is the property CLR name.
    pub getter_pattern: String,
    /// C# language version of both user code and generated code.
    pub language_version: String,
    /// Content type alias patterns to ignore.
    pub ignore_content_types: Vec<String>,
    /// Property alias patterns to ignore, keyed by content type alias.
    pub ignore_property_types: BTreeMap<String, Vec<String>>,
    /// CLR name overrides keyed by content type alias.
    pub rename_content_types: BTreeMap<String, String>,
    /// Property CLR name overrides: content type alias -> property alias -> name.
    pub rename_property_types: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        const PUBLISHED: &str = "Umbraco.Core.Models.PublishedContent";
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            using_namespaces: Vec::new(),
            content_base_class: format!("{}.PublishedContentModel", PUBLISHED),
            element_base_class: format!("{}.PublishedElementModel", PUBLISHED),
            content_base_interface: format!("{}.IPublishedContent", PUBLISHED),
            element_base_interface: format!("{}.IPublishedElement", PUBLISHED),
            content_reference_type: format!("{}.IPublishedContent", PUBLISHED),
            element_reference_type: format!("{}.IPublishedElement", PUBLISHED),
            clr_name_source: ClrNameSource::default(),
            property_style: PropertyStyle::default(),
            getter_pattern: "Get{0}".to_string(),
            language_version: LanguageVersion::default().to_string(),
            ignore_content_types: Vec::new(),
            ignore_property_types: BTreeMap::new(),
            rename_content_types: BTreeMap::new(),
            rename_property_types: BTreeMap::new(),
        }
    }
}

impl GenerationOptions {
    /// Parses options from YAML.
    pub fn from_yaml(text: &str) -> AppResult<Self> {
        let options: Self = serde_yaml::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Parses options from JSON.
    pub fn from_json(text: &str) -> AppResult<Self> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// The parsed language version.
    pub fn language_version(&self) -> AppResult<LanguageVersion> {
        self.language_version.parse()
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> AppResult<()> {
        self.language_version()?;
        if self.namespace.trim().is_empty() {
            return Err(AppError::Configuration("Models namespace must not be empty".into()));
        }
        if !self.getter_pattern.contains("{0}") {
            return Err(AppError::Configuration(format!(
                "Getter pattern '{}' must contain the '{{0}}' placeholder",
                self.getter_pattern
            )));
        }
        let types = [
            ("content_base_class", &self.content_base_class),
            ("element_base_class", &self.element_base_class),
            ("content_base_interface", &self.content_base_interface),
            ("element_base_interface", &self.element_base_interface),
            ("content_reference_type", &self.content_reference_type),
            ("element_reference_type", &self.element_reference_type),
        ];
        for (field, value) in types {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(format!("'{}' must not be empty", field)));
            }
        }
        Ok(())
    }

    /// Getter method name for a property.
    pub fn getter_name(&self, property_clr_name: &str) -> String {
        self.getter_pattern.replace("{0}", property_clr_name)
    }
}

impl OptionsSource for GenerationOptions {
    fn name(&self) -> &str {
        "configuration"
    }

    fn apply(&self, builder: &mut CodeOptionsBuilder) -> AppResult<()> {
        for pattern in &self.ignore_content_types {
            builder.ignore_content_type(pattern);
        }
        for (alias, patterns) in &self.ignore_property_types {
            let identity = ContentTypeIdentity::alias(alias);
            for pattern in patterns {
                builder.ignore_property_type(&identity, pattern);
            }
        }
        for (alias, name) in &self.rename_content_types {
            builder.set_content_type_clr_name(alias, name);
        }
        for (alias, renames) in &self.rename_property_types {
            let identity = ContentTypeIdentity::alias(alias);
            for (property, name) in renames {
                builder.set_property_type_clr_name(&identity, property, name);
            }
        }
        Ok(())
    }
}
