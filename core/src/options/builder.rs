//! # Code Options Builder
//!
//! Mutable collector every options source writes into. Declarations are
//! additive and idempotent; for single-valued settings the last write wins.

use crate::options::content_types::ContentTypesCodeOptions;
use crate::options::identity::ContentTypeIdentity;
use crate::options::CodeOptions;

/// Collects declarations from options sources, then freezes into [`CodeOptions`].
#[derive(Debug, Clone, Default)]
pub struct CodeOptionsBuilder {
    models_namespace: Option<String>,
    using_namespaces: Vec<String>,
    models_base_class: Option<String>,
    content_types: ContentTypesCodeOptions,
}

impl CodeOptionsBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the namespace of generated models.
    pub fn set_models_namespace(&mut self, namespace: &str) -> &mut Self {
        self.models_namespace = Some(namespace.to_string());
        self
    }

    /// Adds a namespace to the `using` directives of generated files.
    pub fn use_namespace(&mut self, namespace: &str) -> &mut Self {
        if !self.using_namespaces.iter().any(|n| n == namespace) {
            self.using_namespaces.push(namespace.to_string());
        }
        self
    }

    /// Overrides the base class of generated non-element models.
    pub fn set_models_base_class(&mut self, full_name: &str) -> &mut Self {
        self.models_base_class = Some(full_name.to_string());
        self
    }

    /// Ignores content types whose alias matches `pattern` (`alias` or `prefix*`).
    pub fn ignore_content_type(&mut self, pattern: &str) -> &mut Self {
        self.content_types.ignore_content_type(pattern);
        self
    }

    /// Ignores properties matching `pattern` on a content type.
    pub fn ignore_property_type(
        &mut self,
        identity: &ContentTypeIdentity,
        pattern: &str,
    ) -> &mut Self {
        self.content_types.ignore_property_type(identity, pattern);
        self
    }

    /// Overrides the CLR name of a content type.
    pub fn set_content_type_clr_name(&mut self, alias: &str, name: &str) -> &mut Self {
        self.content_types.set_content_type_clr_name(alias, name);
        self
    }

    /// Overrides the CLR name of a property.
    pub fn set_property_type_clr_name(
        &mut self,
        identity: &ContentTypeIdentity,
        property_alias: &str,
        name: &str,
    ) -> &mut Self {
        self.content_types
            .set_property_type_clr_name(identity, property_alias, name);
        self
    }

    /// Records that user code already implements a property.
    pub fn implement_property_type(
        &mut self,
        identity: &ContentTypeIdentity,
        property_alias: &str,
    ) -> &mut Self {
        self.content_types
            .implement_property_type(identity, property_alias);
        self
    }

    /// Records a user-declared base class, which replaces the generated one.
    pub fn content_type_model_has_base_class(&mut self, clr_name: &str, base: &str) -> &mut Self {
        self.content_types
            .content_type_model_has_base_class(clr_name, base);
        self
    }

    /// Records a user-declared interface.
    pub fn content_type_model_has_interface(
        &mut self,
        clr_name: &str,
        interface: &str,
    ) -> &mut Self {
        self.content_types
            .content_type_model_has_interface(clr_name, interface);
        self
    }

    /// Records a user-declared content constructor.
    pub fn content_type_model_has_constructor(&mut self, clr_name: &str) -> &mut Self {
        self.content_types.content_type_model_has_constructor(clr_name);
        self
    }

    /// Read access to the content type options collected so far.
    pub fn content_types(&self) -> &ContentTypesCodeOptions {
        &self.content_types
    }

    /// Freezes the collected declarations.
    pub fn build(self) -> CodeOptions {
        CodeOptions {
            models_namespace: self.models_namespace,
            using_namespaces: self.using_namespaces,
            models_base_class: self.models_base_class,
            content_types: self.content_types,
        }
    }
}
