//! # Model Strategies
//!
//! Extension points injected into [`crate::model::CodeModelBuilder`].
//! Closures with the matching signature implement each trait.

use crate::config::GenerationOptions;
use crate::schema::{ContentKind, ContentTypeDef, PropertyTypeDef};

/// Decides whether a property takes part in generation at all.
pub trait PropertyFilter {
    /// Returns false to treat the property as ignored.
    fn include(&self, content_type: &ContentTypeDef, property: &PropertyTypeDef) -> bool;
}

/// Includes every property.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl PropertyFilter for IncludeAll {
    fn include(&self, _content_type: &ContentTypeDef, _property: &PropertyTypeDef) -> bool {
        true
    }
}

impl<F> PropertyFilter for F
where
    F: Fn(&ContentTypeDef, &PropertyTypeDef) -> bool,
{
    fn include(&self, content_type: &ContentTypeDef, property: &PropertyTypeDef) -> bool {
        self(content_type, property)
    }
}

/// Inputs to base class resolution.
#[derive(Debug, Clone, Copy)]
pub struct BaseClassContext<'a> {
    /// The content type.
    pub content_type: &'a ContentTypeDef,
    /// CLR name of the generated parent, if any.
    pub parent_clr_name: Option<&'a str>,
    /// Base class declared in user code, if any.
    pub user_base_class: Option<&'a str>,
    /// Base class override from code options, if any.
    pub models_base_class: Option<&'a str>,
    /// Generation options.
    pub options: &'a GenerationOptions,
}

/// Chooses the base class emitted for a generated class.
pub trait BaseClassResolver {
    /// Full or short name of the base class, or `None` to emit none.
    fn resolve(&self, context: &BaseClassContext<'_>) -> Option<String>;
}

/// User base class wins (nothing emitted), then the generated parent, then the
/// configured element or content base class.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBaseClassResolver;

impl BaseClassResolver for DefaultBaseClassResolver {
    fn resolve(&self, context: &BaseClassContext<'_>) -> Option<String> {
        if context.user_base_class.is_some() {
            return None;
        }
        if let Some(parent) = context.parent_clr_name {
            return Some(parent.to_string());
        }
        match context.content_type.kind {
            ContentKind::Element => Some(context.options.element_base_class.clone()),
            _ => Some(
                context
                    .models_base_class
                    .map(str::to_string)
                    .unwrap_or_else(|| context.options.content_base_class.clone()),
            ),
        }
    }
}

impl<F> BaseClassResolver for F
where
    F: Fn(&BaseClassContext<'_>) -> Option<String>,
{
    fn resolve(&self, context: &BaseClassContext<'_>) -> Option<String> {
        self(context)
    }
}
