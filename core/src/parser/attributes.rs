//! # Attribute Operations
//!
//! Recognition and argument decoding of the marker attributes user code uses
//! to customize generation.

use crate::error::{AppError, AppResult};
use crate::parser::compilation::{Compilation, Scope};
use crate::parser::models::{AttributeSyntax, AttributeValue, TypeName};

/// Namespace of the generator's own marker attributes.
pub const MARKERS_NAMESPACE: &str = "Umbraco.ModelsBuilder";

/// Namespace of the CMS published-content attributes.
pub const PUBLISHED_NAMESPACE: &str = "Umbraco.Core.Models.PublishedContent";

/// Marker attributes understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `[ImplementPropertyType("alias")]` or `("contentType", "alias")` on a property or method.
    ImplementPropertyType,
    /// `[IgnorePropertyType("pattern")]` on a class, `("contentType", "pattern")` on the assembly.
    IgnorePropertyType,
    /// `[RenamePropertyType("alias", "Name")]` on a class, `("contentType", "alias", "Name")` on the assembly.
    RenamePropertyType,
    /// `[assembly: IgnoreContentType("pattern")]`
    IgnoreContentType,
    /// `[assembly: RenameContentType("alias", "Name")]`
    RenameContentType,
    /// `[ImplementContentType("alias")]` on a class.
    ImplementContentType,
    /// `[PublishedModel("alias")]` on a class.
    PublishedModel,
    /// `[assembly: ModelsNamespace("Ns")]`
    ModelsNamespace,
    /// `[assembly: ModelsUsing("Ns")]`
    ModelsUsing,
    /// `[assembly: ModelsBaseClass(typeof(T))]`
    ModelsBaseClass,
}

impl Marker {
    const ALL: &'static [Marker] = &[
        Marker::ImplementPropertyType,
        Marker::IgnorePropertyType,
        Marker::RenamePropertyType,
        Marker::IgnoreContentType,
        Marker::RenameContentType,
        Marker::ImplementContentType,
        Marker::PublishedModel,
        Marker::ModelsNamespace,
        Marker::ModelsUsing,
        Marker::ModelsBaseClass,
    ];

    /// Name without the `Attribute` suffix.
    pub fn short_name(&self) -> &'static str {
        match self {
            Marker::ImplementPropertyType => "ImplementPropertyType",
            Marker::IgnorePropertyType => "IgnorePropertyType",
            Marker::RenamePropertyType => "RenamePropertyType",
            Marker::IgnoreContentType => "IgnoreContentType",
            Marker::RenameContentType => "RenameContentType",
            Marker::ImplementContentType => "ImplementContentType",
            Marker::PublishedModel => "PublishedModel",
            Marker::ModelsNamespace => "ModelsNamespace",
            Marker::ModelsUsing => "ModelsUsing",
            Marker::ModelsBaseClass => "ModelsBaseClass",
        }
    }

    fn namespace(&self) -> &'static str {
        match self {
            Marker::PublishedModel => PUBLISHED_NAMESPACE,
            _ => MARKERS_NAMESPACE,
        }
    }

    /// Identifies a marker.
    ///
    /// A name that resolves must resolve into the marker's namespace; an
    /// unresolved name is matched on its simple name alone.
    pub fn identify(
        attr: &AttributeSyntax,
        compilation: &Compilation,
        scope: &Scope<'_>,
    ) -> Option<Marker> {
        let marker = Self::ALL.iter().copied().find(|m| attr.is(m.short_name()))?;
        match compilation.resolve_attribute(&attr.name, scope) {
            Some(symbol) => {
                let expected = format!("{}.{}Attribute", marker.namespace(), marker.short_name());
                (symbol.full_name == expected || symbol.full_name == expected.trim_end_matches("Attribute"))
                    .then_some(marker)
            }
            None => {
                let qualified = attr.name.path.len() > 1;
                let ns_matches = attr.name.path[..attr.name.path.len().saturating_sub(1)].join(".") == marker.namespace();
                (!qualified || ns_matches).then_some(marker)
            }
        }
    }
}

/// Decodes the positional string arguments of a marker.
///
/// Fails like the C# compiler would when the argument count matches no
/// constructor or an argument is not a string.
pub fn string_args(
    attr: &AttributeSyntax,
    marker: Marker,
    file: &str,
    allowed_counts: &[usize],
) -> AppResult<Vec<String>> {
    let positional = attr.positional();
    if !allowed_counts.contains(&positional.len()) {
        return Err(AppError::compilation(
            file,
            attr.line,
            format!(
                "CS1729: '{}Attribute' does not contain a constructor that takes {} arguments",
                marker.short_name(),
                positional.len()
            ),
        ));
    }

    positional
        .iter()
        .enumerate()
        .map(|(i, value)| match value {
            AttributeValue::Str(s) => Ok(s.clone()),
            other => Err(AppError::compilation(
                file,
                attr.line,
                format!(
                    "CS1503: Argument {}: cannot convert from '{}' to 'string'",
                    i + 1,
                    describe(other)
                ),
            )),
        })
        .collect()
}

/// Decodes the single `typeof(T)` argument of a marker.
pub fn type_arg(attr: &AttributeSyntax, marker: Marker, file: &str) -> AppResult<TypeName> {
    let positional = attr.positional();
    match positional.as_slice() {
        [AttributeValue::TypeOf(t)] => Ok(t.clone()),
        [other] => Err(AppError::compilation(
            file,
            attr.line,
            format!(
                "CS1503: Argument 1: cannot convert from '{}' to 'System.Type'",
                describe(other)
            ),
        )),
        args => Err(AppError::compilation(
            file,
            attr.line,
            format!(
                "CS1729: '{}Attribute' does not contain a constructor that takes {} arguments",
                marker.short_name(),
                args.len()
            ),
        )),
    }
}

fn describe(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Str(s) => format!("\"{}\"", s),
        AttributeValue::TypeOf(t) => format!("typeof({})", t.text),
        AttributeValue::Expr(e) => e.clone(),
    }
}
