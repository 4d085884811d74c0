//! # Options Sources
//!
//! Anything that contributes declarations to a [`CodeOptionsBuilder`]: static
//! configuration, parsed user code, host-supplied hooks.

use crate::error::AppResult;
use crate::options::builder::CodeOptionsBuilder;

/// A source of code options.
///
/// Sources are applied in order; later sources win for single-valued settings.
pub trait OptionsSource {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "custom"
    }

    /// Writes this source's declarations into the builder.
    fn apply(&self, builder: &mut CodeOptionsBuilder) -> AppResult<()>;
}

impl<F> OptionsSource for F
where
    F: Fn(&mut CodeOptionsBuilder) -> AppResult<()>,
{
    fn apply(&self, builder: &mut CodeOptionsBuilder) -> AppResult<()> {
        self(builder)
    }
}

/// Applies every source in order.
pub fn apply_all(
    sources: &[&dyn OptionsSource],
    builder: &mut CodeOptionsBuilder,
) -> AppResult<()> {
    for source in sources {
        tracing::debug!(source = source.name(), "Applying options source");
        source.apply(builder)?;
    }
    Ok(())
}
