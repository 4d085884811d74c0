//! # Language Versions
//!
//! C# language version selection and the syntax features gated behind it.

use crate::error::{AppError, AppResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::OnceLock;

/// A C# language version (`major.minor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageVersion {
    major: u8,
    minor: u8,
}

impl LanguageVersion {
    /// C# 5.
    pub const CSHARP5: LanguageVersion = LanguageVersion::new(5, 0);
    /// C# 6.
    pub const CSHARP6: LanguageVersion = LanguageVersion::new(6, 0);
    /// C# 7.
    pub const CSHARP7: LanguageVersion = LanguageVersion::new(7, 0);
    /// C# 7.3, the default.
    pub const CSHARP7_3: LanguageVersion = LanguageVersion::new(7, 3);
    /// Newest supported version, used for `latest` and `preview`.
    pub const LATEST: LanguageVersion = LanguageVersion::new(12, 0);

    const KNOWN: &'static [(u8, u8)] = &[
        (1, 0),
        (2, 0),
        (3, 0),
        (4, 0),
        (5, 0),
        (6, 0),
        (7, 0),
        (7, 1),
        (7, 2),
        (7, 3),
        (8, 0),
        (9, 0),
        (10, 0),
        (11, 0),
        (12, 0),
    ];

    const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Whether this version supports the given feature.
    pub fn supports(&self, feature: Feature) -> bool {
        *self >= feature.required_version()
    }
}

impl Default for LanguageVersion {
    fn default() -> Self {
        LanguageVersion::CSHARP7_3
    }
}

impl Display for LanguageVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.minor == 0 {
            write!(f, "{}", self.major)
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

impl FromStr for LanguageVersion {
    type Err = AppError;

    /// Accepts `6`, `7.3`, `7_3`, `CSharp7_3`, `latest`, `preview`, `default`.
    fn from_str(s: &str) -> AppResult<Self> {
        static VERSION_RE: OnceLock<Regex> = OnceLock::new();
        let re = VERSION_RE.get_or_init(|| {
            Regex::new(r"(?i)^(?:c#|csharp)?\s*(\d{1,2})(?:[._](\d))?$").expect("Invalid regex")
        });

        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "latest" | "latestmajor" | "preview" => return Ok(LanguageVersion::LATEST),
            "default" => return Ok(LanguageVersion::default()),
            _ => {}
        }

        let invalid = || AppError::Configuration(format!("Invalid language version '{}'", s));
        let caps = re.captures(trimmed).ok_or_else(invalid)?;
        let major: u8 = caps[1].parse().map_err(|_| invalid())?;
        let minor: u8 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0,
        };

        if !Self::KNOWN.contains(&(major, minor)) {
            return Err(invalid());
        }
        Ok(LanguageVersion::new(major, minor))
    }
}

impl TryFrom<String> for LanguageVersion {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        value.parse()
    }
}

impl From<LanguageVersion> for String {
    fn from(v: LanguageVersion) -> Self {
        v.to_string()
    }
}

/// Syntax features that are rejected below their introducing version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// `public string Name => ...;`
    ExpressionBodiedProperty,
    /// `public string Get() => ...;`
    ExpressionBodiedMethod,
    /// `public string Name { get; } = ...;`
    AutoPropertyInitializer,
    /// `$"..."`
    InterpolatedStrings,
    /// `a?.b`
    NullPropagatingOperator,
    /// `using static X;`
    UsingStatic,
    /// `get => ...;`
    ExpressionBodiedAccessor,
    /// `public Foo() => ...;`
    ExpressionBodiedConstructor,
    /// `default` without a type.
    DefaultLiteral,
    /// `init` accessors.
    InitOnlySetters,
    /// `record` declarations.
    Records,
    /// `namespace X;`
    FileScopedNamespace,
    /// `global using X;`
    GlobalUsing,
    /// `"""..."""`
    RawStringLiterals,
}

impl Feature {
    /// Minimum language version supporting the feature.
    pub fn required_version(&self) -> LanguageVersion {
        match self {
            Feature::ExpressionBodiedProperty
            | Feature::ExpressionBodiedMethod
            | Feature::AutoPropertyInitializer
            | Feature::InterpolatedStrings
            | Feature::NullPropagatingOperator
            | Feature::UsingStatic => LanguageVersion::CSHARP6,
            Feature::ExpressionBodiedAccessor | Feature::ExpressionBodiedConstructor => {
                LanguageVersion::CSHARP7
            }
            Feature::DefaultLiteral => LanguageVersion::new(7, 1),
            Feature::InitOnlySetters | Feature::Records => LanguageVersion::new(9, 0),
            Feature::FileScopedNamespace | Feature::GlobalUsing => LanguageVersion::new(10, 0),
            Feature::RawStringLiterals => LanguageVersion::new(11, 0),
        }
    }

    /// Feature name as reported in diagnostics.
    pub fn display_name(&self) -> &'static str {
        match self {
            Feature::ExpressionBodiedProperty => "expression-bodied property",
            Feature::ExpressionBodiedMethod => "expression-bodied method",
            Feature::AutoPropertyInitializer => "auto property initializer",
            Feature::InterpolatedStrings => "interpolated strings",
            Feature::NullPropagatingOperator => "null propagating operator",
            Feature::UsingStatic => "using static",
            Feature::ExpressionBodiedAccessor => "expression body property accessor",
            Feature::ExpressionBodiedConstructor => {
                "expression body constructor and destructor"
            }
            Feature::DefaultLiteral => "default literal",
            Feature::InitOnlySetters => "init-only setters",
            Feature::Records => "records",
            Feature::FileScopedNamespace => "file-scoped namespace",
            Feature::GlobalUsing => "global using directive",
            Feature::RawStringLiterals => "raw string literals",
        }
    }

    /// Diagnostic message for using the feature under `version`.
    pub fn unavailable_message(&self, version: LanguageVersion) -> String {
        format!(
            "CS8059: Feature '{}' is not available in C# {}. Please use language version {} or greater.",
            self.display_name(),
            version,
            self.required_version()
        )
    }
}
