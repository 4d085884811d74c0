#![deny(missing_docs)]

//! # ModelsBuilder Core
//!
//! Core library of the typed content-model generator: parses existing C#
//! customizations, merges option sources, plans the code model and writes
//! strongly-typed model classes for CMS content types. Performs no I/O.

/// Shared error types.
pub mod error;

/// C# parsing and customization extraction.
pub mod parser;

/// Code options collected from configuration and user code.
pub mod options;

/// Generation options.
pub mod config;

/// Content type schema contracts.
pub mod schema;

/// CLR naming strategies.
pub mod naming;

/// Code model and its builder.
pub mod model;

/// C# source rendering.
pub mod writer;

/// In-memory generation pipeline.
pub mod generator;

/// Cache of the last generation pass.
pub mod cache;

pub use cache::ModelsCache;
pub use config::{ClrNameSource, GenerationOptions, PropertyStyle};
pub use error::{AppError, AppResult};
pub use generator::{GeneratedModels, Generator, SINGLE_FILE_NAME};
pub use model::{
    BaseClassContext, BaseClassResolver, CodeModel, CodeModelBuilder, ContentTypeModel,
    DefaultBaseClassResolver, PropertyFilter, PropertyModel, PropertyState,
};
pub use naming::{DefaultNamingStrategy, NamingStrategy};
pub use options::{CodeOptions, CodeOptionsBuilder, ContentTypeIdentity, OptionsSource};
pub use parser::{
    CSharpCodeParser, CodeParser, LanguageVersion, ReferenceAssembly, ReferenceType, SourceFiles,
};
pub use schema::{ContentKind, ContentTypeDef, PropertyTypeDef, Variations};
pub use writer::{generated_file_name, CodeWriter};
