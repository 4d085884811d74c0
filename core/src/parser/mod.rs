#![deny(missing_docs)]

//! # Parser Module
//!
//! Parses existing C# source so generation can honour what users already
//! wrote by hand. Source is lexed and parsed at the declaration level, bound
//! into a [`Compilation`] together with reference assembly metadata, and then
//! inspected for customization facts.

pub mod attributes;
pub mod compilation;
pub mod extractors;
pub mod language;
pub mod lexer;
pub mod models;
pub mod references;
pub mod syntax;

pub use compilation::{Compilation, Scope, Symbol};
pub use extractors::{CSharpCodeParser, CodeParser, CodeSource, SourceFiles};
pub use language::{Feature, LanguageVersion};
pub use models::{CompilationUnit, MemberDecl, MemberKind, TypeDecl, TypeName};
pub use references::{ReferenceAssembly, ReferenceType, SymbolKind};
pub use syntax::{parse_unit, GENERATED_MARKER};
