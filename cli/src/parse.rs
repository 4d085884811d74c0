#![deny(missing_docs)]

//! # Parse Command
//!
//! Prints the customizations found in the existing sources of the models
//! directory, as JSON, without generating anything.

use crate::error::CliResult;
use crate::inputs::{self, CommonArgs};
use modelsbuilder_core::options::{CodeOptions, CodeOptionsBuilder};
use modelsbuilder_core::{CSharpCodeParser, CodeParser};

/// Arguments for the parse command.
#[derive(clap::Args, Debug, Clone)]
pub struct ParseArgs {
    /// Options shared with the other commands.
    #[clap(flatten)]
    pub common: CommonArgs,
}

/// Parses the models directory into code options.
pub fn parse_options(args: &ParseArgs) -> CliResult<CodeOptions> {
    let options = inputs::load_options(&args.common)?;
    let sources = inputs::read_sources(&args.common.models_dir)?;
    let parser = CSharpCodeParser::from_options(&options)?
        .with_references(inputs::load_references(&args.common)?);

    let mut builder = CodeOptionsBuilder::new();
    parser.parse(&sources, &mut builder)?;
    Ok(builder.build())
}

/// Executes the parse command and returns the JSON document.
pub fn execute(args: &ParseArgs) -> CliResult<String> {
    let options = parse_options(args)?;
    let json = serde_json::to_string_pretty(&options).map_err(modelsbuilder_core::AppError::from)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_reports_customizations() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Page.cs"),
            "using Umbraco.ModelsBuilder;\n[assembly: ModelsNamespace(\"My.Models\")]\npublic partial class Page : MyBase { }\n",
        )
        .unwrap();

        let args = ParseArgs {
            common: CommonArgs {
                models_dir: dir.path().to_path_buf(),
                config: None,
                namespace: None,
                language_version: None,
                references: vec![],
                no_default_references: false,
            },
        };
        let options = parse_options(&args).unwrap();
        assert_eq!(options.models_namespace.as_deref(), Some("My.Models"));
        assert!(options.content_types.omit_content_type_base_class("Page"));

        let json = execute(&args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["models_namespace"], "My.Models");
    }
}
