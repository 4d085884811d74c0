#![deny(missing_docs)]

//! # Generate Command
//!
//! Runs a generation pass over the models directory and syncs the generated
//! files: changed files are rewritten, unchanged ones left alone and stale
//! generated files removed.

use crate::error::CliResult;
use crate::inputs::{self, CommonArgs};
use modelsbuilder_core::{CSharpCodeParser, Generator, SINGLE_FILE_NAME};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Content type schema (YAML or JSON).
    #[clap(long)]
    pub schema: PathBuf,

    /// Write every model into a single file.
    #[clap(long)]
    pub single_file: bool,

    /// Options shared with the other commands.
    #[clap(flatten)]
    pub common: CommonArgs,
}

/// What a sync changed on disk.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files created or rewritten.
    pub written: Vec<String>,
    /// Files already up to date.
    pub unchanged: Vec<String>,
    /// Stale generated files deleted.
    pub removed: Vec<String>,
}

/// Executes the generate command.
pub fn execute(args: &GenerateArgs) -> CliResult<SyncReport> {
    let options = inputs::load_options(&args.common)?;
    let types = inputs::load_schema(&args.schema)?;
    let sources = inputs::read_sources(&args.common.models_dir)?;

    let parser = CSharpCodeParser::from_options(&options)?
        .with_references(inputs::load_references(&args.common)?);
    let generator = Generator::new(options)?.with_parser(parser);

    let files: BTreeMap<String, String> = if args.single_file {
        let text = generator.generate_single_file(&types, &sources)?;
        BTreeMap::from([(SINGLE_FILE_NAME.to_string(), text)])
    } else {
        generator
            .generate(&types, &sources)?
            .by_file_name()
            .map(|(name, text)| (name, text.to_string()))
            .collect()
    };

    let report = sync_files(&args.common.models_dir, &files)?;
    info!(
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        removed = report.removed.len(),
        "Models directory updated"
    );
    Ok(report)
}

/// Writes `files` into `dir` and removes generated files not among them.
pub fn sync_files(dir: &Path, files: &BTreeMap<String, String>) -> CliResult<SyncReport> {
    fs::create_dir_all(dir)?;
    let mut report = SyncReport::default();

    for stale in inputs::generated_files(dir)? {
        let name = stale
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !files.contains_key(&name) {
            debug!(file = %name, "Removing stale generated file");
            fs::remove_file(&stale)?;
            report.removed.push(name);
        }
    }

    for (name, text) in files {
        let path = dir.join(name);
        let current = fs::read_to_string(&path).ok();
        if current.as_deref() == Some(text.as_str()) {
            report.unchanged.push(name.clone());
            continue;
        }
        fs::write(&path, text)?;
        report.written.push(name.clone());
    }
    Ok(report)
}
