#![deny(missing_docs)]

//! # Inputs
//!
//! Reading of the files a pass depends on: generation options, schema,
//! reference assemblies and the existing sources in the models directory.

use crate::error::{CliError, CliResult};
use modelsbuilder_core::parser::SourceFiles;
use modelsbuilder_core::{schema, ContentTypeDef, GenerationOptions, ReferenceAssembly};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Suffix of files owned by the generator.
pub const GENERATED_SUFFIX: &str = ".generated.cs";

/// Options shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory holding user partial classes and generated models.
    #[clap(long, default_value = "Models")]
    pub models_dir: PathBuf,

    /// Generation options file (YAML or JSON).
    #[clap(long, env = "MODELSBUILDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Namespace of generated models (overrides the options file).
    #[clap(long)]
    pub namespace: Option<String>,

    /// C# language version user code is parsed with (e.g. `7.3`).
    #[clap(long)]
    pub language_version: Option<String>,

    /// Reference assembly description (JSON), may be repeated.
    #[clap(long = "reference")]
    pub references: Vec<PathBuf>,

    /// Do not load the standard references.
    #[clap(long)]
    pub no_default_references: bool,
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yml" || ext == "yaml")
}

/// Loads generation options and applies command line overrides.
pub fn load_options(args: &CommonArgs) -> CliResult<GenerationOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            if is_yaml(path) {
                GenerationOptions::from_yaml(&text)?
            } else {
                GenerationOptions::from_json(&text)?
            }
        }
        None => GenerationOptions::default(),
    };
    if let Some(ns) = &args.namespace {
        options.namespace = ns.clone();
    }
    if let Some(version) = &args.language_version {
        options.language_version = version.clone();
    }
    options.validate()?;
    Ok(options)
}

/// Loads the content type schema (YAML or JSON by extension).
pub fn load_schema(path: &Path) -> CliResult<Vec<ContentTypeDef>> {
    let text = fs::read_to_string(path)?;
    let types = if is_yaml(path) {
        schema::from_yaml(&text)?
    } else {
        schema::from_json(&text)?
    };
    debug!(path = ?path, types = types.len(), "Loaded schema");
    Ok(types)
}

/// The reference set selected on the command line.
pub fn load_references(args: &CommonArgs) -> CliResult<Vec<ReferenceAssembly>> {
    let mut references = if args.no_default_references {
        Vec::new()
    } else {
        ReferenceAssembly::defaults()
    };
    for path in &args.references {
        references.push(ReferenceAssembly::from_json(&fs::read_to_string(path)?)?);
    }
    Ok(references)
}

/// Reads every user `*.cs` file under `dir`, keyed by `/`-separated relative
/// path. Generated files are skipped. A missing directory yields no files.
pub fn read_sources(dir: &Path) -> CliResult<SourceFiles> {
    let mut sources = SourceFiles::new();
    if !dir.exists() {
        return Ok(sources);
    }

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| CliError::General(e.to_string()))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();
        if !entry.file_type().is_file() || !name.ends_with(".cs") || name.ends_with(GENERATED_SUFFIX) {
            continue;
        }
        let relative = path
            .strip_prefix(dir)
            .map_err(|e| CliError::General(e.to_string()))?
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        sources.insert(relative, fs::read_to_string(path)?);
    }
    debug!(dir = ?dir, files = sources.len(), "Read existing sources");
    Ok(sources)
}

/// Generated files directly inside `dir`.
pub fn generated_files(dir: &Path) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.exists() {
        return Ok(files);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let generated = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(GENERATED_SUFFIX));
        if generated && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(dir: &Path) -> CommonArgs {
        CommonArgs {
            models_dir: dir.to_path_buf(),
            config: None,
            namespace: None,
            language_version: None,
            references: vec![],
            no_default_references: false,
        }
    }

    #[test]
    fn test_read_sources_skips_generated() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Sub")).unwrap();
        fs::write(dir.path().join("Page.cs"), "class Page {}").unwrap();
        fs::write(dir.path().join("Sub").join("News.cs"), "class News {}").unwrap();
        fs::write(dir.path().join("Page.generated.cs"), "// old").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let sources = read_sources(dir.path()).unwrap();
        let names: Vec<_> = sources.keys().cloned().collect();
        assert_eq!(names, vec!["Page.cs", "Sub/News.cs"]);
        assert_eq!(generated_files(dir.path()).unwrap().len(), 1);
        assert!(read_sources(&dir.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_options_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("modelsbuilder.yml");
        fs::write(&config, "namespace: From.File\nlanguage_version: \"6\"\n").unwrap();

        let mut args = common(dir.path());
        args.config = Some(config);
        let options = load_options(&args).unwrap();
        assert_eq!(options.namespace, "From.File");

        args.namespace = Some("From.Flag".into());
        args.language_version = Some("4.5".into());
        assert!(matches!(load_options(&args), Err(CliError::App(_))));
        args.language_version = None;
        assert_eq!(load_options(&args).unwrap().namespace, "From.Flag");
    }

    #[test]
    fn test_reference_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = common(dir.path());
        let defaults = load_references(&args).unwrap().len();
        assert!(defaults > 0);
        args.no_default_references = true;
        assert!(load_references(&args).unwrap().is_empty());
    }
}
