#![deny(missing_docs)]

//! # ModelsBuilder CLI
//!
//! Console host for the typed content-model generator.
//!
//! Supported Commands:
//! - `generate`: Schema + existing partial classes -> `*.generated.cs` models.
//! - `parse`: Prints the customizations found in existing sources as JSON.

use clap::{Parser, Subcommand};

use crate::error::CliResult;

mod error;
mod generate;
mod inputs;
mod logging;
mod parse;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Typed content model generator")]
struct Cli {
    /// Increase log verbosity (`-v` debug, `-vv` trace).
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generates models into the models directory.
    Generate(generate::GenerateArgs),
    /// Prints the customizations parsed from the models directory.
    Parse(parse::ParseArgs),
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => {
            let report = generate::execute(args)?;
            println!(
                "Models generated: {} written, {} unchanged, {} removed.",
                report.written.len(),
                report.unchanged.len(),
                report.removed.len()
            );
        }
        Commands::Parse(args) => {
            println!("{}", parse::execute(args)?);
        }
    }

    Ok(())
}
