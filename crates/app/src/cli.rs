//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use portage_application::use_cases::{DuplicateHandling, EnvironmentMode};
use portage_domain::{ExportFormat, Resolution};

/// Portage - move API collections and environments between tools
#[derive(Parser, Debug)]
#[command(name = "portage", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./portage.toml when present)
    #[arg(short, long, global = true, env = "PORTAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Workspace store file, overriding the configured one
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the dialect of a document
    Detect {
        /// Document to inspect
        file: PathBuf,
        /// Treat the file as dropped content and skip the extension check
        #[arg(long)]
        dropped: bool,
    },

    /// Parse a document and show what an import would create
    Preview {
        /// Document to preview
        file: PathBuf,
        /// Treat the file as dropped content and skip the extension check
        #[arg(long)]
        dropped: bool,
    },

    /// Import a document into the workspace store
    Import {
        /// Document to import
        file: PathBuf,
        /// Where environments go: collection, global or skip
        #[arg(long)]
        environment_mode: Option<EnvironmentMode>,
        /// Decision for undecided conflicts: ask, skip, overwrite or rename
        #[arg(long)]
        duplicates: Option<DuplicateHandling>,
        /// Also commit disabled headers, params and variables
        #[arg(long)]
        include_disabled: bool,
        /// Decide one conflict, as INDEX=skip|overwrite|rename
        #[arg(long = "resolve", value_name = "INDEX=RESOLUTION", value_parser = parse_decision)]
        decisions: Vec<(usize, Resolution)>,
        /// Treat the file as dropped content and skip the extension check
        #[arg(long)]
        dropped: bool,
    },

    /// Export a collection or environments
    Export {
        /// Collection to export
        #[arg(required_unless_present = "environments", conflicts_with = "environments")]
        collection_id: Option<String>,
        /// Export global environments instead of a collection
        #[arg(long)]
        environments: bool,
        /// Export only the environment with this name
        #[arg(long, requires = "environments")]
        environment: Option<String>,
        /// Target format: native, postman-v2, postman-env or dotenv
        #[arg(short, long)]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
        /// Leave out disabled headers and params
        #[arg(long)]
        exclude_disabled: bool,
    },

    /// List collections and environments in the store
    List,
}

fn parse_decision(value: &str) -> Result<(usize, Resolution), String> {
    let (index, resolution) = value
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=RESOLUTION, got '{value}'"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("'{index}' is not a conflict index"))?;
    Ok((index, resolution.trim().parse()?))
}
