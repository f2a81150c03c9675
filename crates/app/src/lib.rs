//! Portage command-line application.
//!
//! Wires configuration, logging, the file-backed store and the import/export
//! use cases behind the `portage` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Commands};
pub use commands::{ImportRequest, run};
pub use config::AppConfig;
pub use error::{CliError, CliResult};
