//! Application configuration.
//!
//! Values come from an optional `portage.toml`, then `PORTAGE__*` environment
//! variables (`PORTAGE__IMPORT__MAX_DEPTH=4`), then command-line flags.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use portage_application::use_cases::{DuplicateHandling, EnvironmentMode, ImportOptions};
use portage_infrastructure::ImportConfig;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "portage";

const ENV_PREFIX: &str = "PORTAGE";

/// Settings for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// JSON file backing the workspace store.
    pub store_path: PathBuf,
    /// Import limits and defaults.
    pub import: ImportConfig,
    /// Where imported environments go.
    pub environment_mode: EnvironmentMode,
    /// Decision applied to undecided environment conflicts.
    pub duplicate_handling: DuplicateHandling,
    /// Commit disabled headers, params and variables.
    pub include_disabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("portage-workspace.json"),
            import: ImportConfig::default(),
            environment_mode: EnvironmentMode::default(),
            duplicate_handling: DuplicateHandling::default(),
            include_disabled: false,
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist; the default `portage.toml` is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is missing or malformed, or a value has the
    /// wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.map_or_else(
            || File::with_name(DEFAULT_CONFIG_FILE).required(false),
            |path| File::from(path).required(true),
        );
        let config: Self = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        tracing::debug!(store = %config.store_path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Import options derived from this configuration.
    #[must_use]
    pub const fn import_options(&self) -> ImportOptions {
        ImportOptions {
            environment_mode: self.environment_mode,
            duplicate_handling: self.duplicate_handling,
            include_disabled: self.include_disabled,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_values_override_defaults() {
        let file = toml_file(
            r#"
store_path = "/tmp/store.json"
environment_mode = "collection"
duplicate_handling = "rename"

[import]
max_depth = 3
"#,
        );
        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.store_path, PathBuf::from("/tmp/store.json"));
        assert_eq!(config.environment_mode, EnvironmentMode::Collection);
        assert_eq!(config.duplicate_handling, DuplicateHandling::Rename);
        assert_eq!(config.import.max_depth, 3);
        assert_eq!(config.import.max_items, 1000);
        assert!(!config.include_disabled);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_value_is_an_error() {
        let file = toml_file("environment_mode = \"everywhere\"\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_import_options() {
        let config = AppConfig {
            duplicate_handling: DuplicateHandling::Skip,
            include_disabled: true,
            ..AppConfig::default()
        };
        let options = config.import_options();
        assert_eq!(options.duplicate_handling, DuplicateHandling::Skip);
        assert_eq!(options.environment_mode, EnvironmentMode::Global);
        assert!(options.include_disabled);
    }
}
