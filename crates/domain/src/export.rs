//! Export format types.
//!
//! Exporters walk live store state and serialize it back into one of the
//! dialects the importer understands.

use serde::{Deserialize, Serialize};

use crate::import::ImportWarning;

/// Supported export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Portage's own collection export. Lossless.
    #[default]
    Native,
    /// Postman Collection v2.1.
    PostmanV2,
    /// Postman environment export.
    #[serde(rename = "postman-env")]
    PostmanEnvironment,
    /// `KEY=VALUE` text.
    #[serde(rename = "dotenv")]
    DotEnv,
}

impl ExportFormat {
    /// Get all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Native,
            Self::PostmanV2,
            Self::PostmanEnvironment,
            Self::DotEnv,
        ]
    }

    /// Stable identifier used on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::PostmanV2 => "postman-v2",
            Self::PostmanEnvironment => "postman-env",
            Self::DotEnv => "dotenv",
        }
    }

    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Native | Self::PostmanV2 | Self::PostmanEnvironment => "json",
            Self::DotEnv => "env",
        }
    }

    /// Get the display name for this format.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Native => "Portage export",
            Self::PostmanV2 => "Postman Collection v2.1",
            Self::PostmanEnvironment => "Postman Environment",
            Self::DotEnv => ".env file",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown export format: {s}"))
    }
}

/// Export options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// The format to export to.
    #[serde(default)]
    pub format: ExportFormat,
    /// Whether to pretty print JSON output.
    #[serde(default = "default_true")]
    pub pretty_print: bool,
    /// Whether disabled headers and params are written out.
    #[serde(default = "default_true")]
    pub include_disabled: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            pretty_print: true,
            include_disabled: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

impl ExportOptions {
    /// Create new export options.
    #[must_use]
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }
}

/// Result of an export operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    /// The exported content.
    pub content: String,
    /// The format used.
    pub format: ExportFormat,
    /// Number of requests exported.
    pub request_count: usize,
    /// Number of environments exported.
    #[serde(default)]
    pub environment_count: usize,
    /// Fields the target could not carry.
    #[serde(default)]
    pub warnings: Vec<ImportWarning>,
}

impl ExportResult {
    /// Create a new export result.
    #[must_use]
    pub const fn new(content: String, format: ExportFormat, request_count: usize) -> Self {
        Self {
            content,
            format,
            request_count,
            environment_count: 0,
            warnings: Vec::new(),
        }
    }

    /// Add a warning.
    pub fn add_warning(&mut self, warning: ImportWarning) {
        self.warnings.push(warning);
    }

    /// Check if there were any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get the suggested filename.
    #[must_use]
    pub fn suggested_filename(&self, base_name: &str) -> String {
        format!("{base_name}.{}", self.format.extension())
    }
}
