//! Input dialects and detection results.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A recognized input dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportFormat {
    /// Legacy Postman collection with flat `folders`/`requests` arrays.
    PostmanV1,
    /// Postman collection v2.x with a nested `item` tree.
    PostmanV2,
    /// Postman environment export (`{id, name, values}`).
    PostmanEnvironment,
    /// Line-oriented `KEY=VALUE` text.
    #[serde(rename = "dotenv")]
    DotEnv,
    /// Portage's own collection export.
    Native,
}

impl ImportFormat {
    /// Get all recognized formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PostmanV1,
            Self::PostmanV2,
            Self::PostmanEnvironment,
            Self::DotEnv,
            Self::Native,
        ]
    }

    /// Stable identifier used in logs, CLI flags and serialized results.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PostmanV1 => "postman-v1",
            Self::PostmanV2 => "postman-v2",
            Self::PostmanEnvironment => "postman-environment",
            Self::DotEnv => "dotenv",
            Self::Native => "native",
        }
    }

    /// Get the display name for this format.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::PostmanV1 => "Postman Collection v1",
            Self::PostmanV2 => "Postman Collection v2",
            Self::PostmanEnvironment => "Postman Environment",
            Self::DotEnv => ".env file",
            Self::Native => "Portage export",
        }
    }
}

impl std::fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown format: {s}"))
    }
}

/// Outcome of classifying raw content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Detected dialect, `None` when unrecognized.
    pub format: Option<ImportFormat>,
    /// Dialect version when the document declares one.
    pub version: Option<String>,
    /// Whether the detection is confident enough to parse.
    pub is_valid: bool,
    /// Fraction of expected discriminating fields present, in `[0, 1]`.
    pub confidence: f64,
}

impl DetectionResult {
    /// A result for content that matched no dialect.
    #[must_use]
    pub const fn unrecognized() -> Self {
        Self {
            format: None,
            version: None,
            is_valid: false,
            confidence: 0.0,
        }
    }

    /// A result for a recognized dialect, valid when `confidence >= threshold`.
    #[must_use]
    pub fn recognized(
        format: ImportFormat,
        version: Option<String>,
        confidence: f64,
        threshold: f64,
    ) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        Self {
            format: Some(format),
            version,
            is_valid: confidence >= threshold,
            confidence,
        }
    }
}

/// How the raw content reached the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentSource {
    /// Chosen through a file picker; only `.json`/`.env` files are accepted.
    #[default]
    FilePicker,
    /// Dropped onto the window; content is sniffed regardless of extension.
    DragDrop,
}

/// Raw content plus an optional filename hint. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawDocument {
    /// Document text.
    pub content: String,
    /// Original filename, used for the extension hint and default names.
    pub filename: Option<String>,
    /// How the document was supplied.
    pub source: DocumentSource,
}

impl RawDocument {
    /// Creates a document without a filename hint.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            filename: None,
            source: DocumentSource::default(),
        }
    }

    /// Attaches a filename hint.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Marks the document as coming from a drag-drop gesture.
    #[must_use]
    pub const fn dropped(mut self) -> Self {
        self.source = DocumentSource::DragDrop;
        self
    }

    /// Lower-cased extension of the filename hint.
    ///
    /// `.env`, `.env.staging` and `staging.env` all report `env`.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let name = self.filename.as_deref()?;
        let path = Path::new(name);
        let file_name = path.file_name()?.to_string_lossy().to_lowercase();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        if file_name == ".env"
            || (file_name.starts_with(".env.") && extension.as_deref() != Some("json"))
        {
            return Some("env".to_string());
        }
        extension
    }

    /// Whether the file-picker boundary admits this document.
    ///
    /// Picker flows accept `.json` and `.env` files only; drag-drop content is
    /// always admitted and sniffed.
    #[must_use]
    pub fn picker_accepts(&self) -> bool {
        match self.source {
            DocumentSource::DragDrop => true,
            DocumentSource::FilePicker => {
                self.filename.is_none()
                    || matches!(self.extension().as_deref(), Some("json" | "env"))
            }
        }
    }

    /// Filename stem, used as a fallback name for environments.
    ///
    /// `staging.env` yields `staging`; a bare `.env` yields `None`.
    #[must_use]
    pub fn stem(&self) -> Option<String> {
        let name = self.filename.as_deref()?;
        let file_name = Path::new(name).file_name()?.to_string_lossy().into_owned();
        let stem = file_name
            .rsplit_once('.')
            .map_or(file_name.as_str(), |(stem, _)| stem);
        if stem.is_empty() {
            None
        } else {
            Some(stem.to_string())
        }
    }
}
