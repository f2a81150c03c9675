//! Import Warning System
//!
//! Warnings never abort parsing; errors abort only the current document.

use serde::{Deserialize, Serialize};

/// Warning severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    /// Informational - feature was skipped but not critical
    Info,
    /// Warning - something may not work as expected
    Warning,
    /// Error - an item was dropped but the document continued
    Error,
}

impl std::fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Machine-readable warning category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// Disabled headers, params or variables were left out of the active set.
    DisabledExcluded,
    /// An unknown or unsupported auth type was downgraded to `none`.
    AuthDowngraded,
    /// Auth was imported partially.
    AuthPartial,
    /// Pre-request or test scripts were dropped.
    ScriptsDropped,
    /// A malformed item was excluded.
    ItemSkipped,
    /// An item carried both children and a request; the request was discarded.
    StrayRequestDiscarded,
    /// A body mode is not supported and was dropped.
    BodyUnsupported,
    /// A file reference was kept without its content.
    FileContentMissing,
    /// An item had a blank name and received a default one.
    NameDefaulted,
    /// A duplicate source id was dropped.
    DuplicateId,
    /// A `.env` line did not match `KEY=VALUE`.
    MalformedLine,
    /// Folders nested beyond the configured depth were flattened.
    DepthFlattened,
    /// The document exceeded the configured item limit.
    ItemLimitReached,
    /// A parent cycle was broken by moving a folder to the root.
    CycleBroken,
    /// A parent reference outside the batch was treated as root.
    OrphanReattached,
    /// Environments were routed to a different scope than requested.
    EnvironmentScopeChanged,
    /// An export target cannot carry a field and dropped it.
    FieldDropped,
}

/// An import warning or issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportWarning {
    /// Category of the issue.
    pub code: WarningCode,
    /// Path to the problematic item (e.g., "collection/folder/request")
    pub path: String,
    /// Human-readable description of the issue
    pub message: String,
    /// Severity level
    pub severity: WarningSeverity,
}

impl ImportWarning {
    /// Create a new warning
    pub fn new(
        code: WarningCode,
        path: impl Into<String>,
        message: impl Into<String>,
        severity: WarningSeverity,
    ) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            severity,
        }
    }

    /// Create an info-level warning
    pub fn info(code: WarningCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, path, message, WarningSeverity::Info)
    }

    /// Create a warning-level warning
    pub fn warning(code: WarningCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, path, message, WarningSeverity::Warning)
    }

    /// Create an error-level warning
    pub fn error(code: WarningCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, path, message, WarningSeverity::Error)
    }

    /// Check if this is an error
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, WarningSeverity::Error)
    }
}

impl std::fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.path, self.message)
    }
}

/// Category of a fatal parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Content is not valid syntax for the detected dialect.
    InvalidSyntax,
    /// Syntax is valid but the document root has the wrong shape.
    InvalidStructure,
    /// Content exceeds the configured size limit.
    TooLarge,
}

/// A fatal error for one document. The IR produced alongside it is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportError {
    /// Category of the failure.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
}

impl ImportError {
    /// Create a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Aggregate statistics from warnings
#[derive(Debug, Default)]
pub struct WarningStats {
    /// Count of informational warnings
    pub info_count: usize,
    /// Count of warning-level warnings
    pub warning_count: usize,
    /// Count of error-level warnings
    pub error_count: usize,
}

impl WarningStats {
    /// Calculate stats from a list of warnings
    #[must_use]
    pub fn from_warnings(warnings: &[ImportWarning]) -> Self {
        let mut stats = Self::default();
        for w in warnings {
            match w.severity {
                WarningSeverity::Info => stats.info_count += 1,
                WarningSeverity::Warning => stats.warning_count += 1,
                WarningSeverity::Error => stats.error_count += 1,
            }
        }
        stats
    }

    /// Total count of all warnings
    #[must_use]
    pub const fn total(&self) -> usize {
        self.info_count + self.warning_count + self.error_count
    }

    /// Check if there are any errors
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}
