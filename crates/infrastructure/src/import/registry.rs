//! The set of dialect parsers behind the [`DocumentReader`] port.

use portage_application::ports::DocumentReader;
use portage_domain::{
    DetectionResult, ErrorCode, ImportError, ImportFormat, ParseOutcome, RawDocument,
};

use super::config::ImportConfig;
use super::detector;
use super::dotenv::DotEnvParser;
use super::native::NativeParser;
use super::parser::DialectParser;
use super::postman::{PostmanEnvironmentParser, PostmanV1Parser, PostmanV2Parser};

/// Detects and parses every supported dialect.
pub struct DialectRegistry {
    config: ImportConfig,
    parsers: Vec<Box<dyn DialectParser>>,
}

impl DialectRegistry {
    /// Creates a registry with all built-in parsers.
    #[must_use]
    pub fn new(config: ImportConfig) -> Self {
        Self {
            config,
            parsers: vec![
                Box::new(PostmanV1Parser),
                Box::new(PostmanV2Parser),
                Box::new(PostmanEnvironmentParser),
                Box::new(DotEnvParser),
                Box::new(NativeParser),
            ],
        }
    }

    /// Limits and defaults in effect.
    #[must_use]
    pub const fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// The parser for `format`, if one is registered.
    #[must_use]
    pub fn parser_for(&self, format: ImportFormat) -> Option<&dyn DialectParser> {
        self.parsers
            .iter()
            .find(|p| p.format() == format)
            .map(AsRef::as_ref)
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::new(ImportConfig::default())
    }
}

impl std::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("config", &self.config)
            .field(
                "formats",
                &self.parsers.iter().map(|p| p.format()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl DocumentReader for DialectRegistry {
    fn detect(&self, document: &RawDocument) -> DetectionResult {
        detector::detect(document, &self.config)
    }

    fn parse(&self, document: &RawDocument, format: ImportFormat) -> ParseOutcome {
        if !self.config.admits_size(&document.content) {
            return ParseOutcome::failed(ImportError::new(
                ErrorCode::TooLarge,
                format!(
                    "File size ({} bytes) exceeds maximum ({} bytes)",
                    document.content.len(),
                    self.config.max_file_size
                ),
            ));
        }
        let Some(parser) = self.parser_for(format) else {
            return ParseOutcome::failed(ImportError::new(
                ErrorCode::InvalidStructure,
                format!("No parser registered for {format}"),
            ));
        };

        let outcome = parser.parse(document, &self.config);
        if outcome.is_fatal() {
            tracing::warn!(%format, errors = outcome.errors.len(), "Document rejected");
        } else {
            tracing::info!(
                %format,
                folders = outcome.ir.folders.len(),
                requests = outcome.ir.requests.len(),
                environments = outcome.ir.environments.len(),
                warnings = outcome.warnings.len(),
                "Document parsed"
            );
        }
        outcome
    }
}
