//! Dialect detection and parsing port.

use portage_domain::{DetectionResult, ImportFormat, ParseOutcome, RawDocument};

/// Classifies and parses raw documents.
///
/// Both operations are pure and synchronous. Neither may panic on malformed
/// input: detection reports an unrecognized result and parsing reports a
/// fatal [`portage_domain::ImportError`] inside the outcome.
pub trait DocumentReader: Send + Sync {
    /// Classifies the document.
    fn detect(&self, document: &RawDocument) -> DetectionResult;

    /// Parses the document as `format`.
    ///
    /// No re-detection happens here. A document that does not fit `format`
    /// yields a fatal error or a mostly empty IR, depending on the dialect.
    fn parse(&self, document: &RawDocument, format: ImportFormat) -> ParseOutcome;
}
