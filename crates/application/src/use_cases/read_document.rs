//! Read document use case

use std::path::Path;

use tracing::debug;

use portage_domain::RawDocument;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::FileSystem;

/// Reads a local file into a [`RawDocument`].
pub struct ReadDocument<F> {
    file_system: F,
    max_size: usize,
}

impl<F: FileSystem> ReadDocument<F> {
    /// Creates a new `ReadDocument` use case refusing files above `max_size` bytes.
    pub const fn new(file_system: F, max_size: usize) -> Self {
        Self {
            file_system,
            max_size,
        }
    }

    /// Executes the use case.
    ///
    /// `dropped` marks content supplied by drag-drop, which bypasses the file
    /// picker's extension check.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFile` for a picker path with another extension,
    /// `FileSystem` when the file cannot be read, and `TooLarge` when the
    /// file exceeds the size limit.
    pub async fn execute(&self, path: &Path, dropped: bool) -> ApplicationResult<RawDocument> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let header_only = RawDocument::new("").with_filename(filename.clone());
        let header_only = if dropped { header_only.dropped() } else { header_only };
        if !header_only.picker_accepts() {
            return Err(ApplicationError::UnsupportedFile(filename));
        }

        let content = self.file_system.read_file_string(path).await?;
        if content.len() > self.max_size {
            return Err(ApplicationError::TooLarge {
                size: content.len(),
                limit: self.max_size,
            });
        }
        debug!(file = %filename, bytes = content.len(), "document read");

        Ok(RawDocument {
            content,
            ..header_only
        })
    }
}
