//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod document_reader;
mod file_system;
mod workspace_store;

pub use document_reader::DocumentReader;
pub use file_system::{FileSystem, FileSystemError};
pub use workspace_store::{StoreError, WorkspaceStore};
