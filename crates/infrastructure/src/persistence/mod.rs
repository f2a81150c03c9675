//! Persistence adapters: the tokio file system and the JSON workspace store.

mod file_system;
mod workspace_store;

pub use file_system::TokioFileSystem;
pub use workspace_store::JsonFileStore;
