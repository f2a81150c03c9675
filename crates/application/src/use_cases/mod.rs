//! Application use cases (business logic orchestration).

mod import;
mod load_snapshot;
mod read_document;
#[cfg(test)]
mod test_support;

pub use import::{
    ConflictView, DuplicateHandling, EnvironmentMode, ExecuteImport, ExecutionError,
    ExecutionResult, ImportOptions, ImportPreview, ImportSession, ImportStage, SessionState,
    StageCounts,
};
pub use load_snapshot::{LoadSnapshot, SnapshotScope};
pub use read_document::ReadDocument;
