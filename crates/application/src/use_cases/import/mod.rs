//! Import workflow: options, the dependency-ordered executor and the
//! select/preview/importing session around it.

mod execute_import;
mod options;
mod preview;
mod session;

pub use execute_import::{ExecuteImport, ExecutionError, ExecutionResult, ImportStage, StageCounts};
pub use options::{DuplicateHandling, EnvironmentMode, ImportOptions};
pub use preview::{ConflictView, ImportPreview};
pub use session::{ImportSession, SessionState};
