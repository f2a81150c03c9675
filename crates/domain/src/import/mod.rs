//! Canonical import model.
//!
//! Every input dialect is converted into an [`ImportIr`]: flat arenas of
//! folders and requests connected by temporary ids, plus environments.
//! [`FolderGraph`] resolves the parent pointers into indices and
//! [`TreeBuilder`] turns them into the preview tree.

mod format;
mod graph;
mod ir;
mod tree;
mod warning;

pub use format::{DetectionResult, DocumentSource, ImportFormat, RawDocument};
pub use graph::FolderGraph;
pub use ir::{
    CanonicalCollection, CanonicalEnvironment, CanonicalFolder, CanonicalRequest, EntityKind,
    ImportEntity, ImportIr, ParseOutcome, TempId,
};
pub use tree::{PreviewTree, TreeBuilder, TreeNode};
pub use warning::{ErrorCode, ImportError, ImportWarning, WarningCode, WarningSeverity, WarningStats};
