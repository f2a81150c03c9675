//! Portage Domain - Canonical import/export model
//!
//! This crate defines the intermediate representation every external dialect
//! is converted to, the store record types, and the pure reconciliation logic
//! (tree reconstruction and conflict resolution). Nothing here performs I/O.

pub mod conflict;
pub mod error;
pub mod export;
pub mod id;
pub mod import;
pub mod persistence;

pub use conflict::{
    ConflictRecord, ConflictResolver, ConflictSet, Resolution, ResolvedEnvironment, WriteTarget,
    unique_import_name,
};
pub use error::{DomainError, DomainResult};
pub use export::{ExportFormat, ExportOptions, ExportResult};
pub use id::generate_id;
pub use import::{
    CanonicalCollection, CanonicalEnvironment, CanonicalFolder, CanonicalRequest, DetectionResult,
    DocumentSource, EntityKind, ErrorCode, FolderGraph, ImportEntity, ImportError, ImportFormat,
    ImportIr, ImportWarning, ParseOutcome, PreviewTree, RawDocument, TempId, TreeBuilder,
    TreeNode, WarningCode, WarningSeverity, WarningStats,
};
pub use persistence::{
    ApiKeyLocation, AuthConfig, CollectionRecord, EnvironmentRecord, FolderRecord, FormDataField,
    Id, KeyValue, RequestBody, RequestRecord, WorkspaceSnapshot,
};
