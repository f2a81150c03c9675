//! Portage Infrastructure - Adapters and implementations
//!
//! Concrete implementations of the application ports: the dialect parsers
//! behind [`DialectRegistry`], the exporters, the tokio file system and the
//! JSON-file workspace store.

pub mod export;
pub mod import;
pub mod native;
pub mod persistence;
pub mod serialization;

pub use export::{
    DotEnvExporter, ExportError, NativeExporter, PostmanEnvironmentExporter, PostmanV2Exporter,
    export_snapshot,
};
pub use import::{DialectParser, DialectRegistry, ImportConfig, detect};
pub use persistence::{JsonFileStore, TokioFileSystem};
pub use serialization::{SerializationError, from_json, to_json, to_json_stable};
