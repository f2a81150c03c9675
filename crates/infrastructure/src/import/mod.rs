//! Import pipeline: format detection plus one parser per dialect, all
//! producing the canonical import IR.

pub mod config;
pub mod detector;
pub mod dotenv;
pub mod native;
pub(crate) mod parser;
pub mod postman;
pub mod registry;

pub use config::ImportConfig;
pub use detector::detect;
pub use dotenv::DotEnvParser;
pub use native::NativeParser;
pub use parser::DialectParser;
pub use postman::{PostmanEnvironmentParser, PostmanV1Parser, PostmanV2Parser};
pub use registry::DialectRegistry;
