//! Postman dialects: Collection v1, Collection v2.x and environment exports.

pub mod environment;
pub mod environment_types;
pub(crate) mod mapper;
pub mod types;
pub mod v1;
pub mod v1_types;
pub mod v2;

pub use environment::PostmanEnvironmentParser;
pub use environment_types::{PostmanEnvVariable, PostmanEnvironment};
pub use types::PostmanCollection;
pub use v1::PostmanV1Parser;
pub use v2::PostmanV2Parser;
