//! Portage Application - Import/export use cases
//!
//! Use cases drive the domain reconciliation logic against ports that the
//! infrastructure layer implements: the workspace store, the dialect reader
//! and the file system.

pub mod error;
pub mod ports;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult};
