//! Store record types.
//!
//! These are the shapes exchanged with the store collaborator. A record
//! whose `id` is `None` is a create; `Some(id)` updates that entity in place.
//! Listing calls always return records with `id` populated.

mod auth;
mod body;
mod collection;
mod common;
mod environment;
mod folder;
mod request;
mod snapshot;

pub use auth::*;
pub use body::*;
pub use collection::*;
pub use common::*;
pub use environment::*;
pub use folder::*;
pub use request::*;
pub use snapshot::*;
