//! Deterministic JSON output for exports and the workspace file.
//!
//! Keys come out in a stable order (struct field order, `BTreeMap` for maps),
//! indentation is two spaces and pretty output ends with a newline, so
//! repeated exports of unchanged data are byte-identical.

mod json;

pub use json::*;
