//! Intermediate representation shared by all parsers, the tree builder,
//! the conflict resolver and the import executor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::warning::{ImportError, ImportWarning};
use crate::persistence::{AuthConfig, KeyValue, RequestBody};

/// Ephemeral identifier assigned during parsing.
///
/// Unique within one import session; discarded once the store issues
/// persisted ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempId(String);

impl TempId {
    /// Wraps an id taken from the source document.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for an entity the source document did not name, e.g. `folder-3`.
    #[must_use]
    pub fn sequential(kind: &str, position: usize) -> Self {
        Self(format!("{kind}-{position}"))
    }

    /// Borrow the id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collection metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCollection {
    /// Collection name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Collection-scoped variables.
    pub variables: BTreeMap<String, String>,
}

/// A folder, pointing at its parent by temp id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFolder {
    /// Session-unique id.
    pub temp_id: TempId,
    /// Folder name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent folder; `None` (or an id outside the batch) means the collection root.
    pub parent: Option<TempId>,
    /// Position among siblings.
    pub order: u32,
}

/// A request, pointing at its folder by temp id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRequest {
    /// Session-unique id.
    pub temp_id: TempId,
    /// Request name.
    pub name: String,
    /// Upper-cased HTTP method. Not validated.
    pub method: String,
    /// Raw URL, variables untouched.
    pub url: String,
    /// Headers including disabled ones (flagged).
    pub headers: Vec<KeyValue>,
    /// Optional body.
    pub body: Option<RequestBody>,
    /// Query parameters including disabled ones (flagged).
    pub query_params: Vec<KeyValue>,
    /// Effective auth, inheritance already applied.
    pub auth: AuthConfig,
    /// Containing folder; `None` (or an id outside the batch) means the collection root.
    pub folder: Option<TempId>,
    /// Position among siblings.
    pub order: u32,
}

impl CanonicalRequest {
    /// Creates a bare request with no headers, body, params or auth.
    #[must_use]
    pub fn new(
        temp_id: TempId,
        name: impl Into<String>,
        method: &str,
        url: impl Into<String>,
    ) -> Self {
        Self {
            temp_id,
            name: name.into(),
            method: method.to_uppercase(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
            query_params: Vec::new(),
            auth: AuthConfig::None,
            folder: None,
            order: 0,
        }
    }
}

/// An environment: a named set of variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEnvironment {
    /// Stable name, the key for conflict detection.
    pub name: String,
    /// Name shown to the operator.
    pub display_name: String,
    /// Active variables.
    pub variables: BTreeMap<String, String>,
    /// Variables disabled in the source, committed only on request.
    pub disabled_variables: BTreeMap<String, String>,
}

impl CanonicalEnvironment {
    /// Creates an empty environment whose display name equals its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Variables to commit, merging disabled ones when asked to.
    #[must_use]
    pub fn committed_variables(&self, include_disabled: bool) -> BTreeMap<String, String> {
        let mut variables = self.variables.clone();
        if include_disabled {
            for (key, value) in &self.disabled_variables {
                variables.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        variables
    }
}

/// Kind discriminator for [`ImportEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A folder.
    Folder,
    /// A request.
    Request,
    /// An environment.
    Environment,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Folder => write!(f, "folder"),
            Self::Request => write!(f, "request"),
            Self::Environment => write!(f, "environment"),
        }
    }
}

/// Any importable entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImportEntity {
    /// A folder.
    Folder(CanonicalFolder),
    /// A request.
    Request(CanonicalRequest),
    /// An environment.
    Environment(CanonicalEnvironment),
}

impl ImportEntity {
    /// The entity's kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Folder(_) => EntityKind::Folder,
            Self::Request(_) => EntityKind::Request,
            Self::Environment(_) => EntityKind::Environment,
        }
    }

    /// The name uniqueness is checked against.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(f) => &f.name,
            Self::Request(r) => &r.name,
            Self::Environment(e) => &e.name,
        }
    }
}

/// The canonical representation of one parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportIr {
    /// Collection metadata; absent for environment-only documents.
    pub collection: Option<CanonicalCollection>,
    /// Folder arena.
    pub folders: Vec<CanonicalFolder>,
    /// Request arena.
    pub requests: Vec<CanonicalRequest>,
    /// Environments.
    pub environments: Vec<CanonicalEnvironment>,
}

impl ImportIr {
    /// True when nothing was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collection.is_none()
            && self.folders.is_empty()
            && self.requests.is_empty()
            && self.environments.is_empty()
    }

    /// Total number of variables across all environments and the collection.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        let collection = self.collection.as_ref().map_or(0, |c| c.variables.len());
        collection
            + self
                .environments
                .iter()
                .map(|e| e.variables.len())
                .sum::<usize>()
    }

    /// Every entity in arena order: folders, then requests, then environments.
    pub fn entities(&self) -> impl Iterator<Item = ImportEntity> + '_ {
        self.folders
            .iter()
            .cloned()
            .map(ImportEntity::Folder)
            .chain(self.requests.iter().cloned().map(ImportEntity::Request))
            .chain(
                self.environments
                    .iter()
                    .cloned()
                    .map(ImportEntity::Environment),
            )
    }
}

/// What a parser hands back: never a panic, never a partial abort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// The canonical model; empty when `errors` is non-empty.
    pub ir: ImportIr,
    /// Non-fatal issues.
    pub warnings: Vec<ImportWarning>,
    /// Fatal issues for this document.
    pub errors: Vec<ImportError>,
}

impl ParseOutcome {
    /// A successful parse.
    #[must_use]
    pub const fn parsed(ir: ImportIr, warnings: Vec<ImportWarning>) -> Self {
        Self {
            ir,
            warnings,
            errors: Vec::new(),
        }
    }

    /// A structurally unparseable document: one fatal error and an empty IR.
    #[must_use]
    pub fn failed(error: ImportError) -> Self {
        Self {
            ir: ImportIr::default(),
            warnings: Vec::new(),
            errors: vec![error],
        }
    }

    /// True when the document was rejected.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::warning::ErrorCode;

    #[test]
    fn test_failed_outcome_has_empty_ir() {
        let outcome = ParseOutcome::failed(ImportError::new(ErrorCode::InvalidSyntax, "bad"));
        assert!(outcome.is_fatal());
        assert!(outcome.ir.is_empty());
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_sequential_ids() {
        assert_eq!(TempId::sequential("folder", 3).as_str(), "folder-3");
        assert_ne!(TempId::sequential("folder", 1), TempId::sequential("request", 1));
    }

    #[test]
    fn test_committed_variables_merges_disabled() {
        let mut env = CanonicalEnvironment::new("dev");
        env.variables.insert("A".into(), "1".into());
        env.disabled_variables.insert("B".into(), "2".into());

        assert_eq!(env.committed_variables(false).len(), 1);
        assert_eq!(env.committed_variables(true).len(), 2);
    }

    #[test]
    fn test_entities_are_tagged() {
        let ir = ImportIr {
            requests: vec![CanonicalRequest::new(
                TempId::new("r1"),
                "Get",
                "get",
                "https://x.test",
            )],
            environments: vec![CanonicalEnvironment::new("dev")],
            ..ImportIr::default()
        };
        let kinds: Vec<_> = ir.entities().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EntityKind::Request, EntityKind::Environment]);
        assert_eq!(ir.requests[0].method, "GET");
    }
}
