//! Name conflict detection and resolution.
//!
//! Conflicts are detected for environments by exact match on the stable
//! `name` field. Every record must carry a [`Resolution`] before the
//! resolver will produce write targets.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{DomainError, DomainResult};
use crate::import::{CanonicalEnvironment, ImportEntity};
use crate::persistence::{EnvironmentRecord, Id};

/// Suffix appended to renamed entities' stable names.
const RENAME_SUFFIX: &str = "_imported";

/// Suffix appended to renamed entities' display names.
const DISPLAY_SUFFIX: &str = " (Imported)";

/// Operator decision for one conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Drop the incoming entity.
    Skip,
    /// Replace the existing entity's fields, keeping its id.
    Overwrite,
    /// Commit under a fresh unique name.
    Rename,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Overwrite => write!(f, "overwrite"),
            Self::Rename => write!(f, "rename"),
        }
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "overwrite" => Ok(Self::Overwrite),
            "rename" => Ok(Self::Rename),
            other => Err(format!("unknown resolution: {other}")),
        }
    }
}

/// A collision between an incoming entity and one already in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRecord {
    /// The colliding stable name.
    pub entity_name: String,
    /// Persisted id of the existing entity.
    pub existing_id: Id,
    /// The incoming entity.
    pub incoming: ImportEntity,
    /// Position of the incoming entity in its IR arena.
    pub incoming_index: usize,
}

/// All conflicts of one import session together with their decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictSet {
    records: Vec<ConflictRecord>,
    decisions: Vec<Option<Resolution>>,
}

impl ConflictSet {
    /// Detects environment conflicts against the existing environments of the
    /// target scope.
    #[must_use]
    pub fn detect_environments(
        incoming: &[CanonicalEnvironment],
        existing: &[EnvironmentRecord],
    ) -> Self {
        let by_name: HashMap<&str, &Id> = existing
            .iter()
            .filter_map(|env| env.id.as_ref().map(|id| (env.name.as_str(), id)))
            .collect();

        let records: Vec<ConflictRecord> = incoming
            .iter()
            .enumerate()
            .filter_map(|(index, env)| {
                by_name.get(env.name.as_str()).map(|id| ConflictRecord {
                    entity_name: env.name.clone(),
                    existing_id: (*id).clone(),
                    incoming: ImportEntity::Environment(env.clone()),
                    incoming_index: index,
                })
            })
            .collect();

        let decisions = vec![None; records.len()];
        Self { records, decisions }
    }

    /// True when nothing collides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of conflict records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The conflict records in detection order.
    #[must_use]
    pub fn records(&self) -> &[ConflictRecord] {
        &self.records
    }

    /// Decision recorded for a conflict, if any.
    #[must_use]
    pub fn decision(&self, index: usize) -> Option<Resolution> {
        self.decisions.get(index).copied().flatten()
    }

    /// Records the operator's decision for one conflict, replacing any
    /// earlier decision.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownConflict` when `index` is out of range.
    pub fn decide(&mut self, index: usize, resolution: Resolution) -> DomainResult<()> {
        let slot = self
            .decisions
            .get_mut(index)
            .ok_or(DomainError::UnknownConflict(index))?;
        *slot = Some(resolution);
        Ok(())
    }

    /// Applies `resolution` to every conflict still lacking a decision and
    /// returns how many were filled.
    pub fn decide_all_pending(&mut self, resolution: Resolution) -> usize {
        let mut filled = 0;
        for slot in self.decisions.iter_mut().filter(|slot| slot.is_none()) {
            *slot = Some(resolution);
            filled += 1;
        }
        filled
    }

    /// Number of conflicts without a decision.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_none()).count()
    }

    /// True when every conflict has exactly one decision.
    #[must_use]
    pub fn all_conflicts_resolved(&self) -> bool {
        self.pending_count() == 0
    }

    /// Fails unless every conflict has a decision.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConflictsUnresolved` with the pending count.
    pub fn ensure_resolved(&self) -> DomainResult<()> {
        match self.pending_count() {
            0 => Ok(()),
            pending => Err(DomainError::ConflictsUnresolved { pending }),
        }
    }

    fn record_for_incoming(&self, incoming_index: usize) -> Option<(usize, &ConflictRecord)> {
        self.records
            .iter()
            .enumerate()
            .find(|(_, record)| record.incoming_index == incoming_index)
    }
}

/// Where a resolved environment is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteTarget {
    /// Create a new record.
    Create,
    /// Replace the fields of an existing record, reusing its id.
    Overwrite(Id),
}

/// An environment ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    /// The environment, renamed if its conflict was resolved that way.
    pub environment: CanonicalEnvironment,
    /// Create or overwrite.
    pub target: WriteTarget,
}

/// Applies conflict decisions to incoming entities.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Produces the environments to commit, in incoming order.
    ///
    /// Skipped entities are dropped, overwritten ones reuse the existing id,
    /// and renamed ones receive a name unique against the existing scope, the
    /// entities passing through unchanged and every name assigned earlier in
    /// the batch. A pass-through entity repeating the name of an earlier one
    /// in the same batch is renamed the same way.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConflictsUnresolved` if any conflict lacks a
    /// decision. Nothing is resolved in that case.
    pub fn resolve_environments(
        incoming: &[CanonicalEnvironment],
        existing: &[EnvironmentRecord],
        conflicts: &ConflictSet,
    ) -> DomainResult<Vec<ResolvedEnvironment>> {
        conflicts.ensure_resolved()?;

        let mut taken: HashSet<String> = existing.iter().map(|env| env.name.clone()).collect();
        for (index, env) in incoming.iter().enumerate() {
            if conflicts.record_for_incoming(index).is_none() {
                taken.insert(env.name.clone());
            }
        }

        let mut passed: HashSet<&str> = HashSet::new();
        let mut resolved = Vec::with_capacity(incoming.len());
        for (index, env) in incoming.iter().enumerate() {
            let Some((conflict, record)) = conflicts.record_for_incoming(index) else {
                let environment = if passed.insert(env.name.as_str()) {
                    env.clone()
                } else {
                    renamed(env, &mut taken)
                };
                resolved.push(ResolvedEnvironment {
                    environment,
                    target: WriteTarget::Create,
                });
                continue;
            };

            match conflicts.decision(conflict) {
                Some(Resolution::Skip) | None => {}
                Some(Resolution::Overwrite) => resolved.push(ResolvedEnvironment {
                    environment: env.clone(),
                    target: WriteTarget::Overwrite(record.existing_id.clone()),
                }),
                Some(Resolution::Rename) => resolved.push(ResolvedEnvironment {
                    environment: renamed(env, &mut taken),
                    target: WriteTarget::Create,
                }),
            }
        }
        Ok(resolved)
    }

    /// Environments bound for a scope that is empty before the import, such
    /// as a freshly created collection. Only names repeated within the batch
    /// are renamed.
    #[must_use]
    pub fn resolve_fresh_scope(incoming: &[CanonicalEnvironment]) -> Vec<ResolvedEnvironment> {
        Self::resolve_environments(incoming, &[], &ConflictSet::default()).unwrap_or_default()
    }
}

fn renamed(env: &CanonicalEnvironment, taken: &mut HashSet<String>) -> CanonicalEnvironment {
    let name = unique_import_name(&env.name, taken);
    taken.insert(name.clone());
    let mut environment = env.clone();
    environment.display_name = format!("{}{DISPLAY_SUFFIX}", env.display_name);
    environment.name = name;
    environment
}

/// First of `{name}_imported`, `{name}_imported_1`, `{name}_imported_2`, ...
/// not present in `taken`.
///
/// At most `taken.len() + 1` candidates are tried; among that many distinct
/// candidates at least one is free.
#[must_use]
pub fn unique_import_name(name: &str, taken: &HashSet<String>) -> String {
    let base = format!("{name}{RENAME_SUFFIX}");
    if !taken.contains(&base) {
        return base;
    }
    (1..=taken.len())
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| format!("{base}_{}", taken.len() + 1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn existing(name: &str, id: &str) -> EnvironmentRecord {
        let mut env = EnvironmentRecord::new(name);
        env.id = Some(id.to_string());
        env
    }

    fn taken(names: &[&str]) -> HashSet<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_unique_import_name_tries_suffixes() {
        assert_eq!(unique_import_name("dev", &taken(&["dev"])), "dev_imported");
        assert_eq!(
            unique_import_name("dev", &taken(&["dev", "dev_imported"])),
            "dev_imported_1"
        );
        assert_eq!(
            unique_import_name("dev", &taken(&["dev", "dev_imported", "dev_imported_1"])),
            "dev_imported_2"
        );
    }

    #[test]
    fn test_rename_against_existing_imported_name() {
        let incoming = vec![CanonicalEnvironment::new("dev")];
        let store = vec![existing("dev", "e1"), existing("dev_imported", "e2")];

        let mut conflicts = ConflictSet::detect_environments(&incoming, &store);
        assert_eq!(conflicts.len(), 1);
        conflicts.decide(0, Resolution::Rename).unwrap();

        let resolved = ConflictResolver::resolve_environments(&incoming, &store, &conflicts).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].environment.name, "dev_imported_1");
        assert_eq!(resolved[0].environment.display_name, "dev (Imported)");
        assert_eq!(resolved[0].target, WriteTarget::Create);
    }

    #[test]
    fn test_partial_decisions_block_resolution() {
        let incoming = vec![
            CanonicalEnvironment::new("dev"),
            CanonicalEnvironment::new("prod"),
        ];
        let store = vec![existing("dev", "e1"), existing("prod", "e2")];

        let mut conflicts = ConflictSet::detect_environments(&incoming, &store);
        conflicts.decide(0, Resolution::Skip).unwrap();

        assert!(!conflicts.all_conflicts_resolved());
        assert_eq!(conflicts.pending_count(), 1);
        assert_eq!(
            ConflictResolver::resolve_environments(&incoming, &store, &conflicts),
            Err(DomainError::ConflictsUnresolved { pending: 1 })
        );
    }

    #[test]
    fn test_skip_and_overwrite() {
        let incoming = vec![
            CanonicalEnvironment::new("dev"),
            CanonicalEnvironment::new("prod"),
            CanonicalEnvironment::new("fresh"),
        ];
        let store = vec![existing("dev", "e1"), existing("prod", "e2")];

        let mut conflicts = ConflictSet::detect_environments(&incoming, &store);
        conflicts.decide(0, Resolution::Skip).unwrap();
        conflicts.decide(1, Resolution::Overwrite).unwrap();

        let resolved = ConflictResolver::resolve_environments(&incoming, &store, &conflicts).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].environment.name, "prod");
        assert_eq!(resolved[0].target, WriteTarget::Overwrite("e2".to_string()));
        assert_eq!(resolved[1].environment.name, "fresh");
        assert_eq!(resolved[1].target, WriteTarget::Create);
    }

    #[test]
    fn test_renames_unique_within_batch() {
        // Two incoming "dev" plus a pass-through "dev_imported".
        let incoming = vec![
            CanonicalEnvironment::new("dev"),
            CanonicalEnvironment::new("dev"),
            CanonicalEnvironment::new("dev_imported"),
        ];
        let store = vec![existing("dev", "e1")];

        let mut conflicts = ConflictSet::detect_environments(&incoming, &store);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts.decide_all_pending(Resolution::Rename), 2);

        let resolved = ConflictResolver::resolve_environments(&incoming, &store, &conflicts).unwrap();
        let names: Vec<&str> = resolved
            .iter()
            .map(|r| r.environment.name.as_str())
            .collect();
        assert_eq!(names, vec!["dev_imported_1", "dev_imported_2", "dev_imported"]);
    }

    #[test]
    fn test_repeated_names_within_batch_are_renamed() {
        let incoming = vec![
            CanonicalEnvironment::new("qa"),
            CanonicalEnvironment::new("qa"),
            CanonicalEnvironment::new("dev"),
        ];
        let store = vec![existing("dev", "e1")];
        let mut conflicts = ConflictSet::detect_environments(&incoming, &store);
        conflicts.decide(0, Resolution::Skip).unwrap();

        let resolved = ConflictResolver::resolve_environments(&incoming, &store, &conflicts).unwrap();
        let names: Vec<&str> = resolved
            .iter()
            .map(|r| r.environment.name.as_str())
            .collect();
        assert_eq!(names, vec!["qa", "qa_imported"]);
        assert_eq!(resolved[1].environment.display_name, "qa (Imported)");
        assert!(resolved.iter().all(|r| r.target == WriteTarget::Create));
    }

    #[test]
    fn test_fresh_scope_only_dedupes_the_batch() {
        let incoming = vec![
            CanonicalEnvironment::new("qa"),
            CanonicalEnvironment::new("prod"),
            CanonicalEnvironment::new("qa"),
        ];
        let names: Vec<String> = ConflictResolver::resolve_fresh_scope(&incoming)
            .into_iter()
            .map(|r| r.environment.name)
            .collect();
        assert_eq!(names, vec!["qa", "prod", "qa_imported"]);
    }

    #[test]
    fn test_match_is_on_name_not_display_name() {
        let mut incoming = CanonicalEnvironment::new("staging");
        incoming.display_name = "dev".to_string();
        let conflicts = ConflictSet::detect_environments(&[incoming], &[existing("dev", "e1")]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_decide_unknown_index() {
        let mut conflicts = ConflictSet::default();
        assert_eq!(
            conflicts.decide(3, Resolution::Skip),
            Err(DomainError::UnknownConflict(3))
        );
    }

    #[test]
    fn test_decisions_can_be_changed() {
        let incoming = vec![CanonicalEnvironment::new("dev")];
        let mut conflicts = ConflictSet::detect_environments(&incoming, &[existing("dev", "e1")]);
        conflicts.decide(0, Resolution::Skip).unwrap();
        conflicts.decide(0, Resolution::Overwrite).unwrap();
        assert_eq!(conflicts.decision(0), Some(Resolution::Overwrite));
        assert_eq!(conflicts.decide_all_pending(Resolution::Rename), 0);
    }
}
