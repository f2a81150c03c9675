//! Preview summary shown to the operator before commit.

use portage_domain::{
    ConflictSet, DetectionResult, EntityKind, Id, ImportFormat, ImportIr, ImportWarning,
    PreviewTree, Resolution, WarningStats,
};

/// One pending or decided conflict as presented for a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictView {
    /// Index to pass to [`super::ImportSession::decide`].
    pub index: usize,
    /// Kind of the incoming entity.
    pub kind: EntityKind,
    /// The colliding name.
    pub entity_name: String,
    /// Id of the existing entity.
    pub existing_id: Id,
    /// Decision recorded so far.
    pub decision: Option<Resolution>,
}

/// Everything the operator sees in the preview step.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPreview {
    /// Detected dialect.
    pub format: ImportFormat,
    /// Dialect version, when declared.
    pub version: Option<String>,
    /// Detection confidence.
    pub confidence: f64,
    /// Collection name, if the document carries one.
    pub collection_name: Option<String>,
    /// Number of folders.
    pub folder_count: usize,
    /// Number of requests.
    pub request_count: usize,
    /// Number of environments.
    pub environment_count: usize,
    /// Number of variables across the collection and its environments.
    pub variable_count: usize,
    /// Reconstructed hierarchy.
    pub tree: PreviewTree,
    /// Parse and tree warnings.
    pub warnings: Vec<ImportWarning>,
    /// Conflicts against the target scope.
    pub conflicts: Vec<ConflictView>,
}

impl ImportPreview {
    pub(super) fn new(
        detection: &DetectionResult,
        format: ImportFormat,
        ir: &ImportIr,
        parse_warnings: &[ImportWarning],
        tree: PreviewTree,
        conflicts: &ConflictSet,
    ) -> Self {
        let mut warnings = parse_warnings.to_vec();
        warnings.extend(tree.warnings.iter().cloned());

        let conflicts = conflicts
            .records()
            .iter()
            .enumerate()
            .map(|(index, record)| ConflictView {
                index,
                kind: record.incoming.kind(),
                entity_name: record.entity_name.clone(),
                existing_id: record.existing_id.clone(),
                decision: conflicts.decision(index),
            })
            .collect();

        Self {
            format,
            version: detection.version.clone(),
            confidence: detection.confidence,
            collection_name: ir.collection.as_ref().map(|c| c.name.clone()),
            folder_count: ir.folders.len(),
            request_count: ir.requests.len(),
            environment_count: ir.environments.len(),
            variable_count: ir.variable_count(),
            tree,
            warnings,
            conflicts,
        }
    }

    /// Number of conflicts still lacking a decision.
    #[must_use]
    pub fn pending_conflicts(&self) -> usize {
        self.conflicts.iter().filter(|c| c.decision.is_none()).count()
    }

    /// Warning counts by severity.
    #[must_use]
    pub fn warning_stats(&self) -> WarningStats {
        WarningStats::from_warnings(&self.warnings)
    }

    /// Whether the commit action is available.
    #[must_use]
    pub fn can_commit(&self) -> bool {
        self.pending_conflicts() == 0
    }
}
