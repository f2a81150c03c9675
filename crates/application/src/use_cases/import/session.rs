//! Import session state machine
//!
//! `Select` holds nothing. `Preview` holds the parsed IR, its preview tree and
//! the conflict set with the operator's decisions. `Importing` lasts for the
//! duration of one commit; success returns to `Select`, failure to `Preview`
//! with every decision kept.

use tracing::{debug, info};

use portage_domain::{
    ConflictResolver, ConflictSet, DetectionResult, EnvironmentRecord, ImportFormat, ImportIr,
    ParseOutcome, PreviewTree, RawDocument, Resolution, ResolvedEnvironment, TreeBuilder,
};

use super::execute_import::{ExecuteImport, ExecutionResult};
use super::options::{EnvironmentMode, ImportOptions};
use super::preview::ImportPreview;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{DocumentReader, WorkspaceStore};

/// Phase of an import session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a document.
    Select,
    /// A document is parsed and awaiting conflict decisions and commit.
    Preview,
    /// A commit is in flight.
    Importing,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Select => write!(f, "select"),
            Self::Preview => write!(f, "preview"),
            Self::Importing => write!(f, "importing"),
        }
    }
}

struct Loaded {
    detection: DetectionResult,
    format: ImportFormat,
    outcome: ParseOutcome,
    tree: PreviewTree,
    existing: Vec<EnvironmentRecord>,
    conflicts: ConflictSet,
    failed_attempt: bool,
}

/// One import from document selection to commit.
pub struct ImportSession<R, S> {
    reader: R,
    executor: ExecuteImport<S>,
    options: ImportOptions,
    state: SessionState,
    loaded: Option<Loaded>,
}

impl<R: DocumentReader, S: WorkspaceStore> ImportSession<R, S> {
    /// Creates a session in the `Select` state.
    pub const fn new(reader: R, store: S, options: ImportOptions) -> Self {
        Self {
            reader,
            executor: ExecuteImport::new(store),
            options,
            state: SessionState::Select,
            loaded: None,
        }
    }

    /// Current phase.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Options applied at commit.
    pub const fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Detects, parses and previews a document, replacing any previous one.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFile` when the file picker supplied a non `.json`/`.env` file
    /// - `Detection` when no dialect is recognized with enough confidence
    /// - `Parse` when the document is invalid for its dialect
    /// - `Storage` when existing environments cannot be listed
    ///
    /// The session stays in `Select` on error.
    pub async fn select(&mut self, document: RawDocument) -> ApplicationResult<ImportPreview> {
        self.ensure_not_importing("select a document")?;
        self.loaded = None;
        self.state = SessionState::Select;

        if !document.picker_accepts() {
            return Err(ApplicationError::UnsupportedFile(
                document.filename.unwrap_or_default(),
            ));
        }

        let detection = self.reader.detect(&document);
        let format = match detection.format {
            Some(format) if detection.is_valid => format,
            format => {
                return Err(ApplicationError::Detection {
                    format,
                    confidence: detection.confidence,
                });
            }
        };

        let outcome = self.reader.parse(&document, format);
        if let Some(error) = outcome.errors.first() {
            return Err(ApplicationError::Parse(error.clone()));
        }
        debug!(
            %format,
            folders = outcome.ir.folders.len(),
            requests = outcome.ir.requests.len(),
            environments = outcome.ir.environments.len(),
            warnings = outcome.warnings.len(),
            "document parsed"
        );

        let tree = TreeBuilder::build(&outcome.ir);
        let (existing, conflicts) = self.detect_conflicts(&outcome.ir).await?;

        let loaded = Loaded {
            detection,
            format,
            outcome,
            tree,
            existing,
            conflicts,
            failed_attempt: false,
        };
        let preview = preview_of(&loaded);
        self.loaded = Some(loaded);
        self.state = SessionState::Preview;
        Ok(preview)
    }

    /// The current preview, if a document is loaded.
    #[must_use]
    pub fn preview(&self) -> Option<ImportPreview> {
        self.loaded.as_ref().map(preview_of)
    }

    /// Records a decision for one conflict.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` outside `Preview` and `Domain` for an unknown index.
    pub fn decide(&mut self, index: usize, resolution: Resolution) -> ApplicationResult<()> {
        let loaded = self.loaded_mut("decide a conflict")?;
        loaded.conflicts.decide(index, resolution)?;
        Ok(())
    }

    /// Applies one decision to every undecided conflict.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` outside `Preview`.
    pub fn decide_all(&mut self, resolution: Resolution) -> ApplicationResult<usize> {
        let loaded = self.loaded_mut("decide conflicts")?;
        Ok(loaded.conflicts.decide_all_pending(resolution))
    }

    /// Whether commit is currently permitted.
    #[must_use]
    pub fn can_commit(&self) -> bool {
        self.state == SessionState::Preview
            && self
                .loaded
                .as_ref()
                .is_some_and(|loaded| loaded.conflicts.all_conflicts_resolved())
    }

    /// Commits the previewed document.
    ///
    /// # Errors
    ///
    /// - `ConflictsUnresolved` when any conflict lacks a decision; no store
    ///   call is made
    /// - `Execution` when a store write fails; the session returns to `Preview`
    ///   with its decisions intact
    /// - `InvalidState` outside `Preview`
    pub async fn commit(&mut self) -> ApplicationResult<ExecutionResult> {
        if self.state != SessionState::Preview {
            return Err(ApplicationError::InvalidState(format!(
                "cannot commit while in {}",
                self.state
            )));
        }
        let mut loaded = self
            .loaded
            .take()
            .ok_or_else(|| ApplicationError::InvalidState("no document loaded".to_string()))?;

        match self.prepare(&mut loaded).await {
            Ok(resolved) => {
                self.state = SessionState::Importing;
                let outcome = self
                    .executor
                    .execute(&loaded.outcome.ir, &resolved, &self.options)
                    .await;
                match outcome {
                    Ok(mut result) => {
                        let mut warnings = loaded.outcome.warnings.clone();
                        warnings.append(&mut result.warnings);
                        result.warnings = warnings;
                        self.state = SessionState::Select;
                        info!(format = %loaded.format, "import session completed");
                        Ok(result)
                    }
                    Err(error) => {
                        loaded.failed_attempt = true;
                        self.loaded = Some(loaded);
                        self.state = SessionState::Preview;
                        Err(error.into())
                    }
                }
            }
            Err(error) => {
                self.loaded = Some(loaded);
                Err(error)
            }
        }
    }

    /// Abandons the current document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` while importing; mid-flight cancellation is
    /// not supported.
    pub fn cancel(&mut self) -> ApplicationResult<()> {
        self.ensure_not_importing("cancel")?;
        self.loaded = None;
        self.state = SessionState::Select;
        Ok(())
    }

    async fn prepare(&self, loaded: &mut Loaded) -> ApplicationResult<Vec<ResolvedEnvironment>> {
        if loaded.failed_attempt {
            // A failed attempt may have written some environments already.
            self.redetect(loaded).await?;
            loaded.failed_attempt = false;
        }

        let pending = loaded.conflicts.pending_count();
        if pending > 0 {
            return Err(ApplicationError::ConflictsUnresolved { pending });
        }

        let ir = &loaded.outcome.ir;
        let resolved = match self
            .options
            .effective_environment_mode(ir.collection.is_some())
        {
            EnvironmentMode::Skip => Vec::new(),
            EnvironmentMode::Collection => ConflictResolver::resolve_fresh_scope(&ir.environments),
            EnvironmentMode::Global => ConflictResolver::resolve_environments(
                &ir.environments,
                &loaded.existing,
                &loaded.conflicts,
            )?,
        };
        Ok(resolved)
    }

    async fn redetect(&self, loaded: &mut Loaded) -> ApplicationResult<()> {
        let (existing, mut conflicts) = self.detect_conflicts(&loaded.outcome.ir).await?;
        for (index, record) in conflicts.records().to_vec().iter().enumerate() {
            let previous = loaded
                .conflicts
                .records()
                .iter()
                .position(|old| old.incoming_index == record.incoming_index)
                .and_then(|old| loaded.conflicts.decision(old));
            if let Some(resolution) = previous {
                conflicts.decide(index, resolution)?;
            }
        }
        debug!(
            conflicts = conflicts.len(),
            pending = conflicts.pending_count(),
            "conflicts re-detected after failed attempt"
        );
        loaded.existing = existing;
        loaded.conflicts = conflicts;
        Ok(())
    }

    async fn detect_conflicts(
        &self,
        ir: &ImportIr,
    ) -> ApplicationResult<(Vec<EnvironmentRecord>, ConflictSet)> {
        let mode = self
            .options
            .effective_environment_mode(ir.collection.is_some());
        if mode != EnvironmentMode::Global || ir.environments.is_empty() {
            return Ok((Vec::new(), ConflictSet::default()));
        }

        let existing: Vec<EnvironmentRecord> = self
            .executor
            .store()
            .list_environments()
            .await?
            .into_iter()
            .filter(EnvironmentRecord::is_global)
            .collect();
        let mut conflicts = ConflictSet::detect_environments(&ir.environments, &existing);
        if let Some(resolution) = self.options.duplicate_handling.resolution() {
            conflicts.decide_all_pending(resolution);
        }
        Ok((existing, conflicts))
    }

    fn ensure_not_importing(&self, action: &str) -> ApplicationResult<()> {
        if self.state == SessionState::Importing {
            return Err(ApplicationError::InvalidState(format!(
                "cannot {action} while importing"
            )));
        }
        Ok(())
    }

    fn loaded_mut(&mut self, action: &str) -> ApplicationResult<&mut Loaded> {
        match (self.state, self.loaded.as_mut()) {
            (SessionState::Preview, Some(loaded)) => Ok(loaded),
            (state, _) => Err(ApplicationError::InvalidState(format!(
                "cannot {action} while in {state}"
            ))),
        }
    }
}

fn preview_of(loaded: &Loaded) -> ImportPreview {
    ImportPreview::new(
        &loaded.detection,
        loaded.format,
        &loaded.outcome.ir,
        &loaded.outcome.warnings,
        loaded.tree.clone(),
        &loaded.conflicts,
    )
}
