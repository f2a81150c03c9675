//! Arena index over the flat folder list.
//!
//! Parent pointers are resolved from temp ids to arena indices once. References
//! that leave the batch become root attachments and parent cycles are broken
//! by detaching the first folder (in arena order) found on each cycle.

use std::collections::HashMap;

use super::ir::{CanonicalFolder, CanonicalRequest, TempId};
use super::warning::{ImportWarning, WarningCode};

/// Resolved folder hierarchy addressed by arena index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderGraph {
    index: HashMap<TempId, usize>,
    parents: Vec<Option<usize>>,
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl FolderGraph {
    /// Resolves parent pointers, breaking cycles and re-rooting orphans.
    ///
    /// Emits one warning per orphan and exactly one warning per cycle broken.
    #[must_use]
    pub fn resolve(folders: &[CanonicalFolder]) -> (Self, Vec<ImportWarning>) {
        let mut warnings = Vec::new();

        let mut index = HashMap::with_capacity(folders.len());
        for (i, folder) in folders.iter().enumerate() {
            index.entry(folder.temp_id.clone()).or_insert(i);
        }

        let mut parents: Vec<Option<usize>> = folders
            .iter()
            .map(|folder| {
                let parent_id = folder.parent.as_ref()?;
                let resolved = index.get(parent_id).copied();
                if resolved.is_none() {
                    warnings.push(ImportWarning::info(
                        WarningCode::OrphanReattached,
                        &folder.name,
                        format!("Parent '{parent_id}' is not part of this import; folder placed at the root"),
                    ));
                }
                resolved
            })
            .collect();

        for i in 0..parents.len() {
            if reaches(&parents, parents[i], i) {
                parents[i] = None;
                warnings.push(ImportWarning::warning(
                    WarningCode::CycleBroken,
                    &folders[i].name,
                    "Folder is its own ancestor; moved to the root to break the cycle",
                ));
            }
        }

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); folders.len()];
        for (i, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(i),
                None => roots.push(i),
            }
        }
        let by_order =
            |a: &usize, b: &usize| folders[*a].order.cmp(&folders[*b].order).then(a.cmp(b));
        roots.sort_by(by_order);
        for list in &mut children {
            list.sort_by(by_order);
        }

        (
            Self {
                index,
                parents,
                roots,
                children,
            },
            warnings,
        )
    }

    /// Number of folders in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// True when there are no folders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Arena index of a temp id.
    #[must_use]
    pub fn lookup(&self, id: &TempId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Resolved parent of a folder.
    #[must_use]
    pub fn parent(&self, folder: usize) -> Option<usize> {
        self.parents.get(folder).copied().flatten()
    }

    /// Root-attached folders in sibling order.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Children of a folder in sibling order.
    #[must_use]
    pub fn children(&self, folder: usize) -> &[usize] {
        self.children.get(folder).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every folder ordered so that parents come before their children
    /// (root-attached folders first, then each following level).
    #[must_use]
    pub fn top_down(&self) -> Vec<usize> {
        let mut ordered = Vec::with_capacity(self.len());
        ordered.extend_from_slice(&self.roots);
        let mut cursor = 0;
        while cursor < ordered.len() {
            let current = ordered[cursor];
            ordered.extend_from_slice(self.children(current));
            cursor += 1;
        }
        ordered
    }

    /// Resolves each request's folder pointer, re-rooting unknown references.
    #[must_use]
    pub fn attach_requests(
        &self,
        requests: &[CanonicalRequest],
    ) -> (Vec<Option<usize>>, Vec<ImportWarning>) {
        let mut warnings = Vec::new();
        let attachments = requests
            .iter()
            .map(|request| {
                let folder_id = request.folder.as_ref()?;
                let resolved = self.lookup(folder_id);
                if resolved.is_none() {
                    warnings.push(ImportWarning::info(
                        WarningCode::OrphanReattached,
                        &request.name,
                        format!("Folder '{folder_id}' is not part of this import; request placed at the root"),
                    ));
                }
                resolved
            })
            .collect();
        (attachments, warnings)
    }
}

/// Walks the ancestor chain from `start` and reports whether it reaches `target`.
fn reaches(parents: &[Option<usize>], start: Option<usize>, target: usize) -> bool {
    let mut visited = vec![false; parents.len()];
    let mut cursor = start;
    while let Some(current) = cursor {
        if current == target {
            return true;
        }
        if std::mem::replace(&mut visited[current], true) {
            return false;
        }
        cursor = parents[current];
    }
    false
}
