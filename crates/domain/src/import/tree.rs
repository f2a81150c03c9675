//! Preview tree reconstruction.
//!
//! The tree is only for presenting the import to the operator. The executor
//! commits from the flat arenas through [`FolderGraph`] directly.

use std::fmt::Write as _;

use super::graph::FolderGraph;
use super::ir::ImportIr;
use super::warning::ImportWarning;

/// A node of the preview tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// A folder and its ordered children.
    Folder {
        /// Index into `ImportIr::folders`.
        index: usize,
        /// Folder name.
        name: String,
        /// Subfolders and requests in sibling order.
        children: Vec<TreeNode>,
    },
    /// A request leaf.
    Request {
        /// Index into `ImportIr::requests`.
        index: usize,
        /// Request name.
        name: String,
        /// HTTP method.
        method: String,
    },
}

impl TreeNode {
    /// Display name of the node.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::Request { name, .. } => name,
        }
    }
}

/// Ordered n-ary tree rooted at the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewTree {
    /// Collection name, if the document carries one.
    pub collection_name: Option<String>,
    /// Top-level nodes in sibling order.
    pub roots: Vec<TreeNode>,
    /// Orphan and cycle warnings raised while building.
    pub warnings: Vec<ImportWarning>,
}

impl PreviewTree {
    /// Number of folders in the tree.
    #[must_use]
    pub fn folder_count(&self) -> usize {
        count(&self.roots).0
    }

    /// Number of requests in the tree.
    #[must_use]
    pub fn request_count(&self) -> usize {
        count(&self.roots).1
    }

    /// Indented text rendering, one node per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(name) = &self.collection_name {
            out.push_str(name);
            out.push('\n');
        }
        render_nodes(&self.roots, 1, &mut out);
        out
    }
}

fn count(nodes: &[TreeNode]) -> (usize, usize) {
    nodes.iter().fold((0, 0), |(folders, requests), node| match node {
        TreeNode::Folder { children, .. } => {
            let (f, r) = count(children);
            (folders + 1 + f, requests + r)
        }
        TreeNode::Request { .. } => (folders, requests + 1),
    })
}

fn render_nodes(nodes: &[TreeNode], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            TreeNode::Folder { name, children, .. } => {
                let _ = writeln!(out, "{indent}{name}/");
                render_nodes(children, depth + 1, out);
            }
            TreeNode::Request { name, method, .. } => {
                let _ = writeln!(out, "{indent}{method} {name}");
            }
        }
    }
}

/// Rebuilds the hierarchy from flat parent-pointer lists.
pub struct TreeBuilder;

impl TreeBuilder {
    /// Builds the preview tree.
    ///
    /// Folders whose parent is unknown surface at the root, cycles are broken
    /// at the root with one warning each, and requests with an unknown folder
    /// surface at the root. Siblings are stably sorted by `order`, ties broken
    /// by arena position with folders ahead of requests.
    #[must_use]
    pub fn build(ir: &ImportIr) -> PreviewTree {
        let (graph, mut warnings) = FolderGraph::resolve(&ir.folders);
        let (attachments, request_warnings) = graph.attach_requests(&ir.requests);
        warnings.extend(request_warnings);

        let mut folder_requests = vec![Vec::new(); ir.folders.len()];
        let mut root_requests = Vec::new();
        for (index, attachment) in attachments.iter().enumerate() {
            match attachment {
                Some(folder) => folder_requests[*folder].push(index),
                None => root_requests.push(index),
            }
        }

        let builder = Builder {
            ir,
            graph: &graph,
            folder_requests: &folder_requests,
        };
        let roots = builder.siblings(graph.roots(), &root_requests);

        PreviewTree {
            collection_name: ir.collection.as_ref().map(|c| c.name.clone()),
            roots,
            warnings,
        }
    }
}

struct Builder<'a> {
    ir: &'a ImportIr,
    graph: &'a FolderGraph,
    folder_requests: &'a [Vec<usize>],
}

impl Builder<'_> {
    fn siblings(&self, folders: &[usize], requests: &[usize]) -> Vec<TreeNode> {
        // (order, kind rank, arena index, node)
        let mut entries: Vec<(u32, u8, usize, TreeNode)> =
            Vec::with_capacity(folders.len() + requests.len());

        for &index in folders {
            let folder = &self.ir.folders[index];
            let children = self.siblings(self.graph.children(index), &self.folder_requests[index]);
            entries.push((
                folder.order,
                0,
                index,
                TreeNode::Folder {
                    index,
                    name: folder.name.clone(),
                    children,
                },
            ));
        }
        for &index in requests {
            let request = &self.ir.requests[index];
            entries.push((
                request.order,
                1,
                index,
                TreeNode::Request {
                    index,
                    name: request.name.clone(),
                    method: request.method.clone(),
                },
            ));
        }

        entries.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));
        entries.into_iter().map(|(_, _, _, node)| node).collect()
    }
}
