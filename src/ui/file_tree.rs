use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::protocol::DirectoryEntry;

/// Directories before files, then by name. Names compare byte-wise, so the
/// order is case-sensitive.
pub fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| a.name.cmp(&b.name))
}

pub fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(compare_entries);
}

/// One row of the explorer. A directory is expanded exactly when it holds a
/// loaded child list; collapsing throws the list away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    fn from_entry(parent: &Path, entry: DirectoryEntry) -> Self {
        Self {
            path: parent.join(&entry.name),
            name: entry.name,
            is_directory: entry.is_directory,
            children: None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    pub fn children(&self) -> Option<&[TreeNode]> {
        self.children.as_deref()
    }
}

fn build_children(parent: &Path, mut entries: Vec<DirectoryEntry>) -> Vec<TreeNode> {
    sort_entries(&mut entries);
    entries
        .into_iter()
        .map(|entry| TreeNode::from_entry(parent, entry))
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct TreeRow<'a> {
    pub depth: usize,
    pub node: &'a TreeNode,
}

/// The explorer for one opened directory. The root itself is not a node;
/// its sorted entries are the top-level nodes.
#[derive(Debug, Clone)]
pub struct FileTree {
    root: PathBuf,
    nodes: Vec<TreeNode>,
}

impl FileTree {
    pub fn new(root: PathBuf, entries: Vec<DirectoryEntry>) -> Self {
        let nodes = build_children(&root, entries);
        Self { root, nodes }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn root_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn find(&self, path: &Path) -> Option<&TreeNode> {
        fn walk<'a>(nodes: &'a [TreeNode], path: &Path) -> Option<&'a TreeNode> {
            for node in nodes {
                if node.path == path {
                    return Some(node);
                }
                if path.starts_with(&node.path) {
                    return node.children.as_deref().and_then(|c| walk(c, path));
                }
            }
            None
        }
        walk(&self.nodes, path)
    }

    fn find_mut(&mut self, path: &Path) -> Option<&mut TreeNode> {
        fn walk<'a>(nodes: &'a mut [TreeNode], path: &Path) -> Option<&'a mut TreeNode> {
            for node in nodes {
                if node.path == path {
                    return Some(node);
                }
                if path.starts_with(&node.path) {
                    return node.children.as_deref_mut().and_then(|c| walk(c, path));
                }
            }
            None
        }
        walk(&mut self.nodes, path)
    }

    /// True for the root and for any directory node in the loaded tree.
    pub fn is_directory(&self, path: &Path) -> bool {
        path == self.root || self.find(path).is_some_and(|n| n.is_directory)
    }

    /// Replaces the children of a directory node with freshly listed
    /// entries, each starting collapsed. Returns false if `path` is not a
    /// directory node of this tree.
    pub fn expand(&mut self, path: &Path, entries: Vec<DirectoryEntry>) -> bool {
        match self.find_mut(path) {
            Some(node) if node.is_directory => {
                node.children = Some(build_children(path, entries));
                true
            }
            _ => false,
        }
    }

    /// Drops the loaded children of a directory node.
    pub fn collapse(&mut self, path: &Path) -> bool {
        match self.find_mut(path) {
            Some(node) if node.is_directory => node.children.take().is_some(),
            _ => false,
        }
    }

    /// Depth-first rows of every node reachable through expanded directories.
    pub fn visible_rows(&self) -> Vec<TreeRow<'_>> {
        fn push<'a>(rows: &mut Vec<TreeRow<'a>>, nodes: &'a [TreeNode], depth: usize) {
            for node in nodes {
                rows.push(TreeRow { depth, node });
                if let Some(children) = node.children.as_deref() {
                    push(rows, children, depth + 1);
                }
            }
        }

        let mut rows = Vec::new();
        push(&mut rows, &self.nodes, 0);
        rows
    }
}
