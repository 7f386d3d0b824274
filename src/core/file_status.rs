//! Per-node status for the file tree.
//!
//! git reports changed and staged files as repository-relative paths while the tree
//! holds directory nodes. [`classify`] maps one onto the other with a loose match: a
//! directory is marked when any reported file sits under it, and a plain prefix test is
//! used for that, so `src` also matches `src2/x`.

use crate::core::ignore::{relative_path, DirectoryNode};
use crate::core::state::{FileStatusEntry, WorkingState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileStatus {
    Changed,
    Staged,
    Unchanged,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Changed => "changed",
            FileStatus::Staged => "staged",
            FileStatus::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Changed wins over staged; a node matched by neither is unchanged.
pub fn classify(node: &DirectoryNode, root: &Path, working: &WorkingState) -> FileStatus {
    let name = node.display_name();
    let relative = relative_path(root, &node.path);

    let matches = |entry: &FileStatusEntry| entry_matches(entry, &name, &node.path, &relative);

    if working.changed.iter().any(matches) {
        FileStatus::Changed
    } else if working.staged.iter().any(matches) {
        FileStatus::Staged
    } else {
        FileStatus::Unchanged
    }
}

fn entry_matches(entry: &FileStatusEntry, name: &str, path: &str, relative: &str) -> bool {
    if entry.path == name || entry.path == path {
        return true;
    }
    let first_segment = entry.path.split('/').next().unwrap_or(&entry.path);
    if !relative.is_empty() && first_segment == relative {
        return true;
    }
    !path.is_empty() && entry.path.starts_with(path)
}

/// Walk a tree and pair every node path with its status, depth first.
pub fn annotate_tree(
    nodes: &[DirectoryNode],
    root: &Path,
    working: &WorkingState,
) -> Vec<(String, FileStatus)> {
    let mut annotated = Vec::new();
    for node in nodes {
        annotated.push((node.path.clone(), classify(node, root, working)));
        if let Some(children) = &node.children {
            annotated.extend(annotate_tree(children, root, working));
        }
    }
    annotated
}
