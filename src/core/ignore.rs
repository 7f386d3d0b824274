//! Ignore-rule parsing and directory tree filtering for the file browser.
//!
//! This is a deliberately small subset of gitignore semantics: rules are sorted into
//! folder names, file names/extensions and `!` exceptions, and entries are matched by
//! their bare name. It only decides what the file tree shows; git itself stays the
//! authority on what is tracked.
//!
//! # Public API
//! - [`IgnoreRuleSet`]: rules parsed from one ignore file, mergeable with nested ones
//! - [`DirectoryNode`]: one entry of a directory listing
//! - [`read_directory`]: build the unfiltered tree from disk
//! - [`filter_tree`]: prune ignored entries and rewrite paths relative to the root

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// Directory name that is always hidden.
const GIT_DIR_NAME: &str = ".git";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRuleSet {
    pub folder: BTreeSet<String>,
    pub file: BTreeSet<String>,
    pub folder_exception: BTreeSet<String>,
    pub file_exception: BTreeSet<String>,
}

impl IgnoreRuleSet {
    /// Parse the content of an ignore file.
    pub fn parse(content: &str) -> Self {
        let mut rules = Self::default();
        let content = content.replace('\r', "");

        for line in content.split('\n').map(str::trim_end) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(exception) = line.strip_prefix('!') {
                insert_non_empty(&mut rules.folder_exception, folder_of(exception));
                insert_non_empty(&mut rules.file_exception, exception.to_string());
                continue;
            }

            let has_separator = line.contains('/');
            let has_dot = line.contains('.');

            if (has_separator || !has_dot) && !line.contains("/*") {
                insert_non_empty(&mut rules.folder, normalize_folder_rule(line));
            }
            if !has_separator && has_dot {
                insert_non_empty(&mut rules.file, normalize_file_rule(line));
            }
        }

        rules
    }

    /// Add the folder and file rules of a nested ignore file that are not present yet.
    pub fn merge(&mut self, nested: &IgnoreRuleSet) {
        self.folder.extend(nested.folder.iter().cloned());
        self.file.extend(nested.file.iter().cloned());
    }

    /// Whether an entry with this bare name is hidden.
    pub fn excludes(&self, name: &str) -> bool {
        if name == GIT_DIR_NAME || self.folder.contains(name) || self.file.contains(name) {
            return true;
        }
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.file.contains(ext))
    }

    pub fn is_empty(&self) -> bool {
        self.folder.is_empty()
            && self.file.is_empty()
            && self.folder_exception.is_empty()
            && self.file_exception.is_empty()
    }
}

fn insert_non_empty(set: &mut BTreeSet<String>, value: String) {
    if !value.is_empty() {
        set.insert(value);
    }
}

fn normalize_folder_rule(line: &str) -> String {
    let line = line.strip_prefix('/').unwrap_or(line);
    let line = line.strip_suffix('/').unwrap_or(line);
    line.to_string()
}

fn normalize_file_rule(line: &str) -> String {
    ["**/", "*/", "*."]
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))
        .unwrap_or(line)
        .to_string()
}

fn folder_of(exception: &str) -> String {
    match exception.rsplit_once('/') {
        Some((folder, _)) => folder.to_string(),
        None => String::new(),
    }
}

/// Reads the ignore file of a directory, if there is one.
pub trait IgnoreSource {
    fn read_ignore(&self, dir: &Path) -> Option<String>;
}

/// Reads `.gitignore` files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsIgnoreSource;

impl IgnoreSource for FsIgnoreSource {
    fn read_ignore(&self, dir: &Path) -> Option<String> {
        let file = dir.join(IGNORE_FILE_NAME);
        if !file.is_file() {
            return None;
        }
        match fs::read_to_string(&file) {
            Ok(content) => Some(content),
            Err(e) => {
                log::warn!("Could not read {}: {e}", file.display());
                None
            }
        }
    }
}

/// One entry of a directory listing.
///
/// `name` is only present on freshly read nodes; [`filter_tree`] drops it once the path
/// has been made relative, after which the path is the node's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryNode {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DirectoryNode>>,
}

impl DirectoryNode {
    pub fn file(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: Some(name.into()),
            children: None,
        }
    }

    pub fn folder(
        path: impl Into<String>,
        name: impl Into<String>,
        children: Vec<DirectoryNode>,
    ) -> Self {
        Self {
            path: path.into(),
            name: Some(name.into()),
            children: Some(children),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.children.is_some()
    }

    /// The explicit name, or the last path segment once the name has been dropped.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.path)
            .to_string()
    }
}

/// Read a directory recursively. The `.git` folder is listed but not descended into.
pub fn read_directory(dir: &Path) -> Result<Vec<DirectoryNode>> {
    let mut nodes = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let path_text = path.to_string_lossy().into_owned();

        if entry.file_type()?.is_dir() {
            let children = if name == GIT_DIR_NAME {
                Vec::new()
            } else {
                read_directory(&path)?
            };
            nodes.push(DirectoryNode::folder(path_text, name, children));
        } else {
            nodes.push(DirectoryNode::file(path_text, name));
        }
    }

    Ok(nodes)
}

/// Filter a tree read from `root` using the root ignore file and any nested ones.
pub fn filter_repository_tree(
    nodes: &mut Vec<DirectoryNode>,
    root: &Path,
    source: &dyn IgnoreSource,
) {
    let rules = source
        .read_ignore(root)
        .map(|content| IgnoreRuleSet::parse(&content))
        .unwrap_or_default();
    filter_tree(nodes, root, "", &rules, source);
}

/// Prune ignored entries in place and rewrite surviving paths relative to `root`.
///
/// `parent_dir` is the root-relative directory of `nodes` (empty at the top). A nested
/// ignore file in `parent_dir` adds its rules for this level and everything below it.
pub fn filter_tree(
    nodes: &mut Vec<DirectoryNode>,
    root: &Path,
    parent_dir: &str,
    inherited: &IgnoreRuleSet,
    source: &dyn IgnoreSource,
) {
    let mut rules = inherited.clone();
    if !parent_dir.is_empty() {
        if let Some(content) = source.read_ignore(&root.join(parent_dir)) {
            log::debug!("Merging nested ignore rules from {parent_dir}");
            rules.merge(&IgnoreRuleSet::parse(&content));
        }
    }

    sort_entries(nodes);

    nodes.retain_mut(|node| {
        let name = node.display_name();
        if rules.excludes(&name) {
            log::debug!("Ignoring {}", node.path);
            return false;
        }

        if rules.folder_exception.contains(&name) {
            if let Some(children) = node.children.as_mut() {
                children.retain(|child| {
                    let path = child.path.replace('\\', "/");
                    rules
                        .file_exception
                        .iter()
                        .any(|exception| path.contains(exception.as_str()))
                });
            }
        }

        node.path = relative_path(root, &node.path);
        node.name = None;

        if let Some(children) = node.children.as_mut() {
            filter_tree(children, root, &node.path, &rules, source);
        }
        true
    });
}

/// Directories first, then by name.
fn sort_entries(nodes: &mut [DirectoryNode]) {
    nodes.sort_by(|a, b| {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| a.display_name().cmp(&b.display_name()))
    });
}

/// Forward-slash path relative to `root`. Already relative paths are only normalized.
pub fn relative_path(root: &Path, path: &str) -> String {
    let path = path.replace('\\', "/");
    let root = root.to_string_lossy().replace('\\', "/");
    let root = root.trim_end_matches('/');

    let relative = if root.is_empty() {
        path.as_str()
    } else {
        path.strip_prefix(root).unwrap_or(&path)
    };
    relative.trim_start_matches('/').to_string()
}
