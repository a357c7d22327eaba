//! Virtual file tree: an arena of nodes addressed by slash-delimited paths.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::kernel::language::LanguageId;

new_key_type! { pub struct NodeId; }

pub const ROOT_PATH: &str = "/";
pub const ROOT_NAME: &str = "workspace";

/// Relative path (no leading slash) to file content.
pub type FileMap = BTreeMap<String, String>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileTreeError {
    #[error("parent is not a folder: {0}")]
    InvalidParent(String),
    #[error("a node already exists at {0}")]
    DuplicatePath(String),
    #[error("invalid name {0:?}")]
    InvalidName(String),
    #[error("no such path: {0}")]
    NotFound(String),
    #[error("not a file: {0}")]
    NotAFile(String),
    #[error("the workspace root cannot be deleted")]
    RootNotDeletable,
}

#[derive(Debug, Clone)]
pub struct FileNode {
    id: NodeId,
    name: CompactString,
    kind: NodeKind,
    path: String,
    content: Option<String>,
    language: Option<LanguageId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl FileNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `Some` iff the node is a file.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// `Some` iff the node is a file.
    pub fn language(&self) -> Option<LanguageId> {
        self.language
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

pub struct FileTree {
    arena: SlotMap<NodeId, FileNode>,
    root: NodeId,
    id_by_path: FxHashMap<String, NodeId>,
}

impl std::fmt::Debug for FileTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTree")
            .field("nodes", &self.arena.len())
            .finish()
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree {
    /// A tree holding only the root folder.
    pub fn new() -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert_with_key(|id| FileNode {
            id,
            name: CompactString::from(ROOT_NAME),
            kind: NodeKind::Folder,
            path: ROOT_PATH.to_string(),
            content: None,
            language: None,
            parent: None,
            children: Vec::new(),
        });

        let mut id_by_path = FxHashMap::default();
        id_by_path.insert(ROOT_PATH.to_string(), root);

        Self {
            arena,
            root,
            id_by_path,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &FileNode {
        &self.arena[self.root]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 1
    }

    pub fn node(&self, id: NodeId) -> Option<&FileNode> {
        self.arena.get(id)
    }

    pub fn lookup(&self, path: &str) -> Option<&FileNode> {
        let id = self.lookup_id(path)?;
        self.arena.get(id)
    }

    pub fn lookup_id(&self, path: &str) -> Option<NodeId> {
        self.id_by_path.get(normalize_path(path).as_ref()).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup_id(path).is_some()
    }

    pub fn insert(
        &mut self,
        parent_path: &str,
        name: &str,
        kind: NodeKind,
    ) -> Result<String, FileTreeError> {
        let content = match kind {
            NodeKind::File => Some(String::new()),
            NodeKind::Folder => None,
        };
        let id = self.insert_at(parent_path, name, kind, content)?;
        Ok(self.arena[id].path.clone())
    }

    pub fn insert_file(
        &mut self,
        parent_path: &str,
        name: &str,
        content: impl Into<String>,
    ) -> Result<String, FileTreeError> {
        let id = self.insert_at(parent_path, name, NodeKind::File, Some(content.into()))?;
        Ok(self.arena[id].path.clone())
    }

    fn insert_at(
        &mut self,
        parent_path: &str,
        name: &str,
        kind: NodeKind,
        content: Option<String>,
    ) -> Result<NodeId, FileTreeError> {
        let parent = self
            .lookup_id(parent_path)
            .filter(|id| self.arena[*id].is_folder())
            .ok_or_else(|| FileTreeError::InvalidParent(parent_path.to_string()))?;
        self.insert_child(parent, name, kind, content)
    }

    pub(crate) fn insert_child(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
        content: Option<String>,
    ) -> Result<NodeId, FileTreeError> {
        validate_name(name)?;

        let parent_node = self
            .arena
            .get(parent)
            .ok_or_else(|| FileTreeError::InvalidParent(String::new()))?;
        if !parent_node.is_folder() {
            return Err(FileTreeError::InvalidParent(parent_node.path.clone()));
        }

        let path = join_path(&parent_node.path, name);
        if self.id_by_path.contains_key(&path) {
            return Err(FileTreeError::DuplicatePath(path));
        }

        let (content, language) = match kind {
            NodeKind::File => (
                Some(content.unwrap_or_default()),
                Some(LanguageId::from_path(name)),
            ),
            NodeKind::Folder => (None, None),
        };

        let id = self.arena.insert_with_key(|id| FileNode {
            id,
            name: CompactString::from(name),
            kind,
            path: path.clone(),
            content,
            language,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.arena[parent].children.push(id);
        self.id_by_path.insert(path, id);

        Ok(id)
    }

    pub fn update(&mut self, path: &str, content: impl Into<String>) -> Result<(), FileTreeError> {
        let id = self
            .lookup_id(path)
            .ok_or_else(|| FileTreeError::NotFound(path.to_string()))?;
        let node = &mut self.arena[id];
        if !node.is_file() {
            return Err(FileTreeError::NotAFile(node.path.clone()));
        }
        node.content = Some(content.into());
        Ok(())
    }

    /// Removes the node at `path` and its whole subtree; returns how many nodes went away.
    pub fn delete(&mut self, path: &str) -> Result<usize, FileTreeError> {
        let id = self
            .lookup_id(path)
            .ok_or_else(|| FileTreeError::NotFound(path.to_string()))?;
        if id == self.root {
            return Err(FileTreeError::RootNotDeletable);
        }

        if let Some(parent) = self.arena[id].parent {
            if let Some(parent_node) = self.arena.get_mut(parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            if let Some(node) = self.arena.remove(node_id) {
                self.id_by_path.remove(&node.path);
                stack.extend(node.children);
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Depth-first pre-order walk starting at `id` (inclusive).
    pub fn walk(&self, id: NodeId) -> Vec<&FileNode> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.arena.get(node_id) else {
                continue;
            };
            out.push(node);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    pub fn flatten(&self) -> FileMap {
        self.walk(self.root)
            .into_iter()
            .filter_map(|node| {
                let content = node.content.as_ref()?;
                Some((relative_path(&node.path).to_string(), content.clone()))
            })
            .collect()
    }

    pub fn file_count(&self) -> usize {
        self.arena.values().filter(|n| n.is_file()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTreeRow {
    pub id: NodeId,
    pub depth: u16,
    pub name: String,
    pub path: String,
    pub is_folder: bool,
}

impl FileTree {
    /// Rows in explorer order: folders before files, insertion order otherwise.
    pub fn rows(&self) -> Vec<FileTreeRow> {
        let mut result = Vec::new();
        let mut stack: Vec<(NodeId, u16)> = vec![(self.root, 0)];

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };

            if id != self.root {
                result.push(FileTreeRow {
                    id,
                    depth,
                    name: node.name.to_string(),
                    path: node.path.clone(),
                    is_folder: node.is_folder(),
                });
            }

            let (dirs, files): (Vec<NodeId>, Vec<NodeId>) = node
                .children
                .iter()
                .copied()
                .partition(|child| self.arena.get(*child).is_some_and(|c| c.is_folder()));

            let child_depth = if id == self.root { 0 } else { depth + 1 };
            for file_id in files.into_iter().rev() {
                stack.push((file_id, child_depth));
            }
            for dir_id in dirs.into_iter().rev() {
                stack.push((dir_id, child_depth));
            }
        }

        result
    }
}

pub fn validate_name(name: &str) -> Result<(), FileTreeError> {
    if name.trim().is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(FileTreeError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// `parent/name`, or `/name` directly under the root.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Strips the leading slash used by tree paths.
pub fn relative_path(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// True when `path` is `ancestor` itself or lies beneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT_PATH {
        return true;
    }
    path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn normalize_path(path: &str) -> std::borrow::Cow<'_, str> {
    if path.starts_with('/') {
        std::borrow::Cow::Borrowed(path)
    } else {
        std::borrow::Cow::Owned(format!("/{path}"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
