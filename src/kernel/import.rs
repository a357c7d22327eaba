//! Builds a fresh file tree from a flat `path -> content` mapping.

use rustc_hash::FxHashMap;

use crate::models::{FileMap, FileTree, FileTreeError, NodeId, NodeKind};

/// A key of the mapping that could not be placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConflict {
    pub key: String,
    pub reason: FileTreeError,
}

#[derive(Debug)]
pub struct ImportOutcome {
    pub tree: FileTree,
    pub imported: usize,
    pub conflicts: Vec<ImportConflict>,
}

/// Imports `files` into a new tree rooted at `/`.
///
/// Keys are processed in lexicographic order. Intermediate folders are created
/// on demand; a key whose folder position is already held by a file (or whose
/// file position is held by a folder) is skipped and reported.
pub fn import_project(files: &FileMap) -> ImportOutcome {
    let mut tree = FileTree::new();
    let mut folders: FxHashMap<String, NodeId> = FxHashMap::default();
    let mut imported = 0;
    let mut conflicts = Vec::new();

    // BTreeMap iteration is already sorted.
    for (key, content) in files {
        match import_one(&mut tree, &mut folders, key, content) {
            Ok(()) => imported += 1,
            Err(reason) => {
                tracing::warn!(key = %key, error = %reason, "import conflict");
                conflicts.push(ImportConflict {
                    key: key.clone(),
                    reason,
                });
            }
        }
    }

    tracing::debug!(imported, conflicts = conflicts.len(), "project imported");
    ImportOutcome {
        tree,
        imported,
        conflicts,
    }
}

fn import_one(
    tree: &mut FileTree,
    folders: &mut FxHashMap<String, NodeId>,
    key: &str,
    content: &str,
) -> Result<(), FileTreeError> {
    let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
    let Some((file_name, dirs)) = segments.split_last() else {
        return Err(FileTreeError::InvalidName(key.to_string()));
    };

    let mut parent = tree.root();
    let mut prefix = String::new();
    for dir in dirs {
        prefix.push('/');
        prefix.push_str(dir);

        parent = match folders.get(&prefix) {
            Some(id) => *id,
            None => {
                if let Some(existing) = tree.lookup(&prefix) {
                    if existing.is_file() {
                        return Err(FileTreeError::InvalidParent(prefix));
                    }
                }
                let id = tree.insert_child(parent, dir, NodeKind::Folder, None)?;
                folders.insert(prefix.clone(), id);
                id
            }
        };
    }

    tree.insert_child(parent, file_name, NodeKind::File, Some(content.to_string()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/import.rs"]
mod tests;
