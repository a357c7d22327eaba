//! Data models.

pub mod file_tree;

pub use file_tree::{
    is_within, join_path, relative_path, validate_name, FileMap, FileNode, FileTree,
    FileTreeError, FileTreeRow, NodeId, NodeKind, ROOT_NAME, ROOT_PATH,
};
