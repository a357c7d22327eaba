use std::path::Path;

use ignore::WalkBuilder;

use crate::models::FileMap;

const SKIPPED_DIRS: &[&str] = &[".git", "node_modules"];
/// Build output folders, only skipped directly under the project root.
const SKIPPED_ROOT_DIRS: &[&str] = &["dist", "build", "target"];
const SKIPPED_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

fn is_skipped(name: &str, is_dir: bool, depth: usize) -> bool {
    if is_dir {
        SKIPPED_DIRS.contains(&name) || (depth == 1 && SKIPPED_ROOT_DIRS.contains(&name))
    } else {
        SKIPPED_FILES.contains(&name)
    }
}

fn is_likely_binary(content: &[u8]) -> bool {
    content.iter().take(8192).any(|&b| b == 0)
}

/// Reads the UTF-8 text files under `root` into a relative-path map, honouring ignore files.
pub fn load_project_dir(root: &Path) -> std::io::Result<FileMap> {
    if !root.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("not a directory: {}", root.display()),
        ));
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !is_skipped(&entry.file_name().to_string_lossy(), is_dir, entry.depth())
        })
        .build();

    let mut files = FileMap::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(path = %key, error = %err, "skipping unreadable file");
                continue;
            }
        };
        if is_likely_binary(&bytes) {
            tracing::debug!(path = %key, "skipping binary file");
            continue;
        }
        match String::from_utf8(bytes) {
            Ok(content) => {
                files.insert(key, content);
            }
            Err(_) => tracing::debug!(path = %key, "skipping non-utf8 file"),
        }
    }

    tracing::info!(root = %root.display(), files = files.len(), "project directory loaded");
    Ok(files)
}
