use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::{validate_name, FileMap};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("unsafe archive path: {0}")]
    UnsafePath(String),
    #[error("invalid project name: {0:?}")]
    InvalidName(String),
}

pub fn archive_file_name(project_name: &str) -> String {
    format!("{project_name}.zip")
}

/// Writes every file at its relative path. Folders get no entries of their own.
///
/// Entry names are checked before `dest` is created, so a rejected map leaves no file behind.
pub fn write_archive(files: &FileMap, dest: &Path) -> Result<usize, ArchiveError> {
    let mut entries = Vec::with_capacity(files.len());
    for (path, content) in files {
        let name = path.trim_start_matches('/');
        if name.is_empty() || name.split('/').any(|seg| seg == "..") {
            return Err(ArchiveError::UnsafePath(path.clone()));
        }
        entries.push((name, content));
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut zip = ZipWriter::new(BufWriter::new(File::create(dest)?));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for (name, content) in entries {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    tracing::info!(dest = %dest.display(), files = files.len(), "archive written");
    Ok(files.len())
}

/// Writes `<project_name>.zip` into `dir`. The name must be a single path segment.
pub fn export_project(
    files: &FileMap,
    dir: &Path,
    project_name: &str,
) -> Result<PathBuf, ArchiveError> {
    validate_name(project_name).map_err(|_| ArchiveError::InvalidName(project_name.to_string()))?;
    let dest = dir.join(archive_file_name(project_name));
    write_archive(files, &dest)?;
    Ok(dest)
}
