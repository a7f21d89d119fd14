use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("target directory missing or not writable: {0}")]
    TargetDir(String),
    #[error("refusing to overwrite existing file {0}")]
    Exists(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes `content` to `path` through a temp file in the same directory and a rename.
///
/// Missing parent directories are created. An existing file is only replaced
/// when `overwrite` is set.
pub fn write_atomically(path: &Path, content: &str, overwrite: bool) -> Result<(), PersistError> {
    if path.exists() && !overwrite {
        return Err(PersistError::Exists(path.to_path_buf()));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if dir.exists() {
        let meta = fs::metadata(&dir).map_err(|e| PersistError::TargetDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::TargetDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(&dir).map_err(|e| PersistError::TargetDir(e.to_string()))?;
    }

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}
