use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use salon_core::Record;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot write into {dir:?}: {reason}")]
    Directory { dir: PathBuf, reason: String },
    #[error("target has no file name: {0:?}")]
    NoFileName(PathBuf),
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Directory a relative or absolute file target lives in. A bare file name
/// resolves to the working directory.
fn parent_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Creates `dir` and its parents when missing. Fails when `dir` names
/// something other than a directory.
pub fn prepare_dir(dir: &Path) -> Result<(), PersistError> {
    let failed = |reason: String| PersistError::Directory {
        dir: dir.to_path_buf(),
        reason,
    };
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(failed("not a directory".to_string())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| failed(err.to_string()))
        }
        Err(err) => Err(failed(err.to_string())),
    }
}

/// Replaces `target` with `content`. The bytes go to a sibling temp file
/// first, which is synced and then renamed over the target.
pub fn write_atomic(target: &Path, content: &[u8]) -> Result<PathBuf, PersistError> {
    if target.file_name().is_none() {
        return Err(PersistError::NoFileName(target.to_path_buf()));
    }
    let dir = parent_dir(target);
    prepare_dir(&dir)?;

    let mut staged = NamedTempFile::new_in(&dir)?;
    staged.write_all(content)?;
    staged.as_file_mut().sync_all()?;
    staged
        .persist(target)
        .map_err(|err| PersistError::Io(err.error))?;
    Ok(target.to_path_buf())
}

/// Writes `records` as a pretty-printed JSON array to `path`, replacing any
/// previous export.
pub fn export_records(path: &Path, records: &[Record]) -> Result<PathBuf, PersistError> {
    let mut content = serde_json::to_vec_pretty(records)?;
    content.push(b'\n');
    write_atomic(path, &content)
}
