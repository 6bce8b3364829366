//! Location of the persisted session.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use authsession_file::FileStore;

/// Directory holding the session document.
pub fn data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "authsession")
        .context("Could not determine data directory")?;
    let dir = dirs.data_dir().to_path_buf();
    debug!(dir = %dir.display(), "Using data directory");
    Ok(dir)
}

/// Token storage in the user's data directory.
pub fn file_store() -> Result<FileStore> {
    Ok(FileStore::new(data_dir()?))
}
