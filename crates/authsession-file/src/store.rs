//! Key-value storage in one JSON document.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use authsession_core::error::Error;
use authsession_core::{KeyValueStore, Result};

/// Name of the document holding all keys.
pub const SESSION_FILE: &str = "session.json";

/// Name of the file locked around every access to [`SESSION_FILE`].
pub const LOCK_FILE: &str = "session.lock";

type Document = BTreeMap<String, String>;

fn map_io(err: std::io::Error) -> Error {
    Error::Storage {
        message: format!("IO error: {}", err),
    }
}

fn map_json(err: serde_json::Error) -> Error {
    Error::Storage {
        message: format!("invalid session file: {}", err),
    }
}

/// A [`KeyValueStore`] backed by `<root>/session.json`.
///
/// Readers take a shared lock and writers an exclusive one, so several
/// processes may use the same directory. Writes go to a temporary file that
/// is renamed over the document; on unix the document is readable by its
/// owner only.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store in `root`. The directory is created on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the session document.
    pub fn path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Run `f` while holding the lock file.
    fn with_lock<T>(&self, exclusive: bool, f: impl FnOnce() -> Result<T>) -> Result<T> {
        fs::create_dir_all(&self.root).map_err(map_io)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io)?;

        if exclusive {
            lock_file.lock_exclusive().map_err(map_io)?;
        } else {
            lock_file.lock_shared().map_err(map_io)?;
        }

        let result = f();
        lock_file.unlock().map_err(map_io)?;
        result
    }

    fn read_raw(&self) -> Result<Option<String>> {
        match fs::read_to_string(self.path()) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(map_io(err)),
        }
    }

    fn read_document(&self) -> Result<Document> {
        match self.read_raw()? {
            Some(content) => serde_json::from_str(&content).map_err(map_json),
            None => Ok(Document::new()),
        }
    }

    /// Like `read_document`, but a document that does not parse is
    /// discarded so that a write can replace it.
    fn read_for_update(&self) -> Result<Document> {
        let Some(content) = self.read_raw()? else {
            return Ok(Document::new());
        };
        match serde_json::from_str(&content) {
            Ok(document) => Ok(document),
            Err(err) => {
                warn!(path = %self.path().display(), error = %err, "Replacing unreadable session file");
                Ok(Document::new())
            }
        }
    }

    fn write_document(&self, document: &Document) -> Result<()> {
        let path = self.path();

        if document.is_empty() {
            return match fs::remove_file(&path) {
                Err(err) if err.kind() != ErrorKind::NotFound => Err(map_io(err)),
                _ => Ok(()),
            };
        }

        let content = serde_json::to_string_pretty(document).map_err(map_json)?;
        let temp_path = self.root.join(format!(".{}.{}.tmp", SESSION_FILE, Uuid::new_v4()));

        let mut file = create_private(&temp_path).map_err(map_io)?;
        let written = file.write_all(content.as_bytes()).and_then(|_| file.sync_all());
        drop(file);
        let written = written.and_then(|_| fs::rename(&temp_path, &path));

        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(map_io(err));
        }
        Ok(())
    }
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .create_new(true)
        .write(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create_new(true).write(true).open(path)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_lock(false, || {
            let mut document = self.read_document()?;
            Ok(document.remove(key))
        })
    }

    #[instrument(skip(self, value), fields(root = %self.root.display()))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_lock(true, || {
            let mut document = self.read_for_update()?;
            document.insert(key.to_string(), value.to_string());
            self.write_document(&document)?;
            debug!("Stored key");
            Ok(())
        })
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn remove(&self, key: &str) -> Result<()> {
        self.with_lock(true, || {
            let mut document = self.read_for_update()?;
            if document.remove(key).is_none() {
                return Ok(());
            }
            self.write_document(&document)?;
            debug!("Removed key");
            Ok(())
        })
    }
}
