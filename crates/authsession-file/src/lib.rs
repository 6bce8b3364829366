//! authsession-file - File-backed persistence for authsession.
//!
//! [`FileStore`] implements [`KeyValueStore`](authsession_core::KeyValueStore)
//! over a single JSON document so a [`TokenStore`](authsession_core::TokenStore)
//! survives process restarts:
//!
//! ```no_run
//! use std::sync::Arc;
//! use authsession_core::TokenStore;
//! use authsession_file::FileStore;
//!
//! let tokens = TokenStore::persistent(Arc::new(FileStore::new("/var/lib/myapp")));
//! ```

mod store;

pub use store::{FileStore, LOCK_FILE, SESSION_FILE};
