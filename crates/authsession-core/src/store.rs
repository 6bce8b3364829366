//! The process-wide token store.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::tokens::{PersistedTokens, TokenPair};
use crate::traits::KeyValueStore;

/// Key under which the token pair is persisted.
pub const TOKEN_KEY: &str = "access_token";

/// Holds the current [`TokenPair`], optionally writing through to a
/// [`KeyValueStore`] so the session survives a restart.
///
/// All operations are synchronous. Token contents are never validated.
/// The in-memory value is authoritative for the running process: a failing
/// persistence backend is logged and does not block `set` or `clear`.
pub struct TokenStore {
    current: RwLock<Option<TokenPair>>,
    backend: Option<Arc<dyn KeyValueStore>>,
}

impl TokenStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(None),
            backend: None,
        }
    }

    /// A store backed by `backend`, restoring any previously persisted pair.
    ///
    /// An unreadable record is logged and treated as absent.
    pub fn persistent(backend: Arc<dyn KeyValueStore>) -> Self {
        let restored = match backend.get(TOKEN_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedTokens>(&raw) {
                Ok(record) => {
                    debug!(saved_at = %record.saved_at, "Restored persisted token");
                    Some(record.into_pair())
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable persisted token");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                None
            }
        };

        Self {
            current: RwLock::new(restored),
            backend: Some(backend),
        }
    }

    /// Store `pair`, replacing any existing one.
    pub fn set(&self, pair: TokenPair) {
        if let Some(backend) = &self.backend {
            let persisted = serde_json::to_string(&PersistedTokens::from_pair(&pair));
            match persisted {
                Ok(json) => {
                    if let Err(e) = backend.set(TOKEN_KEY, &json) {
                        warn!(error = %e, "Failed to persist token");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to encode token"),
            }
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(pair);
    }

    /// Returns the current pair, if any.
    pub fn get(&self) -> Option<TokenPair> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns true if a pair is held.
    pub fn is_present(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Remove the current pair.
    pub fn clear(&self) {
        if let Some(backend) = &self.backend
            && let Err(e) = backend.remove(TOKEN_KEY)
        {
            warn!(error = %e, "Failed to remove persisted token");
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("present", &self.is_present())
            .field("persistent", &self.backend.is_some())
            .finish()
    }
}
