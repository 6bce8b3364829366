//! State shared between the controller and its interceptors.
//!
//! Every transition that touches both the token store and the session data
//! happens while holding the `data` lock, so consumers never observe a token
//! without the matching state or the reverse. The lock is never held across
//! an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{Error, ErrorKind};
use crate::store::TokenStore;
use crate::tokens::{AccessToken, TokenPair};
use crate::traits::AuthApi;
use crate::types::UserProfile;
use crate::Result;

use super::{Session, SessionEvent, SessionState};

const EVENT_CAPACITY: usize = 32;

pub(crate) type RefreshFuture = Shared<BoxFuture<'static, Result<TokenPair>>>;

/// The refresh in flight and the token it is renewing.
struct InFlight {
    stale: AccessToken,
    future: RefreshFuture,
}

pub(crate) struct SessionInner {
    pub(crate) api: Arc<dyn AuthApi>,
    pub(crate) tokens: TokenStore,
    data: Mutex<SessionData>,
    refresh: Mutex<Option<InFlight>>,
    events: broadcast::Sender<SessionEvent>,
}

struct SessionData {
    state: SessionState,
    user: Option<UserProfile>,
    last_error: Option<ErrorKind>,
    /// Bumped by logout and forced logout so a stale login cannot commit.
    epoch: u64,
}

impl SessionInner {
    pub(crate) fn new(api: Arc<dyn AuthApi>, tokens: TokenStore) -> Self {
        let state = if tokens.is_present() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            api,
            tokens,
            data: Mutex::new(SessionData {
                state,
                user: None,
                last_error: None,
                epoch: 0,
            }),
            refresh: Mutex::new(None),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh_slot(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forget any refresh in flight. Called whenever the held token changes
    /// hands, so an abandoned refresh of an old token is never joined again.
    fn drop_refresh(&self) {
        self.refresh_slot().take();
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn snapshot(&self) -> Session {
        let data = self.lock();
        Session {
            state: data.state,
            authenticated: self.tokens.is_present(),
            current_user: data.user.clone(),
            last_error: data.last_error,
        }
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    pub(crate) fn cached_user(&self) -> Option<UserProfile> {
        self.lock().user.clone()
    }

    /// Record a failure that does not change which token is held.
    pub(crate) fn record_error(&self, err: &Error) {
        let mut data = self.lock();
        data.last_error = Some(err.kind());
        if data.state == SessionState::Anonymous {
            data.state = SessionState::Error;
        }
    }

    pub(crate) fn clear_error(&self) {
        let mut data = self.lock();
        data.last_error = None;
        if data.state == SessionState::Error {
            data.state = SessionState::Anonymous;
        }
    }

    // ========================================================================
    // Login
    // ========================================================================

    /// Enter `Authenticating`, returning the attempt's epoch and the state to
    /// fall back to.
    pub(crate) fn begin_login(&self) -> Result<(u64, SessionState)> {
        let mut data = self.lock();
        if data.state == SessionState::Authenticating {
            return Err(Error::AlreadyInProgress);
        }
        let previous = data.state;
        data.state = SessionState::Authenticating;
        data.epoch += 1;
        Ok((data.epoch, previous))
    }

    pub(crate) fn finish_login(&self, epoch: u64, pair: TokenPair, user: UserProfile) -> Result<()> {
        let mut data = self.lock();
        if data.epoch != epoch || data.state != SessionState::Authenticating {
            debug!("Login superseded by logout, discarding token");
            return Err(Error::SessionExpired);
        }
        self.tokens.set(pair);
        data.state = SessionState::Authenticated;
        data.user = Some(user);
        data.last_error = None;
        drop(data);
        self.drop_refresh();

        self.emit(SessionEvent::LoggedIn);
        Ok(())
    }

    pub(crate) fn fail_login(&self, epoch: u64, err: &Error) {
        let mut data = self.lock();
        if data.epoch != epoch || data.state != SessionState::Authenticating {
            return;
        }
        // A failed re-login keeps the session that was already established.
        data.state = if self.tokens.is_present() {
            SessionState::Authenticated
        } else {
            SessionState::Error
        };
        data.last_error = Some(err.kind());
    }

    pub(crate) fn abandon_login(&self, epoch: u64, previous: SessionState) {
        let mut data = self.lock();
        if data.epoch != epoch || data.state != SessionState::Authenticating {
            return;
        }
        debug!("Login abandoned, restoring previous state");
        data.state = match (self.tokens.is_present(), previous) {
            (true, _) => SessionState::Authenticated,
            (false, SessionState::Error) => SessionState::Error,
            (false, _) => SessionState::Anonymous,
        };
    }

    // ========================================================================
    // Logout
    // ========================================================================

    /// Returns true if a token was held.
    pub(crate) fn logout(&self) -> bool {
        let mut data = self.lock();
        let had_token = self.tokens.is_present();
        self.tokens.clear();
        data.state = SessionState::Anonymous;
        data.user = None;
        data.last_error = None;
        data.epoch += 1;
        drop(data);
        self.drop_refresh();

        if had_token {
            self.emit(SessionEvent::LoggedOut);
        }
        had_token
    }

    /// Forced logout after `stale` could not be renewed. Does nothing if the
    /// token has already been replaced or removed.
    pub(crate) fn expire(&self, stale: &AccessToken) -> bool {
        let mut data = self.lock();
        match self.tokens.get() {
            Some(current) if current.access_token() == stale => {}
            _ => return false,
        }
        self.tokens.clear();
        data.user = None;
        data.last_error = Some(ErrorKind::SessionExpired);
        // A login in flight keeps running; it is the user's way back in.
        if data.state != SessionState::Authenticating {
            data.state = SessionState::Anonymous;
            data.epoch += 1;
        }
        drop(data);
        self.drop_refresh();

        info!("Session expired");
        self.emit(SessionEvent::Expired);
        true
    }

    /// Fall back to `Anonymous` when a restored token turns out to be unusable.
    pub(crate) fn reject_restored(&self, epoch: u64, err: &Error) {
        let mut data = self.lock();
        if data.epoch != epoch || data.state != SessionState::Authenticated {
            return;
        }
        self.tokens.clear();
        data.state = SessionState::Anonymous;
        data.user = None;
        data.last_error = Some(err.kind());
        data.epoch += 1;
        drop(data);
        self.drop_refresh();

        warn!(error = %err, "Restored session rejected by server");
        self.emit(SessionEvent::Expired);
    }

    pub(crate) fn store_user(&self, epoch: u64, user: UserProfile) {
        let mut data = self.lock();
        if data.epoch != epoch || !self.tokens.is_present() {
            return;
        }
        data.user = Some(user);
        drop(data);

        self.emit(SessionEvent::UserLoaded);
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Join the refresh in flight for `stale`, or start one.
    ///
    /// A refresh in flight for any other token is replaced, never joined.
    pub(crate) fn refresh_shared(self: &Arc<Self>, stale: TokenPair) -> RefreshFuture {
        let mut slot = self.refresh_slot();
        if let Some(in_flight) = slot.as_ref() {
            if in_flight.stale == *stale.access_token() {
                debug!("Joining refresh already in flight");
                return in_flight.future.clone();
            }
            debug!("Discarding refresh of a superseded token");
        }

        let inner = Arc::clone(self);
        let token = stale.access_token().clone();
        let future = async move { inner.run_refresh(stale).await }
            .boxed()
            .shared();
        *slot = Some(InFlight {
            stale: token,
            future: future.clone(),
        });
        future
    }

    async fn run_refresh(self: Arc<Self>, stale: TokenPair) -> Result<TokenPair> {
        debug!("Refreshing token");
        let outcome = self.api.refresh(&stale).await;

        let result = match outcome {
            Ok(pair) => self.commit_refresh(&stale, pair),
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                Err(err)
            }
        };

        let mut slot = self.refresh_slot();
        if slot
            .as_ref()
            .is_some_and(|in_flight| in_flight.stale == *stale.access_token())
        {
            slot.take();
        }
        drop(slot);
        result
    }

    fn commit_refresh(&self, stale: &TokenPair, pair: TokenPair) -> Result<TokenPair> {
        let data = self.lock();
        match self.tokens.get() {
            None => {
                debug!("Session ended during refresh, discarding token");
                return Err(Error::SessionExpired);
            }
            Some(current) if current.access_token() == stale.access_token() => {
                self.tokens.set(pair.clone());
            }
            Some(_) => {
                debug!("Token replaced during refresh, keeping newer token");
                return Ok(pair);
            }
        }
        drop(data);

        info!("Token refreshed");
        self.emit(SessionEvent::Refreshed);
        Ok(pair)
    }
}
