//! The session controller.

use std::sync::Arc;

use futures_core::Stream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::credentials::Credentials;
use crate::error::Error;
use crate::interceptor::RequestInterceptor;
use crate::store::TokenStore;
use crate::tokens::TokenPair;
use crate::traits::AuthApi;
use crate::types::UserProfile;
use crate::Result;

use super::{Session, SessionEvent, SessionInner, SessionState};

/// Owns the authentication state of the process.
///
/// The controller is the single source of truth for "is a user currently
/// authenticated": it is the only writer of both the [`TokenStore`] and the
/// [`Session`]. Consumers (a login form, a route guard, an HTTP layer) are
/// handed a clone of the controller or a [`RequestInterceptor`] obtained from
/// it; there is no global session.
///
/// # Thread Safety
///
/// Controllers are cheap to clone (they use internal `Arc`) and are safe to
/// share across tasks.
///
/// # Concurrency
///
/// A second [`login`](Self::login) while one is in flight fails with
/// [`Error::AlreadyInProgress`] and leaves the running attempt untouched.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<SessionInner>,
}

impl SessionController {
    /// Create a controller over `tokens`.
    ///
    /// The initial state is `Anonymous` if the store is empty, otherwise
    /// `Authenticated` without a user profile; call [`verify`](Self::verify)
    /// or [`spawn_verify`](Self::spawn_verify) to confirm a restored token.
    pub fn new(api: Arc<dyn AuthApi>, tokens: TokenStore) -> Self {
        let inner = SessionInner::new(api, tokens);
        debug!(restored = inner.tokens.is_present(), "Session controller created");
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns a snapshot of the session.
    pub fn session(&self) -> Session {
        self.inner.snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.inner.snapshot().state
    }

    /// True iff a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.inner.tokens.is_present()
    }

    /// Route-guard check: fails with `Unauthorized` when no token is held.
    pub fn require_authenticated(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }

    /// The current token pair, for callers that build requests themselves.
    pub fn token(&self) -> Option<TokenPair> {
        self.inner.tokens.get()
    }

    /// An interceptor bound to this controller's session.
    pub fn interceptor(&self) -> RequestInterceptor {
        RequestInterceptor::new(Arc::clone(&self.inner))
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.subscribe()
    }

    /// Session events as a stream. Observers that fall behind skip the
    /// events they missed.
    pub fn events(&self) -> impl Stream<Item = SessionEvent> + Send + 'static {
        let mut receiver = self.inner.subscribe();
        async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Session event observer lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    /// Authenticate with `credentials`.
    ///
    /// On success the token pair is stored and the user's profile is
    /// cached. On failure the store is left as it was and the error is
    /// recorded in [`Session::last_error`].
    ///
    /// If the returned future is dropped before completing, nothing is
    /// written and the session returns to its previous state.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInProgress` if another login is running, otherwise the
    /// error reported by the API.
    #[instrument(skip(self, credentials), fields(identifier = %credentials.identifier()))]
    pub async fn login(&self, credentials: Credentials) -> Result<UserProfile> {
        let attempt = LoginAttempt::begin(&self.inner)?;

        if let Err(err) = credentials.validate() {
            attempt.fail(&err);
            return Err(err);
        }
        info!("Logging in");

        let outcome = async {
            let pair = self.inner.api.login(&credentials).await?;
            let user = self.inner.api.fetch_current_user(pair.access_token()).await?;
            Ok::<_, Error>((pair, user))
        }
        .await;

        match outcome {
            Ok((pair, user)) => {
                attempt.succeed(pair, user.clone())?;
                info!(user_id = user.id, "Logged in");
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "Login failed");
                attempt.fail(&err);
                Err(err)
            }
        }
    }

    /// Log out. Safe to call repeatedly; later calls are no-ops.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        if self.inner.logout() {
            info!("Logged out");
        }
    }

    /// Forget the last recorded error, leaving `Error` for `Anonymous`.
    pub fn clear_error(&self) {
        self.inner.clear_error();
    }

    /// Exchange the current token for a new one.
    ///
    /// Shares the refresh with any request that is already recovering from
    /// a `401`. A transient failure keeps the session; any other failure
    /// ends it.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        let stale = self.inner.tokens.get().ok_or(Error::Unauthorized)?;

        match self.inner.refresh_shared(stale.clone()).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_transient() => {
                self.inner.record_error(&err);
                Err(err)
            }
            Err(err) => {
                self.inner.expire(stale.access_token());
                Err(err)
            }
        }
    }

    /// The current user, from cache or fetched through the interceptor.
    ///
    /// Fails fast with `Unauthorized`, without a network call, when no token
    /// is held.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let cached = self.inner.cached_user();
        if let Some(user) = cached {
            return Ok(user);
        }
        self.fetch_user().await
    }

    /// Confirm the held token by fetching the user.
    ///
    /// A token the server rejects sends the session back to `Anonymous`;
    /// other failures are recorded and the session is kept.
    #[instrument(skip(self))]
    pub async fn verify(&self) -> Result<UserProfile> {
        let epoch = self.inner.epoch();

        match self.fetch_user().await {
            Ok(user) => Ok(user),
            Err(err @ (Error::Unauthorized | Error::InactiveUser)) => {
                self.inner.reject_restored(epoch, &err);
                Err(err)
            }
            Err(err @ Error::SessionExpired) => Err(err),
            Err(err) => {
                self.inner.record_error(&err);
                Err(err)
            }
        }
    }

    /// Run [`verify`](Self::verify) in the background.
    pub fn spawn_verify(&self) -> JoinHandle<Result<UserProfile>> {
        let controller = self.clone();
        tokio::spawn(async move { controller.verify().await })
    }

    async fn fetch_user(&self) -> Result<UserProfile> {
        let epoch = self.inner.epoch();
        let api = Arc::clone(&self.inner.api);

        let user = self
            .interceptor()
            .execute(move |token| {
                let api = Arc::clone(&api);
                async move {
                    match token {
                        Some(token) => api.fetch_current_user(&token).await,
                        None => Err(Error::Unauthorized),
                    }
                }
            })
            .await?;

        self.inner.store_user(epoch, user.clone());
        Ok(user)
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.inner.snapshot();
        f.debug_struct("SessionController")
            .field("state", &session.state)
            .field("authenticated", &session.authenticated)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

/// An in-flight login. Dropping it unsettled restores the previous state.
struct LoginAttempt<'a> {
    inner: &'a SessionInner,
    epoch: u64,
    previous: SessionState,
    settled: bool,
}

impl<'a> LoginAttempt<'a> {
    fn begin(inner: &'a SessionInner) -> Result<Self> {
        let (epoch, previous) = inner.begin_login()?;
        Ok(Self {
            inner,
            epoch,
            previous,
            settled: false,
        })
    }

    fn succeed(mut self, pair: TokenPair, user: UserProfile) -> Result<()> {
        self.settled = true;
        self.inner.finish_login(self.epoch, pair, user)
    }

    fn fail(mut self, err: &Error) {
        self.settled = true;
        self.inner.fail_login(self.epoch, err);
    }
}

impl Drop for LoginAttempt<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.inner.abandon_login(self.epoch, self.previous);
        }
    }
}
