//! Bearer token decoration with refresh-on-401.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Error;
use crate::session::SessionInner;
use crate::tokens::{AccessToken, TokenPair};
use crate::Result;

/// Retry bookkeeping carried by each request through the interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// The request has been sent once.
    NotRetried,
    /// The request was retried after a refresh; a further `401` is final.
    RetriedOnce,
}

/// Attaches the stored token to outgoing requests and recovers from a
/// single `401` by refreshing the token and retrying once.
///
/// Obtained from [`SessionController::interceptor`](crate::SessionController::interceptor).
/// At most one refresh is in flight per session: concurrent requests that
/// hit `401` all wait on the same refresh and observe its outcome.
#[derive(Clone)]
pub struct RequestInterceptor {
    inner: Arc<SessionInner>,
}

impl RequestInterceptor {
    pub(crate) fn new(inner: Arc<SessionInner>) -> Self {
        Self { inner }
    }

    /// The token that would be attached to a request sent now.
    pub fn current_token(&self) -> Option<AccessToken> {
        self.inner.tokens.get().map(|pair| pair.access_token().clone())
    }

    /// Run `send` with the current token.
    ///
    /// `send` receives the token to attach (`None` sends the request
    /// unauthenticated) and must report a `401` as [`Error::Unauthorized`].
    /// Any other result is returned unchanged.
    ///
    /// When an authenticated request is rejected, the token is refreshed and
    /// `send` is called once more with the new token. If the refresh fails,
    /// the session is ended and the call fails with `SessionExpired`. A `401`
    /// on the retried request is returned as `Unauthorized`.
    pub async fn execute<T, F, Fut>(&self, mut send: F) -> Result<T>
    where
        F: FnMut(Option<AccessToken>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retry = RetryState::NotRetried;

        loop {
            let attached = self.inner.tokens.get();
            let result = send(attached.as_ref().map(|pair| pair.access_token().clone())).await;

            let unauthorized = matches!(result, Err(Error::Unauthorized));
            let stale = match attached {
                Some(pair) if unauthorized && retry == RetryState::NotRetried => pair,
                _ => return result,
            };

            debug!("Request unauthorized, recovering token");
            self.recover(&stale).await?;
            retry = RetryState::RetriedOnce;
        }
    }

    async fn recover(&self, stale: &TokenPair) -> Result<()> {
        match self.inner.tokens.get() {
            None => return Err(Error::SessionExpired),
            Some(current) if current.access_token() != stale.access_token() => {
                debug!("Token already replaced, retrying with current token");
                return Ok(());
            }
            Some(_) => {}
        }

        match self.inner.refresh_shared(stale.clone()).await {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(error = %err, "Refresh after 401 failed, ending session");
                self.inner.expire(stale.access_token());
                Err(Error::SessionExpired)
            }
        }
    }
}

impl std::fmt::Debug for RequestInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestInterceptor")
            .field("tokens", &self.inner.tokens)
            .finish()
    }
}
