//! Remote authentication API trait.

use async_trait::async_trait;

use crate::types::UserProfile;
use crate::{AccessToken, Credentials, Result, TokenPair};

/// Requests against the remote authentication API.
///
/// Implementations are stateless: every token they need is passed in by the
/// caller, and they never retry. Retry policy belongs to the
/// [`RequestInterceptor`](crate::RequestInterceptor) and the
/// [`SessionController`](crate::SessionController).
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token pair.
    ///
    /// Fails with `InvalidCredentials` when the server rejects them.
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair>;

    /// Exchange a (possibly expired) token pair for a new one.
    ///
    /// Fails with `RefreshRejected` when the server declines renewal.
    async fn refresh(&self, current: &TokenPair) -> Result<TokenPair>;

    /// Fetch the profile of the user the token belongs to.
    ///
    /// Fails with `Unauthorized` when the token is rejected.
    async fn fetch_current_user(&self, token: &AccessToken) -> Result<UserProfile>;
}
