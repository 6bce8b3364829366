//! reqwest-backed implementation of the auth API.

use async_trait::async_trait;
use tracing::{debug, instrument};

use authsession_core::error::{Error, ResponseError};
use authsession_core::tokens::BEARER;
use authsession_core::{AccessToken, ApiUrl, AuthApi, Credentials, TokenPair, UserProfile};

use crate::api::ApiClient;
use crate::api::endpoints::{
    COULD_NOT_VALIDATE, INACTIVE_USER, LOGIN_ACCESS_TOKEN, LOGIN_REFRESH_TOKEN, LoginForm,
    TokenResponse, USERS_ME,
};
use crate::config::ClientConfig;

/// Issues login, refresh and current-user requests against the REST API.
///
/// Stateless: tokens are always passed in by the caller. Clone is cheap;
/// clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    client: ApiClient,
}

impl HttpAuthClient {
    /// Create a new client for the API described by `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        Ok(Self {
            client: ApiClient::new(config)?,
        })
    }

    /// Returns the API base URL.
    pub fn api_url(&self) -> &ApiUrl {
        self.client.api()
    }
}

/// Validate a token response and turn it into a pair.
fn token_pair(body: TokenResponse) -> Result<TokenPair, Error> {
    if body.access_token.is_empty() {
        return Err(ResponseError::malformed("empty access_token").into());
    }
    if !body.token_type.eq_ignore_ascii_case(BEARER) {
        return Err(ResponseError::malformed(format!(
            "unsupported token_type '{}'",
            body.token_type
        ))
        .into());
    }
    Ok(TokenPair::new(AccessToken::new(body.access_token), BEARER))
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    #[instrument(skip(self, credentials), fields(api = %self.client.api(), identifier = %credentials.identifier()))]
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair, Error> {
        debug!("Requesting access token");

        let form = LoginForm {
            username: credentials.identifier(),
            password: credentials.secret(),
        };
        let response = self.client.post_form(LOGIN_ACCESS_TOKEN, &form).await?;

        let status = response.status();
        if status.is_success() {
            return token_pair(ApiClient::decode(response).await?);
        }

        let detail = ApiClient::error_detail(response).await;
        Err(match status.as_u16() {
            400 if detail.as_deref() == Some(INACTIVE_USER) => Error::InactiveUser,
            400 | 401 => Error::InvalidCredentials,
            code => ResponseError::status(code, detail).into(),
        })
    }

    #[instrument(skip(self, current), fields(api = %self.client.api()))]
    async fn refresh(&self, current: &TokenPair) -> Result<TokenPair, Error> {
        debug!("Requesting token refresh");

        let response = self
            .client
            .post_authed(LOGIN_REFRESH_TOKEN, current.access_token())
            .await?;

        let status = response.status();
        if status.is_success() {
            return token_pair(ApiClient::decode(response).await?);
        }

        let detail = ApiClient::error_detail(response).await;
        Err(match status.as_u16() {
            400 | 401 | 403 => Error::RefreshRejected,
            code => ResponseError::status(code, detail).into(),
        })
    }

    #[instrument(skip(self, token), fields(api = %self.client.api()))]
    async fn fetch_current_user(&self, token: &AccessToken) -> Result<UserProfile, Error> {
        debug!("Fetching current user");

        let response = self.client.get_authed(USERS_ME, token).await?;

        let status = response.status();
        if status.is_success() {
            return ApiClient::decode(response).await;
        }

        let detail = ApiClient::error_detail(response).await;
        Err(match status.as_u16() {
            401 => Error::Unauthorized,
            403 if detail.as_deref() == Some(COULD_NOT_VALIDATE) => Error::Unauthorized,
            403 => Error::Forbidden(detail.unwrap_or_else(|| "forbidden".to_string())),
            400 if detail.as_deref() == Some(INACTIVE_USER) => Error::InactiveUser,
            code => ResponseError::status(code, detail).into(),
        })
    }
}
