//! HTTP client for the REST API.

use reqwest::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use authsession_core::error::{Error, ResponseError, TransportError};
use authsession_core::{AccessToken, ApiUrl};

use crate::config::ClientConfig;

use super::endpoints::ErrorResponse;

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn map_transport(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Network(transport)
}

/// Thin wrapper over `reqwest::Client` bound to one API base URL.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    client: reqwest::Client,
    api: ApiUrl,
}

impl ApiClient {
    /// Create a new client from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(map_transport)?;

        Ok(Self {
            client,
            api: config.api_url.clone(),
        })
    }

    /// Returns the underlying reqwest client.
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Returns the API base URL this client is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// POST a form-encoded body without authentication.
    #[instrument(skip(self, form), fields(api = %self.api))]
    pub async fn post_form<B>(&self, path: &str, form: &B) -> Result<Response, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.api.endpoint(path);
        debug!(%url, "POST form");

        let response = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(map_transport)?;

        trace!(status = %response.status(), "response");
        Ok(response)
    }

    /// POST with a bearer token and no body.
    #[instrument(skip(self, token), fields(api = %self.api))]
    pub async fn post_authed(&self, path: &str, token: &AccessToken) -> Result<Response, Error> {
        let url = self.api.endpoint(path);
        debug!(%url, "POST authenticated");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(map_transport)?;

        trace!(status = %response.status(), "response");
        Ok(response)
    }

    /// GET with a bearer token.
    #[instrument(skip(self, token), fields(api = %self.api))]
    pub async fn get_authed(&self, path: &str, token: &AccessToken) -> Result<Response, Error> {
        let url = self.api.endpoint(path);
        debug!(%url, "GET authenticated");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(map_transport)?;

        trace!(status = %response.status(), "response");
        Ok(response)
    }

    /// Decode a successful response body.
    ///
    /// A body that is not valid JSON or lacks required fields is an
    /// `UnexpectedResponse`, not a transport error.
    pub async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, Error> {
        let body = response.text().await.map_err(map_transport)?;
        serde_json::from_str(&body)
            .map_err(|e| ResponseError::malformed(format!("invalid response body: {}", e)).into())
    }

    /// Read the `detail` of an error response, if there is one.
    pub async fn error_detail(response: Response) -> Option<String> {
        match response.json::<ErrorResponse>().await {
            Ok(body) => body.message(),
            Err(_) => None,
        }
    }
}
