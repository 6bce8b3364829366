//! Authenticated requests to arbitrary API endpoints.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use authsession_core::error::{Error, ResponseError};
use authsession_core::{ApiUrl, RequestInterceptor, SessionController};

use crate::api::{ApiClient, map_transport};
use crate::config::ClientConfig;

/// A reqwest client whose requests go through a session's interceptor.
///
/// The stored token is attached as a bearer header. A `401` on an
/// authenticated request triggers one shared refresh and a single retry;
/// every other response is handed back as is.
#[derive(Debug, Clone)]
pub struct AuthorizedClient {
    client: ApiClient,
    interceptor: RequestInterceptor,
}

impl AuthorizedClient {
    pub fn new(config: &ClientConfig, controller: &SessionController) -> Result<Self, Error> {
        Ok(Self {
            client: ApiClient::new(config)?,
            interceptor: controller.interceptor(),
        })
    }

    /// Returns the API base URL.
    pub fn api_url(&self) -> &ApiUrl {
        self.client.api()
    }

    /// Absolute URL for `path` under the API base.
    pub fn url(&self, path: &str) -> String {
        self.client.api().endpoint(path)
    }

    /// Send the request produced by `build`.
    ///
    /// `build` may be called twice: once for the first attempt and once more
    /// for the retry after a refresh. A final `401` is returned as
    /// [`Error::Unauthorized`]; any other status comes back as the response.
    pub async fn send<F>(&self, build: F) -> Result<Response, Error>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        self.interceptor
            .execute(|token| {
                let mut request = build(self.client.http());
                if let Some(token) = &token {
                    request = request.bearer_auth(token.as_str());
                }
                async move {
                    let response = request.send().await.map_err(map_transport)?;
                    if response.status() == StatusCode::UNAUTHORIZED {
                        debug!(url = %response.url(), "Request rejected with 401");
                        return Err(Error::Unauthorized);
                    }
                    Ok(response)
                }
            })
            .await
    }

    /// `GET` a path under the API base.
    #[instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response, Error> {
        let url = self.url(path);
        self.send(|http| http.get(&url)).await
    }

    /// `GET` a path and decode a JSON body.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, Error> {
        let response = self.get(path).await?;
        Self::json(response).await
    }

    /// `POST` a JSON body and decode a JSON response.
    #[instrument(skip(self, body))]
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self.send(|http| http.post(&url).json(body)).await?;
        Self::json(response).await
    }

    async fn json<R: DeserializeOwned>(response: Response) -> Result<R, Error> {
        let status = response.status();
        if status.is_success() {
            return ApiClient::decode(response).await;
        }

        let detail = ApiClient::error_detail(response).await;
        Err(match status {
            StatusCode::FORBIDDEN => {
                Error::Forbidden(detail.unwrap_or_else(|| "forbidden".to_string()))
            }
            status => ResponseError::status(status.as_u16(), detail).into(),
        })
    }
}
