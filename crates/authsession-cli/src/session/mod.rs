//! Session wiring for CLI commands.

pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use authsession_core::{ApiUrl, SessionController, TokenStore};
use authsession_http::{AuthorizedClient, ClientConfig, HttpAuthClient};

use crate::cli::Cli;

/// A controller over the token persisted in the user's data directory.
pub struct CliSession {
    pub controller: SessionController,
    config: ClientConfig,
}

impl CliSession {
    /// Open the persisted session for the API named on the command line.
    #[instrument(skip(cli), fields(api = %cli.api_url))]
    pub fn open(cli: &Cli) -> Result<Self> {
        let api_url = ApiUrl::new(&cli.api_url).context("Invalid API URL")?;

        let mut config = ClientConfig::new(api_url);
        if let Some(secs) = cli.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        let api = HttpAuthClient::new(&config).context("Failed to create HTTP client")?;
        let store = storage::file_store()?;
        let tokens = TokenStore::persistent(Arc::new(store));
        debug!(restored = tokens.is_present(), "Opened session store");

        Ok(Self {
            controller: SessionController::new(Arc::new(api), tokens),
            config,
        })
    }

    /// Fail unless a token is stored.
    pub fn require_login(&self) -> Result<()> {
        self.controller
            .require_authenticated()
            .context("No active session. Run 'authsession login' first.")
    }

    /// A client whose requests carry the stored token.
    pub fn authorized(&self) -> Result<AuthorizedClient> {
        AuthorizedClient::new(&self.config, &self.controller)
            .context("Failed to create HTTP client")
    }

    pub fn api_url(&self) -> &ApiUrl {
        &self.config.api_url
    }
}
