//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(session: &CliSession, _args: RefreshTokenArgs) -> Result<()> {
    session.require_login()?;

    output::progress("Refreshing token...");

    session
        .controller
        .refresh()
        .await
        .context("Failed to refresh token")?;

    output::success("Token refreshed successfully");

    Ok(())
}
