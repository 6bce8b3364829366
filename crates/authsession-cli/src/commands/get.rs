//! Authenticated GET command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Path under the API base URL, e.g. /api/v1/items/
    pub path: String,
}

pub async fn run(session: &CliSession, args: GetArgs) -> Result<()> {
    let client = session.authorized()?;

    let body: Value = client
        .get_json(&args.path)
        .await
        .with_context(|| format!("GET {} failed", args.path))?;

    output::json_pretty(&body)
}
