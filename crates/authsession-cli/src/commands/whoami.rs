//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the user profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(session: &CliSession, args: WhoamiArgs) -> Result<()> {
    session.require_login()?;

    let user = session
        .controller
        .verify()
        .await
        .context("Failed to fetch current user")?;

    if args.json {
        return output::json_pretty(&user);
    }

    output::field("ID", &user.id.to_string());
    output::field("Email", &user.email);
    output::field("Name", user.display_label());
    if user.is_superuser {
        output::field("Role", "superuser");
    }

    Ok(())
}
