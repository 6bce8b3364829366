//! Status command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the session snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(session: &CliSession, args: StatusArgs) -> Result<()> {
    let snapshot = session.controller.session();

    if args.json {
        return output::json_pretty(&snapshot);
    }

    output::field("State", &snapshot.state.to_string());
    output::field("Authenticated", if snapshot.authenticated { "yes" } else { "no" });
    output::field("API", session.api_url().as_str());

    Ok(())
}
