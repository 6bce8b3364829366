//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(session: &CliSession, _args: LogoutArgs) -> Result<()> {
    if !session.controller.is_authenticated() {
        output::progress("No active session");
        return Ok(());
    }

    session.controller.logout();
    output::success("Logged out");

    Ok(())
}
