//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use authsession_core::Credentials;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Email address to authenticate with
    #[arg(long)]
    pub identifier: String,

    /// Account password
    #[arg(long, env = "AUTHSESSION_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(session: &CliSession, args: LoginArgs) -> Result<()> {
    let credentials = Credentials::new(&args.identifier, &args.password);

    output::progress("Logging in...");

    let user = session
        .controller
        .login(credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", &user.email);
    output::field("Name", user.display_label());
    output::field("API", session.api_url().as_str());

    Ok(())
}
