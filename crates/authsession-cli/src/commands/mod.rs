//! Subcommand implementations.

pub mod get;
pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod status;
pub mod whoami;

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::session::CliSession;

pub async fn handle(cli: Cli) -> Result<()> {
    let session = CliSession::open(&cli)?;

    match cli.command {
        Commands::Login(args) => login::run(&session, args).await,
        Commands::Logout(args) => logout::run(&session, args),
        Commands::Whoami(args) => whoami::run(&session, args).await,
        Commands::Status(args) => status::run(&session, args),
        Commands::RefreshToken(args) => refresh_token::run(&session, args).await,
        Commands::Get(args) => get::run(&session, args).await,
    }
}
