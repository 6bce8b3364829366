//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{get, login, logout, refresh_token, status, whoami};

/// Log in to a REST API and send authenticated requests.
#[derive(Parser, Debug)]
#[command(name = "authsession")]
#[command(author, version = env!("AUTHSESSION_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(
        long,
        global = true,
        env = "AUTHSESSION_API_URL",
        default_value = "http://localhost:8000"
    )]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the access token
    Login(login::LoginArgs),

    /// Forget the stored access token
    Logout(logout::LogoutArgs),

    /// Show the user the stored token belongs to
    Whoami(whoami::WhoamiArgs),

    /// Show the local session state without contacting the API
    Status(status::StatusArgs),

    /// Exchange the stored token for a new one
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Send an authenticated GET request and print the JSON response
    Get(get::GetArgs),
}
