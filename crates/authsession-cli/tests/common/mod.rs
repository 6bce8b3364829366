#![allow(dead_code)]

use std::path::Path;
use std::process::Output;

use serde_json::{Value, json};
use tokio::process::Command;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EMAIL: &str = "test@test.com";
pub const PASSWORD: &str = "password123";

/// Run the CLI with an isolated HOME against `api_url`.
pub async fn run_cli(args: &[&str], home: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_authsession"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("AUTHSESSION_API_URL", api_url);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("AUTHSESSION_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd.output().await.expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], home: &Path, api_url: &str) -> String {
    let output = run_cli(args, home, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn token_body(token: &str) -> Value {
    json!({ "access_token": token, "token_type": "bearer" })
}

/// Mount login and `/users/me` for the test account, issuing `tok-1`.
pub async fn mount_account(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/login/access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "email": EMAIL,
            "full_name": "Test User",
            "is_active": true,
            "is_superuser": false
        })))
        .mount(server)
        .await;
}
