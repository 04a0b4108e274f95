use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use wiremock::{MockServer, ResponseTemplate};

/// Run the CLI with an isolated HOME, pointed at the mock server.
///
/// The binary blocks, so it runs off the async runtime driving the mock.
pub async fn run_cli_with_env(args: &[&str], home: &Path, server: &MockServer) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_securecloud"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("SECURECLOUD_API_URL", format!("{}/api/v1", server.uri()));
    // Nothing listens here; only `watch` would connect.
    cmd.env("SECURECLOUD_WS_URL", "ws://127.0.0.1:9");
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");

    tokio::task::spawn_blocking(move || cmd.output())
        .await
        .expect("CLI task panicked")
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_with_env_success(args: &[&str], home: &Path, server: &MockServer) -> String {
    let output = run_cli_with_env(args, home, server).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_with_env_failure(args: &[&str], home: &Path, server: &MockServer) -> String {
    let output = run_cli_with_env(args, home, server).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Create a fresh home directory inside `root`.
pub fn home_in(root: &Path) -> PathBuf {
    let home = root.join("home");
    std::fs::create_dir_all(&home).unwrap();
    home
}

/// A success envelope around `data`.
pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "data": data
    }))
}

pub fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "success": false,
        "error": "Unauthorized",
        "message": "token expired"
    }))
}

pub fn user() -> Value {
    json!({
        "id": "u-1",
        "email": "analyst@example.com",
        "name": "Ana Lyst",
        "role": "analyst"
    })
}
