//! Test helper utilities for source-control-provider integration tests
//!
//! This module provides reusable fixtures and helper functions shared across
//! integration test files.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use secrecy::SecretString;
use serde_json::{json, Value};
use source_control_provider::{GitHubConfig, GitHubProvider};
use std::time::Duration;
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "ghp_test_token";
pub const TEST_APP_ID: u64 = 12345;
pub const TEST_INSTALLATION_ID: u64 = 99;
pub const TEST_APP_PRIVATE_KEY: &str = include_str!("fixtures/test_app_key.pem");

/// Token-authenticated config pointed at `server`
pub fn token_config(server: &MockServer) -> GitHubConfig {
    GitHubConfig {
        api_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        ..GitHubConfig::with_token(TEST_TOKEN)
    }
}

/// App-authenticated config pointed at `server`
pub fn app_config(server: &MockServer, installation_id: Option<u64>) -> GitHubConfig {
    GitHubConfig {
        api_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        ..GitHubConfig::with_app(
            TEST_APP_ID,
            SecretString::new(TEST_APP_PRIVATE_KEY.to_string()),
            installation_id,
        )
    }
}

pub fn token_provider(server: &MockServer) -> GitHubProvider {
    GitHubProvider::new(token_config(server)).expect("token provider should build")
}

pub fn app_provider(server: &MockServer, installation_id: Option<u64>) -> GitHubProvider {
    GitHubProvider::new(app_config(server, installation_id)).expect("app provider should build")
}

pub fn repository_json(owner: &str, name: &str) -> Value {
    json!({
        "id": 1296269,
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "owner": { "login": owner, "id": 1 },
        "private": true,
        "html_url": format!("https://github.com/{owner}/{name}"),
        "clone_url": format!("https://github.com/{owner}/{name}.git"),
        "default_branch": "trunk"
    })
}

pub fn pull_request_json(owner: &str, name: &str, number: u64) -> Value {
    json!({
        "number": number,
        "url": format!("https://api.github.com/repos/{owner}/{name}/pulls/{number}"),
        "html_url": format!("https://github.com/{owner}/{name}/pull/{number}"),
        "state": "open",
        "draft": false,
        "head": { "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e" }
    })
}

pub fn installation_token_json(token: &str) -> Value {
    json!({
        "token": token,
        "expires_at": "2099-01-01T00:00:00Z",
        "permissions": { "contents": "write" }
    })
}

pub fn github_error_json(message: &str) -> Value {
    json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    })
}
