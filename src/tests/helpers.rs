//! Test helper utilities for source-control-provider unit tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

#![allow(dead_code)]

use std::fmt;

/// Private key used wherever a syntactically valid App key is needed
pub const TEST_APP_PRIVATE_KEY: &str = include_str!("../../tests/fixtures/test_app_key.pem");

/// Error with an optional nested source, for exercising chain inspection
#[derive(Debug)]
pub struct LayeredError {
    pub message: String,
    pub source: Option<Box<LayeredError>>,
}

impl LayeredError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            source: None,
        }
    }

    pub fn caused_by(message: &str, source: LayeredError) -> Self {
        Self {
            message: message.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for LayeredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LayeredError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Boxed cause carrying only `message`
pub fn cause(message: &str) -> Option<crate::error::BoxError> {
    Some(Box::new(LayeredError::new(message)))
}

/// Remove every environment variable the config loader reads
pub fn clear_source_control_env() {
    for name in [
        "SOURCE_CONTROL_PROVIDER",
        "GITHUB_API_URL",
        "GITHUB_WEB_URL",
        "GITHUB_TOKEN",
        "GITHUB_APP_ID",
        "GITHUB_APP_PRIVATE_KEY",
        "GITHUB_APP_INSTALLATION_ID",
        "GITHUB_REQUEST_TIMEOUT_MS",
        "GITHUB_USER_AGENT",
    ] {
        std::env::remove_var(name);
    }
}
