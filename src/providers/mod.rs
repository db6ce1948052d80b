//! Source-control provider implementations
//!
//! - **github**: GitHub REST API, authenticated as a GitHub App or with a token
//!
//! [`create_provider`] builds the provider named by a [`SourceControlConfig`].

pub mod github;

#[cfg(test)]
mod tests;

use crate::config::SourceControlConfig;
use crate::error::ProviderResult;
use crate::logging::log_debug;
use crate::provider::SourceControlProvider;
use std::sync::Arc;

// Re-export the provider structs
pub use github::GitHubProvider;

/// Build the provider selected by `config`
///
/// # Errors
///
/// Returns a permanent error when the provider configuration is invalid.
pub fn create_provider(
    config: &SourceControlConfig,
) -> ProviderResult<Arc<dyn SourceControlProvider>> {
    log_debug!(
        provider = config.provider().provider_name(),
        base_url = %config.provider().base_url(),
        "Creating source control provider"
    );

    match config {
        SourceControlConfig::GitHub(github) => Ok(Arc::new(GitHubProvider::new(github.clone())?)),
    }
}
