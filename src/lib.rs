//! # source-control-provider
//!
//! Pluggable source-control provider abstraction with a GitHub REST
//! implementation.
//!
//! ## Key Features
//!
//! - **Repository metadata**: default branch, clone and web URLs
//! - **Pull requests**: creation with best-effort labels and reviewers
//! - **Push credentials**: short-lived GitHub App installation tokens scoped to one repository
//! - **Retry signalling**: every failure is classified `transient` or `permanent`
//!
//! ## Example
//!
//! ```rust,no_run
//! use source_control_provider::{create_provider, SourceControlConfig, CreatePullRequest};
//!
//! # async fn example() -> Result<(), source_control_provider::SourceControlProviderError> {
//! let config = SourceControlConfig::from_environment()?;
//! let provider = create_provider(&config)?;
//!
//! let repo = provider.get_repository("octocat", "hello-world").await?;
//! let request = CreatePullRequest::new(
//!     "octocat",
//!     "hello-world",
//!     "Update docs",
//!     "docs",
//!     &repo.default_branch,
//! )
//! .with_labels(["documentation"]);
//!
//! match provider.create_pull_request(request).await {
//!     Ok(pr) => println!("opened #{}", pr.number),
//!     Err(err) if err.is_retryable() => println!("try again later: {err}"),
//!     Err(err) => return Err(err),
//! }
//! # Ok(())
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod providers;

#[cfg(test)]
pub mod tests;

pub use config::{GitHubAuth, GitHubConfig, ProviderConfig, SourceControlConfig};
pub use error::{
    classify_cause, classify_message, classify_status, ErrorType, ProviderResult,
    SourceControlProviderError,
};
pub use provider::{
    CreatePullRequest, PullRequest, PushAuthContext, RepositoryInfo, SourceControlProvider,
};
pub use providers::{create_provider, GitHubProvider};
