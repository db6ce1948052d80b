//! Provider trait and types for source-control abstraction
//!
//! Defines the `SourceControlProvider` trait that every provider implements,
//! along with the provider-neutral request and response types.

use crate::error::ProviderResult;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repository metadata as reported by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositoryInfo {
    /// Owning user or organization login
    pub owner: String,
    /// Repository name without the owner
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    /// Branch new work is based on unless told otherwise
    pub default_branch: String,
    /// HTTPS clone URL
    pub clone_url: String,
    /// Browser URL
    pub html_url: String,
    pub private: bool,
}

/// Parameters for opening a pull request
///
/// Labels and reviewers are attached after the pull request exists and never
/// cause creation to fail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CreatePullRequest {
    pub owner: String,
    pub repo: String,
    pub title: String,
    pub body: Option<String>,
    /// Branch containing the changes
    pub head: String,
    /// Branch the changes should be merged into
    pub base: String,
    pub draft: bool,
    pub labels: Vec<String>,
    /// User logins to request a review from
    pub reviewers: Vec<String>,
    /// Team slugs to request a review from
    pub team_reviewers: Vec<String>,
}

impl CreatePullRequest {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        title: impl Into<String>,
        head: impl Into<String>,
        base: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            title: title.into(),
            head: head.into(),
            base: base.into(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reviewers<I, S>(mut self, reviewers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reviewers = reviewers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_team_reviewers<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.team_reviewers = teams.into_iter().map(Into::into).collect();
        self
    }
}

/// A pull request that was opened by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    /// API URL of the pull request
    pub url: String,
    /// Browser URL of the pull request
    pub html_url: String,
    pub state: String,
    pub draft: bool,
    pub head_sha: Option<String>,
}

/// Short-lived credential for pushing to a single repository over HTTPS
#[derive(Clone)]
pub struct PushAuthContext {
    /// Basic-auth username to pair with the token
    pub username: String,
    pub token: SecretString,
    /// `None` for credentials that do not expire
    pub expires_at: Option<DateTime<Utc>>,
    /// Remote URL without credentials
    pub remote_url: String,
}

impl PushAuthContext {
    /// Remote URL with the credential embedded, ready for `git push`.
    pub fn authenticated_remote_url(&self) -> SecretString {
        let authenticated = match self.remote_url.split_once("://") {
            Some((scheme, rest)) => format!(
                "{scheme}://{}:{}@{rest}",
                self.username,
                self.token.expose_secret()
            ),
            None => self.remote_url.clone(),
        };
        SecretString::new(authenticated)
    }

    /// Whether the credential expires before `at`.
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= at)
    }
}

impl fmt::Debug for PushAuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushAuthContext")
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("remote_url", &self.remote_url)
            .finish()
    }
}

/// Trait for source-control providers to implement
///
/// Every failure is returned as a classified
/// [`SourceControlProviderError`](crate::error::SourceControlProviderError);
/// implementations never retry on their own.
#[async_trait::async_trait]
pub trait SourceControlProvider: Send + Sync {
    /// Fetch metadata for `owner/repo`
    async fn get_repository(&self, owner: &str, repo: &str) -> ProviderResult<RepositoryInfo>;

    /// Open a pull request, then attach labels and reviewers best-effort
    async fn create_pull_request(&self, request: CreatePullRequest) -> ProviderResult<PullRequest>;

    /// Mint a credential that can push to `owner/repo`
    async fn get_push_auth_context(
        &self,
        owner: &str,
        repo: &str,
    ) -> ProviderResult<PushAuthContext>;

    /// Get provider name for logging and debugging
    fn provider_name(&self) -> &'static str;
}
