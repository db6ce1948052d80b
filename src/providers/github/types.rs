//! GitHub REST API request and response type definitions

use crate::provider::{PullRequest, RepositoryInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone)]
pub(super) struct GitHubOwner {
    pub login: String,
}

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Deserialize, Clone)]
pub(super) struct GitHubRepository {
    pub name: String,
    pub full_name: String,
    pub owner: GitHubOwner,
    pub default_branch: String,
    pub clone_url: String,
    pub html_url: String,
    #[serde(default)]
    pub private: bool,
}

impl From<GitHubRepository> for RepositoryInfo {
    fn from(repo: GitHubRepository) -> Self {
        Self {
            owner: repo.owner.login,
            name: repo.name,
            full_name: repo.full_name,
            default_branch: repo.default_branch,
            clone_url: repo.clone_url,
            html_url: repo.html_url,
            private: repo.private,
        }
    }
}

/// `POST /repos/{owner}/{repo}/pulls` body
#[derive(Debug, Serialize, Clone)]
pub(super) struct GitHubCreatePullRequest<'a> {
    pub title: &'a str,
    pub head: &'a str,
    pub base: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<&'a str>,
    pub draft: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub(super) struct GitHubPullRequestHead {
    pub sha: String,
}

#[derive(Debug, Deserialize, Clone)]
pub(super) struct GitHubPullRequest {
    pub number: u64,
    pub url: String,
    pub html_url: String,
    pub state: String,
    #[serde(default)]
    pub draft: bool,
    pub head: Option<GitHubPullRequestHead>,
}

impl From<GitHubPullRequest> for PullRequest {
    fn from(pr: GitHubPullRequest) -> Self {
        Self {
            number: pr.number,
            url: pr.url,
            html_url: pr.html_url,
            state: pr.state,
            draft: pr.draft,
            head_sha: pr.head.map(|head| head.sha),
        }
    }
}

/// `POST /repos/{owner}/{repo}/issues/{number}/labels` body
#[derive(Debug, Serialize, Clone)]
pub(super) struct GitHubAddLabels<'a> {
    pub labels: &'a [String],
}

/// `POST /repos/{owner}/{repo}/pulls/{number}/requested_reviewers` body
#[derive(Debug, Serialize, Clone)]
pub(super) struct GitHubRequestReviewers<'a> {
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub reviewers: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub team_reviewers: &'a [String],
}

/// `GET /repos/{owner}/{repo}/installation`
#[derive(Debug, Deserialize, Clone)]
pub(super) struct GitHubInstallation {
    pub id: u64,
}

/// `POST /app/installations/{id}/access_tokens` body
#[derive(Debug, Serialize, Clone, Default)]
pub(super) struct GitHubCreateInstallationToken<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<&'a [&'a str]>,
}

#[derive(Debug, Deserialize, Clone)]
pub(super) struct GitHubInstallationToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}
