//! GitHub provider implementation
//!
//! Talks to the GitHub REST API, authenticating either as a GitHub App
//! (installation access tokens) or with a static token.
//!
//! ## Module Organization
//!
//! - `types`: Request/response structures for the GitHub REST API
//! - `auth`: App JWT signing and installation token bookkeeping
//! - `provider`: Main provider implementation

mod auth;
mod provider;
mod types;

#[cfg(test)]
mod tests;

pub use provider::{GitHubProvider, PUSH_USERNAME};
