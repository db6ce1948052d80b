//! Tests for GitHub Provider Implementation
//!
//! This module contains unit tests for GitHub-specific functionality.


// NOTE: Provider HTTP tests are in tests/github_provider_integration_tests.rs
// These tests use MockServer and are slow, so they don't belong in unit tests
