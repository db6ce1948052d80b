// Test modules for source-control-provider crate
//
// Test organization follows the template pattern where each source file
// has a corresponding test file that focuses on business logic verification.

// Test helper utilities
pub mod helpers;

// Core unit tests (template compliant)
pub mod config;

// NOTE: Provider HTTP tests are in tests/github_provider_integration_tests.rs
// They start MockServers, so they don't belong in unit tests
