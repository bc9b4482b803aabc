//! GitHub access behind a trait so the pull request manager and the tag
//! inventory can be exercised without a network.

/// Connection settings for the GitHub API.
pub mod config;

/// GitHub API client implementation using octocrab.
pub mod github;

/// Common trait for forge operations.
pub mod traits;

/// Request and response types shared by forge implementations.
pub mod types;
