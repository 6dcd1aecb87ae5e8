//! Common test utilities shared across integration tests

pub mod helpers;

pub use fixture::TestFixture;
pub use helpers::{assert_paths_eq, git_command, skip_if_no_tmux};
