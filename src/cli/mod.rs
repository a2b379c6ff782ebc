//! CLI command handlers for Bistro UI.
//!
//! Headless, scriptable access to the page controllers for automation,
//! testing and CI.

pub mod common;
pub mod config;
pub mod replay;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use replay::ReplayArgs;
