//! End-to-end test orchestrator CLI
//!
//! This library drives an external Protractor/Cucumber test runner: it
//! resolves run configuration, builds the runner's command line, spawns the
//! runner process, and merges rerun results back into the original JSON
//! report so downstream tooling sees one consolidated document.

pub mod cli;
pub mod commands;
pub mod common;
pub mod invocation;
pub mod report;
pub mod runner;
pub mod tasks;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use invocation::{InvocationRequest, Overrides};
