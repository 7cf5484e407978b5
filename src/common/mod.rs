//! Common utilities shared across the crate
//!
//! This module contains error types, configuration resolution, and logging
//! setup used by the tasks and the invocation builder.

pub mod config;
pub mod error;
pub mod logging;

pub use config::RunConfig;
pub use error::{Error, Result};
