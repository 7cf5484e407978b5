//! Error types for the e2e CLI
//!
//! Configuration and argument-building errors abort before anything is
//! spawned; stitching errors abort the rerun pass; runner failures are not
//! errors here at all (they are captured to an error file by the process
//! runner so the task chain can continue).

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the e2e CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file '{path}': {message}")]
    ConfigParse { path: String, message: String },

    #[error("Runner executable '{name}' not found: {reason}")]
    RunnerNotFound { name: String, reason: String },

    // === File System Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    #[error("Failed to create output directory '{path}': {error}")]
    OutputDir { path: String, error: String },

    // === Report Stitching Errors ===
    #[error("Missing report: {0}")]
    MissingReport(String),

    #[error("Ambiguous {kind} reports in '{dir}': {matches}")]
    AmbiguousReports {
        kind: &'static str,
        dir: String,
        matches: String,
    },

    #[error("Report integrity violation: scenario '{0}' disappeared during merge")]
    ReportIntegrity(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a file read error for a path
    pub fn file_read(path: &Path, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file write error for a path
    pub fn file_write(path: &Path, error: impl std::fmt::Display) -> Self {
        Self::FileWrite {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a config parse error for a path
    pub fn config_parse(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::ConfigParse {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create an ambiguous-reports error listing the conflicting files
    pub fn ambiguous_reports(kind: &'static str, dir: &Path, matches: &[std::path::PathBuf]) -> Self {
        Self::AmbiguousReports {
            kind,
            dir: dir.display().to_string(),
            matches: matches
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
