// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for Luminous
//!
//! Orchestration entry points swallow runtime failures into `None`/`false`
//! after logging them; these types are what flows underneath.

use thiserror::Error;

/// Main error type for Luminous operations
#[derive(Error, Debug)]
pub enum LuminousError {
    /// External model runtime errors
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(String),

    /// Invalid input (unknown task type, malformed model spec, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A prompt ran to completion without producing a response
    #[error("No response from model: {0}")]
    NoResponse(String),
}

/// Failures reported by the external model runtime
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The runtime binary could not be spawned
    #[error("Runtime binary not found: {0}")]
    NotInstalled(String),

    /// The runtime did not finish within the allotted time
    #[error("Runtime timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The runtime exited with a nonzero status
    #[error("Runtime exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },

    /// Pipe or process IO failure
    #[error("Runtime IO error: {0}")]
    Io(String),
}

impl RuntimeError {
    /// Whether this failure was a timeout (drives timeout-specific retries)
    pub fn is_timeout(&self) -> bool {
        matches!(self, RuntimeError::Timeout { .. })
    }
}

/// Result type alias for Luminous operations
pub type Result<T> = std::result::Result<T, LuminousError>;

impl From<toml::de::Error> for LuminousError {
    fn from(err: toml::de::Error) -> Self {
        LuminousError::Toml(err.to_string())
    }
}
