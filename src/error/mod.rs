// execdemo/src/error/mod.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Centralized error handling for execdemo.
//!
//! Uses `thiserror` to define structured errors and `anyhow` for convenient propagation.
//! Library modules return `Result<T, ExecError>`; `main` works with `anyhow::Result<T>`.
//!
//! Submission failures are deliberately *not* represented here: they end up in
//! [`crate::result::ExecResult::Error`] so the presentation layer can show them.

use std::path::PathBuf;
use thiserror::Error;

/// The root error type for all execdemo failures.
#[derive(Error, Debug)]
pub enum ExecError {
    /// General-purpose error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error with associated path for better diagnostics
    #[error("I/O error at {path:?}: {source}")]
    IoWithPath {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Configuration loading or parsing error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client construction error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The `/exec` endpoint is not a usable URL.
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        endpoint: String,
        reason: String,
    },

    /// Command name outside of `query`, `product`, `customer`, `order`.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Malformed form-encoded body.
    #[error("Form decoding error: {0}")]
    Form(String),

    /// Invalid or unreadable package manifest.
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// A build output required by the packaging step is absent.
    #[error("{} did not exist.", .0.display())]
    MissingArtifact(PathBuf),
}

impl ExecError {
    /// Creates an `IoWithPath` error from a path and an I/O error.
    pub fn io_with_path<E: Into<std::io::Error>>(path: impl Into<PathBuf>, source: E) -> Self {
        Self::IoWithPath {
            source: source.into(),
            path: path.into(),
        }
    }
}

/// Convenient alias for `Result<T, ExecError>`.
pub type Result<T> = std::result::Result<T, ExecError>;

// Re-export `anyhow::Result` as `AnyResult` for top-level use
pub use anyhow::Result as AnyResult;
