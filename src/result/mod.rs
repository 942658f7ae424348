// execdemo/src/result/mod.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Outcome of a submission and the single slot that holds the current one.

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Decoded `/exec` response, or the reason there is none.
///
/// Serializes as the response value itself, or as `{"error": "<message>"}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ExecResult {
    /// Submission failed before a JSON value could be produced.
    Error {
        #[serde(rename = "error")]
        message: String,
    },
    /// The response body, exactly as parsed.
    Value(Value),
}

impl ExecResult {
    /// Creates an error result. An empty message is replaced so the error is never blank.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "unknown error".to_string()
        } else {
            message
        };
        ExecResult::Error { message }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ExecResult::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ExecResult::Error { message } => Some(message),
            ExecResult::Value(_) => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ExecResult::Value(value) => Some(value),
            ExecResult::Error { .. } => None,
        }
    }
}

impl From<Value> for ExecResult {
    fn from(value: Value) -> Self {
        ExecResult::Value(value)
    }
}

/// Holder of the one visible result.
///
/// Cloning shares the slot. Every `set` replaces the previous content outright,
/// so when several submissions race the last one to resolve is what remains.
#[derive(Clone, Default)]
pub struct ResultSlot {
    current: Arc<RwLock<Option<ExecResult>>>,
    generation: Arc<AtomicU64>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current result and returns the new generation number.
    pub async fn set(&self, result: ExecResult) -> u64 {
        let mut guard = self.current.write().await;
        *guard = Some(result);
        // Bumped under the write lock so generation order matches write order.
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub async fn get(&self) -> Option<ExecResult> {
        self.current.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
    }

    /// Number of `set` calls so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
