// execdemo/src/submitter/mod.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Client side of the `/exec` endpoint.
//!
//! A submission is a single form-encoded POST. Whatever happens to it ends up
//! as an [`ExecResult`]: the parsed JSON body on success, an error message
//! otherwise. There is no retry, backoff or timeout, and nothing prevents a
//! second submission while the first is still in flight.

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use crate::command::Command;
use crate::config::ClientConfig;
use crate::error::{ExecError, Result as ExecdemoResult};
use crate::form;
use crate::result::{ExecResult, ResultSlot};

pub struct CommandSubmitter {
    client: reqwest::Client,
    endpoint: Url,
}

impl CommandSubmitter {
    /// Creates a submitter bound to a fixed endpoint.
    pub fn new(endpoint: &str) -> ExecdemoResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| ExecError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ExecError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        let client = reqwest::Client::builder().build()?;

        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &ClientConfig) -> ExecdemoResult<Self> {
        Self::new(&config.endpoint)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends `command` and returns the decoded response or the failure message.
    pub async fn submit(&self, command: &Command) -> ExecResult {
        let kind = command.kind();
        tracing::debug!(command = %kind, endpoint = %self.endpoint, "Submitting command");

        let response = match self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, form::CONTENT_TYPE)
            .body(command.to_form_body())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(command = %kind, "Request failed: {}", e);
                return ExecResult::error(format!("request failed: {}", e));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(command = %kind, %status, "Failed to read response body: {}", e);
                return ExecResult::error(format!("failed to read response body: {}", e));
            }
        };

        match serde_json::from_str(&body) {
            Ok(value) => {
                tracing::debug!(command = %kind, %status, "Received response");
                ExecResult::Value(value)
            }
            Err(e) => {
                tracing::warn!(command = %kind, %status, "Response is not valid JSON: {}", e);
                ExecResult::error(format!("invalid JSON response (status {}): {}", status, e))
            }
        }
    }

    /// Submits `command` and stores the outcome in `slot`, replacing whatever was there.
    ///
    /// Returns the slot generation written by this submission.
    pub async fn submit_into(&self, command: &Command, slot: &ResultSlot) -> u64 {
        let result = self.submit(command).await;
        slot.set(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_garbage_endpoint() {
        let err = CommandSubmitter::new("not a url").err().unwrap();
        assert!(matches!(err, ExecError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_new_rejects_non_http_scheme() {
        let err = CommandSubmitter::new("ftp://127.0.0.1/exec").err().unwrap();
        match err {
            ExecError::InvalidEndpoint { reason, .. } => assert!(reason.contains("ftp")),
            other => panic!("Expected InvalidEndpoint, got {:?}", other),
        }
    }

    #[test]
    fn test_from_config_default_endpoint() {
        let submitter = CommandSubmitter::from_config(&ClientConfig::default()).unwrap();
        assert_eq!(submitter.endpoint().path(), "/exec");
        assert_eq!(submitter.endpoint().port(), Some(8000));
    }

    #[tokio::test]
    async fn test_connection_refused_becomes_error_result() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let submitter = CommandSubmitter::new(&format!("http://{}/exec", addr)).unwrap();
        let slot = ResultSlot::new();
        submitter.submit_into(&Command::query("select 1"), &slot).await;

        let result = slot.get().await.unwrap();
        assert!(result.is_error());
        assert!(!result.error_message().unwrap().is_empty());
    }
}
