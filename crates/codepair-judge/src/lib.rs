//! Remote code execution for codepair.
//!
//! Wraps a Judge0-compatible execution service with:
//! - One-shot submission (source, language, stdin → token)
//! - Result fetching with base64 payload transcoding
//! - A per-submission poll loop that drives queued/processing → terminal

pub mod client;
pub mod config;
pub mod encoding;
pub mod poller;
pub mod status;

mod api;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::JudgeClient;
pub use config::JudgeConfig;
pub use poller::{poll_result, RunOutcome};
pub use status::JudgeStatus;

#[async_trait]
pub trait JudgeApi: Send + Sync {
    /// Submit a run; returns the provider-assigned token.
    async fn submit(&self, submission: &Submission) -> Result<String, JudgeError>;

    /// Fetch the current result payload for a token.
    async fn fetch(&self, token: &str) -> Result<SubmissionResult, JudgeError>;

    /// List the languages the provider can execute.
    async fn languages(&self) -> Result<Vec<LanguageInfo>, JudgeError>;
}

/// One run request. Source and stdin are plain text here; the client
/// base64-encodes them at the transport boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub source_code: String,
    pub language_id: u32,
    #[serde(default)]
    pub stdin: String,
}

/// Provider status as carried in result payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub id: u32,
    pub description: String,
}

/// Raw result payload for one token. Output streams are base64 as received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub status: StatusInfo,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub memory: Option<u64>,
}

impl SubmissionResult {
    pub fn is_terminal(&self) -> bool {
        JudgeStatus::from_id(self.status.id).is_terminal()
    }
}

/// One entry of the provider's language catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_result_terminal_rule() {
        let mut res = SubmissionResult {
            status: StatusInfo {
                id: 1,
                description: "In Queue".into(),
            },
            stdout: None,
            stderr: None,
            compile_output: None,
            time: None,
            memory: None,
        };
        assert!(!res.is_terminal());

        res.status.id = 2;
        assert!(!res.is_terminal());

        res.status.id = 3;
        assert!(res.is_terminal());

        res.status.id = 6;
        assert!(res.is_terminal());
    }

    #[test]
    fn submission_deserializes_without_stdin() {
        let sub: Submission =
            serde_json::from_str(r#"{"source_code":"print(1)","language_id":71}"#).unwrap();
        assert_eq!(sub.language_id, 71);
        assert!(sub.stdin.is_empty());
    }

    #[test]
    fn judge_error_display() {
        let err = JudgeError::Api {
            status: 401,
            body: "Invalid API key".into(),
        };
        assert_eq!(err.to_string(), "API error: HTTP 401: Invalid API key");

        let err = JudgeError::Network("connection refused".into());
        assert_eq!(err.to_string(), "network error: connection refused");
    }
}
