//! Per-submission poll loop.
//!
//! One loop per in-flight run, no shared state between runs. The loop
//! fetches, sleeps a fixed interval while the provider still reports
//! queued/processing, and resolves to exactly one terminal `RunOutcome`.
//! Provider or transport failures abort the loop immediately.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::encoding;
use crate::{JudgeApi, JudgeError, SubmissionResult};

/// Status id reported to callers when the loop fails locally. The provider
/// never uses it for a fetched result in this deployment's configuration.
pub const INTERNAL_ERROR_ID: u32 = 8;

/// Terminal result of one run as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub token: String,
    pub status_id: u32,
    pub status: String,
    pub output: String,
    pub time: Option<String>,
    pub memory: Option<u64>,
}

impl RunOutcome {
    /// Decode a provider result. Output prefers stdout, then stderr, then
    /// compiler output; empty streams fall through like absent ones.
    pub fn from_result(token: &str, result: &SubmissionResult) -> Result<Self, JudgeError> {
        let stream = [&result.stdout, &result.stderr, &result.compile_output]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty());

        let output = match stream {
            Some(encoded) => {
                let decoded = encoding::decode(encoded)?;
                if decoded.is_empty() {
                    "No output".to_string()
                } else {
                    decoded
                }
            }
            None => "No output".to_string(),
        };

        Ok(Self {
            token: token.to_string(),
            status_id: result.status.id,
            status: result.status.description.clone(),
            output,
            time: result.time.clone(),
            memory: result.memory,
        })
    }

    pub fn internal_error(token: &str, message: &str) -> Self {
        Self {
            token: token.to_string(),
            status_id: INTERNAL_ERROR_ID,
            status: "Internal Error".to_string(),
            output: format!("Error fetching result: {message}"),
            time: None,
            memory: None,
        }
    }

    pub fn timeout(token: &str) -> Self {
        Self {
            token: token.to_string(),
            status_id: 0,
            status: "Polling Timeout".to_string(),
            output: "No terminal result before the poll deadline".to_string(),
            time: None,
            memory: None,
        }
    }
}

/// Drive one submitted run to a terminal outcome.
///
/// Never returns an error: failures become an internal-error outcome so the
/// caller always gets a terminal, inspectable status.
pub async fn poll_result(
    judge: &dyn JudgeApi,
    token: &str,
    interval: Duration,
    deadline: Duration,
) -> RunOutcome {
    let started = Instant::now();

    loop {
        match judge.fetch(token).await {
            Ok(result) if result.is_terminal() => {
                debug!(token = %token, status_id = result.status.id, "Run reached terminal status");
                return match RunOutcome::from_result(token, &result) {
                    Ok(outcome) => outcome,
                    Err(e) => RunOutcome::internal_error(token, &e.to_string()),
                };
            }
            Ok(result) => {
                debug!(token = %token, status_id = result.status.id, "Run still pending");
                if started.elapsed() >= deadline {
                    warn!(token = %token, "Poll deadline reached");
                    return RunOutcome::timeout(token);
                }
                sleep(interval).await;
            }
            Err(e) => {
                warn!(token = %token, error = %e, "Run fetch failed");
                return RunOutcome::internal_error(token, &e.to_string());
            }
        }
    }
}
