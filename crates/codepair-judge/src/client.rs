//! Judge0 client struct, request building, and response parsing.

use crate::config::JudgeConfig;
use crate::encoding;
use crate::{JudgeError, LanguageInfo, Submission, SubmissionResult};

/// Judge0 API client.
pub struct JudgeClient {
    pub(crate) config: JudgeConfig,
    pub(crate) http: reqwest::Client,
}

impl JudgeClient {
    pub fn new(config: JudgeConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    pub(crate) fn submit_url(&self) -> String {
        format!(
            "{}/submissions?base64_encoded=true&wait=false&fields=*",
            self.config.base_url
        )
    }

    pub(crate) fn fetch_url(&self, token: &str) -> String {
        format!(
            "{}/submissions/{}?base64_encoded=true&fields=*",
            self.config.base_url, token
        )
    }

    pub(crate) fn languages_url(&self) -> String {
        format!("{}/languages", self.config.base_url)
    }

    /// RapidAPI auth headers.
    pub(crate) fn auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "X-RapidAPI-Key",
            self.config.api_key.parse().expect("invalid API key header"),
        );
        headers.insert(
            "X-RapidAPI-Host",
            self.config.api_host.parse().expect("invalid API host header"),
        );
        headers
    }

    /// Build the JSON submit body. Source and stdin go out base64-encoded.
    pub(crate) fn build_submit_body(&self, submission: &Submission) -> serde_json::Value {
        serde_json::json!({
            "source_code": encoding::encode(&submission.source_code),
            "language_id": submission.language_id,
            "stdin": encoding::encode(&submission.stdin),
            "cpu_time_limit": self.config.cpu_time_limit,
            "memory_limit": self.config.memory_limit,
        })
    }

    /// Extract the submission token from a submit response.
    pub(crate) fn parse_token(&self, json: serde_json::Value) -> Result<String, JudgeError> {
        json["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| JudgeError::Parse("no token in submit response".to_string()))
    }

    pub(crate) fn parse_result(&self, json: serde_json::Value) -> Result<SubmissionResult, JudgeError> {
        serde_json::from_value(json).map_err(|e| JudgeError::Parse(e.to_string()))
    }

    pub(crate) fn parse_languages(
        &self,
        json: serde_json::Value,
    ) -> Result<Vec<LanguageInfo>, JudgeError> {
        serde_json::from_value(json).map_err(|e| JudgeError::Parse(e.to_string()))
    }
}
