//! JudgeApi trait implementation for JudgeClient (HTTP round trips).

use async_trait::async_trait;
use tracing::debug;

use crate::client::JudgeClient;
use crate::{JudgeApi, JudgeError, LanguageInfo, Submission, SubmissionResult};

impl JudgeClient {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, JudgeError> {
        let response = self
            .http
            .get(url)
            .headers(self.auth_headers())
            .send()
            .await
            .map_err(|e| JudgeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| JudgeError::Parse(e.to_string()))
    }
}

#[async_trait]
impl JudgeApi for JudgeClient {
    async fn submit(&self, submission: &Submission) -> Result<String, JudgeError> {
        let body = self.build_submit_body(submission);

        debug!(language_id = submission.language_id, "Submitting run");

        let response = self
            .http
            .post(self.submit_url())
            .headers(self.auth_headers())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| JudgeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| JudgeError::Parse(e.to_string()))?;

        self.parse_token(json)
    }

    async fn fetch(&self, token: &str) -> Result<SubmissionResult, JudgeError> {
        debug!(token = %token, "Fetching run result");
        let json = self.get_json(&self.fetch_url(token)).await?;
        self.parse_result(json)
    }

    async fn languages(&self) -> Result<Vec<LanguageInfo>, JudgeError> {
        let json = self.get_json(&self.languages_url()).await?;
        self.parse_languages(json)
    }
}
