//! Gemini client struct, request building, and response parsing.

use super::config::GeminiConfig;

pub(crate) const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    pub(crate) fn api_url(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.config.model)
    }

    /// Continuation-only instruction: the model must pick up exactly where
    /// the buffer ends and never echo it back.
    pub(crate) fn build_prompt(code: &str, language: &str) -> String {
        format!(
            "You are an autocomplete engine. Given the following incomplete {language} code, \
             generate ONLY the next lines of code that should follow, starting exactly where \
             the code ends.\n\
             Do NOT repeat or include any of the code already provided.\n\
             Do not echo any previous lines. Output only the code continuation.\n\
             \n\
             {code}\n"
        )
    }

    /// Build the JSON request body for the Generative Language API.
    pub(crate) fn build_request_body(&self, code: &str, language: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": Self::build_prompt(code, language) }]
            }],
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }
        })
    }

    /// Extract the first candidate's text, trimmed. A response without
    /// candidates (or without text parts) is an empty suggestion, not an
    /// error: the provider legitimately returns nothing to suggest.
    pub(crate) fn parse_suggestion(&self, json: serde_json::Value) -> String {
        json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::trim)
            .unwrap_or("")
            .to_string()
    }
}
