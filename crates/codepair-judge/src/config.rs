//! Execution service client configuration.

use std::time::Duration;

/// Judge0 client configuration.
#[derive(Clone)]
pub struct JudgeConfig {
    pub api_key: String,
    pub api_host: String,
    pub base_url: String,
    /// Per-run CPU limit handed to the provider, in seconds.
    pub cpu_time_limit: u32,
    /// Per-run memory limit handed to the provider, in KB.
    pub memory_limit: u32,
    /// Wait between result fetches.
    pub poll_interval: Duration,
    /// Overall cap on one submission's poll loop.
    pub poll_deadline: Duration,
}

impl std::fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_host", &self.api_host)
            .field("base_url", &self.base_url)
            .field("cpu_time_limit", &self.cpu_time_limit)
            .field("memory_limit", &self.memory_limit)
            .field("poll_interval", &self.poll_interval)
            .field("poll_deadline", &self.poll_deadline)
            .finish()
    }
}

impl JudgeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_host: "judge0-ce.p.rapidapi.com".to_string(),
            base_url: "https://judge0-ce.p.rapidapi.com".to_string(),
            cpu_time_limit: 5,
            memory_limit: 512_000,
            poll_interval: Duration::from_secs(1),
            poll_deadline: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    pub fn with_limits(mut self, cpu_time_limit: u32, memory_limit: u32) -> Self {
        self.cpu_time_limit = cpu_time_limit;
        self.memory_limit = memory_limit;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_poll_deadline(mut self, poll_deadline: Duration) -> Self {
        self.poll_deadline = poll_deadline;
        self
    }
}
