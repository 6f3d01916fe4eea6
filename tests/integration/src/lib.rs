//! Integration test library - common utilities

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Test configuration
pub struct TestConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub client: Client,
}

impl TestConfig {
    /// Build from the environment, `None` when no agent URL is configured
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("IGLOO_AGENT_TEST_URL").ok()?;
        let token = std::env::var("IGLOO_AGENT_TEST_TOKEN").ok();

        let timeout_secs: u64 = std::env::var("IGLOO_AGENT_TEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a command to the agent, attaching the bearer token if configured
    pub fn run_command(&self, command: &str) -> RequestBuilder {
        self.authorized(self.client.post(self.url("/")))
            .json(&RunCommandRequest {
                command: command.to_string(),
            })
    }

    pub fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Run command request
#[derive(Debug, Serialize)]
pub struct RunCommandRequest {
    pub command: String,
}

/// Run command response
#[derive(Debug, Deserialize)]
pub struct RunCommandResponse {
    pub ok: bool,
    pub message: String,
    pub out: Option<String>,
}

/// Health check response
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
