//! Agent configuration

use std::time::Duration;

use serde::Deserialize;

/// Agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Interpreter used to run commands as `<shell> -c <command>`
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Maximum run time of a single command in seconds (0 = no deadline)
    #[serde(default = "default_command_timeout")]
    pub command_timeout: u64,

    /// Shared secret callers must present as a bearer token.
    /// When unset the command endpoint accepts any caller.
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    5127
}

fn default_shell() -> String {
    "bash".to_string()
}

fn default_command_timeout() -> u64 {
    300 // 5 minutes
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Build configuration from an arbitrary key lookup, starting from defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(val) = lookup("IGLOO_AGENT_HTTP_HOST") {
            config.http_host = val;
        }
        if let Some(val) = lookup("IGLOO_AGENT_HTTP_PORT") {
            if let Ok(port) = val.parse() {
                config.http_port = port;
            }
        }
        if let Some(val) = lookup("IGLOO_AGENT_SHELL") {
            config.shell = val;
        }
        if let Some(val) = lookup("IGLOO_AGENT_COMMAND_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                config.command_timeout = timeout;
            }
        }
        if let Some(val) = lookup("IGLOO_AGENT_AUTH_TOKEN") {
            let val = val.trim();
            if !val.is_empty() {
                config.auth_token = Some(val.to_string());
            }
        }

        config
    }

    /// Command deadline, `None` when disabled
    pub fn command_deadline(&self) -> Option<Duration> {
        (self.command_timeout > 0).then(|| Duration::from_secs(self.command_timeout))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            shell: default_shell(),
            command_timeout: default_command_timeout(),
            auth_token: None,
        }
    }
}
