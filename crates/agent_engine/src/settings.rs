use std::time::Duration;

use url::Url;

use crate::SettingsError;

/// Environment variable holding the agent's base URL.
pub const API_URL_ENV: &str = "AGENT_API_URL";

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub base_url: Url,
    pub invoke_path: String,
    pub stream_path: String,
    pub health_path: String,
    /// Transport-level connect timeout. No overall request timeout is applied.
    pub connect_timeout: Option<Duration>,
}

impl AgentSettings {
    pub fn new(base_url: &str) -> Result<Self, SettingsError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| SettingsError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SettingsError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            invoke_path: "/agent/invoke".to_string(),
            stream_path: "/agent/sse".to_string(),
            health_path: "/health".to_string(),
            connect_timeout: Some(Duration::from_secs(10)),
        })
    }

    /// Reads the base URL from `AGENT_API_URL`.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        match lookup(API_URL_ENV) {
            Some(value) if !value.trim().is_empty() => Self::new(&value),
            _ => Err(SettingsError::MissingBaseUrl(API_URL_ENV)),
        }
    }

    pub fn invoke_url(&self) -> Result<Url, SettingsError> {
        self.endpoint(&self.invoke_path)
    }

    pub fn health_url(&self) -> Result<Url, SettingsError> {
        self.endpoint(&self.health_path)
    }

    pub fn stream_url(&self, task_id: &str) -> Result<Url, SettingsError> {
        let mut url = self.endpoint(&self.stream_path)?;
        url.query_pairs_mut().append_pair("task_id", task_id);
        Ok(url)
    }

    // Appends to the base path instead of `Url::join`, which would drop a path prefix.
    fn endpoint(&self, path: &str) -> Result<Url, SettingsError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|err| SettingsError::InvalidUrl(format!("{base}/{path}: {err}")))
    }
}
