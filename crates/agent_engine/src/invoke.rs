use agent_core::{HealthStatus, InvokeRequest, TaskInvocation};
use agent_logging::{agent_debug, agent_info, agent_warn};
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};

use crate::{AgentSettings, InvocationError, SettingsError};

/// Turns a natural-language query into a task acknowledgment.
#[async_trait::async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, query: &str) -> Result<TaskInvocation, InvocationError>;
}

/// HTTP client for the agent service.
#[derive(Debug, Clone)]
pub struct AgentClient {
    settings: AgentSettings,
    client: reqwest::Client,
}

impl AgentClient {
    pub fn new(settings: AgentSettings) -> Result<Self, SettingsError> {
        let client = build_client(&settings)?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Calls `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, InvocationError> {
        let url = self.settings.health_url()?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(map_send_error)?;
        let body = read_success_body(response).await?;
        serde_json::from_str(&body).map_err(|err| InvocationError::MalformedResponse(err.to_string()))
    }
}

#[async_trait::async_trait]
impl Invoker for AgentClient {
    async fn invoke(&self, query: &str) -> Result<TaskInvocation, InvocationError> {
        let url = self.settings.invoke_url()?;
        let body = InvokeRequest::new(query).to_body();

        agent_info!("invoke url={} query_len={}", url, query.len());
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-store")
            .body(body)
            .send()
            .await
            .map_err(map_send_error)?;

        let body = read_success_body(response).await?;
        let invocation: TaskInvocation = serde_json::from_str(&body)
            .map_err(|err| InvocationError::MalformedResponse(err.to_string()))?;
        agent_debug!(
            "invoke ok tag_id={} files={} task_id={:?}",
            invocation.parsed.tag_id,
            invocation.files.len(),
            invocation.task_id
        );
        Ok(invocation)
    }
}

pub(crate) fn build_client(settings: &AgentSettings) -> Result<reqwest::Client, SettingsError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    builder
        .build()
        .map_err(|err| SettingsError::Client(err.to_string()))
}

/// Returns the body text of a 2xx response, or `Rejected` with the raw text otherwise.
async fn read_success_body(response: reqwest::Response) -> Result<String, InvocationError> {
    let status = response.status();
    let body = response.text().await.map_err(map_send_error)?;
    if !status.is_success() {
        agent_warn!("agent rejected request: status={} body_len={}", status, body.len());
        return Err(InvocationError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn map_send_error(err: reqwest::Error) -> InvocationError {
    agent_warn!("agent request failed: {}", err);
    InvocationError::Unreachable(err.to_string())
}
