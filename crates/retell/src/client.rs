//! Retell platform HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::{Result, RetellError};
use crate::types::{Agent, LlmUpdate, RetellLlm};
use crate::DEFAULT_API_BASE;

/// Client for one Retell account, authenticated by its API key.
#[derive(Clone)]
pub struct RetellClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl RetellClient {
    /// Create a client against the production API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_BASE)
    }

    /// Create a client against a custom base URL (tests, staging).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RetellError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    /// Fetch an agent, primarily for its `response_engine.llm_id`.
    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent> {
        debug!(%agent_id, "Fetching Retell agent");

        let resp = self
            .http
            .get(format!("{}/get-agent/{agent_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Ok(Self::check(resp).await?.json().await?)
    }

    /// Fetch a Retell-LLM configuration.
    pub async fn get_llm(&self, llm_id: &str) -> Result<RetellLlm> {
        debug!(%llm_id, "Fetching Retell LLM config");

        let resp = self
            .http
            .get(format!("{}/get-retell-llm/{llm_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Ok(Self::check(resp).await?.json().await?)
    }

    /// Patch an LLM's prompt and tool list in one call.
    pub async fn update_llm(&self, llm_id: &str, update: &LlmUpdate) -> Result<RetellLlm> {
        debug!(%llm_id, tools = update.general_tools.len(), "Updating Retell LLM config");

        let resp = self
            .http
            .patch(format!("{}/update-retell-llm/{llm_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(update)
            .send()
            .await?;

        Ok(Self::check(resp).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_deserialization() {
        let body = r#"{
            "agent_id": "ag_1",
            "agent_name": "Recepcionista",
            "response_engine": { "type": "retell-llm", "llm_id": "llm_9" }
        }"#;
        let agent: Agent = serde_json::from_str(body).unwrap();
        assert_eq!(agent.agent_id, "ag_1");
        assert_eq!(agent.response_engine.llm_id.as_deref(), Some("llm_9"));
    }

    #[test]
    fn test_llm_deserialization_tolerates_missing_fields() {
        let body = r#"{ "llm_id": "llm_9" }"#;
        let llm: RetellLlm = serde_json::from_str(body).unwrap();
        assert!(llm.general_prompt.is_none());
        assert!(llm.general_tools.is_none());
    }
}
