//! Retell API types.
//!
//! Only the fields the calendar integration reads or writes are typed.
//! Tool entries stay as raw JSON values so tools owned by other
//! integrations pass through update calls byte-for-byte.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An agent, reduced to its LLM reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Agent {
    pub agent_id: String,
    pub response_engine: ResponseEngine,
}

/// The engine driving an agent's responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEngine {
    #[serde(rename = "type")]
    pub engine_type: String,
    /// Set when `engine_type` is `retell-llm`.
    #[serde(default)]
    pub llm_id: Option<String>,
}

/// A Retell-LLM configuration: the prompt and tool list we rewrite.
#[derive(Debug, Clone, Deserialize)]
pub struct RetellLlm {
    pub llm_id: String,
    #[serde(default)]
    pub general_prompt: Option<String>,
    #[serde(default)]
    pub general_tools: Option<Vec<Value>>,
}

/// Patch body for an LLM update. Both fields are written together so the
/// tool list and prompt change in one atomic call.
#[derive(Debug, Clone, Serialize)]
pub struct LlmUpdate {
    pub general_prompt: String,
    pub general_tools: Vec<Value>,
}
