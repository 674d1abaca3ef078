use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a tool call hands back to the rollout loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Human-readable text appended to the conversation
    pub message: String,
    /// Shaping reward for this single call
    pub reward: f64,
    /// Side-channel record for the trainer; currently always empty
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Description of a tool for the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    /// Render the OpenAI function-calling wire shape.
    pub fn to_openai(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// Core tool trait. Tools are stateful per session: a rollout opens a
/// session with `create`, drives it with `execute`, and tears it down with
/// `release`. All methods are async seams for the integration loop; none
/// of the built-in tools block or perform I/O.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used in LLM function calling)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// JSON schema for parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Get the full spec for LLM registration
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }

    /// Open a session and return its id.
    ///
    /// `params` is the tool-specific creation bag; unknown entries are
    /// ignored. Passing `None` lets the tool generate an id.
    async fn create(
        &self,
        instance_id: Option<&str>,
        params: &serde_json::Value,
    ) -> anyhow::Result<String>;

    /// Run one tool call against an open session.
    ///
    /// `parameters` is the raw argument text produced by the model's
    /// function call, passed through unparsed.
    async fn execute(&self, instance_id: &str, parameters: &str) -> anyhow::Result<ToolResponse>;

    /// Score the session's current state without mutating it.
    async fn calc_reward(&self, instance_id: &str) -> anyhow::Result<f64>;

    /// Tear down a session. Further calls against the id fail.
    async fn release(&self, instance_id: &str) -> anyhow::Result<()>;
}
