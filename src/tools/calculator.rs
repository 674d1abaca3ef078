use super::traits::{Tool, ToolResponse};
use crate::config::CalculatorConfig;
use crate::expr;
use crate::session::SessionStore;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Shaping reward when a call fails to improve on the session's stored
/// reward. Improvement earns 0.0; there is no positive shaping signal.
const NO_IMPROVEMENT_PENALTY: f64 = -0.05;

/// Tiered score by absolute distance from the target, tightest tier first.
const REWARD_TIERS: [(f64, f64); 3] = [(1e-10, 1.0), (0.01, 0.8), (0.1, 0.5)];

/// Evaluates model-submitted arithmetic and scores it against a per-session
/// target value
pub struct CalculatorTool {
    config: CalculatorConfig,
    store: SessionStore,
}

impl CalculatorTool {
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            config,
            store: SessionStore::new(),
        }
    }

    /// Session store backing this tool, for host-side introspection.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Pull the expression text out of the raw argument payload.
    ///
    /// Arguments arrive as model-written JSON text, so anything can show
    /// up here. Unparseable or non-mapping payloads and a missing field
    /// all degrade to the empty expression; a present but non-string
    /// `expression` keeps its JSON rendering.
    fn extract_expression(parameters: &str) -> String {
        let payload: Value = serde_json::from_str(parameters).unwrap_or(Value::Null);
        match payload.get("expression") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Evaluate one submission, absorbing every failure into `None`.
    fn evaluate(&self, instance_id: &str, expression: &str) -> Option<f64> {
        if expression.len() > self.config.max_expression_len {
            tracing::warn!(
                "Calculator: expression for '{instance_id}' over length cap ({} > {})",
                expression.len(),
                self.config.max_expression_len
            );
            return None;
        }
        match expr::evaluate(expression) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(
                    "Calculator: failed to evaluate '{expression}' for '{instance_id}': {err}"
                );
                None
            }
        }
    }

    /// Tiered score of a result against a target. 0.0 when either side is
    /// missing, and NaN distances fall through every tier.
    fn tiered_reward(result: Option<f64>, target: Option<f64>) -> f64 {
        let (Some(result), Some(target)) = (result, target) else {
            return 0.0;
        };
        let distance = (result - target).abs();
        for (tolerance, reward) in REWARD_TIERS {
            if distance < tolerance {
                return reward;
            }
        }
        0.0
    }

    fn default_parameters_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Arithmetic expression to evaluate, e.g. \"3 * (4 + 5)\""
                }
            },
            "required": ["expression"]
        })
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        &self.config.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.config
            .parameters
            .clone()
            .unwrap_or_else(Self::default_parameters_schema)
    }

    /// Open a session, fixing its target from the optional numeric
    /// `expected_result` entry. Other entries are ignored.
    async fn create(
        &self,
        instance_id: Option<&str>,
        params: &serde_json::Value,
    ) -> anyhow::Result<String> {
        let target = params.get("expected_result").and_then(Value::as_f64);
        Ok(self.store.create(instance_id, target))
    }

    /// Evaluate this call's expression, update the session, and return the
    /// result text plus the shaping reward.
    ///
    /// The shaping reward is an asymmetric ratchet: 0.0 when the new
    /// tiered score strictly beats the stored one, the fixed penalty
    /// otherwise. The stored score is then overwritten either way, so a
    /// regression lowers the bar for the next call. Evaluation failures
    /// never fail the call; only an unknown session id does.
    async fn execute(&self, instance_id: &str, parameters: &str) -> anyhow::Result<ToolResponse> {
        let expression = Self::extract_expression(parameters);

        let (message, reward) = self.store.with_session(instance_id, |session| {
            let result = self.evaluate(instance_id, &expression);
            session.expression = expression;
            session.result = result;

            let scored = Self::tiered_reward(session.result, session.target);
            let shaping = if scored > session.reward {
                0.0
            } else {
                NO_IMPROVEMENT_PENALTY
            };
            session.reward = scored;

            let rendered = match session.result {
                Some(value) => value.to_string(),
                None => "undefined".to_string(),
            };
            (
                format!("Expression: {}, Result: {rendered}", session.expression),
                shaping,
            )
        })?;

        Ok(ToolResponse {
            message,
            reward,
            metadata: HashMap::new(),
        })
    }

    /// Re-score the session's stored result against its target. Pure read.
    async fn calc_reward(&self, instance_id: &str) -> anyhow::Result<f64> {
        let session = self.store.get(instance_id)?;
        Ok(Self::tiered_reward(session.result, session.target))
    }

    async fn release(&self, instance_id: &str) -> anyhow::Result<()> {
        self.store.release(instance_id)?;
        Ok(())
    }
}
