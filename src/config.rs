//! Configuration surface embedded by the host.
//!
//! The crate never touches the filesystem; hosts deserialize these nodes
//! from wherever their own config tree lives and hand them in.

use serde::{Deserialize, Serialize};

/// Settings for the calculator tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Tool name advertised to the model
    #[serde(default = "default_calculator_name")]
    pub name: String,
    /// Tool description advertised to the model
    #[serde(default = "default_calculator_description")]
    pub description: String,
    /// Optional override for the parameter schema; the built-in
    /// single-`expression` schema is used when unset
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
    /// Longest accepted expression in bytes; longer inputs fail evaluation
    /// (undefined result), they do not error the call
    #[serde(default = "default_max_expression_len")]
    pub max_expression_len: usize,
}

fn default_calculator_name() -> String {
    "calculator".into()
}

fn default_calculator_description() -> String {
    "Evaluates an arithmetic expression and scores it against the session's expected result.".into()
}

fn default_max_expression_len() -> usize {
    4096
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            name: default_calculator_name(),
            description: default_calculator_description(),
            parameters: None,
            max_expression_len: default_max_expression_len(),
        }
    }
}

/// Top-level tools config node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub calculator: CalculatorConfig,
}
