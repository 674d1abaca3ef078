pub mod calculator;
pub mod traits;

pub use calculator::CalculatorTool;
pub use traits::Tool;
#[allow(unused_imports)]
pub use traits::{ToolResponse, ToolSpec};

use crate::config::ToolsConfig;

/// Create the default tool registry
pub fn default_tools(config: &ToolsConfig) -> Vec<Box<dyn Tool>> {
    vec![Box::new(CalculatorTool::new(config.calculator.clone()))]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tools_has_the_calculator() {
        let tools = default_tools(&ToolsConfig::default());
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["calculator"]);
    }

    #[test]
    fn default_tools_honor_config_overrides() {
        let config = ToolsConfig {
            calculator: crate::config::CalculatorConfig {
                name: "calc".into(),
                ..crate::config::CalculatorConfig::default()
            },
        };
        let tools = default_tools(&config);
        assert_eq!(tools[0].name(), "calc");
    }

    #[test]
    fn default_tools_all_have_descriptions() {
        for tool in default_tools(&ToolsConfig::default()) {
            assert!(
                !tool.description().is_empty(),
                "Tool {} has empty description",
                tool.name()
            );
        }
    }

    #[test]
    fn default_tools_all_have_schemas() {
        for tool in default_tools(&ToolsConfig::default()) {
            let schema = tool.parameters_schema();
            assert!(
                schema.is_object(),
                "Tool {} schema is not an object",
                tool.name()
            );
            assert!(
                schema["properties"].is_object(),
                "Tool {} schema has no properties",
                tool.name()
            );
        }
    }

    #[test]
    fn tool_spec_generation() {
        for tool in default_tools(&ToolsConfig::default()) {
            let spec = tool.spec();
            assert_eq!(spec.name, tool.name());
            assert_eq!(spec.description, tool.description());
            assert!(spec.parameters.is_object());
        }
    }

    #[test]
    fn tool_spec_serde() {
        let spec = ToolSpec {
            name: "test".into(),
            description: "A test tool".into(),
            parameters: serde_json::json!({"type": "object"}),
        };
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: ToolSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "test");
        assert_eq!(parsed.description, "A test tool");
    }
}
