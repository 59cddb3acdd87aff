/// Tools Module
///
/// Each tool set lives in its own module and exports a `register` function
/// that adds its tools to the registry. `registry_for` picks the tool sets
/// for the configured profile.

pub mod echo;
pub mod files;
pub mod math;
pub mod text;
pub mod weather;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::config::{Config, Profile};
use crate::core::error::ToolError;
use crate::core::protocol::{MCPTool, ToolRegistry};

/// Build the tool registry for the configured profile.
pub fn registry_for(config: &Config) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    match config.profile {
        Profile::Directory => {
            files::register(&mut registry);
            echo::register(&mut registry, config);
        }
        Profile::Math => math::register(&mut registry),
        Profile::Weather => weather::register(&mut registry),
        Profile::Minimal => {
            text::register(&mut registry);
            math::register_one(&mut registry, math::Operation::Add);
        }
        Profile::All => {
            files::register(&mut registry);
            echo::register(&mut registry, config);
            math::register(&mut registry);
            weather::register(&mut registry);
            text::register(&mut registry);
        }
    }

    registry
}

/// Deserialize a tool's `arguments` object into its typed parameters.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    // Clients may send `null` or omit arguments for parameterless calls
    let args = if args.is_null() { Value::Object(Default::default()) } else { args };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

pub(crate) fn definition(name: &str, description: &str, input_schema: Value) -> MCPTool {
    MCPTool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profiles_register_expected_tools() {
        let names = |profile| {
            let registry = registry_for(&Config::for_profile(profile));
            registry.names().iter().map(|s| s.to_string()).collect::<Vec<_>>()
        };

        assert_eq!(
            names(Profile::Directory),
            vec![
                "read_file",
                "write_file",
                "list_directory",
                "get_file_info",
                "search_files",
                "get_current_directory",
                "echo"
            ]
        );
        assert_eq!(names(Profile::Math), vec!["add", "subtract", "multiply", "divide"]);
        assert_eq!(names(Profile::Weather), vec!["get_weather"]);
        assert_eq!(names(Profile::Minimal), vec!["hello", "count_words", "add"]);
        assert_eq!(names(Profile::All).len(), 14);
    }

    #[test]
    fn test_divide_by_zero_is_consistent_across_profiles() {
        for profile in [Profile::Math, Profile::All] {
            let registry = registry_for(&Config::for_profile(profile));
            let err = registry
                .call("divide", json!({"a": 1.0, "b": 0.0}))
                .unwrap()
                .unwrap_err();
            assert!(matches!(err, ToolError::DivisionByZero), "profile {}", profile);
        }
    }

    #[test]
    fn test_parse_args_accepts_null() {
        #[derive(serde::Deserialize)]
        struct NoArgs {}
        assert!(parse_args::<NoArgs>(Value::Null).is_ok());
    }
}
