/// Echo Tool Implementation
///
/// The echo tool takes a message parameter and returns it with a greeting
/// prefix. The prefix is configurable via `tools.echo.prefix`.

use serde::Deserialize;
use serde_json::Value;

use crate::core::config::Config;
use crate::core::error::ToolError;
use crate::core::protocol::{ToolHandler, ToolRegistry};
use crate::tools::{definition, parse_args};

pub const DEFAULT_PREFIX: &str = "Hello! You said: ";

#[derive(Debug, Deserialize)]
struct EchoArgs {
    message: String,
}

/// Prepend `prefix` to `message`.
pub fn echo(prefix: &str, message: &str) -> String {
    let mut result = String::with_capacity(prefix.len() + message.len());
    result.push_str(prefix);
    result.push_str(message);
    result
}

/// Register the echo tool with the tool registry.
///
/// The prefix is read from the configuration once, at registration.
pub fn register(registry: &mut ToolRegistry, config: &Config) {
    let tool = definition(
        "echo",
        "Echo a message back (useful for testing).",
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Message to echo back"
                }
            },
            "required": ["message"]
        }),
    );

    let prefix = config
        .get_tool_config("echo")
        .get("prefix")
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_PREFIX)
        .to_string();

    let handler: ToolHandler = Box::new(move |args: Value| -> Result<Value, ToolError> {
        let args: EchoArgs = parse_args(args)?;
        Ok(Value::String(echo(&prefix, &args.message)))
    });

    registry.register(tool, handler);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Profile;
    use serde_json::json;

    #[test]
    fn test_echo_default_prefix() {
        let mut registry = ToolRegistry::new();
        register(&mut registry, &Config::for_profile(Profile::Directory));

        let result = registry.call("echo", json!({"message": "hi"})).unwrap().unwrap();
        assert_eq!(result, json!("Hello! You said: hi"));
    }

    #[test]
    fn test_echo_configured_prefix() {
        let mut config = Config::for_profile(Profile::Directory);
        config
            .tools
            .insert("echo".to_string(), json!({"prefix": "Echo: "}));

        let mut registry = ToolRegistry::new();
        register(&mut registry, &config);

        let result = registry.call("echo", json!({"message": "hi"})).unwrap().unwrap();
        assert_eq!(result, json!("Echo: hi"));
    }

    #[test]
    fn test_echo_requires_message() {
        let mut registry = ToolRegistry::new();
        register(&mut registry, &Config::for_profile(Profile::Directory));

        let err = registry.call("echo", json!({})).unwrap().unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
