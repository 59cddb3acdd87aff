/// Small text tools: a greeting and a word counter.
///
/// Both are exposed by the `minimal` and `all` profiles.

use serde::Deserialize;
use serde_json::Value;

use crate::core::error::ToolError;
use crate::core::protocol::{ToolHandler, ToolRegistry};
use crate::tools::{definition, parse_args};

/// Greeting text for `name`.
///
/// # Arguments
/// * `name` - Who to greet; the tool defaults it to "World"
pub fn hello(name: &str) -> String {
    format!("Hello, {}! 👋", name)
}

/// Words are whitespace-separated; characters are Unicode scalar values.
pub fn count_words(text: &str) -> String {
    let words = text.split_whitespace().count();
    let chars = text.chars().count();
    format!("Text has {} words and {} characters", words, chars)
}

#[derive(Debug, Deserialize)]
struct HelloArgs {
    /// Name to greet
    #[serde(default = "default_name")]
    name: String,
}

fn default_name() -> String {
    "World".to_string()
}

#[derive(Debug, Deserialize)]
struct CountWordsArgs {
    /// Text to measure
    text: String,
}

/// Register `hello` and `count_words`.
///
/// # Arguments
/// * `registry` - Mutable reference to the tool registry where the tools will be registered
pub fn register(registry: &mut ToolRegistry) {
    let hello_tool = definition(
        "hello",
        "Say hello to someone.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name to greet",
                    "default": "World"
                }
            }
        }),
    );
    let hello_handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: HelloArgs = parse_args(args)?;
        Ok(Value::String(hello(&args.name)))
    });
    registry.register(hello_tool, hello_handler);

    let count_tool = definition(
        "count_words",
        "Count words in a text.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Text to count words in"
                }
            },
            "required": ["text"]
        }),
    );
    let count_handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: CountWordsArgs = parse_args(args)?;
        Ok(Value::String(count_words(&args.text)))
    });
    registry.register(count_tool, count_handler);
}
