/// Arithmetic tools: add, subtract, multiply, divide.
///
/// Every profile that exposes an operation registers it through
/// `register_one`, so division by zero is rejected the same way everywhere.

use serde::Deserialize;
use serde_json::{Number, Value};

use crate::core::error::ToolError;
use crate::core::protocol::{ToolHandler, ToolRegistry};
use crate::tools::{definition, parse_args};

/// One of the four arithmetic tools. Each variant is registered under its
/// own tool name with the same `{a, b}` input schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Tool name as exposed to clients.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operation::Add => "Add two numbers",
            Operation::Subtract => "Subtract the second number from the first",
            Operation::Multiply => "Multiply two numbers",
            Operation::Divide => "Divide the first number by the second",
        }
    }

    /// Compute `a <op> b`.
    ///
    /// # Arguments
    /// * `a` - Left operand
    /// * `b` - Right operand
    ///
    /// # Returns
    /// * `Err(ToolError::DivisionByZero)` for `Divide` with `b == 0`
    pub fn apply(&self, a: f64, b: f64) -> Result<f64, ToolError> {
        match self {
            Operation::Add => Ok(a + b),
            Operation::Subtract => Ok(a - b),
            Operation::Multiply => Ok(a * b),
            Operation::Divide => divide(a, b),
        }
    }
}

/// Division shared by every profile; `-0.0` counts as zero.
pub fn divide(a: f64, b: f64) -> Result<f64, ToolError> {
    if b == 0.0 {
        return Err(ToolError::DivisionByZero);
    }
    Ok(a / b)
}

#[derive(Debug, Deserialize)]
struct Operands {
    /// First number
    a: f64,
    /// Second number
    b: f64,
}

/// JSON has no representation for NaN or infinities; those go out as text.
fn number_value(x: f64) -> Value {
    Number::from_f64(x)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(x.to_string()))
}

/// Register all four arithmetic tools.
///
/// # Arguments
/// * `registry` - Mutable reference to the tool registry where the tools will be registered
pub fn register(registry: &mut ToolRegistry) {
    for op in Operation::ALL {
        register_one(registry, op);
    }
}

/// Register a single arithmetic tool. Profiles that expose only some of the
/// operations (e.g. `minimal` with `add`) use this directly.
///
/// # Arguments
/// * `registry` - Mutable reference to the tool registry
/// * `op` - Operation to expose
pub fn register_one(registry: &mut ToolRegistry, op: Operation) {
    let tool = definition(
        op.name(),
        op.description(),
        serde_json::json!({
            "type": "object",
            "properties": {
                "a": { "type": "number", "description": "First number" },
                "b": { "type": "number", "description": "Second number" }
            },
            "required": ["a", "b"]
        }),
    );

    // Results are JSON numbers; see `number_value` for non-finite results
    let handler: ToolHandler = Box::new(move |args: Value| -> Result<Value, ToolError> {
        let Operands { a, b } = parse_args::<Operands>(args)?;
        op.apply(a, b).map(number_value)
    });

    registry.register(tool, handler);
}
