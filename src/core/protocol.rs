/// MCP Protocol Layer
///
/// This module contains the transport-independent part of the server:
/// - JSON-RPC 2.0 request/response structures
/// - Tool registry for managing available tools
/// - `McpService`, which routes a raw JSON-RPC message to the right
///   MCP method handler and is shared by the STDIO and HTTP transports

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::error::ToolError;

/// MCP protocol revision reported in `initialize` responses.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC error codes used by the server.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
}

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// `id` is None only when the member is absent (a notification, which never
/// receives a response). An explicit `"id": null` is kept as `Some(Null)`.
#[derive(Deserialize, Debug)]
pub struct MCPRequest {
    pub jsonrpc: String,
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

/// Called only when `id` is present, so `null` stays distinguishable from absent.
fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 response structure for MCP protocol.
///
/// Exactly one of `result` and `error` is present.
#[derive(Serialize, Deserialize, Debug)]
pub struct MCPResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MCPError>,
}

impl MCPResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(MCPError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC 2.0 error structure.
#[derive(Serialize, Deserialize, Debug)]
pub struct MCPError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP tool definition, serialized as-is in `tools/list`.
#[derive(Serialize, Debug, Clone)]
pub struct MCPTool {
    /// Unique tool identifier (e.g., "read_file", "divide")
    pub name: String,
    pub description: String,
    /// JSON Schema defining the tool's input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool handler function type definition.
///
/// Handlers take the JSON `arguments` object and return either a JSON
/// result or a typed `ToolError`. A string result is sent to the client
/// verbatim; any other value is sent as its JSON text.
pub type ToolHandler = Box<dyn Fn(Value) -> Result<Value, ToolError> + Send + Sync>;

/// Registry of available MCP tools.
///
/// Keeps definitions in registration order for `tools/list` and a name ->
/// handler map for `tools/call`.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<MCPTool>,
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A later registration under the same name replaces
    /// the earlier definition and handler.
    pub fn register(&mut self, tool: MCPTool, handler: ToolHandler) {
        let name = tool.name.clone();
        if let Some(existing) = self.tools.iter_mut().find(|t| t.name == name) {
            tracing::warn!(tool = %name, "replacing previously registered tool");
            *existing = tool;
        } else {
            self.tools.push(tool);
        }
        self.handlers.insert(name, handler);
    }

    pub fn tools(&self) -> &[MCPTool] {
        &self.tools
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Invoke a tool by name. Returns None when no such tool is registered.
    pub fn call(&self, name: &str, arguments: Value) -> Option<Result<Value, ToolError>> {
        self.handlers.get(name).map(|handler| handler(arguments))
    }
}

/// Server identity reported in `initialize` responses.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Transport-independent MCP request processor.
///
/// One instance is shared by every transport and every HTTP worker.
pub struct McpService {
    info: ServerInfo,
    registry: ToolRegistry,
    requests: AtomicU64,
}

impl McpService {
    pub fn new(info: ServerInfo, registry: ToolRegistry) -> Self {
        Self {
            info,
            registry,
            requests: AtomicU64::new(0),
        }
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Total JSON-RPC messages processed since start.
    pub fn requests_total(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Process one raw JSON-RPC message.
    ///
    /// Returns None only for notifications. Messages that are not a single
    /// request object (including batches) are answered with `-32600`.
    pub fn handle_message(&self, raw: &str) -> Option<MCPResponse> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable JSON-RPC message");
                return Some(parse_error(&e));
            }
        };

        if !value.is_object() {
            return Some(MCPResponse::failure(
                Value::Null,
                codes::INVALID_REQUEST,
                "Invalid request: expected a single JSON-RPC request object",
            ));
        }

        let request: MCPRequest = match serde_json::from_value(value.clone()) {
            Ok(req) => req,
            Err(e) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                return Some(MCPResponse::failure(
                    id,
                    codes::INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ));
            }
        };

        self.handle_request(request)
    }

    /// Route a parsed request to its method handler.
    pub fn handle_request(&self, req: MCPRequest) -> Option<MCPResponse> {
        let Some(id) = req.id else {
            tracing::debug!(method = %req.method, "notification received");
            return None;
        };

        if req.jsonrpc != "2.0" {
            return Some(MCPResponse::failure(
                id,
                codes::INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", req.jsonrpc),
            ));
        }

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => MCPResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, req.params),
            _ => MCPResponse::failure(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", req.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Value) -> MCPResponse {
        MCPResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": self.info.name,
                    "version": self.info.version
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Value) -> MCPResponse {
        MCPResponse::success(id, json!({ "tools": self.registry.tools() }))
    }

    /// Execute a tool and wrap its outcome as MCP content.
    ///
    /// Tool failures are reported inside the result with `isError: true`;
    /// only protocol problems (bad params, unknown tool) become JSON-RPC errors.
    fn handle_tools_call(&self, id: Value, params: Option<Value>) -> MCPResponse {
        let Some(params) = params else {
            return MCPResponse::failure(id, codes::INVALID_PARAMS, "Invalid params");
        };

        let Some(tool_name) = params.get("name").and_then(|v| v.as_str()) else {
            return MCPResponse::failure(id, codes::INVALID_PARAMS, "Missing tool name");
        };

        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        tracing::debug!(tool = %tool_name, "tools/call");
        match self.registry.call(tool_name, arguments) {
            Some(Ok(result)) => MCPResponse::success(id, tool_result(&result)),
            Some(Err(e)) => {
                tracing::warn!(tool = %tool_name, kind = ?e.kind(), error = %e, "tool failed");
                MCPResponse::success(id, tool_error_result(&e))
            }
            None => MCPResponse::failure(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", tool_name),
            ),
        }
    }
}

/// `-32700` response for input that is not JSON (or not UTF-8).
pub fn parse_error(err: &dyn std::fmt::Display) -> MCPResponse {
    MCPResponse::failure(Value::Null, codes::PARSE_ERROR, format!("Parse error: {}", err))
}

/// Render a tool's return value as text content.
pub fn result_text(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a tool failure the way clients see it.
pub fn error_text(err: &ToolError) -> String {
    format!("Error: {}", err)
}

fn tool_result(result: &Value) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": result_text(result)
            }
        ],
        "isError": false
    })
}

fn tool_error_result(err: &ToolError) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": error_text(err)
            }
        ],
        "isError": true,
        "_meta": {
            "errorKind": err.kind()
        }
    })
}
