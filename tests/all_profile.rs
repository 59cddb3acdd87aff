/// End-to-end JSON-RPC sessions against the `all` profile.

use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

use mcpdemo::core::server::build_service;
use mcpdemo::{Config, McpService, Profile};

fn service() -> std::sync::Arc<McpService> {
    build_service(&Config::for_profile(Profile::All))
}

fn call(service: &McpService, id: i64, tool: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": tool, "arguments": arguments }
    });
    let response = service
        .handle_message(&request.to_string())
        .expect("request with id gets a response");
    assert_eq!(response.id, json!(id));
    serde_json::to_value(response).unwrap()
}

fn text_of(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[test]
fn test_handshake_and_listing() {
    let service = service();

    let init = service
        .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
        .unwrap();
    let init = serde_json::to_value(init).unwrap();
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(init["result"]["serverInfo"]["name"], "mcpdemo");

    assert!(
        service
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .is_none()
    );

    let list = service
        .handle_message(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
        .unwrap();
    let list = serde_json::to_value(list).unwrap();
    let tools = list["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 14);
    assert!(tools.iter().all(|t| t.get("inputSchema").is_some()));
}

#[test]
fn test_file_workflow() {
    let dir = TempDir::new().unwrap();
    let service = service();
    let target = dir.path().join("notes").join("todo.txt");
    let target_str = target.to_str().unwrap();

    let written = call(&service, 1, "write_file", json!({"file_path": target_str, "content": "buy milk"}));
    assert_eq!(written["result"]["isError"], false);
    assert_eq!(fs::read_to_string(&target).unwrap(), "buy milk");

    let read = call(&service, 2, "read_file", json!({"file_path": target_str}));
    assert_eq!(text_of(&read), "buy milk");

    let found = call(
        &service,
        3,
        "search_files",
        json!({"pattern": "**/*.txt", "directory": dir.path().to_str().unwrap()}),
    );
    assert!(text_of(&found).contains("todo.txt"));

    let missing = call(&service, 4, "read_file", json!({"file_path": dir.path().join("nope.txt")}));
    assert_eq!(missing["result"]["isError"], true);
    assert_eq!(missing["result"]["_meta"]["errorKind"], "not_found");
    assert!(text_of(&missing).starts_with("Error: "));
}

#[test]
fn test_mixed_tools() {
    let service = service();

    let sum = call(&service, 1, "add", json!({"a": 2, "b": 3}));
    assert_eq!(text_of(&sum), "5.0");

    let zero = call(&service, 2, "divide", json!({"a": 1, "b": 0}));
    assert_eq!(zero["result"]["isError"], true);
    assert_eq!(text_of(&zero), "Error: Cannot divide by zero");

    let weather = call(&service, 3, "get_weather", json!({"location": "Chicago"}));
    assert_eq!(text_of(&weather), "Rainy, 60°F");

    let unknown = call(&service, 4, "teleport", json!({}));
    assert_eq!(unknown["error"]["code"], -32601);

    assert_eq!(service.requests_total(), 4);
}
