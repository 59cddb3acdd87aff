/// Core Server Framework Module
///
/// - config.rs: profiles, transports and layered configuration
/// - error.rs: tool and server error types
/// - logging.rs: tracing subscriber setup
/// - protocol.rs: JSON-RPC types, tool registry and request routing
/// - server.rs: HTTP and STDIO transports

pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod server;
