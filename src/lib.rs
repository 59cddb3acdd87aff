//! Demonstration MCP tool servers.
//!
//! A server is built from a [`Profile`], which selects one of
//! the tool sets under [`tools`], and served over STDIO, HTTP, or both.

pub mod core;
pub mod inspector;
pub mod tools;

pub use crate::core::config::{Config, Profile, Transport};
pub use crate::core::error::{ErrorKind, ServerError, ToolError};
pub use crate::core::protocol::{McpService, ToolRegistry};
