//! MCP (Model Context Protocol) server module.
//!
//! JSON-RPC 2.0 over STDIO, letting AI agents read and grow the hero
//! network through tool calls.

pub mod server;
pub mod tools;
pub mod types;
