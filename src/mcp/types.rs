//! JSON-RPC 2.0 envelopes and the MCP tool payloads carried inside them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC error codes used by the server.
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// An incoming request. A missing `id` marks a notification; the
/// `jsonrpc` version tag is accepted but not checked.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// A reply to one request: exactly one of `result` or `error`.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(RpcFault),
}

#[derive(Debug, Serialize)]
pub struct RpcFault {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    fn reply(id: Option<Value>, outcome: Outcome) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            outcome,
        }
    }

    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self::reply(id, Outcome::Result(result))
    }

    pub fn failure(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        let fault = RpcFault {
            code,
            message: message.into(),
        };
        Self::reply(id, Outcome::Error(fault))
    }

    /// Serialize `payload` as the result, or fail with an internal error.
    pub fn from_serializable<T: Serialize>(id: Option<Value>, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => Self::success(id, value),
            Err(e) => {
                let message = format!("serialization failed: {}", e);
                Self::failure(id, codes::INTERNAL_ERROR, message)
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: &'static str,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Value,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// A tool advertised by `tools/list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, Serialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct ToolsCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// A text block inside a tool result.
#[derive(Debug, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCallResult {
    pub content: Vec<TextContent>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolsCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text",
                text: text.into(),
            }],
            is_error: false,
        }
    }

    /// Pretty JSON of `value` as a text block.
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::text(text),
            Err(e) => Self::error(format!("serialization failed: {}", e)),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(message)
        }
    }
}
