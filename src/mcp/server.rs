//! JSON-RPC 2.0 server — newline-delimited requests in, responses out.
//!
//! Tracing goes to stderr so it never interleaves with the protocol.

use std::io::{self, BufRead, Write};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::tools;
use super::types::*;
use crate::service::{with_service, SharedService};

/// Serve requests from stdin until it closes.
pub fn run(service: SharedService) {
    info!("JSON-RPC server starting");
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(&service, stdin.lock(), &mut stdout.lock());
    info!("JSON-RPC server shutting down");
}

/// Serve requests from `input`, writing one response line per request to `output`.
pub fn serve(service: &SharedService, input: impl BufRead, output: &mut impl Write) {
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, "failed to read request stream");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(request = %trimmed, "received request");

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "invalid JSON-RPC request");
                let message = format!("Parse error: {}", e);
                let response = JsonRpcResponse::failure(None, codes::PARSE_ERROR, message);
                write_response(output, &response);
                continue;
            }
        };

        if let Some(response) = handle_request(service, &request) {
            write_response(output, &response);
        }
    }
}

/// Handle one request; notifications get no response.
fn handle_request(service: &SharedService, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    let id = request.id.clone();

    match request.method.as_str() {
        "initialize" => {
            info!("client initializing");
            let result = InitializeResult {
                protocol_version: PROTOCOL_VERSION,
                capabilities: ServerCapabilities {
                    tools: Value::Object(Default::default()),
                },
                server_info: ServerInfo {
                    name: "heronet",
                    version: env!("CARGO_PKG_VERSION"),
                },
            };
            Some(JsonRpcResponse::from_serializable(id, &result))
        }

        "notifications/initialized" => None,

        "tools/list" => Some(JsonRpcResponse::from_serializable(
            id,
            &ToolsListResult {
                tools: tools::list_tools(),
            },
        )),

        "tools/call" => {
            let params: ToolsCallParams = match serde_json::from_value(request.params.clone()) {
                Ok(p) => p,
                Err(e) => {
                    return Some(JsonRpcResponse::failure(
                        id,
                        codes::INVALID_PARAMS,
                        format!("Invalid params: {}", e),
                    ));
                }
            };
            debug!(tool = %params.name, "calling tool");

            match with_service(service, |svc| {
                tools::call_tool(svc, &params.name, &params.arguments)
            }) {
                Ok(result) => Some(JsonRpcResponse::from_serializable(id, &result)),
                Err(e) => Some(JsonRpcResponse::failure(
                    id,
                    codes::INTERNAL_ERROR,
                    e.to_string(),
                )),
            }
        }

        "ping" => Some(JsonRpcResponse::success(id, Value::Object(Default::default()))),

        _ => {
            warn!(method = %request.method, "unknown method");
            Some(JsonRpcResponse::failure(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ))
        }
    }
}

fn write_response(output: &mut impl Write, response: &JsonRpcResponse) {
    let json = match serde_json::to_string(response) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "failed to serialize response");
            return;
        }
    };
    debug!(response = %json, "sending response");
    if let Err(e) = writeln!(output, "{}", json).and_then(|_| output.flush()) {
        error!(error = %e, "failed to write response");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::HeroService;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn exchange(requests: &[Value]) -> Vec<Value> {
        let input: String = requests.iter().map(|r| format!("{}\n\n", r)).collect();
        exchange_raw(&input)
    }

    fn exchange_raw(input: &str) -> Vec<Value> {
        let service = HeroService::open(Box::new(MemoryStore::new()))
            .unwrap()
            .into_shared();
        let mut out = Vec::new();
        serve(&service, input.as_bytes(), &mut out);
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_session_round() {
        let responses = exchange(&[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": {"name": "add_hero", "arguments": {"name": "A"}}
            }),
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {"name": "hero_stats"}
            }),
        ]);

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "heronet");
        assert_eq!(responses[1]["id"], 2);

        let stats_text = responses[2]["result"]["content"][0]["text"].as_str().unwrap();
        let stats: Value = serde_json::from_str(stats_text).unwrap();
        assert_eq!(stats["total_heroes"], 1);
    }

    #[test]
    fn test_protocol_errors() {
        let garbled = exchange_raw("not json\n");
        assert_eq!(garbled[0]["error"]["code"], codes::PARSE_ERROR);

        let responses = exchange(&[
            json!({"jsonrpc": "2.0", "id": 7, "method": "teleport"}),
            json!({"jsonrpc": "2.0", "id": 8, "method": "tools/call", "params": {"arguments": {}}}),
        ]);
        assert_eq!(responses[0]["error"]["code"], codes::METHOD_NOT_FOUND);
        assert_eq!(responses[1]["error"]["code"], codes::INVALID_PARAMS);
    }
}
