//! Request dispatch for the MCP server.

use serde_json::{Value, json};
use tracing::{debug, warn};

use super::protocol::{JsonRpcId, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, error_codes};
use super::tools::{
    ANNOTATE_TOOL, ANNOTATORS_URI, AnnotateArgs, MODELS_URI, resource_definitions,
    tool_definitions,
};
use crate::annotation::AnnotationResponse;
use crate::service::AnnotationService;

/// Answers JSON-RPC requests against an `AnnotationService`.
///
/// Dispatch is synchronous; `tools/call` blocks for the duration of the
/// completion request.
#[derive(Clone)]
pub struct McpHandler {
    service: AnnotationService,
}

impl McpHandler {
    pub fn new(service: AnnotationService) -> Self {
        Self { service }
    }

    /// Parses and handles one raw message.
    ///
    /// Returns `None` for notifications, which get no reply.
    pub fn handle_line(&self, input: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        // Valid JSON that is not a request object; echo the id when readable.
        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<JsonRpcId>(id.clone()).ok());
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!("Invalid request: {}", e);
                return Some(JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ));
            }
        };
        self.handle(request)
    }

    /// Handles one request. Returns `None` for notifications.
    pub fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification received");
            return None;
        }

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                "Invalid JSON-RPC version",
            ));
        }

        debug!(method = %request.method, "handling request");
        let id = request.id;
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params),
            "resources/list" => {
                JsonRpcResponse::success(id, json!({ "resources": resource_definitions() }))
            }
            "resources/read" => self.handle_resources_read(id, request.params),
            other => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<JsonRpcId>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": { "listChanged": false },
                    "resources": { "subscribe": false, "listChanged": false }
                },
                "serverInfo": {
                    "name": "LLM Annotator",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_call(&self, id: Option<JsonRpcId>, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "Missing params for tools/call",
            );
        };

        let Some(tool_name) = params.get("name").and_then(|v| v.as_str()) else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' parameter in tools/call",
            );
        };

        if tool_name != ANNOTATE_TOOL {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("Unknown tool: {}", tool_name),
            );
        }

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
        let args: AnnotateArgs = match serde_json::from_value(arguments) {
            Ok(a) => a,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid arguments for '{}': {}", ANNOTATE_TOOL, e),
                );
            }
        };

        let response = match self.service.annotate(
            &args.context,
            args.annotator.as_deref(),
            args.model.as_deref(),
        ) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "annotate tool failed");
                AnnotationResponse::failed(e.to_string(), None)
            }
        };
        tool_result(id, &response)
    }

    fn handle_resources_read(&self, id: Option<JsonRpcId>, params: Option<Value>) -> JsonRpcResponse {
        let Some(uri) = params
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(|v| v.as_str())
        else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "Missing 'uri' parameter in resources/read",
            );
        };

        let payload = match uri {
            ANNOTATORS_URI => json!({ "annotators": self.service.list_annotators() }),
            MODELS_URI => json!({ "models": self.service.list_models() }),
            other => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Unknown resource: {}", other),
                );
            }
        };

        let text = match serde_json::to_string_pretty(&payload) {
            Ok(t) => t,
            Err(e) => {
                return JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string());
            }
        };

        JsonRpcResponse::success(
            id,
            json!({
                "contents": [{
                    "uri": uri,
                    "mimeType": "application/json",
                    "text": text
                }]
            }),
        )
    }
}

/// Wraps an annotation result as MCP tool content.
///
/// Failed annotations are flagged with `isError` so agents can tell them apart.
fn tool_result(id: Option<JsonRpcId>, response: &AnnotationResponse) -> JsonRpcResponse {
    let text = match serde_json::to_string(response) {
        Ok(t) => t,
        Err(e) => return JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    };

    JsonRpcResponse::success(
        id,
        json!({
            "content": [{ "type": "text", "text": text }],
            "isError": !response.is_success()
        }),
    )
}
