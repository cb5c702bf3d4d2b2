pub mod city_emissions;
pub mod health;
pub mod registry;

pub use registry::{RegistryError, ToolDescriptor, ToolHandler, ToolRegistry};

use crate::protocol::{
    negotiate_protocol_version, InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ToolCallParams,
};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "citycatalyst-global-api";

const INSTRUCTIONS: &str = "Query the CityCatalyst Global API. Use `health_check` to verify the \
service is reachable and `get_city_emissions` to fetch total CO2eq emissions for a city \
(locode such as \"BR SER\"), year, data source and GPC reference number.";

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(req: &JsonRpcRequest, registry: &ToolRegistry) -> Option<JsonRpcResponse> {
    if req.jsonrpc != "2.0" {
        return Some(JsonRpcResponse::error(
            req.id.clone(),
            JsonRpcError::invalid_request(),
        ));
    }

    // Requests sent without an id have nobody to answer to and no side effects.
    if req.is_notification() && !req.method.starts_with("notifications/") {
        tracing::debug!(method = %req.method, "dropping request sent as notification");
        return None;
    }

    match req.method.as_str() {
        "initialize" => {
            let params: Option<InitializeParams> = req
                .params
                .as_ref()
                .and_then(|v| serde_json::from_value(v.clone()).ok());
            let requested = params.as_ref().and_then(|p| p.protocol_version.as_deref());
            let version = negotiate_protocol_version(requested);

            if let Some(client) = params.as_ref().and_then(|p| p.client_info.as_ref()) {
                tracing::info!(
                    client = client.name.as_deref().unwrap_or("unknown"),
                    client_version = client.version.as_deref().unwrap_or("unknown"),
                    protocol_version = version,
                    "client initializing"
                );
            }

            let result = serde_json::json!({
                "protocolVersion": version,
                "capabilities": {
                    "tools": { "listChanged": false }
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                },
                "instructions": INSTRUCTIONS
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "ping" => Some(JsonRpcResponse::success(req.id.clone(), serde_json::json!({}))),

        "tools/list" => Some(JsonRpcResponse::success(req.id.clone(), registry.list_tools())),

        "tools/call" => {
            let params: ToolCallParams = match &req.params {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::invalid_params(format!(
                                "Invalid tools/call params: {e}"
                            )),
                        ));
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params("Missing params for tools/call"),
                    ));
                }
            };

            let tool_result = registry.call(&params.name, params.arguments).await;
            match serde_json::to_value(&tool_result) {
                Ok(result) => Some(JsonRpcResponse::success(req.id.clone(), result)),
                Err(e) => Some(JsonRpcResponse::error(
                    req.id.clone(),
                    JsonRpcError::internal_error(format!("Failed to encode tool result: {e}")),
                )),
            }
        }

        // Transports act on the notifications they understand before dispatch.
        m if m.starts_with("notifications/") && req.is_notification() => {
            tracing::debug!(method = %req.method, "notification acknowledged");
            None
        }

        _ => Some(JsonRpcResponse::error(
            req.id.clone(),
            JsonRpcError::method_not_found(&req.method),
        )),
    }
}
