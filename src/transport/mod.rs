//! Wire transports: newline-delimited stdio and HTTP POST.

pub mod http;
pub mod stdio;

use serde_json::Value;

use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};

/// Maximum bytes per JSON-RPC message (1 MiB).
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Decode one raw JSON-RPC message.
///
/// `Ok(None)` means the input was blank. `Err` carries the error response to
/// send back to the peer.
pub fn decode_request(raw: &[u8]) -> Result<Option<JsonRpcRequest>, JsonRpcResponse> {
    if raw.len() > MAX_MESSAGE_BYTES {
        tracing::warn!(bytes = raw.len(), limit = MAX_MESSAGE_BYTES, "message too large");
        return Err(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
    }

    let Ok(text) = std::str::from_utf8(raw) else {
        return Err(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| {
        tracing::warn!(error = %e, "parse error");
        JsonRpcResponse::error(None, JsonRpcError::parse_error())
    })?;

    if value.is_array() {
        return Err(JsonRpcResponse::error(
            None,
            JsonRpcError::invalid_request_with("Batch requests are not supported"),
        ));
    }

    // Salvage the id so the peer can correlate the rejection.
    let id = value
        .get("id")
        .and_then(|v| serde_json::from_value::<RpcId>(v.clone()).ok());
    serde_json::from_value(value)
        .map(Some)
        .map_err(|_| JsonRpcResponse::error(id, JsonRpcError::invalid_request()))
}
