pub mod request;
pub mod response;

pub use request::{
    CancelledParams, CityEmissionsParams, ClientInfo, InitializeParams, JsonRpcRequest, RpcId,
    ToolCallParams,
};
pub use response::{
    JsonRpcError, JsonRpcResponse, McpError, McpErrorCode, McpErrorResponse, ToolResult,
    ToolResultContent,
};

/// Protocol revisions this server understands, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Pick the protocol revision to answer `initialize` with.
///
/// Echoes the client's revision when supported, otherwise offers the latest.
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|r| SUPPORTED_PROTOCOL_VERSIONS.iter().copied().find(|v| *v == r))
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}
