use serde::{Deserialize, Serialize};

use crate::client::{EmissionsQuery, DEFAULT_GWP};

/// JSON-RPC 2.0 ID, either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    Str(String),
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Requests without an id are notifications and get no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Arguments of the `get_city_emissions` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct CityEmissionsParams {
    pub source: String,
    pub city: String,
    pub year: i32,
    pub gpc_reference_number: String,
    pub gwp: Option<String>,
}

impl From<CityEmissionsParams> for EmissionsQuery {
    fn from(params: CityEmissionsParams) -> Self {
        EmissionsQuery::new(
            params.source,
            params.city,
            params.year,
            params.gpc_reference_number,
        )
        .with_gwp(params.gwp.unwrap_or_else(|| DEFAULT_GWP.to_string()))
    }
}

/// MCP `initialize` params.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

/// Parameters of the `notifications/cancelled` notification.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelledParams {
    #[serde(rename = "requestId")]
    pub request_id: RpcId,
    pub reason: Option<String>,
}
