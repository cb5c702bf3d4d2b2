use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::registry::{ToolDescriptor, ToolHandler};
use crate::client::{EmissionsQuery, GlobalApi, DEFAULT_GWP};
use crate::protocol::{CityEmissionsParams, McpErrorResponse, ToolResult};

pub const NAME: &str = "get_city_emissions";

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME,
        description: "Get total CO2eq emissions for a city, year and GPC sector \
                      from the CityCatalyst Global API.",
        input_schema: json!({
            "type": "object",
            "required": ["source", "city", "year", "gpc_reference_number"],
            "properties": {
                "source": {
                    "type": "string",
                    "description": "Data source (e.g. \"SEEG\")"
                },
                "city": {
                    "type": "string",
                    "description": "City locode (e.g. \"BR SER\")"
                },
                "year": {
                    "type": "integer",
                    "description": "Inventory year (e.g. 2022)"
                },
                "gpc_reference_number": {
                    "type": "string",
                    "description": "GPC reference number (e.g. \"II.1.1\")"
                },
                "gwp": {
                    "type": "string",
                    "description": "Global Warming Potential standard",
                    "default": DEFAULT_GWP
                }
            },
            "additionalProperties": false
        }),
    }
}

/// Handle a `get_city_emissions` tool call.
///
/// The upstream body is returned as-is; client errors become tool errors.
pub async fn handle(params: CityEmissionsParams, api: &dyn GlobalApi) -> ToolResult {
    let query = EmissionsQuery::from(params);
    info!(
        tool = NAME,
        source = %query.source,
        city = %query.city,
        year = query.year,
        gpc_reference_number = %query.gpc_reference_number,
        gwp = %query.gwp,
        "tool called"
    );

    if let Err(err) = query.validate() {
        info!(tool = NAME, error = %err, "rejected before upstream call");
        return err.into();
    }

    match api.get_city_emissions(&query).await {
        Ok(emissions) => ToolResult::json(emissions),
        Err(err) => {
            let mcp = McpErrorResponse::from(err);
            if mcp.error.code.is_transient() {
                warn!(tool = NAME, error = %mcp.error.message, "upstream unavailable");
            } else {
                info!(tool = NAME, code = ?mcp.error.code, error = %mcp.error.message, "emissions lookup rejected");
            }
            mcp.into()
        }
    }
}

pub struct CityEmissions {
    api: Arc<dyn GlobalApi>,
}

impl CityEmissions {
    pub fn new(api: Arc<dyn GlobalApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ToolHandler for CityEmissions {
    async fn call(&self, arguments: Value) -> ToolResult {
        let params: CityEmissionsParams = match serde_json::from_value(arguments) {
            Ok(p) => p,
            Err(e) => {
                return McpErrorResponse::protocol(format!(
                    "Invalid arguments for {NAME}: {e}"
                ))
                .into();
            }
        };
        handle(params, self.api.as_ref()).await
    }
}
