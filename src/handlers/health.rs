use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::registry::{ToolDescriptor, ToolHandler};
use crate::client::GlobalApi;
use crate::protocol::ToolResult;

pub const NAME: &str = "health_check";

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME,
        description: "Check the health of the CityCatalyst Global API service. \
                      Tests the database connection and returns the service status.",
        input_schema: json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        }),
    }
}

/// Handle a `health_check` tool call: the upstream status, unchanged.
pub async fn handle(api: &dyn GlobalApi) -> ToolResult {
    info!(tool = NAME, "tool called");
    match api.check_health().await {
        Ok(status) => ToolResult::json(status),
        Err(err) => {
            warn!(tool = NAME, error = %err, "health check failed");
            err.into()
        }
    }
}

pub struct HealthCheck {
    api: Arc<dyn GlobalApi>,
}

impl HealthCheck {
    pub fn new(api: Arc<dyn GlobalApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ToolHandler for HealthCheck {
    async fn call(&self, _arguments: Value) -> ToolResult {
        handle(self.api.as_ref()).await
    }
}
