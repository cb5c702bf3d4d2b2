use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value;

use crate::client::GlobalApi;
use crate::protocol::{McpErrorResponse, ToolResult};
use crate::schema::{self, SchemaValidationError};

use super::{city_emissions, health};

/// Something a `tools/call` can be routed to.
///
/// `arguments` has already been checked against the tool's input schema.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> ToolResult;
}

/// Tool metadata as advertised by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool {0:?} is already registered")]
    Duplicate(&'static str),
    #[error("invalid input schema for tool {name:?}: {source}")]
    Schema {
        name: &'static str,
        #[source]
        source: SchemaValidationError,
    },
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    validator: Validator,
    handler: Box<dyn ToolHandler>,
}

/// Tool name → (descriptor, compiled argument schema, handler).
///
/// Built once at startup and shared read-only by the transports.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, RegisteredTool>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The Global API tool set: `health_check` and `get_city_emissions`.
    pub fn global_api(api: Arc<dyn GlobalApi>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(
            health::descriptor(),
            health::HealthCheck::new(Arc::clone(&api)),
        )?;
        registry.register(
            city_emissions::descriptor(),
            city_emissions::CityEmissions::new(api),
        )?;
        Ok(registry)
    }

    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        let name = descriptor.name;
        if self.tools.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }
        let validator = schema::compile(&descriptor.input_schema)
            .map_err(|source| RegistryError::Schema { name, source })?;

        self.tools.insert(
            name,
            RegisteredTool {
                descriptor,
                validator,
                handler: Box::new(handler),
            },
        );
        Ok(self)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values().map(|t| &t.descriptor)
    }

    /// Result payload of `tools/list`.
    pub fn list_tools(&self) -> Value {
        serde_json::json!({ "tools": self.descriptors().collect::<Vec<_>>() })
    }

    /// Route a tool call. Unknown tools and schema mismatches never reach a handler.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            return McpErrorResponse::protocol(format!("Unknown tool: {name}")).into();
        };

        let arguments = match arguments {
            Some(Value::Null) | None => Value::Object(Default::default()),
            Some(v) => v,
        };

        if let Err(e) = schema::check(&tool.validator, &arguments) {
            tracing::info!(tool = name, error = %e, "rejected tool arguments");
            return McpErrorResponse::protocol(format!("Invalid arguments for {name}: {e}")).into();
        }

        tool.handler.call(arguments).await
    }
}
