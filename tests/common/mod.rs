//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use citycatalyst_mcp_server::client::{EmissionsQuery, GlobalApi, GlobalApiError, GlobalApiResult};
use citycatalyst_mcp_server::handlers::ToolRegistry;
use citycatalyst_mcp_server::protocol::JsonRpcRequest;

/// In-memory `GlobalApi` that records every call it receives.
pub struct FakeApi {
    health: GlobalApiResult<Value>,
    emissions: GlobalApiResult<Value>,
    delay: Option<Duration>,
    pub health_calls: AtomicUsize,
    pub emissions_calls: AtomicUsize,
    pub last_query: Mutex<Option<EmissionsQuery>>,
}

impl FakeApi {
    pub fn healthy() -> Self {
        Self {
            health: Ok(json!({ "status": "ok" })),
            emissions: Ok(json!({ "totalEmissions": 12345.6 })),
            delay: None,
            health_calls: AtomicUsize::new(0),
            emissions_calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn with_health(mut self, result: GlobalApiResult<Value>) -> Self {
        self.health = result;
        self
    }

    pub fn with_emissions(mut self, result: GlobalApiResult<Value>) -> Self {
        self.emissions = result;
        self
    }

    /// Delay emissions lookups, to keep calls in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn emissions_calls(&self) -> usize {
        self.emissions_calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<EmissionsQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl GlobalApi for FakeApi {
    async fn check_health(&self) -> GlobalApiResult<Value> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.health.clone()
    }

    async fn get_city_emissions(&self, query: &EmissionsQuery) -> GlobalApiResult<Value> {
        self.emissions_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.emissions.clone()
    }
}

pub fn registry_with(api: Arc<FakeApi>) -> ToolRegistry {
    ToolRegistry::global_api(api).unwrap()
}

pub fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
    serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    }))
    .unwrap()
}

pub fn notification(method: &str, params: Value) -> JsonRpcRequest {
    serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
    }))
    .unwrap()
}

pub fn tool_call(id: i64, name: &str, arguments: Value) -> JsonRpcRequest {
    request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

pub fn not_found(message: &str) -> GlobalApiError {
    GlobalApiError::UpstreamClientError {
        status: 404,
        message: message.to_string(),
    }
}
