//! Idempotence regression test.
//!
//! For identical arguments against a fixed upstream fixture, the serialized
//! tool result MUST be byte-identical across invocations, and each
//! invocation MUST issue exactly one upstream request.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use citycatalyst_mcp_server::client::GlobalApiClient;
use citycatalyst_mcp_server::config::UpstreamConfig;
use citycatalyst_mcp_server::handlers::{self, ToolRegistry};
use citycatalyst_mcp_server::protocol::JsonRpcRequest;

fn emissions_call(id: i64) -> JsonRpcRequest {
    serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {
            "name": "get_city_emissions",
            "arguments": {
                "source": "SEEG",
                "city": "BR SER",
                "year": 2022,
                "gpc_reference_number": "II.1.1"
            }
        }
    }))
    .unwrap()
}

async fn registry_for(server: &MockServer) -> ToolRegistry {
    let config = UpstreamConfig::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let client = GlobalApiClient::new(&config).unwrap();
    ToolRegistry::global_api(Arc::new(client)).unwrap()
}

#[tokio::test]
async fn identical_invocations_produce_identical_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/source/SEEG/city/BR%20SER/2022/II.1.1"))
        .and(query_param("gwp", "ar5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totals": { "emissions": { "co2eq_100yr": "12345.6", "co2eq_20yr": "15000.1" } },
            "records": [
                { "gas": "CO2", "emissions_value": "10000.0" },
                { "gas": "CH4", "emissions_value": "80.0" }
            ]
        })))
        .expect(3)
        .mount(&server)
        .await;

    let registry = registry_for(&server).await;

    let mut outputs = Vec::new();
    for _ in 0..3 {
        let resp = handlers::dispatch(&emissions_call(1), &registry).await.unwrap();
        outputs.push(serde_json::to_string(&resp).unwrap());
    }

    assert_eq!(outputs[0], outputs[1], "first and second run differ");
    assert_eq!(outputs[1], outputs[2], "second and third run differ");
}

#[tokio::test]
async fn repeated_client_errors_are_identical_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/source/SEEG/city/BR%20SER/2022/II.1.1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not Found" })))
        .expect(2)
        .mount(&server)
        .await;

    let registry = registry_for(&server).await;

    let first = handlers::dispatch(&emissions_call(7), &registry).await.unwrap();
    let second = handlers::dispatch(&emissions_call(7), &registry).await.unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
