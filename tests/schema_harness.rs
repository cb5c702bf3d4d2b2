use serde_json::json;

use citycatalyst_mcp_server::handlers::{city_emissions, health};
use citycatalyst_mcp_server::schema::{self, validate_json, SchemaValidationError};

#[test]
fn json_schema_harness_validates_instance() {
    let schema = r#"{
      "$schema": "https://json-schema.org/draft/2020-12/schema",
      "type": "object",
      "required": ["status"],
      "properties": {
        "status": { "type": "string", "minLength": 1 }
      }
    }"#;

    validate_json(schema, r#"{ "status": "ok" }"#).expect("schema validation failed");
    assert!(matches!(
        validate_json(schema, r#"{ "status": "" }"#),
        Err(SchemaValidationError::ValidationFailed(_))
    ));
}

#[test]
fn emissions_schema_accepts_optional_gwp() {
    let validator = schema::compile(&city_emissions::descriptor().input_schema).unwrap();

    let without_gwp = json!({
        "source": "SEEG", "city": "BR SER", "year": 2022, "gpc_reference_number": "II.1.1"
    });
    let with_gwp = json!({
        "source": "SEEG", "city": "BR SER", "year": 2022, "gpc_reference_number": "II.1.1", "gwp": "ar6"
    });

    schema::check(&validator, &without_gwp).unwrap();
    schema::check(&validator, &with_gwp).unwrap();
}

#[test]
fn emissions_schema_reports_violations() {
    let validator = schema::compile(&city_emissions::descriptor().input_schema).unwrap();

    let err = schema::check(&validator, &json!({ "source": "SEEG", "year": 2022.5 })).unwrap_err();
    let SchemaValidationError::ValidationFailed(detail) = err else {
        panic!("expected ValidationFailed");
    };
    assert!(detail.contains("city"), "detail: {detail}");
}

#[test]
fn health_schema_rejects_arguments() {
    let validator = schema::compile(&health::descriptor().input_schema).unwrap();
    schema::check(&validator, &json!({})).unwrap();
    assert!(schema::check(&validator, &json!({ "verbose": true })).is_err());
}
