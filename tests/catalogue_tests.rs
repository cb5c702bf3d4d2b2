use serde_json::json;

use citycatalyst_mcp_server::client::Catalogue;

fn fixture() -> Catalogue {
    serde_json::from_value(json!({
        "datasources": [
            {
                "publisher_id": "SEEG",
                "datasource_name": "SEEGv2023",
                "api_endpoint": "/api/v1/source/SEEGv2023/city/{locode}/{year}/{gpcReferenceNumber}",
                "gpc_reference_number": "II.1.1",
                "start_year": 2000,
                "end_year": 2022,
                "latest_accounting_year": 2022,
                "spatial_resolution": "city",
                "geographical_location": "br",
                "dataset_url": "https://seeg.eco.br"
            },
            {
                "publisher_id": "SEEG",
                "datasource_name": "SEEGv2023",
                "api_endpoint": "/api/v1/source/SEEGv2023/city/{locode}/{year}/{gpcReferenceNumber}",
                "gpc_reference_number": "I.2.1",
                "geographical_location": "BR"
            },
            {
                "publisher_id": "EPA",
                "datasource_name": "EPA_GHGRP",
                "api_endpoint": "/api/v0/source/EPA/city/{locode}/{year}/{gpcReferenceNumber}",
                "gpc_reference_number": "",
                "geographical_location": "US"
            },
            {
                "publisher_id": "ClimateTRACE",
                "datasource_name": "ClimateTRACEv2023",
                "api_endpoint": "/api/v0/climatetrace/city/{locode}/{year}/{gpcReferenceNumber}",
                "geographical_location": "EARTH"
            },
            {
                "publisher_id": "Unknown"
            }
        ]
    }))
    .unwrap()
}

#[test]
fn missing_and_unknown_fields_are_tolerated() {
    let catalogue = fixture();
    assert_eq!(catalogue.datasources.len(), 5);
    assert_eq!(catalogue.datasources[4].publisher_id, "Unknown");
    assert!(catalogue.datasources[4].geographical_location.is_none());

    let empty: Catalogue = serde_json::from_value(json!({})).unwrap();
    assert!(empty.datasources.is_empty());
}

#[test]
fn null_and_mistyped_fields_fall_back_to_defaults() {
    let catalogue: Catalogue = serde_json::from_value(json!({
        "datasources": [
            {
                "publisher_id": null,
                "datasource_name": null,
                "api_endpoint": null,
                "gpc_reference_number": null,
                "start_year": "2000",
                "geographical_location": 76
            },
            null,
            "not an entry",
            { "publisher_id": "SEEG", "geographical_location": "BR", "end_year": 2022 }
        ]
    }))
    .unwrap();

    assert_eq!(catalogue.datasources.len(), 2);
    let broken = &catalogue.datasources[0];
    assert_eq!(broken.publisher_id, "");
    assert!(broken.gpc_reference_number.is_none());
    assert!(broken.start_year.is_none());
    assert!(broken.geographical_location.is_none());

    assert_eq!(catalogue.country_codes(true), vec!["BR"]);
    assert_eq!(catalogue.source_years("seeg").unwrap().end_year, Some(2022));

    let odd: Catalogue = serde_json::from_value(json!({ "datasources": null })).unwrap();
    assert!(odd.datasources.is_empty());
}

#[test]
fn country_codes_are_upper_cased_sorted_and_unique() {
    let catalogue = fixture();
    assert_eq!(catalogue.country_codes(true), vec!["BR", "US"]);
    assert_eq!(catalogue.country_codes(false), vec!["BR", "EARTH", "US"]);
}

#[test]
fn gpc_reference_numbers_match_source_case_insensitively() {
    let catalogue = fixture();
    assert_eq!(catalogue.gpc_reference_numbers("seegv2023"), vec!["I.2.1", "II.1.1"]);
    // Blank GPC codes are skipped.
    assert!(catalogue.gpc_reference_numbers("EPA").is_empty());
    assert!(catalogue.gpc_reference_numbers("EDGAR").is_empty());
}

#[test]
fn datasources_filter_over_publisher_name_and_endpoint() {
    let catalogue = fixture();
    assert_eq!(catalogue.datasources(None).len(), 5);
    assert_eq!(catalogue.datasources(Some("  ")).len(), 5);

    let trace = catalogue.datasources(Some("CLIMATETRACE/city"));
    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].publisher_id, "ClimateTRACE");

    assert_eq!(catalogue.datasources(Some("seeg")).len(), 2);
}

#[test]
fn source_years_uses_first_match() {
    let catalogue = fixture();

    let coverage = catalogue.source_years("SEEG").unwrap();
    assert_eq!(coverage.gpc_reference_number.as_deref(), Some("II.1.1"));
    assert_eq!(coverage.start_year, Some(2000));
    assert_eq!(coverage.latest_accounting_year, Some(2022));

    assert!(catalogue.source_years("EDGAR").is_none());
}
