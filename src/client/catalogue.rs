//! Typed view of the Global API data catalogue and discovery helpers.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `GET /api/v0/catalogue` response.
///
/// Entries that are not JSON objects are skipped rather than failing the
/// whole catalogue.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Catalogue {
    #[serde(default, deserialize_with = "object_entries")]
    pub datasources: Vec<Datasource>,
}

/// One catalogue entry. Unknown fields are ignored; missing, `null` or
/// mistyped fields fall back to their default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Datasource {
    #[serde(deserialize_with = "or_default")]
    pub publisher_id: String,
    #[serde(deserialize_with = "or_default")]
    pub datasource_name: String,
    #[serde(deserialize_with = "or_default")]
    pub api_endpoint: String,
    #[serde(deserialize_with = "or_default")]
    pub gpc_reference_number: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub start_year: Option<i32>,
    #[serde(deserialize_with = "or_default")]
    pub end_year: Option<i32>,
    #[serde(deserialize_with = "or_default")]
    pub latest_accounting_year: Option<i32>,
    #[serde(deserialize_with = "or_default")]
    pub spatial_resolution: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub geographical_location: Option<String>,
}

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn object_entries<'de, D>(deserializer: D) -> Result<Vec<Datasource>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        _ => return Ok(Vec::new()),
    };
    Ok(entries
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|entry| Datasource::deserialize(entry).ok())
        .collect())
}

/// Discovery summary returned by [`Catalogue::datasources`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasourceSummary {
    pub publisher_id: String,
    pub datasource_name: String,
    pub gpc_reference_number: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub latest_accounting_year: Option<i32>,
    pub spatial_resolution: Option<String>,
    pub geographical_location: Option<String>,
    pub api_endpoint: String,
}

/// Year coverage of a datasource, see [`Catalogue::source_years`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceCoverage {
    pub publisher_id: String,
    pub datasource_name: String,
    pub gpc_reference_number: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub latest_accounting_year: Option<i32>,
    pub geographical_location: Option<String>,
}

impl Datasource {
    /// Case-insensitive match of `source` against name, publisher and endpoint.
    fn matches_source(&self, source: &str) -> bool {
        let needle = source.to_uppercase();
        self.datasource_name.to_uppercase().contains(&needle)
            || self.publisher_id.to_uppercase().contains(&needle)
            || self.api_endpoint.to_uppercase().contains(&needle)
    }

    fn summary(&self) -> DatasourceSummary {
        DatasourceSummary {
            publisher_id: self.publisher_id.clone(),
            datasource_name: self.datasource_name.clone(),
            gpc_reference_number: self.gpc_reference_number.clone(),
            start_year: self.start_year,
            end_year: self.end_year,
            latest_accounting_year: self.latest_accounting_year,
            spatial_resolution: self.spatial_resolution.clone(),
            geographical_location: self.geographical_location.clone(),
            api_endpoint: self.api_endpoint.clone(),
        }
    }
}

impl Catalogue {
    /// Sorted, de-duplicated country codes found in `geographical_location`.
    ///
    /// With `prefer_iso2` only two-letter codes are kept.
    pub fn country_codes(&self, prefer_iso2: bool) -> Vec<String> {
        let codes: BTreeSet<String> = self
            .datasources
            .iter()
            .filter_map(|ds| ds.geographical_location.as_deref())
            .map(str::trim)
            .filter(|loc| !loc.is_empty())
            .filter(|loc| !prefer_iso2 || loc.chars().count() == 2)
            .map(str::to_uppercase)
            .collect();
        codes.into_iter().collect()
    }

    /// Sorted GPC reference numbers covered by datasources matching `source`.
    pub fn gpc_reference_numbers(&self, source: &str) -> Vec<String> {
        let refs: BTreeSet<String> = self
            .datasources
            .iter()
            .filter(|ds| ds.matches_source(source))
            .filter_map(|ds| ds.gpc_reference_number.clone())
            .filter(|gpc| !gpc.is_empty())
            .collect();
        refs.into_iter().collect()
    }

    /// Datasource summaries, optionally filtered by a case-insensitive
    /// substring of publisher id, name or endpoint.
    pub fn datasources(&self, filter: Option<&str>) -> Vec<DatasourceSummary> {
        let needle = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase);

        self.datasources
            .iter()
            .filter(|ds| match &needle {
                Some(needle) => {
                    let haystack = format!(
                        "{} {} {}",
                        ds.publisher_id, ds.datasource_name, ds.api_endpoint
                    )
                    .to_lowercase();
                    haystack.contains(needle.as_str())
                }
                None => true,
            })
            .map(Datasource::summary)
            .collect()
    }

    /// Year coverage of the first datasource matching `source`.
    pub fn source_years(&self, source: &str) -> Option<SourceCoverage> {
        self.datasources
            .iter()
            .find(|ds| ds.matches_source(source))
            .map(|ds| SourceCoverage {
                publisher_id: ds.publisher_id.clone(),
                datasource_name: ds.datasource_name.clone(),
                gpc_reference_number: ds.gpc_reference_number.clone(),
                start_year: ds.start_year,
                end_year: ds.end_year,
                latest_accounting_year: ds.latest_accounting_year,
                geographical_location: ds.geographical_location.clone(),
            })
    }
}
