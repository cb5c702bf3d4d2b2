//! HTTP client for the CityCatalyst Global API.

pub mod catalogue;
pub mod error;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::UpstreamConfig;

pub use catalogue::{Catalogue, Datasource, DatasourceSummary, SourceCoverage};
pub use error::GlobalApiError;

/// GWP standard used when the caller does not pick one.
pub const DEFAULT_GWP: &str = "ar5";

const USER_AGENT: &str = concat!("citycatalyst-mcp-server/", env!("CARGO_PKG_VERSION"));

pub type GlobalApiResult<T> = Result<T, GlobalApiError>;

/// Parameters of a city emissions lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionsQuery {
    pub source: String,
    pub city: String,
    pub year: i32,
    pub gpc_reference_number: String,
    #[serde(default = "default_gwp")]
    pub gwp: String,
}

fn default_gwp() -> String {
    DEFAULT_GWP.to_string()
}

impl EmissionsQuery {
    pub fn new(
        source: impl Into<String>,
        city: impl Into<String>,
        year: i32,
        gpc_reference_number: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            city: city.into(),
            year,
            gpc_reference_number: gpc_reference_number.into(),
            gwp: default_gwp(),
        }
    }

    pub fn with_gwp(mut self, gwp: impl Into<String>) -> Self {
        self.gwp = gwp.into();
        self
    }

    /// Presence and path-segment check only; upstream decides whether the values make sense.
    pub fn validate(&self) -> GlobalApiResult<()> {
        require("source", &self.source)?;
        require("city", &self.city)?;
        require("gpc_reference_number", &self.gpc_reference_number)?;
        require("gwp", &self.gwp)?;
        Ok(())
    }
}

fn require(field: &str, value: &str) -> GlobalApiResult<()> {
    if value.trim().is_empty() {
        return Err(GlobalApiError::invalid_argument(format!(
            "`{field}` is required and must not be blank"
        )));
    }
    // URL path normalisation would drop these segments instead of forwarding them.
    if matches!(value, "." | "..") {
        return Err(GlobalApiError::invalid_argument(format!(
            "`{field}` must not be a relative path segment"
        )));
    }
    Ok(())
}

/// The upstream operations exposed as tools.
///
/// Implemented by [`GlobalApiClient`]; tests substitute their own fixtures.
#[async_trait]
pub trait GlobalApi: Send + Sync {
    /// `GET /health`
    async fn check_health(&self) -> GlobalApiResult<Value>;

    /// `GET /api/v1/source/{source}/city/{city}/{year}/{gpc}?gwp={gwp}`
    async fn get_city_emissions(&self, query: &EmissionsQuery) -> GlobalApiResult<Value>;
}

/// reqwest-backed Global API client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GlobalApiClient {
    http: Client,
    base_url: Url,
}

impl GlobalApiClient {
    pub fn new(config: &UpstreamConfig) -> GlobalApiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GlobalApiError::UpstreamUnavailable {
                status: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// `GET /api/v0/cityboundary/city/{locode}/area`
    pub async fn get_city_area(&self, locode: &str) -> GlobalApiResult<Value> {
        require("locode", locode)?;
        let url = self.url(&["api", "v0", "cityboundary", "city", locode, "area"]);
        self.get_json(url).await
    }

    /// `GET /api/v0/catalogue`
    pub async fn get_catalogue(&self) -> GlobalApiResult<Catalogue> {
        let url = self.url(&["api", "v0", "catalogue"]);
        let value = self.get_json(url).await?;
        serde_json::from_value(value).map_err(|e| GlobalApiError::UpstreamUnavailable {
            status: None,
            message: format!("unexpected catalogue shape: {e}"),
        })
    }

    /// `GET /api/v0/catalogue?format=csv`, returned as raw text.
    pub async fn get_catalogue_csv(&self) -> GlobalApiResult<String> {
        let mut url = self.url(&["api", "v0", "catalogue"]);
        url.query_pairs_mut().append_pair("format", "csv");
        let response = self.send(url).await?;
        Ok(response.text().await?)
    }

    /// `GET /api/v0/ccra/city/{country_code}`
    pub async fn get_cities_by_country(&self, country_code: &str) -> GlobalApiResult<Value> {
        require("country_code", country_code)?;
        let url = self.url(&["api", "v0", "ccra", "city", country_code]);
        self.get_json(url).await
    }

    /// Country codes present in the catalogue.
    pub async fn list_available_country_codes(&self, prefer_iso2: bool) -> GlobalApiResult<Vec<String>> {
        Ok(self.get_catalogue().await?.country_codes(prefer_iso2))
    }

    /// GPC reference numbers covered by a source, per the catalogue.
    pub async fn get_gpc_reference_numbers_by_source(&self, source: &str) -> GlobalApiResult<Vec<String>> {
        require("source", source)?;
        Ok(self.get_catalogue().await?.gpc_reference_numbers(source))
    }

    /// Catalogue datasources, optionally filtered.
    pub async fn list_datasources(&self, filter: Option<&str>) -> GlobalApiResult<Vec<DatasourceSummary>> {
        Ok(self.get_catalogue().await?.datasources(filter))
    }

    /// Year coverage for a source, `None` when the catalogue has no match.
    pub async fn get_source_years(&self, source: &str) -> GlobalApiResult<Option<SourceCoverage>> {
        require("source", source)?;
        Ok(self.get_catalogue().await?.source_years(source))
    }

    /// Join percent-encoded path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Base URLs are validated as http(s) at startup, so they always have segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, url: Url) -> GlobalApiResult<Response> {
        debug!(url = %url, "GET request");
        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "upstream request failed");
            GlobalApiError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = GlobalApiError::from_response(status, &body);
        warn!(url = %url, status = status.as_u16(), error = %err, "upstream returned an error");
        Err(err)
    }

    async fn get_json(&self, url: Url) -> GlobalApiResult<Value> {
        let response = self.send(url).await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GlobalApiError::UpstreamUnavailable {
            status: Some(status),
            message: format!("upstream returned invalid JSON: {e}"),
        })
    }
}

#[async_trait]
impl GlobalApi for GlobalApiClient {
    async fn check_health(&self) -> GlobalApiResult<Value> {
        let url = self.url(&["health"]);
        self.get_json(url).await
    }

    async fn get_city_emissions(&self, query: &EmissionsQuery) -> GlobalApiResult<Value> {
        query.validate()?;

        let year = query.year.to_string();
        let mut url = self.url(&[
            "api",
            "v1",
            "source",
            &query.source,
            "city",
            &query.city,
            &year,
            &query.gpc_reference_number,
        ]);
        url.query_pairs_mut().append_pair("gwp", &query.gwp);

        self.get_json(url).await
    }
}
