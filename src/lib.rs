//! MCP server for the CityCatalyst Global API.
//!
//! Exposes `health_check` and `get_city_emissions` tools over JSON-RPC 2.0,
//! on stdio or HTTP, compatible with any MCP-aware AI agent. Each tool call
//! becomes one GET against the configured Global API base URL.
//!
//! See <https://ccglobal.openearth.dev> for the upstream service.

pub mod client;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod protocol;
pub mod server;
pub mod transport;

pub mod schema;
