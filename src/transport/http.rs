use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use super::decode_request;
use crate::config::ListenConfig;
use crate::handlers::{self, ToolRegistry};
use crate::protocol::{JsonRpcError, JsonRpcResponse};
use crate::server::ServerError;

/// Router with the MCP endpoint mounted on `path`.
///
/// Each POST carries one JSON-RPC message and is answered with
/// `application/json`. No SSE stream or session is offered, so GET and
/// DELETE are refused.
pub fn router(registry: Arc<ToolRegistry>, path: &str) -> Router {
    Router::new()
        .route(
            path,
            post(handle_post)
                .get(method_not_allowed)
                .delete(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Bind `listen` and serve until `shutdown` resolves.
pub async fn serve<F>(
    listen: &ListenConfig,
    registry: Arc<ToolRegistry>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listen.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!(addr = %addr, path = %listen.path, "MCP HTTP transport listening");

    axum::serve(listener, router(registry, &listen.path))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn handle_post(State(registry): State<Arc<ToolRegistry>>, body: Bytes) -> Response {
    let req = match decode_request(&body) {
        Ok(Some(req)) => req,
        Ok(None) => {
            let resp = JsonRpcResponse::error(None, JsonRpcError::invalid_request());
            return (StatusCode::BAD_REQUEST, Json(resp)).into_response();
        }
        Err(resp) => return (StatusCode::BAD_REQUEST, Json(resp)).into_response(),
    };

    // A dropped connection drops this future, and with it the upstream call.
    let response = handlers::dispatch(&req, &registry).await;
    match response {
        Some(resp) if !req.is_notification() => (StatusCode::OK, Json(resp)).into_response(),
        _ => StatusCode::ACCEPTED.into_response(),
    }
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST")])
}
