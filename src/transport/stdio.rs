use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info};

use super::decode_request;
use crate::handlers::{self, ToolRegistry};
use crate::protocol::{CancelledParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};

/// Serve newline-delimited JSON-RPC 2.0 until `reader` reaches EOF.
///
/// `tools/call` requests run as independent tasks, so responses may be
/// written out of request order. EOF aborts every call still in flight.
pub async fn serve<R, W>(registry: Arc<ToolRegistry>, reader: R, writer: W) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let in_flight = InFlight::default();
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();
    let mut initialized = false;

    loop {
        raw.clear();
        let n = reader.read_until(b'\n', &mut raw).await?;
        if n == 0 {
            break;
        }

        let req = match decode_request(&raw) {
            Ok(Some(req)) => req,
            Ok(None) => continue,
            Err(resp) => {
                send(&tx, resp);
                continue;
            }
        };

        if req.method == "notifications/cancelled" && req.is_notification() {
            in_flight.cancel(&req);
            continue;
        }

        // Initialization gate: only `initialize` and `ping` are allowed before the handshake
        if !initialized && !matches!(req.method.as_str(), "initialize" | "ping") {
            if req.is_notification() {
                continue;
            }
            send(
                &tx,
                JsonRpcResponse::error(
                    req.id.clone(),
                    JsonRpcError::invalid_request_with("Server not initialized"),
                ),
            );
            continue;
        }

        if req.method == "tools/call" && !req.is_notification() {
            in_flight.spawn(req, Arc::clone(&registry), tx.clone());
            continue;
        }

        if let Some(resp) = handlers::dispatch(&req, &registry).await {
            send(&tx, resp);
        }

        if req.method == "initialize" {
            initialized = true;
        }
    }

    debug!("stdin closed");
    in_flight.abort_all();
    drop(tx);

    match writer_task.await {
        Ok(result) => result,
        Err(join_err) => {
            error!(error = %join_err, "writer task failed");
            Ok(())
        }
    }
}

fn send(tx: &mpsc::UnboundedSender<JsonRpcResponse>, resp: JsonRpcResponse) {
    if tx.send(resp).is_err() {
        debug!("response dropped: writer closed");
    }
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(resp) = rx.recv().await {
        let out = serde_json::to_vec(&resp)?;
        writer.write_all(&out).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Tool calls currently running, keyed by request id.
#[derive(Clone, Default)]
struct InFlight {
    tasks: Arc<Mutex<HashMap<RpcId, AbortHandle>>>,
}

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, HashMap<RpcId, AbortHandle>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn(
        &self,
        req: JsonRpcRequest,
        registry: Arc<ToolRegistry>,
        tx: mpsc::UnboundedSender<JsonRpcResponse>,
    ) {
        let Some(id) = req.id.clone() else {
            return;
        };

        // Held until the handle is recorded, so a fast task cannot finish first.
        let mut tasks = self.lock();
        if tasks.contains_key(&id) {
            send(
                &tx,
                JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::invalid_request_with("Request id is already in flight"),
                ),
            );
            return;
        }

        let this = self.clone();
        let task_id = id.clone();
        let handle = tokio::spawn(async move {
            let resp = handlers::dispatch(&req, &registry).await;
            this.lock().remove(&task_id);
            if let Some(resp) = resp {
                send(&tx, resp);
            }
        });
        tasks.insert(id, handle.abort_handle());
    }

    fn cancel(&self, req: &JsonRpcRequest) {
        let params: CancelledParams = match req
            .params
            .as_ref()
            .map(|v| serde_json::from_value(v.clone()))
        {
            Some(Ok(p)) => p,
            _ => {
                debug!("ignoring malformed cancellation");
                return;
            }
        };

        if let Some(handle) = self.lock().remove(&params.request_id) {
            handle.abort();
            info!(
                request_id = ?params.request_id,
                reason = params.reason.as_deref().unwrap_or(""),
                "tool call cancelled"
            );
        }
    }

    fn abort_all(&self) {
        for (_, handle) in self.lock().drain() {
            handle.abort();
        }
    }
}
