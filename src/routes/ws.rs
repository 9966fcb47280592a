// WebSocket handler and per-connection stream loop

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::sampler::Sampler;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the metrics connection count on drop (connect = +1, drop = -1).
struct WsMetricsGuard(Arc<AtomicUsize>);

impl Drop for WsMetricsGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
    }
}

pub(super) async fn ws_metrics(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let sampler = state.sampler.clone();
    let conn_count = state.ws_connections.clone();
    let interval_ms = state.config.monitoring.sample_interval_ms;
    ws.on_upgrade(move |socket| async move {
        conn_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let _guard = WsMetricsGuard(conn_count);
        if let Err(e) = stream_metrics(socket, sampler, interval_ms).await {
            tracing::info!("metrics stream error: {}", e);
        }
    })
}

/// One timer per connection. A failed tick is logged and skipped; the timer
/// keeps running. The loop (and its timer) ends the moment a send fails,
/// which is how disconnects surface here.
async fn stream_metrics(
    mut socket: WebSocket,
    sampler: Arc<Sampler>,
    interval_ms: u64,
) -> anyhow::Result<()> {
    tracing::info!("Client connected to metrics stream");

    // Silent warm-up: prime the CPU load baseline before the first frame.
    if let Err(e) = sampler.warm_up().await {
        tracing::warn!(error = %e, operation = "warm_up", "CPU warm-up read failed");
    }

    let mut tick = tokio::time::interval(tokio::time::Duration::from_millis(interval_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                let payload = match sampler.sample().await {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(error = %e, operation = "sample", "tick skipped");
                        continue;
                    }
                };
                let json = serde_json::to_string(&payload)?;
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    tracing::info!("Client disconnected from metrics stream");
    Ok(())
}
