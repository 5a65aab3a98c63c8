use anyhow::{Result, bail};
use relaylink_client::ClientEvent;
use std::time::Duration;
use tokio::sync::mpsc;

use super::mock_relay::RelayCall;

/// Timeout for a single expected event (ms).
pub const EVENT_TIMEOUT_MS: u64 = 2000;

/// Timeout for real connection establishment (ms).
pub const CONNECTION_TIMEOUT_MS: u64 = 10000;

/// Wait for the first event matching `pred`, skipping the others.
pub async fn wait_for_event<F>(
    events: &mut mpsc::UnboundedReceiver<ClientEvent>,
    timeout_ms: u64,
    mut pred: F,
) -> Result<ClientEvent>
where
    F: FnMut(&ClientEvent) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    loop {
        match tokio::time::timeout_at(deadline, events.recv()).await {
            Ok(Some(event)) if pred(&event) => return Ok(event),
            Ok(Some(event)) => tracing::debug!("[EventHelper] skipping {:?}", event),
            Ok(None) => bail!("event channel closed"),
            Err(_) => bail!("timed out waiting for event"),
        }
    }
}

/// Wait for the first relay call matching `pred`.
pub async fn wait_for_call<F>(
    calls: &mut mpsc::UnboundedReceiver<RelayCall>,
    timeout_ms: u64,
    mut pred: F,
) -> Result<RelayCall>
where
    F: FnMut(&RelayCall) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    loop {
        match tokio::time::timeout_at(deadline, calls.recv()).await {
            Ok(Some(call)) if pred(&call) => return Ok(call),
            Ok(Some(_)) => continue,
            Ok(None) => bail!("relay call channel closed"),
            Err(_) => bail!("timed out waiting for relay call"),
        }
    }
}

/// Poll `cond` until it holds or the timeout passes.
pub async fn wait_until<F>(timeout_ms: u64, mut cond: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    bail!("condition not met in {}ms", timeout_ms)
}
