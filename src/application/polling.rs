//! Background refresh of the side channels.
//!
//! A single spawned loop fetches the usage snapshot and unread
//! notifications at a fixed interval and publishes them on the bus.
//! Fetch failures are logged and skipped; the loop never dies on them.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::ports::{AppEvent, BackendClient, EventPublisher};

/// Default refresh interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Periodic side-channel refresher.
///
/// Owns only `Arc` handles to its collaborators, so tearing down the rest
/// of the application never races against an in-flight tick. Teardown is
/// deterministic: `stop()` aborts the loop, and dropping the agent does
/// the same, so no timer outlives its owner.
pub struct PollingAgent {
    handle: Option<JoinHandle<()>>,
}

impl PollingAgent {
    /// Spawns the polling loop.
    ///
    /// The first refresh happens immediately, then once per `interval`.
    pub fn start<B, P>(backend: Arc<B>, events: Arc<P>, interval: Duration) -> Self
    where
        B: BackendClient + 'static,
        P: EventPublisher + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                refresh_once(backend.as_ref(), events.as_ref()).await;
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Returns true while the loop is alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stops the loop. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for PollingAgent {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One refresh pass. Each fetch is independent; failures are skipped.
async fn refresh_once<B, P>(backend: &B, events: &P)
where
    B: BackendClient,
    P: EventPublisher,
{
    match backend.get_usage_summary().await {
        Ok(summary) => {
            if let Err(err) = events.publish(AppEvent::UsageRefreshed(summary)).await {
                warn!(error = %err, "usage event publication failed");
            }
        }
        Err(err) => warn!(error = %err, "usage poll failed, skipping"),
    }

    match backend.get_notifications(true).await {
        Ok(list) => {
            if let Err(err) = events.publish(AppEvent::NotificationsRefreshed(list)).await {
                warn!(error = %err, "notification event publication failed");
            }
        }
        Err(err) => warn!(error = %err, "notification poll failed, skipping"),
    }
}
