use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Gate between successive language-model calls. External rate limits are
/// enforced here rather than with retries; the orchestrator issues calls
/// one at a time and waits at this gate.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pace(&self);
}

/// Enforces a minimum interval between consecutive calls. The first call
/// passes immediately.
pub struct FixedIntervalPacer {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl FixedIntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Pacer for FixedIntervalPacer {
    async fn pace(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                debug!("Pacing model call, waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

/// No-op pacer for tests and offline runs.
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn pace(&self) {}
}
