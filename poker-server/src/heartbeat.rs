//! Per-connection heartbeat watcher.
//!
//! Each connection gets one of these tasks. It ticks on a short interval and
//! marks the seat timed out once client silence exceeds the configured
//! threshold. The flag is advisory, not authoritative: it only drives
//! auto-actions (§4.3) and the showdown spectator demotion (§4.4); it never
//! itself closes the connection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::warn;

use crate::actor::ActorMsg;

const TICK: Duration = Duration::from_secs(5);

/// Shared between the reader task (which bumps it on every inbound frame)
/// and the watcher task (which reads it every tick). `Instant` isn't atomic,
/// so the shared cell stores milliseconds elapsed since an epoch captured at
/// connection start.
pub struct HeartbeatClock {
    epoch: Instant,
    last_seen_ms: AtomicU64,
}

impl HeartbeatClock {
    pub fn new() -> Arc<Self> {
        Arc::new(HeartbeatClock {
            epoch: Instant::now(),
            last_seen_ms: AtomicU64::new(0),
        })
    }

    pub fn touch(&self) {
        let elapsed = self.epoch.elapsed().as_millis() as u64;
        self.last_seen_ms.store(elapsed, Ordering::Relaxed);
    }

    fn silence(&self) -> Duration {
        let last = self.last_seen_ms.load(Ordering::Relaxed);
        let now = self.epoch.elapsed().as_millis() as u64;
        Duration::from_millis(now.saturating_sub(last))
    }
}

pub fn spawn(
    conn_id: String,
    clock: Arc<HeartbeatClock>,
    room_tx: mpsc::UnboundedSender<ActorMsg>,
    timeout: Duration,
) {
    tokio::spawn(async move {
        let mut ticker = interval(TICK);
        let mut currently_timed_out = false;
        loop {
            ticker.tick().await;
            let timed_out = clock.silence() >= timeout;
            if timed_out != currently_timed_out {
                currently_timed_out = timed_out;
                if timed_out {
                    warn!(%conn_id, "connection heartbeat timed out");
                }
                if room_tx
                    .send(ActorMsg::Heartbeat {
                        conn_id: conn_id.clone(),
                        timed_out,
                    })
                    .is_err()
                {
                    return;
                }
            }
        }
    });
}
