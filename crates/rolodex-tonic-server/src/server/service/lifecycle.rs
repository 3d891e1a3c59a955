//! In-flight call tracking and graceful shutdown.
//!
//! Every call holds a [`CallGuard`] for as long as it runs; for streaming
//! calls that is until the task feeding the response stream finishes. The
//! guard keeps an in-flight count that [`Lifecycle::shutdown`] waits on.
//!
//! Shutdown happens in three phases:
//!
//! 1. New calls are refused with [`Error::ServiceShutdown`].
//! 2. In-flight calls get a bounded amount of time to finish on their own.
//! 3. The shared [`CancellationToken`] is cancelled, which cuts short any
//!    pacing wait still in progress. Those streams end with `UNAVAILABLE`.

use crate::server::telemetry::{decrement_calls_inflight, increment_calls_inflight};
use core::time::Duration;
use rolodex_tonic_core::{Error, Result};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Default)]
pub struct Lifecycle {
    inflight: AtomicUsize,
    shutting_down: AtomicBool,
    shutdown_token: CancellationToken,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new call, or refuses it once shutdown has started.
    pub fn begin(self: &Arc<Self>) -> Result<CallGuard> {
        // Count first so a concurrent shutdown never misses this call.
        self.inflight.fetch_add(1, Ordering::SeqCst);

        if self.shutting_down.load(Ordering::SeqCst) {
            self.inflight.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::ServiceShutdown);
        }

        increment_calls_inflight();
        Ok(CallGuard {
            lifecycle: Arc::clone(self),
        })
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Token cancelled in the last phase of shutdown.
    pub fn token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Refuses new calls, waits up to `drain_timeout` for in-flight calls to
    /// finish, then cancels whatever is left.
    pub async fn shutdown(&self, drain_timeout: Duration) {
        tracing::info!("Refusing new calls");
        self.shutting_down.store(true, Ordering::SeqCst);

        tracing::info!("Draining in-flight calls ({} active)", self.inflight());
        let drained = timeout(drain_timeout, async {
            while self.inflight() > 0 {
                sleep(DRAIN_POLL_INTERVAL).await;
            }
        })
        .await;

        match drained {
            Ok(()) => tracing::debug!("All in-flight calls drained"),
            Err(_) => tracing::warn!(
                "Graceful drain timed out ({} calls still active)",
                self.inflight()
            ),
        }

        self.shutdown_token.cancel();
        tracing::info!("Service shutdown complete");
    }
}

/// Marks one call as in flight until dropped.
#[derive(Debug)]
pub struct CallGuard {
    lifecycle: Arc<Lifecycle>,
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.lifecycle.inflight.fetch_sub(1, Ordering::SeqCst);
        decrement_calls_inflight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_track_inflight_calls() {
        let lifecycle = Arc::new(Lifecycle::new());

        let first = lifecycle.begin().unwrap();
        let second = lifecycle.begin().unwrap();
        assert_eq!(lifecycle.inflight(), 2);

        drop(first);
        assert_eq!(lifecycle.inflight(), 1);
        drop(second);
        assert_eq!(lifecycle.inflight(), 0);
    }

    #[tokio::test]
    async fn calls_are_refused_after_shutdown() {
        let lifecycle = Arc::new(Lifecycle::new());
        assert!(!lifecycle.is_shutting_down());
        lifecycle.shutdown(Duration::from_millis(10)).await;
        assert!(lifecycle.is_shutting_down());

        assert_eq!(lifecycle.begin().unwrap_err(), Error::ServiceShutdown);
        assert_eq!(lifecycle.inflight(), 0);
        assert!(lifecycle.token().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_inflight_calls() {
        let lifecycle = Arc::new(Lifecycle::new());
        let guard = lifecycle.begin().unwrap();
        let token = lifecycle.token();

        tokio::spawn(async move {
            sleep(Duration::from_millis(200)).await;
            drop(guard);
        });

        let start = tokio::time::Instant::now();
        lifecycle.shutdown(Duration::from_secs(5)).await;

        assert!(start.elapsed() >= Duration::from_millis(200));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(lifecycle.inflight(), 0);
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_gives_up_after_timeout() {
        let lifecycle = Arc::new(Lifecycle::new());
        let _stuck = lifecycle.begin().unwrap();

        lifecycle.shutdown(Duration::from_millis(300)).await;

        assert_eq!(lifecycle.inflight(), 1);
        assert!(lifecycle.token().is_cancelled());
    }
}
