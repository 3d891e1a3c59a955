//! Streaming call shapes and the plumbing shared between them.
//!
//! Every streaming handler runs the same small state machine:
//!
//! ```text
//! OPEN -> (RECEIVE -> PROCESS -> [SEND] -> loop) -> CLOSED_OK | CLOSED_ERROR
//! ```
//!
//! A handler leaves the loop on a clean end of input (or, for
//! `ListPersons`, once the scan is exhausted) and returns `Ok`. Any receive or
//! send failure is returned immediately; nothing is retried and records that
//! were already appended stay in the store.
//!
//! ## Submodules
//!
//! - [`list`] - `ListPersons` (server streaming).
//! - [`bulk`] - `SavePersons` (client streaming).
//! - [`interactive`] - `AskAndGetPersons` (bidirectional streaming).

pub mod bulk;
pub mod interactive;
pub mod list;

use crate::server::{
    service::lifecycle::CallGuard,
    telemetry::{increment_call_errors, record_stream_duration},
};
use core::{pin::Pin, time::Duration};
use rolodex_tonic_core::{Error, Result};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tokio_util::sync::CancellationToken;
use tonic::Status;
use tracing::Instrument;

/// Response stream type handed back to tonic by the streaming calls.
pub type ResponseStream<T> = Pin<Box<dyn Stream<Item = core::result::Result<T, Status>> + Send>>;

/// Wait inserted before streamed sends to make incremental delivery visible.
///
/// The wait ends early with [`Error::ServiceShutdown`] once the server starts
/// cutting off in-flight streams.
#[derive(Clone, Debug)]
pub struct Pacing {
    delay: Duration,
    shutdown: CancellationToken,
}

impl Pacing {
    pub fn new(delay: Duration, shutdown: CancellationToken) -> Self {
        Self { delay, shutdown }
    }

    /// No delay and no shutdown signal.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, CancellationToken::new())
    }

    pub async fn wait(&self) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Err(Error::ServiceShutdown);
        }
        if self.delay.is_zero() {
            return Ok(());
        }

        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => Err(Error::ServiceShutdown),
            () = tokio::time::sleep(self.delay) => Ok(()),
        }
    }
}

/// Runs a streaming handler on its own task and returns the gRPC response
/// stream it feeds.
///
/// `produce` receives the sending half of a bounded channel of
/// `buffer_size` and resolves to the number of responses it sent. If it
/// fails, the error is forwarded to the client as the terminal `Status` if
/// the channel has room for it. `guard` is held until the task finishes so
/// shutdown can wait for the stream to drain.
pub fn spawn_response_stream<T, F, Fut>(
    call: &'static str,
    buffer_size: usize,
    guard: CallGuard,
    produce: F,
) -> ResponseStream<T>
where
    T: Send + 'static,
    F: FnOnce(mpsc::Sender<core::result::Result<T, Status>>) -> Fut,
    Fut: Future<Output = Result<usize>> + Send + 'static,
{
    let (resp_tx, resp_rx) = mpsc::channel(buffer_size);
    let start = Instant::now();
    let fut = produce(resp_tx.clone());

    let task = async move {
        let _guard = guard;
        match fut.await {
            Ok(sent) => {
                tracing::debug!(sent, "Stream completed");
                record_stream_duration(call, start.elapsed().as_millis() as f64);
            }
            Err(e) => {
                increment_call_errors(call);
                tracing::warn!("Stream aborted: {e}");
                // A full buffer means the client stopped reading; waiting for
                // room would keep the stream open past shutdown.
                if let Err(_e) = resp_tx.try_send(Err(e.into())) {
                    tracing::debug!("Failed to forward error, client is gone or not reading");
                }
            }
        }
    };

    tokio::spawn(task.instrument(tracing::info_span!("streaming", call)));

    Box::pin(ReceiverStream::new(resp_rx))
}
