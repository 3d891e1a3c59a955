//! Receive/send primitives the call handlers are written against.
//!
//! Handlers never touch tonic types directly. They receive through an
//! [`Inbound`] and send through an [`Outbound`], which keeps every call shape
//! testable against an in-memory transport. The adapters here connect those
//! traits to tonic:
//!
//! - [`tonic::Streaming`] is an [`Inbound`]. A `Status` from the peer becomes
//!   [`Error::Transport`].
//! - A [`mpsc::Sender`] feeding a `ReceiverStream` response is an
//!   [`Outbound`]. Once tonic drops the response stream (the client went
//!   away), every send fails with [`Error::Transport`].
//!
//! [`Cancellable`] wraps either direction so a call blocked on an idle peer
//! ends with [`Error::ServiceShutdown`] once the server cuts off in-flight
//! streams.
//!
//! Client-streaming calls have no `send_and_close`: their handler returns the
//! single terminal response and tonic sends it when the call completes.

use rolodex_tonic_core::{Error, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::{Status, Streaming};

/// Inbound direction of a streaming call.
#[tonic::async_trait]
pub trait Inbound<T>: Send {
    /// Waits for the next message. `Ok(None)` is a clean end of input.
    async fn receive(&mut self) -> Result<Option<T>>;
}

/// Outbound direction of a streaming call.
#[tonic::async_trait]
pub trait Outbound<T>: Send {
    async fn send(&mut self, item: T) -> Result<()>;
}

#[tonic::async_trait]
impl<T> Inbound<T> for Streaming<T>
where
    T: Send + 'static,
{
    async fn receive(&mut self) -> Result<Option<T>> {
        Ok(self.message().await?)
    }
}

#[tonic::async_trait]
impl<T> Outbound<T> for mpsc::Sender<core::result::Result<T, Status>>
where
    T: Send + 'static,
{
    async fn send(&mut self, item: T) -> Result<()> {
        mpsc::Sender::send(self, Ok(item))
            .await
            .map_err(|_| Error::transport("client disconnected"))
    }
}

/// Receive or send that gives up when `shutdown` is cancelled.
pub struct Cancellable<S> {
    inner: S,
    shutdown: CancellationToken,
}

impl<S> Cancellable<S> {
    pub fn new(inner: S, shutdown: CancellationToken) -> Self {
        Self { inner, shutdown }
    }
}

#[tonic::async_trait]
impl<T, S> Inbound<T> for Cancellable<S>
where
    S: Inbound<T>,
    T: Send + 'static,
{
    async fn receive(&mut self) -> Result<Option<T>> {
        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => Err(Error::ServiceShutdown),
            res = self.inner.receive() => res,
        }
    }
}

#[tonic::async_trait]
impl<T, S> Outbound<T> for Cancellable<S>
where
    S: Outbound<T>,
    T: Send + 'static,
{
    async fn send(&mut self, item: T) -> Result<()> {
        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => Err(Error::ServiceShutdown),
            res = self.inner.send(item) => res,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    /// Never yields a message, like a client that opened a stream and went
    /// quiet.
    struct Silent;

    #[tonic::async_trait]
    impl Inbound<u32> for Silent {
        async fn receive(&mut self) -> Result<Option<u32>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn cancellation_ends_an_idle_receive() {
        let token = CancellationToken::new();
        let mut inbound = Cancellable::new(Silent, token.clone());

        let waiter = tokio::spawn(async move { inbound.receive().await });
        tokio::task::yield_now().await;
        token.cancel();

        assert_eq!(waiter.await.unwrap(), Err(Error::ServiceShutdown));
    }

    #[tokio::test]
    async fn cancellation_ends_a_send_into_a_full_channel() {
        let (tx, _rx) = mpsc::channel::<core::result::Result<u32, Status>>(1);
        let token = CancellationToken::new();
        let mut outbound = Cancellable::new(tx, token.clone());

        outbound.send(1).await.unwrap();
        let blocked = tokio::spawn(async move { outbound.send(2).await });
        tokio::task::yield_now().await;
        token.cancel();

        assert_eq!(blocked.await.unwrap(), Err(Error::ServiceShutdown));
    }

    #[tokio::test]
    async fn cancellable_passes_through_until_cancelled() {
        let token = CancellationToken::new();
        let mut inbound = Cancellable::new(mock::MockInbound::new([1_u32, 2]), token.clone());

        assert_eq!(inbound.receive().await, Ok(Some(1)));
        token.cancel();
        assert_eq!(inbound.receive().await, Err(Error::ServiceShutdown));
    }

    #[tokio::test]
    async fn sender_delivers_until_receiver_is_dropped() {
        let (mut tx, mut rx) = mpsc::channel::<core::result::Result<u32, Status>>(4);

        Outbound::send(&mut tx, 7).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().unwrap(), 7);

        drop(rx);
        let err = Outbound::send(&mut tx, 8).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
