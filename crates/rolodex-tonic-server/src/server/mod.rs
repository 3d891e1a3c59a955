//! The person registry server.
//!
//! ## Structure
//!
//! - [`bootstrap`] - Listener setup, auxiliary services and graceful
//!   shutdown.
//! - [`config`] - CLI/environment configuration.
//! - [`store`] - The shared append-only [`RecordStore`](store::RecordStore).
//! - [`transport`] - The receive/send primitives handlers are written
//!   against, and their tonic adapters.
//! - [`streaming`] - The three streaming call shapes.
//! - [`service`] - The `PersonRegistry` gRPC implementation, the unary
//!   calls, and shutdown coordination.
//! - [`telemetry`] - Logging, tracing and metrics setup.

pub mod bootstrap;
pub mod config;
pub mod service;
pub mod store;
pub mod streaming;
pub mod telemetry;
pub mod transport;
