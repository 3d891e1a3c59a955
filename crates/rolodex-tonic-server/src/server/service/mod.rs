//! gRPC service implementation and call lifecycle.
//!
//! ## Structure
//!
//! - [`handler`] - `PersonRegistry` gRPC entry point ([`PersonService`]).
//! - [`unary`] - The two single-request, single-response calls.
//! - [`lifecycle`] - In-flight call tracking and graceful shutdown.

pub mod handler;
pub mod lifecycle;
pub mod unary;

pub use handler::PersonService;
