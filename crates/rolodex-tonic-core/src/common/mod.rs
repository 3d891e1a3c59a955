//! Record types, the response codec, and the error type shared by the server
//! and its clients.
//!
//! ## Submodules
//!
//! - [`codec`] - Maps stored records to outward `PersonResponse` messages.
//! - [`error`] - Unified service error and its `tonic::Status` mapping.
//! - [`types`] - The stored [`Person`](types::Person) record.

pub mod codec;
pub mod error;
pub mod types;

pub use error::{Error, Result};
