//! Error types for the person registry.
//!
//! This module defines the central `Error` enum, which captures every failure
//! a call can report. It implements `From<Error>` for `tonic::Status` so
//! handlers can propagate with `?` and the client receives a distinguishable
//! status code.
//!
//! ## Error Cases
//! - `NotFound`: A lookup matched no stored record.
//! - `Transport`: Receiving from or sending to an open stream failed, usually
//!   because the peer went away.
//! - `MalformedInput`: Reserved for request validation. Nothing produces it
//!   yet.
//! - `ServiceShutdown`: A call arrived while the service was shutting down.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the person registry.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// No record is stored under the requested email.
    #[error("Person not found (email: {email})")]
    NotFound { email: String },

    /// Stream receive/send failure. Records appended before the failure are
    /// kept.
    #[error("Transport error: {context}")]
    Transport { context: String },

    /// The request was malformed.
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl Error {
    pub fn transport(context: impl Into<String>) -> Self {
        Self::Transport {
            context: context.into(),
        }
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { email } => {
                Status::not_found(format!("Person not found (email: {email})"))
            }
            Error::Transport { context } => Status::aborted(format!("Transport error: {context}")),
            Error::MalformedInput { reason } => Status::invalid_argument(reason),
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Error::Transport {
            context: format!("{:?}: {}", status.code(), status.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn errors_map_to_distinct_status_codes() {
        let not_found: Status = Error::NotFound {
            email: "a@b.com".to_string(),
        }
        .into();
        assert_eq!(not_found.code(), Code::NotFound);
        assert!(not_found.message().contains("a@b.com"));

        let transport: Status = Error::transport("peer hung up").into();
        assert_eq!(transport.code(), Code::Aborted);

        let malformed: Status = Error::MalformedInput {
            reason: "missing email".to_string(),
        }
        .into();
        assert_eq!(malformed.code(), Code::InvalidArgument);
        assert_eq!(malformed.message(), "missing email");

        let shutdown: Status = Error::ServiceShutdown.into();
        assert_eq!(shutdown.code(), Code::Unavailable);
    }

    #[test]
    fn peer_status_becomes_transport_error() {
        let err = Error::from(Status::cancelled("client went away"));
        match err {
            Error::Transport { context } => {
                assert!(context.contains("Cancelled"));
                assert!(context.contains("client went away"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
