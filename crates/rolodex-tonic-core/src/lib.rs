#![doc = include_str!("../README.md")]

pub mod common;
pub use common::*;

/// gRPC service and message definitions generated from `proto/rolodex.proto`.
///
/// ## Service
///
/// [`PersonRegistry`](proto::person_registry_server::PersonRegistry) exposes
/// one method per gRPC call shape:
///
/// | Method | Shape |
/// |---|---|
/// | `GetPerson`, `SavePerson` | unary |
/// | `ListPersons` | server streaming |
/// | `SavePersons` | client streaming |
/// | `AskAndGetPersons` | bidirectional streaming |
///
/// [`FILE_DESCRIPTOR_SET`](proto::FILE_DESCRIPTOR_SET) carries the encoded
/// schema for gRPC reflection.
pub mod proto {
    tonic::include_proto!("rolodex");
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("rolodex_descriptor");
}
