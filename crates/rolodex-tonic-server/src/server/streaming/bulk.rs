//! `SavePersons`: a stream of records in, one summary out.

use crate::server::{store::RecordStore, telemetry::increment_records_saved, transport::Inbound};
use rolodex_tonic_core::{
    Result,
    codec::summary,
    proto::{SavePersonRequest, SavePersonsResponse},
    types::Person,
};

/// Appends every inbound record until the client half-closes, then returns
/// the summary to send as the call's single response.
///
/// An empty stream still produces a summary. A receive error aborts the call
/// without one; records appended before the error are kept.
pub async fn save_persons<I>(store: &RecordStore, inbound: &mut I) -> Result<SavePersonsResponse>
where
    I: Inbound<SavePersonRequest>,
{
    let mut saved = 0_u64;

    while let Some(req) = inbound.receive().await? {
        let person = store.append(Person::from(req));
        increment_records_saved(1);
        tracing::debug!(name = %person.name, email = %person.email, "Saved person");
        saved += 1;
    }

    tracing::info!(saved, "Bulk save complete");
    Ok(summary(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::transport::mock::MockInbound;
    use rolodex_tonic_core::Error;

    fn request(name: &str, age: u32) -> SavePersonRequest {
        SavePersonRequest {
            name: name.to_string(),
            age,
            email: format!("{name}@y.com"),
            password: "pw".to_string(),
        }
    }

    #[tokio::test]
    async fn appends_every_record_and_summarizes_once() {
        let store = RecordStore::new();
        let mut inbound = MockInbound::new([request("a", 1), request("b", 2), request("c", 3)]);

        let resp = save_persons(&store, &mut inbound).await.unwrap();

        assert_eq!(resp.saved, 3);
        assert_eq!(resp.message, "Successfully saved 3 persons!");
        assert_eq!(store.len(), 3);
        let names: Vec<_> = store.scan(|_| true).map(|p| p.name.clone()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn empty_stream_still_gets_a_summary() {
        let store = RecordStore::new();
        let mut inbound = MockInbound::new([]);

        let resp = save_persons(&store, &mut inbound).await.unwrap();

        assert_eq!(resp.saved, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn receive_error_keeps_earlier_records_and_skips_summary() {
        let store = RecordStore::new();
        let mut inbound = MockInbound::scripted([
            Ok(request("a", 1)),
            Ok(request("b", 2)),
            Err(Error::transport("connection reset")),
            Ok(request("never", 3)),
        ]);

        let err = save_persons(&store, &mut inbound).await.unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
        assert_eq!(store.len(), 2);
        assert_eq!(inbound.received, 3);
    }
}
