//! `ListPersons`: one email in, every matching record streamed out.

use super::Pacing;
use crate::server::{store::RecordStore, telemetry::increment_responses_sent, transport::Outbound};
use rolodex_tonic_core::{
    Result,
    codec::{Outcome, to_response},
    proto::PersonResponse,
};

/// Streams every record stored under `email`, oldest first, and returns how
/// many were sent.
///
/// Records appended after the call starts are not included. The pacing delay
/// is applied between consecutive responses, not before the first. An email
/// with no records sends nothing and succeeds.
pub async fn list_persons<O>(
    store: &RecordStore,
    email: &str,
    pacing: &Pacing,
    outbound: &mut O,
) -> Result<usize>
where
    O: Outbound<PersonResponse>,
{
    let mut sent = 0;

    for person in store.scan(|p| p.has_email(email)) {
        if sent > 0 {
            pacing.wait().await?;
        }
        outbound.send(to_response(&person, Outcome::Listed)).await?;
        increment_responses_sent(1);
        sent += 1;
    }

    Ok(sent)
}
