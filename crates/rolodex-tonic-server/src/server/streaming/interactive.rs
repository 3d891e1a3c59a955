//! `AskAndGetPersons`: every inbound record is saved and answered before the
//! next one is read.

use super::Pacing;
use crate::server::{
    store::RecordStore,
    telemetry::{increment_records_saved, increment_responses_sent},
    transport::{Inbound, Outbound},
};
use rolodex_tonic_core::{
    Result,
    codec::{Outcome, to_response},
    proto::{PersonResponse, SavePersonRequest},
    types::Person,
};

/// Saves each inbound record, waits the pacing delay, and answers with its
/// saved view. Responses therefore come back in arrival order, one per
/// request. Returns the number of answered requests once the client
/// half-closes.
pub async fn ask_and_get_persons<I, O>(
    store: &RecordStore,
    pacing: &Pacing,
    inbound: &mut I,
    outbound: &mut O,
) -> Result<usize>
where
    I: Inbound<SavePersonRequest>,
    O: Outbound<PersonResponse>,
{
    let mut answered = 0;

    while let Some(req) = inbound.receive().await? {
        let person = store.append(Person::from(req));
        increment_records_saved(1);
        tracing::debug!(name = %person.name, email = %person.email, "Saved person");

        pacing.wait().await?;
        outbound.send(to_response(&person, Outcome::Saved)).await?;
        increment_responses_sent(1);
        answered += 1;
    }

    Ok(answered)
}
