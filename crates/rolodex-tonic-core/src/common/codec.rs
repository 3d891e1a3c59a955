//! Maps stored [`Person`] records to outward [`PersonResponse`] messages.
//!
//! Every function here is pure: the same record and [`Outcome`] always give
//! the same response, and nothing can fail. `secret` is never copied.

use crate::{
    proto::{PersonResponse, SavePersonsResponse},
    types::Person,
};

/// What happened to the record a response describes. Selects the message
/// template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Returned by an email lookup.
    Found,
    /// Returned as one item of an email listing.
    Listed,
    /// Appended to the store.
    Saved,
}

impl Outcome {
    fn message(self, person: &Person) -> String {
        match self {
            Outcome::Found => format!("Successfully found!(email:{})", person.email),
            Outcome::Listed => format!("Successfully listed!(email:{})", person.email),
            Outcome::Saved => format!(
                "Successfully saved!(name:{}, email: {})",
                person.name, person.email
            ),
        }
    }
}

/// Builds the outward view of `person`.
pub fn to_response(person: &Person, outcome: Outcome) -> PersonResponse {
    PersonResponse {
        name: person.name.clone(),
        age: person.age,
        email: person.email.clone(),
        message: outcome.message(person),
    }
}

/// Builds the single acknowledgement sent when a bulk save completes.
pub fn summary(saved: u64) -> SavePersonsResponse {
    let noun = if saved == 1 { "person" } else { "persons" };
    SavePersonsResponse {
        message: format!("Successfully saved {saved} {noun}!"),
        saved,
    }
}
