//! `GetPerson` and `SavePerson`: one request in, one response out.

use crate::server::{store::RecordStore, telemetry::increment_records_saved};
use rolodex_tonic_core::{
    Error, Result,
    codec::{Outcome, to_response},
    proto::{PersonResponse, SavePersonRequest},
    types::Person,
};

/// Returns the oldest record stored under `email`, or [`Error::NotFound`].
pub fn get_person(store: &RecordStore, email: &str) -> Result<PersonResponse> {
    store
        .find_first(|p| p.has_email(email))
        .map(|person| to_response(&person, Outcome::Found))
        .ok_or_else(|| Error::NotFound {
            email: email.to_string(),
        })
}

/// Appends the record unconditionally and echoes its saved view.
pub fn save_person(store: &RecordStore, req: SavePersonRequest) -> PersonResponse {
    let person = store.append(Person::from(req));
    increment_records_saved(1);
    to_response(&person, Outcome::Saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::store::demo_records;

    fn request(name: &str, age: u32, email: &str) -> SavePersonRequest {
        SavePersonRequest {
            name: name.to_string(),
            age,
            email: email.to_string(),
            password: "top-secret".to_string(),
        }
    }

    #[test]
    fn saved_record_can_be_looked_up() {
        let store = RecordStore::new();

        let saved = save_person(&store, request("ada", 36, "ada@example.com"));
        assert_eq!(saved.message, "Successfully saved!(name:ada, email: ada@example.com)");

        let found = get_person(&store, "ada@example.com").unwrap();
        assert_eq!((found.name.as_str(), found.age), ("ada", 36));
        assert_eq!(found.email, "ada@example.com");
        assert_eq!(found.message, "Successfully found!(email:ada@example.com)");
        assert!(!format!("{found:?}").contains("top-secret"));
    }

    #[test]
    fn missing_email_is_not_found() {
        let store = RecordStore::with_records(demo_records());

        let err = get_person(&store, "absent@example.com").unwrap_err();
        assert_eq!(
            err,
            Error::NotFound {
                email: "absent@example.com".to_string()
            }
        );
    }

    #[test]
    fn lookup_is_idempotent() {
        let store = RecordStore::with_records(demo_records());

        let first = get_person(&store, "robbyra@gmail.com").unwrap();
        let second = get_person(&store, "robbyra@gmail.com").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.age, 25);
    }

    #[test]
    fn saving_an_existing_email_adds_a_record() {
        let store = RecordStore::with_records(demo_records());
        let before = store.len();

        save_person(&store, request("again", 99, "robbyra@gmail.com"));

        assert_eq!(store.len(), before + 1);
        // Lookup still returns the oldest record.
        assert_eq!(get_person(&store, "robbyra@gmail.com").unwrap().age, 25);
    }
}
