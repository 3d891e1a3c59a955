//! # Person Records
//!
//! [`Person`] is the record the server stores. It is built from an incoming
//! [`SavePersonRequest`] and never changes afterwards; a second save under
//! the same email adds another record instead of replacing the first.
//!
//! The `secret` field travels in on the wire as `password` and is kept with
//! the record, but it has no way back out: the codec never copies it and
//! the [`Debug`] implementation redacts it so it cannot leak into logs.

use crate::proto::SavePersonRequest;
use core::fmt;

/// A stored person record.
#[derive(Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub age: u32,
    /// Lookup key. Not unique.
    pub email: String,
    pub secret: String,
}

impl Person {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        email: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            email: email.into(),
            secret: secret.into(),
        }
    }

    /// Exact, case-sensitive email match.
    pub fn has_email(&self, email: &str) -> bool {
        self.email == email
    }
}

impl fmt::Debug for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Person")
            .field("name", &self.name)
            .field("age", &self.age)
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl From<SavePersonRequest> for Person {
    fn from(req: SavePersonRequest) -> Self {
        Self {
            name: req.name,
            age: req.age,
            email: req.email,
            secret: req.password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_request_password_becomes_secret() {
        let person = Person::from(SavePersonRequest {
            name: "ada".to_string(),
            age: 36,
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
        });

        assert_eq!(person, Person::new("ada", 36, "ada@example.com", "hunter2"));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let person = Person::new("ada", 36, "ada@example.com", "hunter2");
        let rendered = format!("{person:?}");
        assert!(rendered.contains("ada@example.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn email_match_is_exact() {
        let person = Person::new("ada", 36, "ada@example.com", "");
        assert!(person.has_email("ada@example.com"));
        assert!(!person.has_email("ADA@example.com"));
        assert!(!person.has_email("ada@example.com "));
    }
}
