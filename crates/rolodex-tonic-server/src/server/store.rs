//! Shared, append-only record store.
//!
//! [`RecordStore`] is a log of [`Person`] records in insertion order. Records
//! are never removed or modified, which keeps the concurrency story small: a
//! single [`RwLock`] guards the backing vector, appends take the write lock
//! for one `push`, and readers take the read lock for as long as it takes to
//! walk the slice they need.
//!
//! Scans are lazy. A [`Scan`] remembers how long the store was when it was
//! created and only ever visits that prefix, so records appended while a scan
//! is in progress are not seen by it. Because existing elements never change,
//! the scan does not need to hold the lock between items; it reacquires the
//! read lock on every [`Iterator::next`] and is safe to keep across `.await`
//! points.

use parking_lot::RwLock;
use rolodex_tonic_core::types::Person;
use std::sync::Arc;

/// Cheaply cloneable handle to the process-wide record log.
#[derive(Clone, Default)]
pub struct RecordStore {
    records: Arc<RwLock<Vec<Arc<Person>>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `records`, in iteration order.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Person>,
    {
        let records = records.into_iter().map(Arc::new).collect();
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Appends `person` as the newest record and returns the stored copy.
    pub fn append(&self, person: Person) -> Arc<Person> {
        let person = Arc::new(person);
        self.records.write().push(Arc::clone(&person));
        person
    }

    /// Lazily yields every record matching `predicate`, oldest first, out of
    /// the records stored when this call returns.
    pub fn scan<P>(&self, predicate: P) -> Scan<P>
    where
        P: Fn(&Person) -> bool,
    {
        Scan {
            store: self.clone(),
            end: self.len(),
            next: 0,
            predicate,
        }
    }

    /// Returns the oldest record matching `predicate`.
    pub fn find_first<P>(&self, predicate: P) -> Option<Arc<Person>>
    where
        P: Fn(&Person) -> bool,
    {
        self.records
            .read()
            .iter()
            .find(|person| predicate(person))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lazy, restartable iterator over a prefix of a [`RecordStore`].
///
/// Created by [`RecordStore::scan`].
#[derive(Clone)]
pub struct Scan<P> {
    store: RecordStore,
    end: usize,
    next: usize,
    predicate: P,
}

impl<P> Scan<P> {
    /// Starts the scan over from the first record of its snapshot.
    pub fn rewind(&mut self) {
        self.next = 0;
    }

    /// Number of records the scan covers, matching or not.
    pub fn snapshot_len(&self) -> usize {
        self.end
    }
}

impl<P> Iterator for Scan<P>
where
    P: Fn(&Person) -> bool,
{
    type Item = Arc<Person>;

    fn next(&mut self) -> Option<Self::Item> {
        let records = self.store.records.read();
        // `end` never exceeds the length: the log only grows.
        while self.next < self.end {
            let person = &records[self.next];
            self.next += 1;
            if (self.predicate)(person) {
                return Some(Arc::clone(person));
            }
        }
        None
    }
}

/// Records the server is seeded with unless started with `--no-seed`.
pub fn demo_records() -> Vec<Person> {
    vec![
        Person::new("sangwooAged25", 25, "robbyra@gmail.com", "sangwooPassword"),
        Person::new("sangwooAged26", 26, "robbyra@gmail.com", "sangwooPassword"),
        Person::new("sangwooAged27", 27, "robbyra@gmail.com", "sangwooPassword"),
        Person::new("notSangwoo", 1, "notSangwoo@gmail.com", "notSangwooPassword"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn person(name: &str, age: u32, email: &str) -> Person {
        Person::new(name, age, email, "secret")
    }

    #[test]
    fn append_preserves_insertion_order() {
        let store = RecordStore::new();
        assert!(store.is_empty());

        store.append(person("a", 1, "x@y.com"));
        store.append(person("b", 2, "z@y.com"));
        store.append(person("c", 3, "x@y.com"));

        assert_eq!(store.len(), 3);
        let names: Vec<_> = store.scan(|_| true).map(|p| p.name.clone()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn duplicate_emails_are_kept_as_separate_records() {
        let store = RecordStore::with_records([person("old", 25, "x@y.com")]);
        store.append(person("new", 26, "x@y.com"));

        let ages: Vec<_> = store.scan(|p| p.has_email("x@y.com")).map(|p| p.age).collect();
        assert_eq!(ages, [25, 26]);
    }

    #[test]
    fn find_first_returns_oldest_match() {
        let store = RecordStore::with_records(demo_records());

        let found = store.find_first(|p| p.has_email("robbyra@gmail.com")).unwrap();
        assert_eq!(found.name, "sangwooAged25");
        assert!(store.find_first(|p| p.has_email("nobody@gmail.com")).is_none());
    }

    #[test]
    fn scan_ignores_records_appended_after_it_started() {
        let store = RecordStore::with_records([person("a", 1, "x@y.com")]);
        let mut scan = store.scan(|p| p.has_email("x@y.com"));

        store.append(person("b", 2, "x@y.com"));

        assert_eq!(scan.snapshot_len(), 1);
        assert_eq!(scan.next().map(|p| p.age), Some(1));
        assert!(scan.next().is_none());
        assert_eq!(store.scan(|p| p.has_email("x@y.com")).count(), 2);
    }

    #[test]
    fn scan_is_lazy_and_restartable() {
        let store = RecordStore::with_records(demo_records());
        let mut scan = store.scan(|p| p.has_email("robbyra@gmail.com"));

        assert_eq!(scan.next().map(|p| p.age), Some(25));
        scan.rewind();
        let ages: Vec<_> = scan.clone().map(|p| p.age).collect();
        assert_eq!(ages, [25, 26, 27]);
        let again: Vec<_> = scan.map(|p| p.age).collect();
        assert_eq!(again, ages);
    }

    #[test]
    fn concurrent_appends_lose_nothing() {
        const THREADS: usize = 16;
        const PER_THREAD: usize = 250;

        let store = RecordStore::with_records(demo_records());
        let initial = store.len();

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        store.append(person(&format!("t{t}-{i}"), i as u32, &format!("t{t}@y.com")));
                        // Interleave reads with the writes of other threads.
                        let _ = store.scan(|p| p.age == 0).count();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), initial + THREADS * PER_THREAD);
        for t in 0..THREADS {
            let email = format!("t{t}@y.com");
            let ages: Vec<_> = store.scan(|p| p.has_email(&email)).map(|p| p.age).collect();
            // Appends from one thread stay in that thread's order.
            assert_eq!(ages, (0..PER_THREAD as u32).collect::<Vec<_>>());
        }
    }
}
