//! Storage Module
//!
//! This module provides the store contract and its three interchangeable
//! backends, together with the value type and the TTL scheduler they share.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     trait Store                           │
//! │  ┌────────────┐  ┌────────────┐  ┌──────────────────┐     │
//! │  │ HashStore  │  │   RbTree   │  │    BPlusTree     │     │
//! │  │ (chained   │  │ (red-black │  │ (B = 10, chained │     │
//! │  │  buckets)  │  │   tree)    │  │     leaves)      │     │
//! │  └─────┬──────┘  └─────┬──────┘  └────────┬─────────┘     │
//! │        │               │                  │               │
//! │        └───────────────┼──────────────────┘               │
//! │                        ▼                                  │
//! │              ┌───────────────────┐                        │
//! │              │     Scheduler     │  one per backend;      │
//! │              │ (delayed deletes) │  fires `delete` on     │
//! │              └───────────────────┘  background workers    │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Every backend guards its state with a single mutex, locked once per public
//! operation. Compound operations (`rename`, the `upload` loop) run against
//! private `*_locked` bodies under that one acquisition. The scheduler's TTL
//! callbacks take the same lock when they fire, so expiry is linearized with
//! caller traffic.

pub mod bptree;
pub mod hash;
pub mod rbtree;
pub mod record;
pub mod scheduler;

// Re-export commonly used types
pub use bptree::BPlusTree;
pub use hash::HashStore;
pub use rbtree::RbTree;
pub use record::{Record, WILDCARD};
pub use scheduler::{Scheduler, TaskId};

use std::path::Path;

/// The operational contract shared by all backends.
///
/// Failures surface as `false` / `None` / default values; nothing here
/// panics across the API boundary. Backends are safe to share across threads
/// and their TTL callbacks may invoke `delete` concurrently with callers.
pub trait Store: Send + Sync {
    /// Inserts `key` with `value`. Returns `false` without changes if the
    /// key already exists. `lifetime` of `Some(n)` schedules deletion of the
    /// key after `n` seconds.
    fn set(&self, key: &str, value: Record, lifetime: Option<u64>) -> bool;

    /// Returns the stored record, or a default (all-empty) record if the key
    /// is absent.
    fn get(&self, key: &str) -> Record;

    /// Whether the key is present.
    fn exists(&self, key: &str) -> bool;

    /// Removes the key, cancelling any pending expiry first. Returns whether
    /// a removal occurred.
    fn delete(&self, key: &str) -> bool;

    /// Merges `patch` into the stored record (wildcard fields leave the
    /// stored field unchanged). Returns `false` if the key is absent.
    fn update(&self, key: &str, patch: &Record) -> bool;

    /// All keys. Ascending for the tree backends; bucket order for the hash
    /// backend.
    fn keys(&self) -> Vec<String>;

    /// Moves `from` to `to`, preserving the value and any remaining TTL.
    /// `false` if `from` is absent or `to` already exists; renaming a key to
    /// itself succeeds without changes.
    fn rename(&self, from: &str, to: &str) -> bool;

    /// Seconds until the key's scheduled deletion: `Some(0)` when already
    /// due, `None` when no deletion is pending.
    fn ttl(&self, key: &str) -> Option<u64>;

    /// Keys whose records match `query` under wildcard equality, in
    /// [`keys`](Store::keys) order.
    fn find(&self, query: &Record) -> Vec<String>;

    /// All records, aligned with [`keys`](Store::keys).
    fn show_all(&self) -> Vec<Record>;

    /// Reads records from the text file at `path`, inserting each. Stops at
    /// the first parse failure. Returns the number of parsed records, or 0
    /// if the file cannot be opened.
    fn upload(&self, path: &Path) -> usize;

    /// Writes every entry to the text file at `path`, one line each.
    /// Returns the number of lines written, or 0 if the file cannot be
    /// opened.
    fn export(&self, path: &Path) -> usize;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Backend-agnostic contract tests, exercised from every backend's test
/// module against the same fixtures.
#[cfg(test)]
pub(crate) mod contract {
    use super::*;
    use std::time::Duration;

    pub fn persons() -> Vec<Record> {
        vec![
            Record::new("LastName0", "FirstName0", "2001", "City0", "0"),
            Record::new("LastName1", "FirstName1", "2002", "City1", "1"),
            Record::new("LastName2", "FirstName2", "2003", "City2", "2"),
            Record::new("LastName3", "FirstName3", "2004", "City3", "3"),
            Record::new("LastName4", "FirstName1", "2005", "City4", "4"),
            Record::new("LastName5", "FirstName2", "2001", "City5", "10"),
            Record::new("LastName6", "FirstName3", "2002", "City6", "11"),
            Record::new("LastName7", "FirstName1", "2003", "City7", "12"),
            Record::new("LastName8", "FirstName2", "2004", "City8", "13"),
            Record::new("LastName9", "FirstName3", "2005", "City9", "14"),
        ]
    }

    /// Fills the store with `foo0..foo9` mapped to `persons()[0..10]`.
    pub fn fill(store: &dyn Store) {
        for (i, person) in persons().into_iter().enumerate() {
            assert!(store.set(&format!("foo{i}"), person, None));
        }
    }

    pub fn set_then_get(store: &dyn Store) {
        let person = persons()[0].clone();
        assert!(store.set("foo0", person.clone(), None));
        assert_eq!(store.get("foo0"), person);
        assert!(store.exists("foo0"));
        assert_eq!(store.len(), 1);
    }

    pub fn set_twice_keeps_first_value(store: &dyn Store) {
        fill(store);
        assert!(!store.set("foo0", persons()[1].clone(), None));
        assert_eq!(store.get("foo0"), persons()[0]);
        assert_eq!(store.len(), 10);
    }

    pub fn get_missing_returns_default(store: &dyn Store) {
        assert_eq!(store.get("foo"), Record::default());
        assert!(!store.exists("foo"));
    }

    pub fn delete_removes_entry(store: &dyn Store) {
        fill(store);
        assert!(store.delete("foo0"));
        assert!(!store.exists("foo0"));
        assert_eq!(store.len(), 9);
    }

    pub fn delete_missing_is_noop(store: &dyn Store) {
        fill(store);
        assert!(!store.delete("bar"));
        assert_eq!(store.len(), 10);
    }

    pub fn update_merges_fields(store: &dyn Store) {
        fill(store);
        assert!(store.update("foo0", &Record::new("-", "Updated", "-", "-", "99")));

        let updated = store.get("foo0");
        assert_eq!(updated, Record::new("LastName0", "Updated", "2001", "City0", "99"));
    }

    pub fn update_missing_returns_false(store: &dyn Store) {
        fill(store);
        assert!(!store.update("foo", &persons()[1]));
    }

    pub fn keys_lists_every_entry(store: &dyn Store) {
        fill(store);
        assert_eq!(store.keys().len(), 10);
    }

    pub fn rename_moves_value(store: &dyn Store) {
        fill(store);
        assert!(store.rename("foo1", "foo"));
        assert!(!store.exists("foo1"));
        assert!(store.exists("foo"));
        assert_eq!(store.get("foo"), persons()[1]);
        assert_eq!(store.len(), 10);
    }

    pub fn rename_same_key_succeeds(store: &dyn Store) {
        fill(store);
        assert!(store.rename("foo2", "foo2"));
        assert_eq!(store.get("foo2"), persons()[2]);
    }

    pub fn rename_missing_source_fails(store: &dyn Store) {
        assert!(!store.rename("foo", "new_name"));
        assert!(!store.rename("foo", "foo"));
    }

    pub fn rename_existing_destination_fails(store: &dyn Store) {
        fill(store);
        assert!(!store.rename("foo1", "foo2"));
        assert_eq!(store.get("foo1"), persons()[1]);
        assert_eq!(store.get("foo2"), persons()[2]);
    }

    pub fn find_honors_wildcards(store: &dyn Store) {
        fill(store);

        // persons 1, 4 and 7 share first_name "FirstName1".
        let mut matches = store.find(&Record::new("-", "FirstName1", "-", "-", "-"));
        matches.sort();
        assert_eq!(matches, vec!["foo1", "foo4", "foo7"]);

        assert_eq!(store.find(&Record::new("-", "-", "-", "-", "-")).len(), 10);
        assert!(store.find(&Record::new("Nobody", "-", "-", "-", "-")).is_empty());
    }

    pub fn keys_align_with_show_all(store: &dyn Store) {
        fill(store);

        let keys = store.keys();
        let records = store.show_all();
        assert_eq!(keys.len(), records.len());
        for (key, record) in keys.iter().zip(&records) {
            assert_eq!(&store.get(key), record);
        }
    }

    pub fn ttl_absent_without_lifetime(store: &dyn Store) {
        fill(store);
        assert_eq!(store.ttl("foo0"), None);
        assert_eq!(store.ttl("missing"), None);
    }

    pub async fn ttl_lower_bound(store: &dyn Store) {
        assert!(store.set("foo", persons()[0].clone(), Some(100)));

        let remaining = store.ttl("foo").expect("pending deletion");
        assert!((99..=100).contains(&remaining), "ttl was {remaining}");
    }

    pub async fn ttl_expiry_removes_key(store: &dyn Store) {
        assert!(store.set("foo", persons()[0].clone(), Some(1)));
        assert!(store.exists("foo"));

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert!(!store.exists("foo"));
        assert_eq!(store.ttl("foo"), None);
    }

    pub async fn delete_cancels_pending_expiry(store: &dyn Store) {
        assert!(store.set("foo", persons()[0].clone(), Some(1)));
        assert!(store.delete("foo"));

        // Re-insert without a lifetime; the cancelled task must not fire.
        assert!(store.set("foo", persons()[1].clone(), None));
        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert!(store.exists("foo"));
    }

    pub async fn rename_preserves_ttl(store: &dyn Store) {
        assert!(store.set("foo", persons()[0].clone(), Some(100)));
        assert!(store.rename("foo", "bar"));

        let remaining = store.ttl("bar").expect("pending deletion");
        assert!((98..=100).contains(&remaining), "ttl was {remaining}");
        assert_eq!(store.ttl("foo"), None);
    }

    /// Exports `store` and uploads the file into `other`, then compares.
    pub fn upload_export_round_trip(store: &dyn Store, other: &dyn Store) {
        fill(store);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.txt");

        assert_eq!(store.export(&path), 10);
        assert_eq!(other.upload(&path), 10);

        let mut keys = store.keys();
        keys.sort();
        let mut other_keys = other.keys();
        other_keys.sort();
        assert_eq!(keys, other_keys);
        for key in &keys {
            assert_eq!(store.get(key), other.get(key));
        }
    }

    pub fn upload_missing_file_returns_zero(store: &dyn Store) {
        assert_eq!(store.upload(Path::new("/no/such/file.txt")), 0);
        assert!(store.is_empty());
    }

    pub fn upload_stops_at_first_parse_failure(store: &dyn Store) {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "foo0 \"Last0\" \"First0\" 2001 \"City0\" 0").unwrap();
        writeln!(file, "foo1 \"Last1\" \"First1\" 2002 \"City1\" 1").unwrap();
        writeln!(file, "foo2 Last2 broken line").unwrap();
        writeln!(file, "foo3 \"Last3\" \"First3\" 2004 \"City3\" 3").unwrap();
        drop(file);

        assert_eq!(store.upload(&path), 2);
        assert!(store.exists("foo0"));
        assert!(store.exists("foo1"));
        assert!(!store.exists("foo3"));
    }
}
