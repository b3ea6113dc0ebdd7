//! The Record Value Type
//!
//! Every key in the store maps to a [`Record`] — a small fixed-schema value
//! with five string fields. Two pieces of behavior live here:
//!
//! 1. **Wildcard matching**: a query record may use `-` in any field to mean
//!    "match anything". Matching is deliberately asymmetric (the wildcard is
//!    only honored on the query side), so it is a named method rather than
//!    `PartialEq`, which must stay symmetric.
//! 2. **Merge updates**: applying a patch record replaces only the fields
//!    whose patch value is not `-`.

use std::fmt;

/// The wildcard sentinel. In a query it matches any stored field; in an
/// update patch it leaves the stored field unchanged.
pub const WILDCARD: &str = "-";

/// A stored value: five ordered string fields.
///
/// `birthday` and `coins` hold unsigned decimal digit runs in normal input;
/// the command layer validates that before a record reaches the store.
///
/// # Example
///
/// ```
/// use trikv::storage::Record;
///
/// let stored = Record::new("LastName0", "FirstName0", "2001", "City0", "0");
/// let query = Record::new("-", "FirstName0", "-", "-", "-");
/// assert!(stored.matches(&query));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub last_name: String,
    pub first_name: String,
    pub birthday: String,
    pub city: String,
    pub coins: String,
}

impl Record {
    /// Creates a record from its five fields.
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        birthday: impl Into<String>,
        city: impl Into<String>,
        coins: impl Into<String>,
    ) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            birthday: birthday.into(),
            city: city.into(),
            coins: coins.into(),
        }
    }

    /// Wildcard equality, as used by `find`.
    ///
    /// Field by field, the stored value must equal the query value unless the
    /// query field is [`WILDCARD`]. The wildcard is only honored on the query
    /// side.
    pub fn matches(&self, query: &Record) -> bool {
        fn field_matches(stored: &str, query: &str) -> bool {
            query == WILDCARD || stored == query
        }

        field_matches(&self.last_name, &query.last_name)
            && field_matches(&self.first_name, &query.first_name)
            && field_matches(&self.birthday, &query.birthday)
            && field_matches(&self.city, &query.city)
            && field_matches(&self.coins, &query.coins)
    }

    /// Merge-assigns `patch` into `self`, as used by `update`.
    ///
    /// Fields whose patch value is [`WILDCARD`] are left unchanged; all
    /// other fields are replaced.
    pub fn merge(&mut self, patch: &Record) {
        fn merge_field(stored: &mut String, patch: &str) {
            if patch != WILDCARD {
                patch.clone_into(stored);
            }
        }

        merge_field(&mut self.last_name, &patch.last_name);
        merge_field(&mut self.first_name, &patch.first_name);
        merge_field(&mut self.birthday, &patch.birthday);
        merge_field(&mut self.city, &patch.city);
        merge_field(&mut self.coins, &patch.coins);
    }
}

impl fmt::Display for Record {
    /// Renders the record in its wire form: quoted name/city fields, bare
    /// digit fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" \"{}\" {} \"{}\" {}",
            self.last_name, self.first_name, self.birthday, self.city, self.coins
        )
    }
}
