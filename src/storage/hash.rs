//! Hash Table Backend
//!
//! A bucketed hash table with separate chaining. The bucket count is fixed
//! at construction; lookup and removal are linear within a bucket, which is
//! effectively constant-time for a reasonable capacity and key distribution.
//!
//! `keys`/`show_all`/`find`/`export` enumerate entries in bucket-iteration
//! order - unspecified, but stable for a given capacity and content.

use crate::codec;
use crate::storage::record::Record;
use crate::storage::scheduler::{Scheduler, TaskId};
use crate::storage::Store;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tracing::debug;

struct Slot {
    key: String,
    value: Record,
}

struct Inner {
    buckets: Vec<Vec<Slot>>,
    /// key -> pending expiry task
    pending: HashMap<String, TaskId>,
    len: usize,
}

impl Inner {
    /// Polynomial 31-power hash: `sum of key[i] * 31^(len-1-i)`, mod the
    /// bucket count.
    fn bucket_index(&self, key: &str) -> usize {
        let code = key
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        (code % self.buckets.len() as u64) as usize
    }

    fn slot(&self, key: &str) -> Option<&Slot> {
        self.buckets[self.bucket_index(key)]
            .iter()
            .find(|slot| slot.key == key)
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Slot> {
        let index = self.bucket_index(key);
        self.buckets[index].iter_mut().find(|slot| slot.key == key)
    }

    fn insert(&mut self, key: &str, value: Record) -> bool {
        if self.slot(key).is_some() {
            return false;
        }
        let index = self.bucket_index(key);
        self.buckets[index].push(Slot {
            key: key.to_owned(),
            value,
        });
        self.len += 1;
        true
    }

    fn remove(&mut self, key: &str) -> bool {
        let index = self.bucket_index(key);
        let bucket = &mut self.buckets[index];
        match bucket.iter().position(|slot| slot.key == key) {
            Some(pos) => {
                bucket.remove(pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    fn entries(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.buckets
            .iter()
            .flatten()
            .map(|slot| (slot.key.as_str(), &slot.value))
    }
}

/// The separate-chaining hash backend.
///
/// # Example
///
/// ```no_run
/// use trikv::storage::{HashStore, Record, Store};
///
/// # async fn example() {
/// let store = HashStore::new(64);
/// store.set("name", Record::new("Last", "First", "2001", "City", "10"), None);
/// assert!(store.exists("name"));
/// # }
/// ```
pub struct HashStore {
    inner: Arc<Mutex<Inner>>,
    scheduler: Scheduler,
}

impl HashStore {
    /// Creates a store with the given bucket count (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                buckets: (0..capacity).map(|_| Vec::new()).collect(),
                pending: HashMap::new(),
                len: 0,
            })),
            scheduler: Scheduler::new(),
        }
    }

    /// Stops the expiry workers and waits for them to exit.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }

    fn set_locked(&self, inner: &mut Inner, key: &str, value: Record, lifetime: Option<u64>) -> bool {
        if !inner.insert(key, value) {
            return false;
        }
        if let Some(secs) = lifetime {
            let id = self.schedule_delete(key, secs);
            inner.pending.insert(key.to_owned(), id);
        }
        true
    }

    fn delete_locked(&self, inner: &mut Inner, key: &str) -> bool {
        if let Some(id) = inner.pending.remove(key) {
            self.scheduler.stop_task(id);
        }
        inner.remove(key)
    }

    fn schedule_delete(&self, key: &str, secs: u64) -> TaskId {
        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        let key = key.to_owned();
        self.scheduler.delay_task(Duration::from_secs(secs), move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap();
                inner.pending.remove(&key);
                if inner.remove(&key) {
                    debug!(key = %key, "expired key removed");
                }
            }
        })
    }
}

impl Store for HashStore {
    fn set(&self, key: &str, value: Record, lifetime: Option<u64>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        self.set_locked(&mut inner, key, value, lifetime)
    }

    fn get(&self, key: &str) -> Record {
        let inner = self.inner.lock().unwrap();
        inner.slot(key).map(|slot| slot.value.clone()).unwrap_or_default()
    }

    fn exists(&self, key: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.slot(key).is_some()
    }

    fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        self.delete_locked(&mut inner, key)
    }

    fn update(&self, key: &str, patch: &Record) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.slot_mut(key) {
            Some(slot) => {
                slot.value.merge(patch);
                true
            }
            None => false,
        }
    }

    fn keys(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.entries().map(|(key, _)| key.to_owned()).collect()
    }

    fn rename(&self, from: &str, to: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();

        let Some(value) = inner.slot(from).map(|slot| slot.value.clone()) else {
            return false;
        };
        if from == to {
            return true;
        }

        let remaining = inner
            .pending
            .get(from)
            .map(|id| self.scheduler.remain_time(*id).as_secs());
        if !self.set_locked(&mut inner, to, value, remaining) {
            return false;
        }
        self.delete_locked(&mut inner, from)
    }

    fn ttl(&self, key: &str) -> Option<u64> {
        let inner = self.inner.lock().unwrap();
        inner
            .pending
            .get(key)
            .map(|id| self.scheduler.remain_time(*id).as_secs())
    }

    fn find(&self, query: &Record) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .entries()
            .filter(|(_, value)| value.matches(query))
            .map(|(key, _)| key.to_owned())
            .collect()
    }

    fn show_all(&self) -> Vec<Record> {
        let inner = self.inner.lock().unwrap();
        inner.entries().map(|(_, value)| value.clone()).collect()
    }

    fn upload(&self, path: &Path) -> usize {
        let Ok(file) = File::open(path) else {
            return 0;
        };

        let mut count = 0;
        let mut inner = self.inner.lock().unwrap();
        for line in BufReader::new(file).lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match codec::parse_line(&line) {
                Ok((key, value)) => {
                    self.set_locked(&mut inner, &key, value, None);
                    count += 1;
                }
                Err(_) => break,
            }
        }
        count
    }

    fn export(&self, path: &Path) -> usize {
        let Ok(file) = File::create(path) else {
            return 0;
        };

        let mut writer = BufWriter::new(file);
        let mut count = 0;
        let inner = self.inner.lock().unwrap();
        for (key, value) in inner.entries() {
            if writeln!(writer, "{}", codec::format_line(key, value)).is_err() {
                break;
            }
            count += 1;
        }
        count
    }

    fn len(&self) -> usize {
        self.inner.lock().unwrap().len
    }
}
