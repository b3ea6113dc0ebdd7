//! # TriKV - An In-Memory Key-Value Store With Three Interchangeable Backends
//!
//! TriKV maps string keys to small fixed-schema records and lets you pick the
//! data structure underneath: a bucketed hash table, a red-black tree, or a
//! B+ tree. All three present the same operational contract and share a TTL
//! subsystem that deletes keys on schedule from background workers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             TriKV                               │
//! │                                                                 │
//! │  ┌─────────────┐     ┌──────────────────────────────────────┐   │
//! │  │    REPL     │────>│            trait Store               │   │
//! │  │  (commands) │     │  ┌─────────┐ ┌────────┐ ┌─────────┐  │   │
//! │  └─────────────┘     │  │HashStore│ │ RbTree │ │BPlusTree│  │   │
//! │                      │  └────┬────┘ └───┬────┘ └────┬────┘  │   │
//! │  ┌─────────────┐     └───────┼──────────┼───────────┼───────┘   │
//! │  │ Text codec  │             │          │           │           │
//! │  │ (upload /   │             ▼          ▼           ▼           │
//! │  │  export)    │     ┌──────────────────────────────────────┐   │
//! │  └─────────────┘     │    Scheduler (one per backend)       │   │
//! │                      │  delayed deletes on Tokio workers    │   │
//! │                      └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use trikv::storage::{BPlusTree, Record, Store};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = BPlusTree::new();
//!
//!     // Insert with a 60 second lifetime.
//!     store.set(
//!         "alice",
//!         Record::new("LastName", "FirstName", "1990", "City", "100"),
//!         Some(60),
//!     );
//!
//!     assert!(store.exists("alice"));
//!     assert!(store.ttl("alice").is_some());
//!
//!     // Wildcard search: "-" matches any field.
//!     let hits = store.find(&Record::new("-", "FirstName", "-", "-", "-"));
//!     assert_eq!(hits, vec!["alice"]);
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`storage`]: the `Store` contract, the three backends, the record type
//!   and the TTL scheduler
//! - [`codec`]: the line-oriented text format behind `upload` and `export`
//! - [`commands`]: command parsing and dispatch for the interactive binary
//!
//! ## Design Highlights
//!
//! ### One lock per backend
//!
//! Each backend serializes its operations behind a single mutex. Compound
//! operations (`rename`, the `upload` loop) reuse internal locked bodies
//! under one acquisition instead of re-entering the public API.
//!
//! ### TTL without a clock thread per store
//!
//! A lifetime registers a task with the backend's scheduler. Workers poll at
//! a 100 ms tick and fire at most once; `delete` and `rename` cancel the
//! pending task, and an already-fired task racing a cancellation degrades to
//! a harmless delete of an absent key.
//!
//! ### Trees without pointer cycles
//!
//! Both tree backends keep their nodes in index-based arenas. Child links,
//! parent back-references and the B+ leaf chain are plain indices, so
//! ownership stays trivial and removing a subtree cannot leak or dangle.

pub mod codec;
pub mod commands;
pub mod storage;

// Re-export commonly used types for convenience
pub use codec::{format_line, parse_line, ParseError};
pub use commands::CommandHandler;
pub use storage::{BPlusTree, HashStore, RbTree, Record, Scheduler, Store};

/// Version of TriKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
