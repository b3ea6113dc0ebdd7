//! Command Layer
//!
//! This module implements the command processing layer for the interactive
//! binary. It receives raw input lines, validates them, executes them
//! against the selected backend, and renders replies.
//!
//! ```text
//! input line ──> CommandHandler ──> trait Store ──> reply text
//! ```
//!
//! ## Supported Commands
//!
//! - `SET key last first birthday city coins [EX seconds]`
//! - `GET key` / `EXISTS key` / `DEL key` / `TTL key`
//! - `UPDATE key last first birthday city coins` (`-` keeps a field)
//! - `FIND last first birthday city coins` (`-` matches anything)
//! - `KEYS` / `SHOWALL`
//! - `RENAME from to`
//! - `UPLOAD path` / `EXPORT path`
//! - `Q` / `QUIT`

pub mod handler;

// Re-export the main command handler
pub use handler::{CommandHandler, Outcome};
