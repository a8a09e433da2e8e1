//! Common utilities for the lexor pipeline.
//!
//! This crate provides shared infrastructure used by every engine:
//! - **Options** - per-style string options ([`StyleOptions`])
//! - **Messages** - diagnostic code tables and `{n}` formatting ([`MessageTable`])
//! - **Errors** - style resolution failures ([`ResolveError`])
//! - **Warning System** - colored, deduplicated terminal warnings

pub mod error;
pub mod message;
pub mod options;
pub mod warning;

pub use error::{ResolveError, StyleKind};
pub use message::{MessageTable, format_message};
pub use options::StyleOptions;
