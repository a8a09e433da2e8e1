//! Writer engine for lexor.
//!
//! A [`Writer`] walks a tree and hands each node to the [`NodeWriter`]
//! registered for its name: `start` on the way down, `data` for character
//! data, `child` before descending, `end` on the way up. Handlers emit text
//! through an [`Output`], which can wrap lines at a configured width.

pub mod bundle;
pub mod error;
pub mod escape;
pub mod output;
pub mod writer;

pub use bundle::{Context, DEFAULT_KEY, Hook, NodeWriter, PlainWriter, TagWriter, WriterBundle};
pub use error::WriterError;
pub use output::{DEFAULT_WIDTH, Output};
pub use writer::Writer;
