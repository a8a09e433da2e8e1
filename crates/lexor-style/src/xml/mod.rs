//! The built-in `xml` language.
//!
//! A forgiving reader for XML-like markup and the matching writer. The
//! writer escapes only what the reader would take for markup, so a parse
//! followed by a write returns well-formed input unchanged.

pub mod parser;
pub mod syntax;
pub mod writer;

/// Language name.
pub const XML: &str = "xml";

/// Style every built-in bundle is registered under.
pub const DEFAULT_STYLE: &str = "default";
