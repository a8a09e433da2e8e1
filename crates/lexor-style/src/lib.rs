//! Style resolution for lexor.
//!
//! A style is a named bundle of handlers for one language (parsers and
//! writers) or one pair of languages (converters). [`StyleRegistry`] keeps
//! the installed styles and resolves requests, failing with a
//! [`ResolveError`](lexor_common::ResolveError) that names the missing
//! combination. The crate also ships the built-in styles:
//!
//! - `xml:default` parser and writer ([`xml`])
//! - `text:default` writer ([`text`])
//! - `xml->xml` `default` and `clean` converters ([`clean`])

pub mod clean;
pub mod registry;
pub mod text;
pub mod xml;

pub use registry::{StyleRegistry, style_name};
pub use xml::{DEFAULT_STYLE, XML};
