//! Parser engine for lexor.
//!
//! A [`Parser`] walks its input once. At every step it first asks the open
//! nodes whether the text at the caret closes them, then tries the handlers
//! registered for the current container, and otherwise reads plain text up
//! to the container's boundary characters. Malformed input is never an
//! error: unclosed nodes are closed and reported as diagnostics.
//!
//! ```text
//! [a (b ]      "(b" is auto-closed when "]" closes "[a" (W100)
//! [a text      "[a" is closed at end of input (W101)
//! ```

pub mod bundle;
pub mod error;
pub mod parser;
pub mod scanner;

pub use bundle::{
    AUTO_CLOSED, DEFAULT_KEY, HandlerId, Made, NodeParser, ParserBundle, Rule, UNCLOSED,
    core_messages,
};
pub use error::ParserError;
pub use parser::{Parsed, Parser};
pub use scanner::Scanner;
