//! Opt-in execution of code embedded in documents.
//!
//! Running embedded code is arbitrary code execution, so converters never
//! do it on their own. A caller installs an [`Expander`] together with the
//! [`Parser`] that reads its output through
//! [`Converter::with_expander`](crate::Converter::with_expander), and a
//! style maps the relevant processing-instruction target to
//! [`ExpandHandler`].

use lexor_dom::{DomError, NodeId};
use lexor_parser::Parser;

use crate::bundle::NodeConverter;
use crate::conversion::Conversion;
use crate::error::ExpandError;

/// Name of the element left where an expansion failed.
pub const EXPANSION_ERROR: &str = "expansion-error";

/// Runs embedded code and returns the text it printed.
pub trait Expander {
    /// Execute `code` found in the document at `uri`.
    ///
    /// # Errors
    /// Any failure of the code; the message ends up in the output tree.
    fn expand(&mut self, code: &str, uri: Option<&str>) -> Result<String, ExpandError>;
}

/// An expander and the parser for its output.
pub struct Expansion {
    pub(crate) expander: Box<dyn Expander>,
    pub(crate) parser: Parser,
}

impl Expansion {
    /// Pair `expander` with `parser`.
    #[must_use]
    pub fn new(expander: Box<dyn Expander>, parser: Parser) -> Self {
        Self { expander, parser }
    }
}

/// Replaces processing instructions with their expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandHandler;

impl NodeConverter for ExpandHandler {
    fn start(&mut self, cx: &mut Conversion<'_>, node: NodeId) -> Result<NodeId, DomError> {
        cx.expand(node)
    }
}
