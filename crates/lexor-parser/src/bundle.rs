//! Parser style bundles and the handler contract.

use std::fmt;

use lexor_common::{MessageTable, StyleOptions};
use lexor_dom::{NodeId, Position};

use crate::scanner::Scanner;

/// Rule key used for containers without a rule of their own.
pub const DEFAULT_KEY: &str = "__default__";

/// Auto-closed because an enclosing node closed first.
pub const AUTO_CLOSED: &str = "W100";
/// Still open at the end of the input.
pub const UNCLOSED: &str = "W101";

/// Message templates for the codes the engine itself reports.
#[must_use]
pub fn core_messages() -> MessageTable {
    MessageTable::new()
        .with(AUTO_CLOSED, "auto closing Element '{0}' at line {1}, column {2}")
        .with(
            UNCLOSED,
            "closing string for '{0}' not found, closing at end of input",
        )
}

/// What a handler produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Made {
    /// A node whose content follows; it stays open until its handler's
    /// [`NodeParser::close`] says otherwise. Nodes that cannot hold
    /// children are treated as [`Made::Closed`].
    Open(NodeId),
    /// A complete node.
    Closed(NodeId),
}

impl Made {
    /// The produced node.
    #[must_use]
    pub const fn node(self) -> NodeId {
        match self {
            Self::Open(id) | Self::Closed(id) => id,
        }
    }
}

/// Recognizes one construct of a language.
///
/// Handlers are created once per [`Parser`](crate::Parser) and may keep
/// state between calls.
pub trait NodeParser {
    /// Reporter name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Try to start a node at the caret.
    ///
    /// Return `None` without moving the caret when the construct does not
    /// start here. A handler that returns [`Made::Closed`] must have
    /// consumed input.
    fn make_node(&mut self, cx: &mut Scanner<'_>) -> Option<Made>;

    /// Decide whether the text at the caret closes `node`.
    ///
    /// Consume the closing marker and return the position where the node
    /// closed, or return `None` to keep it open.
    fn close(&mut self, _cx: &mut Scanner<'_>, _node: NodeId) -> Option<Position> {
        None
    }
}

type Factory = Box<dyn Fn() -> Box<dyn NodeParser> + Send + Sync>;

/// Index of a handler registered in a [`ParserBundle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub usize);

/// Which handlers run inside a container, and where plain text stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Body of the character class that ends a text run, e.g. `<&`.
    pub boundary: String,
    /// Handlers tried in order.
    pub handlers: Vec<HandlerId>,
}

/// Everything a parser style provides.
pub struct ParserBundle {
    lang: String,
    style: String,
    factories: Vec<Factory>,
    rules: Vec<(String, Rule)>,
    messages: MessageTable,
    defaults: StyleOptions,
}

impl ParserBundle {
    /// Empty bundle for `lang:style`.
    #[must_use]
    pub fn new(lang: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            style: style.into(),
            factories: Vec::new(),
            rules: Vec::new(),
            messages: core_messages(),
            defaults: StyleOptions::new(),
        }
    }

    /// Register a handler factory.
    pub fn handler<F>(&mut self, factory: F) -> HandlerId
    where
        F: Fn() -> Box<dyn NodeParser> + Send + Sync + 'static,
    {
        self.factories.push(Box::new(factory));
        HandlerId(self.factories.len() - 1)
    }

    /// Set the rule for containers named `key`.
    pub fn rule(&mut self, key: impl Into<String>, boundary: impl Into<String>, handlers: &[HandlerId]) {
        let key = key.into();
        let rule = Rule {
            boundary: boundary.into(),
            handlers: handlers.to_vec(),
        };
        match self.rules.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = rule,
            None => self.rules.push((key, rule)),
        }
    }

    /// Add message templates for the bundle's own codes.
    pub fn messages(&mut self, table: &MessageTable) {
        self.messages.extend(table);
    }

    /// Set the style's default options.
    pub fn defaults(&mut self, defaults: StyleOptions) {
        self.defaults = defaults;
    }

    /// Language of the bundle.
    #[must_use]
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Style of the bundle.
    #[must_use]
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Message table for rendering this style's diagnostics.
    #[must_use]
    pub const fn message_table(&self) -> &MessageTable {
        &self.messages
    }

    /// Default options.
    #[must_use]
    pub const fn default_options(&self) -> &StyleOptions {
        &self.defaults
    }

    pub(crate) fn rules(&self) -> &[(String, Rule)] {
        &self.rules
    }

    pub(crate) fn instantiate(&self) -> Vec<Box<dyn NodeParser>> {
        self.factories.iter().map(|make| make()).collect()
    }
}

impl fmt::Debug for ParserBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserBundle")
            .field("lang", &self.lang)
            .field("style", &self.style)
            .field("handlers", &self.factories.len())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
