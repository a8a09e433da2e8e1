//! Converter style bundles and the handler contract.

use std::collections::BTreeMap;
use std::fmt;

use lexor_common::{MessageTable, StyleOptions};
use lexor_dom::{DomError, NodeId};

use crate::conversion::Conversion;
use crate::directive::DirectiveSpec;

/// Handler key used for nodes without a handler of their own.
pub const DEFAULT_KEY: &str = "__default__";

/// An expansion failed.
pub const EXPANSION_FAILED: &str = "E300";

/// Message templates for the codes the engine itself reports.
#[must_use]
pub fn core_messages() -> MessageTable {
    MessageTable::new().with(EXPANSION_FAILED, "expansion failed: {0}")
}

/// Converts one kind of node.
///
/// The engine clones each source node, attaches the clone, then calls
/// [`NodeConverter::start`] with it. Once the node's children have been
/// converted it calls [`NodeConverter::end`].
pub trait NodeConverter {
    /// Copy the node at all. When false the node and its subtree are
    /// left out.
    fn copy(&self) -> bool {
        true
    }

    /// Convert the node's children.
    fn copy_children(&self) -> bool {
        true
    }

    /// Adjust or replace the fresh copy.
    ///
    /// Returns the node that receives the converted children.
    ///
    /// # Errors
    /// Tree changes that are not allowed abort the conversion.
    fn start(&mut self, _cx: &mut Conversion<'_>, node: NodeId) -> Result<NodeId, DomError> {
        Ok(node)
    }

    /// Finish the copy after its children were converted.
    ///
    /// # Errors
    /// Tree changes that are not allowed abort the conversion.
    fn end(&mut self, _cx: &mut Conversion<'_>, _node: NodeId) -> Result<(), DomError> {
        Ok(())
    }
}

/// Copies nodes unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyNode;

impl NodeConverter for CopyNode {}

/// Leaves nodes and their subtrees out.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipNode;

impl NodeConverter for SkipNode {
    fn copy(&self) -> bool {
        false
    }
}

/// Per-converter variables shared by hooks and handlers.
pub type Vars = BTreeMap<String, String>;

/// Hook run once per converter, before its first conversion.
pub type InitHook = Box<dyn Fn(&StyleOptions, &mut Vars) + Send + Sync>;

/// Hook run at the start or end of every conversion.
pub type Hook = Box<dyn Fn(&mut Conversion<'_>) -> Result<(), DomError> + Send + Sync>;

pub(crate) type Factory = Box<dyn Fn() -> Box<dyn NodeConverter> + Send + Sync>;

/// Everything a converter style provides.
pub struct ConverterBundle {
    from: String,
    to: String,
    style: String,
    pub(crate) entries: Vec<(String, Factory)>,
    pub(crate) directives: Vec<(DirectiveSpec, Factory)>,
    pub(crate) init_converter: Option<InitHook>,
    pub(crate) init_conversion: Option<Hook>,
    pub(crate) finish: Option<Hook>,
    messages: MessageTable,
    defaults: StyleOptions,
}

impl ConverterBundle {
    /// Bundle converting `from` into `to` with `style`. Every node is
    /// copied until handlers are added.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            style: style.into(),
            entries: Vec::new(),
            directives: Vec::new(),
            init_converter: None,
            init_conversion: None,
            finish: None,
            messages: core_messages(),
            defaults: StyleOptions::new(),
        }
    }

    /// Convert nodes named `key` with handlers made by `factory`.
    pub fn handler<F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn NodeConverter> + Send + Sync + 'static,
    {
        let key = key.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, Box::new(factory)));
        self
    }

    /// Run handlers made by `factory` on elements carrying `spec`.
    pub fn directive<F>(&mut self, spec: DirectiveSpec, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn NodeConverter> + Send + Sync + 'static,
    {
        self.directives.retain(|(s, _)| s.name != spec.name);
        self.directives.push((spec, Box::new(factory)));
        self
    }

    /// Set the once-per-converter hook.
    pub fn init_converter<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&StyleOptions, &mut Vars) + Send + Sync + 'static,
    {
        self.init_converter = Some(Box::new(hook));
        self
    }

    /// Set the hook run before each conversion.
    pub fn init_conversion<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Conversion<'_>) -> Result<(), DomError> + Send + Sync + 'static,
    {
        self.init_conversion = Some(Box::new(hook));
        self
    }

    /// Set the hook run after each conversion.
    pub fn finish<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Conversion<'_>) -> Result<(), DomError> + Send + Sync + 'static,
    {
        self.finish = Some(Box::new(hook));
        self
    }

    /// Add message templates for the bundle's own codes.
    pub fn messages(&mut self, table: &MessageTable) -> &mut Self {
        self.messages.extend(table);
        self
    }

    /// Set the style's default options.
    pub fn defaults(&mut self, defaults: StyleOptions) -> &mut Self {
        self.defaults = defaults;
        self
    }

    /// Source language.
    #[must_use]
    pub fn from_lang(&self) -> &str {
        &self.from
    }

    /// Target language.
    #[must_use]
    pub fn to_lang(&self) -> &str {
        &self.to
    }

    /// Style of the bundle.
    #[must_use]
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Message table for rendering conversion diagnostics.
    #[must_use]
    pub const fn message_table(&self) -> &MessageTable {
        &self.messages
    }

    /// Default options.
    #[must_use]
    pub const fn default_options(&self) -> &StyleOptions {
        &self.defaults
    }

    /// Directives the bundle understands, in registration order.
    pub fn directive_specs(&self) -> impl Iterator<Item = &DirectiveSpec> {
        self.directives.iter().map(|(spec, _)| spec)
    }
}

impl fmt::Debug for ConverterBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.entries.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("ConverterBundle")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("style", &self.style)
            .field("keys", &keys)
            .field("directives", &self.directives.len())
            .finish_non_exhaustive()
    }
}
