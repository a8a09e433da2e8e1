//! Writer style bundles and the handler contract.

use std::fmt;

use lexor_common::StyleOptions;
use lexor_dom::{Dom, NodeId, NodeKind};

use crate::escape::escape_attr;
use crate::output::Output;

/// Handler key used for nodes without a handler of their own.
pub const DEFAULT_KEY: &str = "__default__";

/// What a node writer sees while writing.
pub struct Context<'a> {
    dom: &'a Dom,
    root: NodeId,
    options: &'a StyleOptions,
    out: &'a mut Output,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        dom: &'a Dom,
        root: NodeId,
        options: &'a StyleOptions,
        out: &'a mut Output,
    ) -> Self {
        Self {
            dom,
            root,
            options,
            out,
        }
    }

    /// The tree being written.
    #[must_use]
    pub const fn dom(&self) -> &'a Dom {
        self.dom
    }

    /// Node passed to [`Writer::write`](crate::Writer::write).
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Effective writer options.
    #[must_use]
    pub const fn options(&self) -> &'a StyleOptions {
        self.options
    }

    /// The wrapping output.
    pub fn out(&mut self) -> &mut Output {
        self.out
    }

    /// Shorthand for [`Output::write`].
    pub fn write(&mut self, text: &str) {
        self.out.write(text);
    }

    /// Shorthand for [`Output::wrap`].
    pub fn wrap(&mut self, text: &str) {
        self.out.wrap(text);
    }
}

/// Writes one kind of node in three steps: `start`, `data` or `child`,
/// then `end`.
pub trait NodeWriter {
    /// First visit.
    fn start(&mut self, _cx: &mut Context<'_>, _node: NodeId) {}

    /// Payload of a character data node. Writes it as is by default.
    fn data(&mut self, cx: &mut Context<'_>, node: NodeId) {
        if let Some(text) = cx.dom().text(node) {
            cx.write(text);
        }
    }

    /// Called before descending into a node that has children.
    ///
    /// Returning false skips the children and the [`NodeWriter::end`] call
    /// for this node, which is then expected to be fully written.
    fn child(&mut self, _cx: &mut Context<'_>, _node: NodeId) -> bool {
        true
    }

    /// Last visit.
    fn end(&mut self, _cx: &mut Context<'_>, _node: NodeId) {}
}

/// Writes only character data.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainWriter;

impl NodeWriter for PlainWriter {}

/// Writes elements as XML-style tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagWriter;

impl TagWriter {
    /// `<name a="b"` for `node`, without the closing bracket.
    pub fn open_tag(cx: &mut Context<'_>, node: NodeId) {
        let dom = cx.dom();
        cx.write("<");
        cx.write(dom.name(node));
        if let Some(attrs) = dom.attrs(node) {
            for (key, value) in attrs.iter() {
                cx.write(&format!(" {key}=\"{}\"", escape_attr(value)));
            }
        }
    }
}

impl NodeWriter for TagWriter {
    fn start(&mut self, cx: &mut Context<'_>, node: NodeId) {
        Self::open_tag(cx, node);
        if cx.dom().kind(node) == Some(NodeKind::Void) {
            cx.write("/>");
        } else {
            cx.write(">");
        }
    }

    fn end(&mut self, cx: &mut Context<'_>, node: NodeId) {
        if cx.dom().kind(node) != Some(NodeKind::Void) {
            let name = cx.dom().name(node);
            cx.write(&format!("</{name}>"));
        }
    }
}

type Factory = Box<dyn Fn() -> Box<dyn NodeWriter> + Send + Sync>;

/// Hook run before or after a whole write.
pub type Hook = Box<dyn Fn(&mut Context<'_>) + Send + Sync>;

pub(crate) enum Entry {
    Handler(Factory),
    Alias(String),
}

/// Everything a writer style provides.
pub struct WriterBundle {
    lang: String,
    style: String,
    pub(crate) entries: Vec<(String, Entry)>,
    pub(crate) pre_process: Option<Hook>,
    pub(crate) post_process: Option<Hook>,
    defaults: StyleOptions,
}

impl WriterBundle {
    /// Bundle for `lang:style` with only the stock handlers.
    #[must_use]
    pub fn new(lang: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            style: style.into(),
            entries: Vec::new(),
            pre_process: None,
            post_process: None,
            defaults: StyleOptions::new(),
        }
    }

    /// Handle nodes named `key` with writers made by `factory`.
    pub fn handler<F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn NodeWriter> + Send + Sync + 'static,
    {
        self.set(key.into(), Entry::Handler(Box::new(factory)));
        self
    }

    /// Handle nodes named `key` with the handler registered for `target`.
    pub fn alias(&mut self, key: impl Into<String>, target: impl Into<String>) -> &mut Self {
        self.set(key.into(), Entry::Alias(target.into()));
        self
    }

    /// Run `hook` before the first node is written.
    pub fn pre_process<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.pre_process = Some(Box::new(hook));
        self
    }

    /// Run `hook` after the last node is written.
    pub fn post_process<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.post_process = Some(Box::new(hook));
        self
    }

    /// Set the style's default options.
    pub fn defaults(&mut self, defaults: StyleOptions) -> &mut Self {
        self.defaults = defaults;
        self
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

    /// Default options.
    #[must_use]
    pub const fn default_options(&self) -> &StyleOptions {
        &self.defaults
    }

    fn set(&mut self, key: String, entry: Entry) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key, entry)),
        }
    }
}

impl fmt::Debug for WriterBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.entries.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("WriterBundle")
            .field("lang", &self.lang)
            .field("style", &self.style)
            .field("keys", &keys)
            .finish_non_exhaustive()
    }
}
