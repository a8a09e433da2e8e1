//! The write traversal.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use lexor_common::StyleOptions;
use lexor_dom::node::{DOCUMENT_NAME, ENTITY_NAME, FRAGMENT_NAME, TEXT_NAME};
use lexor_dom::{Dom, NodeId, NodeKind, Step, Walk};
use log::debug;

use crate::bundle::{Context, DEFAULT_KEY, Entry, NodeWriter, PlainWriter, TagWriter, WriterBundle};
use crate::error::WriterError;
use crate::output::{DEFAULT_WIDTH, Output};

const TARGET: &str = "lexor.writer";

/// Turns a tree into text using the handlers of one style.
pub struct Writer {
    bundle: Arc<WriterBundle>,
    handlers: Vec<Box<dyn NodeWriter>>,
    table: HashMap<String, usize>,
    default: usize,
    options: StyleOptions,
}

impl Writer {
    /// Build a writer for `bundle`.
    ///
    /// Nodes without a handler are written as tags; documents, fragments,
    /// text and entities only contribute their character data. Bundle
    /// entries override these, and aliases resolve in registration order.
    ///
    /// # Errors
    /// Fails when an alias names a key with no handler.
    pub fn new(bundle: Arc<WriterBundle>) -> Result<Self, WriterError> {
        let mut handlers: Vec<Box<dyn NodeWriter>> = vec![Box::new(TagWriter), Box::new(PlainWriter)];
        let mut table = HashMap::new();
        let _ = table.insert(DEFAULT_KEY.to_string(), 0);
        for key in [DOCUMENT_NAME, FRAGMENT_NAME, TEXT_NAME, ENTITY_NAME] {
            let _ = table.insert(key.to_string(), 1);
        }
        let mut aliases = Vec::new();
        for (key, entry) in &bundle.entries {
            match entry {
                Entry::Handler(make) => {
                    handlers.push(make());
                    let _ = table.insert(key.clone(), handlers.len() - 1);
                }
                Entry::Alias(target) => aliases.push((key, target)),
            }
        }
        for (key, target) in aliases {
            let index = table
                .get(target)
                .copied()
                .ok_or_else(|| WriterError::UnknownAlias {
                    key: key.clone(),
                    target: target.clone(),
                })?;
            let _ = table.insert(key.clone(), index);
        }
        let default = table.get(DEFAULT_KEY).copied().unwrap_or_default();
        let options = bundle.default_options().clone();
        debug!(target: TARGET, "writer ready for {}:{}", bundle.lang(), bundle.style());
        Ok(Self {
            bundle,
            handlers,
            table,
            default,
            options,
        })
    }

    /// Override some of the style's default options.
    #[must_use]
    pub fn with_options(mut self, options: &StyleOptions) -> Self {
        self.options.merge(options);
        self
    }

    /// Language being written.
    #[must_use]
    pub fn language(&self) -> &str {
        self.bundle.lang()
    }

    /// Style in use.
    #[must_use]
    pub fn style(&self) -> &str {
        self.bundle.style()
    }

    /// Effective options.
    #[must_use]
    pub const fn options(&self) -> &StyleOptions {
        &self.options
    }

    /// Line width from the `width` option.
    #[must_use]
    pub fn width(&self) -> usize {
        self.options.get_parsed("width").unwrap_or(DEFAULT_WIDTH)
    }

    /// Write `node` and its subtree to `dest`.
    ///
    /// # Errors
    /// Fails only when `dest` does.
    pub fn write(
        &mut self,
        dom: &Dom,
        node: NodeId,
        dest: &mut dyn io::Write,
    ) -> Result<(), WriterError> {
        let text = self.write_to_string(dom, node);
        dest.write_all(text.as_bytes())?;
        dest.flush()?;
        Ok(())
    }

    /// Write `node` and its subtree to a string.
    pub fn write_to_string(&mut self, dom: &Dom, node: NodeId) -> String {
        let mut out = Output::new(self.width());
        let mut cx = Context::new(dom, node, &self.options, &mut out);
        if let Some(hook) = &self.bundle.pre_process {
            hook(&mut cx);
        }

        let mut walk = Walk::new(node);
        // Node whose `child` declined: its exit step writes nothing.
        let mut declined = None;
        while let Some(step) = walk.next_step(dom) {
            match step {
                Step::Enter(id) => {
                    let h = self.handler_index(dom.name(id));
                    let handler = &mut self.handlers[h];
                    handler.start(&mut cx, id);
                    if dom.kind(id).is_some_and(NodeKind::is_character_data) {
                        handler.data(&mut cx, id);
                    } else if !dom.children(id).is_empty() && !handler.child(&mut cx, id) {
                        walk.skip_children();
                        declined = Some(id);
                    }
                }
                Step::Exit(id) => {
                    if declined == Some(id) {
                        declined = None;
                        continue;
                    }
                    let h = self.handler_index(dom.name(id));
                    self.handlers[h].end(&mut cx, id);
                }
            }
        }

        if let Some(hook) = &self.bundle.post_process {
            hook(&mut cx);
        }
        out.into_string()
    }

    fn handler_index(&self, name: &str) -> usize {
        self.table.get(name).copied().unwrap_or(self.default)
    }
}
