//! The conversion traversal.

use std::collections::HashMap;
use std::sync::Arc;

use lexor_common::StyleOptions;
use lexor_dom::{Dom, NodeId, NodeKind, Step, Walk};
use lexor_parser::Parser;
use log::{debug, trace};

use crate::bundle::{ConverterBundle, CopyNode, DEFAULT_KEY, NodeConverter, Vars};
use crate::conversion::Conversion;
use crate::directive::{DirectiveSpec, Directives, collect_directives};
use crate::error::ConvertError;
use crate::expand::{Expander, Expansion};

const TARGET: &str = "lexor.converter";

/// Result of [`Converter::convert`].
#[derive(Debug, Clone)]
pub struct Converted {
    /// Root of the new tree, of the same kind as the source root.
    pub document: NodeId,
    /// Messages logged during the conversion.
    pub log: NodeId,
    /// Directives recorded for the converted nodes.
    pub directives: Directives,
}

/// A converted node whose end has not been reached.
struct Frame {
    copy: NodeId,
    container: NodeId,
    handler: usize,
    directives: Vec<usize>,
}

/// Builds a tree in one language from a tree in another.
pub struct Converter {
    bundle: Arc<ConverterBundle>,
    handlers: Vec<Box<dyn NodeConverter>>,
    table: HashMap<String, usize>,
    specs: Vec<DirectiveSpec>,
    directive_handlers: Vec<Box<dyn NodeConverter>>,
    options: StyleOptions,
    vars: Vars,
    initialized: bool,
    expansion: Option<Expansion>,
}

impl Converter {
    /// Converter for `bundle`. Nodes without a handler are copied.
    #[must_use]
    pub fn new(bundle: Arc<ConverterBundle>) -> Self {
        let mut handlers: Vec<Box<dyn NodeConverter>> = vec![Box::new(CopyNode)];
        let mut table = HashMap::new();
        let _ = table.insert(DEFAULT_KEY.to_string(), 0);
        for (key, make) in &bundle.entries {
            handlers.push(make());
            let _ = table.insert(key.clone(), handlers.len() - 1);
        }
        let specs = bundle.directives.iter().map(|(spec, _)| spec.clone()).collect();
        let directive_handlers = bundle.directives.iter().map(|(_, make)| make()).collect();
        let options = bundle.default_options().clone();
        debug!(
            target: TARGET,
            "converter ready for {}->{}:{}",
            bundle.from_lang(),
            bundle.to_lang(),
            bundle.style()
        );
        Self {
            bundle,
            handlers,
            table,
            specs,
            directive_handlers,
            options,
            vars: Vars::new(),
            initialized: false,
            expansion: None,
        }
    }

    /// Override some of the style's default options.
    #[must_use]
    pub fn with_options(mut self, options: &StyleOptions) -> Self {
        self.options.merge(options);
        self
    }

    /// Allow [`ExpandHandler`](crate::ExpandHandler) nodes to run code
    /// through `expander`, reading its output with `parser`.
    #[must_use]
    pub fn with_expander(mut self, expander: Box<dyn Expander>, parser: Parser) -> Self {
        self.expansion = Some(Expansion::new(expander, parser));
        self
    }

    /// Source language.
    #[must_use]
    pub fn from_language(&self) -> &str {
        self.bundle.from_lang()
    }

    /// Target language.
    #[must_use]
    pub fn to_language(&self) -> &str {
        self.bundle.to_lang()
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

    /// Variables shared by the style's hooks and handlers.
    #[must_use]
    pub const fn vars(&self) -> &Vars {
        &self.vars
    }

    /// The bundle this converter was built from.
    #[must_use]
    pub const fn bundle(&self) -> &Arc<ConverterBundle> {
        &self.bundle
    }

    /// Convert the document or fragment `root` into a new tree in `dom`.
    ///
    /// # Errors
    /// Fails when `root` is not a document or fragment, or when a handler
    /// makes a tree change that is not allowed.
    pub fn convert(&mut self, dom: &mut Dom, root: NodeId) -> Result<Converted, ConvertError> {
        let kind = dom.kind(root);
        if !kind.is_some_and(NodeKind::is_document) {
            return Err(ConvertError::NotADocument {
                name: dom.name(root).to_string(),
            });
        }
        if !self.initialized {
            if let Some(hook) = &self.bundle.init_converter {
                hook(&self.options, &mut self.vars);
            }
            self.initialized = true;
        }

        let to = self.bundle.to_lang();
        let style = self.bundle.style();
        let document = if kind == Some(NodeKind::Document) {
            dom.create_document(to, style)
        } else {
            dom.create_fragment(to, style)
        };
        let (uri, meta) = dom
            .document(root)
            .map(|d| (d.uri.clone(), d.meta.clone()))
            .unwrap_or_default();
        if let Some(data) = dom.document_mut(document) {
            data.uri.clone_from(&uri);
            data.meta = meta;
            data.defaults = self.options.clone();
        }
        let log = dom.create_log();
        debug!(target: TARGET, "converting {root} into {to}");

        let mut cx = Conversion::new(
            dom,
            root,
            document,
            log,
            uri,
            &self.options,
            &mut self.vars,
            self.expansion.as_mut(),
        );
        if let Some(hook) = &self.bundle.init_conversion {
            hook(&mut cx)?;
        }

        let mut stack: Vec<Frame> = Vec::new();
        // Node left out by its handler: its exit step does nothing.
        let mut skipped = None;
        let mut walk = Walk::new(root);
        while let Some(step) = walk.next_step(cx.dom) {
            match step {
                Step::Enter(id) if id == root => {
                    let h = lookup(&self.table, cx.dom.name(id));
                    let container = self.handlers[h].start(&mut cx, document)?;
                    if !self.handlers[h].copy_children() {
                        walk.skip_children();
                    }
                    stack.push(Frame {
                        copy: document,
                        container,
                        handler: h,
                        directives: Vec::new(),
                    });
                }
                Step::Enter(id) => {
                    let h = lookup(&self.table, cx.dom.name(id));
                    if !self.handlers[h].copy() {
                        trace!(target: TARGET, "skipping {id} '{}'", cx.dom.name(id));
                        walk.skip_children();
                        skipped = Some(id);
                        continue;
                    }
                    let parent = stack.last().map_or(document, |f| f.container);
                    let copy = cx.dom.clone_node(id, false);
                    let _ = cx.dom.append_child(parent, copy)?;

                    let found = collect_directives(cx.dom, id, &self.specs);
                    if !found.is_empty() {
                        let recorded = found
                            .iter()
                            .map(|&i| (self.specs[i].name.clone(), self.specs[i].priority))
                            .collect();
                        cx.directives.set(copy, recorded);
                    }
                    let mut container = self.handlers[h].start(&mut cx, copy)?;
                    for &d in &found {
                        container = self.directive_handlers[d].start(&mut cx, container)?;
                    }
                    if cx.dom.children(id).is_empty() || !self.handlers[h].copy_children() {
                        walk.skip_children();
                    }
                    stack.push(Frame {
                        copy,
                        container,
                        handler: h,
                        directives: found,
                    });
                }
                Step::Exit(id) => {
                    if skipped == Some(id) {
                        skipped = None;
                        continue;
                    }
                    let Some(frame) = stack.pop() else {
                        continue;
                    };
                    for &d in frame.directives.iter().rev() {
                        self.directive_handlers[d].end(&mut cx, frame.copy)?;
                    }
                    self.handlers[frame.handler].end(&mut cx, frame.copy)?;
                    if cx.dom.accepts_children(frame.container) {
                        cx.dom.normalize_children(frame.container);
                    }
                }
            }
        }

        if let Some(hook) = &self.bundle.finish {
            hook(&mut cx)?;
        }
        Ok(Converted {
            document,
            log,
            directives: cx.into_directives(),
        })
    }
}

fn lookup(table: &HashMap<String, usize>, name: &str) -> usize {
    table
        .get(name)
        .or_else(|| table.get(DEFAULT_KEY))
        .copied()
        .unwrap_or_default()
}
