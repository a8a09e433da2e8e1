//! State of one running conversion, as seen by handlers and hooks.

use lexor_common::StyleOptions;
use lexor_dom::{Diagnostic, Dom, DomError, NodeId};
use log::debug;

use crate::bundle::{EXPANSION_FAILED, Vars};
use crate::directive::Directives;
use crate::expand::{EXPANSION_ERROR, Expansion};

/// Access to the trees, the log and shared state during a conversion.
pub struct Conversion<'a> {
    pub(crate) dom: &'a mut Dom,
    source: NodeId,
    document: NodeId,
    log: NodeId,
    uri: Option<String>,
    options: &'a StyleOptions,
    vars: &'a mut Vars,
    pub(crate) directives: Directives,
    expansion: Option<&'a mut Expansion>,
}

impl<'a> Conversion<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        dom: &'a mut Dom,
        source: NodeId,
        document: NodeId,
        log: NodeId,
        uri: Option<String>,
        options: &'a StyleOptions,
        vars: &'a mut Vars,
        expansion: Option<&'a mut Expansion>,
    ) -> Self {
        Self {
            dom,
            source,
            document,
            log,
            uri,
            options,
            vars,
            directives: Directives::new(),
            expansion,
        }
    }

    /// The arena holding both trees.
    #[must_use]
    pub fn dom(&self) -> &Dom {
        self.dom
    }

    /// Mutable access to the arena.
    pub fn dom_mut(&mut self) -> &mut Dom {
        self.dom
    }

    /// Root of the tree being converted.
    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    /// Root of the tree being built.
    #[must_use]
    pub const fn document(&self) -> NodeId {
        self.document
    }

    /// The conversion log.
    #[must_use]
    pub const fn log(&self) -> NodeId {
        self.log
    }

    /// Uri of the source document, if it has one.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Effective converter options.
    #[must_use]
    pub const fn options(&self) -> &StyleOptions {
        self.options
    }

    /// Variables shared across conversions.
    #[must_use]
    pub fn vars(&self) -> &Vars {
        self.vars
    }

    /// Mutable access to the shared variables.
    pub fn vars_mut(&mut self) -> &mut Vars {
        self.vars
    }

    /// Directives recorded for converted nodes so far.
    #[must_use]
    pub const fn directives(&self) -> &Directives {
        &self.directives
    }

    /// Resolve a requirement string against converted `node`.
    #[must_use]
    pub fn requirement(&self, node: NodeId, req: &str) -> Option<(String, NodeId)> {
        self.directives.get_requirement(self.dom, node, req)
    }

    /// Returns true when an expander is installed.
    #[must_use]
    pub const fn can_expand(&self) -> bool {
        self.expansion.is_some()
    }

    /// Log a coded message about `node`. `uri` defaults to the source uri.
    pub fn msg<I, S>(&mut self, node: NodeId, reporter: &str, code: &str, args: I, uri: Option<&str>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entry = Diagnostic::new(reporter).node(node).code(code).args(args);
        if let Some(file) = uri.or(self.uri.as_deref()) {
            entry = entry.file(file);
        }
        let _ = self.dom.push_diagnostic(self.log, &entry);
    }

    /// Log a literal warning about `node`.
    pub fn warn(&mut self, node: NodeId, message: impl Into<String>) {
        let mut entry = Diagnostic::new("lexor.converter").node(node).message(message);
        if let Some(file) = self.uri.as_deref() {
            entry = entry.file(file);
        }
        let _ = self.dom.push_diagnostic(self.log, &entry);
    }

    /// Replace `node` with the parsed output of running its text.
    ///
    /// Without an installed expander nothing happens. Nested diagnostics
    /// move into this conversion's log. A failing expansion leaves an
    /// `expansion-error` element in place of `node` and logs `E300`.
    /// Returns the node now standing where `node` was, or `node` itself.
    ///
    /// # Errors
    /// Fails when `node` is detached.
    pub fn expand(&mut self, node: NodeId) -> Result<NodeId, DomError> {
        let Some(expansion) = self.expansion.as_deref_mut() else {
            return Ok(node);
        };
        let code = self.dom.text(node).unwrap_or_default().to_string();
        let uri = self.uri.as_deref();
        let failure = match expansion.expander.expand(&code, uri) {
            Ok(text) => match expansion.parser.parse(self.dom, &text, None) {
                Ok(parsed) => {
                    self.dom.merge_log(self.log, parsed.log, uri);
                    let first = self.dom.first_child(parsed.document);
                    self.dom.replace_node(node, parsed.document)?;
                    debug!(target: "lexor.converter", "expanded {node} into {} bytes", text.len());
                    return Ok(first.unwrap_or(node));
                }
                Err(err) => err.to_string(),
            },
            Err(err) => err.to_string(),
        };
        debug!(target: "lexor.converter", "expansion of {node} failed: {failure}");
        let marker = self.dom.create_element(EXPANSION_ERROR);
        let _ = self.dom.append_child(marker, failure.as_str())?;
        self.dom.replace_node(node, vec![marker])?;
        self.msg(marker, "lexor.converter", EXPANSION_FAILED, [failure], None);
        Ok(marker)
    }

    pub(crate) fn into_directives(self) -> Directives {
        self.directives
    }
}
