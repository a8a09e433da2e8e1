//! The parse context handed to node parsers.

use lexor_common::StyleOptions;
use lexor_dom::{Diagnostic, Dom, NodeId, Position};

/// Caret over the input plus access to the tree being built.
///
/// The caret is a byte offset that only moves forward and always sits on a
/// character boundary. Positions are 1-based lines and character columns.
pub struct Scanner<'a> {
    text: &'a str,
    caret: usize,
    pos: Position,
    pub(crate) dom: &'a mut Dom,
    pub(crate) log: NodeId,
    pub(crate) container: NodeId,
    pub(crate) reporter: &'static str,
    uri: &'a str,
    options: &'a StyleOptions,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(
        text: &'a str,
        dom: &'a mut Dom,
        root: NodeId,
        log: NodeId,
        uri: &'a str,
        options: &'a StyleOptions,
    ) -> Self {
        Self {
            text,
            caret: 0,
            pos: Position::START,
            dom,
            log,
            container: root,
            reporter: "lexor.parser",
            uri,
            options,
        }
    }

    /// The whole input.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the caret.
    #[must_use]
    pub const fn caret(&self) -> usize {
        self.caret
    }

    /// Line and column of the caret.
    #[must_use]
    pub const fn pos(&self) -> Position {
        self.pos
    }

    /// Returns true once the caret reached the end.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.caret >= self.text.len()
    }

    /// Input from the caret on.
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.text[self.caret..]
    }

    /// Returns true if the input at the caret starts with `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Absolute offset of the next `needle` at or after the caret.
    #[must_use]
    pub fn find(&self, needle: &str) -> Option<usize> {
        self.rest().find(needle).map(|i| self.caret + i)
    }

    /// Position the caret would have at `index`, without moving it.
    #[must_use]
    pub fn compute(&self, index: usize) -> Position {
        let index = self.clamp(index);
        let span = &self.text[self.caret..index];
        match span.rfind('\n') {
            Some(last) => Position {
                line: self.pos.line + span.bytes().filter(|&b| b == b'\n').count(),
                column: span[last + 1..].chars().count() + 1,
            },
            None => Position {
                line: self.pos.line,
                column: self.pos.column + span.chars().count(),
            },
        }
    }

    /// Move the caret forward to `index`, updating the position.
    pub fn advance_to(&mut self, index: usize) {
        let index = self.clamp(index);
        self.pos = self.compute(index);
        self.caret = index;
    }

    /// Move the caret forward by `len` bytes.
    pub fn advance(&mut self, len: usize) {
        self.advance_to(self.caret.saturating_add(len));
    }

    fn clamp(&self, index: usize) -> usize {
        let mut index = index.clamp(self.caret, self.text.len());
        while !self.text.is_char_boundary(index) {
            index += 1;
        }
        index
    }

    /// The tree being built.
    pub fn dom(&mut self) -> &mut Dom {
        self.dom
    }

    /// The node new content is added to.
    #[must_use]
    pub const fn container(&self) -> NodeId {
        self.container
    }

    /// Name the input is reported under.
    #[must_use]
    pub const fn uri(&self) -> &'a str {
        self.uri
    }

    /// Effective parser options.
    #[must_use]
    pub const fn options(&self) -> &'a StyleOptions {
        self.options
    }

    /// Record a coded diagnostic from the running handler.
    pub fn error<I, S>(&mut self, pos: Position, code: &str, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = Diagnostic::new(self.reporter)
            .at(pos)
            .code(code)
            .args(args)
            .file(self.uri);
        let _ = self.dom.push_diagnostic(self.log, &entry);
    }

    /// Record a literal warning from the running handler.
    pub fn warn(&mut self, pos: Position, message: impl Into<String>) {
        let entry = Diagnostic::new(self.reporter)
            .at(pos)
            .message(message)
            .file(self.uri);
        let _ = self.dom.push_diagnostic(self.log, &entry);
    }
}
