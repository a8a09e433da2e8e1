//! Diagnostics logs.
//!
//! Parsers and converters report problems by appending `msg` void elements
//! to a log document (language `lexor`, style `log`). Keeping the log in the
//! tree model means it can be written, converted or inspected like any
//! other document. [`Diagnostic`] is the typed view of one entry.

use std::fmt;
use std::str::FromStr;

use lexor_common::MessageTable;
use serde::Serialize;

use crate::attributes::Attributes;
use crate::node::NodeId;
use crate::tree::Dom;

/// Language of diagnostics logs.
pub const LOG_LANG: &str = "lexor";
/// Style of diagnostics logs.
pub const LOG_STYLE: &str = "log";
/// Name of log entries.
pub const MSG_NAME: &str = "msg";

/// A 1-based line and column in source text. Columns count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1.
    pub column: usize,
}

impl Position {
    /// The first character of a text.
    pub const START: Self = Self { line: 1, column: 1 };

    /// Position at `line`, `column`.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl FromStr for Position {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, column) = s.split_once(':').unwrap_or((s, "0"));
        Ok(Self {
            line: line.trim().parse()?,
            column: column.trim().parse()?,
        })
    }
}

/// One diagnostics entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Module or component that produced the entry.
    pub reporter: String,
    /// Where in the source the problem is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Message code, looked up in a [`MessageTable`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Literal message, used instead of a code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Arguments substituted into the code's template.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Source the problem was found in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Node the entry refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<usize>,
}

impl Diagnostic {
    /// Empty entry from `reporter`.
    #[must_use]
    pub fn new(reporter: impl Into<String>) -> Self {
        Self {
            reporter: reporter.into(),
            ..Self::default()
        }
    }

    /// Set the position.
    #[must_use]
    pub const fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the message code.
    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set a literal message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the template arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the source.
    #[must_use]
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Refer to a node.
    #[must_use]
    pub const fn node(mut self, node: NodeId) -> Self {
        self.node = Some(node.0);
        self
    }

    /// Human readable text: `Line L, Column C in FILE: message`.
    #[must_use]
    pub fn render(&self, table: &MessageTable) -> String {
        let text = match (&self.message, &self.code) {
            (Some(message), _) => message.clone(),
            (None, Some(code)) => table.render(code, &self.args),
            (None, None) => String::new(),
        };
        match (self.position, &self.file) {
            (Some(p), Some(file)) => {
                format!("Line {}, Column {} in {file}: {text}", p.line, p.column)
            }
            (Some(p), None) => format!("Line {}, Column {}: {text}", p.line, p.column),
            (None, Some(file)) => format!("{file}: {text}"),
            (None, None) => text,
        }
    }

    fn to_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        let _ = attrs.set("reporter", self.reporter.as_str());
        if let Some(position) = self.position {
            let _ = attrs.set("position", position.to_string());
        }
        if let Some(code) = &self.code {
            let _ = attrs.set("code", code.as_str());
        }
        if let Some(message) = &self.message {
            let _ = attrs.set("message", message.as_str());
        }
        if let Some(file) = &self.file {
            let _ = attrs.set("file", file.as_str());
        }
        if let Some(node) = self.node {
            let _ = attrs.set("node", node.to_string());
        }
        for (i, arg) in self.args.iter().enumerate() {
            let _ = attrs.set(format!("arg{i}"), arg.as_str());
        }
        attrs
    }

    fn from_attributes(attrs: &Attributes) -> Self {
        let owned = |key: &str| attrs.get(key).map(str::to_string);
        let args = (0..)
            .map_while(|i| attrs.get(&format!("arg{i}")).map(str::to_string))
            .collect();
        Self {
            reporter: owned("reporter").unwrap_or_default(),
            position: attrs.get("position").and_then(|p| p.parse().ok()),
            code: owned("code"),
            message: owned("message"),
            args,
            file: owned("file"),
            node: attrs.get("node").and_then(|n| n.parse().ok()),
        }
    }
}

impl Dom {
    /// New, empty diagnostics log.
    pub fn create_log(&mut self) -> NodeId {
        self.create_document(LOG_LANG, LOG_STYLE)
    }

    /// Append an entry to `log`.
    pub fn push_diagnostic(&mut self, log: NodeId, diagnostic: &Diagnostic) -> NodeId {
        let msg = self.create_void_with(MSG_NAME, diagnostic.to_attributes());
        if self.accepts_children(log) {
            self.push_unchecked(log, msg);
        }
        msg
    }

    /// Typed view of every entry in `log`, in order.
    #[must_use]
    pub fn diagnostics(&self, log: NodeId) -> Vec<Diagnostic> {
        self.children(log)
            .iter()
            .filter(|&&id| self.name(id) == MSG_NAME)
            .filter_map(|&id| self.attrs(id))
            .map(Diagnostic::from_attributes)
            .collect()
    }

    /// Move every entry of `from` to the end of `into`, optionally
    /// stamping entries that lack a file with `file`.
    pub fn merge_log(&mut self, into: NodeId, from: NodeId, file: Option<&str>) {
        let entries = self.children(from).to_vec();
        for entry in entries {
            if let Some(file) = file {
                if self.attr(entry, "file").is_none() {
                    let _ = self.set_attr(entry, "file", file);
                }
            }
            self.push_unchecked(into, entry);
        }
    }
}
