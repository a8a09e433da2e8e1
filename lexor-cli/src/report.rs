//! Diagnostics output on stderr.

use lexor_common::MessageTable;
use lexor_dom::{Diagnostic, Dom, NodeId};
use owo_colors::OwoColorize;

/// Diagnostics gathered from every stage of a run.
#[derive(Debug, Default)]
pub struct Report {
    entries: Vec<Diagnostic>,
    messages: MessageTable,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the entries of `log`, rendered later with `messages`.
    pub fn collect(&mut self, dom: &Dom, log: NodeId, messages: &MessageTable) {
        self.entries.extend(dom.diagnostics(log));
        self.messages.extend(messages);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// One line per entry, with a colored severity.
    pub fn print(&self) {
        for entry in &self.entries {
            let text = entry.render(&self.messages);
            if is_error(entry) {
                eprintln!("{} {text}", "error:".red().bold());
            } else {
                eprintln!("{} {text}", "warning:".yellow().bold());
            }
        }
    }

    /// The entries as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

/// `E` codes are errors, everything else a warning.
fn is_error(entry: &Diagnostic) -> bool {
    entry.code.as_deref().is_some_and(|c| c.starts_with('E'))
}
