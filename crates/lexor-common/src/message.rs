//! Diagnostic message tables.
//!
//! Diagnostics store a code plus positional arguments; a style bundle
//! supplies the table that turns codes into text. Templates use `{0}`,
//! `{1}`, ... placeholders.

use std::collections::BTreeMap;

/// Map of diagnostic codes to message templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTable {
    entries: BTreeMap<String, String>,
}

impl MessageTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    #[must_use]
    pub fn with(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
        let _ = self.entries.insert(code.into(), template.into());
        self
    }

    /// Insert or replace a template.
    pub fn insert(&mut self, code: impl Into<String>, template: impl Into<String>) {
        let _ = self.entries.insert(code.into(), template.into());
    }

    /// Copy all entries of `other` into this table. Entries of `other` win.
    pub fn extend(&mut self, other: &Self) {
        for (code, template) in &other.entries {
            let _ = self.entries.insert(code.clone(), template.clone());
        }
    }

    /// Look up a template.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    /// Number of codes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render `code` with `args`.
    ///
    /// Unknown codes render as `code: arg, arg` so nothing is lost.
    #[must_use]
    pub fn render(&self, code: &str, args: &[String]) -> String {
        match self.get(code) {
            Some(template) => format_message(template, args),
            None if args.is_empty() => code.to_string(),
            None => format!("{code}: {}", args.join(", ")),
        }
    }
}

/// Substitute `{n}` placeholders in `template` with `args[n]`.
///
/// Placeholders that name a missing argument are left untouched.
#[must_use]
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let substituted = (digits > 0 && after[digits..].starts_with('}'))
            .then(|| after[..digits].parse::<usize>().ok())
            .flatten()
            .and_then(|n| args.get(n));
        if let Some(arg) = substituted {
            out.push_str(arg);
            rest = &after[digits + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}
