//! Text sink with a word-wrapping buffer.

use lexor_common::warning::warn_once;
use log::trace;

/// Width used when a style sets none.
pub const DEFAULT_WIDTH: usize = 80;

/// Where node writers put their text.
///
/// [`Output::write`] emits text as is. [`Output::wrap`] buffers it and
/// breaks lines so that no line exceeds [`Output::width`] where the text
/// allows it. A width of 0 disables wrapping.
#[derive(Debug, Clone)]
pub struct Output {
    text: String,
    // Pending wrapped text. Never contains a newline.
    buffer: String,
    width: usize,
    wrapping: bool,
    raw: bool,
    hint: Option<String>,
    column: usize,
}

impl Default for Output {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl Output {
    /// Empty output wrapping at `width` characters.
    #[must_use]
    pub const fn new(width: usize) -> Self {
        Self {
            text: String::new(),
            buffer: String::new(),
            width,
            wrapping: true,
            raw: false,
            hint: None,
            column: 0,
        }
    }

    /// Maximum line width, 0 when wrapping is off.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Change the width. Pending text is flushed first.
    pub fn set_width(&mut self, width: usize) {
        self.flush();
        self.width = width;
    }

    /// Column of the next character, counting buffered text.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column + self.buffer.chars().count()
    }

    /// Last character written or buffered.
    #[must_use]
    pub fn last_char(&self) -> Option<char> {
        self.buffer.chars().last().or_else(|| self.text.chars().last())
    }

    /// Returns true when nothing has been written or buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.buffer.is_empty()
    }

    /// Emit `text` verbatim after anything still buffered.
    pub fn write(&mut self, text: &str) {
        self.flush();
        self.emit(text);
    }

    /// Buffer `text`, breaking lines at whitespace to respect the width.
    ///
    /// Behaves like [`Output::write`] in raw mode, while wrapping is
    /// disabled, or when the width is 0.
    pub fn wrap(&mut self, text: &str) {
        if self.raw || !self.wrapping || self.width == 0 {
            self.write(text);
            return;
        }
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.buffer.push_str(first);
            self.reflow();
        }
        for line in lines {
            self.flush();
            self.emit("\n");
            self.buffer.push_str(line);
            self.reflow();
        }
    }

    /// Prefer breaking right after `hint` while the current buffer is
    /// pending. Cleared by [`Output::flush`].
    pub fn break_hint(&mut self, hint: impl Into<String>) {
        self.hint = Some(hint.into());
    }

    /// Emit buffered text without breaking it further.
    pub fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.emit(&pending);
        }
        self.hint = None;
    }

    /// Enter or leave raw mode, in which [`Output::wrap`] does not wrap.
    pub fn set_raw(&mut self, raw: bool) {
        self.flush();
        self.raw = raw;
    }

    /// Returns true in raw mode.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw
    }

    /// Flush and stop wrapping until [`Output::enable_wrap`].
    pub fn disable_wrap(&mut self) {
        self.flush();
        self.wrapping = false;
    }

    /// Resume wrapping.
    pub const fn enable_wrap(&mut self) {
        self.wrapping = true;
    }

    /// Everything written so far, excluding the pending buffer.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Flush and return the text.
    #[must_use]
    pub fn into_string(mut self) -> String {
        self.flush();
        self.text
    }

    fn emit(&mut self, text: &str) {
        self.text.push_str(text);
        match text.rfind('\n') {
            Some(last) => self.column = text[last + 1..].chars().count(),
            None => self.column += text.chars().count(),
        }
    }

    fn reflow(&mut self) {
        loop {
            // Trailing whitespace may overhang the width.
            let len = self.buffer.trim_end().chars().count();
            if self.column + len <= self.width {
                return;
            }
            let limit = self.width.saturating_sub(self.column);
            let Some((cut, resume)) = self.break_point(limit) else {
                warn_once(
                    "Writer",
                    &format!("text without a break opportunity exceeds width {}", self.width),
                );
                return;
            };
            let line = self.buffer[..cut].trim_end().to_string();
            let _ = self.buffer.drain(..resume);
            trace!(target: "lexor.writer", "line break after {} chars", line.chars().count());
            self.emit(&line);
            self.emit("\n");
        }
    }

    /// Byte offsets where the line ends and where the next one starts.
    ///
    /// A line never ends before its first non-whitespace character, and
    /// the next one starts after the whole whitespace run. A break that
    /// would leave only whitespace behind is not taken.
    fn break_point(&self, limit: usize) -> Option<(usize, usize)> {
        let resume_after = |cut: usize| {
            let rest = &self.buffer[cut..];
            cut + (rest.len() - rest.trim_start().len())
        };
        let usable = |cut: usize, resume: usize| {
            !self.buffer[..cut].trim_end().is_empty() && resume < self.buffer.len()
        };
        if let Some(hint) = self.hint.as_deref().filter(|h| !h.is_empty()) {
            let found = self
                .buffer
                .match_indices(hint)
                .map(|(i, _)| i + hint.len())
                .take_while(|&cut| self.buffer[..cut].chars().count() <= limit)
                .map(|cut| (cut, resume_after(cut)))
                .filter(|&(cut, resume)| usable(cut, resume))
                .last();
            if found.is_some() {
                return found;
            }
        }
        let mut before = None;
        let mut prev_space = false;
        for (n, (i, c)) in self.buffer.char_indices().enumerate() {
            let space = c.is_whitespace();
            let run_start = space && !prev_space;
            prev_space = space;
            if !run_start {
                continue;
            }
            let span = (i, resume_after(i));
            if !usable(span.0, span.1) {
                continue;
            }
            if n <= limit {
                before = Some(span);
            } else {
                return before.or(Some(span));
            }
        }
        before
    }
}
