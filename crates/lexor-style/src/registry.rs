//! Explicit style registry.
//!
//! The registry maps `(lang, style)` to parser and writer bundles and
//! `(from, to, style)` to converter bundles. It is built once, usually with
//! [`StyleRegistry::with_builtins`], and then only read: bundles are handed
//! out as shared [`Arc`]s.

use std::collections::HashMap;
use std::sync::Arc;

use lexor_common::warning::warn_once;
use lexor_common::{ResolveError, StyleKind};
use lexor_converter::ConverterBundle;
use lexor_parser::ParserBundle;
use lexor_writer::WriterBundle;
use log::debug;

use crate::xml::DEFAULT_STYLE;
use crate::{clean, text, xml};

const TARGET: &str = "lexor.style";

type Key = (String, String);

/// Installed parser, writer and converter styles.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    parsers: HashMap<Key, Arc<ParserBundle>>,
    writers: HashMap<Key, Arc<WriterBundle>>,
    converters: HashMap<(String, String, String), Arc<ConverterBundle>>,
    aliases: HashMap<String, String>,
}

/// `_` and the empty string both mean the default style.
#[must_use]
pub fn style_name(style: &str) -> &str {
    if style.is_empty() || style == "_" {
        DEFAULT_STYLE
    } else {
        style
    }
}

impl StyleRegistry {
    /// Registry with nothing installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `xml` and `text` styles.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let _ = registry
            .register_parser(xml::parser::bundle())
            .register_writer(xml::writer::bundle())
            .register_writer(text::bundle())
            .register_converter(clean::identity())
            .register_converter(clean::clean());
        registry
    }

    /// Install a parser style under its bundle's language and style.
    pub fn register_parser(&mut self, bundle: ParserBundle) -> &mut Self {
        debug!(target: TARGET, "parser {}:{}", bundle.lang(), bundle.style());
        let key = (bundle.lang().to_string(), bundle.style().to_string());
        let _ = self.parsers.insert(key, Arc::new(bundle));
        self
    }

    /// Install a writer style.
    pub fn register_writer(&mut self, bundle: WriterBundle) -> &mut Self {
        debug!(target: TARGET, "writer {}:{}", bundle.lang(), bundle.style());
        let key = (bundle.lang().to_string(), bundle.style().to_string());
        let _ = self.writers.insert(key, Arc::new(bundle));
        self
    }

    /// Install a converter style.
    pub fn register_converter(&mut self, bundle: ConverterBundle) -> &mut Self {
        debug!(
            target: TARGET,
            "converter {}->{}:{}",
            bundle.from_lang(),
            bundle.to_lang(),
            bundle.style()
        );
        let key = (
            bundle.from_lang().to_string(),
            bundle.to_lang().to_string(),
            bundle.style().to_string(),
        );
        let _ = self.converters.insert(key, Arc::new(bundle));
        self
    }

    /// Treat language `name` as `lang`, e.g. `htm` as `html`.
    pub fn alias(&mut self, name: impl Into<String>, lang: impl Into<String>) -> &mut Self {
        let _ = self.aliases.insert(name.into(), lang.into());
        self
    }

    /// The language `lang` stands for, after aliases.
    #[must_use]
    pub fn language<'a>(&'a self, lang: &'a str) -> &'a str {
        match self.aliases.get(lang) {
            Some(target) => {
                warn_once("Style", &format!("language '{lang}' is read as '{target}'"));
                target
            }
            None => lang,
        }
    }

    /// Parser style for `lang:style`.
    ///
    /// # Errors
    /// Fails when the style is not installed.
    pub fn parser(&self, lang: &str, style: &str) -> Result<Arc<ParserBundle>, ResolveError> {
        let (lang, style) = (self.language(lang), style_name(style));
        self.parsers
            .get(&(lang.to_string(), style.to_string()))
            .cloned()
            .ok_or_else(|| missing(StyleKind::Parser, lang, style))
    }

    /// Writer style for `lang:style`.
    ///
    /// # Errors
    /// Fails when the style is not installed.
    pub fn writer(&self, lang: &str, style: &str) -> Result<Arc<WriterBundle>, ResolveError> {
        let (lang, style) = (self.language(lang), style_name(style));
        self.writers
            .get(&(lang.to_string(), style.to_string()))
            .cloned()
            .ok_or_else(|| missing(StyleKind::Writer, lang, style))
    }

    /// Converter style from `from` to `to`.
    ///
    /// # Errors
    /// Fails when the style is not installed.
    pub fn converter(
        &self,
        from: &str,
        to: &str,
        style: &str,
    ) -> Result<Arc<ConverterBundle>, ResolveError> {
        let (from, to, style) = (self.language(from), self.language(to), style_name(style));
        self.converters
            .get(&(from.to_string(), to.to_string(), style.to_string()))
            .cloned()
            .ok_or_else(|| ResolveError::MissingConverter {
                from: from.to_string(),
                to: to.to_string(),
                style: style.to_string(),
            })
    }

    /// Installed `(lang, style)` pairs of one kind, sorted.
    #[must_use]
    pub fn styles(&self, kind: StyleKind) -> Vec<String> {
        let mut names: Vec<String> = match kind {
            StyleKind::Parser => self.parsers.keys().map(|(l, s)| format!("{l}:{s}")).collect(),
            StyleKind::Writer => self.writers.keys().map(|(l, s)| format!("{l}:{s}")).collect(),
            StyleKind::Converter => self
                .converters
                .keys()
                .map(|(f, t, s)| format!("{f}->{t}:{s}"))
                .collect(),
        };
        names.sort();
        names
    }
}

fn missing(kind: StyleKind, lang: &str, style: &str) -> ResolveError {
    ResolveError::Missing {
        kind,
        lang: lang.to_string(),
        style: style.to_string(),
    }
}
