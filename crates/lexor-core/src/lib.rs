//! Core API for the lexor pipeline.
//!
//! # Scope
//!
//! This crate provides the three entry points over a [`StyleRegistry`]:
//! - **Parse** - text in a named language and style into a document
//! - **Convert** - a document into a document of another language
//! - **Write** - a node back into text
//!
//! Each call resolves its style first, so a missing `(lang, style)`
//! combination fails before any work is done. Problems with the input are
//! never errors; they land in the returned diagnostics document.

pub use lexor_common as common;
pub use lexor_converter as converter;
pub use lexor_dom as dom;
pub use lexor_parser as parser;
pub use lexor_style as style;
pub use lexor_writer as writer;

pub use lexor_common::{ResolveError, StyleOptions};
pub use lexor_converter::Converted;
pub use lexor_dom::{Diagnostic, Dom, NodeId};
pub use lexor_parser::Parsed;
pub use lexor_style::StyleRegistry;

use std::io;

use lexor_converter::{ConvertError, Converter};
use lexor_parser::{Parser, ParserError};
use lexor_writer::{Writer, WriterError};
use log::debug;
use thiserror::Error;

const TARGET: &str = "lexor.core";

/// Anything an entry point can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested style is not installed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// The parser style is unusable.
    #[error(transparent)]
    Parser(#[from] ParserError),
    /// The conversion could not run.
    #[error(transparent)]
    Convert(#[from] ConvertError),
    /// The writer style is unusable or the destination failed.
    #[error(transparent)]
    Writer(#[from] WriterError),
}

impl Error {
    /// Returns true for a missing style, as opposed to a failed run.
    #[must_use]
    pub const fn is_resolve(&self) -> bool {
        matches!(self, Self::Resolve(_))
    }
}

/// Parse `text` as `lang:style`.
///
/// Without a `uri` the result is a document fragment.
///
/// # Errors
/// Fails when the style is missing or its bundle is unusable.
pub fn parse(
    registry: &StyleRegistry,
    dom: &mut Dom,
    text: &str,
    uri: Option<&str>,
    lang: &str,
    style: &str,
    options: &StyleOptions,
) -> Result<Parsed, Error> {
    let bundle = registry.parser(lang, style)?;
    debug!(target: TARGET, "parse {}:{} ({} bytes)", bundle.lang(), bundle.style(), text.len());
    let mut parser = Parser::new(bundle)?.with_options(options);
    Ok(parser.parse(dom, text, uri)?)
}

/// Convert the document `root` from `from` to `to` with `style`.
///
/// # Errors
/// Fails when the style is missing or `root` is not a document.
pub fn convert(
    registry: &StyleRegistry,
    dom: &mut Dom,
    root: NodeId,
    from: &str,
    to: &str,
    style: &str,
) -> Result<Converted, Error> {
    let bundle = registry.converter(from, to, style)?;
    debug!(target: TARGET, "convert {from}->{to}:{}", bundle.style());
    let mut converter = Converter::new(bundle);
    Ok(converter.convert(dom, root)?)
}

/// Write `node` as `lang:style` into `dest`.
///
/// # Errors
/// Fails when the style is missing or the destination fails.
pub fn write(
    registry: &StyleRegistry,
    dom: &Dom,
    node: NodeId,
    lang: &str,
    style: &str,
    options: &StyleOptions,
    dest: &mut dyn io::Write,
) -> Result<(), Error> {
    let mut writer = writer_for(registry, lang, style, options)?;
    writer.write(dom, node, dest)?;
    Ok(())
}

/// Write `node` as `lang:style` and return the text.
///
/// # Errors
/// Fails when the style is missing or unusable.
pub fn write_to_string(
    registry: &StyleRegistry,
    dom: &Dom,
    node: NodeId,
    lang: &str,
    style: &str,
    options: &StyleOptions,
) -> Result<String, Error> {
    let mut writer = writer_for(registry, lang, style, options)?;
    Ok(writer.write_to_string(dom, node))
}

fn writer_for(
    registry: &StyleRegistry,
    lang: &str,
    style: &str,
    options: &StyleOptions,
) -> Result<Writer, Error> {
    let bundle = registry.writer(lang, style)?;
    debug!(target: TARGET, "write {}:{}", bundle.lang(), bundle.style());
    Ok(Writer::new(bundle)?.with_options(options))
}
