//! Style resolution errors.

use strum_macros::Display;
use thiserror::Error;

/// The three kinds of style bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StyleKind {
    /// Turns text into a tree.
    Parser,
    /// Turns a tree into text.
    Writer,
    /// Turns a tree into another tree.
    Converter,
}

/// A requested style bundle is not installed.
///
/// Reported to the caller that constructs a parser, writer or converter;
/// distinct from anything that can go wrong while processing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No parser or writer for `(lang, style)`.
    #[error("no {kind} style '{style}' installed for language '{lang}'")]
    Missing {
        /// Parser or writer.
        kind: StyleKind,
        /// Requested language.
        lang: String,
        /// Requested style.
        style: String,
    },
    /// No converter for `(from, to, style)`.
    #[error("no converter style '{style}' installed from '{from}' to '{to}'")]
    MissingConverter {
        /// Source language.
        from: String,
        /// Target language.
        to: String,
        /// Requested style.
        style: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_combination() {
        let err = ResolveError::Missing {
            kind: StyleKind::Writer,
            lang: "md".to_string(),
            style: "fancy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no writer style 'fancy' installed for language 'md'"
        );
        let err = ResolveError::MissingConverter {
            from: "xml".to_string(),
            to: "html".to_string(),
            style: "default".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no converter style 'default' installed from 'xml' to 'html'"
        );
    }
}
