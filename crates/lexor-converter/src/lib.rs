//! Converter engine for lexor.
//!
//! A [`Converter`] builds a new tree from a parsed document. Every source
//! node is cloned shallowly into the new tree and handed to the handler
//! registered for its name; handlers may rename, replace or drop the copy,
//! log messages, and choose which node receives the converted children.
//! Elements can also carry directives (see [`directive`]), whose handlers
//! run after the node's own handler.

pub mod bundle;
pub mod conversion;
pub mod converter;
pub mod directive;
pub mod error;
pub mod expand;

pub use bundle::{
    ConverterBundle, CopyNode, DEFAULT_KEY, EXPANSION_FAILED, Hook, InitHook, NodeConverter,
    SkipNode, Vars, core_messages,
};
pub use conversion::Conversion;
pub use converter::{Converted, Converter};
pub use directive::{
    DirectiveSpec, Directives, Requirement, Restrict, Scope, collect_directives,
    encode_requirement, parse_requirement,
};
pub use error::{ConvertError, ExpandError};
pub use expand::{EXPANSION_ERROR, ExpandHandler, Expander, Expansion};
