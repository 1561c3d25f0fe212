//! Parse and load shell-style `.env` documents.
//!
//! [`parse`] is the pure core: it turns a document into an ordered
//! [`EnvMap`] or reports the first malformed line as a [`ParseError`] whose
//! `Display` output points at the offending column.
//!
//! [`EnvLoader::load`] reads files and injects them into an in-memory map by
//! default. Convenience loaders (`dotenv`, `from_path`, `from_paths`,
//! `from_filename`) mutate the process environment and are `unsafe`, because
//! callers must guarantee no concurrent process-environment access.
//!
//! Injection never overwrites a key the target already holds.

mod diagnostic;
mod env;
mod error;
mod loader;
mod model;
mod parser;
mod source;

pub use diagnostic::render;
pub use env::{EnvStore, TargetEnv, inject};
pub use error::{Error, ParseError, ParseErrorKind};
#[cfg(feature = "async")]
pub use loader::dotenv_async;
pub use loader::{EnvLoader, dotenv, from_filename, from_path, from_paths};
pub use model::{Encoding, Entry, EnvMap, LoadReport};
pub use parser::{
    LineOutcome, parse, parse_bytes, parse_bytes_with_encoding, parse_line, parse_reader,
};
#[cfg(feature = "async")]
pub use source::read_async;
pub use source::{DEFAULT_FILENAME, default_path, read};
