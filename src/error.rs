use std::fmt::{Display, Formatter};

use crate::diagnostic;

/// Errors surfaced by parsing, reading, and injecting env documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid UTF-8 input: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    #[error("value of key {key} cannot be stored in the process environment")]
    InvalidValue { key: String },
}

/// A fatal line-level failure.
///
/// `line` is 1-based, `column` is a 0-based character offset into `text`,
/// which holds the trimmed line the failure was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub kind: ParseErrorKind,
    pub text: String,
}

impl ParseError {
    pub(crate) fn new(line: u32, column: u32, kind: ParseErrorKind, text: &str) -> Self {
        Self {
            line,
            column,
            kind,
            text: text.to_owned(),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = self.kind.to_string();
        f.write_str(&diagnostic::render(
            &self.text,
            self.column,
            self.line,
            &message,
        ))
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("Found non-alphanumeric character in variable name")]
    InvalidKeyCharacter,
    /// Not produced by [`parse_line`](crate::parse_line): the key charset
    /// check runs first and reports key whitespace as `InvalidKeyCharacter`.
    #[error("Found unexpected whitespace in variable name")]
    UnexpectedWhitespaceInKey,
    #[error("Found unquoted whitespace in value of key {key}")]
    UnquotedWhitespaceInValue { key: String },
    #[error("Found empty variable name")]
    MissingKey,
}
