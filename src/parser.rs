use std::io::BufRead;

use crate::error::{Error, ParseError, ParseErrorKind};
use crate::model::{Encoding, Entry, EnvMap};
use crate::source::decode;

/// Result of parsing a single physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank or comment line.
    Ignored,
    Pair { key: String, value: String },
    Failure(ParseError),
}

/// Parse an env document, stopping at the first malformed line.
///
/// Lines are split on `\n` only; surrounding whitespace (including a trailing
/// `\r` or a stray byte order mark) is trimmed from each line before scanning.
pub fn parse(input: &str) -> Result<EnvMap, ParseError> {
    let mut map = EnvMap::new();
    for (index, raw_line) in input.split('\n').enumerate() {
        match parse_line(raw_line, index) {
            LineOutcome::Ignored => {}
            LineOutcome::Pair { key, value } => map.insert(Entry {
                key,
                value,
                source: None,
                line: line_number(index),
            }),
            LineOutcome::Failure(err) => return Err(err),
        }
    }
    Ok(map)
}

/// Parse an env document from UTF-8 bytes.
pub fn parse_bytes(input: &[u8]) -> Result<EnvMap, Error> {
    parse_bytes_with_encoding(input, Encoding::Utf8)
}

/// Parse an env document from bytes in the given encoding.
pub fn parse_bytes_with_encoding(input: &[u8], encoding: Encoding) -> Result<EnvMap, Error> {
    let text = decode(input, encoding)?;
    Ok(parse(&text)?)
}

/// Parse an env document from a buffered reader.
pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<EnvMap, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    parse_bytes(&buf)
}

/// Parse one physical line. `line_index` is 0-based.
pub fn parse_line(raw_line: &str, line_index: usize) -> LineOutcome {
    let line = raw_line.trim_matches(is_env_whitespace);
    if line.is_empty() || line.starts_with('#') {
        return LineOutcome::Ignored;
    }

    let fail = |column: usize, kind: ParseErrorKind| {
        let column = u32::try_from(column).unwrap_or(u32::MAX);
        LineOutcome::Failure(ParseError::new(line_number(line_index), column, kind, line))
    };

    if line.starts_with('=') {
        return fail(0, ParseErrorKind::MissingKey);
    }

    let mut scan = Scan::Key;
    let mut key = String::new();
    let mut value = String::with_capacity(line.len());

    for (column, ch) in line.chars().enumerate() {
        match scan.advance(ch) {
            Step::Consume => {}
            Step::Append => match scan {
                Scan::Key => key.push(ch),
                Scan::Value { .. } => value.push(ch),
            },
            Step::Reject(Rejection::KeyCharacter) => {
                return fail(column, ParseErrorKind::InvalidKeyCharacter);
            }
            Step::Reject(Rejection::ValueWhitespace) => {
                return fail(column, ParseErrorKind::UnquotedWhitespaceInValue { key });
            }
        }
    }

    // An open quote at end of line is accepted as-is.
    LineOutcome::Pair { key, value }
}

fn line_number(line_index: usize) -> u32 {
    u32::try_from(line_index)
        .ok()
        .and_then(|idx| idx.checked_add(1))
        .unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Key,
    Value { quoted: bool, escape_armed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The character changed scanner state and contributes nothing.
    Consume,
    /// Append the character to the buffer of the current state.
    Append,
    Reject(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    KeyCharacter,
    ValueWhitespace,
}

impl Scan {
    /// Feed one character through the checks in precedence order: key/value
    /// split, key charset, quote toggle, whitespace, escape.
    fn advance(&mut self, ch: char) -> Step {
        match self {
            Scan::Key => {
                if ch == '=' {
                    *self = Scan::Value {
                        quoted: false,
                        escape_armed: false,
                    };
                    return Step::Consume;
                }
                // Whitespace and `\` fall outside the key charset, so neither
                // the whitespace nor the escape rule is ever reached here.
                if !is_key_char(ch) {
                    return Step::Reject(Rejection::KeyCharacter);
                }
                Step::Append
            }
            Scan::Value {
                quoted,
                escape_armed,
            } => {
                if ch == '"' && !*escape_armed {
                    *quoted = !*quoted;
                    return Step::Consume;
                }
                // Escaping does not exempt whitespace.
                if is_env_whitespace(ch) && !*quoted {
                    return Step::Reject(Rejection::ValueWhitespace);
                }
                if ch == '\\' && !*escape_armed {
                    *escape_armed = true;
                    return Step::Consume;
                }
                *escape_armed = false;
                Step::Append
            }
        }
    }
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Unicode `White_Space` plus U+FEFF, minus U+0085 (NEL).
fn is_env_whitespace(ch: char) -> bool {
    match ch {
        '\u{feff}' => true,
        '\u{85}' => false,
        _ => ch.is_whitespace(),
    }
}
