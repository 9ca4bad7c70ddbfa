use crate::grammar::Rule;
use crate::source::Position;
use pest::error::InputLocation;
use std::{error::Error, fmt};

/// Describes an error that occurred in parsing.
#[derive(Clone, PartialEq)]
pub struct ParseError {
    /// The error message. This is a string instead of an enum because the
    /// messages can be highly specific.
    pub message: String,

    /// The symbol the parser stumbled on, if there was one.
    pub token: Option<String>,

    /// Where in the expression the error occurred, if known.
    pub position: Option<Position>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            token: None,
            position: None,
        }
    }

    /// Error for when the expression as a whole could not be parsed and
    /// nothing more specific can be said.
    pub fn generic() -> Self {
        Self::new("Could not parse the expression")
    }

    /// Error for an unexpected symbol at a given position.
    pub fn unexpected(token: impl Into<String>, position: Position) -> Self {
        let token = token.into();

        Self {
            message: format!("Unexpected symbol '{}' at position {}", token, position.offset),
            token: Some(token),
            position: Some(position),
        }
    }

    /// Translate a grammar error into a parse error for the given input.
    pub(crate) fn from_pest(input: &str, error: pest::error::Error<Rule>) -> Self {
        let byte_offset = match error.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };

        // Point at the symbol itself rather than the whitespace before it.
        let byte_offset = byte_offset + input
            .get(byte_offset..)
            .map(|rest| rest.len() - rest.trim_start().len())
            .unwrap_or(0);
        let position = Position::locate(input, byte_offset);

        match symbol_at(input, byte_offset) {
            Some(token) => Self::unexpected(token, position),
            None => Self {
                position: Some(position),
                ..Self::generic()
            },
        }
    }
}

/// Extract the symbol starting at the given byte offset: a run of word
/// characters, or a run of punctuation.
fn symbol_at(input: &str, byte_offset: usize) -> Option<&str> {
    let rest = input.get(byte_offset..)?.trim_start();
    let first = rest.chars().next()?;

    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '$' || c == '.';
    let is_punct = |c: char| !c.is_whitespace() && !c.is_alphanumeric() && c != '_' && c != '$';

    let end = if is_word(first) {
        rest.find(|c: char| !is_word(c))
    } else {
        rest.char_indices()
            .skip(1)
            .find(|&(_, c)| !is_punct(c) || c == '(' || c == ')' || c == '[' || c == ']')
            .map(|(index, _)| index)
    };

    Some(&rest[..end.unwrap_or(rest.len())])
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "{} ({})", self, position),
            None => write!(f, "{}", self),
        }
    }
}

impl Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_extraction() {
        assert_eq!(symbol_at("1 + )", 4), Some(")"));
        assert_eq!(symbol_at("a b", 2), Some("b"));
        assert_eq!(symbol_at("a == == b", 5), Some("=="));
        assert_eq!(symbol_at("foo bar.baz", 4), Some("bar.baz"));
        assert_eq!(symbol_at("1 +", 3), None);
        assert_eq!(symbol_at("1 +   ", 3), None);
    }

    #[test]
    fn unexpected_message() {
        let error = ParseError::unexpected("]", Position {
            line: 1,
            column: 3,
            offset: 2,
        });

        assert_eq!(error.to_string(), "Unexpected symbol ']' at position 2");
        assert_eq!(error.token.as_deref(), Some("]"));
    }
}
