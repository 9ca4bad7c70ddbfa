//! Locations inside expression text, used for error messages.

use std::fmt;

/// A reference to a location in an expression. Useful for error messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    /// The line number. Begins at 1.
    pub line: usize,

    /// The column position in the current line. Begins at 1.
    pub column: usize,

    /// Character offset from the beginning of the expression. Begins at 0.
    pub offset: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl Position {
    /// Locate a byte offset reported by the parser inside the given text.
    ///
    /// Offsets past the end of the text are clamped to the end.
    pub fn locate(text: &str, byte_offset: usize) -> Self {
        let mut position = Self::default();

        for (index, c) in text.char_indices() {
            if index >= byte_offset {
                break;
            }

            position.offset += 1;

            if c == '\n' {
                position.line += 1;
                position.column = 1;
            } else {
                position.column += 1;
            }
        }

        position
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
