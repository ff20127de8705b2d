use std::error;
use std::fmt;

/// Failure raised by a generated parser while reading its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Neither a literal nor a regex terminal matches at `position`.
    UnexpectedToken { position: usize, near: String },
    /// A literal was required but something else was read.
    Mismatch { found: String, expected: String },
    /// A regex terminal was required but something else was read.
    UnexpectedKind { found: String, expected: String },
    /// The start non-terminal finished before the input did.
    TrailingInput { position: usize },
    InvalidRegex { pattern: String, message: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { position, near } => {
                write!(f, "unexpected token at position {}: '{}'", position, near)
            }
            ParseError::Mismatch { found, expected } => {
                write!(f, "found '{}' but expected '{}'", found, expected)
            }
            ParseError::UnexpectedKind { found, expected } => {
                write!(f, "unexpected token '{}', expected {}", found, expected)
            }
            ParseError::TrailingInput { position } => {
                write!(f, "unexpected trailing input at position {}", position)
            }
            ParseError::InvalidRegex { pattern, message } => {
                write!(f, "invalid regex '{}': {}", pattern, message)
            }
        }
    }
}

impl error::Error for ParseError {}
