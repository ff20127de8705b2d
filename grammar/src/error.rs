use std::error;
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed grammar description text.
    Syntax { line: usize, message: String },
    /// Well-formed text describing an inconsistent grammar.
    Config(String),
}

impl Error {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Error {
        Error::Syntax {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Error {
        Error::Config(message.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Syntax { line, ref message } => {
                write!(f, "failed to parse line {}: {}", line, message)
            }
            Error::Config(ref s) => write!(f, "invalid grammar: {}", s),
        }
    }
}

impl error::Error for Error {}
