use std::error;
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

/// Generation-time failure. None of these are recoverable.
#[derive(Debug)]
pub enum Error {
    Grammar(grammar::Error),
    Config(String),
    /// Two alternatives of `non_terminal` cannot be told apart with one
    /// token of lookahead.
    Conflict {
        non_terminal: String,
        first: String,
        second: String,
    },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Grammar(e) => write!(f, "{}", e),
            Error::Config(s) => write!(f, "invalid grammar: {}", s),
            Error::Conflict { first, second, .. } => write!(
                f,
                "parser can not be generated because of rules:\n{}\n{}",
                first, second
            ),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Grammar(e) => Some(e),
            Error::Config(_) | Error::Conflict { .. } => None,
        }
    }
}

impl From<grammar::Error> for Error {
    fn from(e: grammar::Error) -> Self {
        Error::Grammar(e)
    }
}
