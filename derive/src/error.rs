use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, DeriveError>;

/// Reported at the derive site as a `compile_error!`.
#[derive(Debug, Clone, PartialEq)]
pub enum DeriveError {
    MissingGrammarSource,
    MultipleGrammarSources,
    /// The grammar file could not be read.
    File { path: String, message: String },
    /// The description or the generator rejected the grammar.
    Grammar(String),
    Other(String),
}

impl Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeriveError::MissingGrammarSource => write!(
                f,
                "No grammar source provided, expected #[grammar_file = \"..\"] or #[grammar_inline = \"..\"]"
            ),
            DeriveError::MultipleGrammarSources => {
                write!(f, "At most one grammar source can be provided")
            }
            DeriveError::File { path, message } => {
                write!(f, "Failed to read grammar file {}: {}", path, message)
            }
            DeriveError::Grammar(s) => write!(f, "{}", s),
            DeriveError::Other(s) => write!(f, "Derive error: {}", s),
        }
    }
}

impl From<syn::Error> for DeriveError {
    fn from(e: syn::Error) -> DeriveError {
        DeriveError::Other(format!("syn error: {}", e))
    }
}

impl From<grammar::Error> for DeriveError {
    fn from(e: grammar::Error) -> DeriveError {
        DeriveError::Grammar(e.to_string())
    }
}

impl From<synth::Error> for DeriveError {
    fn from(e: synth::Error) -> DeriveError {
        DeriveError::Grammar(e.to_string())
    }
}
