use std::fmt::{self, Display};

/// Name of the nullability pseudo-terminal as written in a description.
pub const EPS: &str = "EPS";

/// Name of the end-of-input sentinel.
pub const END: &str = "END";

/// Something the scanner can hand to a generated parser, plus the two
/// markers used during analysis.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terminal {
    /// A literal token, matched by its text.
    Text(String),
    /// A named regex terminal, matched by its token type.
    Regex(String),
    /// End of input.
    End,
    /// Derives the empty string. Never produced by a scanner.
    Eps,
}

impl Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Terminal::Text(text) => write!(f, "'{}'", text),
            Terminal::Regex(name) => write!(f, "{}", name),
            Terminal::End => write!(f, "{}", END),
            Terminal::Eps => write!(f, "{}", EPS),
        }
    }
}

/// Element of a flattened alternative.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(String),
}

impl Symbol {
    pub fn text(s: &str) -> Self {
        Symbol::Terminal(Terminal::Text(s.to_owned()))
    }

    pub fn regex(name: &str) -> Self {
        if name == EPS {
            Symbol::Terminal(Terminal::Eps)
        } else {
            Symbol::Terminal(Terminal::Regex(name.to_owned()))
        }
    }

    pub fn non_terminal(name: &str) -> Self {
        Symbol::NonTerminal(name.to_owned())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "{}", t),
            Symbol::NonTerminal(name) => write!(f, "{}", name),
        }
    }
}
