use std::fmt::{self, Debug, Display};

/// The token-type space of a generated scanner: one variant per regex
/// terminal plus the two fixed kinds below.
pub trait TokenKind: Copy + Debug + Eq {
    /// Any literal text token.
    const TEXT: Self;
    /// End of input.
    const END: Self;
}

/// A token represents a slice of the input matched by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a, K: TokenKind> {
    pub kind: K,
    pub text: &'a str,
    /// Byte offset of the token in the input.
    pub position: usize,
}

impl<'a, K: TokenKind> Token<'a, K> {
    pub fn new(kind: K, text: &'a str, position: usize) -> Self {
        Token {
            kind,
            text,
            position,
        }
    }

    /// Whether this is the literal `text`.
    pub fn is_text(&self, text: &str) -> bool {
        self.kind == K::TEXT && self.text == text
    }

    pub fn is_end(&self) -> bool {
        self.kind == K::END
    }
}

impl<'a, K: TokenKind> Display for Token<'a, K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_end() {
            write!(f, "END")
        } else {
            write!(f, "{}", self.text)
        }
    }
}
