//! Runtime support for parsers emitted by `synth` and `derive`.
//!
//! Generated code supplies a token-type enum implementing [`TokenKind`] along
//! with its literal and regex tables; everything else lives here.

mod error;
mod position;
mod scanner;
mod tokens;

pub use error::ParseError;
pub use scanner::Scanner;
pub use tokens::{Token, TokenKind};

pub type Result<T> = std::result::Result<T, ParseError>;
