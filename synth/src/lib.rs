//! Generates an LL(1) recursive-descent parser and its scanner from an
//! attributed grammar.
//!
//! ```no_run
//! let grammar: grammar::Grammar = "expr : 'a'\nexpr\n".parse().unwrap();
//! let code = synth::generate(&grammar, &synth::Options::default()).unwrap();
//! println!("{}", code);
//! ```

use proc_macro2::TokenStream;

use grammar::Grammar;

pub mod analyzer;
mod error;
mod names;
pub mod parser;
pub mod scanner;

pub use analyzer::Analyzer;
pub use error::{Error, Result};
pub use names::node_name;
pub use parser::ParserSynth;
pub use scanner::ScannerSpec;

/// Knobs for the emitted code.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Append a `main` that parses one line of stdin.
    pub main: bool,
}

/// Builds the scanner spec for every literal and regex terminal of
/// `grammar`.
pub fn scanner_spec(grammar: &Grammar) -> Result<ScannerSpec> {
    let mut spec = ScannerSpec::new();
    for literal in grammar.literals() {
        spec.add_token(&literal);
    }
    for (name, pattern) in grammar.regexes() {
        spec.add_regex(name, pattern)?;
    }
    Ok(spec)
}

/// Analyzes a resolved grammar and emits the parser for it.
///
/// Fails without emitting anything if the grammar is not LL(1) or refers to
/// anything that does not exist.
pub fn generate(grammar: &Grammar, options: &Options) -> Result<TokenStream> {
    let scanner = scanner_spec(grammar)?;
    let analyzer = Analyzer::new(grammar)?;
    let tokens = scanner.generate()?;
    let parser = ParserSynth::new(grammar, &analyzer, &scanner).generate(options.main)?;
    log::info!(
        "generated parser for '{}' with {} rules",
        grammar.start(),
        grammar.rules().count()
    );
    Ok(quote::quote! {
        #tokens
        #parser
    })
}

/// Like [`generate`], rendered as the text of a source file.
pub fn generate_file(grammar: &Grammar, options: &Options) -> Result<String> {
    let code = generate(grammar, options)?;
    Ok(format!(
        "// Generated by descent from a grammar with start '{}'. Do not edit.\n\n{}\n",
        grammar.start(),
        code
    ))
}
