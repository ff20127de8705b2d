//! Proc macro for deriving an LL(1) parser from a grammar description.
//!
//! ```ignore
//! #[derive(Parser)]
//! #[grammar_file = "calc.grammar"]
//! pub struct CalcParser;
//!
//! let node = CalcParser::parse("1+2*3")?;
//! ```
//!
//! The generated items (token types, node structs, `Node`, a free `parse`
//! function) are emitted next to the deriving type, so at most one parser
//! can be derived per module.

use syn::{parse_macro_input, DeriveInput};

mod error;
mod generate;

#[proc_macro_derive(Parser, attributes(grammar_file, grammar_inline))]
pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match generate::generate(&ast) {
        Ok(expanded) => expanded.into(),
        Err(e) => syn::Error::new(ast.ident.span(), e)
            .to_compile_error()
            .into(),
    }
}
