//! Synthesis of the token-type space and scanner tables.

use indexmap::IndexMap;
use proc_macro2::TokenStream;
use quote::quote;
use regex::Regex;
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::names::ident;

/// Names a regex terminal may not take: the two fixed token types and the
/// nullability marker.
const RESERVED: &[&str] = &["END", "TEXT", "EPS"];

/// Literal tokens and named regex terminals making up a scanner.
#[derive(Debug, Default, Clone)]
pub struct ScannerSpec {
    literals: BTreeSet<String>,
    regexes: IndexMap<String, String>,
}

impl ScannerSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a literal token. Adding the same literal twice is a no-op.
    pub fn add_token(&mut self, text: &str) {
        self.literals.insert(text.to_owned());
    }

    /// Registers a regex terminal. Declaration order decides ties between
    /// regexes matching the same length.
    pub fn add_regex(&mut self, name: &str, pattern: &str) -> Result<()> {
        if RESERVED.contains(&name) {
            return Err(Error::config(format!("{} is reserved name for regex", name)));
        }
        if self.regexes.contains_key(name) {
            return Err(Error::config(format!("duplicate regex name: {}", name)));
        }
        Regex::new(&format!("^(?:{})", pattern))
            .map_err(|e| Error::config(format!("invalid regex {} '{}': {}", name, pattern, e)))?;
        self.regexes.insert(name.to_owned(), pattern.to_owned());
        Ok(())
    }

    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.literals.iter().map(String::as_str)
    }

    /// The token-type space: every regex terminal, then `TEXT` and `END`.
    pub fn token_types(&self) -> Vec<&str> {
        self.regexes
            .keys()
            .map(String::as_str)
            .chain(["TEXT", "END"])
            .collect()
    }

    pub fn has_regex(&self, name: &str) -> bool {
        self.regexes.contains_key(name)
    }

    /// Emits the `TokenType` enum, the scanner tables and a `scanner`
    /// constructor.
    pub fn generate(&self) -> Result<TokenStream> {
        let variants = self
            .token_types()
            .into_iter()
            .map(ident)
            .collect::<Result<Vec<_>>>()?;
        let literals = self.literals.iter();
        let regexes = self
            .regexes
            .iter()
            .map(|(name, pattern)| {
                let name = ident(name)?;
                Ok(quote! { (TokenType::#name, #pattern) })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(quote! {
            #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
            pub enum TokenType {
                #( #variants ),*
            }

            impl ::parsegen::TokenKind for TokenType {
                const TEXT: Self = TokenType::TEXT;
                const END: Self = TokenType::END;
            }

            pub const LITERALS: &[&str] = &[#( #literals ),*];

            pub const REGEXES: &[(TokenType, &str)] = &[#( #regexes ),*];

            pub fn scanner(input: &str) -> ::parsegen::Result<::parsegen::Scanner<'_, TokenType>> {
                ::parsegen::Scanner::new(input, LITERALS, REGEXES)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reserved_and_duplicate_names() {
        let mut spec = ScannerSpec::new();
        spec.add_regex("NUM", "[0-9]+").unwrap();
        for name in ["END", "TEXT", "EPS", "NUM"] {
            assert!(
                matches!(spec.add_regex(name, "x"), Err(Error::Config(_))),
                "name: {}",
                name
            );
        }
    }

    #[test]
    fn invalid_pattern() {
        let mut spec = ScannerSpec::new();
        assert!(spec.add_regex("BAD", "[0-9").is_err());
    }

    #[test]
    fn tokens_are_a_set() {
        let mut spec = ScannerSpec::new();
        spec.add_token("+");
        spec.add_token("(");
        spec.add_token("+");
        assert_eq!(spec.literals().collect::<Vec<_>>(), vec!["(", "+"]);
    }

    #[test]
    fn token_type_space() {
        let mut spec = ScannerSpec::new();
        spec.add_regex("NUM", "[0-9]+").unwrap();
        spec.add_regex("ID", "[a-z]+").unwrap();
        assert_eq!(spec.token_types(), vec!["NUM", "ID", "TEXT", "END"]);
    }

    #[test]
    fn generate_tables() {
        let mut spec = ScannerSpec::new();
        spec.add_regex("NUM", "[0-9]+").unwrap();
        spec.add_token("+");

        let expected = quote! {
            #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
            pub enum TokenType {
                NUM,
                TEXT,
                END
            }

            impl ::parsegen::TokenKind for TokenType {
                const TEXT: Self = TokenType::TEXT;
                const END: Self = TokenType::END;
            }

            pub const LITERALS: &[&str] = &["+"];

            pub const REGEXES: &[(TokenType, &str)] = &[(TokenType::NUM, "[0-9]+")];

            pub fn scanner(input: &str) -> ::parsegen::Result<::parsegen::Scanner<'_, TokenType>> {
                ::parsegen::Scanner::new(input, LITERALS, REGEXES)
            }
        };
        assert_eq!(spec.generate().unwrap().to_string(), expected.to_string());
    }
}
