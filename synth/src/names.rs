use proc_macro2::{Ident, TokenStream};
use syn::Type;

use crate::error::{Error, Result};

/// `expr_tail` -> `ExprTailNode`
pub fn node_name(rule: &str) -> String {
    let mut name: String = rule
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    name.push_str("Node");
    name
}

/// Parses `name` as a Rust identifier. Keywords are rejected.
pub fn ident(name: &str) -> Result<Ident> {
    syn::parse_str::<Ident>(name)
        .map_err(|_| Error::config(format!("'{}' is not a valid identifier", name)))
}

pub fn parse_type(ty: &str) -> Result<Type> {
    syn::parse_str::<Type>(ty).map_err(|_| Error::config(format!("'{}' is not a valid type", ty)))
}

/// Parses user action code into tokens.
pub fn parse_code(action: &str, code: &str) -> Result<TokenStream> {
    code.parse::<TokenStream>()
        .map_err(|e| Error::config(format!("invalid code in action '${}': {:?}", action, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_names() {
        let tests = vec![
            ("expr", "ExprNode"),
            ("expr_tail", "ExprTailNode"),
            ("a1_b2", "A1B2Node"),
            ("x__y", "XYNode"),
        ];
        for (rule, expected) in tests {
            assert_eq!(node_name(rule), expected);
        }
    }

    #[test]
    fn identifiers_and_types() {
        assert!(ident("acc").is_ok());
        assert!(ident("type").is_err());
        assert!(ident("1x").is_err());
        assert!(parse_type("Vec<i32>").is_ok());
        assert!(parse_type("Vec<").is_err());
        assert!(parse_code("f", "self.x = 1;").is_ok());
        assert!(parse_code("f", "self.x = (1;").is_err());
    }
}
