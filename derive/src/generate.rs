use proc_macro2::{Span, TokenStream};
use quote::quote;
use std::env;
use std::fs;
use std::path::Path;
use syn::{Attribute, DeriveInput, Ident, Lit, Meta, Type};

use grammar::Grammar;
use synth::Options;

use crate::error::{DeriveError, Result};

const GRAMMAR_FILE_ATTR: &str = "grammar_file";
const GRAMMAR_INLINE_ATTR: &str = "grammar_inline";

/// Where the grammar came from. A file is tracked so that editing it
/// triggers a rebuild.
#[derive(Debug, PartialEq)]
enum Source {
    File(String),
    Inline,
}

pub fn generate(ast: &DeriveInput) -> Result<TokenStream> {
    let (grammar, source) = grammar_from_ast(ast)?;
    let code = synth::generate(&grammar, &Options::default())?;
    let entry = generate_impl(&ast.ident, &ast.generics, &grammar)?;

    let tracked = match source {
        Source::File(path) => quote! {
            const _: &str = include_str!(#path);
        },
        Source::Inline => TokenStream::new(),
    };

    Ok(quote! {
        #code
        #entry
        #tracked
    })
}

/// Load a grammar from a derive attribute.
///
/// There must be exactly 1 attribute specifying the grammar source. The source
/// may either be written inline, or a path to a grammar file relative to the
/// crate root.
fn grammar_from_ast(ast: &DeriveInput) -> Result<(Grammar, Source)> {
    let sources: Vec<&Attribute> = ast
        .attrs
        .iter()
        .filter(|attr| match attr.parse_meta() {
            Ok(Meta::NameValue(val)) => {
                val.path.is_ident(GRAMMAR_FILE_ATTR) || val.path.is_ident(GRAMMAR_INLINE_ATTR)
            }
            _ => false,
        })
        .collect();

    let source_attr = match sources.len() {
        0 => return Err(DeriveError::MissingGrammarSource),
        1 => sources[0],
        _ => return Err(DeriveError::MultipleGrammarSources),
    };

    match source_attr.parse_meta() {
        Ok(Meta::NameValue(val)) => match val.lit {
            Lit::Str(s) => {
                if val.path.is_ident(GRAMMAR_FILE_ATTR) {
                    let root = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
                    let path = Path::new(&root).join(s.value());
                    let data = fs::read_to_string(&path).map_err(|e| DeriveError::File {
                        path: path.to_string_lossy().into_owned(),
                        message: e.to_string(),
                    })?;
                    let grammar: Grammar = data.parse()?;
                    Ok((grammar, Source::File(path.to_string_lossy().into_owned())))
                } else {
                    let grammar: Grammar = s.value().parse()?;
                    Ok((grammar, Source::Inline))
                }
            }
            _ => Err(DeriveError::Other("attribute not a string".to_owned())),
        },
        Ok(_) => Err(DeriveError::Other("attribute not a name value".to_owned())),
        Err(e) => Err(e.into()),
    }
}

/// Generate `parse` on the deriving type, forwarding to the generated entry
/// point.
fn generate_impl(name: &Ident, generics: &syn::Generics, grammar: &Grammar) -> Result<TokenStream> {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let start = grammar
        .rule(grammar.start())
        .ok_or_else(|| DeriveError::Other(format!("missing start rule '{}'", grammar.start())))?;
    let node = Ident::new(&synth::node_name(start.name()), Span::call_site());

    let mut params = Vec::new();
    let mut args = Vec::new();
    for var in start.inherited() {
        let arg: Ident = syn::parse_str(&var.name)?;
        let ty: Type = syn::parse_str(&var.ty)?;
        params.push(quote! { #arg: #ty });
        args.push(arg);
    }

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            pub fn parse(input: &str #( , #params )*) -> ::parsegen::Result<#node> {
                parse(input #( , #args )*)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammar::{RuleItem, Variable};
    use pretty_assertions::assert_eq;
    use syn::parse_str;

    #[test]
    fn generate_print() {
        let def = "
            #[derive(Parser)]
            #[grammar_inline = \"expr : 'a'\nexpr\n\"]
            struct Dummy;
         ";
        let ast: DeriveInput = parse_str(def).unwrap();
        let ts = generate(&ast).unwrap();
        println!("Generated:\n{}", ts);
    }

    #[test]
    fn load_simple_inline_grammar() {
        let def = "
            #[grammar_inline = \"NUM : '[0-9]+'\nexpr : (v = NUM)\nexpr\n\"]
            struct Dummy;
        ";
        let ast = parse_str(def).unwrap();
        let (got, source) = grammar_from_ast(&ast).unwrap();
        assert_eq!(source, Source::Inline);
        assert_eq!(got.start(), "expr");
        let expr = got.rule("expr").unwrap();
        assert_eq!(
            expr.alternatives()[0].items,
            vec![RuleItem::AssignFromRegex {
                var: "v".to_owned(),
                regex: "NUM".to_owned(),
            }]
        );
        assert_eq!(expr.vars().collect::<Vec<_>>(), vec![Variable::new("String", "v")]);
    }

    #[test]
    fn missing_grammar_source() {
        let def = "
            struct Dummy;
        ";
        let ast = parse_str(def).unwrap();
        let err = grammar_from_ast(&ast).unwrap_err();
        assert_eq!(err, DeriveError::MissingGrammarSource);
    }

    #[test]
    fn multiple_grammar_sources() {
        let def = "
            #[grammar_inline = \"expr : 'a'\nexpr\n\"]
            #[grammar_file = \"expr.grammar\"]
            struct Dummy;
        ";
        let ast = parse_str(def).unwrap();
        let err = grammar_from_ast(&ast).unwrap_err();
        assert_eq!(err, DeriveError::MultipleGrammarSources);
    }

    #[test]
    fn missing_grammar_file() {
        let def = "
            #[grammar_file = \"does/not/exist.grammar\"]
            struct Dummy;
        ";
        let ast = parse_str(def).unwrap();
        let err = grammar_from_ast(&ast).unwrap_err();
        assert!(matches!(err, DeriveError::File { .. }), "{}", err);
    }

    #[test]
    fn generator_errors_are_reported() {
        let def = "
            #[grammar_inline = \"s : 'a'\ns : 'a'\ns\n\"]
            struct Dummy;
        ";
        let ast: DeriveInput = parse_str(def).unwrap();
        let err = generate(&ast).unwrap_err();
        assert!(
            err.to_string().contains("parser can not be generated"),
            "{}",
            err
        );
    }

    #[test]
    fn parse_forwards_inherited_variables() {
        let def = "
            #[grammar_inline = \"s [i32 depth] : 'a'\ns\n\"]
            struct Dummy;
        ";
        let ast: DeriveInput = parse_str(def).unwrap();
        let (g, _) = grammar_from_ast(&ast).unwrap();
        let got = generate_impl(&ast.ident, &ast.generics, &g).unwrap();
        let expected = quote! {
            impl Dummy {
                pub fn parse(input: &str, depth: i32) -> ::parsegen::Result<SNode> {
                    parse(input, depth)
                }
            }
        };
        assert_eq!(got.to_string(), expected.to_string());
    }
}
