//! Synthesis of the recursive-descent parser: one node struct per
//! non-terminal with a dispatch method, one body method per alternative and
//! the action methods the rule calls.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use std::collections::HashMap;

use grammar::{same_type, Grammar, Rule, RuleItem, Terminal, EPS};

use crate::analyzer::Analyzer;
use crate::error::{Error, Result};
use crate::names::{ident, node_name, parse_code, parse_type};
use crate::scanner::ScannerSpec;

/// Generates parser code for an analyzed grammar.
pub struct ParserSynth<'a> {
    grammar: &'a Grammar,
    analyzer: &'a Analyzer,
    scanner: &'a ScannerSpec,
}

impl<'a> ParserSynth<'a> {
    pub fn new(grammar: &'a Grammar, analyzer: &'a Analyzer, scanner: &'a ScannerSpec) -> Self {
        ParserSynth {
            grammar,
            analyzer,
            scanner,
        }
    }

    /// Emits every node struct, the `Node` enum and the `parse` entry point.
    /// With `main` set a demo `main` reading one line from stdin is added.
    pub fn generate(&self, main: bool) -> Result<TokenStream> {
        self.check_node_names()?;

        let nodes = self
            .grammar
            .rules()
            .map(|rule| self.generate_node(rule))
            .collect::<Result<Vec<_>>>()?;
        let node_enum = self.generate_node_enum()?;
        let entry = self.generate_entry()?;
        let demo = if main {
            self.generate_main()?
        } else {
            TokenStream::new()
        };

        Ok(quote! {
            #node_enum
            #( #nodes )*
            #entry
            #demo
        })
    }

    fn check_node_names(&self) -> Result<()> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for rule in self.grammar.rules() {
            if let Some(other) = seen.insert(node_name(rule.name()), rule.name()) {
                return Err(Error::config(format!(
                    "rules '{}' and '{}' map to the same node type {}",
                    other,
                    rule.name(),
                    node_name(rule.name())
                )));
            }
        }
        Ok(())
    }

    fn rule(&self, name: &str) -> Result<&'a Rule> {
        self.grammar
            .rule(name)
            .ok_or_else(|| Error::config(format!("transition to undeclared rule '{}'", name)))
    }

    /// The closed syntax tree type.
    fn generate_node_enum(&self) -> Result<TokenStream> {
        let nodes = self
            .grammar
            .rules()
            .map(|rule| ident(&node_name(rule.name())))
            .collect::<Result<Vec<_>>>()?;
        Ok(quote! {
            #[derive(Debug, Clone)]
            pub enum Node {
                Terminal(String),
                #( #nodes(Box<#nodes>) ),*
            }
        })
    }

    fn generate_node(&self, rule: &Rule) -> Result<TokenStream> {
        let node = ident(&node_name(rule.name()))?;
        if rule.has_var("children") {
            return Err(Error::config(format!(
                "rule '{}' declares reserved variable 'children'",
                rule.name()
            )));
        }

        let mut fields = Vec::new();
        for var in rule.vars() {
            let name = ident(&var.name)?;
            let ty = parse_type(&var.ty)?;
            fields.push(quote! { pub #name: #ty });
        }

        let mut params = Vec::new();
        let mut inherited = Vec::new();
        for var in rule.inherited() {
            let name = ident(&var.name)?;
            let ty = parse_type(&var.ty)?;
            params.push(quote! { #name: #ty });
            inherited.push(name);
        }
        let constructor = if inherited.is_empty() {
            quote! { Self::default() }
        } else {
            quote! {
                #node {
                    #( #inherited, )*
                    ..Default::default()
                }
            }
        };

        let dispatch = self.generate_dispatch(rule)?;
        let bodies = rule
            .alternatives()
            .iter()
            .enumerate()
            .map(|(i, alt)| self.generate_body(rule, i, &alt.items))
            .collect::<Result<Vec<_>>>()?;
        let actions = rule
            .actions()
            .iter()
            .map(|(name, code)| {
                ident(name)?;
                let method = format_ident!("action_{}", name);
                let code = parse_code(name, code)?;
                Ok(quote! {
                    fn #method(&mut self) {
                        #code
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(quote! {
            #[derive(Debug, Clone, Default)]
            pub struct #node {
                pub children: Vec<Node>,
                #( #fields, )*
            }

            impl #node {
                pub fn new(#( #params ),*) -> Self {
                    #constructor
                }

                #dispatch
                #( #bodies )*
                #( #actions )*
            }
        })
    }

    /// Peeks one token and hands over to the alternative it starts. A
    /// nullable alternative is also chosen on any token of FOLLOW. Nothing
    /// happens when no alternative applies.
    fn generate_dispatch(&self, rule: &Rule) -> Result<TokenStream> {
        let mut checks = Vec::new();
        let mut nullable = None;
        for (i, alt) in rule.alternatives().iter().enumerate() {
            let body = format_ident!("parse_{}", i);
            for terminal in self.analyzer.get_first(&alt.symbols()) {
                match terminal {
                    Terminal::Eps => nullable = Some(body.clone()),
                    t => checks.push((condition(&t)?, body.clone())),
                }
            }
        }
        if let Some(body) = nullable {
            for t in self.analyzer.get_follow(rule.name()) {
                if t != Terminal::Eps {
                    checks.push((condition(&t)?, body.clone()));
                }
            }
        }

        if checks.is_empty() {
            return Ok(quote! {
                pub fn parse(&mut self, _scanner: &mut ::parsegen::Scanner<'_, TokenType>) -> ::parsegen::Result<()> {
                    Ok(())
                }
            });
        }
        let (conds, bodies): (Vec<TokenStream>, Vec<Ident>) = checks.into_iter().unzip();
        Ok(quote! {
            pub fn parse(&mut self, scanner: &mut ::parsegen::Scanner<'_, TokenType>) -> ::parsegen::Result<()> {
                let token = scanner.next()?;
                scanner.undo();
                #(
                    if #conds {
                        return self.#bodies(scanner);
                    }
                )*
                Ok(())
            }
        })
    }

    fn generate_body(&self, rule: &Rule, i: usize, items: &[RuleItem]) -> Result<TokenStream> {
        let method = format_ident!("parse_{}", i);
        let mut consumes = false;
        let mut stmts = Vec::new();

        for item in items {
            let stmt = match item {
                RuleItem::Text(text) => {
                    consumes = true;
                    quote! {
                        let token = scanner.expect_text(#text)?;
                        self.children.push(Node::Terminal(token.text.to_owned()));
                    }
                }
                RuleItem::RegexTransition(name) if name.as_str() == EPS => continue,
                RuleItem::RegexTransition(name) => {
                    consumes = true;
                    let kind = self.token_type(name)?;
                    quote! {
                        let token = scanner.expect_kind(TokenType::#kind)?;
                        self.children.push(Node::Terminal(token.text.to_owned()));
                    }
                }
                RuleItem::NonTerminalTransition(target) => {
                    consumes = true;
                    self.generate_call(rule, target, None)?
                }
                RuleItem::AssignFromNonTerminal { var, rule: target } => {
                    consumes = true;
                    self.generate_call(rule, target, Some(var))?
                }
                RuleItem::AssignFromText { var, text } => {
                    consumes = true;
                    let var = ident(var)?;
                    quote! {
                        let token = scanner.expect_text(#text)?;
                        self.children.push(Node::Terminal(token.text.to_owned()));
                        self.#var = token.text.to_owned();
                    }
                }
                RuleItem::AssignFromRegex { var, regex } => {
                    consumes = true;
                    let var = ident(var)?;
                    let kind = self.token_type(regex)?;
                    quote! {
                        let token = scanner.expect_kind(TokenType::#kind)?;
                        self.children.push(Node::Terminal(token.text.to_owned()));
                        self.#var = token.text.to_owned();
                    }
                }
                RuleItem::ActionCall(name) => {
                    if !rule.actions().contains_key(name) {
                        return Err(Error::config(format!(
                            "call to undeclared action '${}' in rule '{}'",
                            name,
                            rule.name()
                        )));
                    }
                    ident(name)?;
                    let action = format_ident!("action_{}", name);
                    quote! { self.#action(); }
                }
            };
            stmts.push(stmt);
        }

        let scanner = if consumes {
            format_ident!("scanner")
        } else {
            format_ident!("_scanner")
        };
        Ok(quote! {
            fn #method(&mut self, #scanner: &mut ::parsegen::Scanner<'_, TokenType>) -> ::parsegen::Result<()> {
                #( #stmts )*
                Ok(())
            }
        })
    }

    /// Parses `target` as a child node. With `var` set, every export `v` of
    /// the child is copied into this rule's `var_v`.
    fn generate_call(&self, rule: &Rule, target: &str, var: Option<&String>) -> Result<TokenStream> {
        let target_rule = self.rule(target)?;
        let node = ident(&node_name(target))?;

        let mut args = Vec::new();
        for inherited in target_rule.inherited() {
            match rule.var_type(&inherited.name) {
                None => {
                    return Err(Error::config(format!(
                        "rule '{}' calls '{}' without its inherited variable '{}'",
                        rule.name(),
                        target,
                        inherited.name
                    )))
                }
                Some(ty) if !same_type(ty, &inherited.ty) => {
                    return Err(Error::config(format!(
                        "rule '{}' passes '{}' of type {} to '{}', which expects {}",
                        rule.name(),
                        inherited.name,
                        ty,
                        target,
                        inherited.ty
                    )))
                }
                Some(_) => {}
            }
            let name = ident(&inherited.name)?;
            args.push(quote! { self.#name.clone() });
        }

        let mut copies = Vec::new();
        if let Some(var) = var {
            for export in target_rule.exported() {
                let derived = format!("{}_{}", var, export.name);
                if rule.has_var(&derived) {
                    let derived = ident(&derived)?;
                    let export = ident(&export.name)?;
                    copies.push(quote! { self.#derived = node.#export.clone(); });
                }
            }
        }

        Ok(quote! {
            {
                let mut node = #node::new(#( #args ),*);
                node.parse(scanner)?;
                #( #copies )*
                self.children.push(Node::#node(Box::new(node)));
            }
        })
    }

    fn token_type(&self, regex: &str) -> Result<Ident> {
        if !self.scanner.has_regex(regex) {
            return Err(Error::config(format!("undeclared regex terminal '{}'", regex)));
        }
        ident(regex)
    }

    /// `parse(input, ..)`: the start rule followed by end of input. Inherited
    /// variables of the start rule become extra parameters.
    fn generate_entry(&self) -> Result<TokenStream> {
        let start = self.rule(self.grammar.start())?;
        let node = ident(&node_name(start.name()))?;

        let mut params = Vec::new();
        let mut args = Vec::new();
        for var in start.inherited() {
            let name = ident(&var.name)?;
            let ty = parse_type(&var.ty)?;
            params.push(quote! { #name: #ty });
            args.push(name);
        }

        Ok(quote! {
            pub fn parse(input: &str #( , #params )*) -> ::parsegen::Result<#node> {
                let mut scanner = scanner(input)?;
                let mut node = #node::new(#( #args ),*);
                node.parse(&mut scanner)?;
                scanner.expect_end()?;
                Ok(node)
            }
        })
    }

    /// Reads one line, parses it and prints the start rule's exports.
    fn generate_main(&self) -> Result<TokenStream> {
        let start = self.rule(self.grammar.start())?;
        let defaults = start
            .inherited()
            .iter()
            .map(|_| quote! { ::std::default::Default::default() })
            .collect::<Vec<_>>();

        let exported = start.exported();
        let names = exported.iter().map(|v| v.name.as_str());
        let fields = exported
            .iter()
            .map(|v| ident(&v.name))
            .collect::<Result<Vec<_>>>()?;
        let node = if exported.is_empty() {
            format_ident!("_node")
        } else {
            format_ident!("node")
        };

        Ok(quote! {
            fn main() {
                let mut line = String::new();
                if let Err(e) = ::std::io::stdin().read_line(&mut line) {
                    eprintln!("{}", e);
                    ::std::process::exit(1);
                }
                let input = line.trim_end_matches(&['\r', '\n'][..]);
                match parse(input #( , #defaults )*) {
                    Ok(#node) => {
                        #( println!("{} = {}", #names, #node.#fields); )*
                    }
                    Err(e) => {
                        eprintln!("{}", e);
                        ::std::process::exit(1);
                    }
                }
            }
        })
    }
}

/// Whether the peeked `token` is the terminal `t`.
fn condition(t: &Terminal) -> Result<TokenStream> {
    Ok(match t {
        Terminal::Text(text) => quote! { token.is_text(#text) },
        Terminal::Regex(name) => {
            let kind = ident(name)?;
            quote! { token.kind == TokenType::#kind }
        }
        Terminal::End => quote! { token.kind == TokenType::END },
        Terminal::Eps => {
            return Err(Error::config(format!("{} is not a token", EPS)));
        }
    })
}
