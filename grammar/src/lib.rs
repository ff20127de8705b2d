//! The grammar model: non-terminals with attributed alternatives, regex
//! terminals, and actions, plus the reader for the text description.

use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt::{self, Display};
use std::str::FromStr;

mod error;
pub mod parser;
mod resolve;
mod rule;
mod symbol;

pub use error::{Error, Result};
pub use rule::{same_type, Action, Alternative, Rule, RuleItem, Variable, STRING_TYPE};
pub use symbol::{Symbol, Terminal, END, EPS};

/// A complete grammar description.
///
/// Built once by ingestion, then [resolved](Grammar::resolve) and treated as
/// read-only by analysis and code generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    start: String,
    rules: IndexMap<String, Rule>,
    regexes: Vec<(String, String)>,
    actions: IndexMap<String, Action>,
}

impl Grammar {
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn set_start(&mut self, start: &str) {
        self.start = start.to_owned();
    }

    /// Adds a rule, merging it into an existing rule of the same name.
    pub fn add_rule(&mut self, rule: Rule) -> Result<()> {
        match self.rules.get_mut(rule.name()) {
            Some(existing) => existing.merge(rule),
            None => {
                self.rules.insert(rule.name().to_owned(), rule);
                Ok(())
            }
        }
    }

    /// Records a regex terminal. Name checks happen when the scanner is
    /// synthesized.
    pub fn add_regex(&mut self, name: &str, pattern: &str) {
        self.regexes.push((name.to_owned(), pattern.to_owned()));
    }

    pub fn add_action(&mut self, action: Action) -> Result<()> {
        if self.actions.contains_key(&action.name) {
            return Err(Error::config(format!(
                "duplicated action name ({})",
                action.name
            )));
        }
        self.actions.insert(action.name.clone(), action);
        Ok(())
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn regexes(&self) -> &[(String, String)] {
        &self.regexes
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    /// Every literal text used by any rule.
    pub fn literals(&self) -> BTreeSet<String> {
        self.rules()
            .flat_map(Rule::items)
            .filter_map(|item| match item {
                RuleItem::Text(text) | RuleItem::AssignFromText { text, .. } => Some(text.clone()),
                RuleItem::RegexTransition(_)
                | RuleItem::NonTerminalTransition(_)
                | RuleItem::AssignFromNonTerminal { .. }
                | RuleItem::AssignFromRegex { .. }
                | RuleItem::ActionCall(_) => None,
            })
            .collect()
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (name, pattern) in &self.regexes {
            writeln!(f, "{} : '{}'", name, pattern)?;
        }
        for rule in self.rules() {
            let inherited: Vec<String> = rule.inherited().iter().map(|v| v.to_string()).collect();
            for alt in rule.alternatives() {
                if inherited.is_empty() {
                    writeln!(f, "{} : {}", rule.name(), alt)?;
                } else {
                    writeln!(f, "{} [{}] : {}", rule.name(), inherited.join(", "), alt)?;
                }
            }
        }
        writeln!(f, "{}", self.start)
    }
}

impl FromStr for Grammar {
    type Err = Error;

    /// Reads and resolves a description.
    fn from_str(s: &str) -> Result<Self> {
        parser::description(s)?.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn literals_are_collected_once() {
        let g: Grammar = "
expr : '(' expr ')'
expr : (op = '(') 'x'
expr
"
        .parse()
        .unwrap();
        let lits: Vec<String> = g.literals().into_iter().collect();
        assert_eq!(lits, vec!["(".to_owned(), ")".to_owned(), "x".to_owned()]);
    }

    #[test]
    fn same_named_rules_merge() {
        let g: Grammar = "a : 'x'\nb : 'y'\na : b\na\n".parse().unwrap();
        let names: Vec<&str> = g.rules().map(Rule::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(g.rule("a").unwrap().alternatives().len(), 2);
    }

    #[test]
    fn display_lists_alternatives() {
        let g: Grammar = "NUM : '[0-9]+'\nlist [i32 n] : (v = NUM) list\nlist : EPS\nlist\n"
            .parse()
            .unwrap();
        assert_eq!(
            g.to_string(),
            "NUM : '[0-9]+'\nlist [i32 n] : (v = NUM) list\nlist [i32 n] : EPS\nlist\n"
        );
    }
}
