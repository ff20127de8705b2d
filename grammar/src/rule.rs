use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

use crate::error::{Error, Result};
use crate::symbol::{Symbol, EPS};

/// Type given to variables bound by text and regex assignments.
pub const STRING_TYPE: &str = "String";

/// A typed attribute variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    pub ty: String,
    pub name: String,
}

impl Variable {
    pub fn new(ty: &str, name: &str) -> Self {
        Variable {
            ty: ty.to_owned(),
            name: name.to_owned(),
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

/// One element of an alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleItem {
    Text(String),
    RegexTransition(String),
    NonTerminalTransition(String),
    AssignFromNonTerminal { var: String, rule: String },
    AssignFromText { var: String, text: String },
    AssignFromRegex { var: String, regex: String },
    ActionCall(String),
}

impl RuleItem {
    /// The symbol this item contributes to the analyzed grammar, if any.
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            RuleItem::Text(text) | RuleItem::AssignFromText { text, .. } => {
                Some(Symbol::text(text))
            }
            RuleItem::RegexTransition(name) | RuleItem::AssignFromRegex { regex: name, .. } => {
                Some(Symbol::regex(name))
            }
            RuleItem::NonTerminalTransition(rule) | RuleItem::AssignFromNonTerminal { rule, .. } => {
                Some(Symbol::non_terminal(rule))
            }
            RuleItem::ActionCall(_) => None,
        }
    }
}

impl Display for RuleItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuleItem::Text(text) => write!(f, "'{}'", text),
            RuleItem::RegexTransition(name) | RuleItem::NonTerminalTransition(name) => {
                write!(f, "{}", name)
            }
            RuleItem::AssignFromNonTerminal { var, rule } => write!(f, "({} = {})", var, rule),
            RuleItem::AssignFromText { var, text } => write!(f, "({} = '{}')", var, text),
            RuleItem::AssignFromRegex { var, regex } => write!(f, "({} = {})", var, regex),
            RuleItem::ActionCall(name) => write!(f, "${}", name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alternative {
    pub items: Vec<RuleItem>,
}

impl Alternative {
    /// Flattens the alternative into the symbol sequence seen by the analyzer.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.items.iter().filter_map(RuleItem::symbol).collect()
    }
}

impl Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let items: Vec<String> = self.items.iter().map(|item| item.to_string()).collect();
        write!(f, "{}", items.join(" "))
    }
}

/// A named, caller-invoked block of code with its own exported variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub exported: Vec<Variable>,
    pub code: String,
}

/// A non-terminal with its attributes and alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    /// Variable name to type.
    vars: BTreeMap<String, String>,
    inherited: Vec<String>,
    exported: BTreeSet<String>,
    /// Action name to code, filled in when actions are resolved.
    actions: BTreeMap<String, String>,
    alternatives: Vec<Alternative>,
}

impl Rule {
    /// Creates a rule holding a single empty alternative.
    pub fn new(name: &str) -> Self {
        Rule {
            name: name.to_owned(),
            vars: BTreeMap::new(),
            inherited: Vec::new(),
            exported: BTreeSet::new(),
            actions: BTreeMap::new(),
            alternatives: vec![Alternative::default()],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a variable. Returns whether it was not declared before.
    ///
    /// Redeclaring a name with a different type is an error.
    pub fn add_var(&mut self, ty: &str, name: &str) -> Result<bool> {
        match self.vars.get(name) {
            Some(existing) if same_type(existing, ty) => Ok(false),
            Some(existing) => Err(Error::config(format!(
                "variable '{}' of rule '{}' declared as both '{}' and '{}'",
                name, self.name, existing, ty
            ))),
            None => {
                self.vars.insert(name.to_owned(), ty.to_owned());
                Ok(true)
            }
        }
    }

    pub fn add_inherited_var(&mut self, ty: &str, name: &str) -> Result<()> {
        self.add_var(ty, name)?;
        if self.inherited.iter().any(|n| n == name) {
            return Err(Error::config(format!(
                "inherited variable '{}' of rule '{}' declared twice",
                name, self.name
            )));
        }
        self.inherited.push(name.to_owned());
        Ok(())
    }

    /// Declares an exported variable. Returns whether the export is new.
    pub fn add_exported_var(&mut self, ty: &str, name: &str) -> Result<bool> {
        self.add_var(ty, name)?;
        Ok(self.exported.insert(name.to_owned()))
    }

    pub fn add_action_code(&mut self, name: &str, code: &str) {
        self.actions
            .entry(name.to_owned())
            .or_insert_with(|| code.to_owned());
    }

    /// Appends an item to the last alternative.
    pub fn push(&mut self, item: RuleItem) -> Result<()> {
        match &item {
            RuleItem::AssignFromText { var, .. } => {
                self.add_var(STRING_TYPE, var)?;
            }
            RuleItem::AssignFromRegex { var, regex } => {
                if regex == EPS {
                    return Err(Error::config(format!(
                        "cannot assign {} to '{}' in rule '{}'",
                        EPS, var, self.name
                    )));
                }
                self.add_var(STRING_TYPE, var)?;
            }
            RuleItem::Text(_)
            | RuleItem::RegexTransition(_)
            | RuleItem::NonTerminalTransition(_)
            | RuleItem::AssignFromNonTerminal { .. }
            | RuleItem::ActionCall(_) => {}
        }
        if let Some(alt) = self.alternatives.last_mut() {
            alt.items.push(item);
        }
        Ok(())
    }

    /// Merges a redeclaration of the same non-terminal into this one.
    pub fn merge(&mut self, other: Rule) -> Result<()> {
        if self.name != other.name {
            return Err(Error::config(format!(
                "cannot merge rule '{}' into rule '{}'",
                other.name, self.name
            )));
        }
        for (name, ty) in &other.vars {
            self.add_var(ty, name)?;
        }
        if self.inherited.is_empty() {
            self.inherited = other.inherited;
        } else if !other.inherited.is_empty() && other.inherited != self.inherited {
            return Err(Error::config(format!(
                "rule '{}' redeclared with different inherited variables",
                self.name
            )));
        }
        self.exported.extend(other.exported);
        for (name, code) in other.actions {
            self.actions.entry(name).or_insert(code);
        }
        self.alternatives.extend(other.alternatives);
        Ok(())
    }

    pub fn var_type(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// All declared variables, ordered by name.
    pub fn vars(&self) -> impl Iterator<Item = Variable> + '_ {
        self.vars.iter().map(|(name, ty)| Variable::new(ty, name))
    }

    /// Inherited variables in parameter order.
    pub fn inherited(&self) -> Vec<Variable> {
        self.collect_vars(self.inherited.iter())
    }

    /// Exported variables, ordered by name.
    pub fn exported(&self) -> Vec<Variable> {
        self.collect_vars(self.exported.iter())
    }

    pub fn actions(&self) -> &BTreeMap<String, String> {
        &self.actions
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    /// Every `(var, rule)` pair of a non-terminal assignment.
    pub fn assigns(&self) -> Vec<(String, String)> {
        self.items()
            .filter_map(|item| match item {
                RuleItem::AssignFromNonTerminal { var, rule } => Some((var.clone(), rule.clone())),
                _ => None,
            })
            .collect()
    }

    /// Names of the actions called from any alternative.
    pub fn action_calls(&self) -> BTreeSet<String> {
        self.items()
            .filter_map(|item| match item {
                RuleItem::ActionCall(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn items(&self) -> impl Iterator<Item = &RuleItem> {
        self.alternatives.iter().flat_map(|alt| alt.items.iter())
    }

    fn collect_vars<'a>(&self, names: impl Iterator<Item = &'a String>) -> Vec<Variable> {
        names
            .filter_map(|name| self.var_type(name).map(|ty| Variable::new(ty, name)))
            .collect()
    }
}

/// Whether two type names are equal up to whitespace.
pub fn same_type(a: &str, b: &str) -> bool {
    let squeeze = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    squeeze(a) == squeeze(b)
}
