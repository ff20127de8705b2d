use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::rule::{RuleItem, Variable};
use crate::symbol::EPS;
use crate::Grammar;

impl Grammar {
    /// Checks references and propagates attributes across rules.
    ///
    /// Actions are merged into their callers first, then every `(x = t)`
    /// assignment gives the caller an exported `x_v` for each export `v` of
    /// `t`.
    pub fn resolve(mut self) -> Result<Grammar> {
        self.check_references()?;
        self.merge_actions()?;
        self.propagate_exports()?;
        Ok(self)
    }

    fn check_references(&self) -> Result<()> {
        if !self.rules.contains_key(&self.start) {
            return Err(Error::config(format!(
                "start non-terminal '{}' has no rules",
                self.start
            )));
        }

        for rule in self.rules() {
            for item in rule.items() {
                match item {
                    RuleItem::NonTerminalTransition(target) => {
                        if !self.rules.contains_key(target) {
                            return Err(Error::config(format!(
                                "transition to undeclared rule '{}' in rule '{}'",
                                target,
                                rule.name()
                            )));
                        }
                    }
                    RuleItem::AssignFromNonTerminal { var, rule: target } => {
                        if !self.rules.contains_key(target) {
                            return Err(Error::config(format!(
                                "found assignment to not existing rule ({}={}) in rule '{}'",
                                var,
                                target,
                                rule.name()
                            )));
                        }
                    }
                    RuleItem::RegexTransition(name) | RuleItem::AssignFromRegex { regex: name, .. } => {
                        if name != EPS && !self.regexes.iter().any(|(n, _)| n == name) {
                            return Err(Error::config(format!(
                                "undeclared regex terminal '{}' in rule '{}'",
                                name,
                                rule.name()
                            )));
                        }
                    }
                    RuleItem::ActionCall(name) => {
                        if !self.actions.contains_key(name) {
                            return Err(Error::config(format!(
                                "call to undeclared action '${}' in rule '{}'",
                                name,
                                rule.name()
                            )));
                        }
                    }
                    RuleItem::Text(_) | RuleItem::AssignFromText { .. } => {}
                }
            }
        }
        Ok(())
    }

    fn merge_actions(&mut self) -> Result<()> {
        for rule in self.rules.values_mut() {
            for name in rule.action_calls() {
                let action = self.actions.get(&name).ok_or_else(|| {
                    Error::config(format!("call to undeclared action '${}'", name))
                })?;
                for var in &action.exported {
                    rule.add_exported_var(&var.ty, &var.name)?;
                }
                rule.add_action_code(&name, &action.code);
            }
        }
        Ok(())
    }

    fn propagate_exports(&mut self) -> Result<()> {
        let names: Vec<String> = self.rules.keys().cloned().collect();
        let mut done = HashMap::new();
        let mut stack = Vec::new();
        for name in &names {
            self.resolve_exports(name, &mut stack, &mut done)?;
        }
        Ok(())
    }

    /// Final exports of `name`, adding derived variables on the way.
    ///
    /// A rule already on `stack` is part of an assignment cycle and
    /// contributes the exports it has so far.
    fn resolve_exports(
        &mut self,
        name: &str,
        stack: &mut Vec<String>,
        done: &mut HashMap<String, Vec<Variable>>,
    ) -> Result<Vec<Variable>> {
        if let Some(exports) = done.get(name) {
            return Ok(exports.clone());
        }
        let rule = self
            .rules
            .get(name)
            .ok_or_else(|| Error::config(format!("found assignment to not existing rule ({})", name)))?;
        if stack.iter().any(|n| n == name) {
            return Ok(rule.exported());
        }

        let assigns = rule.assigns();
        stack.push(name.to_owned());
        let mut derived = Vec::new();
        for (var, target) in assigns {
            for export in self.resolve_exports(&target, stack, done)? {
                derived.push(Variable::new(
                    &export.ty,
                    &format!("{}_{}", var, export.name),
                ));
            }
        }
        stack.pop();

        let rule = self
            .rules
            .get_mut(name)
            .ok_or_else(|| Error::config(format!("unknown rule '{}'", name)))?;
        for var in derived {
            if rule.add_exported_var(&var.ty, &var.name)? {
                log::debug!("rule '{}' re-exports '{}'", name, var);
            }
        }
        let exports = rule.exported();
        done.insert(name.to_owned(), exports.clone());
        Ok(exports)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, Grammar, Variable};
    use pretty_assertions::assert_eq;

    fn resolve(src: &str) -> Result<Grammar, Error> {
        src.parse()
    }

    #[test]
    fn action_exports_merge_into_callers() {
        let g = resolve(
            "
$dup[i32 x] { self.x = 1; }
expr : 'a' $dup
expr
",
        )
        .unwrap();
        let expr = g.rule("expr").unwrap();
        assert_eq!(expr.exported(), vec![Variable::new("i32", "x")]);
        assert_eq!(expr.actions().get("dup").map(String::as_str), Some("self.x = 1;"));
    }

    #[test]
    fn assignments_reexport_with_prefix() {
        let g = resolve(
            "
$val[i32 v] { self.v = 2; }
inner : 'b' $val
middle : (i = inner)
outer : (m = middle)
outer
",
        )
        .unwrap();
        assert_eq!(
            g.rule("middle").unwrap().exported(),
            vec![Variable::new("i32", "i_v")]
        );
        assert_eq!(
            g.rule("outer").unwrap().exported(),
            vec![Variable::new("i32", "m_i_v")]
        );
    }

    #[test]
    fn chains_resolve_regardless_of_declaration_order() {
        let g = resolve(
            "
$val[i32 v] { }
outer : (m = middle)
middle : (i = inner)
inner : 'b' $val
outer
",
        )
        .unwrap();
        assert_eq!(
            g.rule("outer").unwrap().exported(),
            vec![Variable::new("i32", "m_i_v")]
        );
    }

    #[test]
    fn recursive_assignments_terminate() {
        let g = resolve(
            "
$len[i32 n] { }
list : 'x' (rest = list) $len
list : EPS $len
list
",
        )
        .unwrap();
        assert_eq!(
            g.rule("list").unwrap().exported(),
            vec![Variable::new("i32", "n"), Variable::new("i32", "rest_n")]
        );
    }

    #[test]
    fn undeclared_references_are_config_errors() {
        let tests = vec![
            "expr : (x = missing)\nexpr\n",
            "expr : missing\nexpr\n",
            "expr : NUM\nexpr\n",
            "expr : $missing\nexpr\n",
            "expr : 'a'\nother\n",
        ];
        for src in tests {
            assert!(
                matches!(resolve(src), Err(Error::Config(_))),
                "src: {:?}",
                src
            );
        }
    }

    #[test]
    fn conflicting_export_types_are_rejected() {
        let src = "
$a[i32 x] { }
$b[String x] { }
expr : $a $b
expr
";
        assert!(matches!(resolve(src), Err(Error::Config(_))));
    }
}
