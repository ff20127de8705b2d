//! FIRST/FOLLOW computation and the LL(1) check.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use grammar::{Grammar, Symbol, Terminal};

use crate::error::{Error, Result};

pub type TerminalSet = BTreeSet<Terminal>;

/// Analysis tables for one grammar.
///
/// Construction runs both fixed points and the LL(1) check, so a value of
/// this type always describes a grammar the parser synthesizer can handle.
#[derive(Debug)]
pub struct Analyzer {
    start: String,
    /// Flattened alternatives. Those of the start rule end in `END`.
    rules: IndexMap<String, Vec<Vec<Symbol>>>,
    terminals: TerminalSet,
    first: HashMap<String, TerminalSet>,
    follow: HashMap<String, TerminalSet>,
    cache: RefCell<HashMap<Vec<Symbol>, TerminalSet>>,
}

impl Analyzer {
    pub fn new(grammar: &Grammar) -> Result<Self> {
        let mut rules = IndexMap::new();
        let mut terminals = TerminalSet::new();
        for rule in grammar.rules() {
            let alts: Vec<Vec<Symbol>> = rule
                .alternatives()
                .iter()
                .map(|alt| {
                    let mut symbols = alt.symbols();
                    if rule.name() == grammar.start() {
                        symbols.push(Symbol::Terminal(Terminal::End));
                    }
                    symbols
                })
                .collect();
            for sym in alts.iter().flatten() {
                if let Symbol::Terminal(t) = sym {
                    if *t != Terminal::Eps {
                        terminals.insert(t.clone());
                    }
                }
            }
            rules.insert(rule.name().to_owned(), alts);
        }
        terminals.insert(Terminal::End);

        let first = rules
            .keys()
            .map(|name| (name.clone(), TerminalSet::new()))
            .collect();
        let mut analyzer = Analyzer {
            start: grammar.start().to_owned(),
            rules,
            terminals,
            first,
            follow: HashMap::new(),
            cache: RefCell::new(HashMap::new()),
        };

        while analyzer.first_pass() {}
        analyzer
            .follow
            .entry(analyzer.start.clone())
            .or_default()
            .insert(Terminal::End);
        while analyzer.follow_pass() {}

        for name in analyzer.rules.keys() {
            log::debug!(
                "{}: FIRST = {{{}}}, FOLLOW = {{{}}}",
                name,
                join(&analyzer.first[name]),
                join(&analyzer.get_follow(name))
            );
        }

        analyzer.check_ll1()?;
        Ok(analyzer)
    }

    /// Every literal and regex terminal used by the grammar, plus `END`.
    pub fn terminals(&self) -> &TerminalSet {
        &self.terminals
    }

    /// FIRST set of a symbol sequence. Contains `EPS` iff the sequence
    /// derives the empty string.
    pub fn get_first(&self, symbols: &[Symbol]) -> TerminalSet {
        if let Some(set) = self.cache.borrow().get(symbols) {
            return set.clone();
        }
        let set = self.first_of(symbols);
        self.cache
            .borrow_mut()
            .insert(symbols.to_vec(), set.clone());
        set
    }

    /// FOLLOW set of a non-terminal; empty for names never referenced.
    pub fn get_follow(&self, non_terminal: &str) -> TerminalSet {
        self.follow.get(non_terminal).cloned().unwrap_or_default()
    }

    /// Fails on the first pair of alternatives that one token of lookahead
    /// cannot tell apart.
    pub fn check_ll1(&self) -> Result<()> {
        for (name, alts) in &self.rules {
            let follow = self.get_follow(name);
            for (i, alt1) in alts.iter().enumerate() {
                let first1 = self.get_first(alt1);
                for (j, alt2) in alts.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let first2 = self.get_first(alt2);
                    if !first1.is_disjoint(&first2)
                        || (first1.contains(&Terminal::Eps) && !follow.is_disjoint(&first2))
                    {
                        return Err(Error::Conflict {
                            non_terminal: name.clone(),
                            first: render(name, alt1),
                            second: render(name, alt2),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Grows every non-terminal's FIRST set once. Returns whether any set
    /// changed.
    fn first_pass(&mut self) -> bool {
        let mut changed = false;
        for (name, alts) in &self.rules {
            let mut set = TerminalSet::new();
            for alt in alts {
                set.extend(self.first_of(alt));
            }
            let current = &self.first[name];
            if !set.is_subset(current) {
                set.extend(current.iter().cloned());
                self.first.insert(name.clone(), set);
                changed = true;
            }
        }
        changed
    }

    /// Grows every FOLLOW set once. Returns whether any set changed.
    fn follow_pass(&mut self) -> bool {
        let mut changed = false;
        for (a, alts) in &self.rules {
            for alt in alts {
                for (i, sym) in alt.iter().enumerate() {
                    let b = match sym {
                        Symbol::NonTerminal(b) => b,
                        Symbol::Terminal(_) => continue,
                    };
                    let mut add = self.first_of(&alt[i + 1..]);
                    if add.remove(&Terminal::Eps) {
                        add.extend(self.get_follow(a));
                    }
                    let follow = self.follow.entry(b.clone()).or_default();
                    let before = follow.len();
                    follow.extend(add);
                    changed |= follow.len() != before;
                }
            }
        }
        changed
    }

    /// FIRST computed from the current non-terminal table, bypassing the
    /// cache.
    fn first_of(&self, symbols: &[Symbol]) -> TerminalSet {
        let mut out = TerminalSet::new();
        for sym in symbols {
            let set: TerminalSet = match sym {
                Symbol::Terminal(Terminal::End) => {
                    [Terminal::End, Terminal::Eps].into_iter().collect()
                }
                Symbol::Terminal(t) => std::iter::once(t.clone()).collect(),
                Symbol::NonTerminal(name) => self.first.get(name).cloned().unwrap_or_default(),
            };
            let nullable = set.contains(&Terminal::Eps);
            out.extend(set.into_iter().filter(|t| *t != Terminal::Eps));
            if !nullable {
                return out;
            }
        }
        out.insert(Terminal::Eps);
        out
    }
}

/// `name : sym sym`, leaving out the appended `END`.
fn render(name: &str, symbols: &[Symbol]) -> String {
    let mut s = format!("{} :", name);
    for sym in symbols {
        if *sym != Symbol::Terminal(Terminal::End) {
            s.push(' ');
            s.push_str(&sym.to_string());
        }
    }
    s
}

fn join(set: &TerminalSet) -> String {
    set.iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analyze(src: &str) -> Result<Analyzer> {
        let g: Grammar = src.parse()?;
        Analyzer::new(&g)
    }

    fn set(terms: &[Terminal]) -> TerminalSet {
        terms.iter().cloned().collect()
    }

    fn text(s: &str) -> Terminal {
        Terminal::Text(s.to_owned())
    }

    const EXPR: &str = "
NUM : '[0-9]+'
expr : term expr_tail
expr_tail : '+' term expr_tail
expr_tail : EPS
term : NUM
term : '(' expr ')'
expr
";

    #[test]
    fn first_and_follow_of_expression_grammar() {
        let a = analyze(EXPR).unwrap();
        let num = Terminal::Regex("NUM".to_owned());

        assert_eq!(
            a.get_first(&[Symbol::non_terminal("expr")]),
            set(&[text("("), num.clone()])
        );
        assert_eq!(
            a.get_first(&[Symbol::non_terminal("expr_tail")]),
            set(&[text("+"), Terminal::Eps])
        );
        assert_eq!(a.get_follow("expr"), set(&[text(")"), Terminal::End]));
        assert_eq!(a.get_follow("expr_tail"), set(&[text(")"), Terminal::End]));
        assert_eq!(
            a.get_follow("term"),
            set(&[text(")"), text("+"), Terminal::End])
        );
        assert_eq!(
            a.terminals(),
            &set(&[text("("), text(")"), text("+"), num, Terminal::End])
        );
    }

    #[test]
    fn first_base_cases() {
        let a = analyze(EXPR).unwrap();
        assert_eq!(a.get_first(&[]), set(&[Terminal::Eps]));
        assert_eq!(a.get_first(&[Symbol::text("+")]), set(&[text("+")]));
        assert_eq!(
            a.get_first(&[Symbol::Terminal(Terminal::End)]),
            set(&[Terminal::End, Terminal::Eps])
        );
        assert_eq!(
            a.get_first(&[Symbol::non_terminal("expr_tail"), Symbol::text(")")]),
            set(&[text("+"), text(")")])
        );
    }

    #[test]
    fn get_first_is_idempotent() {
        let a = analyze(EXPR).unwrap();
        let seq = vec![Symbol::non_terminal("expr_tail"), Symbol::non_terminal("term")];
        let once = a.get_first(&seq);
        assert_eq!(a.get_first(&seq), once);
        assert_eq!(a.first_of(&seq), once);
    }

    #[test]
    fn extra_passes_change_nothing() {
        let mut a = analyze(EXPR).unwrap();
        let first = a.first.clone();
        let follow = a.follow.clone();
        assert!(!a.first_pass());
        assert!(!a.follow_pass());
        assert_eq!(a.first, first);
        assert_eq!(a.follow, follow);
    }

    #[test]
    fn nullable_tail_does_not_conflict() {
        let a = analyze("s : 'a' x\nx : EPS\nx : 'b'\ns\n").unwrap();
        assert_eq!(a.get_follow("x"), set(&[Terminal::End]));
    }

    #[test]
    fn shared_first_terminal_conflicts() {
        match analyze("s : 'a'\ns : 'a' 'b'\ns\n") {
            Err(Error::Conflict {
                non_terminal,
                first,
                second,
            }) => {
                assert_eq!(non_terminal, "s");
                assert_eq!(first, "s : 'a'");
                assert_eq!(second, "s : 'a' 'b'");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn follow_conflicts_with_nullable_alternative() {
        match analyze("s : x 'b'\nx : 'b'\nx : EPS\ns\n") {
            Err(Error::Conflict { non_terminal, .. }) => assert_eq!(non_terminal, "x"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn left_recursion_conflicts() {
        let src = "NUM : '[0-9]+'\ne : e '+' NUM\ne : NUM\ne\n";
        assert!(matches!(analyze(src), Err(Error::Conflict { .. })));
    }

    #[test]
    fn unreferenced_follow_is_empty() {
        let a = analyze("s : 'a'\nunused : 'b'\ns\n").unwrap();
        assert_eq!(a.get_follow("unused"), TerminalSet::new());
    }
}
