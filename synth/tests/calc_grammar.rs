use std::fs;
use std::path::Path;

use grammar::Grammar;
use synth::{Analyzer, Options};

fn calc() -> Grammar {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../calc/calc.grammar");
    fs::read_to_string(path).unwrap().parse().unwrap()
}

#[test]
fn calc_grammar_is_ll1() {
    let g = calc();
    let analyzer = Analyzer::new(&g).unwrap();
    assert!(analyzer.check_ll1().is_ok());
}

#[test]
fn calc_grammar_generates_every_node() {
    let code = synth::generate_file(&calc(), &Options::default()).unwrap();
    for node in ["ExprNode", "ExprTailNode", "TermNode", "TermTailNode", "FactorNode"] {
        assert!(code.contains(node), "missing {}", node);
    }
    assert!(code.contains("TokenType"));
    assert!(code.contains("action_add"));
}
