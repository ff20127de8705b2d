//! Small grammars derived inline, each in its own module since a derive
//! emits its items next to the deriving type.

mod action {
    use derive::Parser;

    #[derive(Parser)]
    #[grammar_inline = "
$dup[i32 x] { self.x = 1; }
expr : 'a' $dup
expr
"]
    pub struct DupParser;
}

mod number {
    use derive::Parser;

    #[derive(Parser)]
    #[grammar_inline = "
NUM : '[0-9]+'
expr : (v = NUM)
expr
"]
    pub struct NumParser;
}

mod list {
    use derive::Parser;

    // Counts the items of a comma separated list, threading the count
    // through an inherited variable.
    #[derive(Parser)]
    #[grammar_inline = "
ID : '[a-z]+'
$start[i32 count] { self.count = 1; }
$bump[] { self.count += 1; }
$total[i32 len] { self.len = self.rest_len; }
$last[i32 len] { self.len = self.count; }
list : ID $start (rest = tail) $total
tail [i32 count] : ',' ID $bump (rest = tail) $total
tail [i32 count] : EPS $last
list
"]
    pub struct ListParser;
}

mod keywords {
    use derive::Parser;

    #[derive(Parser)]
    #[grammar_inline = "
ID : '[a-z]+'
NUM : '[0-9]+'
stmt : (k = 'ifend')
stmt : (k = 'if') (n = NUM)
stmt : (k = ID)
stmt
"]
    pub struct KeywordParser;
}

use parsegen::ParseError;
use pretty_assertions::assert_eq;

#[test]
fn action_sets_export() {
    let node = action::DupParser::parse("a").unwrap();
    assert_eq!(node.x, 1);
    assert_eq!(node.children.len(), 1);
}

#[test]
fn action_grammar_rejects_trailing_input() {
    let err = action::DupParser::parse("aa").unwrap_err();
    assert_eq!(err, ParseError::TrailingInput { position: 1 });
}

#[test]
fn regex_assignment_binds_text() {
    let node = number::NumParser::parse("42").unwrap();
    assert_eq!(node.v, "42");
    assert_eq!(node.children.len(), 1);
    assert!(matches!(&node.children[0], number::Node::Terminal(t) if t == "42"));
}

#[test]
fn unknown_input() {
    let err = number::NumParser::parse("x").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedToken {
            position: 0,
            near: "x".to_owned()
        }
    );
}

#[test]
fn inherited_count() {
    let tests = vec![("a", 1), ("a,b", 2), ("a,bb,ccc,d", 4)];
    for (input, len) in tests {
        let node = list::ListParser::parse(input).unwrap();
        assert_eq!(node.len, len, "input: {}", input);
    }
    assert_eq!(
        list::ListParser::parse("a,").unwrap_err().to_string(),
        "unexpected token 'END', expected ID"
    );
}

#[test]
fn longest_match_between_literals_and_regexes() {
    let node = keywords::KeywordParser::parse("ifend").unwrap();
    assert_eq!(node.k, "ifend");

    let node = keywords::KeywordParser::parse("if7").unwrap();
    assert_eq!((node.k.as_str(), node.n.as_str()), ("if", "7"));

    // A longer regex match beats the literal.
    let node = keywords::KeywordParser::parse("ifx").unwrap();
    assert_eq!(node.k, "ifx");

    let err = keywords::KeywordParser::parse("if").unwrap_err();
    assert_eq!(err.to_string(), "unexpected token 'END', expected NUM");
}

#[test]
fn scanner_is_exposed() {
    let mut s = number::scanner("7").unwrap();
    let tok = s.next().unwrap();
    assert_eq!(tok.kind, number::TokenType::NUM);
    s.undo();
    assert_eq!(s.next().unwrap(), tok);
    assert!(s.next().unwrap().is_end());
}
