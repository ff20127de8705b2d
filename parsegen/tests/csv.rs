//! A very simple csv parser that acts only on numbers, written by hand in the
//! shape of a generated parser.
//!
//! ```text
//! FIELD : '[0-9]+'
//! csv : record csv
//! csv : EPS
//! record : FIELD fields '\n'
//! fields : ',' FIELD fields
//! fields : EPS
//! csv
//! ```

use parsegen::{ParseError, Scanner, TokenKind};

#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TokenType {
    FIELD,
    TEXT,
    END,
}

impl TokenKind for TokenType {
    const TEXT: Self = TokenType::TEXT;
    const END: Self = TokenType::END;
}

const LITERALS: &[&str] = &[",", "\n"];
const REGEXES: &[(TokenType, &str)] = &[(TokenType::FIELD, "[0-9]+")];

type Records = Vec<Vec<String>>;

fn csv(s: &mut Scanner<TokenType>, out: &mut Records) -> Result<(), ParseError> {
    let tok = s.next()?;
    s.undo();
    if tok.kind == TokenType::FIELD {
        record(s, out)?;
        csv(s, out)
    } else {
        // FOLLOW(csv) = {END}, checked by the caller.
        Ok(())
    }
}

fn record(s: &mut Scanner<TokenType>, out: &mut Records) -> Result<(), ParseError> {
    let mut fields = vec![s.expect_kind(TokenType::FIELD)?.text.to_owned()];
    loop {
        let tok = s.next()?;
        s.undo();
        if !tok.is_text(",") {
            break;
        }
        s.expect_text(",")?;
        fields.push(s.expect_kind(TokenType::FIELD)?.text.to_owned());
    }
    s.expect_text("\n")?;
    out.push(fields);
    Ok(())
}

fn parse(input: &str) -> Result<Records, ParseError> {
    let mut s = Scanner::new(input, LITERALS, REGEXES)?;
    let mut out = Vec::new();
    csv(&mut s, &mut out)?;
    s.expect_end()?;
    Ok(out)
}

#[test]
fn single_record() {
    let records = parse("123,789\n").unwrap();
    assert_eq!(records, vec![vec!["123".to_owned(), "789".to_owned()]]);
}

#[test]
fn many_records() {
    let records = parse("184,754\n33,22222\n").unwrap();
    assert_eq!(records.len(), 2, "records: {:?}", records);
    assert_eq!(records[1][1], "22222");
}

#[test]
fn empty() {
    assert_eq!(parse("").unwrap(), Records::new());
}

#[test]
fn missing_newline() {
    let err = parse("1,2").unwrap_err();
    assert_eq!(err.to_string(), "found 'END' but expected '\n'");
}

#[test]
fn trailing_input() {
    let err = parse("1\n,").unwrap_err();
    assert_eq!(err, ParseError::TrailingInput { position: 2 });
}
