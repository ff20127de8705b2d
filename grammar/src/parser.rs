//! Parser for the line-oriented grammar description format.
//!
//! ```text
//! NUM : '[0-9]+'
//!
//! $number[i32 value] {
//!     self.value = self.n.parse().unwrap_or_default();
//! }
//!
//! expr : (n = NUM) $number
//! expr : '(' (e = expr) ')'
//! expr
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, char, space0, space1},
    combinator::{all_consuming, map, map_opt, opt, recognize},
    error::{ErrorKind, ParseError},
    multi::many0,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::rule::{Action, RuleItem, Variable};
use crate::{Grammar, Rule};

/// A parsed `name [inherited] : items` line.
#[derive(Debug, PartialEq)]
pub struct RuleDecl {
    pub name: String,
    pub inherited: Vec<Variable>,
    pub items: Vec<RuleItem>,
}

/// An identifier classified by its case.
#[derive(Debug, PartialEq)]
pub enum Name<'a> {
    Rule(&'a str),
    Regex(&'a str),
}

pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

pub fn is_rule_name(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_lowercase())
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

pub fn is_regex_name(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_uppercase())
        && s
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

pub fn name(input: &str) -> IResult<&str, Name<'_>> {
    map_opt(identifier, |id| {
        if is_rule_name(id) {
            Some(Name::Rule(id))
        } else if is_regex_name(id) {
            Some(Name::Regex(id))
        } else {
            None
        }
    })(input)
}

pub fn rule_name(input: &str) -> IResult<&str, &str> {
    map_opt(name, |n| match n {
        Name::Rule(id) => Some(id),
        Name::Regex(_) => None,
    })(input)
}

pub fn regex_name(input: &str) -> IResult<&str, &str> {
    map_opt(name, |n| match n {
        Name::Regex(id) => Some(id),
        Name::Rule(_) => None,
    })(input)
}

fn unescape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '\'' => Some('\''),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    }
}

/// Single-quoted text. With `keep_unknown` set, an unknown escape such as
/// `\d` is kept verbatim instead of failing.
fn quoted(input: &str, keep_unknown: bool) -> IResult<&str, String> {
    let (mut rem, _) = char('\'')(input)?;
    let mut out = String::new();
    loop {
        let mut chars = rem.chars();
        match chars.next() {
            None => return Err(failure(input, ErrorKind::Char)),
            Some('\'') => {
                rem = chars.as_str();
                break;
            }
            Some('\\') => {
                let escaped = chars.next().ok_or_else(|| failure(rem, ErrorKind::Escaped))?;
                match unescape(escaped) {
                    Some(c) => out.push(c),
                    None if keep_unknown => {
                        out.push('\\');
                        out.push(escaped);
                    }
                    None => return Err(failure(rem, ErrorKind::Escaped)),
                }
                rem = chars.as_str();
            }
            Some(c) => {
                out.push(c);
                rem = chars.as_str();
            }
        }
    }
    if out.is_empty() {
        // Empty strings are spelled EPS.
        return Err(failure(input, ErrorKind::NonEmpty));
    }
    Ok((rem, out))
}

fn failure(input: &str, kind: ErrorKind) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::from_error_kind(input, kind))
}

/// A literal token: `'text'`.
pub fn literal(input: &str) -> IResult<&str, String> {
    quoted(input, false)
}

/// A regex pattern: `'[0-9]+'`.
pub fn pattern(input: &str) -> IResult<&str, String> {
    quoted(input, true)
}

fn type_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ',' && c != ']')(input)
}

fn variable(input: &str) -> IResult<&str, Variable> {
    map(
        terminated(
            separated_pair(preceded(space0, type_name), space1, identifier),
            pair(space0, opt(char(','))),
        ),
        |(ty, name)| Variable::new(ty, name),
    )(input)
}

/// A bracketed variable list: `[i32 acc, String name]`.
pub fn variables(input: &str) -> IResult<&str, Vec<Variable>> {
    delimited(char('['), many0(variable), pair(space0, char(']')))(input)
}

fn assignment(input: &str) -> IResult<&str, RuleItem> {
    let (rem, (var, source)) = delimited(
        pair(char('('), space0),
        separated_pair(
            identifier,
            tuple((space0, char('='), space0)),
            alt((
                map(literal, RuleItem::Text),
                map(name, |n| match n {
                    Name::Rule(id) => RuleItem::NonTerminalTransition(id.to_owned()),
                    Name::Regex(id) => RuleItem::RegexTransition(id.to_owned()),
                }),
            )),
        ),
        pair(space0, char(')')),
    )(input)?;

    let var = var.to_owned();
    let item = match source {
        RuleItem::Text(text) => RuleItem::AssignFromText { var, text },
        RuleItem::NonTerminalTransition(rule) => RuleItem::AssignFromNonTerminal { var, rule },
        RuleItem::RegexTransition(regex) => RuleItem::AssignFromRegex { var, regex },
        _ => return Err(failure(input, ErrorKind::Alt)),
    };
    Ok((rem, item))
}

/// A single rule item.
pub fn item(input: &str) -> IResult<&str, RuleItem> {
    alt((
        assignment,
        map(preceded(char('$'), identifier), |id| {
            RuleItem::ActionCall(id.to_owned())
        }),
        map(literal, RuleItem::Text),
        map(name, |n| match n {
            Name::Rule(id) => RuleItem::NonTerminalTransition(id.to_owned()),
            Name::Regex(id) => RuleItem::RegexTransition(id.to_owned()),
        }),
    ))(input)
}

/// `name [inherited] : items`
pub fn rule_decl(input: &str) -> IResult<&str, RuleDecl> {
    let (rem, (name, inherited, _, items)) = all_consuming(tuple((
        preceded(space0, rule_name),
        preceded(space0, opt(variables)),
        pair(space0, char(':')),
        terminated(many0(preceded(space0, item)), space0),
    )))(input)?;
    Ok((
        rem,
        RuleDecl {
            name: name.to_owned(),
            inherited: inherited.unwrap_or_default(),
            items,
        },
    ))
}

/// `NAME : 'pattern'`
pub fn regex_decl(input: &str) -> IResult<&str, (String, String)> {
    let (rem, (name, pattern)) = all_consuming(delimited(
        space0,
        separated_pair(regex_name, tuple((space0, char(':'), space0)), pattern),
        space0,
    ))(input)?;
    Ok((rem, (name.to_owned(), pattern)))
}

/// `$name[exported] {`, returning the text that follows the brace.
pub fn action_header(input: &str) -> IResult<&str, (String, Vec<Variable>)> {
    let (rem, (name, exported)) = terminated(
        pair(
            preceded(pair(space0, char('$')), identifier),
            preceded(space0, variables),
        ),
        pair(space0, char('{')),
    )(input)?;
    Ok((rem, (name.to_owned(), exported)))
}

/// A line holding only the start non-terminal.
pub fn start_decl(input: &str) -> IResult<&str, &str> {
    all_consuming(delimited(space0, rule_name, space0))(input)
}

fn syntax_error(line: usize, err: nom::Err<nom::error::Error<&str>>) -> Error {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let near = e.input.trim();
            if near.is_empty() {
                Error::syntax(line, format!("unexpected end of line ({:?})", e.code))
            } else {
                Error::syntax(line, format!("unexpected input '{}' ({:?})", near, e.code))
            }
        }
        nom::Err::Incomplete(_) => Error::syntax(line, "incomplete input"),
    }
}

/// Reads a whole description. The result is not resolved yet.
pub fn description(input: &str) -> Result<Grammar> {
    let mut grammar = Grammar::default();
    let mut start = None;
    let mut lines = input.lines().enumerate().map(|(i, line)| (i + 1, line));

    while let Some((no, line)) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('$') {
            let (rest, (name, exported)) = action_header(line).map_err(|e| syntax_error(no, e))?;
            if grammar.action(&name).is_some() {
                return Err(Error::syntax(no, format!("duplicated action name ({})", name)));
            }
            let code = action_body(no, rest, &mut lines)?;
            grammar.add_action(Action {
                name,
                exported,
                code,
            })?;
        } else if !trimmed.contains(':') {
            let (_, name) = start_decl(line).map_err(|e| syntax_error(no, e))?;
            start = Some(name.to_owned());
            if let Some((no, extra)) = lines.find(|(_, l)| !l.trim().is_empty()) {
                return Err(Error::syntax(
                    no,
                    format!("unexpected content after start symbol: '{}'", extra.trim()),
                ));
            }
            break;
        } else if trimmed.starts_with(|c: char| c.is_ascii_lowercase()) {
            let (_, decl) = rule_decl(line).map_err(|e| syntax_error(no, e))?;
            grammar.add_rule(decl.into_rule()?)?;
        } else if trimmed.starts_with(|c: char| c.is_ascii_uppercase()) {
            let (_, (name, pattern)) = regex_decl(line).map_err(|e| syntax_error(no, e))?;
            grammar.add_regex(&name, &pattern);
        } else {
            return Err(Error::syntax(
                no,
                format!("unexpected first character in '{}'", trimmed),
            ));
        }
    }

    match start {
        Some(start) => {
            grammar.set_start(&start);
            Ok(grammar)
        }
        None => Err(Error::syntax(
            input.lines().count(),
            "missing start non-terminal",
        )),
    }
}

/// Collects action code up to the brace closing the header's `{`.
fn action_body<'a>(
    header_line: usize,
    first: &'a str,
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> Result<String> {
    let mut code = String::new();
    let mut balance = 1usize;
    let mut current = Some((header_line, first));

    while let Some((no, text)) = current {
        for (idx, c) in text.char_indices() {
            match c {
                '{' => balance += 1,
                '}' => balance -= 1,
                _ => {}
            }
            if balance == 0 {
                let trailing = text[idx + 1..].trim();
                if !trailing.is_empty() {
                    return Err(Error::syntax(
                        no,
                        format!("unexpected content after action: '{}'", trailing),
                    ));
                }
                return Ok(code.trim().to_owned());
            }
            code.push(c);
        }
        code.push('\n');
        current = lines.next();
    }

    Err(Error::syntax(header_line, "unbalanced braces in action"))
}

impl RuleDecl {
    pub fn into_rule(self) -> Result<Rule> {
        let mut rule = Rule::new(&self.name);
        for var in &self.inherited {
            rule.add_inherited_var(&var.ty, &var.name)?;
        }
        for item in self.items {
            rule.push(item)?;
        }
        Ok(rule)
    }
}
