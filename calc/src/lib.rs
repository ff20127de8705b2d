//! An integer calculator whose parser is derived from `calc.grammar`.
//!
//! Supports `+ - * /`, unary minus and parentheses. Whitespace is not part
//! of the grammar.

use anyhow::{Context, Result};
use derive::Parser;

#[derive(Parser)]
#[grammar_file = "calc.grammar"]
pub struct CalcParser;

/// Evaluates an expression such as `(1+2)*-3`. Division by zero yields 0.
pub fn eval(input: &str) -> Result<i32> {
    let node = CalcParser::parse(input).with_context(|| format!("failed to parse '{}'", input))?;
    Ok(node.value)
}
