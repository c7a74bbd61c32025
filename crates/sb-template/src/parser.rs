// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small recursive-descent expression parser built from `nom`
//! combinators. Grammar (loosest to tightest binding):
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr (("or"|"||") and_expr)*
//! and_expr   := not_expr (("and"|"&&") not_expr)*
//! not_expr   := ("not"|"!")? comparison
//! comparison := in_expr (("=="|"!="|"<="|">="|"<"|">") in_expr)?
//! in_expr    := filtered ("in" filtered)?
//! filtered   := primary ("|" ident (":" literal)?)*
//! primary    := literal | path | "(" expr ")"
//! ```

use crate::ast::{BinaryOp, Expr, Segment};
use crate::error::TemplateError;
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag};
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace0};
use nom::combinator::{cut, map, opt, recognize, value as nom_value};
use nom::multi::{many0, many0_count};
use nom::number::complete::double;
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;
use sb_core::Value;

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn path(input: &str) -> IResult<&str, Expr> {
    map(
        recognize(pair(ident, many0_count(pair(char('.'), ident)))),
        |full: &str| Expr::Path(full.split('.').map(str::to_string).collect()),
    )(input)
}

fn string_literal(input: &str) -> IResult<&str, Expr> {
    map(
        delimited(char('"'), opt(is_not("\"")), char('"')),
        |s: Option<&str>| Expr::Literal(Value::String(s.unwrap_or("").to_string())),
    )(input)
}

fn number_literal(input: &str) -> IResult<&str, Expr> {
    map(
        alt((double, map(digit1, |d: &str| d.parse::<f64>().unwrap_or(0.0)))),
        |n| Expr::Literal(Value::Number(n)),
    )(input)
}

fn bool_literal(input: &str) -> IResult<&str, Expr> {
    alt((
        nom_value(Expr::Literal(Value::Bool(true)), tag("true")),
        nom_value(Expr::Literal(Value::Bool(false)), tag("false")),
        nom_value(Expr::Literal(Value::Null), tag("null")),
    ))(input)
}

fn literal(input: &str) -> IResult<&str, Expr> {
    alt((string_literal, bool_literal, number_literal))(input)
}

fn primary(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        delimited(char('('), cut(expr), char(')')),
        literal,
        path,
    )))(input)
}

fn filtered(input: &str) -> IResult<&str, Expr> {
    let (input, base) = primary(input)?;
    let (input, chain) = many0(preceded(
        ws(char('|')),
        pair(ws(ident), opt(preceded(ws(char(':')), literal))),
    ))(input)?;
    let result = chain.into_iter().fold(base, |acc, (name, arg)| Expr::Filter {
        base: Box::new(acc),
        name: name.to_string(),
        args: arg.into_iter().collect(),
    });
    Ok((input, result))
}

fn in_expr(input: &str) -> IResult<&str, Expr> {
    let (input, lhs) = filtered(input)?;
    let (input, rhs) = opt(preceded(ws(tag("in")), cut(filtered)))(input)?;
    Ok((
        input,
        match rhs {
            Some(rhs) => Expr::Binary(BinaryOp::In, Box::new(lhs), Box::new(rhs)),
            None => lhs,
        },
    ))
}

fn comparison_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        nom_value(BinaryOp::Eq, tag("==")),
        nom_value(BinaryOp::Ne, tag("!=")),
        nom_value(BinaryOp::Le, tag("<=")),
        nom_value(BinaryOp::Ge, tag(">=")),
        nom_value(BinaryOp::Lt, tag("<")),
        nom_value(BinaryOp::Gt, tag(">")),
    ))(input)
}

fn comparison(input: &str) -> IResult<&str, Expr> {
    let (input, lhs) = in_expr(input)?;
    let (input, rhs) = opt(tuple((ws(comparison_op), cut(in_expr))))(input)?;
    Ok((
        input,
        match rhs {
            Some((op, rhs)) => Expr::Binary(op, Box::new(lhs), Box::new(rhs)),
            None => lhs,
        },
    ))
}

fn not_expr(input: &str) -> IResult<&str, Expr> {
    let (input, negated) = opt(ws(alt((tag("not"), tag("!")))))(input)?;
    let (input, inner) = comparison(input)?;
    Ok((input, if negated.is_some() { Expr::Not(Box::new(inner)) } else { inner }))
}

fn and_expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = not_expr(input)?;
    let (input, rest) = many0(preceded(ws(alt((tag("and"), tag("&&")))), cut(not_expr)))(input)?;
    Ok((
        input,
        rest.into_iter()
            .fold(first, |acc, rhs| Expr::Binary(BinaryOp::And, Box::new(acc), Box::new(rhs))),
    ))
}

fn or_expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(ws(alt((tag("or"), tag("||")))), cut(and_expr)))(input)?;
    Ok((
        input,
        rest.into_iter()
            .fold(first, |acc, rhs| Expr::Binary(BinaryOp::Or, Box::new(acc), Box::new(rhs))),
    ))
}

pub fn expr(input: &str) -> IResult<&str, Expr> {
    or_expr(input)
}

/// Parse a full expression (condition or bare `{{ expr }}` body), requiring
/// the entire input (modulo surrounding whitespace) to be consumed.
pub fn parse_expr(input: &str) -> Result<Expr, TemplateError> {
    let (rest, parsed) =
        ws(expr)(input).map_err(|e| TemplateError::Syntax(format!("{e}")))?;
    if !rest.is_empty() {
        return Err(TemplateError::Syntax(format!("unexpected trailing input: {rest:?}")));
    }
    Ok(parsed)
}

/// Split a template string into literal text and `{{ ... }}` interpolation
/// segments.
pub fn parse_template(input: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        match rest.find("{{") {
            None => {
                segments.push(Segment::Text(rest.to_string()));
                break;
            }
            Some(start) => {
                if start > 0 {
                    segments.push(Segment::Text(rest[..start].to_string()));
                }
                let after_open = &rest[start + 2..];
                let end = after_open
                    .find("}}")
                    .ok_or_else(|| TemplateError::Syntax("unterminated '{{' interpolation".into()))?;
                let body = &after_open[..end];
                segments.push(Segment::Interp(parse_expr(body)?));
                rest = &after_open[end + 2..];
            }
        }
    }
    Ok(segments)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
