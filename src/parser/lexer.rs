// Shared lexing combinators for the plot-expression parser

use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::map;
use nom::number::complete::double;
use nom::sequence::delimited;
use nom::IResult;

/// Wrap a parser so it tolerates surrounding whitespace.
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// An identifier: letters, digits, underscores, and dots (so variable
/// names like `Petal.Width` lex as one token).
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.'),
        |s: &str| s.to_string(),
    )(input)
}

/// A floating-point literal.
pub fn number_literal(input: &str) -> IResult<&str, f64> {
    double(input)
}

/// A double-quoted string; no escape sequences.
pub fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        |s: &str| s.to_string(),
    )(input)
}
