// Facet-specification parser

use super::lexer::{identifier, string_literal, ws};
use crate::facet::{FacetPolicy, FacetSpec};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::map_opt;
use nom::multi::separated_list0;
use nom::IResult;

/// Parse a facet grid
/// Format: facet_grid(rows: drv, cols: cyl, scales: "free_x")
pub fn parse_facet_grid(input: &str) -> IResult<&str, FacetSpec> {
    let (input, _) = ws(tag("facet_grid"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, args) = separated_list0(ws(char(',')), facet_arg)(input)?;
    let (input, _) = ws(char(')'))(input)?;

    let mut facet = FacetSpec::grid();
    for arg in args {
        match arg {
            FacetArg::Rows(var) => facet.rows = Some(var),
            FacetArg::Cols(var) => facet.cols = Some(var),
            FacetArg::Policy(policy) => facet.policy = policy,
        }
    }
    Ok((input, facet))
}

enum FacetArg {
    Rows(String),
    Cols(String),
    Policy(FacetPolicy),
}

fn facet_arg(input: &str) -> IResult<&str, FacetArg> {
    let (input, key) = ws(identifier)(input)?;
    let (input, _) = ws(char(':'))(input)?;
    match key.as_str() {
        "rows" => {
            let (input, var) = ws(identifier)(input)?;
            Ok((input, FacetArg::Rows(var)))
        }
        "cols" => {
            let (input, var) = ws(identifier)(input)?;
            Ok((input, FacetArg::Cols(var)))
        }
        "scales" => map_opt(ws(alt((string_literal, identifier))), |name| {
            FacetPolicy::parse(&name).map(FacetArg::Policy)
        })(input),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_facet_grid_both_axes() {
        let (_, facet) = parse_facet_grid("facet_grid(rows: drv, cols: cyl)").unwrap();
        assert_eq!(facet.rows.as_deref(), Some("drv"));
        assert_eq!(facet.cols.as_deref(), Some("cyl"));
        assert_eq!(facet.policy, FacetPolicy::Fixed);
    }

    #[test]
    fn test_parse_facet_grid_free_scales() {
        let (_, facet) = parse_facet_grid("facet_grid(rows: Species, scales: \"free_y\")").unwrap();
        assert_eq!(facet.policy, FacetPolicy::FreeY);
        assert!(facet.cols.is_none());
    }

    #[test]
    fn test_parse_facet_grid_bad_policy() {
        assert!(parse_facet_grid("facet_grid(rows: a, scales: \"loose\")").is_err());
    }
}
