// Full plot-expression parser
//
// A textual invocation folds through the same composition operator as
// the programmatic API, so both construction styles cannot drift apart.

use super::aesthetics::parse_aes;
use super::coord::parse_coord;
use super::facet::parse_facet_grid;
use super::geom::parse_layer;
use super::labels::parse_labs;
use super::lexer::{identifier, ws};
use super::scale::parse_scale_command;
use super::theme::parse_theme;
use crate::data::Dataset;
use crate::error::PlotError;
use crate::mapping::Mapping;
use crate::plot::{Component, Composed, PlotSpec};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{eof, map, opt};
use nom::multi::many0;
use nom::sequence::{preceded, terminated};
use nom::IResult;

fn parse_component(input: &str) -> IResult<&str, Component> {
    alt((
        map(parse_layer, Component::Layer),
        map(parse_scale_command, Component::Scale),
        map(parse_facet_grid, Component::Facet),
        map(parse_coord, Component::Coord),
        map(parse_theme, Component::Theme),
        map(parse_labs, Component::Labels),
    ))(input)
}

/// Parse a complete plot expression into the default mapping and the
/// component sequence
/// Format: ggplot(df, aes(x: conc, y: uptake)) + geom_point() + ...
pub fn parse_components(input: &str) -> IResult<&str, (Mapping, Vec<Component>)> {
    let (input, _) = ws(tag("ggplot"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    // An optional leading dataset name is accepted and ignored; data is
    // bound programmatically
    let (input, _) = opt(terminated(ws(identifier), ws(char(','))))(input)?;
    let (input, mapping) = opt(parse_aes)(input)?;
    // A bare dataset name with no mapping is also accepted
    let (input, _) = if mapping.is_none() {
        opt(ws(identifier))(input)?
    } else {
        (input, None)
    };
    let (input, _) = ws(char(')'))(input)?;

    let (input, components) = many0(preceded(ws(char('+')), parse_component))(input)?;
    let (input, _) = ws(eof)(input)?;

    Ok((input, (mapping.unwrap_or_default(), components)))
}

/// Parse a plot expression and compose it against a dataset, carrying
/// any composition warnings in the result.
pub fn parse_plot(input: &str, data: Dataset) -> Result<Composed, PlotError> {
    let (_, (mapping, components)) =
        parse_components(input).map_err(|e| PlotError::Parse(format!("{e:?}")))?;

    let mut composed = Composed::from(PlotSpec::new(data, mapping));
    for component in components {
        composed = composed.then(component);
    }
    Ok(composed)
}
