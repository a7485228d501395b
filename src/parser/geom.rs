// Geometry and statistic layer parsers

use super::aesthetics::parse_aes;
use super::lexer::{identifier, number_literal, string_literal, ws};
use crate::layer::{GeomKind, Layer, PositionKind, StatKind};
use crate::mapping::Mapping;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{map, map_opt};
use nom::multi::separated_list0;
use nom::sequence::preceded;
use nom::IResult;
use serde_json::Value;

/// One argument inside a geom_* or stat_* call.
#[derive(Debug)]
enum LayerArg {
    Aes(Mapping),
    Stat(StatKind),
    Geom(GeomKind),
    Position(PositionKind),
    Param(String, Value),
}

/// Parse a layer-producing call
/// Format: geom_point(), geom_histogram(binwidth: 0.2, fill: "grey"),
/// stat_bin(bins: 10), geom_point(aes(colour: Species), size: 2)
pub fn parse_layer(input: &str) -> IResult<&str, Layer> {
    alt((parse_geom_call, parse_stat_call))(input)
}

fn parse_geom_call(input: &str) -> IResult<&str, Layer> {
    let (input, geom) = map_opt(preceded(ws(tag("geom_")), identifier), |name| {
        GeomKind::parse(&name)
    })(input)?;
    let (input, args) = call_args(input)?;
    Ok((input, apply_args(Layer::new(geom), args)))
}

fn parse_stat_call(input: &str) -> IResult<&str, Layer> {
    let (input, stat) = map_opt(preceded(ws(tag("stat_")), identifier), |name| {
        StatKind::parse(&name)
    })(input)?;
    let (input, args) = call_args(input)?;
    Ok((input, apply_args(Layer::from_stat(stat), args)))
}

fn call_args(input: &str) -> IResult<&str, Vec<LayerArg>> {
    let (input, _) = ws(char('('))(input)?;
    let (input, args) = separated_list0(ws(char(',')), layer_arg)(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, args))
}

fn layer_arg(input: &str) -> IResult<&str, LayerArg> {
    alt((
        map(parse_aes, LayerArg::Aes),
        stat_arg,
        geom_arg,
        position_arg,
        param_arg,
    ))(input)
}

fn stat_arg(input: &str) -> IResult<&str, LayerArg> {
    let (input, _) = ws(tag("stat"))(input)?;
    let (input, _) = ws(char(':'))(input)?;
    map_opt(ws(alt((string_literal, identifier))), |name| {
        StatKind::parse(&name).map(LayerArg::Stat)
    })(input)
}

fn geom_arg(input: &str) -> IResult<&str, LayerArg> {
    let (input, _) = ws(tag("geom"))(input)?;
    let (input, _) = ws(char(':'))(input)?;
    map_opt(ws(alt((string_literal, identifier))), |name| {
        GeomKind::parse(&name).map(LayerArg::Geom)
    })(input)
}

fn position_arg(input: &str) -> IResult<&str, LayerArg> {
    let (input, _) = ws(tag("position"))(input)?;
    let (input, _) = ws(char(':'))(input)?;
    map_opt(ws(alt((string_literal, identifier))), |name| {
        PositionKind::parse(&name).map(LayerArg::Position)
    })(input)
}

/// Free parameters land in the layer's parameter bag. Reserved keys
/// never fall through here, so a bad stat/geom/position value fails the
/// parse instead of hiding in the bag.
fn param_arg(input: &str) -> IResult<&str, LayerArg> {
    let (input, key) = map_opt(ws(identifier), |key| {
        (!matches!(key.as_str(), "stat" | "geom" | "position")).then_some(key)
    })(input)?;
    let (input, _) = ws(char(':'))(input)?;
    let (input, value) = ws(alt((
        map(string_literal, Value::from),
        map(number_literal, number_value),
        map(identifier, Value::from),
    )))(input)?;
    Ok((input, LayerArg::Param(key, value)))
}

/// Integral literals store as integers so counts (bins, levels) survive
/// the JSON value representation.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

fn apply_args(mut layer: Layer, args: Vec<LayerArg>) -> Layer {
    for arg in args {
        match arg {
            LayerArg::Aes(mapping) => layer.mapping = mapping,
            LayerArg::Stat(stat) => layer.stat = Some(stat),
            LayerArg::Geom(geom) => layer.geom = geom,
            LayerArg::Position(position) => layer.position = Some(position),
            LayerArg::Param(key, value) => {
                layer.params.insert(key, value);
            }
        }
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Channel;

    #[test]
    fn test_parse_geom_point_empty() {
        let (_, layer) = parse_layer("geom_point()").unwrap();
        assert_eq!(layer.geom, GeomKind::Point);
        assert!(layer.stat.is_none());
    }

    #[test]
    fn test_parse_geom_histogram_params() {
        let (_, layer) = parse_layer("geom_histogram(binwidth: 0.2, fill: \"grey80\")").unwrap();
        assert_eq!(layer.geom, GeomKind::Histogram);
        assert_eq!(layer.param_f64("binwidth"), Some(0.2));
        assert_eq!(layer.param_str("fill"), Some("grey80"));
    }

    #[test]
    fn test_parse_geom_with_layer_aes() {
        let (_, layer) = parse_layer("geom_point(aes(colour: Species), size: 2)").unwrap();
        assert_eq!(layer.mapping.get(Channel::Colour), Some("Species"));
        assert_eq!(layer.param_f64("size"), Some(2.0));
    }

    #[test]
    fn test_parse_geom_stat_and_position() {
        let (_, layer) = parse_layer("geom_bar(stat: identity, position: \"dodge\")").unwrap();
        assert_eq!(layer.stat, Some(StatKind::Identity));
        assert_eq!(layer.position, Some(PositionKind::Dodge));
    }

    #[test]
    fn test_parse_stat_call_gets_default_geom() {
        let (_, layer) = parse_layer("stat_bin(bins: 10)").unwrap();
        assert_eq!(layer.geom, GeomKind::Histogram);
        assert_eq!(layer.stat, Some(StatKind::Bin));
        assert_eq!(layer.param_usize("bins"), Some(10));
    }

    #[test]
    fn test_parse_unknown_geom_fails() {
        assert!(parse_layer("geom_hexbin()").is_err());
    }

    #[test]
    fn test_parse_unknown_position_fails() {
        assert!(parse_layer("geom_bar(position: sideways)").is_err());
    }
}
