// Scale-command parsers

use super::lexer::{identifier, number_literal, string_literal, ws};
use crate::mapping::Channel;
use crate::palette::{parse_color, GRADIENT_HIGH, GRADIENT_LOW};
use crate::scale::ScaleSpec;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::map;
use nom::multi::separated_list0;
use nom::IResult;

pub fn parse_scale_command(input: &str) -> IResult<&str, ScaleSpec> {
    alt((
        parse_scale_log10,
        parse_scale_reverse,
        parse_scale_continuous,
        parse_scale_discrete,
        parse_scale_gradient,
        parse_lim,
    ))(input)
}

fn empty_parens(input: &str) -> IResult<&str, ()> {
    let (input, _) = ws(char('('))(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, ()))
}

fn parse_scale_log10(input: &str) -> IResult<&str, ScaleSpec> {
    let (input, channel) = alt((
        map(ws(tag("scale_x_log10")), |_| Channel::X),
        map(ws(tag("scale_y_log10")), |_| Channel::Y),
    ))(input)?;
    let (input, _) = empty_parens(input)?;
    Ok((input, ScaleSpec::log10(channel)))
}

fn parse_scale_reverse(input: &str) -> IResult<&str, ScaleSpec> {
    let (input, channel) = alt((
        map(ws(tag("scale_x_reverse")), |_| Channel::X),
        map(ws(tag("scale_y_reverse")), |_| Channel::Y),
    ))(input)?;
    let (input, _) = empty_parens(input)?;
    Ok((input, ScaleSpec::reverse(channel)))
}

/// Format: scale_x_continuous(name: "Sepal length", limits: (4, 8))
fn parse_scale_continuous(input: &str) -> IResult<&str, ScaleSpec> {
    let (input, channel) = alt((
        map(ws(tag("scale_x_continuous")), |_| Channel::X),
        map(ws(tag("scale_y_continuous")), |_| Channel::Y),
    ))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, args) = separated_list0(ws(char(',')), scale_arg)(input)?;
    let (input, _) = ws(char(')'))(input)?;

    let mut scale = ScaleSpec::continuous(channel);
    for arg in args {
        match arg {
            ScaleArg::Name(name) => scale.name = Some(name),
            ScaleArg::Limits(lo, hi) => scale.limits = Some((lo, hi)),
            _ => {}
        }
    }
    Ok((input, scale))
}

/// Format: scale_colour_discrete(name: "Plant type")
fn parse_scale_discrete(input: &str) -> IResult<&str, ScaleSpec> {
    let (input, channel) = alt((
        map(ws(tag("scale_colour_discrete")), |_| Channel::Colour),
        map(ws(tag("scale_color_discrete")), |_| Channel::Colour),
        map(ws(tag("scale_fill_discrete")), |_| Channel::Fill),
    ))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, args) = separated_list0(ws(char(',')), scale_arg)(input)?;
    let (input, _) = ws(char(')'))(input)?;

    let mut scale = ScaleSpec::discrete(channel);
    for arg in args {
        if let ScaleArg::Name(name) = arg {
            scale.name = Some(name);
        }
    }
    Ok((input, scale))
}

/// Format: scale_fill_gradient(low: "black", high: "white")
fn parse_scale_gradient(input: &str) -> IResult<&str, ScaleSpec> {
    let (input, channel) = alt((
        map(ws(tag("scale_fill_gradient")), |_| Channel::Fill),
        map(ws(tag("scale_colour_gradient")), |_| Channel::Colour),
        map(ws(tag("scale_color_gradient")), |_| Channel::Colour),
    ))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, args) = separated_list0(ws(char(',')), scale_arg)(input)?;
    let (input, _) = ws(char(')'))(input)?;

    let mut low = GRADIENT_LOW;
    let mut high = GRADIENT_HIGH;
    let mut name = None;
    for arg in args {
        match arg {
            ScaleArg::Low(color) => low = color,
            ScaleArg::High(color) => high = color,
            ScaleArg::Name(n) => name = Some(n),
            ScaleArg::Limits(..) => {}
        }
    }
    let mut scale = ScaleSpec::gradient(channel, low, high);
    scale.name = name;
    Ok((input, scale))
}

/// Format: xlim(0, 100) / ylim(-1, 1)
fn parse_lim(input: &str) -> IResult<&str, ScaleSpec> {
    let (input, channel) = alt((
        map(ws(tag("xlim")), |_| Channel::X),
        map(ws(tag("ylim")), |_| Channel::Y),
    ))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, min) = ws(number_literal)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, max) = ws(number_literal)(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, ScaleSpec::continuous(channel).limits(min, max)))
}

enum ScaleArg {
    Name(String),
    Limits(f64, f64),
    Low(crate::palette::Rgb),
    High(crate::palette::Rgb),
}

fn scale_arg(input: &str) -> IResult<&str, ScaleArg> {
    let (input, key) = ws(identifier)(input)?;
    let (input, _) = ws(char(':'))(input)?;
    match key.as_str() {
        "name" => map(ws(string_literal), ScaleArg::Name)(input),
        "limits" => {
            let (input, _) = ws(char('('))(input)?;
            let (input, lo) = ws(number_literal)(input)?;
            let (input, _) = ws(char(','))(input)?;
            let (input, hi) = ws(number_literal)(input)?;
            let (input, _) = ws(char(')'))(input)?;
            Ok((input, ScaleArg::Limits(lo, hi)))
        }
        "low" => nom::combinator::map_opt(ws(string_literal), |s| {
            parse_color(&s).map(ScaleArg::Low)
        })(input),
        "high" => nom::combinator::map_opt(ws(string_literal), |s| {
            parse_color(&s).map(ScaleArg::High)
        })(input),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        ))),
    }
}
