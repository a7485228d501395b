// Theme-override parser

use super::lexer::{identifier, number_literal, string_literal, ws};
use crate::theme::{ElementLine, ElementRect, ElementText, LegendPosition, Theme, ThemeElement};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{map, map_opt};
use nom::multi::separated_list0;
use nom::IResult;

/// Parse a theme override
/// Format: theme(axis_text: blank, plot_title: text(size: 16, face: "bold"),
///                panel_grid_major: line(color: "grey80"), legend_position: "none")
pub fn parse_theme(input: &str) -> IResult<&str, Theme> {
    let (input, _) = ws(tag("theme"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, entries) = separated_list0(ws(char(',')), theme_entry)(input)?;
    let (input, _) = ws(char(')'))(input)?;

    let mut theme = Theme::new();
    for entry in entries {
        match entry {
            ThemeEntry::Element(key, element) => {
                let slot = match key.as_str() {
                    "line" => &mut theme.line,
                    "rect" => &mut theme.rect,
                    "text" => &mut theme.text,
                    "plot_background" => &mut theme.plot_background,
                    "plot_title" => &mut theme.plot_title,
                    "panel_background" => &mut theme.panel_background,
                    "panel_grid_major" => &mut theme.panel_grid_major,
                    "panel_grid_minor" => &mut theme.panel_grid_minor,
                    "axis_text" => &mut theme.axis_text,
                    "axis_line" => &mut theme.axis_line,
                    "axis_ticks" => &mut theme.axis_ticks,
                    _ => continue,
                };
                *slot = element;
            }
            ThemeEntry::Legend(position) => theme.legend_position = position,
        }
    }
    Ok((input, theme))
}

enum ThemeEntry {
    Element(String, ThemeElement),
    Legend(LegendPosition),
}

fn theme_entry(input: &str) -> IResult<&str, ThemeEntry> {
    let (input, key) = ws(identifier)(input)?;
    let (input, _) = ws(char(':'))(input)?;
    if key == "legend_position" {
        return map_opt(ws(alt((string_literal, identifier))), |name| {
            LegendPosition::parse(&name).map(ThemeEntry::Legend)
        })(input);
    }

    // Reject unknown element names up front so typos fail the parse
    let known = matches!(
        key.as_str(),
        "line"
            | "rect"
            | "text"
            | "plot_background"
            | "plot_title"
            | "panel_background"
            | "panel_grid_major"
            | "panel_grid_minor"
            | "axis_text"
            | "axis_line"
            | "axis_ticks"
    );
    if !known {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }

    let (input, element) = theme_element(input)?;
    Ok((input, ThemeEntry::Element(key, element)))
}

fn theme_element(input: &str) -> IResult<&str, ThemeElement> {
    alt((
        map(ws(tag("blank")), |_| ThemeElement::Blank),
        line_element,
        rect_element,
        text_element,
    ))(input)
}

/// Format: line(color: "grey80", width: 0.5, linetype: "dashed")
fn line_element(input: &str) -> IResult<&str, ThemeElement> {
    let (input, _) = ws(tag("line"))(input)?;
    let (input, fields) = element_fields(input)?;

    let mut element = ElementLine::default();
    for (key, value) in fields {
        match (key.as_str(), value) {
            ("color" | "colour", FieldValue::Str(s)) => element.color = Some(s),
            ("width", FieldValue::Number(n)) => element.width = Some(n),
            ("linetype", FieldValue::Str(s)) => element.linetype = Some(s),
            _ => {}
        }
    }
    Ok((input, ThemeElement::Line(element)))
}

/// Format: rect(fill: "white", color: "black", width: 1)
fn rect_element(input: &str) -> IResult<&str, ThemeElement> {
    let (input, _) = ws(tag("rect"))(input)?;
    let (input, fields) = element_fields(input)?;

    let mut element = ElementRect::default();
    for (key, value) in fields {
        match (key.as_str(), value) {
            ("fill", FieldValue::Str(s)) => element.fill = Some(s),
            ("color" | "colour", FieldValue::Str(s)) => element.color = Some(s),
            ("width", FieldValue::Number(n)) => element.width = Some(n),
            _ => {}
        }
    }
    Ok((input, ThemeElement::Rect(element)))
}

/// Format: text(size: 14, face: "bold", color: "grey20", family: "serif")
fn text_element(input: &str) -> IResult<&str, ThemeElement> {
    let (input, _) = ws(tag("text"))(input)?;
    let (input, fields) = element_fields(input)?;

    let mut element = ElementText::default();
    for (key, value) in fields {
        match (key.as_str(), value) {
            ("family", FieldValue::Str(s)) => element.family = Some(s),
            ("color" | "colour", FieldValue::Str(s)) => element.color = Some(s),
            ("size", FieldValue::Number(n)) => element.size = Some(n),
            ("face", FieldValue::Str(s)) => element.face = Some(s),
            _ => {}
        }
    }
    Ok((input, ThemeElement::Text(element)))
}

enum FieldValue {
    Str(String),
    Number(f64),
}

fn element_fields(input: &str) -> IResult<&str, Vec<(String, FieldValue)>> {
    let (input, _) = ws(char('('))(input)?;
    let (input, fields) = separated_list0(ws(char(',')), element_field)(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, fields))
}

fn element_field(input: &str) -> IResult<&str, (String, FieldValue)> {
    let (input, key) = ws(identifier)(input)?;
    let (input, _) = ws(char(':'))(input)?;
    let (input, value) = ws(alt((
        map(string_literal, FieldValue::Str),
        map(number_literal, FieldValue::Number),
    )))(input)?;
    Ok((input, (key, value)))
}
