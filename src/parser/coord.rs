// Coordinate-system parsers

use super::lexer::ws;
use crate::coord::CoordKind;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::map;
use nom::IResult;

/// Parse a coordinate-system command
/// Format: coord_flip() / coord_polar() / coord_cartesian()
pub fn parse_coord(input: &str) -> IResult<&str, CoordKind> {
    let (input, coord) = alt((
        map(ws(tag("coord_flip")), |_| CoordKind::Flip),
        map(ws(tag("coord_polar")), |_| CoordKind::Polar),
        map(ws(tag("coord_cartesian")), |_| CoordKind::Cartesian),
    ))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, coord))
}
