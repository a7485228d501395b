// Aesthetic-mapping parser

use super::lexer::{identifier, ws};
use crate::mapping::{Channel, Mapping};
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::map_opt;
use nom::multi::separated_list0;
use nom::sequence::separated_pair;
use nom::IResult;

/// Parse an aesthetic mapping
/// Format: aes(x: conc, y: uptake, colour: Plant, ...)
pub fn parse_aes(input: &str) -> IResult<&str, Mapping> {
    let (input, _) = ws(tag("aes"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, entries) = separated_list0(ws(char(',')), aes_entry)(input)?;
    let (input, _) = ws(char(')'))(input)?;

    let mut mapping = Mapping::new();
    for (channel, variable) in entries {
        mapping = mapping.set(channel, variable);
    }
    Ok((input, mapping))
}

/// One `channel: variable` entry; unknown channel names fail the parse.
fn aes_entry(input: &str) -> IResult<&str, (Channel, String)> {
    map_opt(
        separated_pair(ws(identifier), ws(char(':')), ws(identifier)),
        |(key, variable)| Channel::parse(&key).map(|channel| (channel, variable)),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aes() {
        let (_, mapping) = parse_aes("aes(x: conc, y: uptake)").unwrap();
        assert_eq!(mapping.get(Channel::X), Some("conc"));
        assert_eq!(mapping.get(Channel::Y), Some("uptake"));
    }

    #[test]
    fn test_parse_aes_colour_spellings() {
        let (_, mapping) = parse_aes("aes(x: a, color: Plant)").unwrap();
        assert_eq!(mapping.get(Channel::Colour), Some("Plant"));
    }

    #[test]
    fn test_parse_aes_dotted_variable() {
        let (_, mapping) = parse_aes("aes(x: Petal.Width, fill: Species)").unwrap();
        assert_eq!(mapping.get(Channel::X), Some("Petal.Width"));
        assert_eq!(mapping.get(Channel::Fill), Some("Species"));
    }

    #[test]
    fn test_parse_aes_empty() {
        let (_, mapping) = parse_aes("aes()").unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_parse_aes_unknown_channel() {
        assert!(parse_aes("aes(theta: a)").is_err());
    }

    #[test]
    fn test_parse_aes_unclosed() {
        assert!(parse_aes("aes(x: a").is_err());
    }
}
