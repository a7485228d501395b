// Label parser

use super::lexer::{identifier, string_literal, ws};
use crate::plot::Labels;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::multi::separated_list0;
use nom::sequence::separated_pair;
use nom::IResult;

/// Parse plot labels
/// Format: labs(title: "CO2 uptake", x: "Concentration", y: "Uptake")
pub fn parse_labs(input: &str) -> IResult<&str, Labels> {
    let (input, _) = ws(tag("labs"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, entries) = separated_list0(
        ws(char(',')),
        separated_pair(ws(identifier), ws(char(':')), ws(string_literal)),
    )(input)?;
    let (input, _) = ws(char(')'))(input)?;

    let mut labels = Labels::new();
    for (key, value) in entries {
        match key.as_str() {
            "title" => labels.title = Some(value),
            "x" => labels.x = Some(value),
            "y" => labels.y = Some(value),
            _ => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Tag,
                )))
            }
        }
    }
    Ok((input, labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labs_full() {
        let (_, labels) =
            parse_labs("labs(title: \"CO2 uptake\", x: \"Concentration\", y: \"Uptake\")").unwrap();
        assert_eq!(labels.title.as_deref(), Some("CO2 uptake"));
        assert_eq!(labels.x.as_deref(), Some("Concentration"));
        assert_eq!(labels.y.as_deref(), Some("Uptake"));
    }

    #[test]
    fn test_parse_labs_partial() {
        let (_, labels) = parse_labs("labs(title: \"Only a title\")").unwrap();
        assert!(labels.x.is_none());
    }

    #[test]
    fn test_parse_labs_unknown_key_fails() {
        assert!(parse_labs("labs(subtitle: \"nope\")").is_err());
    }
}
