//! Error and warning taxonomy.
//!
//! Configuration problems are hard errors surfaced at render time and
//! attributable to the layer that caused them. Warnings are plain values
//! carried alongside results (composition and rendering both return them)
//! so callers can observe overrides and fallbacks without scraping stderr.

use crate::layer::{GeomKind, StatKind};
use crate::mapping::Channel;
use std::fmt;
use thiserror::Error;

/// Errors raised while composing or rendering a plot specification.
#[derive(Debug, Error)]
pub enum PlotError {
    /// A geometry/statistic pair needs a channel that was never mapped,
    /// at either layer or plot level.
    #[error("geom_{} (stat_{}) requires the `{channel}` channel, which is not mapped at layer or plot level", .geom.name(), .stat.name())]
    MissingChannel {
        channel: Channel,
        geom: GeomKind,
        stat: StatKind,
    },

    /// A mapping references a variable that is not a column of the
    /// dataset it resolves against.
    #[error("variable `{variable}` (mapped to `{channel}`) is not a column of the dataset")]
    UnknownVariable { channel: Channel, variable: String },

    /// A value could not be parsed as a number where the statistic or
    /// geometry needs one.
    #[error("failed to parse `{value}` in column `{column}` as a number")]
    NonNumeric { column: String, value: String },

    /// The specification has no geometry layers to render.
    #[error("plot specification has no geometry layers")]
    EmptyPlot,

    /// Every layer of the plot failed to resolve; nothing to render.
    #[error("no layer could be rendered: {0}")]
    AllLayersFailed(Box<PlotError>),

    /// The plot expression could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Dataset construction or ingestion failed.
    #[error("dataset error: {0}")]
    Data(String),

    /// The drawing backend reported a failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Non-fatal signals produced by composition and default resolution.
///
/// Warnings never halt anything; they are returned so that overrides and
/// heuristic fallbacks stay observable.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A scale component replaced an existing scale on the same channel.
    ScaleOverride { channel: Channel },
    /// A facet, coordinate-system, or theme component replaced a field
    /// that was already explicitly set.
    SingletonOverride { field: SingletonField },
    /// A statistic parameter with no universal default was filled with a
    /// heuristic value.
    DefaultFallback {
        stat: StatKind,
        param: String,
        fallback: String,
    },
}

/// Singleton plot-specification fields subject to replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingletonField {
    Coord,
    Facet,
    Theme,
}

impl fmt::Display for SingletonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SingletonField::Coord => "coordinate system",
            SingletonField::Facet => "facet specification",
            SingletonField::Theme => "theme",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ScaleOverride { channel } => {
                write!(f, "scale for `{channel}` replaced a previously set scale")
            }
            Warning::SingletonOverride { field } => {
                write!(f, "{field} replaced a previously set {field}")
            }
            Warning::DefaultFallback {
                stat,
                param,
                fallback,
            } => {
                write!(
                    f,
                    "stat_{} has no `{param}`; falling back to {fallback}",
                    stat.name()
                )
            }
        }
    }
}

/// A layer that failed to resolve or transform, attributed by its index
/// in the plot's layer sequence. Sibling layers keep rendering.
#[derive(Debug)]
pub struct LayerFailure {
    pub layer: usize,
    pub error: PlotError,
}

impl fmt::Display for LayerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer {}: {}", self.layer, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_channel_names_channel_and_geom() {
        let err = PlotError::MissingChannel {
            channel: Channel::Z,
            geom: GeomKind::Contour,
            stat: StatKind::Contour,
        };
        let msg = err.to_string();
        assert!(msg.contains("`z`"), "{msg}");
        assert!(msg.contains("geom_contour"), "{msg}");
        assert!(msg.contains("stat_contour"), "{msg}");
    }

    #[test]
    fn test_warning_display() {
        let w = Warning::DefaultFallback {
            stat: StatKind::Bin,
            param: "binwidth".to_string(),
            fallback: "30 bins".to_string(),
        };
        assert_eq!(
            w.to_string(),
            "stat_bin has no `binwidth`; falling back to 30 bins"
        );
    }

    #[test]
    fn test_layer_failure_attribution() {
        let failure = LayerFailure {
            layer: 2,
            error: PlotError::EmptyPlot,
        };
        assert!(failure.to_string().starts_with("layer 2:"));
    }
}
