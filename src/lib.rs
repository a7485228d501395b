//! gramplot: an illustrative grammar-of-graphics engine.
//!
//! Plot specifications accumulate through a pure composition operator
//! (`ggplot(data, aes(...)) + geom_point() + ...`), defaults resolve at
//! render time, and a staged pipeline compiles the result into a scene
//! graph executed by a pluggable drawing backend.

pub mod backend;
pub mod compile;
pub mod coord;
pub mod data;
pub mod error;
pub mod facet;
pub mod ir;
pub mod layer;
pub mod mapping;
pub mod palette;
pub mod parser;
pub mod plot;
pub mod render;
pub mod resolve;
pub mod scale;
pub mod theme;
pub mod tile;
pub mod transform;

use serde::Deserialize;

pub use backend::{Backend, PngBackend, RenderedImage, SvgBackend};
pub use coord::CoordKind;
pub use data::Dataset;
pub use error::{LayerFailure, PlotError, Warning};
pub use facet::{FacetPolicy, FacetSpec};
pub use layer::{
    geom_bar, geom_boxplot, geom_contour, geom_histogram, geom_line, geom_point, geom_smooth,
    geom_tile, GeomKind, Layer, PositionKind, StatKind,
};
pub use mapping::{aes, Channel, Mapping};
pub use plot::{ggplot, labs, Component, Composed, Labels, PlotSpec};
pub use render::{render, render_with, RenderReport};
pub use scale::{ScaleSpec, ScaleTransform};
pub use theme::Theme;

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

/// Output options for a render call.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: OutputFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_deserialize() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"width": 400, "type": "svg"}"#).unwrap();
        assert_eq!(options.width, 400);
        assert_eq!(options.height, 600);
        assert_eq!(options.format, OutputFormat::Svg);
    }

    #[test]
    fn test_render_options_default() {
        let options = RenderOptions::default();
        assert_eq!((options.width, options.height), (800, 600));
        assert_eq!(options.format, OutputFormat::Png);
    }
}
