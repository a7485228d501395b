//! Layers: geometry, statistic, and position-adjustment kinds plus the
//! capability tables that drive default resolution.

use crate::data::Dataset;
use crate::mapping::{Channel, Mapping};
use serde_json::Value;

/// Visual mark types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomKind {
    Point,
    Line,
    Bar,
    Histogram,
    Boxplot,
    Smooth,
    Tile,
    Contour,
}

impl GeomKind {
    pub fn name(&self) -> &'static str {
        match self {
            GeomKind::Point => "point",
            GeomKind::Line => "line",
            GeomKind::Bar => "bar",
            GeomKind::Histogram => "histogram",
            GeomKind::Boxplot => "boxplot",
            GeomKind::Smooth => "smooth",
            GeomKind::Tile => "tile",
            GeomKind::Contour => "contour",
        }
    }

    pub fn parse(name: &str) -> Option<GeomKind> {
        match name {
            "point" => Some(GeomKind::Point),
            "line" => Some(GeomKind::Line),
            "bar" => Some(GeomKind::Bar),
            "histogram" => Some(GeomKind::Histogram),
            "boxplot" => Some(GeomKind::Boxplot),
            "smooth" => Some(GeomKind::Smooth),
            "tile" => Some(GeomKind::Tile),
            "contour" => Some(GeomKind::Contour),
            _ => None,
        }
    }

    /// Default statistic when the layer does not name one.
    pub fn default_stat(&self) -> StatKind {
        match self {
            GeomKind::Point | GeomKind::Line | GeomKind::Tile => StatKind::Identity,
            GeomKind::Bar => StatKind::Count,
            GeomKind::Histogram => StatKind::Bin,
            GeomKind::Boxplot => StatKind::Boxplot,
            GeomKind::Smooth => StatKind::Smooth,
            GeomKind::Contour => StatKind::Contour,
        }
    }

    /// Default position adjustment when the layer does not name one.
    pub fn default_position(&self) -> PositionKind {
        match self {
            GeomKind::Bar | GeomKind::Histogram => PositionKind::Stack,
            GeomKind::Boxplot => PositionKind::Dodge,
            _ => PositionKind::Identity,
        }
    }

    /// Channels the geometry cannot draw without.
    pub fn required_channels(&self) -> &'static [Channel] {
        match self {
            GeomKind::Point | GeomKind::Line | GeomKind::Smooth | GeomKind::Boxplot => {
                &[Channel::X, Channel::Y]
            }
            GeomKind::Bar | GeomKind::Histogram => &[Channel::X],
            GeomKind::Tile => &[Channel::X, Channel::Y],
            GeomKind::Contour => &[Channel::X, Channel::Y, Channel::Z],
        }
    }

    /// Channels whose mapping implicitly establishes grouping for this
    /// geometry when no explicit `group` mapping exists, in precedence
    /// order.
    ///
    /// This is the rule table the resolver consults — grouping is never
    /// inferred anywhere else. For the line family a `colour = Plant`
    /// mapping splits connected segments per plant exactly like
    /// `group = Plant` would, while also encoding the colour; for the
    /// bar family a fill mapping splits the stacked segments. Tiles take
    /// a continuous fill and opt out entirely. Future geometries opt in
    /// or out by extending this table.
    pub fn implicit_group_channels(&self) -> &'static [Channel] {
        match self {
            GeomKind::Point => &[
                Channel::Colour,
                Channel::Fill,
                Channel::Shape,
                Channel::Size,
                Channel::Alpha,
            ],
            GeomKind::Line | GeomKind::Smooth => &[Channel::Colour, Channel::Fill],
            GeomKind::Bar | GeomKind::Histogram | GeomKind::Boxplot => {
                &[Channel::Fill, Channel::Colour]
            }
            GeomKind::Contour => &[Channel::Colour],
            GeomKind::Tile => &[],
        }
    }
}

/// Statistical transforms applied before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Identity,
    Count,
    Bin,
    Boxplot,
    Smooth,
    Contour,
}

impl StatKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatKind::Identity => "identity",
            StatKind::Count => "count",
            StatKind::Bin => "bin",
            StatKind::Boxplot => "boxplot",
            StatKind::Smooth => "smooth",
            StatKind::Contour => "contour",
        }
    }

    pub fn parse(name: &str) -> Option<StatKind> {
        match name {
            "identity" => Some(StatKind::Identity),
            "count" => Some(StatKind::Count),
            "bin" => Some(StatKind::Bin),
            "boxplot" => Some(StatKind::Boxplot),
            "smooth" => Some(StatKind::Smooth),
            "contour" => Some(StatKind::Contour),
            _ => None,
        }
    }

    /// Default geometry for a statistic given alone, the symmetric
    /// counterpart of [`GeomKind::default_stat`].
    pub fn default_geom(&self) -> GeomKind {
        match self {
            StatKind::Identity => GeomKind::Point,
            StatKind::Count => GeomKind::Bar,
            StatKind::Bin => GeomKind::Histogram,
            StatKind::Boxplot => GeomKind::Boxplot,
            StatKind::Smooth => GeomKind::Smooth,
            StatKind::Contour => GeomKind::Contour,
        }
    }
}

/// Rules for resolving overlapping marks within a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionKind {
    Identity,
    Stack,
    Dodge,
}

impl PositionKind {
    pub fn name(&self) -> &'static str {
        match self {
            PositionKind::Identity => "identity",
            PositionKind::Stack => "stack",
            PositionKind::Dodge => "dodge",
        }
    }

    pub fn parse(name: &str) -> Option<PositionKind> {
        match name {
            "identity" => Some(PositionKind::Identity),
            "stack" => Some(PositionKind::Stack),
            "dodge" => Some(PositionKind::Dodge),
            _ => None,
        }
    }
}

/// Loosely-typed parameter bag for statistic and geometry options
/// (binwidth, bins, levels, fixed colours, mark sizes, ...).
pub type Params = serde_json::Map<String, Value>;

/// One visualization layer: a geometry plus everything it needs to draw.
///
/// `data` and `mapping` default to the plot-level ones; `stat` and
/// `position` default to the geometry's declared pairing when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub data: Option<Dataset>,
    pub mapping: Mapping,
    pub geom: GeomKind,
    pub stat: Option<StatKind>,
    pub position: Option<PositionKind>,
    pub params: Params,
}

impl Layer {
    #[must_use]
    pub fn new(geom: GeomKind) -> Self {
        Layer {
            data: None,
            mapping: Mapping::new(),
            geom,
            stat: None,
            position: None,
            params: Params::new(),
        }
    }

    /// Construct a layer from a statistic, taking the stat's default
    /// geometry.
    #[must_use]
    pub fn from_stat(stat: StatKind) -> Self {
        let mut layer = Layer::new(stat.default_geom());
        layer.stat = Some(stat);
        layer
    }

    #[must_use]
    pub fn data(mut self, data: Dataset) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    #[must_use]
    pub fn stat(mut self, stat: StatKind) -> Self {
        self.stat = Some(stat);
        self
    }

    #[must_use]
    pub fn position(mut self, position: PositionKind) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param_f64(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(Value::as_f64)
    }

    pub fn param_usize(&self, key: &str) -> Option<usize> {
        self.params.get(key).and_then(Value::as_u64).map(|v| v as usize)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Convenience constructors mirroring the grammar's `geom_*()` calls.
#[must_use]
pub fn geom_point() -> Layer {
    Layer::new(GeomKind::Point)
}

#[must_use]
pub fn geom_line() -> Layer {
    Layer::new(GeomKind::Line)
}

#[must_use]
pub fn geom_bar() -> Layer {
    Layer::new(GeomKind::Bar)
}

#[must_use]
pub fn geom_histogram() -> Layer {
    Layer::new(GeomKind::Histogram)
}

#[must_use]
pub fn geom_boxplot() -> Layer {
    Layer::new(GeomKind::Boxplot)
}

#[must_use]
pub fn geom_smooth() -> Layer {
    Layer::new(GeomKind::Smooth)
}

#[must_use]
pub fn geom_tile() -> Layer {
    Layer::new(GeomKind::Tile)
}

#[must_use]
pub fn geom_contour() -> Layer {
    Layer::new(GeomKind::Contour)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pairings() {
        assert_eq!(GeomKind::Histogram.default_stat(), StatKind::Bin);
        assert_eq!(GeomKind::Histogram.default_position(), PositionKind::Stack);
        assert_eq!(GeomKind::Bar.default_stat(), StatKind::Count);
        assert_eq!(GeomKind::Point.default_stat(), StatKind::Identity);
        assert_eq!(StatKind::Bin.default_geom(), GeomKind::Histogram);
        assert_eq!(StatKind::Smooth.default_geom(), GeomKind::Smooth);
    }

    #[test]
    fn test_required_channels() {
        assert_eq!(GeomKind::Contour.required_channels(), &[Channel::X, Channel::Y, Channel::Z]);
        assert_eq!(GeomKind::Histogram.required_channels(), &[Channel::X]);
    }

    #[test]
    fn test_implicit_group_rule_table() {
        assert!(GeomKind::Line.implicit_group_channels().contains(&Channel::Colour));
        assert_eq!(GeomKind::Histogram.implicit_group_channels()[0], Channel::Fill);
        assert!(GeomKind::Tile.implicit_group_channels().is_empty());
    }

    #[test]
    fn test_layer_from_stat() {
        let layer = Layer::from_stat(StatKind::Bin);
        assert_eq!(layer.geom, GeomKind::Histogram);
        assert_eq!(layer.stat, Some(StatKind::Bin));
    }

    #[test]
    fn test_layer_params() {
        let layer = geom_histogram().param("binwidth", 0.2);
        assert_eq!(layer.param_f64("binwidth"), Some(0.2));
        assert_eq!(layer.param_usize("bins"), None);
    }
}
