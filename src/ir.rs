//! Intermediate representations for the render pipeline.
//!
//! Rendering is staged: resolution fills layer defaults, transformation
//! turns raw observations into grouped drawable values, scale training
//! fixes the panel domains, and compilation emits a scene graph of
//! primitive draw commands that the backend executes blindly.

use crate::data::Dataset;
use crate::layer::{GeomKind, Params, PositionKind, StatKind};
use crate::mapping::Mapping;
use crate::palette::Rgb;
use crate::theme::ResolvedTheme;

// =============================================================================
// Phase 1: Resolution
// =============================================================================

/// A layer with every unset field filled from the declared defaults and
/// every mapping validated against its dataset.
#[derive(Debug, Clone)]
pub struct ResolvedLayer {
    /// Position in the original layer sequence, for failure attribution.
    pub index: usize,
    pub geom: GeomKind,
    pub stat: StatKind,
    pub position: PositionKind,
    /// Effective mapping: plot-level overlaid with the layer's own.
    pub mapping: Mapping,
    /// Grouping variable, explicit or established by the implicit rule
    /// table for this geometry.
    pub group_by: Option<String>,
    /// Layer-specific dataset; `None` inherits the plot dataset.
    pub data: Option<Dataset>,
    pub params: Params,
}

impl ResolvedLayer {
    pub fn param_f64(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(serde_json::Value::as_f64)
    }

    pub fn param_usize(&self, key: &str) -> Option<usize> {
        self.params
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .map(|v| v as usize)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(serde_json::Value::as_str)
    }
}

// =============================================================================
// Phase 2: Transformation
// =============================================================================

/// Transformed data for the whole plot, split into one panel per facet
/// cell (a single panel without faceting).
#[derive(Debug, Clone)]
pub struct RenderData {
    pub panels: Vec<PanelData>,
    pub layout: FacetLayout,
}

#[derive(Debug, Clone)]
pub struct FacetLayout {
    pub nrow: usize,
    pub ncol: usize,
    /// Panel titles, index-aligned with `RenderData::panels`.
    pub titles: Vec<String>,
}

/// Data for a single panel.
#[derive(Debug, Clone)]
pub struct PanelData {
    pub index: usize,
    pub layers: Vec<LayerData>,
}

/// Data for a single layer within a panel, split into groups.
#[derive(Debug, Clone)]
pub struct LayerData {
    /// Original layer index.
    pub layer: usize,
    pub geom: GeomKind,
    pub position: PositionKind,
    pub groups: Vec<GroupData>,
}

/// The atomic unit of drawing: observations sharing one visual style.
#[derive(Debug, Clone)]
pub struct GroupData {
    /// Legend key; empty when the layer has no grouping.
    pub key: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Stacked baselines, zeros when the layer is not stacked.
    pub y_start: Vec<f64>,
    /// Mark width in x units (bin width, tile grid spacing).
    pub width: Option<f64>,
    /// Mark height in y units (tile grid spacing).
    pub height: Option<f64>,
    /// Boxplot five-number summaries, index-aligned with `x`.
    pub summary: Option<BoxSummary>,
    /// Per-mark fill colors (gradient-scaled tiles); empty otherwise.
    pub fills: Vec<Rgb>,
    /// Iso-line paths (contours); empty otherwise.
    pub paths: Vec<Vec<(f64, f64)>>,
    /// Category labels when x is discrete (index i maps to label i).
    pub x_categories: Option<Vec<String>>,
    pub style: MarkStyle,
}

impl GroupData {
    pub fn new(key: String, style: MarkStyle) -> Self {
        GroupData {
            key,
            x: Vec::new(),
            y: Vec::new(),
            y_start: Vec::new(),
            width: None,
            height: None,
            summary: None,
            fills: Vec::new(),
            paths: Vec::new(),
            x_categories: None,
            style,
        }
    }
}

/// Boxplot statistics per x position.
#[derive(Debug, Clone)]
pub struct BoxSummary {
    pub q1: Vec<f64>,
    pub median: Vec<f64>,
    pub q3: Vec<f64>,
    pub whisker_low: Vec<f64>,
    pub whisker_high: Vec<f64>,
    pub outliers: Vec<Vec<f64>>,
}

// === Mark styles (fully resolved, no Options) ===

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: Rgb,
    pub width: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub color: Rgb,
    pub size: f64,
    pub shape: PointShape,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillStyle {
    pub fill: Rgb,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointShape {
    Circle,
    Square,
    Triangle,
    Cross,
}

impl PointShape {
    pub fn parse(name: &str) -> Option<PointShape> {
        match name {
            "circle" => Some(PointShape::Circle),
            "square" => Some(PointShape::Square),
            "triangle" => Some(PointShape::Triangle),
            "cross" => Some(PointShape::Cross),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkStyle {
    Line(LineStyle),
    Point(PointStyle),
    Fill(FillStyle),
}

// =============================================================================
// Phase 3: Scale training
// =============================================================================

/// Trained scales for every panel.
#[derive(Debug, Clone)]
pub struct ScaleSystem {
    pub panels: Vec<PanelScales>,
}

#[derive(Debug, Clone)]
pub struct PanelScales {
    pub x: TrainedScale,
    pub y: TrainedScale,
}

/// A positional scale with its domain fixed.
///
/// The domain lives in projected space: log10 and reverse transforms are
/// applied by [`TrainedScale::project`] to data values during
/// compilation, so the backend always sees an ascending numeric domain.
#[derive(Debug, Clone)]
pub struct TrainedScale {
    pub domain: (f64, f64),
    pub is_categorical: bool,
    pub categories: Vec<String>,
    pub log10: bool,
    pub reversed: bool,
    /// Display name from the scale spec, if any.
    pub name: Option<String>,
}

impl TrainedScale {
    pub fn linear(domain: (f64, f64)) -> Self {
        TrainedScale {
            domain,
            is_categorical: false,
            categories: Vec::new(),
            log10: false,
            reversed: false,
            name: None,
        }
    }

    /// Map a data value into the scale's projected space.
    pub fn project(&self, value: f64) -> f64 {
        let value = if self.log10 {
            value.max(f64::MIN_POSITIVE).log10()
        } else {
            value
        };
        if self.reversed {
            -value
        } else {
            value
        }
    }
}

// =============================================================================
// Phase 4: Compilation (scene graph)
// =============================================================================

/// Primitive drawing commands for the whole plot. The backend executes
/// these blindly; no grammar semantics survive past this point.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub width: u32,
    pub height: u32,
    pub nrow: usize,
    pub ncol: usize,
    pub panels: Vec<PanelScene>,
    pub title: Option<String>,
    pub theme: ResolvedTheme,
}

#[derive(Debug, Clone)]
pub struct PanelScene {
    pub row: usize,
    pub col: usize,
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_scale: TrainedScale,
    pub y_scale: TrainedScale,
    pub commands: Vec<DrawCommand>,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    Line {
        points: Vec<(f64, f64)>,
        style: LineStyle,
        legend: Option<String>,
    },
    Point {
        points: Vec<(f64, f64)>,
        style: PointStyle,
        legend: Option<String>,
    },
    Rect {
        // Top-left, bottom-right in data coordinates
        tl: (f64, f64),
        br: (f64, f64),
        style: FillStyle,
        legend: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_identity() {
        let scale = TrainedScale::linear((0.0, 10.0));
        assert_eq!(scale.project(4.0), 4.0);
    }

    #[test]
    fn test_project_log10() {
        let scale = TrainedScale {
            log10: true,
            ..TrainedScale::linear((0.0, 3.0))
        };
        assert_eq!(scale.project(1000.0), 3.0);
    }

    #[test]
    fn test_project_reverse() {
        let scale = TrainedScale {
            reversed: true,
            ..TrainedScale::linear((-10.0, 0.0))
        };
        assert_eq!(scale.project(4.0), -4.0);
    }
}
