//! Scale specifications and render-time scale training.

use crate::facet::FacetPolicy;
use crate::ir::{GroupData, PanelScales, RenderData, ScaleSystem, TrainedScale};
use crate::layer::GeomKind;
use crate::mapping::Channel;
use crate::palette::Rgb;
use crate::plot::PlotSpec;

/// The transform kind of a scale.
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleTransform {
    Continuous,
    Discrete,
    /// Interpolate fill colors between two endpoints.
    Gradient { low: Rgb, high: Rgb },
    Log10,
    Reverse,
}

/// A user-supplied scale for one channel.
///
/// At most one scale is active per channel; composing a second one
/// replaces the first wholesale (partial fields never merge) and emits
/// an override warning.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSpec {
    pub channel: Channel,
    pub transform: ScaleTransform,
    pub limits: Option<(f64, f64)>,
    pub name: Option<String>,
}

impl ScaleSpec {
    #[must_use]
    pub fn continuous(channel: Channel) -> Self {
        ScaleSpec {
            channel,
            transform: ScaleTransform::Continuous,
            limits: None,
            name: None,
        }
    }

    #[must_use]
    pub fn discrete(channel: Channel) -> Self {
        ScaleSpec {
            transform: ScaleTransform::Discrete,
            ..ScaleSpec::continuous(channel)
        }
    }

    #[must_use]
    pub fn gradient(channel: Channel, low: Rgb, high: Rgb) -> Self {
        ScaleSpec {
            transform: ScaleTransform::Gradient { low, high },
            ..ScaleSpec::continuous(channel)
        }
    }

    #[must_use]
    pub fn log10(channel: Channel) -> Self {
        ScaleSpec {
            transform: ScaleTransform::Log10,
            ..ScaleSpec::continuous(channel)
        }
    }

    #[must_use]
    pub fn reverse(channel: Channel) -> Self {
        ScaleSpec {
            transform: ScaleTransform::Reverse,
            ..ScaleSpec::continuous(channel)
        }
    }

    #[must_use]
    pub fn limits(mut self, min: f64, max: f64) -> Self {
        self.limits = Some((min, max));
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// =============================================================================
// Training
// =============================================================================

/// Observed extent of one positional dimension within a panel.
#[derive(Debug, Clone, Default)]
struct MinMax {
    min: f64,
    max: f64,
    seen: bool,
    is_categorical: bool,
    categories: Vec<String>,
}

impl MinMax {
    fn new() -> Self {
        MinMax {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            seen: false,
            is_categorical: false,
            categories: Vec::new(),
        }
    }

    fn include(&mut self, value: f64) {
        if value.is_finite() {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
            self.seen = true;
        }
    }
}

/// Fix the x/y domains of every panel, honoring the facet axis policy
/// and any explicit scale specs.
pub fn train_scales(data: &RenderData, spec: &PlotSpec) -> ScaleSystem {
    let policy = spec
        .facet
        .as_ref()
        .map(|f| f.policy)
        .unwrap_or(FacetPolicy::Fixed);

    let x_spec = spec.scales.get(&Channel::X);
    let y_spec = spec.scales.get(&Channel::Y);

    let mut panel_ranges = Vec::with_capacity(data.panels.len());
    for panel in &data.panels {
        let mut x_mm = MinMax::new();
        let mut y_mm = MinMax::new();
        for layer in &panel.layers {
            for group in &layer.groups {
                observe_group(group, layer.geom, &mut x_mm, &mut y_mm);
            }
        }
        panel_ranges.push((x_mm, y_mm));
    }

    // Shared domains merge across panels; free axes keep their own.
    let global_x = if matches!(policy, FacetPolicy::Fixed | FacetPolicy::FreeY) {
        Some(merge_ranges(panel_ranges.iter().map(|(x, _)| x)))
    } else {
        None
    };
    let global_y = if matches!(policy, FacetPolicy::Fixed | FacetPolicy::FreeX) {
        Some(merge_ranges(panel_ranges.iter().map(|(_, y)| y)))
    } else {
        None
    };

    let mut panels = Vec::with_capacity(panel_ranges.len());
    for (x_local, y_local) in &panel_ranges {
        let x_mm = global_x.as_ref().unwrap_or(x_local);
        let y_mm = global_y.as_ref().unwrap_or(y_local);
        panels.push(PanelScales {
            x: build_scale(x_mm, x_spec),
            y: build_scale(y_mm, y_spec),
        });
    }

    ScaleSystem { panels }
}

fn observe_group(group: &GroupData, geom: GeomKind, x_mm: &mut MinMax, y_mm: &mut MinMax) {
    if let Some(cats) = &group.x_categories {
        x_mm.is_categorical = true;
        if x_mm.categories.is_empty() {
            x_mm.categories = cats.clone();
        }
    }

    let half_width = group.width.unwrap_or(0.0) / 2.0;
    let half_height = group.height.unwrap_or(0.0) / 2.0;

    for &x in &group.x {
        x_mm.include(x - half_width);
        x_mm.include(x + half_width);
    }
    for &y in &group.y {
        y_mm.include(y - half_height);
        y_mm.include(y + half_height);
    }
    for &y in &group.y_start {
        y_mm.include(y);
    }
    if let Some(summary) = &group.summary {
        for &v in summary.whisker_low.iter().chain(&summary.whisker_high) {
            y_mm.include(v);
        }
        for outlier in &summary.outliers {
            for &v in outlier {
                y_mm.include(v);
            }
        }
    }
    for path in &group.paths {
        for &(x, y) in path {
            x_mm.include(x);
            y_mm.include(y);
        }
    }

    // Bars grow from the axis; keep zero in view
    if matches!(geom, GeomKind::Bar | GeomKind::Histogram) {
        y_mm.include(0.0);
    }
}

fn merge_ranges<'a, I>(ranges: I) -> MinMax
where
    I: Iterator<Item = &'a MinMax>,
{
    let mut global = MinMax::new();
    for local in ranges {
        if local.seen {
            global.include(local.min);
            global.include(local.max);
        }
        if local.is_categorical {
            global.is_categorical = true;
            if global.categories.is_empty() {
                global.categories = local.categories.clone();
            }
        }
    }
    global
}

fn build_scale(mm: &MinMax, spec: Option<&ScaleSpec>) -> TrainedScale {
    if mm.is_categorical {
        let n = mm.categories.len().max(1) as f64;
        return TrainedScale {
            domain: (-0.5, n - 0.5),
            is_categorical: true,
            categories: mm.categories.clone(),
            log10: false,
            reversed: matches!(spec.map(|s| &s.transform), Some(ScaleTransform::Reverse)),
            name: spec.and_then(|s| s.name.clone()),
        };
    }

    let log10 = matches!(spec.map(|s| &s.transform), Some(ScaleTransform::Log10));
    let reversed = matches!(spec.map(|s| &s.transform), Some(ScaleTransform::Reverse));

    let mut scale = TrainedScale {
        domain: (0.0, 1.0),
        is_categorical: false,
        categories: Vec::new(),
        log10,
        reversed,
        name: spec.and_then(|s| s.name.clone()),
    };

    let (raw_min, raw_max) = if let Some((lo, hi)) = spec.and_then(|s| s.limits) {
        (lo, hi)
    } else if mm.seen {
        (mm.min, mm.max)
    } else {
        (0.0, 1.0)
    };

    let a = scale.project(raw_min);
    let b = scale.project(raw_max);
    let (min, max) = if a <= b { (a, b) } else { (b, a) };
    scale.domain = pad_range(min, max);
    scale
}

fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FacetLayout, LayerData, LineStyle, MarkStyle, PanelData};
    use crate::layer::PositionKind;
    use crate::mapping::aes;
    use crate::data::Dataset;

    fn make_group(x: Vec<f64>, y: Vec<f64>) -> GroupData {
        let mut group = GroupData::new(
            String::new(),
            MarkStyle::Line(LineStyle {
                color: Rgb(0, 0, 0),
                width: 1.0,
                alpha: 1.0,
            }),
        );
        group.x = x;
        group.y = y;
        group
    }

    fn make_render_data(geom: GeomKind, groups: Vec<GroupData>) -> RenderData {
        RenderData {
            panels: vec![PanelData {
                index: 0,
                layers: vec![LayerData {
                    layer: 0,
                    geom,
                    position: PositionKind::Identity,
                    groups,
                }],
            }],
            layout: FacetLayout {
                nrow: 1,
                ncol: 1,
                titles: vec![String::new()],
            },
        }
    }

    fn make_spec() -> PlotSpec {
        PlotSpec::new(
            Dataset::new(vec!["x".to_string()], vec![vec!["1".to_string()]]),
            aes().x("x"),
        )
    }

    #[test]
    fn test_continuous_padding() {
        let data = make_render_data(GeomKind::Line, vec![make_group(vec![0.0, 10.0], vec![0.0, 100.0])]);
        let scales = train_scales(&data, &make_spec());
        let panel = &scales.panels[0];
        assert!(panel.x.domain.0 < 0.0);
        assert!(panel.x.domain.1 > 10.0);
        assert!(!panel.x.is_categorical);
    }

    #[test]
    fn test_single_point_widens() {
        let data = make_render_data(GeomKind::Point, vec![make_group(vec![5.0], vec![5.0])]);
        let scales = train_scales(&data, &make_spec());
        assert_eq!(scales.panels[0].x.domain, (4.0, 6.0));
    }

    #[test]
    fn test_categorical_domain() {
        let mut group = make_group(vec![0.0, 1.0], vec![10.0, 20.0]);
        group.x_categories = Some(vec!["A".to_string(), "B".to_string()]);
        let data = make_render_data(GeomKind::Bar, vec![group]);
        let scales = train_scales(&data, &make_spec());
        let x = &scales.panels[0].x;
        assert!(x.is_categorical);
        assert_eq!(x.domain, (-0.5, 1.5));
        assert_eq!(x.categories, vec!["A", "B"]);
    }

    #[test]
    fn test_bar_forces_zero_baseline() {
        let data = make_render_data(GeomKind::Bar, vec![make_group(vec![0.0], vec![50.0])]);
        let scales = train_scales(&data, &make_spec());
        assert!(scales.panels[0].y.domain.0 <= 0.0);
    }

    #[test]
    fn test_explicit_limits_win() {
        let data = make_render_data(GeomKind::Point, vec![make_group(vec![0.0, 10.0], vec![0.0, 10.0])]);
        let mut spec = make_spec();
        spec.scales.insert(Channel::X, ScaleSpec::continuous(Channel::X).limits(0.0, 100.0));
        let scales = train_scales(&data, &spec);
        assert!(scales.panels[0].x.domain.1 > 99.0);
    }

    #[test]
    fn test_log10_domain_projected() {
        let data = make_render_data(GeomKind::Point, vec![make_group(vec![1.0, 1000.0], vec![1.0, 2.0])]);
        let mut spec = make_spec();
        spec.scales.insert(Channel::X, ScaleSpec::log10(Channel::X));
        let scales = train_scales(&data, &spec);
        let x = &scales.panels[0].x;
        assert!(x.log10);
        // log10 of 1..1000 is 0..3, plus padding
        assert!(x.domain.0 < 0.0 && x.domain.0 > -0.5);
        assert!(x.domain.1 > 3.0 && x.domain.1 < 3.5);
    }
}
