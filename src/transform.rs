//! Statistic transforms: raw observations in, grouped drawable values
//! out. One `LayerData` is produced per layer per facet cell.
//!
//! The implementations here are illustrative rather than
//! reference-grade; they exist to drive the pipeline end-to-end.

use crate::data::Dataset;
use crate::error::PlotError;
use crate::ir::{
    BoxSummary, FillStyle, GroupData, LayerData, LineStyle, MarkStyle, PointShape, PointStyle,
    ResolvedLayer,
};
use crate::layer::{GeomKind, PositionKind, StatKind};
use crate::mapping::Channel;
use crate::palette::{parse_color, ColorPalette, Rgb, GRADIENT_HIGH, GRADIENT_LOW};
use crate::scale::{ScaleSpec, ScaleTransform};
use std::collections::BTreeMap;

/// Bin count used when a bin statistic has neither `binwidth` nor
/// `bins`. The resolver reports the fallback as a warning.
pub const DEFAULT_BINS: usize = 30;

/// Raw per-group observations before the statistic runs.
#[derive(Debug, Default)]
struct RawGroup {
    x: Vec<String>,
    y: Vec<f64>,
    z: Vec<f64>,
    fill: Vec<f64>,
}

/// Per-group output of a statistic.
#[derive(Debug, Default)]
struct StatData {
    x: Vec<String>,
    y: Vec<f64>,
    width: Option<f64>,
    summary: Option<BoxSummary>,
    paths: Vec<Vec<(f64, f64)>>,
}

/// Transform one layer's slice of a facet cell into grouped drawable
/// values.
pub fn build_layer_data(
    layer: &ResolvedLayer,
    data: &Dataset,
    fill_scale: Option<&ScaleSpec>,
) -> Result<LayerData, PlotError> {
    if data.is_empty() {
        // An empty facet cell draws nothing but still occupies its panel
        return Ok(LayerData {
            layer: layer.index,
            geom: layer.geom,
            position: layer.position,
            groups: Vec::new(),
        });
    }

    let raw_groups = extract_groups(layer, data)?;

    // Tiles bypass the statistic dispatch: identity data plus a
    // gradient-scaled fill per mark
    if layer.geom == GeomKind::Tile {
        return build_tile_layer(layer, raw_groups, fill_scale);
    }

    let stat_groups = apply_statistic(layer, raw_groups)?;

    // Numeric vs categorical x: bar-family geometries force categories,
    // otherwise the data decides
    let force_categorical = matches!(layer.geom, GeomKind::Bar | GeomKind::Boxplot);
    let all_numeric = stat_groups
        .values()
        .flat_map(|g| g.x.iter())
        .all(|s| s.parse::<f64>().is_ok());
    let use_categorical = force_categorical || !all_numeric;

    let category_order = if use_categorical {
        Some(collect_categories(&stat_groups))
    } else {
        None
    };
    let category_index: BTreeMap<&str, f64> = category_order
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i as f64))
        .collect();

    // Visual styles: palette colors when a colour/fill mapping splits
    // the layer, fixed params otherwise
    let styled = layer.mapping.contains(Channel::Colour) || layer.mapping.contains(Channel::Fill);
    let keys: Vec<String> = stat_groups.keys().cloned().collect();
    let color_map = ColorPalette::category10().assign_colors(&keys);

    // Stacking baselines accumulate across groups at each x position
    let is_stacked = layer.position == PositionKind::Stack
        && matches!(layer.geom, GeomKind::Bar | GeomKind::Histogram);
    let mut stack_offsets: BTreeMap<String, f64> = BTreeMap::new();

    let mut groups = Vec::new();
    for (key, stat) in &stat_groups {
        let color = resolve_color(layer, styled, key, &color_map);
        let style = build_style(layer, color);
        let legend_key = if styled { key.clone() } else { String::new() };
        let mut group = GroupData::new(legend_key, style);

        group.width = stat.width;
        group.summary = stat.summary.clone();
        group.paths = stat.paths.clone();
        group.x_categories = category_order.clone();

        for (i, x_str) in stat.x.iter().enumerate() {
            let x_val = if use_categorical {
                category_index.get(x_str.as_str()).copied().unwrap_or(0.0)
            } else {
                x_str.parse::<f64>().map_err(|_| PlotError::NonNumeric {
                    column: layer
                        .mapping
                        .get(Channel::X)
                        .unwrap_or_default()
                        .to_string(),
                    value: x_str.clone(),
                })?
            };
            group.x.push(x_val);

            let y_val = stat.y.get(i).copied().unwrap_or(0.0);
            let (y_start, y_end) = if is_stacked {
                let start = stack_offsets.get(x_str).copied().unwrap_or(0.0);
                let end = start + y_val;
                stack_offsets.insert(x_str.clone(), end);
                (start, end)
            } else {
                (0.0, y_val)
            };
            group.y_start.push(y_start);
            group.y.push(y_end);
        }

        groups.push(group);
    }

    Ok(LayerData {
        layer: layer.index,
        geom: layer.geom,
        position: layer.position,
        groups,
    })
}

// =============================================================================
// Extraction
// =============================================================================

fn extract_groups(
    layer: &ResolvedLayer,
    data: &Dataset,
) -> Result<BTreeMap<String, RawGroup>, PlotError> {
    let x_idx = column_for(layer, data, Channel::X)?;
    let y_idx = match layer.mapping.get(Channel::Y) {
        Some(_) => Some(column_for(layer, data, Channel::Y)?),
        None => None,
    };
    let z_idx = match layer.mapping.get(Channel::Z) {
        Some(_) => Some(column_for(layer, data, Channel::Z)?),
        None => None,
    };
    let fill_idx = match layer.mapping.get(Channel::Fill) {
        Some(_) if layer.geom == GeomKind::Tile => Some(column_for(layer, data, Channel::Fill)?),
        _ => None,
    };
    let group_idx = layer.group_by.as_deref().and_then(|v| data.column_index(v));

    // Only statistics that consume y force it to parse as a number
    let needs_y = matches!(
        layer.stat,
        StatKind::Identity | StatKind::Boxplot | StatKind::Smooth | StatKind::Contour
    );
    let y_idx = if needs_y { y_idx } else { None };

    let mut groups: BTreeMap<String, RawGroup> = BTreeMap::new();
    for row in data.rows() {
        let key = group_idx.map(|idx| row[idx].clone()).unwrap_or_default();
        let entry = groups.entry(key).or_default();

        entry.x.push(row[x_idx].clone());

        if let Some(idx) = y_idx {
            entry.y.push(parse_number(layer, data, Channel::Y, &row[idx])?);
        }
        if let Some(idx) = z_idx {
            entry.z.push(parse_number(layer, data, Channel::Z, &row[idx])?);
        }
        if let Some(idx) = fill_idx {
            entry
                .fill
                .push(parse_number(layer, data, Channel::Fill, &row[idx])?);
        }
    }

    Ok(groups)
}

fn column_for(
    layer: &ResolvedLayer,
    data: &Dataset,
    channel: Channel,
) -> Result<usize, PlotError> {
    let variable = layer.mapping.get(channel).ok_or(PlotError::MissingChannel {
        channel,
        geom: layer.geom,
        stat: layer.stat,
    })?;
    data.column_index(variable)
        .ok_or_else(|| PlotError::UnknownVariable {
            channel,
            variable: variable.to_string(),
        })
}

fn parse_number(
    layer: &ResolvedLayer,
    data: &Dataset,
    channel: Channel,
    value: &str,
) -> Result<f64, PlotError> {
    value.parse::<f64>().map_err(|_| PlotError::NonNumeric {
        column: layer
            .mapping
            .get(channel)
            .map(str::to_string)
            .unwrap_or_else(|| data.headers().first().cloned().unwrap_or_default()),
        value: value.to_string(),
    })
}

// =============================================================================
// Statistic dispatch
// =============================================================================

fn apply_statistic(
    layer: &ResolvedLayer,
    groups: BTreeMap<String, RawGroup>,
) -> Result<BTreeMap<String, StatData>, PlotError> {
    match layer.stat {
        StatKind::Identity => Ok(groups
            .into_iter()
            .map(|(k, raw)| {
                (
                    k,
                    StatData {
                        x: raw.x,
                        y: raw.y,
                        ..StatData::default()
                    },
                )
            })
            .collect()),
        StatKind::Count => Ok(compute_count(groups)),
        StatKind::Bin => compute_bin(layer, groups),
        StatKind::Boxplot => Ok(compute_boxplot(groups)),
        StatKind::Smooth => Ok(compute_smooth(groups)),
        StatKind::Contour => compute_contour(layer, groups),
    }
}

fn compute_count(groups: BTreeMap<String, RawGroup>) -> BTreeMap<String, StatData> {
    let mut out = BTreeMap::new();
    for (key, raw) in groups {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for x in raw.x {
            *counts.entry(x).or_default() += 1;
        }
        let mut stat = StatData::default();
        for (x, count) in counts {
            stat.x.push(x);
            stat.y.push(count as f64);
        }
        out.insert(key, stat);
    }
    out
}

fn compute_bin(
    layer: &ResolvedLayer,
    groups: BTreeMap<String, RawGroup>,
) -> Result<BTreeMap<String, StatData>, PlotError> {
    // The bin grid spans all groups so stacked histograms align
    let mut all_values = Vec::new();
    for raw in groups.values() {
        for s in &raw.x {
            all_values.push(s.parse::<f64>().map_err(|_| PlotError::NonNumeric {
                column: layer
                    .mapping
                    .get(Channel::X)
                    .unwrap_or_default()
                    .to_string(),
                value: s.clone(),
            })?);
        }
    }
    if all_values.is_empty() {
        return Ok(BTreeMap::new());
    }

    let min = all_values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = all_values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let width = if let Some(binwidth) = layer.param_f64("binwidth") {
        binwidth
    } else {
        let bins = layer.param_usize("bins").unwrap_or(DEFAULT_BINS);
        if range == 0.0 {
            1.0
        } else {
            range / bins as f64
        }
    };
    if width <= 0.0 {
        return Err(PlotError::Data(format!("binwidth must be positive, got {width}")));
    }

    let mut out = BTreeMap::new();
    for (key, raw) in groups {
        let mut bins: BTreeMap<i64, usize> = BTreeMap::new();
        for s in raw.x {
            let v = s.parse::<f64>().unwrap_or(min);
            let idx = ((v - min) / width).floor() as i64;
            *bins.entry(idx).or_default() += 1;
        }

        let mut stat = StatData {
            width: Some(width),
            ..StatData::default()
        };
        for (idx, count) in bins {
            let center = min + idx as f64 * width + width / 2.0;
            stat.x.push(center.to_string());
            stat.y.push(count as f64);
        }
        out.insert(key, stat);
    }
    Ok(out)
}

fn compute_boxplot(groups: BTreeMap<String, RawGroup>) -> BTreeMap<String, StatData> {
    let mut out = BTreeMap::new();
    for (key, raw) in groups {
        let mut per_x: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (x, y) in raw.x.iter().zip(raw.y.iter()) {
            per_x.entry(x.clone()).or_default().push(*y);
        }

        let mut stat = StatData::default();
        let mut summary = BoxSummary {
            q1: Vec::new(),
            median: Vec::new(),
            q3: Vec::new(),
            whisker_low: Vec::new(),
            whisker_high: Vec::new(),
            outliers: Vec::new(),
        };

        for (x, mut ys) in per_x {
            if ys.is_empty() {
                continue;
            }
            ys.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let q1 = percentile(&ys, 0.25);
            let median = percentile(&ys, 0.50);
            let q3 = percentile(&ys, 0.75);
            let iqr = q3 - q1;
            let lower_fence = q1 - 1.5 * iqr;
            let upper_fence = q3 + 1.5 * iqr;

            // Whiskers reach the extreme data points inside the fences
            let whisker_low = ys
                .iter()
                .copied()
                .filter(|&v| v >= lower_fence)
                .fold(f64::INFINITY, f64::min)
                .min(q1);
            let whisker_high = ys
                .iter()
                .copied()
                .filter(|&v| v <= upper_fence)
                .fold(f64::NEG_INFINITY, f64::max)
                .max(q3);
            let outliers: Vec<f64> = ys
                .iter()
                .copied()
                .filter(|&v| v < lower_fence || v > upper_fence)
                .collect();

            stat.x.push(x);
            stat.y.push(median);
            summary.q1.push(q1);
            summary.median.push(median);
            summary.q3.push(q3);
            summary.whisker_low.push(whisker_low);
            summary.whisker_high.push(whisker_high);
            summary.outliers.push(outliers);
        }

        stat.summary = Some(summary);
        out.insert(key, stat);
    }
    out
}

fn compute_smooth(groups: BTreeMap<String, RawGroup>) -> BTreeMap<String, StatData> {
    let mut out = BTreeMap::new();
    for (key, raw) in groups {
        let pairs: Vec<(f64, f64)> = raw
            .x
            .iter()
            .zip(raw.y.iter())
            .filter_map(|(x, &y)| x.parse::<f64>().ok().map(|x| (x, y)))
            .collect();
        if pairs.len() < 2 {
            continue;
        }

        // Least-squares line over the observed x range
        let n = pairs.len() as f64;
        let sum_x: f64 = pairs.iter().map(|p| p.0).sum();
        let sum_y: f64 = pairs.iter().map(|p| p.1).sum();
        let sum_xx: f64 = pairs.iter().map(|p| p.0 * p.0).sum();
        let sum_xy: f64 = pairs.iter().map(|p| p.0 * p.1).sum();

        let denom = n * sum_xx - sum_x * sum_x;
        if denom == 0.0 {
            continue;
        }
        let slope = (n * sum_xy - sum_x * sum_y) / denom;
        let intercept = (sum_y - slope * sum_x) / n;

        let min_x = pairs.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let max_x = pairs.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);

        out.insert(
            key,
            StatData {
                x: vec![min_x.to_string(), max_x.to_string()],
                y: vec![slope * min_x + intercept, slope * max_x + intercept],
                ..StatData::default()
            },
        );
    }
    out
}

// =============================================================================
// Contours (marching squares over a regular grid)
// =============================================================================

fn compute_contour(
    layer: &ResolvedLayer,
    groups: BTreeMap<String, RawGroup>,
) -> Result<BTreeMap<String, StatData>, PlotError> {
    let levels = layer.param_usize("levels").unwrap_or(10).max(1);

    let mut out = BTreeMap::new();
    for (key, raw) in groups {
        let mut xs = Vec::with_capacity(raw.x.len());
        for s in &raw.x {
            xs.push(s.parse::<f64>().map_err(|_| PlotError::NonNumeric {
                column: layer
                    .mapping
                    .get(Channel::X)
                    .unwrap_or_default()
                    .to_string(),
                value: s.clone(),
            })?);
        }
        let paths = marching_squares(&xs, &raw.y, &raw.z, levels);
        out.insert(
            key,
            StatData {
                paths,
                ..StatData::default()
            },
        );
    }
    Ok(out)
}

/// Trace iso-lines of `z` over the regular grid spanned by the distinct
/// x and y values. Emits one short segment per crossed cell edge pair;
/// grid holes are skipped.
fn marching_squares(xs: &[f64], ys: &[f64], zs: &[f64], levels: usize) -> Vec<Vec<(f64, f64)>> {
    let grid_x = sorted_distinct(xs);
    let grid_y = sorted_distinct(ys);
    if grid_x.len() < 2 || grid_y.len() < 2 || zs.is_empty() {
        return Vec::new();
    }

    // Lookup from grid node to z value
    let mut z_at: BTreeMap<(u64, u64), f64> = BTreeMap::new();
    for ((x, y), z) in xs.iter().zip(ys.iter()).zip(zs.iter()) {
        z_at.insert((x.to_bits(), y.to_bits()), *z);
    }
    let node = |x: f64, y: f64| z_at.get(&(x.to_bits(), y.to_bits())).copied();

    let z_min = zs.iter().cloned().fold(f64::INFINITY, f64::min);
    let z_max = zs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if z_min >= z_max {
        return Vec::new();
    }

    let mut paths = Vec::new();
    for level_idx in 1..=levels {
        let level = z_min + (z_max - z_min) * level_idx as f64 / (levels + 1) as f64;

        for i in 0..grid_x.len() - 1 {
            for j in 0..grid_y.len() - 1 {
                let (x0, x1) = (grid_x[i], grid_x[i + 1]);
                let (y0, y1) = (grid_y[j], grid_y[j + 1]);
                let (Some(z00), Some(z10), Some(z01), Some(z11)) =
                    (node(x0, y0), node(x1, y0), node(x0, y1), node(x1, y1))
                else {
                    continue;
                };

                // Edge crossing points, linearly interpolated
                let lerp = |a: f64, b: f64, za: f64, zb: f64| {
                    a + (b - a) * ((level - za) / (zb - za))
                };
                let bottom = || (lerp(x0, x1, z00, z10), y0);
                let top = || (lerp(x0, x1, z01, z11), y1);
                let left = || (x0, lerp(y0, y1, z00, z01));
                let right = || (x1, lerp(y0, y1, z10, z11));

                let case = (usize::from(z00 > level))
                    | (usize::from(z10 > level) << 1)
                    | (usize::from(z11 > level) << 2)
                    | (usize::from(z01 > level) << 3);

                let mut push = |a: (f64, f64), b: (f64, f64)| paths.push(vec![a, b]);
                match case {
                    0 | 15 => {}
                    1 | 14 => push(left(), bottom()),
                    2 | 13 => push(bottom(), right()),
                    3 | 12 => push(left(), right()),
                    4 | 11 => push(top(), right()),
                    6 | 9 => push(bottom(), top()),
                    7 | 8 => push(left(), top()),
                    5 => {
                        push(left(), bottom());
                        push(top(), right());
                    }
                    10 => {
                        push(left(), top());
                        push(bottom(), right());
                    }
                    _ => unreachable!(),
                }
            }
        }
    }
    paths
}

fn sorted_distinct(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out.dedup();
    out
}

// =============================================================================
// Tiles
// =============================================================================

fn build_tile_layer(
    layer: &ResolvedLayer,
    groups: BTreeMap<String, RawGroup>,
    fill_scale: Option<&ScaleSpec>,
) -> Result<LayerData, PlotError> {
    let (low, high) = match fill_scale.map(|s| &s.transform) {
        Some(ScaleTransform::Gradient { low, high }) => (*low, *high),
        _ => (GRADIENT_LOW, GRADIENT_HIGH),
    };

    let mut out_groups = Vec::new();
    for (key, raw) in groups {
        let mut xs = Vec::with_capacity(raw.x.len());
        for s in &raw.x {
            xs.push(s.parse::<f64>().map_err(|_| PlotError::NonNumeric {
                column: layer
                    .mapping
                    .get(Channel::X)
                    .unwrap_or_default()
                    .to_string(),
                value: s.clone(),
            })?);
        }
        let ys = raw.y.clone();

        let fill_min = raw.fill.iter().cloned().fold(f64::INFINITY, f64::min);
        let fill_max = raw.fill.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let fill_span = fill_max - fill_min;

        let mut group = GroupData::new(
            key,
            MarkStyle::Fill(FillStyle {
                fill: low,
                alpha: layer.param_f64("alpha").unwrap_or(1.0),
            }),
        );
        group.width = Some(grid_spacing(&xs));
        group.height = Some(grid_spacing(&ys));
        group.x = xs;
        group.y_start = vec![0.0; ys.len()];
        group.y = ys;
        group.fills = raw
            .fill
            .iter()
            .map(|&v| {
                if fill_span > 0.0 {
                    low.lerp(high, (v - fill_min) / fill_span)
                } else {
                    low
                }
            })
            .collect();
        out_groups.push(group);
    }

    Ok(LayerData {
        layer: layer.index,
        geom: layer.geom,
        position: layer.position,
        groups: out_groups,
    })
}

/// Smallest positive gap between distinct sorted values; tiles default
/// to unit cells when the grid has a single coordinate.
fn grid_spacing(values: &[f64]) -> f64 {
    let spacing = sorted_distinct(values)
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > 0.0)
        .fold(f64::INFINITY, f64::min);
    if spacing.is_finite() {
        spacing
    } else {
        1.0
    }
}

// =============================================================================
// Styles
// =============================================================================

fn resolve_color(
    layer: &ResolvedLayer,
    styled: bool,
    key: &str,
    color_map: &BTreeMap<String, Rgb>,
) -> Rgb {
    if styled {
        if let Some(color) = color_map.get(key) {
            return *color;
        }
    }
    layer
        .param_str("colour")
        .or_else(|| layer.param_str("color"))
        .or_else(|| layer.param_str("fill"))
        .and_then(parse_color)
        .unwrap_or_else(|| ColorPalette::category10().default_color())
}

fn build_style(layer: &ResolvedLayer, color: Rgb) -> MarkStyle {
    let alpha = layer.param_f64("alpha").unwrap_or(1.0);
    match layer.geom {
        GeomKind::Point => MarkStyle::Point(PointStyle {
            color,
            size: layer.param_f64("size").unwrap_or(3.0),
            shape: layer
                .param_str("shape")
                .and_then(PointShape::parse)
                .unwrap_or(PointShape::Circle),
            alpha,
        }),
        GeomKind::Line | GeomKind::Smooth | GeomKind::Contour => MarkStyle::Line(LineStyle {
            color,
            width: layer.param_f64("linewidth").unwrap_or(1.0),
            alpha,
        }),
        GeomKind::Bar | GeomKind::Histogram | GeomKind::Boxplot | GeomKind::Tile => {
            MarkStyle::Fill(FillStyle { fill: color, alpha })
        }
    }
}

fn collect_categories(groups: &BTreeMap<String, StatData>) -> Vec<String> {
    let mut categories: Vec<String> = groups
        .values()
        .flat_map(|g| g.x.iter().cloned())
        .collect();
    categories.sort_by(|a, b| {
        match (a.parse::<f64>(), b.parse::<f64>()) {
            // Numeric-looking categories sort numerically
            (Ok(fa), Ok(fb)) => fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal),
            _ => a.cmp(b),
        }
    });
    categories.dedup();
    categories
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = p * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = rank - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}
