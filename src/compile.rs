//! Compile transformed data and trained scales into a scene graph of
//! primitive draw commands.
//!
//! Position adjustments happen here (stacking was pre-computed by the
//! transform; dodging needs cross-group occupancy), and the coordinate
//! transform is applied last, after all geometry positions are known.

use crate::coord::{polar_point, CoordKind};
use crate::ir::{
    DrawCommand, FillStyle, GroupData, LineStyle, MarkStyle, PanelScene, PointShape, PointStyle,
    RenderData, ResolvedLayer, ScaleSystem, SceneGraph, TrainedScale,
};
use crate::layer::{GeomKind, PositionKind};
use crate::mapping::Channel;
use crate::palette::Rgb;
use crate::plot::PlotSpec;
use crate::RenderOptions;
use std::collections::HashMap;

/// Default mark width (in category slots) for bars and boxplots.
const BAR_WIDTH: f64 = 0.9;
const BOX_WIDTH: f64 = 0.75;

pub fn compile_scene(
    data: RenderData,
    scales: ScaleSystem,
    spec: &PlotSpec,
    resolved: &[ResolvedLayer],
    options: &RenderOptions,
) -> SceneGraph {
    let coord = spec.coord.unwrap_or_default();
    let theme = spec.theme.clone().unwrap_or_default().resolve();

    // Axis labels: explicit labs > scale display name > variable name
    let x_label = axis_label(spec, resolved, Channel::X);
    let y_label = axis_label(spec, resolved, Channel::Y);

    let mut panels = Vec::new();
    for (panel_data, panel_scales) in data.panels.into_iter().zip(scales.panels.into_iter()) {
        let mut commands = Vec::new();

        for layer_data in &panel_data.layers {
            let occupancy = dodge_occupancy(layer_data.position, &layer_data.groups);

            for (group_idx, group) in layer_data.groups.iter().enumerate() {
                compile_group(
                    layer_data.geom,
                    layer_data.position,
                    group,
                    group_idx,
                    &occupancy,
                    &panel_scales.x,
                    &panel_scales.y,
                    coord,
                    &mut commands,
                );
            }
        }

        let title = data
            .layout
            .titles
            .get(panel_data.index)
            .filter(|t| !t.is_empty())
            .cloned();

        let (x_scale, y_scale) = panel_axes(&panel_scales.x, &panel_scales.y, coord);
        let (panel_x_label, panel_y_label) = match coord {
            CoordKind::Flip => (y_label.clone(), x_label.clone()),
            _ => (x_label.clone(), y_label.clone()),
        };

        panels.push(PanelScene {
            row: panel_data.index / data.layout.ncol,
            col: panel_data.index % data.layout.ncol,
            title,
            x_label: panel_x_label,
            y_label: panel_y_label,
            x_scale,
            y_scale,
            commands,
        });
    }

    SceneGraph {
        width: options.width,
        height: options.height,
        nrow: data.layout.nrow,
        ncol: data.layout.ncol,
        panels,
        title: spec.labels.title.clone(),
        theme,
    }
}

fn axis_label(spec: &PlotSpec, resolved: &[ResolvedLayer], channel: Channel) -> Option<String> {
    let explicit = match channel {
        Channel::X => spec.labels.x.clone(),
        Channel::Y => spec.labels.y.clone(),
        _ => None,
    };
    explicit
        .or_else(|| spec.scales.get(&channel).and_then(|s| s.name.clone()))
        .or_else(|| {
            resolved
                .iter()
                .find_map(|layer| layer.mapping.get(channel))
                .map(str::to_string)
        })
}

/// Map a projected point through the coordinate system.
fn place(
    x: f64,
    y: f64,
    xs: &TrainedScale,
    ys: &TrainedScale,
    coord: CoordKind,
) -> (f64, f64) {
    let px = xs.project(x);
    let py = ys.project(y);
    match coord {
        CoordKind::Cartesian => (px, py),
        CoordKind::Flip => (py, px),
        CoordKind::Polar => polar_point(px, py, xs.domain, ys.domain),
    }
}

/// The axes the backend draws for a panel, after the coordinate
/// transform. Polar panels collapse to the unit plane.
fn panel_axes(
    xs: &TrainedScale,
    ys: &TrainedScale,
    coord: CoordKind,
) -> (TrainedScale, TrainedScale) {
    match coord {
        CoordKind::Cartesian => (xs.clone(), ys.clone()),
        CoordKind::Flip => (ys.clone(), xs.clone()),
        CoordKind::Polar => (
            TrainedScale::linear((-1.15, 1.15)),
            TrainedScale::linear((-1.15, 1.15)),
        ),
    }
}

/// For dodged layers: which groups occupy each (quantized) x position.
/// Marks sharing a position split its slot evenly, ranked by group
/// order.
fn dodge_occupancy(
    position: PositionKind,
    groups: &[GroupData],
) -> HashMap<i64, Vec<usize>> {
    let mut occupancy: HashMap<i64, Vec<usize>> = HashMap::new();
    if position != PositionKind::Dodge {
        return occupancy;
    }
    for (group_idx, group) in groups.iter().enumerate() {
        for &x in &group.x {
            occupancy.entry(x.round() as i64).or_default().push(group_idx);
        }
    }
    for present in occupancy.values_mut() {
        present.sort_unstable();
        present.dedup();
    }
    occupancy
}

fn dodge_slot(
    position: PositionKind,
    occupancy: &HashMap<i64, Vec<usize>>,
    group_idx: usize,
    x: f64,
    base_width: f64,
) -> (f64, f64) {
    if position != PositionKind::Dodge {
        return (base_width, 0.0);
    }
    let Some(present) = occupancy.get(&(x.round() as i64)) else {
        return (base_width, 0.0);
    };
    let Some(rank) = present.iter().position(|&g| g == group_idx) else {
        return (base_width, 0.0);
    };
    let n = present.len() as f64;
    let slot = base_width / n;
    let offset = (rank as f64 - (n - 1.0) / 2.0) * slot;
    (slot, offset)
}

#[allow(clippy::too_many_arguments)]
fn compile_group(
    geom: GeomKind,
    position: PositionKind,
    group: &GroupData,
    group_idx: usize,
    occupancy: &HashMap<i64, Vec<usize>>,
    xs: &TrainedScale,
    ys: &TrainedScale,
    coord: CoordKind,
    commands: &mut Vec<DrawCommand>,
) {
    let legend = (!group.key.is_empty()).then(|| group.key.clone());

    match &group.style {
        MarkStyle::Line(style) => {
            if !group.paths.is_empty() {
                // Contour iso-lines: one command per path
                let mut first = true;
                for path in &group.paths {
                    let points: Vec<(f64, f64)> = path
                        .iter()
                        .map(|&(x, y)| place(x, y, xs, ys, coord))
                        .collect();
                    commands.push(DrawCommand::Line {
                        points,
                        style: style.clone(),
                        legend: if first { legend.clone() } else { None },
                    });
                    first = false;
                }
                return;
            }

            // Connected lines draw in x order
            let mut order: Vec<usize> = (0..group.x.len()).collect();
            order.sort_by(|&a, &b| {
                group.x[a]
                    .partial_cmp(&group.x[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let points: Vec<(f64, f64)> = order
                .into_iter()
                .map(|i| place(group.x[i], group.y[i], xs, ys, coord))
                .collect();
            commands.push(DrawCommand::Line {
                points,
                style: style.clone(),
                legend,
            });
        }

        MarkStyle::Point(style) => {
            let points: Vec<(f64, f64)> = group
                .x
                .iter()
                .zip(group.y.iter())
                .map(|(&x, &y)| place(x, y, xs, ys, coord))
                .collect();
            commands.push(DrawCommand::Point {
                points,
                style: style.clone(),
                legend,
            });
        }

        MarkStyle::Fill(style) => match geom {
            GeomKind::Tile => {
                let half_w = group.width.unwrap_or(1.0) / 2.0;
                let half_h = group.height.unwrap_or(1.0) / 2.0;
                for i in 0..group.x.len() {
                    let (x, y) = (group.x[i], group.y[i]);
                    let fill = group.fills.get(i).copied().unwrap_or(style.fill);
                    commands.push(DrawCommand::Rect {
                        tl: place(x - half_w, y + half_h, xs, ys, coord),
                        br: place(x + half_w, y - half_h, xs, ys, coord),
                        style: FillStyle {
                            fill,
                            alpha: style.alpha,
                        },
                        legend: None,
                    });
                }
            }
            GeomKind::Boxplot => {
                compile_boxplot(group, group_idx, position, occupancy, xs, ys, coord, style, commands);
            }
            _ => {
                // Bars and histogram bins
                let base_width = group.width.unwrap_or(BAR_WIDTH);
                for i in 0..group.x.len() {
                    let x = group.x[i];
                    let (slot, offset) =
                        dodge_slot(position, occupancy, group_idx, x, base_width);
                    let half = slot / 2.0;
                    let x_mid = x + offset;
                    commands.push(DrawCommand::Rect {
                        tl: place(x_mid - half, group.y[i], xs, ys, coord),
                        br: place(x_mid + half, group.y_start[i], xs, ys, coord),
                        style: style.clone(),
                        legend: if i == 0 { legend.clone() } else { None },
                    });
                }
            }
        },
    }
}

/// Decompose each boxplot into whiskers, caps, box, median line, and
/// outlier points, in z-order.
#[allow(clippy::too_many_arguments)]
fn compile_boxplot(
    group: &GroupData,
    group_idx: usize,
    position: PositionKind,
    occupancy: &HashMap<i64, Vec<usize>>,
    xs: &TrainedScale,
    ys: &TrainedScale,
    coord: CoordKind,
    style: &FillStyle,
    commands: &mut Vec<DrawCommand>,
) {
    let Some(summary) = &group.summary else {
        return;
    };
    let legend = (!group.key.is_empty()).then(|| group.key.clone());

    let whisker_style = LineStyle {
        color: style.fill,
        width: 2.0,
        alpha: style.alpha,
    };
    let median_style = LineStyle {
        color: Rgb::WHITE,
        width: 2.0,
        alpha: 0.9,
    };
    let outlier_style = PointStyle {
        color: style.fill,
        size: 2.5,
        shape: PointShape::Circle,
        alpha: style.alpha,
    };

    for i in 0..group.x.len() {
        let (slot, offset) = dodge_slot(position, occupancy, group_idx, group.x[i], BOX_WIDTH);
        let x = group.x[i] + offset;
        let half = slot / 2.0;
        let cap_half = slot * 0.2;

        let low = summary.whisker_low[i];
        let high = summary.whisker_high[i];
        let q1 = summary.q1[i];
        let q3 = summary.q3[i];
        let median = summary.median[i];

        // Whiskers and caps
        {
            let mut line = |points: Vec<(f64, f64)>| {
                commands.push(DrawCommand::Line {
                    points: points
                        .into_iter()
                        .map(|(px, py)| place(px, py, xs, ys, coord))
                        .collect(),
                    style: whisker_style.clone(),
                    legend: None,
                });
            };
            line(vec![(x, low), (x, q1)]);
            line(vec![(x, q3), (x, high)]);
            line(vec![(x - cap_half, low), (x + cap_half, low)]);
            line(vec![(x - cap_half, high), (x + cap_half, high)]);
        }

        // Box carries the legend entry
        commands.push(DrawCommand::Rect {
            tl: place(x - half, q3, xs, ys, coord),
            br: place(x + half, q1, xs, ys, coord),
            style: style.clone(),
            legend: if i == 0 { legend.clone() } else { None },
        });

        // Median line, white for contrast
        let median_points = vec![(x - half, median), (x + half, median)];
        commands.push(DrawCommand::Line {
            points: median_points
                .into_iter()
                .map(|(px, py)| place(px, py, xs, ys, coord))
                .collect(),
            style: median_style.clone(),
            legend: None,
        });

        let outliers = &summary.outliers[i];
        if !outliers.is_empty() {
            commands.push(DrawCommand::Point {
                points: outliers
                    .iter()
                    .map(|&v| place(x, v, xs, ys, coord))
                    .collect(),
                style: outlier_style.clone(),
                legend: None,
            });
        }
    }
}
