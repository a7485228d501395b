//! Drawing backends. The scene graph is executed blindly: no grammar
//! semantics survive past the compiler, so a backend only needs to put
//! lines, points, and rectangles on panels.

use crate::error::PlotError;
use crate::ir::{DrawCommand, PanelScene, PointShape, SceneGraph, TrainedScale};
use crate::palette::Rgb;
use crate::theme::LegendPosition;
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::HashSet;

/// An opaque rendered image handle.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedImage {
    Png(Vec<u8>),
    Svg(String),
}

impl RenderedImage {
    /// Raw bytes suitable for writing to a file or stream.
    pub fn bytes(&self) -> &[u8] {
        match self {
            RenderedImage::Png(bytes) => bytes,
            RenderedImage::Svg(text) => text.as_bytes(),
        }
    }
}

/// Executes a compiled scene graph.
pub trait Backend {
    fn draw(&self, scene: &SceneGraph) -> Result<RenderedImage, PlotError>;
}

/// Raster backend: draws into an RGB buffer and encodes PNG.
pub struct PngBackend;

impl Backend for PngBackend {
    fn draw(&self, scene: &SceneGraph) -> Result<RenderedImage, PlotError> {
        let (width, height) = (scene.width, scene.height);
        let mut buffer = vec![0u8; (width * height * 3) as usize];

        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            draw_scene(&root, scene)?;
            root.present().map_err(backend_error)?;
        }

        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png)
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .map_err(|e| PlotError::Backend(format!("PNG encoding failed: {e}")))?;
        Ok(RenderedImage::Png(png))
    }
}

/// Vector backend: emits an SVG document.
pub struct SvgBackend;

impl Backend for SvgBackend {
    fn draw(&self, scene: &SceneGraph) -> Result<RenderedImage, PlotError> {
        let mut svg = String::new();
        {
            let root =
                SVGBackend::with_string(&mut svg, (scene.width, scene.height)).into_drawing_area();
            draw_scene(&root, scene)?;
            root.present().map_err(backend_error)?;
        }
        Ok(RenderedImage::Svg(svg))
    }
}

fn backend_error<E: std::fmt::Debug>(error: E) -> PlotError {
    PlotError::Backend(format!("{error:?}"))
}

fn to_rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn to_rgba(color: Rgb, alpha: f64) -> RGBAColor {
    to_rgb(color).mix(alpha)
}

fn draw_scene<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &SceneGraph,
) -> Result<(), PlotError> {
    let theme = &scene.theme;
    root.fill(&to_rgb(theme.plot_background.fill))
        .map_err(backend_error)?;

    let area = match &scene.title {
        Some(title) => root
            .titled(
                title,
                (theme.plot_title.family.as_str(), theme.plot_title.size)
                    .into_font()
                    .color(&to_rgb(theme.plot_title.color)),
            )
            .map_err(backend_error)?,
        None => root.clone(),
    };

    let cells = area.split_evenly((scene.nrow, scene.ncol));
    for panel in &scene.panels {
        let index = panel.row * scene.ncol + panel.col;
        let cell = cells
            .get(index)
            .ok_or_else(|| PlotError::Backend(format!("panel {index} outside the facet grid")))?;
        draw_panel(cell, panel, scene)?;
    }

    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    cell: &DrawingArea<DB, Shift>,
    panel: &PanelScene,
    scene: &SceneGraph,
) -> Result<(), PlotError> {
    let theme = &scene.theme;
    let axis_font = (theme.axis_text.family.as_str(), theme.axis_text.size)
        .into_font()
        .color(&to_rgb(theme.axis_text.color));

    let mut builder = ChartBuilder::on(cell);
    builder
        .margin(8)
        .x_label_area_size(35)
        .y_label_area_size(45);
    if let Some(title) = &panel.title {
        builder.caption(title, axis_font.clone());
    }

    let (xd, yd) = (panel.x_scale.domain, panel.y_scale.domain);
    let mut chart = builder
        .build_cartesian_2d(xd.0..xd.1, yd.0..yd.1)
        .map_err(backend_error)?;

    chart
        .plotting_area()
        .fill(&to_rgb(theme.panel_background.fill))
        .map_err(backend_error)?;

    // Axis mesh and labels
    {
        let x_formatter = category_formatter(&panel.x_scale);
        let y_formatter = category_formatter(&panel.y_scale);

        let mut mesh = chart.configure_mesh();
        mesh.label_style(axis_font.clone());

        match &theme.panel_grid_major {
            Some(line) => {
                mesh.bold_line_style(
                    to_rgba(line.color, 1.0).stroke_width(line.width.round().max(1.0) as u32),
                );
            }
            None => {
                mesh.bold_line_style(TRANSPARENT);
            }
        }
        match &theme.panel_grid_minor {
            Some(line) => {
                mesh.light_line_style(to_rgba(line.color, 0.6));
            }
            None => {
                mesh.light_line_style(TRANSPARENT);
            }
        }
        match &theme.axis_line {
            Some(line) => {
                mesh.axis_style(
                    to_rgba(line.color, 1.0).stroke_width(line.width.round().max(1.0) as u32),
                );
            }
            None => {
                mesh.axis_style(TRANSPARENT);
            }
        }

        if let Some(label) = &panel.x_label {
            mesh.x_desc(label.clone());
        }
        if let Some(label) = &panel.y_label {
            mesh.y_desc(label.clone());
        }

        if panel.x_scale.is_categorical {
            mesh.x_labels(panel.x_scale.categories.len());
            mesh.x_label_formatter(&x_formatter);
        }
        if panel.y_scale.is_categorical {
            mesh.y_labels(panel.y_scale.categories.len());
            mesh.y_label_formatter(&y_formatter);
        }

        mesh.draw().map_err(backend_error)?;
    }

    // Execute the draw commands, collecting legend entries as we go
    let mut labelled: HashSet<String> = HashSet::new();
    for command in &panel.commands {
        match command {
            DrawCommand::Line {
                points,
                style,
                legend,
            } => {
                let color = to_rgba(style.color, style.alpha);
                let series = chart
                    .draw_series(LineSeries::new(
                        points.clone(),
                        color.stroke_width(style.width.round().max(1.0) as u32),
                    ))
                    .map_err(backend_error)?;
                if let Some(name) = legend_name(legend, &mut labelled) {
                    series
                        .label(name)
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color));
                }
            }
            DrawCommand::Point {
                points,
                style,
                legend,
            } => {
                let color = to_rgba(style.color, style.alpha);
                let size = style.size.round().max(1.0) as i32;
                let series = match style.shape {
                    PointShape::Triangle => chart
                        .draw_series(
                            points
                                .iter()
                                .map(|&p| TriangleMarker::new(p, size, color.filled())),
                        )
                        .map_err(backend_error)?,
                    PointShape::Cross => chart
                        .draw_series(
                            points
                                .iter()
                                .map(|&p| Cross::new(p, size, color.stroke_width(1))),
                        )
                        .map_err(backend_error)?,
                    // Squares render as circles; the raster difference
                    // at mark sizes is negligible
                    PointShape::Circle | PointShape::Square => chart
                        .draw_series(
                            points.iter().map(|&p| Circle::new(p, size, color.filled())),
                        )
                        .map_err(backend_error)?,
                };
                if let Some(name) = legend_name(legend, &mut labelled) {
                    series
                        .label(name)
                        .legend(move |(x, y)| Circle::new((x + 8, y), 4, color.filled()));
                }
            }
            DrawCommand::Rect {
                tl,
                br,
                style,
                legend,
            } => {
                let color = to_rgba(style.fill, style.alpha);
                let series = chart
                    .draw_series(std::iter::once(Rectangle::new([*tl, *br], color.filled())))
                    .map_err(backend_error)?;
                if let Some(name) = legend_name(legend, &mut labelled) {
                    series.label(name).legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                    });
                }
            }
        }
    }

    if !labelled.is_empty() && theme.legend_position != LegendPosition::None {
        let position = match theme.legend_position {
            LegendPosition::Right | LegendPosition::None => SeriesLabelPosition::UpperRight,
            LegendPosition::Left => SeriesLabelPosition::UpperLeft,
            LegendPosition::Top => SeriesLabelPosition::UpperMiddle,
            LegendPosition::Bottom => SeriesLabelPosition::LowerMiddle,
        };
        chart
            .configure_series_labels()
            .position(position)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.4))
            .label_font(axis_font)
            .draw()
            .map_err(backend_error)?;
    }

    Ok(())
}

/// Legend label for a command, deduplicated per panel.
fn legend_name(legend: &Option<String>, labelled: &mut HashSet<String>) -> Option<String> {
    let name = legend.as_ref()?;
    if labelled.insert(name.clone()) {
        Some(name.clone())
    } else {
        None
    }
}

/// Tick formatter mapping category indices back to their labels.
fn category_formatter(scale: &TrainedScale) -> impl Fn(&f64) -> String {
    let categories = scale.categories.clone();
    move |value: &f64| {
        let index = value.round();
        if (value - index).abs() > 0.25 || index < 0.0 {
            return String::new();
        }
        categories
            .get(index as usize)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FillStyle, LineStyle};
    use crate::theme::Theme;

    fn make_scene(commands: Vec<DrawCommand>) -> SceneGraph {
        SceneGraph {
            width: 320,
            height: 240,
            nrow: 1,
            ncol: 1,
            panels: vec![PanelScene {
                row: 0,
                col: 0,
                title: None,
                x_label: Some("x".to_string()),
                y_label: Some("y".to_string()),
                x_scale: TrainedScale::linear((0.0, 10.0)),
                y_scale: TrainedScale::linear((0.0, 10.0)),
                commands,
            }],
            title: Some("test".to_string()),
            theme: Theme::default().resolve(),
        }
    }

    #[test]
    fn test_png_backend_emits_png() {
        let scene = make_scene(vec![DrawCommand::Line {
            points: vec![(0.0, 0.0), (10.0, 10.0)],
            style: LineStyle {
                color: Rgb(31, 119, 180),
                width: 1.0,
                alpha: 1.0,
            },
            legend: Some("series".to_string()),
        }]);
        let image = PngBackend.draw(&scene).unwrap();
        match image {
            RenderedImage::Png(bytes) => {
                assert_eq!(&bytes[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_svg_backend_emits_document() {
        let scene = make_scene(vec![DrawCommand::Rect {
            tl: (1.0, 9.0),
            br: (9.0, 1.0),
            style: FillStyle {
                fill: Rgb(200, 30, 30),
                alpha: 0.5,
            },
            legend: None,
        }]);
        let image = SvgBackend.draw(&scene).unwrap();
        match image {
            RenderedImage::Svg(svg) => {
                assert!(svg.contains("<svg"));
                assert!(svg.contains("rect") || svg.contains("polygon"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_category_formatter() {
        let scale = TrainedScale {
            is_categorical: true,
            categories: vec!["low".to_string(), "high".to_string()],
            ..TrainedScale::linear((-0.5, 1.5))
        };
        let formatter = category_formatter(&scale);
        assert_eq!(formatter(&0.0), "low");
        assert_eq!(formatter(&1.02), "high");
        assert_eq!(formatter(&0.5), "");
    }
}
