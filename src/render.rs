//! The render dispatch: resolve, facet, transform, train scales,
//! compile, and hand the scene to a backend.
//!
//! Configuration errors halt only the layer that caused them; sibling
//! layers keep rendering and the failures are reported alongside the
//! image. Warnings never halt anything.

use crate::backend::{Backend, PngBackend, RenderedImage, SvgBackend};
use crate::compile::compile_scene;
use crate::error::{LayerFailure, PlotError, Warning};
use crate::facet::{cell_data, facet_grid, FacetSpec};
use crate::ir::{FacetLayout, PanelData, RenderData};
use crate::mapping::Channel;
use crate::plot::PlotSpec;
use crate::resolve::resolve_spec;
use crate::scale::train_scales;
use crate::transform::build_layer_data;
use crate::{OutputFormat, RenderOptions};

/// The outcome of a render: the image plus everything non-fatal that
/// happened along the way.
#[derive(Debug)]
pub struct RenderReport {
    pub image: RenderedImage,
    pub warnings: Vec<Warning>,
    pub failures: Vec<LayerFailure>,
}

/// Render a specification with the backend selected by the options.
pub fn render(spec: &PlotSpec, options: &RenderOptions) -> Result<RenderReport, PlotError> {
    match options.format {
        OutputFormat::Png => render_with(spec, options, &PngBackend),
        OutputFormat::Svg => render_with(spec, options, &SvgBackend),
    }
}

/// Render a specification with an explicit backend.
pub fn render_with(
    spec: &PlotSpec,
    options: &RenderOptions,
    backend: &dyn Backend,
) -> Result<RenderReport, PlotError> {
    if spec.layers.is_empty() {
        return Err(PlotError::EmptyPlot);
    }

    // 1. Resolution: defaults, mappings, validation
    let resolution = resolve_spec(spec);
    let mut failures = resolution.failures;
    let warnings = resolution.warnings;
    if resolution.layers.is_empty() {
        let first = failures
            .into_iter()
            .next()
            .map(|f| f.error)
            .unwrap_or(PlotError::EmptyPlot);
        return Err(PlotError::AllLayersFailed(Box::new(first)));
    }

    // 2. Facet partition
    let grid = facet_grid(&spec.data, spec.facet.as_ref())?;
    let facet = spec.facet.clone().unwrap_or_else(FacetSpec::grid);
    log::debug!("facet grid: {} x {} panels", grid.nrow, grid.ncol);

    // 3. Statistic transforms, per layer per cell. A layer that fails in
    // any cell is dropped everywhere and reported once.
    let fill_scale = spec.scales.get(&Channel::Fill);
    let mut kept_layers = Vec::new();
    let mut per_layer_cells = Vec::new();

    for layer in &resolution.layers {
        let base = layer.data.as_ref().unwrap_or(&spec.data);
        let mut cells = Vec::with_capacity(grid.cells.len());
        let mut failed = false;

        for cell in &grid.cells {
            let subset = cell_data(base, cell, &facet);
            match build_layer_data(layer, &subset, fill_scale) {
                Ok(layer_data) => cells.push(layer_data),
                Err(error) => {
                    log::warn!("layer {} failed to transform: {error}", layer.index);
                    failures.push(LayerFailure {
                        layer: layer.index,
                        error,
                    });
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            kept_layers.push(layer.clone());
            per_layer_cells.push(cells);
        }
    }

    if kept_layers.is_empty() {
        let first = failures
            .into_iter()
            .next()
            .map(|f| f.error)
            .unwrap_or(PlotError::EmptyPlot);
        return Err(PlotError::AllLayersFailed(Box::new(first)));
    }

    let panels = (0..grid.cells.len())
        .map(|index| PanelData {
            index,
            layers: per_layer_cells
                .iter()
                .map(|cells| cells[index].clone())
                .collect(),
        })
        .collect();
    let render_data = RenderData {
        panels,
        layout: FacetLayout {
            nrow: grid.nrow,
            ncol: grid.ncol,
            titles: grid.cells.iter().map(|c| c.title.clone()).collect(),
        },
    };

    // 4. Scale training, 5. compilation, 6. backend execution
    let scales = train_scales(&render_data, spec);
    let scene = compile_scene(render_data, scales, spec, &kept_layers, options);
    let image = backend.draw(&scene)?;

    log::debug!(
        "rendered {} panels, {} warnings, {} layer failures",
        scene.panels.len(),
        warnings.len(),
        failures.len()
    );

    Ok(RenderReport {
        image,
        warnings,
        failures,
    })
}
