//! Resolution: fill every layer's unset fields from the declared
//! defaults, overlay mappings, validate channels and variables, and
//! apply the implicit grouping rules.

use crate::error::{LayerFailure, PlotError, Warning};
use crate::ir::ResolvedLayer;
use crate::layer::{GeomKind, Layer, StatKind};
use crate::mapping::Channel;
use crate::plot::PlotSpec;

/// Outcome of resolving a whole specification. Layers that fail are
/// reported individually; siblings keep going.
#[derive(Debug)]
pub struct Resolution {
    pub layers: Vec<ResolvedLayer>,
    pub failures: Vec<LayerFailure>,
    pub warnings: Vec<Warning>,
}

/// Resolve every layer of the specification.
pub fn resolve_spec(spec: &PlotSpec) -> Resolution {
    let mut layers = Vec::new();
    let mut failures = Vec::new();
    let mut warnings = Vec::new();

    for (index, layer) in spec.layers.iter().enumerate() {
        match resolve_layer(index, layer, spec) {
            Ok((resolved, mut layer_warnings)) => {
                layers.push(resolved);
                warnings.append(&mut layer_warnings);
            }
            Err(error) => {
                log::warn!("layer {index} failed to resolve: {error}");
                failures.push(LayerFailure { layer: index, error });
            }
        }
    }

    log::debug!(
        "resolved {} of {} layers ({} warnings)",
        layers.len(),
        spec.layers.len(),
        warnings.len()
    );

    Resolution {
        layers,
        failures,
        warnings,
    }
}

fn resolve_layer(
    index: usize,
    layer: &Layer,
    spec: &PlotSpec,
) -> Result<(ResolvedLayer, Vec<Warning>), PlotError> {
    let geom = layer.geom;
    let stat = layer.stat.unwrap_or_else(|| geom.default_stat());
    let position = layer.position.unwrap_or_else(|| geom.default_position());
    let mapping = spec.mapping.overlay(&layer.mapping);

    // Required channels must be mapped at layer or plot level
    for &channel in required_channels(geom, stat) {
        if !mapping.contains(channel) {
            return Err(PlotError::MissingChannel {
                channel,
                geom,
                stat,
            });
        }
    }

    // Every mapped variable must exist as a column of the dataset the
    // layer resolves against
    let data = layer.data.as_ref().unwrap_or(&spec.data);
    for (channel, variable) in mapping.iter() {
        if !data.has_column(variable) {
            return Err(PlotError::UnknownVariable {
                channel,
                variable: variable.to_string(),
            });
        }
    }

    // Grouping: explicit `group` wins; otherwise the first mapped entry
    // of the geometry's implicit-grouping rule table establishes it
    let group_by = mapping
        .get(Channel::Group)
        .map(str::to_string)
        .or_else(|| {
            geom.implicit_group_channels()
                .iter()
                .find_map(|&channel| mapping.get(channel))
                .map(str::to_string)
        });

    let mut warnings = Vec::new();
    if stat == StatKind::Bin
        && layer.param_f64("binwidth").is_none()
        && layer.param_usize("bins").is_none()
    {
        // No universal bin width exists; warn and continue on a heuristic
        let warning = Warning::DefaultFallback {
            stat,
            param: "binwidth".to_string(),
            fallback: format!("{} bins", crate::transform::DEFAULT_BINS),
        };
        log::warn!("{warning}");
        warnings.push(warning);
    }

    Ok((
        ResolvedLayer {
            index,
            geom,
            stat,
            position,
            mapping,
            group_by,
            data: layer.data.clone(),
            params: layer.params.clone(),
        },
        warnings,
    ))
}

/// Channels a geometry/statistic pair cannot proceed without.
///
/// Counting statistics derive y themselves; a bar drawn from raw values
/// (stat identity) needs y mapped explicitly.
fn required_channels(geom: GeomKind, stat: StatKind) -> &'static [Channel] {
    if geom == GeomKind::Bar && stat == StatKind::Identity {
        return &[Channel::X, Channel::Y];
    }
    geom.required_channels()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::layer::{geom_bar, geom_contour, geom_histogram, geom_line, geom_point, PositionKind};
    use crate::mapping::aes;

    fn make_spec(layers: Vec<Layer>) -> PlotSpec {
        let data = Dataset::new(
            vec!["conc".to_string(), "uptake".to_string(), "Plant".to_string()],
            vec![vec!["95".to_string(), "16".to_string(), "Qn1".to_string()]],
        );
        let mut spec = PlotSpec::new(data, aes().x("conc").y("uptake"));
        spec.layers = layers;
        spec
    }

    #[test]
    fn test_defaults_filled_from_geom() {
        let spec = make_spec(vec![geom_histogram().param("binwidth", 0.2)]);
        let resolution = resolve_spec(&spec);
        assert!(resolution.failures.is_empty());
        let layer = &resolution.layers[0];
        assert_eq!(layer.stat, StatKind::Bin);
        assert_eq!(layer.position, PositionKind::Stack);
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_missing_channel_names_geom_and_stat() {
        // Contour requires z, which is never mapped
        let spec = make_spec(vec![geom_contour()]);
        let resolution = resolve_spec(&spec);
        assert!(resolution.layers.is_empty());
        assert_eq!(resolution.failures.len(), 1);
        match &resolution.failures[0].error {
            PlotError::MissingChannel { channel, geom, stat } => {
                assert_eq!(*channel, Channel::Z);
                assert_eq!(*geom, GeomKind::Contour);
                assert_eq!(*stat, StatKind::Contour);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sibling_layers_survive_one_failure() {
        let spec = make_spec(vec![geom_point(), geom_contour()]);
        let resolution = resolve_spec(&spec);
        assert_eq!(resolution.layers.len(), 1);
        assert_eq!(resolution.failures.len(), 1);
        assert_eq!(resolution.failures[0].layer, 1);
    }

    #[test]
    fn test_unknown_variable() {
        let layer = geom_point().mapping(aes().colour("Species"));
        let spec = make_spec(vec![layer]);
        let resolution = resolve_spec(&spec);
        match &resolution.failures[0].error {
            PlotError::UnknownVariable { channel, variable } => {
                assert_eq!(*channel, Channel::Colour);
                assert_eq!(variable, "Species");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_colour_implies_grouping_for_lines() {
        let layer = geom_line().mapping(aes().colour("Plant"));
        let spec = make_spec(vec![layer]);
        let resolution = resolve_spec(&spec);
        assert_eq!(resolution.layers[0].group_by.as_deref(), Some("Plant"));
    }

    #[test]
    fn test_explicit_group_wins_over_colour() {
        let layer = geom_line().mapping(aes().colour("Plant").group("conc"));
        let spec = make_spec(vec![layer]);
        let resolution = resolve_spec(&spec);
        assert_eq!(resolution.layers[0].group_by.as_deref(), Some("conc"));
    }

    #[test]
    fn test_group_alone_groups_without_encoding() {
        let layer = geom_line().mapping(aes().group("Plant"));
        let spec = make_spec(vec![layer]);
        let resolution = resolve_spec(&spec);
        assert_eq!(resolution.layers[0].group_by.as_deref(), Some("Plant"));
    }

    #[test]
    fn test_bin_without_width_warns_and_proceeds() {
        let spec = make_spec(vec![geom_histogram()]);
        let resolution = resolve_spec(&spec);
        assert!(resolution.failures.is_empty());
        assert_eq!(resolution.warnings.len(), 1);
        assert!(matches!(
            resolution.warnings[0],
            Warning::DefaultFallback { stat: StatKind::Bin, .. }
        ));
    }

    #[test]
    fn test_bar_identity_requires_y() {
        let mut spec = make_spec(vec![geom_bar().stat(StatKind::Identity)]);
        spec.mapping = aes().x("Plant");
        let resolution = resolve_spec(&spec);
        assert!(matches!(
            resolution.failures[0].error,
            PlotError::MissingChannel { channel: Channel::Y, .. }
        ));
    }
}
