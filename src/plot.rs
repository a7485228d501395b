//! The plot specification accumulator and its composition operator.
//!
//! A `PlotSpec` is never mutated in place: `compose` returns a new
//! specification together with any warnings, so a saved base plot can be
//! branched into several variations.

use crate::coord::CoordKind;
use crate::data::Dataset;
use crate::error::{SingletonField, Warning};
use crate::facet::FacetSpec;
use crate::layer::Layer;
use crate::mapping::{Channel, Mapping};
use crate::scale::ScaleSpec;
use crate::theme::Theme;
use std::collections::BTreeMap;
use std::ops::Add;

/// Plot title and axis labels. Composing labels merges field-wise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels {
    pub title: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
}

impl Labels {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn x(mut self, label: impl Into<String>) -> Self {
        self.x = Some(label.into());
        self
    }

    #[must_use]
    pub fn y(mut self, label: impl Into<String>) -> Self {
        self.y = Some(label.into());
        self
    }
}

/// Shorthand constructor mirroring the `labs(...)` call of the grammar.
#[must_use]
pub fn labs() -> Labels {
    Labels::new()
}

/// Anything that can be added to a plot specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Layer(Layer),
    Scale(ScaleSpec),
    Coord(CoordKind),
    Facet(FacetSpec),
    Theme(Theme),
    Labels(Labels),
}

impl From<Layer> for Component {
    fn from(layer: Layer) -> Self {
        Component::Layer(layer)
    }
}

impl From<ScaleSpec> for Component {
    fn from(scale: ScaleSpec) -> Self {
        Component::Scale(scale)
    }
}

impl From<CoordKind> for Component {
    fn from(coord: CoordKind) -> Self {
        Component::Coord(coord)
    }
}

impl From<FacetSpec> for Component {
    fn from(facet: FacetSpec) -> Self {
        Component::Facet(facet)
    }
}

impl From<Theme> for Component {
    fn from(theme: Theme) -> Self {
        Component::Theme(theme)
    }
}

impl From<Labels> for Component {
    fn from(labels: Labels) -> Self {
        Component::Labels(labels)
    }
}

/// A complete plot specification: data, default mapping, layers, and the
/// global scale/coordinate/facet/theme state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub data: Dataset,
    pub mapping: Mapping,
    pub layers: Vec<Layer>,
    pub scales: BTreeMap<Channel, ScaleSpec>,
    pub coord: Option<CoordKind>,
    pub facet: Option<FacetSpec>,
    pub theme: Option<Theme>,
    pub labels: Labels,
}

impl PlotSpec {
    /// Start a specification from a dataset and a default mapping.
    #[must_use]
    pub fn new(data: Dataset, mapping: Mapping) -> Self {
        PlotSpec {
            data,
            mapping,
            layers: Vec::new(),
            scales: BTreeMap::new(),
            coord: None,
            facet: None,
            theme: None,
            labels: Labels::default(),
        }
    }

    /// Combine this specification with a component, producing a new
    /// specification plus any override warnings. `self` is untouched.
    pub fn compose(&self, component: impl Into<Component>) -> Composed {
        let mut spec = self.clone();
        let mut warnings = Vec::new();

        match component.into() {
            Component::Layer(layer) => {
                spec.layers.push(layer);
            }
            Component::Scale(scale) => {
                if spec.scales.insert(scale.channel, scale.clone()).is_some() {
                    warnings.push(Warning::ScaleOverride {
                        channel: scale.channel,
                    });
                }
            }
            Component::Coord(coord) => {
                if spec.coord.is_some() {
                    warnings.push(Warning::SingletonOverride {
                        field: SingletonField::Coord,
                    });
                }
                spec.coord = Some(coord);
            }
            Component::Facet(facet) => {
                if spec.facet.is_some() {
                    warnings.push(Warning::SingletonOverride {
                        field: SingletonField::Facet,
                    });
                }
                spec.facet = Some(facet);
            }
            Component::Theme(theme) => {
                if spec.theme.is_some() {
                    warnings.push(Warning::SingletonOverride {
                        field: SingletonField::Theme,
                    });
                }
                spec.theme = Some(theme);
            }
            Component::Labels(labels) => {
                // Labels are additive chrome; merge without warning
                if labels.title.is_some() {
                    spec.labels.title = labels.title;
                }
                if labels.x.is_some() {
                    spec.labels.x = labels.x;
                }
                if labels.y.is_some() {
                    spec.labels.y = labels.y;
                }
            }
        }

        for warning in &warnings {
            log::warn!("{warning}");
        }

        Composed { spec, warnings }
    }
}

/// The result of a composition: the new specification plus zero or more
/// warnings. Warnings accumulate across a `+` chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    pub spec: PlotSpec,
    pub warnings: Vec<Warning>,
}

impl Composed {
    pub fn then(mut self, component: impl Into<Component>) -> Composed {
        let next = self.spec.compose(component);
        self.warnings.extend(next.warnings);
        Composed {
            spec: next.spec,
            warnings: self.warnings,
        }
    }

    pub fn into_spec(self) -> PlotSpec {
        self.spec
    }
}

impl From<PlotSpec> for Composed {
    fn from(spec: PlotSpec) -> Self {
        Composed {
            spec,
            warnings: Vec::new(),
        }
    }
}

impl<C: Into<Component>> Add<C> for PlotSpec {
    type Output = Composed;

    fn add(self, component: C) -> Composed {
        self.compose(component)
    }
}

impl<C: Into<Component>> Add<C> for &PlotSpec {
    type Output = Composed;

    fn add(self, component: C) -> Composed {
        self.compose(component)
    }
}

impl<C: Into<Component>> Add<C> for Composed {
    type Output = Composed;

    fn add(self, component: C) -> Composed {
        self.then(component)
    }
}

/// Shorthand constructor mirroring the `ggplot(data, aes(...))` call.
#[must_use]
pub fn ggplot(data: Dataset, mapping: Mapping) -> PlotSpec {
    PlotSpec::new(data, mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{geom_histogram, geom_line, geom_point};
    use crate::mapping::aes;

    fn make_base() -> PlotSpec {
        let data = Dataset::new(
            vec!["x".to_string(), "y".to_string()],
            vec![vec!["1".to_string(), "2".to_string()]],
        );
        PlotSpec::new(data, aes().x("x").y("y"))
    }

    #[test]
    fn test_layer_appends() {
        let composed = make_base() + geom_point() + geom_line();
        assert!(composed.warnings.is_empty());
        assert_eq!(composed.spec.layers.len(), 2);
    }

    #[test]
    fn test_compose_is_pure() {
        let base = make_base();
        let _ = base.compose(Component::Layer(geom_point()));
        let _ = base.compose(Component::Coord(CoordKind::Flip));
        assert!(base.layers.is_empty());
        assert!(base.coord.is_none());
    }

    #[test]
    fn test_branching_a_saved_plot() {
        let base = (make_base() + geom_point()).into_spec();
        let flipped = (&base + CoordKind::Flip).into_spec();
        let faceted = (&base + FacetSpec::grid().rows("x")).into_spec();
        assert!(flipped.facet.is_none());
        assert!(faceted.coord.is_none());
        assert!(base.coord.is_none() && base.facet.is_none());
    }

    #[test]
    fn test_scale_override_warns_once() {
        let first = ScaleSpec::continuous(Channel::X).name("first");
        let second = ScaleSpec::continuous(Channel::X).name("second");
        let composed = make_base() + first + second;
        assert_eq!(composed.warnings.len(), 1);
        assert_eq!(
            composed.warnings[0],
            Warning::ScaleOverride { channel: Channel::X }
        );
        // Full replacement: the second scale's name wins outright
        assert_eq!(
            composed.spec.scales[&Channel::X].name.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_singleton_override_warns() {
        let composed = make_base() + CoordKind::Flip + CoordKind::Polar;
        assert_eq!(composed.warnings.len(), 1);
        assert_eq!(composed.spec.coord, Some(CoordKind::Polar));
    }

    #[test]
    fn test_first_singleton_set_does_not_warn() {
        let composed = make_base() + Theme::new();
        assert!(composed.warnings.is_empty());
    }

    #[test]
    fn test_non_overlapping_components_commute() {
        let histogram = geom_histogram();
        let scale = ScaleSpec::continuous(Channel::Y).name("count");
        let ab = make_base() + histogram.clone() + scale.clone();
        let ba = make_base() + scale + histogram;
        assert_eq!(ab.spec, ba.spec);
        assert!(ab.warnings.is_empty() && ba.warnings.is_empty());
    }

    #[test]
    fn test_labels_merge() {
        let composed = make_base() + labs().title("Title").x("X") + labs().y("Y");
        assert!(composed.warnings.is_empty());
        let labels = &composed.spec.labels;
        assert_eq!(labels.title.as_deref(), Some("Title"));
        assert_eq!(labels.x.as_deref(), Some("X"));
        assert_eq!(labels.y.as_deref(), Some("Y"));
    }
}
