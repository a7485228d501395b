//! Aesthetic channels and mapping tables.

use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of visual channels a variable can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    X,
    Y,
    Z,
    Colour,
    Fill,
    Size,
    Shape,
    Alpha,
    Group,
}

impl Channel {
    pub fn name(&self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Z => "z",
            Channel::Colour => "colour",
            Channel::Fill => "fill",
            Channel::Size => "size",
            Channel::Shape => "shape",
            Channel::Alpha => "alpha",
            Channel::Group => "group",
        }
    }

    /// Parse a channel name; both spellings of colour are accepted.
    pub fn parse(name: &str) -> Option<Channel> {
        match name.to_lowercase().as_str() {
            "x" => Some(Channel::X),
            "y" => Some(Channel::Y),
            "z" => Some(Channel::Z),
            "colour" | "color" => Some(Channel::Colour),
            "fill" => Some(Channel::Fill),
            "size" => Some(Channel::Size),
            "shape" => Some(Channel::Shape),
            "alpha" => Some(Channel::Alpha),
            "group" => Some(Channel::Group),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bindings from channels to variable names.
///
/// Keys are unique by construction. A plot carries a default mapping and
/// each layer may carry its own; [`Mapping::overlay`] merges them with
/// the layer entry winning per channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: BTreeMap<Channel, String>,
}

impl Mapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a channel to a variable, replacing any existing binding.
    #[must_use]
    pub fn set(mut self, channel: Channel, variable: impl Into<String>) -> Self {
        self.entries.insert(channel, variable.into());
        self
    }

    #[must_use]
    pub fn x(self, variable: impl Into<String>) -> Self {
        self.set(Channel::X, variable)
    }

    #[must_use]
    pub fn y(self, variable: impl Into<String>) -> Self {
        self.set(Channel::Y, variable)
    }

    #[must_use]
    pub fn z(self, variable: impl Into<String>) -> Self {
        self.set(Channel::Z, variable)
    }

    #[must_use]
    pub fn colour(self, variable: impl Into<String>) -> Self {
        self.set(Channel::Colour, variable)
    }

    #[must_use]
    pub fn fill(self, variable: impl Into<String>) -> Self {
        self.set(Channel::Fill, variable)
    }

    #[must_use]
    pub fn size(self, variable: impl Into<String>) -> Self {
        self.set(Channel::Size, variable)
    }

    #[must_use]
    pub fn shape(self, variable: impl Into<String>) -> Self {
        self.set(Channel::Shape, variable)
    }

    #[must_use]
    pub fn alpha(self, variable: impl Into<String>) -> Self {
        self.set(Channel::Alpha, variable)
    }

    #[must_use]
    pub fn group(self, variable: impl Into<String>) -> Self {
        self.set(Channel::Group, variable)
    }

    pub fn get(&self, channel: Channel) -> Option<&str> {
        self.entries.get(&channel).map(String::as_str)
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.entries.contains_key(&channel)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &str)> {
        self.entries.iter().map(|(c, v)| (*c, v.as_str()))
    }

    /// Overlay `layer` on top of `self`: entries present in both resolve
    /// to the layer's binding.
    #[must_use]
    pub fn overlay(&self, layer: &Mapping) -> Mapping {
        let mut entries = self.entries.clone();
        for (channel, variable) in &layer.entries {
            entries.insert(*channel, variable.clone());
        }
        Mapping { entries }
    }
}

/// Shorthand constructor mirroring the `aes(...)` call of the grammar.
#[must_use]
pub fn aes() -> Mapping {
    Mapping::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        assert_eq!(Channel::parse("colour"), Some(Channel::Colour));
        assert_eq!(Channel::parse("color"), Some(Channel::Colour));
        assert_eq!(Channel::parse("X"), Some(Channel::X));
        assert_eq!(Channel::parse("theta"), None);
    }

    #[test]
    fn test_set_replaces() {
        let m = aes().x("a").x("b");
        assert_eq!(m.get(Channel::X), Some("b"));
    }

    #[test]
    fn test_overlay_layer_wins() {
        let plot = aes().x("conc").y("uptake").colour("Plant");
        let layer = aes().colour("Type");
        let effective = plot.overlay(&layer);
        assert_eq!(effective.get(Channel::Colour), Some("Type"));
        assert_eq!(effective.get(Channel::X), Some("conc"));
    }

    #[test]
    fn test_overlay_does_not_mutate() {
        let plot = aes().x("a");
        let layer = aes().x("b");
        let _ = plot.overlay(&layer);
        assert_eq!(plot.get(Channel::X), Some("a"));
    }
}
