//! Theme overrides and their resolution into concrete chrome styles.
//!
//! Elements form an inheritance hierarchy: specific elements inherit
//! from the root `text`/`line`/`rect` elements, which inherit from
//! hardcoded defaults. `Blank` removes an element entirely.
//!
//! ```text
//! text
//! ├── plot_title
//! └── axis_text
//!
//! rect
//! ├── plot_background
//! └── panel_background
//!
//! line
//! ├── axis_line
//! ├── axis_ticks
//! └── panel_grid_major
//!     └── panel_grid_minor
//! ```

use crate::palette::{parse_color, Rgb};

/// A partial line style; unset fields inherit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementLine {
    pub color: Option<String>,
    pub width: Option<f64>,
    pub linetype: Option<String>,
}

/// A partial rectangle style; unset fields inherit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementRect {
    pub fill: Option<String>,
    pub color: Option<String>,
    pub width: Option<f64>,
}

/// A partial text style; unset fields inherit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementText {
    pub family: Option<String>,
    pub color: Option<String>,
    pub size: Option<f64>,
    pub face: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ThemeElement {
    #[default]
    Inherit,
    Blank,
    Line(ElementLine),
    Rect(ElementRect),
    Text(ElementText),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    #[default]
    Right,
    Left,
    Top,
    Bottom,
    None,
}

impl LegendPosition {
    pub fn parse(name: &str) -> Option<LegendPosition> {
        match name {
            "right" => Some(LegendPosition::Right),
            "left" => Some(LegendPosition::Left),
            "top" => Some(LegendPosition::Top),
            "bottom" => Some(LegendPosition::Bottom),
            "none" => Some(LegendPosition::None),
            _ => None,
        }
    }
}

/// Theme overrides for plot chrome. All elements default to `Inherit`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Theme {
    pub line: ThemeElement,
    pub rect: ThemeElement,
    pub text: ThemeElement,
    pub plot_background: ThemeElement,
    pub plot_title: ThemeElement,
    pub panel_background: ThemeElement,
    pub panel_grid_major: ThemeElement,
    pub panel_grid_minor: ThemeElement,
    pub axis_text: ThemeElement,
    pub axis_line: ThemeElement,
    pub axis_ticks: ThemeElement,
    pub legend_position: LegendPosition,
}

impl Theme {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// === Resolved styles (no Options - fully concrete) ===

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedText {
    pub family: String,
    pub color: Rgb,
    pub size: f64,
    pub face: FontFace,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLine {
    pub color: Rgb,
    pub width: f64,
    pub linetype: LineType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRect {
    pub fill: Rgb,
    pub border_color: Option<Rgb>,
    pub border_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Plain,
    Bold,
    Italic,
    BoldItalic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Solid,
    Dashed,
    Dotted,
}

/// Fully resolved theme handed to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTheme {
    pub plot_background: ResolvedRect,
    pub panel_background: ResolvedRect,
    pub plot_title: ResolvedText,
    pub panel_grid_major: Option<ResolvedLine>,
    pub panel_grid_minor: Option<ResolvedLine>,
    pub axis_text: ResolvedText,
    pub axis_line: Option<ResolvedLine>,
    pub axis_ticks: Option<ResolvedLine>,
    pub legend_position: LegendPosition,
}

impl Default for ResolvedText {
    fn default() -> Self {
        ResolvedText {
            family: "sans-serif".to_string(),
            color: Rgb::BLACK,
            size: 12.0,
            face: FontFace::Plain,
        }
    }
}

impl Default for ResolvedLine {
    fn default() -> Self {
        ResolvedLine {
            color: Rgb(200, 200, 200),
            width: 1.0,
            linetype: LineType::Solid,
        }
    }
}

impl Default for ResolvedRect {
    fn default() -> Self {
        ResolvedRect {
            fill: Rgb::WHITE,
            border_color: None,
            border_width: 0.0,
        }
    }
}

fn parse_face(face: &str) -> FontFace {
    match face.to_lowercase().as_str() {
        "bold" => FontFace::Bold,
        "italic" => FontFace::Italic,
        "bold.italic" | "bolditalic" => FontFace::BoldItalic,
        _ => FontFace::Plain,
    }
}

fn parse_linetype(linetype: &str) -> LineType {
    match linetype.to_lowercase().as_str() {
        "dashed" | "dash" => LineType::Dashed,
        "dotted" | "dot" => LineType::Dotted,
        _ => LineType::Solid,
    }
}

impl Theme {
    /// Resolve the overrides into concrete styles.
    ///
    /// Resolution order per element: the specific element, then its root
    /// (`text`/`line`/`rect`), then the hardcoded default. Grid minor
    /// lines additionally inherit from grid major, at half width unless
    /// given one.
    pub fn resolve(&self) -> ResolvedTheme {
        let base_text = {
            let mut base = ResolvedText::default();
            if let ThemeElement::Text(t) = &self.text {
                apply_text_overrides(&mut base, t);
            }
            base
        };
        let base_line = {
            let mut base = ResolvedLine::default();
            if let ThemeElement::Line(l) = &self.line {
                apply_line_overrides(&mut base, l);
            }
            base
        };
        let base_rect = {
            let mut base = ResolvedRect::default();
            if let ThemeElement::Rect(r) = &self.rect {
                apply_rect_overrides(&mut base, r);
            }
            base
        };

        let panel_grid_major = resolve_optional_line(&self.panel_grid_major, &base_line);
        let panel_grid_minor = match &self.panel_grid_minor {
            ThemeElement::Blank => None,
            ThemeElement::Line(l) => {
                let mut resolved = panel_grid_major.clone().unwrap_or_default();
                apply_line_overrides(&mut resolved, l);
                if l.width.is_none() {
                    resolved.width *= 0.5;
                }
                Some(resolved)
            }
            _ => panel_grid_major.as_ref().map(|major| {
                let mut resolved = major.clone();
                resolved.width *= 0.5;
                resolved
            }),
        };

        ResolvedTheme {
            plot_background: resolve_rect(&self.plot_background, &base_rect),
            panel_background: resolve_rect(&self.panel_background, &base_rect),
            plot_title: {
                let mut title = resolve_text(&self.plot_title, &base_text);
                // Titles default larger than body text unless overridden
                if !matches!(&self.plot_title, ThemeElement::Text(t) if t.size.is_some()) {
                    title.size = (title.size * 1.5).round();
                }
                title
            },
            panel_grid_major,
            panel_grid_minor,
            axis_text: resolve_text(&self.axis_text, &base_text),
            axis_line: resolve_optional_line(&self.axis_line, &base_line),
            axis_ticks: resolve_optional_line(&self.axis_ticks, &base_line),
            legend_position: self.legend_position,
        }
    }
}

fn resolve_text(element: &ThemeElement, base: &ResolvedText) -> ResolvedText {
    match element {
        ThemeElement::Text(t) => {
            let mut resolved = base.clone();
            apply_text_overrides(&mut resolved, t);
            resolved
        }
        // Blank makes no sense for mandatory text, treat as inherit
        _ => base.clone(),
    }
}

fn resolve_rect(element: &ThemeElement, base: &ResolvedRect) -> ResolvedRect {
    match element {
        ThemeElement::Rect(r) => {
            let mut resolved = base.clone();
            apply_rect_overrides(&mut resolved, r);
            resolved
        }
        _ => base.clone(),
    }
}

fn resolve_optional_line(element: &ThemeElement, base: &ResolvedLine) -> Option<ResolvedLine> {
    match element {
        ThemeElement::Blank => None,
        ThemeElement::Line(l) => {
            let mut resolved = base.clone();
            apply_line_overrides(&mut resolved, l);
            Some(resolved)
        }
        _ => Some(base.clone()),
    }
}

fn apply_text_overrides(resolved: &mut ResolvedText, element: &ElementText) {
    if let Some(family) = &element.family {
        resolved.family = family.clone();
    }
    if let Some(color) = element.color.as_deref().and_then(parse_color) {
        resolved.color = color;
    }
    if let Some(size) = element.size {
        resolved.size = size;
    }
    if let Some(face) = &element.face {
        resolved.face = parse_face(face);
    }
}

fn apply_line_overrides(resolved: &mut ResolvedLine, element: &ElementLine) {
    if let Some(color) = element.color.as_deref().and_then(parse_color) {
        resolved.color = color;
    }
    if let Some(width) = element.width {
        resolved.width = width;
    }
    if let Some(linetype) = &element.linetype {
        resolved.linetype = parse_linetype(linetype);
    }
}

fn apply_rect_overrides(resolved: &mut ResolvedRect, element: &ElementRect) {
    if let Some(fill) = element.fill.as_deref().and_then(parse_color) {
        resolved.fill = fill;
    }
    if let Some(color) = element.color.as_deref().and_then(parse_color) {
        resolved.border_color = Some(color);
    }
    if let Some(width) = element.width {
        resolved.border_width = width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_default_theme() {
        let resolved = Theme::default().resolve();
        assert_eq!(resolved.plot_background.fill, Rgb::WHITE);
        assert_eq!(resolved.axis_text.color, Rgb::BLACK);
        assert!(resolved.panel_grid_major.is_some());
        assert_eq!(resolved.legend_position, LegendPosition::Right);
    }

    #[test]
    fn test_blank_removes_elements() {
        let theme = Theme {
            axis_line: ThemeElement::Blank,
            panel_grid_major: ThemeElement::Blank,
            ..Theme::default()
        };
        let resolved = theme.resolve();
        assert!(resolved.axis_line.is_none());
        assert!(resolved.panel_grid_major.is_none());
        // Minor grid inherits from major, which is gone
        assert!(resolved.panel_grid_minor.is_none());
    }

    #[test]
    fn test_inheritance_from_root_text() {
        let theme = Theme {
            text: ThemeElement::Text(ElementText {
                color: Some("blue".to_string()),
                ..ElementText::default()
            }),
            ..Theme::default()
        };
        let resolved = theme.resolve();
        assert_eq!(resolved.axis_text.color, Rgb(0, 0, 255));
        assert_eq!(resolved.plot_title.color, Rgb(0, 0, 255));
    }

    #[test]
    fn test_custom_title() {
        let theme = Theme {
            plot_title: ThemeElement::Text(ElementText {
                size: Some(24.0),
                face: Some("bold".to_string()),
                ..ElementText::default()
            }),
            ..Theme::default()
        };
        let resolved = theme.resolve();
        assert_eq!(resolved.plot_title.size, 24.0);
        assert_eq!(resolved.plot_title.face, FontFace::Bold);
    }

    #[test]
    fn test_minor_grid_half_width() {
        let theme = Theme {
            panel_grid_major: ThemeElement::Line(ElementLine {
                width: Some(2.0),
                ..ElementLine::default()
            }),
            ..Theme::default()
        };
        let resolved = theme.resolve();
        assert_eq!(resolved.panel_grid_minor.unwrap().width, 1.0);
    }
}
