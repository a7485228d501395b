//! Coordinate systems. The coordinate transform is the last spatial step
//! of compilation: geometry positions are computed in data space first,
//! then flipped or wrapped onto the polar plane.

use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordKind {
    #[default]
    Cartesian,
    /// Swap the x and y axes.
    Flip,
    /// Wrap x onto the angle and y onto the radius.
    Polar,
}

impl CoordKind {
    pub fn name(&self) -> &'static str {
        match self {
            CoordKind::Cartesian => "cartesian",
            CoordKind::Flip => "flip",
            CoordKind::Polar => "polar",
        }
    }
}

/// Map a data-space point onto the unit polar plane.
///
/// x spans one full turn over its domain, measured clockwise from
/// twelve o'clock; y maps to the radius in [0, 1]. Output coordinates
/// land in [-1, 1] on both axes.
pub fn polar_point(
    x: f64,
    y: f64,
    x_domain: (f64, f64),
    y_domain: (f64, f64),
) -> (f64, f64) {
    let x_span = x_domain.1 - x_domain.0;
    let y_span = y_domain.1 - y_domain.0;

    let theta = if x_span == 0.0 {
        0.0
    } else {
        TAU * (x - x_domain.0) / x_span
    };
    let radius = if y_span == 0.0 {
        0.0
    } else {
        ((y - y_domain.0) / y_span).clamp(0.0, 1.0)
    };

    (radius * theta.sin(), radius * theta.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: (f64, f64), b: (f64, f64)) {
        assert!((a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_polar_origin_at_domain_start() {
        // Domain start points straight up at full radius
        assert_close(polar_point(0.0, 1.0, (0.0, 4.0), (0.0, 1.0)), (0.0, 1.0));
    }

    #[test]
    fn test_polar_quarter_turn() {
        // A quarter of the x domain is a quarter turn clockwise
        assert_close(polar_point(1.0, 1.0, (0.0, 4.0), (0.0, 1.0)), (1.0, 0.0));
    }

    #[test]
    fn test_polar_zero_radius() {
        assert_close(polar_point(3.0, 0.0, (0.0, 4.0), (0.0, 1.0)), (0.0, 0.0));
    }

    #[test]
    fn test_polar_degenerate_domain() {
        assert_close(polar_point(2.0, 5.0, (2.0, 2.0), (5.0, 5.0)), (0.0, 0.0));
    }
}
