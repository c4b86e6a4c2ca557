// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module converts between screen positions and surface-local pixel
//! coordinates, and thins out pointer samples while a stroke is drawn.

use crate::models::annotation::Point;

/// Convert a screen position to surface-local coordinates given the
/// surface's top-left corner on screen and its display scale.
pub fn to_surface(screen_x: f64, screen_y: f64, origin_x: f64, origin_y: f64, scale: f64) -> Point {
    Point {
        x: (screen_x - origin_x) / scale,
        y: (screen_y - origin_y) / scale,
    }
}

/// Convert surface-local coordinates back to a screen position.
pub fn to_screen(point: &Point, origin_x: f64, origin_y: f64, scale: f64) -> (f64, f64) {
    (point.x * scale + origin_x, point.y * scale + origin_y)
}

pub fn distance(a: &Point, b: &Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Whether a pointer sample is far enough from the last kept point to be
/// added to the stroke.
pub fn should_sample(last: Option<&Point>, next: &Point, min_distance: f64) -> bool {
    match last {
        Some(last) => distance(last, next) >= min_distance,
        None => true,
    }
}

/// Scale factor and offset that fit a `width` x `height` surface inside an
/// `available` area, centered.
pub fn fit_centered(width: f64, height: f64, available_w: f64, available_h: f64) -> (f64, f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (1.0, 0.0, 0.0);
    }
    let scale = (available_w / width).min(available_h / height);
    let x_offset = (available_w - width * scale) / 2.0;
    let y_offset = (available_h - height * scale) / 2.0;
    (scale, x_offset, y_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_screen_roundtrip() {
        let point = to_surface(410.0, 275.5, 100.0, 50.0, 0.5);
        assert_eq!(point, Point::new(620.0, 451.0));

        let (x, y) = to_screen(&point, 100.0, 50.0, 0.5);
        assert!((x - 410.0).abs() < 0.0001);
        assert!((y - 275.5).abs() < 0.0001);
    }

    #[test]
    fn test_should_sample_skips_jitter() {
        let last = Point::new(10.0, 10.0);
        assert!(should_sample(None, &last, 2.0));
        assert!(!should_sample(Some(&last), &Point::new(11.0, 10.5), 2.0));
        assert!(should_sample(Some(&last), &Point::new(13.0, 14.0), 2.0));
        assert!(should_sample(Some(&last), &last, 0.0));
    }

    #[test]
    fn test_fit_centered_letterboxes() {
        let (scale, x, y) = fit_centered(1920.0, 1080.0, 960.0, 960.0);
        assert!((scale - 0.5).abs() < 1e-9);
        assert_eq!(x, 0.0);
        assert!((y - 210.0).abs() < 1e-9);
    }
}
