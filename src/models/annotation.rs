// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the per-second annotation model: strokes drawn on
//! the overlay surface, the frame annotation holding them together with a
//! comment, and the dense annotation set indexed by second.

use serde::{Deserialize, Serialize};

/// A 2D point in surface-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Stroke colors offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeColor {
    Red,
    Green,
    Blue,
    Yellow,
    Black,
}

impl StrokeColor {
    pub const PALETTE: [StrokeColor; 5] = [
        StrokeColor::Red,
        StrokeColor::Green,
        StrokeColor::Blue,
        StrokeColor::Yellow,
        StrokeColor::Black,
    ];

    /// RGB components used when rendering.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            StrokeColor::Red => [255, 0, 0],
            StrokeColor::Green => [0, 255, 0],
            StrokeColor::Blue => [0, 0, 255],
            StrokeColor::Yellow => [255, 255, 0],
            StrokeColor::Black => [0, 0, 0],
        }
    }
}

/// Stroke width in surface pixels, restricted to {2, 4, 6, 8}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Thickness(u8);

impl Thickness {
    pub const ALL: [Thickness; 4] = [Thickness(2), Thickness(4), Thickness(6), Thickness(8)];

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Thickness {
    fn default() -> Self {
        Thickness(4)
    }
}

impl TryFrom<u8> for Thickness {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 | 4 | 6 | 8 => Ok(Thickness(value)),
            other => Err(format!("unsupported stroke thickness: {}", other)),
        }
    }
}

impl From<Thickness> for u8 {
    fn from(thickness: Thickness) -> u8 {
        thickness.0
    }
}

/// One continuous freehand gesture. Always holds at least one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StrokeData")]
pub struct Stroke {
    pub points: Vec<Point>,
    pub color: StrokeColor,
    pub thickness: Thickness,
}

/// Unchecked stroke as read from disk.
#[derive(Deserialize)]
struct StrokeData {
    points: Vec<Point>,
    color: StrokeColor,
    thickness: Thickness,
}

impl TryFrom<StrokeData> for Stroke {
    type Error = String;

    fn try_from(data: StrokeData) -> Result<Self, Self::Error> {
        if data.points.is_empty() {
            return Err("stroke has no points".to_string());
        }
        Ok(Stroke {
            points: data.points,
            color: data.color,
            thickness: data.thickness,
        })
    }
}

impl Stroke {
    /// Start a stroke at its first point.
    pub fn new(start: Point, color: StrokeColor, thickness: Thickness) -> Self {
        Self {
            points: vec![start],
            color,
            thickness,
        }
    }

    /// Append a point to the stroke.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

/// Drawings and comment for a single second of video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameAnnotation {
    /// Insertion order is render order.
    pub drawings: Vec<Stroke>,
    #[serde(default)]
    pub comment: String,
}

impl FrameAnnotation {
    /// A frame counts as annotated once it has a stroke or a comment.
    pub fn is_annotated(&self) -> bool {
        !self.drawings.is_empty() || !self.comment.is_empty()
    }
}

/// Per-second annotations, dense up to the highest touched second.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationSet {
    frames: Vec<Option<FrameAnnotation>>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, second: usize) -> Option<&FrameAnnotation> {
        self.frames.get(second).and_then(Option::as_ref)
    }

    /// Get the entry for `second`, creating it (and padding with absent
    /// entries) when missing.
    pub fn entry(&mut self, second: usize) -> &mut FrameAnnotation {
        if self.frames.len() <= second {
            self.frames.resize(second + 1, None);
        }
        self.frames[second].get_or_insert_with(FrameAnnotation::default)
    }

    /// Number of slots, including absent ones.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Seconds whose frame has at least one stroke or a non-empty comment.
    pub fn annotated_seconds(&self) -> Vec<usize> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| frame.as_ref().is_some_and(FrameAnnotation::is_annotated))
            .map(|(second, _)| second)
            .collect()
    }

    /// Drop every slot at or beyond `total_seconds`.
    pub fn truncate(&mut self, total_seconds: usize) {
        self.frames.truncate(total_seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_pads_with_absent_frames() {
        let mut set = AnnotationSet::new();
        set.entry(3).comment = "head still".to_string();

        assert_eq!(set.len(), 4);
        assert!(set.get(0).is_none());
        assert!(set.get(2).is_none());
        assert_eq!(set.get(3).map(|f| f.comment.as_str()), Some("head still"));
    }

    #[test]
    fn test_annotated_seconds_skips_empty_entries() {
        let mut set = AnnotationSet::new();
        set.entry(0);
        set.entry(1)
            .drawings
            .push(Stroke::new(Point::new(1.0, 1.0), StrokeColor::Red, Thickness::default()));
        set.entry(2).comment = "elbow".to_string();
        set.entry(4);

        assert_eq!(set.annotated_seconds(), vec![1, 2]);
    }

    #[test]
    fn test_thickness_rejects_values_outside_set() {
        assert!(Thickness::try_from(4).is_ok());
        assert!(Thickness::try_from(3).is_err());
        assert!(serde_json::from_str::<Thickness>("5").is_err());
        assert_eq!(serde_json::to_string(&Thickness::ALL[3]).unwrap(), "8");
    }

    #[test]
    fn test_serialized_set_keeps_gaps_as_null() {
        let mut set = AnnotationSet::new();
        set.entry(1).comment = "bat face".to_string();

        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[null,{"drawings":[],"comment":"bat face"}]"#);

        let back: AnnotationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_stroke_without_points_is_rejected() {
        let empty = r#"{"points":[],"color":"red","thickness":4}"#;
        assert!(serde_json::from_str::<Stroke>(empty).is_err());

        let set = r#"[{"drawings":[{"points":[],"color":"red","thickness":4}],"comment":""}]"#;
        assert!(serde_json::from_str::<AnnotationSet>(set).is_err());

        let stroke = Stroke::new(Point::new(3.0, 4.0), StrokeColor::Red, Thickness::default());
        let json = serde_json::to_string(&stroke).unwrap();
        assert_eq!(serde_json::from_str::<Stroke>(&json).unwrap(), stroke);
    }
}
