//! OCR detections and the positioned fragments derived from them.

use serde::{Deserialize, Serialize};

/// A point in page image coordinates (pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Quadrilateral bounding box of a detection, as four ordered corner points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    /// Creates a quad from four corner points.
    pub const fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Creates an axis-aligned quad from its left/top/right/bottom edges.
    pub const fn from_rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            points: [
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ],
        }
    }

    /// Mean of the four y-coordinates.
    pub fn y_center(&self) -> f64 {
        self.points.iter().map(|p| p.y).sum::<f64>() / 4.0
    }

    /// Smallest x-coordinate.
    pub fn x_min(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.x)
            .fold(f64::INFINITY, f64::min)
    }

    /// Returns true if all four points coincide (no usable geometry).
    pub fn is_degenerate(&self) -> bool {
        self.points.iter().all(|p| *p == self.points[0])
    }

    /// Returns true if every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }
}

/// One OCR-recognized text fragment with its geometry and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: Quad,
    pub text: String,
    pub confidence: f64,
}

impl Detection {
    /// Creates a detection.
    pub fn new(bbox: Quad, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }

    /// Creates a detection for an engine that reports text without geometry.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new(Quad::default(), text, 1.0)
    }

    /// Returns true if the detection passes the confidence and empty-text filters.
    pub fn is_usable(&self, min_confidence: f64) -> bool {
        self.confidence >= min_confidence && !self.text.trim().is_empty()
    }

    /// Derives the positioned fragment used for line grouping.
    pub fn to_fragment(&self) -> PositionedFragment {
        PositionedFragment {
            y_center: self.bbox.y_center(),
            x_min: self.bbox.x_min(),
            text: self.text.trim().to_string(),
            confidence: self.confidence,
        }
    }
}

/// A detection reduced to what line grouping needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedFragment {
    pub y_center: f64,
    pub x_min: f64,
    pub text: String,
    pub confidence: f64,
}

/// Detections of one page, tagged by whether the engine reported geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageDetections {
    /// Detections with bounding boxes; lines are reconstructed geometrically.
    Positioned(Vec<Detection>),
    /// Recognized strings without geometry; each string is already a line.
    TextOnly(Vec<Detection>),
}

impl Default for PageDetections {
    fn default() -> Self {
        PageDetections::Positioned(Vec::new())
    }
}

impl PageDetections {
    /// Returns the detections regardless of kind.
    pub fn detections(&self) -> &[Detection] {
        match self {
            PageDetections::Positioned(d) | PageDetections::TextOnly(d) => d,
        }
    }

    /// Number of detections.
    pub fn len(&self) -> usize {
        self.detections().len()
    }

    /// Returns true if the page has no detections.
    pub fn is_empty(&self) -> bool {
        self.detections().is_empty()
    }
}
