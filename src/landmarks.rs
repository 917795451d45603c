// src/landmarks.rs - Hand landmark set and reduction to a single tracked point
use nalgebra::{Point2, Vector2};
use serde::Serialize;
use thiserror::Error;

/// Pixel-space position of the tracked hand for one frame.
pub type Point = Point2<f64>;

// MediaPipe hand landmark layout
pub const HAND_LANDMARK_COUNT: usize = 21;
pub const INDEX_FINGER_TIP: usize = 8;

#[derive(Error, Debug, PartialEq)]
pub enum LandmarkError {
    #[error("expected at least {expected} hand landmarks, got {actual}")]
    TooFew { expected: usize, actual: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameDimensions {
    pub width: u32,
    pub height: u32,
}

impl FrameDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Converts a normalized `[0,1]` landmark into pixels, truncating toward zero.
    pub fn to_pixels(&self, normalized: &Point2<f64>) -> Point {
        Point::new(
            (normalized.x * self.width as f64).trunc(),
            (normalized.y * self.height as f64).trunc(),
        )
    }
}

/// One detected hand: normalized landmarks, index 8 being the index fingertip.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    points: Vec<Point2<f64>>,
}

impl Landmarks {
    pub fn new(points: Vec<Point2<f64>>) -> Result<Self, LandmarkError> {
        if points.len() < HAND_LANDMARK_COUNT {
            return Err(LandmarkError::TooFew {
                expected: HAND_LANDMARK_COUNT,
                actual: points.len(),
            });
        }

        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(LandmarkError::NonFinite { index });
        }

        Ok(Self { points })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, LandmarkError> {
        Self::new(pairs.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn index_tip(&self) -> Point2<f64> {
        self.points[INDEX_FINGER_TIP]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SummaryMode {
    /// Mean of every landmark.
    Centroid,
    /// Index fingertip only.
    Fingertip,
}

pub fn summarize(landmarks: &Landmarks, dims: FrameDimensions, mode: SummaryMode) -> Point {
    match mode {
        SummaryMode::Centroid => centroid(landmarks, dims),
        SummaryMode::Fingertip => dims.to_pixels(&landmarks.index_tip()),
    }
}

fn centroid(landmarks: &Landmarks, dims: FrameDimensions) -> Point {
    let scale = Vector2::new(dims.width as f64, dims.height as f64);
    let sum = landmarks
        .points()
        .iter()
        .fold(Vector2::<f64>::zeros(), |acc, p| acc + p.coords.component_mul(&scale));
    let mean = sum / landmarks.len() as f64;

    Point::new(mean.x.trunc(), mean.y.trunc())
}
