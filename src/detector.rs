// src/detector.rs - Hand landmark sources
use crate::landmarks::{Landmarks, HAND_LANDMARK_COUNT};
use anyhow::Result;
use image::DynamicImage;
use nalgebra::{Point2, Vector2};

/// Pose acquisition: zero or one hand per frame.
pub trait HandDetector {
    fn detect(&mut self, frame: &DynamicImage) -> Result<Option<Landmarks>>;

    fn name(&self) -> &'static str;
}

// Right hand, palm towards the camera, in normalized units relative to the
// wrist. Ordering follows the MediaPipe hand model (wrist, thumb, index,
// middle, ring, pinky; four joints per finger).
const HAND_TEMPLATE: [[f64; 2]; HAND_LANDMARK_COUNT] = [
    [0.000, 0.000],
    [-0.035, -0.020],
    [-0.060, -0.050],
    [-0.075, -0.080],
    [-0.085, -0.105],
    [-0.025, -0.095],
    [-0.028, -0.135],
    [-0.030, -0.160],
    [-0.032, -0.185],
    [0.000, -0.100],
    [0.000, -0.130],
    [0.000, -0.150],
    [0.000, -0.165],
    [0.022, -0.095],
    [0.024, -0.120],
    [0.025, -0.138],
    [0.026, -0.150],
    [0.042, -0.085],
    [0.046, -0.105],
    [0.048, -0.118],
    [0.050, -0.128],
];

/// Simulated hand following a pointer (mouse) position.
///
/// The synthetic hand is laid out so its centroid sits on the pointer, with
/// the index fingertip extended above it.
pub struct PointerHand {
    pointer: Option<Point2<f64>>,
    scale: f64,
    offsets: Vec<Vector2<f64>>,
}

impl PointerHand {
    pub fn new() -> Self {
        Self::with_scale(1.0)
    }

    pub fn with_scale(scale: f64) -> Self {
        let raw: Vec<Vector2<f64>> = HAND_TEMPLATE
            .iter()
            .map(|[x, y]| Vector2::new(*x, *y))
            .collect();
        let mean = raw.iter().sum::<Vector2<f64>>() / raw.len() as f64;

        Self {
            pointer: None,
            scale,
            offsets: raw.into_iter().map(|v| v - mean).collect(),
        }
    }

    /// Pointer in normalized frame coordinates, `None` when it left the video.
    pub fn set_pointer(&mut self, pointer: Option<(f64, f64)>) {
        self.pointer = pointer.map(|(x, y)| Point2::new(x, y));
    }

    pub fn pointer(&self) -> Option<Point2<f64>> {
        self.pointer
    }

    pub fn synthesize(&self) -> Option<Landmarks> {
        let anchor = self.pointer?;
        let points = self
            .offsets
            .iter()
            .map(|offset| {
                let p = anchor + offset * self.scale;
                Point2::new(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0))
            })
            .collect();

        // Template length is fixed at HAND_LANDMARK_COUNT and clamped points are finite
        Landmarks::new(points).ok()
    }
}

impl Default for PointerHand {
    fn default() -> Self {
        Self::new()
    }
}

impl HandDetector for PointerHand {
    fn detect(&mut self, _frame: &DynamicImage) -> Result<Option<Landmarks>> {
        Ok(self.synthesize())
    }

    fn name(&self) -> &'static str {
        "pointer"
    }
}
