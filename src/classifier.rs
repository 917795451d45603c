// src/classifier.rs - Point to command classification (zone grid and motion delta)
use crate::command::Command;
use crate::landmarks::{FrameDimensions, Point, SummaryMode};

pub const DEFAULT_MOVE_THRESHOLD: f64 = 12.0;

/// Turns the tracked point of one frame into a candidate command.
///
/// `None` means no hand was detected this frame.
pub trait Classifier {
    fn classify(&mut self, point: Option<Point>, dims: FrameDimensions) -> Command;

    /// How landmarks should be reduced before reaching this classifier.
    fn summary_mode(&self) -> SummaryMode;
}

// ── Zone grid ───────────────────────────────────────────────

/// Absolute 3x3 grid, five meaningful cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneClassifier;

impl ZoneClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Zone lookup for a point known to be in frame.
    pub fn zone_of(point: &Point, dims: FrameDimensions) -> Command {
        let w = dims.width as f64;
        let h = dims.height as f64;

        // Horizontal test first; the centre column is closed on both sides
        if point.x < w / 3.0 {
            Command::Left
        } else if point.x > 2.0 * w / 3.0 {
            Command::Right
        } else if point.y < h / 3.0 {
            Command::Up
        } else if point.y > 2.0 * h / 3.0 {
            Command::Down
        } else {
            Command::Action
        }
    }
}

impl Classifier for ZoneClassifier {
    fn classify(&mut self, point: Option<Point>, dims: FrameDimensions) -> Command {
        match point {
            Some(p) => Self::zone_of(&p, dims),
            None => Command::None,
        }
    }

    fn summary_mode(&self) -> SummaryMode {
        SummaryMode::Centroid
    }
}

// ── Motion delta ────────────────────────────────────────────

/// Relative classifier: direction of travel since the previous frame.
#[derive(Debug, Clone)]
pub struct MotionClassifier {
    threshold: f64,
    previous: Point,
}

impl MotionClassifier {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            // Starts at the origin, so the first detected frame can register a jump
            previous: Point::origin(),
        }
    }

    pub fn previous(&self) -> Point {
        self.previous
    }

    pub fn classify_delta(&self, dx: f64, dy: f64) -> Command {
        let t = self.threshold;

        if dx < -t {
            Command::Left
        } else if dx > t {
            Command::Right
        } else if dy < -t {
            Command::Up
        } else if dy > t {
            Command::Down
        } else {
            Command::None
        }
    }
}

impl Default for MotionClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_THRESHOLD)
    }
}

impl Classifier for MotionClassifier {
    fn classify(&mut self, point: Option<Point>, _dims: FrameDimensions) -> Command {
        let Some(point) = point else {
            return Command::None;
        };

        let delta = point - self.previous;
        // Always measured against the last raw position, emitted or not
        self.previous = point;

        self.classify_delta(delta.x, delta.y)
    }

    fn summary_mode(&self) -> SummaryMode {
        SummaryMode::Fingertip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: FrameDimensions = FrameDimensions { width: 640, height: 480 };

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_zone_cells() {
        assert_eq!(ZoneClassifier::zone_of(&p(50.0, 240.0), DIMS), Command::Left);
        assert_eq!(ZoneClassifier::zone_of(&p(600.0, 240.0), DIMS), Command::Right);
        assert_eq!(ZoneClassifier::zone_of(&p(320.0, 40.0), DIMS), Command::Up);
        assert_eq!(ZoneClassifier::zone_of(&p(320.0, 440.0), DIMS), Command::Down);
        assert_eq!(ZoneClassifier::zone_of(&p(320.0, 240.0), DIMS), Command::Action);
    }

    #[test]
    fn test_side_columns_span_full_height() {
        // Corners belong to the side columns, never to up/down
        assert_eq!(ZoneClassifier::zone_of(&p(10.0, 10.0), DIMS), Command::Left);
        assert_eq!(ZoneClassifier::zone_of(&p(630.0, 470.0), DIMS), Command::Right);
    }

    #[test]
    fn test_zone_boundary_belongs_to_centre() {
        let dims = FrameDimensions::new(600, 300);
        assert_eq!(ZoneClassifier::zone_of(&p(200.0, 150.0), dims), Command::Action);
        assert_eq!(ZoneClassifier::zone_of(&p(400.0, 150.0), dims), Command::Action);
        assert_eq!(ZoneClassifier::zone_of(&p(199.0, 150.0), dims), Command::Left);
        assert_eq!(ZoneClassifier::zone_of(&p(401.0, 150.0), dims), Command::Right);
        assert_eq!(ZoneClassifier::zone_of(&p(300.0, 100.0), dims), Command::Action);
        assert_eq!(ZoneClassifier::zone_of(&p(300.0, 200.0), dims), Command::Action);
        assert_eq!(ZoneClassifier::zone_of(&p(300.0, 99.0), dims), Command::Up);
        assert_eq!(ZoneClassifier::zone_of(&p(300.0, 201.0), dims), Command::Down);
    }

    #[test]
    fn test_zone_partition_is_total() {
        let mut zone = ZoneClassifier::new();
        for x in (0..=640).step_by(8) {
            for y in (0..=480).step_by(8) {
                let cmd = zone.classify(Some(p(x as f64, y as f64)), DIMS);
                assert!(Command::KEYS.contains(&cmd), "({x},{y}) -> {cmd:?}");
            }
        }
    }

    #[test]
    fn test_zone_without_hand_is_none() {
        assert_eq!(ZoneClassifier::new().classify(None, DIMS), Command::None);
    }

    #[test]
    fn test_motion_dead_zone() {
        let motion = MotionClassifier::default();
        for dx in -12..=12 {
            for dy in -12..=12 {
                assert_eq!(motion.classify_delta(dx as f64, dy as f64), Command::None);
            }
        }
    }

    #[test]
    fn test_motion_horizontal_priority() {
        let motion = MotionClassifier::default();
        assert_eq!(motion.classify_delta(-20.0, 20.0), Command::Left);
        assert_eq!(motion.classify_delta(20.0, -20.0), Command::Right);
        assert_eq!(motion.classify_delta(0.0, -13.0), Command::Up);
        assert_eq!(motion.classify_delta(0.0, 13.0), Command::Down);
    }

    #[test]
    fn test_motion_tracks_raw_previous_point() {
        let mut motion = MotionClassifier::default();
        motion.classify(Some(p(100.0, 100.0)), DIMS);

        // Two sub-threshold steps never accumulate into a command
        assert_eq!(motion.classify(Some(p(108.0, 100.0)), DIMS), Command::None);
        assert_eq!(motion.classify(Some(p(116.0, 100.0)), DIMS), Command::None);
        assert_eq!(motion.previous(), p(116.0, 100.0));

        assert_eq!(motion.classify(Some(p(146.0, 100.0)), DIMS), Command::Right);
    }

    #[test]
    fn test_motion_first_frame_compares_with_origin() {
        let mut motion = MotionClassifier::default();
        assert_eq!(motion.classify(Some(p(320.0, 240.0)), DIMS), Command::Right);

        // Near the origin the first frame stays quiet
        let mut motion = MotionClassifier::default();
        assert_eq!(motion.classify(Some(p(5.0, 5.0)), DIMS), Command::None);
    }

    #[test]
    fn test_motion_missing_hand_keeps_previous() {
        let mut motion = MotionClassifier::default();
        motion.classify(Some(p(200.0, 200.0)), DIMS);
        assert_eq!(motion.classify(None, DIMS), Command::None);
        assert_eq!(motion.previous(), p(200.0, 200.0));
    }
}
