// src/engine.rs - Per-frame gesture to command pipeline
use crate::classifier::{Classifier, MotionClassifier, ZoneClassifier, DEFAULT_MOVE_THRESHOLD};
use crate::command::Command;
use crate::dispatch::{CommandEmitter, KeyDispatcher};
use crate::gate::{
    ActivationGate, Admission, CommandGate, CooldownLimiter, GateStatus, DEFAULT_COOLDOWN,
    DEFAULT_DWELL, DEFAULT_SETTLE,
};
use crate::landmarks::{summarize, FrameDimensions, Landmarks, Point};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationPolicy {
    /// Absolute 5-zone grid with a centre-dwell start gate.
    Zone,
    /// Fingertip motion direction with a cooldown between presses.
    Motion,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub policy: ClassificationPolicy,
    pub move_threshold: f64,
    pub cooldown: Duration,
    pub dwell: Duration,
    pub settle: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: ClassificationPolicy::Zone,
            move_threshold: DEFAULT_MOVE_THRESHOLD,
            cooldown: DEFAULT_COOLDOWN,
            dwell: DEFAULT_DWELL,
            settle: DEFAULT_SETTLE,
        }
    }
}

impl EngineConfig {
    pub fn with_policy(policy: ClassificationPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }
}

/// Everything the presentation layer needs to know about one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    #[serde(serialize_with = "serialize_point")]
    pub point: Option<Point>,
    pub candidate: Command,
    pub dispatched: Option<Command>,
    pub current_action: Command,
    pub gate: GateStatus,
}

fn serialize_point<S: serde::Serializer>(point: &Option<Point>, s: S) -> Result<S::Ok, S::Error> {
    point.map(|p| (p.x, p.y)).serialize(s)
}

/// Session object: classifier, gate and emitter for one policy, ticked once per frame.
pub struct GestureEngine<D: KeyDispatcher> {
    config: EngineConfig,
    dims: FrameDimensions,
    classifier: Box<dyn Classifier>,
    gate: Box<dyn CommandGate>,
    emitter: CommandEmitter<D>,
    frames: u64,
}

impl<D: KeyDispatcher> GestureEngine<D> {
    pub fn new(config: EngineConfig, dims: FrameDimensions, dispatcher: D) -> Self {
        let (classifier, gate): (Box<dyn Classifier>, Box<dyn CommandGate>) = match config.policy {
            ClassificationPolicy::Zone => (
                Box::new(ZoneClassifier::new()),
                Box::new(ActivationGate::new(config.dwell, config.settle)),
            ),
            ClassificationPolicy::Motion => (
                Box::new(MotionClassifier::new(config.move_threshold)),
                Box::new(CooldownLimiter::new(config.cooldown)),
            ),
        };

        info!(
            "Gesture engine ready: {:?} policy, {}x{} frame, dispatch via {}",
            config.policy,
            dims.width,
            dims.height,
            dispatcher.name()
        );

        Self {
            config,
            dims,
            classifier,
            gate,
            emitter: CommandEmitter::new(dispatcher),
            frames: 0,
        }
    }

    /// Runs summarize, classify, gate and emit for one frame.
    ///
    /// `now` is the frame timestamp relative to session start and must not
    /// go backwards.
    pub fn process_frame(&mut self, landmarks: Option<&Landmarks>, now: Duration) -> FrameReport {
        self.frames += 1;

        let point = landmarks.map(|hand| summarize(hand, self.dims, self.classifier.summary_mode()));
        let candidate = self.classifier.classify(point, self.dims);

        let dispatched = match self.gate.admit(candidate, now) {
            Admission::Accepted(command) => self.emitter.emit(command),
            Admission::Suppressed => None,
        };

        if let Some(command) = dispatched {
            debug!(
                frame = self.frames,
                t = now.as_secs_f64(),
                "emitted {}",
                command
            );
        }

        FrameReport {
            point,
            candidate,
            dispatched,
            current_action: self.emitter.current_action(),
            gate: self.gate.status(now),
        }
    }

    pub fn current_action(&self) -> Command {
        self.emitter.current_action()
    }

    pub fn gate_status(&self, now: Duration) -> GateStatus {
        self.gate.status(now)
    }

    pub fn dimensions(&self) -> FrameDimensions {
        self.dims
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    pub fn dispatcher(&self) -> &D {
        self.emitter.dispatcher()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::RecordingDispatcher;
    use crate::gate::GateState;
    use crate::landmarks::{HAND_LANDMARK_COUNT, INDEX_FINGER_TIP};
    use nalgebra::Point2;

    const DIMS: FrameDimensions = FrameDimensions { width: 640, height: 480 };

    // Aim at the pixel centre so truncation lands back on (x, y)
    fn normalized(x: f64, y: f64) -> Point2<f64> {
        Point2::new((x + 0.5) / DIMS.width as f64, (y + 0.5) / DIMS.height as f64)
    }

    /// Hand whose centroid sits on the given pixel.
    fn hand_at(x: f64, y: f64) -> Landmarks {
        Landmarks::new(vec![normalized(x, y); HAND_LANDMARK_COUNT]).unwrap()
    }

    fn fingertip_at(x: f64, y: f64) -> Landmarks {
        let mut points = vec![Point2::new(0.5, 0.9); HAND_LANDMARK_COUNT];
        points[INDEX_FINGER_TIP] = normalized(x, y);
        Landmarks::new(points).unwrap()
    }

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn activation_state(report: &FrameReport) -> GateState {
        match report.gate {
            GateStatus::Activation { state, .. } => state,
            GateStatus::Cooldown { .. } => panic!("zone engine reported a cooldown gate"),
        }
    }

    #[test]
    fn test_scenario_centre_dwell_activation() {
        let mut engine = GestureEngine::new(
            EngineConfig::with_policy(ClassificationPolicy::Zone),
            DIMS,
            RecordingDispatcher::default(),
        );
        let centre = hand_at(320.0, 240.0);
        let mut states = Vec::new();

        // ~30 fps for 2.1 s in the centre
        for t in (0..=2100).step_by(33) {
            let report = engine.process_frame(Some(&centre), ms(t));
            assert_eq!(report.point, Some(Point::new(320.0, 240.0)));
            assert_eq!(report.dispatched, None);
            let state = activation_state(&report);
            if states.last() != Some(&state) {
                states.push(state);
            }
        }

        assert_eq!(states, vec![GateState::Arming, GateState::Active]);
        assert!(engine.dispatcher().presses.is_empty());

        // Still inside the settle window
        assert_eq!(engine.process_frame(Some(&centre), ms(2900)).dispatched, None);

        // Activation happened on the first frame at or past 2.0s (t=2013ms)
        let report = engine.process_frame(Some(&centre), ms(3013));
        assert_eq!(report.dispatched, Some(Command::Action));
        assert_eq!(report.current_action, Command::Action);
        assert_eq!(engine.dispatcher().presses, vec![Command::Action]);
    }

    #[test]
    fn test_gate_status_tracks_settle_window() {
        let mut engine = GestureEngine::new(EngineConfig::default(), DIMS, RecordingDispatcher::default());
        assert_eq!(engine.config().policy, ClassificationPolicy::Zone);

        let centre = hand_at(320.0, 240.0);
        engine.process_frame(Some(&centre), ms(0));
        engine.process_frame(Some(&centre), ms(2000));

        match engine.gate_status(ms(2500)) {
            GateStatus::Activation { state, settling, .. } => {
                assert_eq!(state, GateState::Active);
                assert!(settling);
            }
            GateStatus::Cooldown { .. } => panic!("zone engine reported a cooldown gate"),
        }
        assert!(matches!(
            engine.gate_status(ms(3000)),
            GateStatus::Activation { settling: false, .. }
        ));
    }

    #[test]
    fn test_zone_policy_dispatches_every_frame_once_active() {
        let mut engine = GestureEngine::new(EngineConfig::default(), DIMS, RecordingDispatcher::default());
        let centre = hand_at(320.0, 240.0);
        engine.process_frame(Some(&centre), ms(0));
        engine.process_frame(Some(&centre), ms(2000));

        let left = hand_at(50.0, 240.0);
        for t in [3000, 3033, 3066] {
            engine.process_frame(Some(&left), ms(t));
        }
        let report = engine.process_frame(None, ms(3100));

        assert_eq!(report.dispatched, None);
        assert_eq!(report.current_action, Command::None);
        assert_eq!(engine.dispatcher().presses, vec![Command::Left; 3]);
    }

    #[test]
    fn test_zone_policy_ignores_commands_before_activation() {
        let mut engine = GestureEngine::new(EngineConfig::default(), DIMS, RecordingDispatcher::default());
        for (i, x) in [50.0, 600.0, 320.0, 50.0].into_iter().enumerate() {
            let report = engine.process_frame(Some(&hand_at(x, 240.0)), ms(i as u64 * 500));
            assert_eq!(report.dispatched, None);
        }
        assert!(engine.dispatcher().presses.is_empty());
        assert_eq!(engine.current_action(), Command::None);
    }

    #[test]
    fn test_losing_hand_cancels_arming() {
        let mut engine = GestureEngine::new(EngineConfig::default(), DIMS, RecordingDispatcher::default());
        let centre = hand_at(320.0, 240.0);
        engine.process_frame(Some(&centre), ms(0));
        let report = engine.process_frame(None, ms(1500));
        assert_eq!(activation_state(&report), GateState::Inactive);

        engine.process_frame(Some(&centre), ms(1600));
        let report = engine.process_frame(Some(&centre), ms(3500));
        assert_eq!(activation_state(&report), GateState::Arming);
    }

    #[test]
    fn test_motion_first_frame_jumps_from_origin() {
        let mut engine = GestureEngine::new(
            EngineConfig::with_policy(ClassificationPolicy::Motion),
            DIMS,
            RecordingDispatcher::default(),
        );
        let first = engine.process_frame(Some(&fingertip_at(100.0, 100.0)), ms(0));
        assert_eq!(first.dispatched, Some(Command::Right));
    }

    #[test]
    fn test_scenario_motion_cooldown() {
        let mut engine = GestureEngine::new(
            EngineConfig::with_policy(ClassificationPolicy::Motion),
            DIMS,
            RecordingDispatcher::default(),
        );
        // Walk out to (100,100) in sub-threshold steps so nothing is emitted
        for k in 1..=10 {
            let step = 10.0 * k as f64;
            let report = engine.process_frame(Some(&fingertip_at(step, step)), ms(0));
            assert_eq!(report.candidate, Command::None);
        }
        assert!(engine.dispatcher().presses.is_empty());

        let report = engine.process_frame(Some(&fingertip_at(130.0, 100.0)), ms(0));
        assert_eq!(report.dispatched, Some(Command::Right));

        let report = engine.process_frame(Some(&fingertip_at(160.0, 100.0)), ms(50));
        assert_eq!(report.candidate, Command::Right);
        assert_eq!(report.dispatched, None);
        assert_eq!(report.current_action, Command::Right);
        assert_eq!(report.gate, GateStatus::Cooldown { ready: false });

        let report = engine.process_frame(Some(&fingertip_at(190.0, 100.0)), ms(130));
        assert_eq!(report.dispatched, Some(Command::Right));
        assert_eq!(engine.dispatcher().presses, vec![Command::Right, Command::Right]);
    }

    #[test]
    fn test_motion_still_hand_shows_none_without_dispatch() {
        let mut engine = GestureEngine::new(
            EngineConfig::with_policy(ClassificationPolicy::Motion),
            DIMS,
            RecordingDispatcher::default(),
        );
        engine.process_frame(Some(&fingertip_at(300.0, 200.0)), ms(0));
        assert_eq!(engine.current_action(), Command::Right);

        let report = engine.process_frame(Some(&fingertip_at(302.0, 201.0)), ms(500));
        assert_eq!(report.candidate, Command::None);
        assert_eq!(report.current_action, Command::None);
        assert_eq!(engine.dispatcher().presses.len(), 1);
    }

    #[test]
    fn test_motion_threshold_is_configurable() {
        let config = EngineConfig {
            move_threshold: 40.0,
            ..EngineConfig::with_policy(ClassificationPolicy::Motion)
        };
        let mut engine = GestureEngine::new(config, DIMS, RecordingDispatcher::default());
        engine.process_frame(Some(&fingertip_at(20.0, 20.0)), ms(0));
        let report = engine.process_frame(Some(&fingertip_at(50.0, 20.0)), ms(500));
        assert_eq!(report.candidate, Command::None);
    }

    #[test]
    fn test_report_serializes() {
        let mut engine = GestureEngine::new(EngineConfig::default(), DIMS, RecordingDispatcher::default());
        let report = engine.process_frame(Some(&hand_at(320.0, 240.0)), ms(0));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["candidate"], "action");
        assert_eq!(json["gate"]["kind"], "activation");
        assert_eq!(json["gate"]["state"], "arming");
        assert_eq!(json["point"][0], 320.0);
    }
}
