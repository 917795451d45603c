// src/gate.rs - Temporal gating between classification and emission
use crate::command::Command;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_DWELL: Duration = Duration::from_secs(2);
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(1);
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(120);

/// Outcome of offering a candidate command to a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Forward to the emitter (a `None` command only updates the displayed action).
    Accepted(Command),
    /// Dropped; the displayed action is left alone.
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GateStatus {
    Activation {
        state: GateState,
        centre_occupied: bool,
        /// Whole seconds left on the start countdown, while arming.
        countdown: Option<u64>,
        settling: bool,
    },
    Cooldown {
        ready: bool,
    },
}

pub trait CommandGate {
    fn admit(&mut self, candidate: Command, now: Duration) -> Admission;

    fn status(&self, now: Duration) -> GateStatus;
}

// ── Activation gate ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Inactive,
    Arming,
    Active,
}

/// Dwell-timer start gate for the zone policy. Once active it stays active.
#[derive(Debug, Clone)]
pub struct ActivationGate {
    state: GateState,
    dwell: Duration,
    settle: Duration,
    dwell_started: Option<Duration>,
    settle_until: Option<Duration>,
    centre_occupied: bool,
}

impl ActivationGate {
    pub fn new(dwell: Duration, settle: Duration) -> Self {
        Self {
            state: GateState::Inactive,
            dwell,
            settle,
            dwell_started: None,
            settle_until: None,
            centre_occupied: false,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn dwell_elapsed(&self, now: Duration) -> Option<Duration> {
        self.dwell_started.map(|start| now.saturating_sub(start))
    }

    /// Start-screen countdown: whole seconds remaining, rounded up past zero.
    pub fn countdown(&self, now: Duration) -> Option<u64> {
        let elapsed = self.dwell_elapsed(now)?;
        let remaining = self.dwell.saturating_sub(elapsed);
        Some(remaining.as_secs() + 1)
    }

    pub fn is_settling(&self, now: Duration) -> bool {
        self.settle_until.map_or(false, |until| now < until)
    }

    /// Advances the state machine by one frame.
    pub fn tick(&mut self, centre_occupied: bool, now: Duration) -> GateState {
        self.centre_occupied = centre_occupied;

        match self.state {
            GateState::Inactive if centre_occupied => {
                self.dwell_started = Some(now);
                self.state = GateState::Arming;
                info!("Hand entered centre zone, arming");
            }
            GateState::Arming if !centre_occupied => {
                self.dwell_started = None;
                self.state = GateState::Inactive;
                info!("Hand left centre zone, arming cancelled");
            }
            GateState::Arming => {
                if self.dwell_elapsed(now).map_or(false, |e| e >= self.dwell) {
                    self.dwell_started = None;
                    self.settle_until = Some(now + self.settle);
                    self.state = GateState::Active;
                    info!(
                        "Control active, commands resume in {:.1}s",
                        self.settle.as_secs_f64()
                    );
                }
            }
            GateState::Inactive | GateState::Active => {}
        }

        self.state
    }
}

impl Default for ActivationGate {
    fn default() -> Self {
        Self::new(DEFAULT_DWELL, DEFAULT_SETTLE)
    }
}

impl CommandGate for ActivationGate {
    fn admit(&mut self, candidate: Command, now: Duration) -> Admission {
        let state = self.tick(candidate == Command::Action, now);

        if state != GateState::Active || self.is_settling(now) {
            return Admission::Suppressed;
        }

        Admission::Accepted(candidate)
    }

    fn status(&self, now: Duration) -> GateStatus {
        GateStatus::Activation {
            state: self.state,
            centre_occupied: self.centre_occupied,
            countdown: self.countdown(now),
            settling: self.is_settling(now),
        }
    }
}

// ── Cooldown limiter ────────────────────────────────────────

/// Minimum spacing between two dispatched commands, for the motion policy.
#[derive(Debug, Clone)]
pub struct CooldownLimiter {
    cooldown: Duration,
    last_emit: Option<Duration>,
}

impl CooldownLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_emit: None,
        }
    }

    pub fn last_emit(&self) -> Option<Duration> {
        self.last_emit
    }

    pub fn is_ready(&self, now: Duration) -> bool {
        match self.last_emit {
            Some(last) => now.saturating_sub(last) > self.cooldown,
            None => true,
        }
    }
}

impl Default for CooldownLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl CommandGate for CooldownLimiter {
    fn admit(&mut self, candidate: Command, now: Duration) -> Admission {
        if !self.is_ready(now) {
            debug!("{} suppressed by cooldown", candidate);
            return Admission::Suppressed;
        }

        // A no-op frame does not consume the cooldown window
        if !candidate.is_none() {
            self.last_emit = Some(now);
        }

        Admission::Accepted(candidate)
    }

    fn status(&self, now: Duration) -> GateStatus {
        GateStatus::Cooldown {
            ready: self.is_ready(now),
        }
    }
}
