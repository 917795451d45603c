//! Hand-gesture keyboard control.
//!
//! Per frame: hand landmarks are reduced to a point, classified into a
//! directional command, gated in time, then dispatched as a key press.

pub mod classifier;
pub mod command;
pub mod detector;
pub mod dispatch;
pub mod engine;
pub mod gate;
pub mod landmarks;
pub mod trace;
pub mod video;

pub use command::Command;
pub use engine::{ClassificationPolicy, EngineConfig, FrameReport, GestureEngine};
pub use landmarks::{FrameDimensions, Landmarks};
