//! Error types for jump analysis.
//!
//! Frame-level problems never abort a session: they surface as
//! `ValidationError` inside a feed outcome. Only `stop()` returns
//! `AnalysisError`.

use thiserror::Error;

use crate::pose::JointName;

/// Why a single frame was dropped before entering the window.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("frame timestamp is not finite: {0}")]
    NonFiniteTimestamp(f64),

    #[error("frame timestamp {timestamp} is not after last accepted {last}")]
    NonMonotonicTimestamp { timestamp: f64, last: f64 },

    /// Keypoint coordinates and confidence must lie in [0, 1].
    #[error("keypoint {joint:?} out of range: x={x}, y={y}, confidence={confidence}")]
    KeypointOutOfRange {
        joint: JointName,
        x: f32,
        y: f32,
        confidence: f32,
    },
}

/// Terminal failure of a session's analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Too few retained frames carried a hip height.
    #[error("insufficient frames: {valid} valid, {required} required")]
    InsufficientFrames { valid: usize, required: usize },

    /// The phase machine never left Preparation.
    #[error("no jump detected")]
    NoJumpDetected,

    /// `stop()` was called without a running session.
    #[error("no active analysis session")]
    NotActive,
}
