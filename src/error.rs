//! Error types
//!
//! Only construction can fail. Per-frame playback and judgment are total.

use thiserror::Error;

/// Input-contract violations detected before baking a trajectory
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BakeError {
    #[error("onset {index} is not finite ({value})")]
    NonFiniteOnset { index: usize, value: f64 },

    #[error("onset {index} is negative ({value})")]
    NegativeOnset { index: usize, value: f64 },

    #[error("onsets are not in order at {index}: {prev} followed by {next}")]
    Unordered { index: usize, prev: f64, next: f64 },

    #[error("speed must be finite and positive, got {0}")]
    InvalidSpeed(f32),

    #[error("wall half-length must be finite and positive, got {0}")]
    InvalidWallLength(f32),

    #[error("turn range must satisfy 0 <= min <= max <= 180 degrees, got {min}..{max}")]
    InvalidTurnRange { min: f64, max: f64 },
}

/// Failures while assembling a stage or game session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("track '{0}' appears more than once")]
    DuplicateTrack(String),

    #[error("a session needs at least one track")]
    NoTracks,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bake track '{track}': {source}")]
    Bake {
        track: String,
        #[source]
        source: BakeError,
    },
}

/// Settings or tuning could not be parsed or hold unusable values
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid tuning value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A track source could not produce tracks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("mode '{mode}' has no track named '{name}'")]
    UnknownTrack { mode: &'static str, name: String },

    #[error("source produced no tracks")]
    Empty,
}
