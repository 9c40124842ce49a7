//! A named track: its color, onsets and baked trajectory

use serde::{Deserialize, Serialize};

use crate::Rgb;
use crate::error::BakeError;
use crate::sim::{Timeline, bake};
use crate::tuning::BakeParams;

/// Unbaked track description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSpec {
    pub name: String,
    pub color: Rgb,
    /// Onset times in seconds, non-decreasing
    pub onsets: Vec<f64>,
    /// Opaque reference to the audio clip (path, stem id); never interpreted here
    #[serde(default)]
    pub clip: Option<String>,
}

impl TrackSpec {
    pub fn new(name: impl Into<String>, color: Rgb, onsets: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            color,
            onsets,
            clip: None,
        }
    }

    pub fn with_clip(mut self, clip: impl Into<String>) -> Self {
        self.clip = Some(clip.into());
        self
    }
}

/// A track with its trajectory baked
#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub color: Rgb,
    pub timeline: Timeline,
    pub clip: Option<String>,
}

impl Track {
    pub fn bake(spec: TrackSpec, params: &BakeParams, seed: u64) -> Result<Self, BakeError> {
        let timeline = bake(&spec.onsets, params, seed)?;
        log::info!(
            "baked track '{}': {} onsets, {} segments, {:.2}s",
            spec.name,
            timeline.playable_onsets().len(),
            timeline.len(),
            timeline.duration()
        );
        Ok(Self {
            name: spec.name,
            color: spec.color,
            timeline,
            clip: spec.clip,
        })
    }

    /// Onsets that take part in judgment
    pub fn onsets(&self) -> &[f64] {
        self.timeline.playable_onsets()
    }
}
