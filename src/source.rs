//! Where track onsets come from
//!
//! Onset detection happens upstream. Each analysis mode fixes the track
//! roster (names, colors, timing offsets); a `TrackSource` turns its input
//! into `TrackSpec`s for that roster.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Rgb;
use crate::error::SourceError;
use crate::track::TrackSpec;

/// One roster entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RosterEntry {
    pub name: &'static str,
    pub color: Rgb,
    /// Added to every onset, in seconds
    pub offset: f64,
}

const fn entry(name: &'static str, color: Rgb, offset: f64) -> RosterEntry {
    RosterEntry {
        name,
        color,
        offset,
    }
}

const WHITE: Rgb = [255, 255, 255];
const BASS: Rgb = [100, 200, 100];
const HIGH: Rgb = [70, 180, 220];

const STEM: [RosterEntry; 4] = [
    entry("drums", [220, 80, 70], 0.0),
    entry("bass", BASS, -0.02),
    entry("other", HIGH, -0.01),
    entry("vocals", [200, 100, 220], -0.03),
];
const PIANO: [RosterEntry; 1] = [entry("piano", WHITE, 0.0)];
const STRING: [RosterEntry; 1] = [entry("strings", [230, 140, 40], 0.0)];
const QUAD_BAND: [RosterEntry; 4] = [
    entry("bass", BASS, 0.0),
    entry("low_mid", [100, 150, 200], 0.0),
    entry("high_mid", [150, 100, 220], 0.0),
    entry("treble", [80, 200, 220], 0.0),
];
const TRIPLE_BAND: [RosterEntry; 3] = [
    entry("sub", WHITE, 0.0),
    entry("mid", WHITE, 0.0),
    entry("mel", WHITE, 0.0),
];
const DUAL_BAND: [RosterEntry; 2] = [
    entry("low", [220, 80, 70], 0.0),
    entry("high", HIGH, 0.0),
];
// "top" borrows the "high" color
const ELECTRONIC: [RosterEntry; 2] = [entry("kick", WHITE, 0.0), entry("top", HIGH, 0.0)];
// Slot order: top-left, top-right, bottom-left, bottom-right, center
const CINEMATIC: [RosterEntry; 5] = [
    entry("air", WHITE, 0.0),
    entry("upper", WHITE, 0.0),
    entry("sub", WHITE, 0.0),
    entry("bass", BASS, 0.0),
    entry("mid", WHITE, 0.0),
];
const PERCUSSION: [RosterEntry; 3] = [
    entry("kick", WHITE, 0.0),
    entry("snare", WHITE, 0.0),
    entry("hats", WHITE, 0.0),
];
// Percussive bands first, then the harmonic ones
const DYNAMIC: [RosterEntry; 5] = [
    entry("kick", WHITE, 0.0),
    entry("snare", WHITE, 0.0),
    entry("hats", WHITE, 0.0),
    entry("bass", BASS, 0.0),
    entry("mel", [200, 200, 200], 0.0),
];

/// Analysis strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Source-separated stems
    #[default]
    Stem,
    /// A single piano line
    Piano,
    /// A single bowed or plucked string line
    String,
    /// Bass, low mids, high mids and treble
    #[serde(alias = "multiband")]
    QuadBand,
    /// Sub, mid and melody bands
    TripleBand,
    /// Lows and highs
    #[serde(alias = "twoband")]
    DualBand,
    /// Kick against everything above it
    Electronic,
    /// Five bands from sub to air
    Cinematic,
    /// Kick, snare and hats
    Percussion,
    /// Percussive and harmonic bands after separation
    Dynamic,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 10] = [
        AnalysisMode::Stem,
        AnalysisMode::Piano,
        AnalysisMode::String,
        AnalysisMode::QuadBand,
        AnalysisMode::TripleBand,
        AnalysisMode::DualBand,
        AnalysisMode::Electronic,
        AnalysisMode::Cinematic,
        AnalysisMode::Percussion,
        AnalysisMode::Dynamic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Stem => "stem",
            AnalysisMode::Piano => "piano",
            AnalysisMode::String => "string",
            AnalysisMode::QuadBand => "quadband",
            AnalysisMode::TripleBand => "tripleband",
            AnalysisMode::DualBand => "dualband",
            AnalysisMode::Electronic => "electronic",
            AnalysisMode::Cinematic => "cinematic",
            AnalysisMode::Percussion => "percussion",
            AnalysisMode::Dynamic => "dynamic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stems" => Some(AnalysisMode::Stem),
            "strings" => Some(AnalysisMode::String),
            "multiband" => Some(AnalysisMode::QuadBand),
            "twoband" => Some(AnalysisMode::DualBand),
            name => Self::ALL.into_iter().find(|m| m.as_str() == name),
        }
    }

    pub fn roster(&self) -> &'static [RosterEntry] {
        match self {
            AnalysisMode::Stem => &STEM,
            AnalysisMode::Piano => &PIANO,
            AnalysisMode::String => &STRING,
            AnalysisMode::QuadBand => &QUAD_BAND,
            AnalysisMode::TripleBand => &TRIPLE_BAND,
            AnalysisMode::DualBand => &DUAL_BAND,
            AnalysisMode::Electronic => &ELECTRONIC,
            AnalysisMode::Cinematic => &CINEMATIC,
            AnalysisMode::Percussion => &PERCUSSION,
            AnalysisMode::Dynamic => &DYNAMIC,
        }
    }

    pub fn entry(&self, name: &str) -> Option<&'static RosterEntry> {
        self.roster().iter().find(|e| e.name == name)
    }
}

/// Produces the tracks for a session or a watch run
pub trait TrackSource {
    fn produce_tracks(&self) -> Result<Vec<TrackSpec>, SourceError>;
}

/// Precomputed onsets keyed by track name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnsetTable {
    pub mode: AnalysisMode,
    pub onsets: BTreeMap<String, Vec<f64>>,
    /// Optional clip reference per track name
    pub clips: BTreeMap<String, String>,
}

impl OnsetTable {
    pub fn new(mode: AnalysisMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_track(mut self, name: impl Into<String>, onsets: Vec<f64>) -> Self {
        self.onsets.insert(name.into(), onsets);
        self
    }

    pub fn with_clip(mut self, name: impl Into<String>, clip: impl Into<String>) -> Self {
        self.clips.insert(name.into(), clip.into());
        self
    }
}

impl TrackSource for OnsetTable {
    /// Tracks in roster order. Roster entries with no onsets listed are skipped.
    fn produce_tracks(&self) -> Result<Vec<TrackSpec>, SourceError> {
        if let Some(unknown) = self.onsets.keys().find(|name| self.mode.entry(name).is_none()) {
            return Err(SourceError::UnknownTrack {
                mode: self.mode.as_str(),
                name: unknown.clone(),
            });
        }

        let specs: Vec<TrackSpec> = self
            .mode
            .roster()
            .iter()
            .filter_map(|entry| {
                let raw = self.onsets.get(entry.name)?;
                let shifted: Vec<f64> = raw.iter().map(|t| t + entry.offset).collect();
                let kept: Vec<f64> = shifted.iter().copied().filter(|t| *t >= 0.0).collect();
                if kept.len() < shifted.len() {
                    log::warn!(
                        "track '{}': dropped {} onsets shifted below zero",
                        entry.name,
                        shifted.len() - kept.len()
                    );
                }
                let mut spec = TrackSpec::new(entry.name, entry.color, kept);
                spec.clip = self.clips.get(entry.name).cloned();
                Some(spec)
            })
            .collect();

        if specs.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_order_and_colors() {
        let table = OnsetTable::new(AnalysisMode::Stem)
            .with_track("vocals", vec![1.0])
            .with_track("drums", vec![0.5]);
        let specs = table.produce_tracks().unwrap();
        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["drums", "vocals"]);
        assert_eq!(specs[0].color, [220, 80, 70]);
        assert!((specs[1].onsets[0] - 0.97).abs() < 1e-12);
    }

    #[test]
    fn test_negative_onsets_dropped() {
        let table = OnsetTable::new(AnalysisMode::Stem).with_track("bass", vec![0.01, 0.5]);
        let specs = table.produce_tracks().unwrap();
        assert_eq!(specs[0].onsets.len(), 1);
    }

    #[test]
    fn test_unknown_track_rejected() {
        let table = OnsetTable::new(AnalysisMode::Piano).with_track("drums", vec![1.0]);
        assert_eq!(
            table.produce_tracks(),
            Err(SourceError::UnknownTrack {
                mode: "piano",
                name: "drums".to_string()
            })
        );
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(
            OnsetTable::new(AnalysisMode::DualBand).produce_tracks(),
            Err(SourceError::Empty)
        );
    }

    #[test]
    fn test_table_from_json() {
        let table: OnsetTable = serde_json::from_str(
            r#"{"mode":"twoband","onsets":{"low":[0.5],"high":[0.25]},"clips":{"low":"low.wav"}}"#,
        )
        .unwrap();
        let specs = table.produce_tracks().unwrap();
        assert_eq!(specs[0].name, "low");
        assert_eq!(specs[0].clip.as_deref(), Some("low.wav"));
        assert_eq!(AnalysisMode::parse("MultiBand"), Some(AnalysisMode::QuadBand));
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in AnalysisMode::ALL {
            assert_eq!(AnalysisMode::parse(mode.as_str()), Some(mode));
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
        assert_eq!(AnalysisMode::parse("stems"), Some(AnalysisMode::Stem));
        assert_eq!(AnalysisMode::parse("gd"), None);
    }

    #[test]
    fn test_roster_names_are_unique() {
        for mode in AnalysisMode::ALL {
            let roster = mode.roster();
            assert!(!roster.is_empty());
            for (i, e) in roster.iter().enumerate() {
                assert!(roster[i + 1..].iter().all(|o| o.name != e.name), "{} repeats {}", mode.as_str(), e.name);
            }
        }
        assert_eq!(AnalysisMode::Cinematic.roster().len(), 5);
        assert_eq!(AnalysisMode::Electronic.entry("top").unwrap().color, [70, 180, 220]);
    }
}
