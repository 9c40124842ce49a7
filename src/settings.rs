//! Visual effect settings
//!
//! Passed by value into the stage at construction and never mutated while
//! playing. Serializable so a frontend can persist it however it likes.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles per viewport for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 20,
            QualityPreset::Medium => 120,
            QualityPreset::High => 400,
        }
    }

    /// Trail length multiplier (1.0 = full)
    pub fn trail_quality(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.25,
            QualityPreset::Medium => 0.6,
            QualityPreset::High => 1.0,
        }
    }
}

/// Effect toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on bounces
    pub screen_shake: bool,
    /// Bounce particle bursts
    pub particles: bool,
    /// Trail behind the moving square
    pub trails: bool,
    /// Glow pass on the square and active wall
    pub glow: bool,
    /// Background pulses with hit energy
    pub dynamic_background: bool,
    /// Camera leads the motion instead of centering on it
    pub cinema_camera: bool,

    // === HUD ===
    /// Judgment overlay (score, health, hints)
    pub ui: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            screen_shake: true,
            particles: true,
            trails: true,
            glow: true,
            dynamic_background: true,
            cinema_camera: true,

            ui: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset disables the costlier passes
        if preset == QualityPreset::Low {
            self.glow = false;
            self.dynamic_background = false;
        }
    }

    /// Everything off; only geometry and the square are drawn
    pub fn minimal() -> Self {
        Self {
            quality: QualityPreset::Low,
            screen_shake: false,
            particles: false,
            trails: false,
            glow: false,
            dynamic_background: false,
            cinema_camera: false,
            ui: false,
            reduced_motion: false,
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective wall flash (respects reduced_motion)
    pub fn effective_flash(&self) -> bool {
        !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Effective trail capacity for a base length
    pub fn trail_capacity(&self, base: usize) -> usize {
        if !self.trails {
            0
        } else {
            ((base as f32 * self.quality.trail_quality()).round() as usize).max(2)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
    }

    #[test]
    fn test_low_preset_disables_costly_passes() {
        let s = Settings::from_preset(QualityPreset::Low);
        assert!(!s.glow);
        assert!(!s.dynamic_background);
        assert!(s.particles);
    }

    #[test]
    fn test_reduced_motion_suppresses_shake_and_flash() {
        let s = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!s.effective_screen_shake());
        assert!(!s.effective_flash());
    }

    #[test]
    fn test_disabled_effects_have_zero_capacity() {
        let s = Settings::minimal();
        assert_eq!(s.max_particles(), 0);
        assert_eq!(s.trail_capacity(24), 0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json(r#"{ "trails": false, "quality": "High" }"#).unwrap();
        assert!(!s.trails);
        assert_eq!(s.quality, QualityPreset::High);
        assert!(s.screen_shake);
        assert_eq!(s.trail_capacity(24), 0);
        assert_eq!(s.max_particles(), 400);
    }
}
