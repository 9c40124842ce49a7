//! Data-driven balance and feel constants
//!
//! Every tuned number lives here so it can be overridden from JSON without
//! touching the simulation code. Defaults are the shipped feel.

use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::consts::{LERP_FACTOR, SQUARE_SIZE, SQUARE_SPEED};

/// Parameters for trajectory baking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeParams {
    /// Travel speed of the point (units per second)
    pub speed: f32,
    /// Distance from the hit point to each wall endpoint
    pub wall_half_length: f32,
    /// Smallest turn at a bounce (degrees)
    pub turn_min_deg: f64,
    /// Largest turn at a bounce (degrees)
    pub turn_max_deg: f64,
}

impl Default for BakeParams {
    fn default() -> Self {
        Self {
            speed: SQUARE_SPEED,
            wall_half_length: 90.0,
            turn_min_deg: 75.0,
            turn_max_deg: 135.0,
        }
    }
}

/// Camera follow behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Fraction of the remaining distance closed each frame
    pub lerp_factor: f32,
    /// Seconds of velocity the camera leads by (cinema camera only)
    pub lookahead: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            lerp_factor: LERP_FACTOR,
            lookahead: 0.12,
        }
    }
}

/// Hit effects, particles and trail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTuning {
    /// Segment progress past which the bounce effect fires
    pub hit_threshold: f64,
    /// Segment progress past which the active wall flashes white
    pub flash_threshold: f64,
    /// Shake added per bounce (intensity is capped at 1.0)
    pub shake_bump: f32,
    /// Linear shake decay per second
    pub shake_decay: f32,
    /// Pixel amplitude of shake at intensity 1.0
    pub shake_amplitude: f32,
    /// Particles spawned per bounce
    pub particle_count: usize,
    pub particle_speed_min: f32,
    pub particle_speed_max: f32,
    /// Initial particle life (1.0 = full)
    pub particle_life: f32,
    /// Life lost per second
    pub particle_decay: f32,
    /// Per-frame velocity damping
    pub particle_drag: f32,
    pub particle_size_min: f32,
    pub particle_size_max: f32,
    /// Trail capacity at full trail quality
    pub trail_length: usize,
    /// Walls drawn behind the active segment
    pub walls_behind: usize,
    /// Walls drawn ahead of the active segment
    pub walls_ahead: usize,
    /// Side length of the moving square
    pub point_size: f32,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            hit_threshold: 0.91,
            flash_threshold: 0.92,
            shake_bump: 0.6,
            shake_decay: 3.0,
            shake_amplitude: 10.0,
            particle_count: 10,
            particle_speed_min: 50.0,
            particle_speed_max: 300.0,
            particle_life: 1.0,
            particle_decay: 1.5,
            particle_drag: 0.98,
            particle_size_min: 3.0,
            particle_size_max: 6.0,
            trail_length: 24,
            walls_behind: 5,
            walls_ahead: 15,
            point_size: SQUARE_SIZE,
        }
    }
}

/// Timing windows in seconds (absolute distance from the onset)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeWindows {
    pub perfect: f64,
    pub good: f64,
    pub bad: f64,
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self {
            perfect: 0.04,
            good: 0.10,
            bad: 0.18,
        }
    }
}

/// Points and health per judgment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTable {
    pub perfect_points: u64,
    pub good_points: u64,
    pub ok_points: u64,
    pub perfect_health: f32,
    pub good_health: f32,
    pub ok_health: f32,
    /// Health lost when an onset passes unplayed
    pub miss_penalty: f32,
    /// Health lost for an input that matches nothing
    pub extra_input_penalty: f32,
    pub max_health: f32,
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            perfect_points: 300,
            good_points: 100,
            ok_points: 50,
            perfect_health: 6.0,
            good_health: 3.0,
            ok_health: 0.5,
            miss_penalty: 10.0,
            extra_input_penalty: 4.0,
            max_health: 100.0,
        }
    }
}

/// Modifier timers (seconds of real time)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierTuning {
    pub first_shuffle_delay: f64,
    pub shuffle_interval: f64,
    pub focus_duration: f64,
}

impl Default for ModifierTuning {
    fn default() -> Self {
        Self {
            first_shuffle_delay: 8.0,
            shuffle_interval: 8.0,
            focus_duration: 5.0,
        }
    }
}

/// Session flow timers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub countdown: f64,
    /// Health lost per second of play
    pub health_drain: f32,
    /// How long a feedback label stays on screen
    pub feedback_duration: f64,
    /// Show the shuffle countdown this long before a shuffle
    pub shuffle_warning: f64,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            countdown: 3.0,
            health_drain: 5.0,
            feedback_duration: 0.3,
            shuffle_warning: 3.0,
        }
    }
}

/// All tuned constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub bake: BakeParams,
    pub camera: CameraTuning,
    pub effects: EffectTuning,
    pub windows: JudgeWindows,
    pub scoring: ScoringTable,
    pub modifiers: ModifierTuning,
    pub session: SessionTuning,
}

impl Tuning {
    /// Parse tuning overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the animator and judge cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        check(
            "camera.lerp_factor",
            cam.lerp_factor > 0.0 && cam.lerp_factor < 1.0,
            || format!("must be in (0, 1), got {}", cam.lerp_factor),
        )?;
        check(
            "camera.lookahead",
            cam.lookahead.is_finite() && cam.lookahead >= 0.0,
            || format!("must be finite and >= 0, got {}", cam.lookahead),
        )?;

        let fx = &self.effects;
        check(
            "effects.hit_threshold",
            (0.0..=1.0).contains(&fx.hit_threshold),
            || format!("must be in [0, 1], got {}", fx.hit_threshold),
        )?;
        check(
            "effects.flash_threshold",
            (0.0..=1.0).contains(&fx.flash_threshold),
            || format!("must be in [0, 1], got {}", fx.flash_threshold),
        )?;
        ordered_range(
            "effects.particle_speed_min",
            fx.particle_speed_min,
            fx.particle_speed_max,
        )?;
        ordered_range(
            "effects.particle_size_min",
            fx.particle_size_min,
            fx.particle_size_max,
        )?;
        check(
            "effects.particle_drag",
            (0.0..=1.0).contains(&fx.particle_drag),
            || format!("must be in [0, 1], got {}", fx.particle_drag),
        )?;
        for (field, value) in [
            ("effects.shake_decay", fx.shake_decay),
            ("effects.particle_decay", fx.particle_decay),
            ("effects.particle_life", fx.particle_life),
        ] {
            check(field, value.is_finite() && value >= 0.0, || {
                format!("must be finite and >= 0, got {value}")
            })?;
        }

        let w = &self.windows;
        check(
            "windows",
            w.perfect > 0.0 && w.perfect <= w.good && w.good <= w.bad && w.bad.is_finite(),
            || {
                format!(
                    "need 0 < perfect <= good <= bad, got {} / {} / {}",
                    w.perfect, w.good, w.bad
                )
            },
        )?;

        check(
            "scoring.max_health",
            self.scoring.max_health.is_finite() && self.scoring.max_health > 0.0,
            || format!("must be finite and > 0, got {}", self.scoring.max_health),
        )?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check(
    field: &'static str,
    ok: bool,
    reason: impl FnOnce() -> String,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason(),
        })
    }
}

/// Both ends finite, non-negative and `min <= max`
fn ordered_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    check(
        field,
        min.is_finite() && max.is_finite() && min >= 0.0 && min <= max,
        || format!("range {min}..={max} is empty or negative"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "windows": { "bad": 0.2 }, "bake": { "speed": 400.0 } }"#)
            .unwrap();
        assert_eq!(tuning.windows.bad, 0.2);
        assert_eq!(tuning.windows.perfect, 0.04);
        assert_eq!(tuning.bake.speed, 400.0);
        assert_eq!(tuning.bake.turn_min_deg, 75.0);
        assert_eq!(tuning.effects.hit_threshold, 0.91);
    }

    #[test]
    fn test_round_trip_json() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    fn rejected_field(json: &str) -> &'static str {
        match Tuning::from_json(json) {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_particle_ranges() {
        assert_eq!(
            rejected_field(r#"{ "effects": { "particle_speed_min": 400.0 } }"#),
            "effects.particle_speed_min"
        );
        assert_eq!(
            rejected_field(r#"{ "effects": { "particle_size_max": 1.0 } }"#),
            "effects.particle_size_min"
        );
    }

    #[test]
    fn test_rejects_overshooting_lerp() {
        assert_eq!(rejected_field(r#"{ "camera": { "lerp_factor": 1.8 } }"#), "camera.lerp_factor");
        assert_eq!(rejected_field(r#"{ "camera": { "lerp_factor": 0.0 } }"#), "camera.lerp_factor");
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        assert_eq!(
            rejected_field(r#"{ "effects": { "hit_threshold": 1.5 } }"#),
            "effects.hit_threshold"
        );
        assert_eq!(
            rejected_field(r#"{ "effects": { "hit_threshold": -0.1 } }"#),
            "effects.hit_threshold"
        );
    }

    #[test]
    fn test_rejects_unordered_windows() {
        assert_eq!(rejected_field(r#"{ "windows": { "good": 0.2 } }"#), "windows");
        assert_eq!(rejected_field(r#"{ "windows": { "perfect": 0.12 } }"#), "windows");
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(Tuning::from_json("{ not json").is_err());
    }
}
