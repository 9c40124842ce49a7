//! Sonir - onset-driven bounce visualizer and rhythm game core
//!
//! Core modules:
//! - `sim`: Deterministic trajectory baking and time lookup
//! - `viewport`: Per-track camera, shake, particles and trail
//! - `judge`: Timing judgment, scoring and modifiers
//! - `stage`: Visual playback of all tracks
//! - `session`: Rhythm game session (stage + judgment)
//! - `tuning`: Data-driven feel and balance constants

pub mod error;
pub mod input;
pub mod judge;
pub mod layout;
pub mod session;
pub mod settings;
pub mod sim;
pub mod source;
pub mod stage;
pub mod track;
pub mod tuning;
pub mod viewport;

pub use error::{BakeError, ConfigError, SessionError, SourceError};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// RGB color triple
pub type Rgb = [u8; 3];

/// Display and physics defaults
pub mod consts {
    use super::Rgb;

    /// Default output size
    pub const WIDTH: u32 = 1280;
    pub const HEIGHT: u32 = 720;
    /// Frame rate for realtime and headless playback
    pub const FPS: u32 = 60;

    /// Travel speed of the square (units per second)
    pub const SQUARE_SPEED: f32 = 850.0;
    pub const SQUARE_SIZE: f32 = 22.0;
    /// Camera smoothing per frame
    pub const LERP_FACTOR: f32 = 0.08;

    pub const COLOR_BG: Rgb = [12, 14, 20];
    pub const COLOR_SQUARE: Rgb = [240, 240, 240];
    pub const COLOR_SQUARE_BORDER: Rgb = [45, 50, 65];
    pub const COLOR_PAST_WALL: Rgb = [40, 42, 50];
    pub const COLOR_FLASH: Rgb = [255, 255, 255];
}

/// Unit vector for a heading angle (radians)
#[inline]
pub fn heading(angle: f64) -> Vec2 {
    Vec2::new(angle.cos() as f32, angle.sin() as f32)
}

/// Half-intensity version of a color
#[inline]
pub fn dim(color: Rgb) -> Rgb {
    [color[0] / 2, color[1] / 2, color[2] / 2]
}

/// Convert an 8-bit color to normalized RGBA
#[inline]
pub fn rgb_to_rgba(color: Rgb, alpha: f32) -> [f32; 4] {
    [
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
        alpha,
    ]
}
