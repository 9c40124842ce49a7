//! Draw directives handed to the rendering layer
//!
//! Everything is already in viewport-local pixel coordinates (camera and
//! shake applied). The renderer only rasterizes.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::Serialize;

use crate::Rgb;

/// Where a wall sits relative to the playing segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WallStyle {
    Past,
    Active,
    Future,
}

/// A wall line to draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WallDirective {
    pub a: Vec2,
    pub b: Vec2,
    pub style: WallStyle,
    /// Active wall near its bounce, drawn white and thick
    pub flash: bool,
    pub color: Rgb,
    pub width: f32,
}

impl WallDirective {
    /// Style a wall the standard way
    pub fn styled(a: Vec2, b: Vec2, style: WallStyle, flash: bool, track_color: Rgb) -> Self {
        let (color, width) = match style {
            WallStyle::Active if flash => (crate::consts::COLOR_FLASH, 12.0),
            WallStyle::Active => (track_color, 7.0),
            WallStyle::Past => (crate::consts::COLOR_PAST_WALL, 2.0),
            WallStyle::Future => (crate::dim(track_color), 4.0),
        };
        Self {
            a,
            b,
            style,
            flash,
            color,
            width,
        }
    }
}

/// The moving square
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointDirective {
    pub center: Vec2,
    pub size: f32,
    pub color: Rgb,
    /// Outline drawn around the square
    pub border: Rgb,
    pub glow: bool,
}

/// GPU-ready particle instance
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub size: f32,
    pub color: [f32; 4],
}

/// Everything one viewport needs drawn this frame
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewportDirectives {
    pub camera: Vec2,
    pub shake: Vec2,
    /// Ordered oldest wall first
    pub walls: Vec<WallDirective>,
    pub point: Option<PointDirective>,
    pub particles: Vec<ParticleInstance>,
    /// Newest point first
    pub trail: Vec<Vec2>,
    /// Background brightness boost in [0, 1]
    pub background_pulse: f32,
}
