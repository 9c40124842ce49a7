//! Viewport playback: camera, shake, particles and trail
//!
//! Purely visual. Reads the baked timeline, never writes it.

pub mod animator;
pub mod directives;
pub mod state;

pub use animator::{ViewportAnimator, smooth_camera};
pub use directives::{ParticleInstance, PointDirective, ViewportDirectives, WallDirective, WallStyle};
pub use state::{Particle, Trail, ViewportState};
