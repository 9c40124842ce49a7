//! Deterministic simulation module
//!
//! Baking must be pure and deterministic:
//! - Seeded RNG only, one stream per track
//! - No wall-clock reads
//! - No rendering or platform dependencies

pub mod bake;
pub mod timeline;

pub use bake::{bake, sanitize, validate};
pub use timeline::{Segment, Timeline, TimelineIndex};
