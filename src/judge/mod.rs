//! Rhythm judgment
//!
//! Scores input against the same onsets the trajectory was baked from.
//! Owns no visual state.

#[allow(clippy::module_inception)]
pub mod judge;
pub mod modifiers;
pub mod scoreboard;

pub use judge::{Feedback, JudgmentState, Outcome, RhythmJudge, Tally, Tier};
pub use modifiers::{ModifierEvents, ModifierState, Modifiers};
pub use scoreboard::Scoreboard;
