//! Timing judgment against a track's onsets
//!
//! One `JudgmentState` per track. The only state is "advancing": a cursor
//! walks the onsets while a resolved mark guarantees each onset is judged
//! at most once, either as a hit or as a miss.

use serde::Serialize;

use super::scoreboard::Scoreboard;
use crate::Rgb;
use crate::sim::TimelineIndex;
use crate::tuning::{JudgeWindows, ScoringTable, Tuning};

/// Scoring tier of a matched input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Perfect,
    Good,
    Ok,
}

/// Result of judging one event
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Outcome {
    /// Input matched onset `onset`; `offset` is input time minus onset time
    Hit { tier: Tier, onset: usize, offset: f64 },
    /// Onset `onset` passed without input
    Miss { onset: usize },
    /// Input matched nothing
    Extra,
    /// Track has no onsets at all
    Ignored,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Hit { tier: Tier::Perfect, .. } => "PERFECT",
            Outcome::Hit { tier: Tier::Good, .. } => "GOOD",
            Outcome::Hit { tier: Tier::Ok, .. } => "OK",
            Outcome::Miss { .. } => "MISS",
            Outcome::Extra => "X",
            Outcome::Ignored => "",
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            Outcome::Hit { tier: Tier::Perfect, .. } => [100, 255, 255],
            Outcome::Hit { tier: Tier::Good, .. } => [100, 255, 100],
            Outcome::Hit { tier: Tier::Ok, .. } => [200, 200, 100],
            Outcome::Miss { .. } | Outcome::Extra => [255, 50, 50],
            Outcome::Ignored => [255, 255, 255],
        }
    }

    pub fn is_penalty(&self) -> bool {
        matches!(self, Outcome::Miss { .. } | Outcome::Extra)
    }
}

/// A label shown to the player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub label: &'static str,
    pub color: Rgb,
    /// When it was raised (seconds on the clock that raised it)
    pub at: f64,
}

impl Feedback {
    pub fn new(label: &'static str, color: Rgb, at: f64) -> Self {
        Self { label, color, at }
    }

    pub fn from_outcome(outcome: &Outcome, at: f64) -> Option<Self> {
        match outcome {
            Outcome::Ignored => None,
            o => Some(Self::new(o.label(), o.color(), at)),
        }
    }
}

/// Per-tier tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub perfect: u32,
    pub good: u32,
    pub ok: u32,
    pub miss: u32,
    pub extra: u32,
}

impl Tally {
    pub(crate) fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Hit { tier: Tier::Perfect, .. } => self.perfect += 1,
            Outcome::Hit { tier: Tier::Good, .. } => self.good += 1,
            Outcome::Hit { tier: Tier::Ok, .. } => self.ok += 1,
            Outcome::Miss { .. } => self.miss += 1,
            Outcome::Extra => self.extra += 1,
            Outcome::Ignored => {}
        }
    }
}

/// Judgment state for one track
#[derive(Debug, Clone)]
pub struct JudgmentState {
    /// Next onset the miss sweep will look at; never moves backwards
    cursor: usize,
    /// Onsets already hit or missed, by index
    resolved: Vec<bool>,
    pub board: Scoreboard,
    pub tally: Tally,
    pub last_feedback: Option<Feedback>,
}

impl JudgmentState {
    pub fn new(onset_count: usize, max_health: f32) -> Self {
        Self {
            cursor: 0,
            resolved: vec![false; onset_count],
            board: Scoreboard::new(max_health),
            tally: Tally::default(),
            last_feedback: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_resolved(&self, onset: usize) -> bool {
        self.resolved.get(onset).copied().unwrap_or(true)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.iter().filter(|r| **r).count()
    }

    fn record(&mut self, outcome: Outcome, judge: &RhythmJudge, time: f64) {
        self.board.apply(&outcome, &judge.scoring, judge.sudden_death);
        self.tally.record(&outcome);
        if let Some(feedback) = Feedback::from_outcome(&outcome, time) {
            self.last_feedback = Some(feedback);
        }
    }
}

/// Scores input timing against onsets
#[derive(Debug, Clone)]
pub struct RhythmJudge {
    windows: JudgeWindows,
    scoring: ScoringTable,
    sudden_death: bool,
}

impl RhythmJudge {
    pub fn new(windows: JudgeWindows, scoring: ScoringTable, sudden_death: bool) -> Self {
        Self {
            windows,
            scoring,
            sudden_death,
        }
    }

    pub fn from_tuning(tuning: &Tuning, sudden_death: bool) -> Self {
        Self::new(tuning.windows, tuning.scoring, sudden_death)
    }

    pub fn windows(&self) -> &JudgeWindows {
        &self.windows
    }

    pub fn scoring(&self) -> &ScoringTable {
        &self.scoring
    }

    pub fn sudden_death(&self) -> bool {
        self.sudden_death
    }

    /// Fresh state sized for `onsets`
    pub fn new_state(&self, onsets: &[f64]) -> JudgmentState {
        JudgmentState::new(onsets.len(), self.scoring.max_health)
    }

    /// Tier for an absolute timing error, or None outside the BAD window
    pub fn classify(&self, error: f64) -> Option<Tier> {
        let error = error.abs();
        if error < self.windows.perfect {
            Some(Tier::Perfect)
        } else if error < self.windows.good {
            Some(Tier::Good)
        } else if error < self.windows.bad {
            Some(Tier::Ok)
        } else {
            None
        }
    }

    /// Resolve every onset more than the BAD window behind `time` as a miss
    ///
    /// Run before handling the frame's input.
    pub fn sweep_misses(&self, state: &mut JudgmentState, onsets: &[f64], time: f64) -> Vec<Outcome> {
        let mut misses = Vec::new();
        while let Some(&onset) = onsets.get(state.cursor) {
            if time <= onset + self.windows.bad {
                break;
            }
            let index = state.cursor;
            if !state.is_resolved(index) {
                state.resolved[index] = true;
                let outcome = Outcome::Miss { onset: index };
                state.record(outcome, self, time);
                log::debug!("miss at onset {index} ({onset:.3}s)");
                misses.push(outcome);
            }
            state.cursor += 1;
        }
        misses
    }

    /// Judge one input at `time`
    pub fn judge_hit(&self, state: &mut JudgmentState, onsets: &[f64], time: f64) -> Outcome {
        let (after, before) = TimelineIndex::new(onsets).neighbors(time);
        if after.is_none() && before.is_none() {
            return Outcome::Ignored;
        }

        let closest = [after, before]
            .into_iter()
            .flatten()
            .filter(|&i| !state.is_resolved(i))
            .min_by(|&a, &b| {
                let da = (onsets[a] - time).abs();
                let db = (onsets[b] - time).abs();
                da.total_cmp(&db)
            });

        let outcome = match closest {
            Some(index) => {
                let offset = time - onsets[index];
                match self.classify(offset) {
                    Some(tier) => {
                        state.resolved[index] = true;
                        Outcome::Hit {
                            tier,
                            onset: index,
                            offset,
                        }
                    }
                    None => Outcome::Extra,
                }
            }
            None => Outcome::Extra,
        };
        state.record(outcome, self, time);
        outcome
    }

    /// Onset an autoplayer would hit at `time`, if any
    pub fn autoplay_target(&self, state: &JudgmentState, onsets: &[f64], time: f64) -> Option<usize> {
        let next = TimelineIndex::new(onsets).first_at_or_after(time);
        onsets
            .get(next)
            .filter(|&&onset| (onset - time).abs() < self.windows.perfect)
            .map(|_| next)
            .filter(|&i| !state.is_resolved(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judge() -> RhythmJudge {
        RhythmJudge::new(
            JudgeWindows {
                perfect: 0.04,
                good: 0.10,
                bad: 0.18,
            },
            ScoringTable::default(),
            false,
        )
    }

    #[test]
    fn test_perfect_then_extra() {
        let judge = judge();
        let onsets = [10.0];
        let mut state = judge.new_state(&onsets);

        let first = judge.judge_hit(&mut state, &onsets, 10.03);
        assert!(matches!(first, Outcome::Hit { tier: Tier::Perfect, onset: 0, .. }));
        assert_eq!(state.board.combo, 1);
        assert!(state.is_resolved(0));

        let second = judge.judge_hit(&mut state, &onsets, 10.031);
        assert_eq!(second, Outcome::Extra);
        assert_eq!(state.board.combo, 0);
        assert_eq!(state.board.health, 100.0 - 4.0);
        assert_eq!(state.last_feedback.as_ref().unwrap().label, "X");
    }

    #[test]
    fn test_tiers() {
        let judge = judge();
        assert_eq!(judge.classify(0.0), Some(Tier::Perfect));
        assert_eq!(judge.classify(-0.039), Some(Tier::Perfect));
        assert_eq!(judge.classify(0.04), Some(Tier::Good));
        assert_eq!(judge.classify(-0.12), Some(Tier::Ok));
        assert_eq!(judge.classify(0.18), None);
    }

    #[test]
    fn test_far_input_is_extra_and_leaves_onset_open() {
        let judge = judge();
        let onsets = [1.0, 3.0];
        let mut state = judge.new_state(&onsets);
        assert_eq!(judge.judge_hit(&mut state, &onsets, 2.0), Outcome::Extra);
        assert!(!state.is_resolved(0));
        assert!(!state.is_resolved(1));
    }

    #[test]
    fn test_picks_closest_unresolved_neighbor() {
        let judge = judge();
        let onsets = [1.0, 1.1];
        let mut state = judge.new_state(&onsets);
        let a = judge.judge_hit(&mut state, &onsets, 1.07);
        assert!(matches!(a, Outcome::Hit { onset: 1, tier: Tier::Perfect, .. }));
        // 1.1 is taken, 1.0 is the remaining neighbor
        let b = judge.judge_hit(&mut state, &onsets, 1.08);
        assert!(matches!(b, Outcome::Hit { onset: 0, tier: Tier::Good, .. }));
        assert_eq!(state.board.combo, 2);
        assert_eq!(state.board.score, 400);
    }

    #[test]
    fn test_miss_sweep_scenario() {
        let judge = judge();
        let onsets = [5.0];
        let mut state = judge.new_state(&onsets);
        state.board.combo = 4;

        assert!(judge.sweep_misses(&mut state, &onsets, 5.17).is_empty());
        let misses = judge.sweep_misses(&mut state, &onsets, 5.19);
        assert_eq!(misses, vec![Outcome::Miss { onset: 0 }]);
        assert!(state.is_resolved(0));
        assert_eq!(state.board.combo, 0);
        assert_eq!(state.board.health, 90.0);

        // Idempotent
        assert!(judge.sweep_misses(&mut state, &onsets, 6.0).is_empty());
        assert_eq!(state.tally.miss, 1);
    }

    #[test]
    fn test_sweep_skips_hit_onsets() {
        let judge = judge();
        let onsets = [1.0, 2.0, 3.0];
        let mut state = judge.new_state(&onsets);
        judge.judge_hit(&mut state, &onsets, 2.01);
        let misses = judge.sweep_misses(&mut state, &onsets, 10.0);
        assert_eq!(misses, vec![Outcome::Miss { onset: 0 }, Outcome::Miss { onset: 2 }]);
        assert_eq!(state.cursor(), 3);
        assert_eq!(state.resolved_count(), 3);
    }

    #[test]
    fn test_missed_onset_cannot_be_hit() {
        let judge = judge();
        let onsets = [1.0];
        let mut state = judge.new_state(&onsets);
        judge.sweep_misses(&mut state, &onsets, 1.2);
        assert_eq!(judge.judge_hit(&mut state, &onsets, 1.1), Outcome::Extra);
    }

    #[test]
    fn test_sudden_death() {
        let judge = RhythmJudge::new(JudgeWindows::default(), ScoringTable::default(), true);
        let onsets = [1.0];
        let mut state = judge.new_state(&onsets);
        judge.sweep_misses(&mut state, &onsets, 2.0);
        assert!(state.board.is_depleted());
    }

    #[test]
    fn test_empty_track_is_ignored() {
        let judge = judge();
        let mut state = judge.new_state(&[]);
        assert_eq!(judge.judge_hit(&mut state, &[], 1.0), Outcome::Ignored);
        assert_eq!(state.board.health, 100.0);
        assert!(judge.sweep_misses(&mut state, &[], 5.0).is_empty());
    }

    #[test]
    fn test_autoplay_target() {
        let judge = judge();
        let onsets = [1.0, 2.0];
        let mut state = judge.new_state(&onsets);
        assert_eq!(judge.autoplay_target(&state, &onsets, 0.5), None);
        assert_eq!(judge.autoplay_target(&state, &onsets, 0.97), Some(0));
        judge.judge_hit(&mut state, &onsets, 0.97);
        assert_eq!(judge.autoplay_target(&state, &onsets, 0.98), None);
    }
}
