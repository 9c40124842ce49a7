//! Baked trajectory data and time lookup

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One leg of the trajectory, between two consecutive onsets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time (seconds)
    pub t0: f64,
    /// End time, strictly greater than `t0`
    pub t1: f64,
    /// Start position
    pub p0: Vec2,
    /// End position (the hit point)
    pub p1: Vec2,
    /// Wall endpoints, centered on `p1`
    pub w1: Vec2,
    pub w2: Vec2,
}

impl Segment {
    #[inline]
    pub fn duration(&self) -> f64 {
        self.t1 - self.t0
    }

    /// Fraction of the segment elapsed at `time`, clamped to [0, 1]
    pub fn progress(&self, time: f64) -> f64 {
        let duration = self.duration();
        if duration > 0.0 {
            ((time - self.t0) / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Interpolated position at a progress value
    #[inline]
    pub fn position_at(&self, progress: f64) -> Vec2 {
        self.p0 + (self.p1 - self.p0) * progress as f32
    }

    /// Constant velocity along the segment (units per second)
    pub fn velocity(&self) -> Vec2 {
        let duration = self.duration();
        if duration > 0.0 {
            (self.p1 - self.p0) / duration as f32
        } else {
            Vec2::ZERO
        }
    }
}

/// The baked path of one track
///
/// `segments[i]` spans `onsets[i]..onsets[i + 1]`, so a non-empty timeline
/// always holds exactly one more onset than segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    segments: Vec<Segment>,
    onsets: Vec<f64>,
    /// Whether a 0.0 onset was inserted ahead of the input
    anchored: bool,
}

impl Timeline {
    pub(crate) fn from_parts(segments: Vec<Segment>, onsets: Vec<f64>, anchored: bool) -> Self {
        debug_assert!(segments.is_empty() || segments.len() + 1 == onsets.len());
        Self {
            segments,
            onsets,
            anchored,
        }
    }

    /// Empty timeline (no onsets, no segments)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Sanitized onsets the timeline was built from (starts at 0.0)
    pub fn onsets(&self) -> &[f64] {
        &self.onsets
    }

    /// Onsets that came from the input, without the inserted 0.0 anchor
    pub fn playable_onsets(&self) -> &[f64] {
        if self.anchored {
            self.onsets.get(1..).unwrap_or(&[])
        } else {
            &self.onsets
        }
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End time of the final segment
    pub fn duration(&self) -> f64 {
        self.segments.last().map(|s| s.t1).unwrap_or(0.0)
    }

    pub fn index(&self) -> TimelineIndex<'_> {
        TimelineIndex::new(&self.onsets)
    }
}

/// Binary-search lookup over a sorted onset array
#[derive(Debug, Clone, Copy)]
pub struct TimelineIndex<'a> {
    onsets: &'a [f64],
}

impl<'a> TimelineIndex<'a> {
    pub fn new(onsets: &'a [f64]) -> Self {
        Self { onsets }
    }

    /// Index of the segment playing at `time`
    ///
    /// Returns `i` with `onsets[i] <= time < onsets[i + 1]`. Times before the
    /// first onset clamp to 0; times at or past the final onset (and any time
    /// on a timeline with fewer than two onsets) have no active segment.
    pub fn active_segment(&self, time: f64) -> Option<usize> {
        let segments = self.onsets.len().saturating_sub(1);
        if segments == 0 {
            return None;
        }
        let at_or_before = self.onsets.partition_point(|&t| t <= time);
        match at_or_before {
            0 => Some(0),
            n if n > segments => None,
            n => Some(n - 1),
        }
    }

    /// Index of the first onset at or after `time` (may equal `len`)
    pub fn first_at_or_after(&self, time: f64) -> usize {
        self.onsets.partition_point(|&t| t < time)
    }

    /// The onset at or after `time` and the one just before it
    pub fn neighbors(&self, time: f64) -> (Option<usize>, Option<usize>) {
        let next = self.first_at_or_after(time);
        let after = (next < self.onsets.len()).then_some(next);
        let before = next.checked_sub(1);
        (after, before)
    }

    pub fn onsets(&self) -> &'a [f64] {
        self.onsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(t0: f64, t1: f64) -> Segment {
        Segment {
            t0,
            t1,
            p0: Vec2::ZERO,
            p1: Vec2::new(100.0, 0.0),
            w1: Vec2::new(100.0, 10.0),
            w2: Vec2::new(100.0, -10.0),
        }
    }

    #[test]
    fn test_active_segment_interior() {
        let onsets = [0.0, 1.0, 2.0, 3.0];
        let idx = TimelineIndex::new(&onsets);
        assert_eq!(idx.active_segment(0.0), Some(0));
        assert_eq!(idx.active_segment(0.99), Some(0));
        assert_eq!(idx.active_segment(1.0), Some(1));
        assert_eq!(idx.active_segment(1.5), Some(1));
        assert_eq!(idx.active_segment(2.999), Some(2));
    }

    #[test]
    fn test_active_segment_boundaries() {
        let onsets = [0.0, 1.0, 2.0];
        let idx = TimelineIndex::new(&onsets);
        assert_eq!(idx.active_segment(-3.0), Some(0));
        assert_eq!(idx.active_segment(2.0), None);
        assert_eq!(idx.active_segment(50.0), None);
    }

    #[test]
    fn test_active_segment_degenerate() {
        assert_eq!(TimelineIndex::new(&[]).active_segment(1.0), None);
        assert_eq!(TimelineIndex::new(&[0.0]).active_segment(0.0), None);
    }

    #[test]
    fn test_neighbors() {
        let onsets = [0.0, 1.0, 2.0];
        let idx = TimelineIndex::new(&onsets);
        assert_eq!(idx.neighbors(1.2), (Some(2), Some(1)));
        assert_eq!(idx.neighbors(1.0), (Some(1), Some(0)));
        assert_eq!(idx.neighbors(-1.0), (Some(0), None));
        assert_eq!(idx.neighbors(9.0), (None, Some(2)));
        assert_eq!(TimelineIndex::new(&[]).neighbors(0.0), (None, None));
    }

    #[test]
    fn test_progress_clamped() {
        let s = seg(1.0, 2.0);
        assert_eq!(s.progress(0.5), 0.0);
        assert_eq!(s.progress(1.5), 0.5);
        assert_eq!(s.progress(3.0), 1.0);
        assert_eq!(s.position_at(0.5), Vec2::new(50.0, 0.0));
        assert_eq!(s.velocity(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_zero_duration_progress_is_zero() {
        let s = seg(1.0, 1.0);
        assert_eq!(s.progress(1.0), 0.0);
        assert_eq!(s.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_playable_onsets_skip_anchor() {
        let t = Timeline::from_parts(vec![seg(0.0, 0.5), seg(0.5, 1.0)], vec![0.0, 0.5, 1.0], true);
        assert_eq!(t.playable_onsets(), &[0.5, 1.0]);
        assert_eq!(t.duration(), 1.0);
        assert_eq!(t.index().active_segment(0.7), Some(1));
    }

    #[test]
    fn test_anchored_without_onsets_is_empty() {
        let t: Timeline =
            serde_json::from_str(r#"{ "segments": [], "onsets": [], "anchored": true }"#).unwrap();
        assert!(t.playable_onsets().is_empty());
        assert_eq!(t.index().active_segment(0.0), None);
    }
}
