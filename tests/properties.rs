//! Property tests for baking, lookup, camera smoothing and judgment

use glam::Vec2;
use proptest::prelude::*;

use sonir::judge::RhythmJudge;
use sonir::sim::{TimelineIndex, bake};
use sonir::tuning::{BakeParams, JudgeWindows, ScoringTable};
use sonir::viewport::smooth_camera;

/// Strictly increasing onsets built from positive gaps
fn onsets() -> impl Strategy<Value = Vec<f64>> {
    (0.0f64..3.0, prop::collection::vec(0.01f64..2.0, 0..40)).prop_map(|(start, gaps)| {
        gaps.iter()
            .scan(start, |t, gap| {
                let now = *t;
                *t += gap;
                Some(now)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn bake_is_deterministic(onsets in onsets(), seed in any::<u64>()) {
        let params = BakeParams::default();
        let a = bake(&onsets, &params, seed).unwrap();
        let b = bake(&onsets, &params, seed).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn trajectory_is_continuous(onsets in onsets(), seed in any::<u64>()) {
        let timeline = bake(&onsets, &BakeParams::default(), seed).unwrap();
        if let Some(first) = timeline.segments().first() {
            prop_assert_eq!(first.p0, Vec2::ZERO);
        }
        for pair in timeline.segments().windows(2) {
            prop_assert_eq!(pair[0].p1, pair[1].p0);
            prop_assert_eq!(pair[0].t1, pair[1].t0);
        }
    }

    #[test]
    fn anchored_onsets_increase(onsets in onsets(), seed in any::<u64>()) {
        let timeline = bake(&onsets, &BakeParams::default(), seed).unwrap();
        if onsets.is_empty() {
            prop_assert!(timeline.is_empty());
        } else {
            prop_assert_eq!(timeline.onsets()[0], 0.0);
            prop_assert_eq!(timeline.len() + 1, timeline.onsets().len());
            prop_assert!(timeline.onsets().windows(2).all(|w| w[0] < w[1]));
            prop_assert!(timeline.segments().iter().all(|s| s.t0 < s.t1));
        }
    }

    #[test]
    fn walls_are_centered_on_hits(onsets in onsets(), seed in any::<u64>()) {
        let params = BakeParams::default();
        let timeline = bake(&onsets, &params, seed).unwrap();
        for seg in timeline.segments() {
            let mid = (seg.w1 + seg.w2) * 0.5;
            prop_assert!(mid.distance(seg.p1) < 0.05);
            let half = seg.w1.distance(seg.p1);
            prop_assert!((half - params.wall_half_length).abs() < 0.05);
        }
    }

    #[test]
    fn index_finds_the_playing_segment(onsets in onsets(), seed in any::<u64>(), frac in 0.0f64..1.2) {
        let timeline = bake(&onsets, &BakeParams::default(), seed).unwrap();
        let time = timeline.duration() * frac;
        match timeline.index().active_segment(time) {
            Some(i) => {
                let seg = timeline.segment(i).unwrap();
                prop_assert!(seg.t0 <= time && time < seg.t1);
            }
            None => prop_assert!(timeline.len() == 0 || time >= timeline.duration()),
        }
    }

    #[test]
    fn neighbors_bracket_the_query(onsets in onsets(), time in -1.0f64..90.0) {
        let index = TimelineIndex::new(&onsets);
        let (after, before) = index.neighbors(time);
        if let Some(a) = after {
            prop_assert!(onsets[a] >= time);
        }
        if let Some(b) = before {
            prop_assert!(onsets[b] < time);
        }
    }

    #[test]
    fn camera_converges(
        sx in -5000.0f32..5000.0,
        sy in -5000.0f32..5000.0,
        tx in -5000.0f32..5000.0,
        ty in -5000.0f32..5000.0,
    ) {
        let target = Vec2::new(tx, ty);
        let mut camera = Vec2::new(sx, sy);
        let mut gap = camera.distance(target);
        for _ in 0..300 {
            let before = target - camera;
            camera = smooth_camera(camera, target, 0.08);
            let after = target - camera;
            // Each axis closes in without crossing the target
            prop_assert!(after.x * before.x >= 0.0 && after.x.abs() <= before.x.abs());
            prop_assert!(after.y * before.y >= 0.0 && after.y.abs() <= before.y.abs());

            let next = camera.distance(target);
            prop_assert!(next <= gap);
            if gap > 0.1 {
                prop_assert!(next < gap, "stalled at gap {}", gap);
            }
            gap = next;
        }
        prop_assert!(gap < 0.05);
    }

    #[test]
    fn every_onset_is_resolved_exactly_once(
        onsets in onsets(),
        taps in prop::collection::vec(0.0f64..90.0, 0..30),
    ) {
        let judge = RhythmJudge::new(JudgeWindows::default(), ScoringTable::default(), false);
        let mut state = judge.new_state(&onsets);
        let mut taps = taps;
        taps.sort_by(f64::total_cmp);

        let bad = JudgeWindows::default().bad;
        let mut hits = 0u32;
        for tap in taps {
            judge.sweep_misses(&mut state, &onsets, tap);
            for (i, onset) in onsets.iter().enumerate() {
                if onset + bad < tap {
                    prop_assert!(state.is_resolved(i), "onset {} left open at {}", onset, tap);
                }
            }
            if matches!(judge.judge_hit(&mut state, &onsets, tap), sonir::judge::Outcome::Hit { .. }) {
                hits += 1;
            }
        }
        judge.sweep_misses(&mut state, &onsets, 1000.0);

        prop_assert_eq!(state.resolved_count(), onsets.len());
        prop_assert_eq!(state.tally.miss + hits, onsets.len() as u32);
        prop_assert_eq!(state.cursor(), onsets.len());
        prop_assert!(state.board.health >= 0.0 && state.board.health <= state.board.max_health);
    }
}
