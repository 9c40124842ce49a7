//! Trajectory baking
//!
//! Turns onset timestamps into a piecewise-linear path that bounces off an
//! implicit wall at every onset. Same onsets and seed, same timeline, bit
//! for bit.

use std::f64::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::timeline::{Segment, Timeline};
use crate::heading;
use crate::tuning::BakeParams;
use crate::BakeError;

/// Check the input contract without modifying anything
pub fn validate(onsets: &[f64], params: &BakeParams) -> Result<(), BakeError> {
    if !params.speed.is_finite() || params.speed <= 0.0 {
        return Err(BakeError::InvalidSpeed(params.speed));
    }
    if !params.wall_half_length.is_finite() || params.wall_half_length <= 0.0 {
        return Err(BakeError::InvalidWallLength(params.wall_half_length));
    }
    let (min, max) = (params.turn_min_deg, params.turn_max_deg);
    if !(min.is_finite() && max.is_finite() && 0.0 <= min && min <= max && max <= 180.0) {
        return Err(BakeError::InvalidTurnRange { min, max });
    }

    for (index, &value) in onsets.iter().enumerate() {
        if !value.is_finite() {
            return Err(BakeError::NonFiniteOnset { index, value });
        }
        if value < 0.0 {
            return Err(BakeError::NegativeOnset { index, value });
        }
    }
    if let Some(index) = onsets.windows(2).position(|w| w[1] < w[0]) {
        return Err(BakeError::Unordered {
            index: index + 1,
            prev: onsets[index],
            next: onsets[index + 1],
        });
    }
    Ok(())
}

/// Deduplicate, sort and anchor at 0.0
///
/// Returns the sanitized array and whether the 0.0 anchor was inserted.
pub fn sanitize(onsets: &[f64]) -> (Vec<f64>, bool) {
    let mut out = onsets.to_vec();
    out.sort_by(f64::total_cmp);
    out.dedup();

    let anchored = out.first().is_some_and(|&first| first > 0.0);
    if anchored {
        out.insert(0, 0.0);
    }
    (out, anchored)
}

/// Bake a timeline from onset timestamps
pub fn bake(onsets: &[f64], params: &BakeParams, seed: u64) -> Result<Timeline, BakeError> {
    validate(onsets, params)?;

    if onsets.is_empty() {
        return Ok(Timeline::empty());
    }

    let (onsets, anchored) = sanitize(onsets);
    let mut rng = Pcg32::seed_from_u64(seed);

    let turn_min = params.turn_min_deg.to_radians();
    let turn_max = params.turn_max_deg.to_radians();

    let mut pos = Vec2::ZERO;
    let mut angle: f64 = rng.random_range(0.0..TAU);
    let mut dir = heading(angle);

    let mut segments = Vec::with_capacity(onsets.len().saturating_sub(1));
    for pair in onsets.windows(2) {
        let (t0, t1) = (pair[0], pair[1]);
        let hit = pos + dir * (params.speed * (t1 - t0) as f32);

        let mut turn = rng.random_range(turn_min..=turn_max);
        if rng.random_bool(0.5) {
            turn = -turn;
        }
        angle += turn;
        let next_dir = heading(angle);

        // Wall runs perpendicular to the bounce normal
        let normal = (dir - next_dir).normalize_or_zero();
        let along = normal.perp() * params.wall_half_length;

        segments.push(Segment {
            t0,
            t1,
            p0: pos,
            p1: hit,
            w1: hit + along,
            w2: hit - along,
        });

        pos = hit;
        dir = next_dir;
    }

    Ok(Timeline::from_parts(segments, onsets, anchored))
}
