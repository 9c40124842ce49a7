//! Visual playback of every track
//!
//! A stage bakes its tracks once and drives one animator per track. It has
//! no game logic, so it also serves plain "watch" playback.

use std::collections::HashSet;

use serde::Serialize;

use crate::consts::COLOR_BG;
use crate::error::SessionError;
use crate::layout::{Rect, slot_rects};
use crate::session::Overlay;
use crate::track::{Track, TrackSpec};
use crate::viewport::{ViewportAnimator, ViewportDirectives};
use crate::{Rgb, Settings, Tuning};

/// Per-track seed derived from the stage seed
pub fn track_seed(seed: u64, index: usize) -> u64 {
    (index as u64).wrapping_mul(2654435761).wrapping_add(seed)
}

/// One track's viewport this frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackFrame {
    pub name: String,
    pub rect: Rect,
    pub color: Rgb,
    pub view: ViewportDirectives,
}

/// A complete frame for the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub background: Rgb,
    pub tracks: Vec<TrackFrame>,
    pub overlay: Option<Overlay>,
}

#[derive(Debug, Clone)]
pub struct Stage {
    tracks: Vec<Track>,
    animators: Vec<ViewportAnimator>,
    width: u32,
    height: u32,
}

impl Stage {
    /// Bake every track and create its animator
    ///
    /// With `effect_seed` set, particle and shake randomness is reproducible.
    pub fn new(
        specs: Vec<TrackSpec>,
        settings: Settings,
        tuning: &Tuning,
        seed: u64,
        effect_seed: Option<u64>,
        width: u32,
        height: u32,
    ) -> Result<Self, SessionError> {
        tuning.validate()?;
        if specs.is_empty() {
            return Err(SessionError::NoTracks);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = specs.iter().find(|s| !seen.insert(s.name.as_str())) {
            return Err(SessionError::DuplicateTrack(dup.name.clone()));
        }

        let mut tracks = Vec::with_capacity(specs.len());
        let mut animators = Vec::with_capacity(specs.len());
        for (i, spec) in specs.into_iter().enumerate() {
            let name = spec.name.clone();
            let track = Track::bake(spec, &tuning.bake, track_seed(seed, i))
                .map_err(|source| SessionError::Bake { track: name, source })?;
            let animator = match effect_seed {
                Some(s) => ViewportAnimator::with_effect_seed(settings, tuning, track_seed(s, i)),
                None => ViewportAnimator::new(settings, tuning),
            };
            tracks.push(track);
            animators.push(animator);
        }

        log::info!("stage ready: {} tracks, {}x{}", tracks.len(), width, height);
        Ok(Self {
            tracks,
            animators,
            width,
            height,
        })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// End of the longest track
    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .map(|t| t.timeline.duration())
            .fold(0.0, f64::max)
    }

    /// Slot rects with track `i` in slot `i`
    pub fn default_rects(&self) -> Vec<Rect> {
        slot_rects(self.width, self.height, self.tracks.len())
    }

    /// Advance every animator and collect its directives
    ///
    /// `rects[i]` is the on-screen rect of track `i`; a missing rect means
    /// an empty viewport.
    pub fn advance(&mut self, time: f64, dt: f32, rects: &[Rect]) -> Vec<TrackFrame> {
        self.tracks
            .iter()
            .zip(self.animators.iter_mut())
            .enumerate()
            .map(|(i, (track, animator))| {
                let rect = rects.get(i).copied().unwrap_or_default();
                let view = animator.frame(&track.timeline, track.color, time, dt, rect.size());
                TrackFrame {
                    name: track.name.clone(),
                    rect,
                    color: track.color,
                    view,
                }
            })
            .collect()
    }

    /// Watch-mode frame: default layout, no overlay
    pub fn render(&mut self, time: f64, dt: f32) -> Frame {
        let rects = self.default_rects();
        Frame {
            background: COLOR_BG,
            tracks: self.advance(time, dt, &rects),
            overlay: None,
        }
    }

    /// Clear hit guards and transient effects on every animator
    pub fn reset_effects(&mut self) {
        for animator in &mut self.animators {
            animator.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn specs() -> Vec<TrackSpec> {
        vec![
            TrackSpec::new("drums", [220, 80, 70], vec![0.5, 1.0, 1.5]),
            TrackSpec::new("bass", [100, 200, 100], vec![1.0, 3.0]),
        ]
    }

    fn stage() -> Stage {
        Stage::new(specs(), Settings::default(), &Tuning::default(), 9, Some(2), 1280, 720).unwrap()
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        let mut dup = specs();
        dup.push(TrackSpec::new("drums", [0, 0, 0], vec![1.0]));
        let err = Stage::new(dup, Settings::default(), &Tuning::default(), 0, None, 640, 360);
        assert!(matches!(err, Err(SessionError::DuplicateTrack(name)) if name == "drums"));
        let err = Stage::new(vec![], Settings::default(), &Tuning::default(), 0, None, 640, 360);
        assert!(matches!(err, Err(SessionError::NoTracks)));
    }

    #[test]
    fn test_rejects_invalid_tuning() {
        let mut tuning = Tuning::default();
        tuning.effects.particle_speed_min = 400.0;
        let err = Stage::new(specs(), Settings::default(), &tuning, 0, None, 640, 360);
        assert!(matches!(
            err,
            Err(SessionError::Config(ConfigError::Invalid { field: "effects.particle_speed_min", .. }))
        ));
    }

    #[test]
    fn test_bake_failure_names_track() {
        let bad = vec![TrackSpec::new("bass", [0, 0, 0], vec![2.0, 1.0])];
        let err = Stage::new(bad, Settings::default(), &Tuning::default(), 0, None, 640, 360);
        assert!(matches!(err, Err(SessionError::Bake { track, .. }) if track == "bass"));
    }

    #[test]
    fn test_tracks_get_distinct_seeds() {
        let s = stage();
        let a = s.tracks()[0].timeline.segments()[0].p1;
        let b = s.tracks()[1].timeline.segments()[0].p1;
        assert_ne!(a, b);
        assert_eq!(s.duration(), 3.0);
    }

    #[test]
    fn test_render_uses_default_layout() {
        let mut s = stage();
        let frame = s.render(0.25, 1.0 / 60.0);
        assert_eq!(frame.background, COLOR_BG);
        assert_eq!(frame.tracks.len(), 2);
        assert_eq!(frame.tracks[1].rect, Rect::new(0, 360, 1280, 360));
        let point = frame.tracks[0].view.point.unwrap();
        assert_eq!(point.border, crate::consts::COLOR_SQUARE_BORDER);
        assert!(frame.overlay.is_none());
    }

    #[test]
    fn test_same_seeds_same_frames() {
        let mut a = stage();
        let mut b = stage();
        for f in 0..120 {
            let t = f as f64 / 60.0;
            assert_eq!(a.render(t, 1.0 / 60.0), b.render(t, 1.0 / 60.0));
        }
    }
}
