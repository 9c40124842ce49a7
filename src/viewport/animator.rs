//! Per-frame camera and effect animation for one track
//!
//! The animator reads an immutable timeline and owns its `ViewportState`.
//! Effect randomness has its own generator, separate from baking.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::directives::{
    ParticleInstance, PointDirective, ViewportDirectives, WallDirective, WallStyle,
};
use super::state::{Particle, ViewportState};
use crate::consts::{COLOR_SQUARE, COLOR_SQUARE_BORDER};
use crate::sim::Timeline;
use crate::tuning::{CameraTuning, EffectTuning, Tuning};
use crate::{Rgb, Settings, heading, rgb_to_rgba};

/// One exponential smoothing step toward `target`
///
/// Closes `factor` of the remaining distance; with `0 < factor < 1` it never
/// overshoots and the gap shrinks geometrically.
#[inline]
pub fn smooth_camera(camera: Vec2, target: Vec2, factor: f32) -> Vec2 {
    camera + (target - camera) * factor
}

/// Animates one track's viewport
#[derive(Debug, Clone)]
pub struct ViewportAnimator {
    settings: Settings,
    camera: CameraTuning,
    effects: EffectTuning,
    state: ViewportState,
    rng: Pcg32,
}

impl ViewportAnimator {
    /// Create an animator with an unpredictable effect stream
    pub fn new(settings: Settings, tuning: &Tuning) -> Self {
        let rng = Pcg32::from_rng(&mut rand::rng());
        Self::with_rng(settings, tuning, rng)
    }

    /// Create an animator with a reproducible effect stream
    pub fn with_effect_seed(settings: Settings, tuning: &Tuning, seed: u64) -> Self {
        Self::with_rng(settings, tuning, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(settings: Settings, tuning: &Tuning, rng: Pcg32) -> Self {
        let trail = settings.trail_capacity(tuning.effects.trail_length);
        Self {
            settings,
            camera: tuning.camera,
            effects: tuning.effects,
            state: ViewportState::new(trail),
            rng,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Clear the hit guard and transient effects (session reset)
    pub fn reset(&mut self) {
        self.state.reset_effects();
    }

    /// Advance one frame
    ///
    /// `viewport` is the size of the track's on-screen rect. Returns true
    /// when a bounce effect fired this frame.
    pub fn update(&mut self, timeline: &Timeline, time: f64, dt: f32, viewport: Vec2) -> bool {
        let dt = dt.max(0.0);
        self.decay_effects(dt);

        let active = timeline
            .index()
            .active_segment(time)
            .and_then(|i| timeline.segment(i).map(|seg| (i, *seg)));

        let Some((index, segment)) = active else {
            // Nothing playing: camera holds, no bounce logic
            self.state.active = None;
            self.state.position = None;
            self.state.progress = 0.0;
            self.state.draw_cursor = if time >= timeline.duration() {
                timeline.len()
            } else {
                0
            };
            self.sample_shake();
            return false;
        };

        let progress = segment.progress(time);
        let position = segment.position_at(progress);

        let lead = if self.settings.cinema_camera {
            -segment.velocity() * self.camera.lookahead
        } else {
            Vec2::ZERO
        };
        let target = viewport * 0.5 - position + lead;
        self.state.camera = smooth_camera(self.state.camera, target, self.camera.lerp_factor);

        let fired = progress > self.effects.hit_threshold && self.state.last_hit != Some(index);
        if fired {
            self.fire_hit(index, segment.p1);
        }

        self.state.trail.record(position);
        self.state.active = Some(index);
        self.state.progress = progress;
        self.state.position = Some(position);
        self.state.draw_cursor = index;
        self.sample_shake();
        fired
    }

    fn decay_effects(&mut self, dt: f32) {
        self.state.shake = (self.state.shake - self.effects.shake_decay * dt).max(0.0);

        let (decay, drag) = (self.effects.particle_decay, self.effects.particle_drag);
        self.state.particles.retain_mut(|p| p.step(dt, decay, drag));
    }

    fn fire_hit(&mut self, index: usize, at: Vec2) {
        self.state.last_hit = Some(index);
        self.state.shake = (self.state.shake + self.effects.shake_bump).min(1.0);

        let cap = self.settings.max_particles();
        if cap == 0 {
            return;
        }
        let fx = self.effects;
        for _ in 0..fx.particle_count {
            let angle = self.rng.random_range(0.0..std::f64::consts::TAU);
            let speed = self.rng.random_range(fx.particle_speed_min..=fx.particle_speed_max);
            let size = self.rng.random_range(fx.particle_size_min..=fx.particle_size_max);
            self.state.particles.push(Particle {
                pos: at,
                vel: heading(angle) * speed,
                color: COLOR_SQUARE,
                life: fx.particle_life,
                size,
            });
        }
        if self.state.particles.len() > cap {
            let excess = self.state.particles.len() - cap;
            self.state.particles.drain(..excess);
        }
    }

    fn sample_shake(&mut self) {
        self.state.shake_offset = if self.settings.effective_screen_shake() && self.state.shake > 0.0 {
            let jitter = Vec2::new(
                self.rng.random_range(-1.0..=1.0),
                self.rng.random_range(-1.0..=1.0),
            );
            jitter * self.state.shake * self.effects.shake_amplitude
        } else {
            Vec2::ZERO
        };
    }

    /// Draw directives for the current state
    ///
    /// Pure: calling it twice without an `update` in between gives the same
    /// result.
    pub fn directives(&self, timeline: &Timeline, color: Rgb) -> ViewportDirectives {
        let state = &self.state;
        let offset = state.camera + state.shake_offset;

        let center = state.active.unwrap_or(state.draw_cursor);
        let start = center.saturating_sub(self.effects.walls_behind);
        let end = (center + self.effects.walls_ahead).min(timeline.len());
        let flash_on = state.progress > self.effects.flash_threshold && self.settings.effective_flash();

        let walls = timeline.segments()[start.min(end)..end]
            .iter()
            .enumerate()
            .map(|(k, seg)| {
                let i = start + k;
                let style = if state.active == Some(i) {
                    WallStyle::Active
                } else if i < center || state.active.is_none() {
                    WallStyle::Past
                } else {
                    WallStyle::Future
                };
                let flash = style == WallStyle::Active && flash_on;
                WallDirective::styled(seg.w1 + offset, seg.w2 + offset, style, flash, color)
            })
            .collect();

        let point = state.position.map(|pos| PointDirective {
            center: pos + offset,
            size: self.effects.point_size,
            color: COLOR_SQUARE,
            border: COLOR_SQUARE_BORDER,
            glow: self.settings.glow,
        });

        let particles = state
            .particles
            .iter()
            .map(|p| {
                let life = p.life.clamp(0.0, 1.0);
                let pos = p.pos + offset;
                ParticleInstance {
                    position: [pos.x, pos.y],
                    size: p.size * life,
                    color: rgb_to_rgba(p.color, life),
                }
            })
            .collect();

        let trail = state.trail.iter().map(|&p| p + offset).collect();

        let background_pulse = if self.settings.dynamic_background {
            state.shake
        } else {
            0.0
        };

        ViewportDirectives {
            camera: state.camera,
            shake: state.shake_offset,
            walls,
            point,
            particles,
            trail,
            background_pulse,
        }
    }

    /// `update` followed by `directives`
    pub fn frame(
        &mut self,
        timeline: &Timeline,
        color: Rgb,
        time: f64,
        dt: f32,
        viewport: Vec2,
    ) -> ViewportDirectives {
        self.update(timeline, time, dt, viewport);
        self.directives(timeline, color)
    }
}
