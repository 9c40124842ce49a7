//! Per-track animation state
//!
//! Visual only. Nothing here feeds back into baking or judgment.

use std::collections::VecDeque;

use glam::Vec2;

use crate::Rgb;

/// A particle for bounce bursts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

impl Particle {
    /// Integrate one frame; returns false once the particle is spent
    pub fn step(&mut self, dt: f32, decay: f32, drag: f32) -> bool {
        self.pos += self.vel * dt;
        self.vel *= drag;
        self.life -= dt * decay;
        self.life > 0.0
    }
}

/// Bounded trail of recent positions (newest first)
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a position, evicting the oldest beyond capacity
    pub fn record(&mut self, pos: Vec2) {
        if self.capacity == 0 {
            return;
        }
        self.points.push_front(pos);
        while self.points.len() > self.capacity {
            self.points.pop_back();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.points.iter()
    }
}

/// Mutable animation state for one track
#[derive(Debug, Clone)]
pub struct ViewportState {
    /// Smoothed camera offset (added to world positions)
    pub camera: Vec2,
    /// Shake intensity in [0, 1], decays linearly
    pub shake: f32,
    /// Jitter sampled this frame from `shake`
    pub shake_offset: Vec2,
    pub particles: Vec<Particle>,
    pub trail: Trail,
    /// Segment whose bounce effect already fired
    pub last_hit: Option<usize>,
    /// Segment active at the last update
    pub active: Option<usize>,
    /// Progress within `active` at the last update
    pub progress: f64,
    /// Simulated position at the last update
    pub position: Option<Vec2>,
    /// Next wall to draw when nothing is active (past the end)
    pub draw_cursor: usize,
}

impl ViewportState {
    pub fn new(trail_capacity: usize) -> Self {
        Self {
            camera: Vec2::ZERO,
            shake: 0.0,
            shake_offset: Vec2::ZERO,
            particles: Vec::new(),
            trail: Trail::new(trail_capacity),
            last_hit: None,
            active: None,
            progress: 0.0,
            position: None,
            draw_cursor: 0,
        }
    }

    /// Forget fired hits and transient effects; the camera stays put
    pub fn reset_effects(&mut self) {
        self.shake = 0.0;
        self.shake_offset = Vec2::ZERO;
        self.particles.clear();
        self.trail.clear();
        self.last_hit = None;
    }
}
