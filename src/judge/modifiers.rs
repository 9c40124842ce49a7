//! Gameplay modifiers
//!
//! Each modifier is independent. Timers run on session play time, not
//! wall-clock time.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::tuning::ModifierTuning;

/// Enabled modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Periodically reassign tracks to lanes
    pub shuffle: bool,
    /// Only one rotating track accepts input
    pub focus: bool,
    /// Any penalty empties health
    pub sudden_death: bool,
}

impl Modifiers {
    /// Parse a list like `["chaos", "focus", "death"]`; unknown names are returned
    pub fn parse<'a, I>(names: I) -> (Self, Vec<&'a str>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut mods = Self::default();
        let mut unknown = Vec::new();
        for name in names {
            match name.to_lowercase().as_str() {
                "chaos" | "shuffle" => mods.shuffle = true,
                "focus" => mods.focus = true,
                "death" | "sudden-death" | "sudden_death" => mods.sudden_death = true,
                _ => unknown.push(name),
            }
        }
        (mods, unknown)
    }
}

/// What changed during a modifier update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierEvents {
    pub shuffle: bool,
    pub focus_switched: bool,
}

/// Modifier timers and the focused track
#[derive(Debug, Clone)]
pub struct ModifierState {
    mods: Modifiers,
    tuning: ModifierTuning,
    track_count: usize,
    next_shuffle: f64,
    focus: Option<usize>,
    focus_until: f64,
}

impl ModifierState {
    pub fn new<R: Rng + ?Sized>(
        mods: Modifiers,
        tuning: ModifierTuning,
        track_count: usize,
        rng: &mut R,
    ) -> Self {
        let mut state = Self {
            mods,
            tuning,
            track_count,
            next_shuffle: 0.0,
            focus: None,
            focus_until: 0.0,
        };
        state.restart(rng);
        state
    }

    /// Rewind timers to play time zero
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.next_shuffle = self.tuning.first_shuffle_delay;
        self.focus = None;
        self.focus_until = 0.0;
        if self.mods.focus && self.track_count > 0 {
            self.focus = Some(rng.random_range(0..self.track_count));
            self.focus_until = self.tuning.focus_duration;
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        self.mods
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Whether input for `track` counts right now
    pub fn accepts(&self, track: usize) -> bool {
        self.focus.is_none_or(|f| f == track)
    }

    /// Seconds until the next shuffle
    pub fn shuffle_in(&self, now: f64) -> Option<f64> {
        self.mods.shuffle.then(|| (self.next_shuffle - now).max(0.0))
    }

    /// Seconds left on the current focus
    pub fn focus_remaining(&self, now: f64) -> Option<f64> {
        self.focus.map(|_| (self.focus_until - now).max(0.0))
    }

    /// Advance timers to `now`
    pub fn update<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R) -> ModifierEvents {
        let mut events = ModifierEvents::default();

        if self.mods.shuffle && now > self.next_shuffle {
            events.shuffle = true;
            self.next_shuffle = now + self.tuning.shuffle_interval;
        }

        if let Some(current) = self.focus
            && now > self.focus_until
        {
            let options: Vec<usize> = (0..self.track_count).filter(|&t| t != current).collect();
            if let Some(&next) = options.choose(rng) {
                self.focus = Some(next);
            }
            self.focus_until = now + self.tuning.focus_duration;
            events.focus_switched = true;
        }

        events
    }
}
