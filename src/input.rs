//! Abstract input and lane assignment
//!
//! Keys are bound to slots (screen positions), tracks are assigned to
//! slots. Reshuffling swaps the whole assignment at once.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// An abstract input token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Left,
    Right,
    /// A letter key, stored uppercase
    Char(char),
}

impl Key {
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_uppercase())
    }

    pub fn label(&self) -> String {
        match self {
            Key::Space => "SPACE".to_string(),
            Key::Left => "LEFT".to_string(),
            Key::Right => "RIGHT".to_string(),
            Key::Char(c) => c.to_ascii_uppercase().to_string(),
        }
    }
}

/// A key press at a playback time (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub key: Key,
    pub time: f64,
}

impl InputEvent {
    pub fn new(key: Key, time: f64) -> Self {
        Self { key, time }
    }
}

/// Default keys for slot `slot` out of `total`
pub fn slot_keys(slot: usize, total: usize) -> Vec<Key> {
    use Key::*;
    let c = Key::char;
    match (total, slot) {
        (1, 0) => vec![Space, c('f'), c('j')],
        (2, 0) => vec![c('d'), Left],
        (2, 1) => vec![c('k'), Right],
        (3, s) if s < 3 => vec![[c('d'), c('f'), c('j')][s]],
        (4, s) if s < 4 => vec![[c('d'), c('f'), c('j'), c('k')][s]],
        (5, s) if s < 5 => vec![[c('s'), c('d'), Space, c('j'), c('k')][s]],
        _ => Vec::new(),
    }
}

/// Track-to-slot assignment plus per-slot key bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMap {
    /// `track_to_slot[track]` is the slot that track occupies
    track_to_slot: Vec<usize>,
    slot_keys: Vec<Vec<Key>>,
}

impl SlotMap {
    /// Track `i` in slot `i`, default bindings
    pub fn identity(tracks: usize) -> Self {
        Self {
            track_to_slot: (0..tracks).collect(),
            slot_keys: (0..tracks).map(|s| slot_keys(s, tracks)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.track_to_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_to_slot.is_empty()
    }

    pub fn assignment(&self) -> &[usize] {
        &self.track_to_slot
    }

    pub fn slot_of(&self, track: usize) -> Option<usize> {
        self.track_to_slot.get(track).copied()
    }

    pub fn track_in_slot(&self, slot: usize) -> Option<usize> {
        self.track_to_slot.iter().position(|&s| s == slot)
    }

    pub fn keys_for_slot(&self, slot: usize) -> &[Key] {
        self.slot_keys.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys_for_track(&self, track: usize) -> &[Key] {
        self.slot_of(track)
            .map(|slot| self.keys_for_slot(slot))
            .unwrap_or(&[])
    }

    /// Tracks whose slot is bound to `key`, in track order
    pub fn tracks_for_key(&self, key: Key) -> Vec<usize> {
        (0..self.len())
            .filter(|&track| self.keys_for_track(track).contains(&key))
            .collect()
    }

    /// A new random assignment, guaranteed to differ when there is more than one slot
    pub fn reshuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> SlotMap {
        let mut next = self.track_to_slot.clone();
        if next.len() > 1 {
            next.shuffle(rng);
            if next == self.track_to_slot {
                next.rotate_left(1);
            }
        }
        SlotMap {
            track_to_slot: next,
            slot_keys: self.slot_keys.clone(),
        }
    }
}
