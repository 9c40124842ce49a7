//! Score, combo and health bookkeeping

use serde::Serialize;

use super::judge::{Outcome, Tier};
use crate::Rgb;
use crate::tuning::ScoringTable;

/// Running totals for one track or a whole session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scoreboard {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    /// Always within [0, max_health]
    pub health: f32,
    pub max_health: f32,
}

impl Scoreboard {
    pub fn new(max_health: f32) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            health: max_health,
            max_health,
        }
    }

    /// Fold one judgment into the totals
    pub fn apply(&mut self, outcome: &Outcome, table: &ScoringTable, sudden_death: bool) {
        match *outcome {
            Outcome::Hit { tier, .. } => {
                self.score += tier.points(table);
                self.combo += 1;
                self.max_combo = self.max_combo.max(self.combo);
                self.heal(tier.health(table));
            }
            Outcome::Miss { .. } => self.penalize(table.miss_penalty, sudden_death),
            Outcome::Extra => self.penalize(table.extra_input_penalty, sudden_death),
            Outcome::Ignored => {}
        }
    }

    fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    fn penalize(&mut self, amount: f32, sudden_death: bool) {
        self.combo = 0;
        self.health = if sudden_death {
            0.0
        } else {
            (self.health - amount).max(0.0)
        };
    }

    /// Passive health loss (not a penalty; combo is kept)
    pub fn drain(&mut self, amount: f32) {
        self.health = (self.health - amount.max(0.0)).max(0.0);
    }

    pub fn is_depleted(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Health bar color: red when low, yellow in the middle, green when healthy
    pub fn health_color(&self) -> Rgb {
        let pct = self.health_fraction();
        if pct < 0.2 {
            [255, 50, 50]
        } else if pct > 0.5 {
            [100, 255, 100]
        } else {
            [255, 255, 50]
        }
    }
}

impl Tier {
    pub fn points(&self, table: &ScoringTable) -> u64 {
        match self {
            Tier::Perfect => table.perfect_points,
            Tier::Good => table.good_points,
            Tier::Ok => table.ok_points,
        }
    }

    pub fn health(&self, table: &ScoringTable) -> f32 {
        match self {
            Tier::Perfect => table.perfect_health,
            Tier::Good => table.good_health,
            Tier::Ok => table.ok_health,
        }
    }
}
