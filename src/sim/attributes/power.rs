//! Ship power: a total budget split between engine, weapons and shields

use serde::{Deserialize, Serialize};

use crate::consts::TOTAL_POWER;
use crate::dial::PowerSplit;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Power {
    pub total_power: f32,
    /// Percent of total power sent to the engine
    pub engine: f32,
    pub weapons: f32,
    pub shields: f32,
}

impl Default for Power {
    fn default() -> Self {
        let split = PowerSplit::default();
        Self {
            total_power: TOTAL_POWER,
            engine: split.engine,
            weapons: split.weapons,
            shields: split.shields,
        }
    }
}

impl Power {
    pub fn set_total_power(&mut self, total: f32) {
        self.total_power = total.max(0.0);
    }

    pub fn reduce_total_power(&mut self, reduction: f32) {
        self.total_power = (self.total_power - reduction).max(0.0);
    }

    pub fn increase_total_power(&mut self, addition: f32) {
        self.total_power += addition;
    }

    pub fn set_levels(&mut self, split: PowerSplit) {
        self.engine = split.engine;
        self.weapons = split.weapons;
        self.shields = split.shields;
    }

    pub fn set_engine(&mut self, level: f32) {
        self.engine = level;
    }

    pub fn set_weapons(&mut self, level: f32) {
        self.weapons = level;
    }

    pub fn set_shields(&mut self, level: f32) {
        self.shields = level;
    }

    pub fn levels(&self) -> PowerSplit {
        PowerSplit {
            engine: self.engine,
            weapons: self.weapons,
            shields: self.shields,
        }
    }

    /// Absolute power available to the engine
    pub fn engine_power(&self) -> f32 {
        self.total_power * (self.engine / 100.0)
    }

    pub fn weapons_power(&self) -> f32 {
        self.total_power * (self.weapons / 100.0)
    }

    pub fn shields_power(&self) -> f32 {
        self.total_power * (self.shields / 100.0)
    }

    /// Share of incoming damage the shields soak, 0..=1
    pub fn shield_factor(&self) -> f32 {
        (self.shields / 100.0).clamp(0.0, 1.0)
    }

    /// Damage left after the shields soak their share
    pub fn absorb(&self, amount: f32) -> f32 {
        amount * (1.0 - self.shield_factor())
    }

    pub fn is_depleted(&self) -> bool {
        self.total_power <= 0.0
    }
}
