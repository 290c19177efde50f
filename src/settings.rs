//! Game settings
//!
//! Everything tunable lives here and is read from JSON. Every section is
//! `#[serde(default)]`, so a settings file only needs the values it changes.
//! The defaults describe the stock playfield: a 700x600 arena, a looping
//! path, a spur that needs half the power in the engine, and one obstacle.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};
use crate::sim::attributes::{Collider, CollisionAction};
use crate::sim::path::{PathDef, PowerRequirement};

/// Simulation timing and seeding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Fixed timestep in seconds
    pub dt: f32,
    /// Seed for the NPC spawner
    pub seed: u64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            dt: SIM_DT,
            seed: 0x5eed,
        }
    }
}

/// Arena bounds; body moves that leave them are rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialSettings {
    /// Side of the square view the dial is drawn in
    pub view_size: f32,
    pub radius: f32,
    pub handle_radius: f32,
}

impl Default for DialSettings {
    fn default() -> Self {
        Self {
            view_size: DIAL_VIEW_SIZE,
            radius: DIAL_RADIUS,
            handle_radius: DIAL_HANDLE_RADIUS,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipSettings {
    pub start_path: String,
    pub radius: f32,
    pub total_power: f32,
    pub collider: Collider,
}

impl Default for ShipSettings {
    fn default() -> Self {
        Self {
            start_path: "path0".into(),
            radius: SHIP_RADIUS,
            total_power: TOTAL_POWER,
            // Hits drain power through the shields; obstacles still remove
            collider: Collider::new(None, None, false),
        }
    }
}

/// A static obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDef {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    #[serde(default = "ObstacleDef::default_collider")]
    pub collider: Collider,
}

impl ObstacleDef {
    fn default_collider() -> Collider {
        Collider::new(None, Some(CollisionAction::RemoveEntity), false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSettings {
    pub radius: f32,
    /// Path length per second for each unit of weapons power
    pub speed_per_weapons_power: f32,
    /// Damage dealt on hit for each unit of weapons power
    pub damage_per_weapons_power: f32,
    /// Ships with less weapons power cannot fire
    pub min_weapons_power: f32,
    pub cooldown_ticks: u32,
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            radius: 3.0,
            speed_per_weapons_power: 30.0,
            damage_per_weapons_power: 1.0,
            min_weapons_power: 5.0,
            cooldown_ticks: 3,
        }
    }
}

/// NPC ships entering at the start of spawn paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSettings {
    /// Ticks between spawns (0 disables the spawner)
    pub interval_ticks: u32,
    /// Cap on live NPC ships
    pub max_live: usize,
    /// Engine level range (percent) for spawned ships
    pub engine_min: f32,
    pub engine_max: f32,
    pub radius: f32,
    pub collider: Collider,
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            interval_ticks: 0,
            max_live: 4,
            engine_min: 20.0,
            engine_max: 60.0,
            radius: SHIP_RADIUS,
            collider: Collider::new(None, Some(CollisionAction::Damage { amount: 25.0 }), false),
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sim: SimSettings,
    pub arena: ArenaSettings,
    pub dial: DialSettings,
    pub ship: ShipSettings,
    pub projectile: ProjectileSettings,
    pub spawner: SpawnerSettings,
    pub obstacles: Vec<ObstacleDef>,
    /// Path table; order matters for nearest-path lookups
    pub paths: Vec<PathDef>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sim: SimSettings::default(),
            arena: ArenaSettings::default(),
            dial: DialSettings::default(),
            ship: ShipSettings::default(),
            projectile: ProjectileSettings::default(),
            spawner: SpawnerSettings::default(),
            obstacles: vec![ObstacleDef {
                x: 500.0,
                y: 500.0,
                r: 15.0,
                collider: ObstacleDef::default_collider(),
            }],
            paths: vec![
                PathDef {
                    id: "path0".into(),
                    instructions: "M 630 400 Q 600 70 500 250 Q 350 580 200 250 Q 100 70 80 400 Q 80 510 350 525 Q 600 510 630 400 Z".into(),
                    requirement: PowerRequirement::default(),
                    spawn: true,
                },
                PathDef {
                    id: "path1".into(),
                    instructions: "M443.48822021484375 350.9056701660156 l -50 -50 l 0 -100".into(),
                    requirement: PowerRequirement::engine(50.0),
                    spawn: false,
                },
            ],
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!(
            "Loaded settings from {} ({} paths, {} obstacles)",
            path.display(),
            settings.paths.len(),
            settings.obstacles.len()
        );
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::InvalidSettings(msg));

        if !(self.sim.dt > 0.0) {
            return fail(format!("sim.dt must be positive, got {}", self.sim.dt));
        }
        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return fail("arena must have positive size".into());
        }
        if !(self.dial.radius > 0.0 && self.dial.radius <= self.dial.view_size / 2.0) {
            return fail(format!(
                "dial.radius {} must fit in a {} view",
                self.dial.radius, self.dial.view_size
            ));
        }
        if !(self.ship.radius > 0.0) {
            return fail("ship.radius must be positive".into());
        }
        if self.paths.is_empty() {
            return fail("at least one path is required".into());
        }
        if !self.paths.iter().any(|p| p.id == self.ship.start_path) {
            return fail(format!("ship.start_path '{}' is not defined", self.ship.start_path));
        }
        for (i, p) in self.paths.iter().enumerate() {
            if self.paths[..i].iter().any(|q| q.id == p.id) {
                return fail(format!("duplicate path id '{}'", p.id));
            }
        }
        let s = &self.spawner;
        if !(0.0..=100.0).contains(&s.engine_min) || !(s.engine_min..=100.0).contains(&s.engine_max) {
            return fail(format!(
                "spawner engine range {}..{} must lie within 0..100",
                s.engine_min, s.engine_max
            ));
        }
        if let Some(o) = self.obstacles.iter().find(|o| !(o.r > 0.0)) {
            return fail(format!("obstacle at ({}, {}) needs a positive radius", o.x, o.y));
        }
        Ok(())
    }
}
