//! Power Dial - a rock-paper-scissors power allocation arcade game
//!
//! Core modules:
//! - `dial`: Circular power dial (handles on a circle -> engine/weapons/shields split)
//! - `sim`: Deterministic simulation (paths, entities, collisions, tick)
//! - `settings`: Data-driven game configuration (JSON)
//! - `error`: Crate error type
//! - `web`: Browser bindings (wasm32 only)

pub mod dial;
pub mod error;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use dial::{DialController, Handle, PowerSplit};
pub use error::{Error, Result};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one host animation step)
    pub const SIM_DT: f32 = 0.1;
    /// Path length gained per second per unit of engine power.
    /// With `SIM_DT` this advances a ship by exactly its engine power each tick.
    pub const ENGINE_RATE: f32 = 10.0;
    /// Ships stop advancing once this far along any path
    pub const MAX_PATH_LENGTH: f32 = 100_000.0;

    /// Arena (SVG viewBox) dimensions
    pub const ARENA_WIDTH: f32 = 700.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Dial defaults (SVG viewBox is DIAL_VIEW_SIZE square)
    pub const DIAL_VIEW_SIZE: f32 = 100.0;
    pub const DIAL_RADIUS: f32 = DIAL_VIEW_SIZE * 0.9 / 2.0;
    pub const DIAL_HANDLE_RADIUS: f32 = 7.0;

    /// Ship defaults
    pub const SHIP_RADIUS: f32 = 10.0;
    pub const TOTAL_POWER: f32 = 100.0;

    /// Distance ahead used to sample a path's heading
    pub const HEADING_LOOKAHEAD: f32 = 2.0;
    /// Line segments used to flatten each curve command
    pub const CURVE_SEGMENTS: usize = 24;
}

/// Convert polar (r, theta) to cartesian (x, y) around `center`
#[inline]
pub fn polar_to_cartesian(center: Vec2, r: f32, theta: f32) -> Vec2 {
    center + Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta) around `center`
#[inline]
pub fn cartesian_to_polar(center: Vec2, pos: Vec2) -> (f32, f32) {
    let d = pos - center;
    (d.length(), d.y.atan2(d.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_polar_round_trip_offset_center() {
        let center = Vec2::new(50.0, 50.0);
        let p = polar_to_cartesian(center, 45.0, FRAC_PI_2);
        assert!((p - Vec2::new(50.0, 95.0)).length() < 1e-4);

        let (r, theta) = cartesian_to_polar(center, p);
        assert!((r - 45.0).abs() < 1e-4);
        assert!((theta - FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_engine_rate_matches_tick() {
        // One tick at full rate moves a ship by its engine power
        assert!((consts::SIM_DT * consts::ENGINE_RATE - 1.0).abs() < 1e-6);
    }
}
