//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod attributes;
pub mod collision;
pub mod entity;
pub mod path;
pub mod state;
pub mod tick;

pub use collision::{Contact, find_contacts, resolve_collisions};
pub use entity::{Entity, EntityData, EntityId, EntityKind, EntityStore};
pub use path::{Path, PathDef, PathId, PathSet, PowerRequirement};
pub use state::{Command, GameEvent, GameState, Outcome, RemovalCause, RngState};
pub use tick::{TickInput, tick};
