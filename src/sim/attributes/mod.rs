//! Entity attributes
//!
//! Small plain-data components an entity is built from. Each attribute owns
//! the operations that change it; the director in `state` decides when they
//! run.

pub mod body;
pub mod collider;
pub mod path_position;
pub mod power;
pub mod quality;
pub mod validation;

pub use body::Body;
pub use collider::{Collider, CollisionAction};
pub use path_position::PathPosition;
pub use power::Power;
pub use quality::Quality;
pub use validation::{Validation, ValidationFlag};
