//! What happens when entities touch

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollisionAction {
    RemoveEntity,
    /// Drain total power, reduced by the target's shields
    Damage { amount: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Solid colliders block movement instead of triggering actions
    pub is_solid: bool,
    /// Applied to this entity on contact
    pub on_self: Option<CollisionAction>,
    /// Applied to whatever this entity touches
    pub on_other: Option<CollisionAction>,
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            is_solid: false,
            on_self: Some(CollisionAction::RemoveEntity),
            on_other: None,
        }
    }
}

impl Collider {
    pub fn new(
        on_self: Option<CollisionAction>,
        on_other: Option<CollisionAction>,
        is_solid: bool,
    ) -> Self {
        Self {
            is_solid,
            on_self,
            on_other,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.is_solid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_json_shape() {
        let json = serde_json::to_string(&CollisionAction::Damage { amount: 5.0 }).unwrap();
        assert_eq!(json, r#"{"type":"damage","amount":5.0}"#);
        let back: CollisionAction = serde_json::from_str(r#"{"type":"remove_entity"}"#).unwrap();
        assert_eq!(back, CollisionAction::RemoveEntity);
    }

    #[test]
    fn test_default_removes_self() {
        let c = Collider::default();
        assert!(!c.is_solid());
        assert_eq!(c.on_self, Some(CollisionAction::RemoveEntity));
        assert_eq!(c.on_other, None);
    }
}
