//! Collision detection and response between entity bodies
//!
//! Bodies are circles. Contacts are found pairwise in id order, then
//! resolved: solid colliders push path movers back along their path,
//! everything else runs the colliders' `on_self`/`on_other` actions.

use super::attributes::{CollisionAction, ValidationFlag};
use super::entity::{Entity, EntityId};
use super::state::{Command, GameEvent, GameState, RemovalCause};
use crate::error::Result;

/// Two overlapping bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
    /// Penetration depth (for pushing movers back)
    pub penetration: f32,
}

/// Projectiles pass through the ship that fired them
fn ignores(a: &Entity, b: &Entity) -> bool {
    a.owner() == Some(b.id) || b.owner() == Some(a.id)
}

/// Every overlapping pair where at least one side has a collider
pub fn find_contacts(state: &GameState) -> Vec<Contact> {
    let entities: Vec<&Entity> = state.entities.live().collect();
    let mut contacts = Vec::new();

    for (i, a) in entities.iter().enumerate() {
        for b in &entities[i + 1..] {
            if a.collider.is_none() && b.collider.is_none() {
                continue;
            }
            if ignores(a, b) {
                continue;
            }
            if let Some(penetration) = a.body.overlap(&b.body) {
                contacts.push(Contact {
                    a: a.id,
                    b: b.id,
                    penetration,
                });
            }
        }
    }
    contacts
}

/// Detect and resolve this tick's collisions. Returns the contact count.
pub fn resolve_collisions(state: &mut GameState) -> Result<usize> {
    let contacts = find_contacts(state);
    let mut actions: Vec<(EntityId, CollisionAction)> = Vec::new();

    for contact in &contacts {
        let (Some(a), Some(b)) = (
            state.entity(contact.a).cloned(),
            state.entity(contact.b).cloned(),
        ) else {
            continue;
        };
        log::debug!("collision between {} and {}", contact.a, contact.b);
        state.push_event(GameEvent::Collision {
            a: contact.a,
            b: contact.b,
        });

        if a.is_solid() || b.is_solid() {
            let movers: Vec<EntityId> = [&a, &b]
                .into_iter()
                .filter(|e| !e.is_solid() && e.path_position().is_some())
                .map(|e| e.id)
                .collect();
            for id in movers {
                push_back(state, id, contact.penetration)?;
            }
            continue;
        }

        for (this, other) in [(&a, &b), (&b, &a)] {
            if let Some(collider) = this.collider {
                if let Some(action) = collider.on_self {
                    actions.push((this.id, action));
                }
                if let Some(action) = collider.on_other {
                    actions.push((other.id, action));
                }
            }
        }
    }

    for (target, action) in actions {
        apply_action(state, target, action)?;
    }
    Ok(contacts.len())
}

/// Back a mover out of a solid body and flag the blocked move
fn push_back(state: &mut GameState, id: EntityId, distance: f32) -> Result<()> {
    state.apply_internal(id, Command::DecreaseLength(distance))?;
    state.apply_internal(id, Command::AddValidation(ValidationFlag::InvalidMove))?;
    if let Some(point) = state.path_point(id) {
        state.entities.update(id, |e| e.body.set_position(point));
    }
    state.push_event(GameEvent::MoveRejected { id });
    Ok(())
}

fn apply_action(state: &mut GameState, target: EntityId, action: CollisionAction) -> Result<()> {
    // An earlier action may already have removed it
    let Some(entity) = state.entity(target) else {
        return Ok(());
    };

    match action {
        CollisionAction::RemoveEntity => {
            state.remove_entity(target, RemovalCause::Collision);
        }
        CollisionAction::Damage { amount } => {
            let Some(power) = entity.power() else {
                log::debug!("entity {target} has no power to damage");
                return Ok(());
            };
            let damage = power.absorb(amount);
            state.apply_internal(target, Command::ReduceTotalPower(damage))?;
            let depleted = state
                .entity(target)
                .and_then(|e| e.power())
                .is_some_and(|p| p.is_depleted());
            if depleted {
                state.remove_entity(target, RemovalCause::PowerDepleted);
            }
        }
    }
    Ok(())
}
