//! Entities and the live/dead entity store

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::attributes::{Body, Collider, PathPosition, Power, Quality, Validation};
use super::path::PathId;

pub type EntityId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Ship,
    Obstacle,
    Projectile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipData {
    pub power: Power,
    pub path_position: PathPosition,
    /// Ticks until the ship may fire again
    #[serde(default)]
    pub fire_cooldown: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleData {
    pub quality: Quality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileData {
    pub path_position: PathPosition,
    /// Ship that fired it; never collides with its owner
    pub owner: EntityId,
    /// Path length travelled per second
    pub speed: f32,
}

/// Kind-specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityData {
    Ship(ShipData),
    Obstacle(ObstacleData),
    Projectile(ProjectileData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    #[serde(default)]
    pub collider: Option<Collider>,
    #[serde(default)]
    pub validation: Validation,
    pub data: EntityData,
}

impl Entity {
    pub fn ship(path_id: impl Into<PathId>, body: Body, power: Power) -> Self {
        Self {
            id: 0,
            body,
            collider: None,
            validation: Validation::default(),
            data: EntityData::Ship(ShipData {
                power,
                path_position: PathPosition::new(path_id),
                fire_cooldown: 0,
            }),
        }
    }

    pub fn obstacle(body: Body) -> Self {
        Self {
            id: 0,
            body,
            collider: None,
            validation: Validation::default(),
            data: EntityData::Obstacle(ObstacleData::default()),
        }
    }

    pub fn projectile(owner: EntityId, path_position: PathPosition, speed: f32, body: Body) -> Self {
        Self {
            id: 0,
            body,
            collider: None,
            validation: Validation::default(),
            data: EntityData::Projectile(ProjectileData {
                path_position,
                owner,
                speed,
            }),
        }
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn kind(&self) -> EntityKind {
        match self.data {
            EntityData::Ship(_) => EntityKind::Ship,
            EntityData::Obstacle(_) => EntityKind::Obstacle,
            EntityData::Projectile(_) => EntityKind::Projectile,
        }
    }

    pub fn power(&self) -> Option<&Power> {
        match &self.data {
            EntityData::Ship(ship) => Some(&ship.power),
            _ => None,
        }
    }

    pub fn power_mut(&mut self) -> Option<&mut Power> {
        match &mut self.data {
            EntityData::Ship(ship) => Some(&mut ship.power),
            _ => None,
        }
    }

    pub fn path_position(&self) -> Option<&PathPosition> {
        match &self.data {
            EntityData::Ship(ship) => Some(&ship.path_position),
            EntityData::Projectile(p) => Some(&p.path_position),
            EntityData::Obstacle(_) => None,
        }
    }

    pub fn path_position_mut(&mut self) -> Option<&mut PathPosition> {
        match &mut self.data {
            EntityData::Ship(ship) => Some(&mut ship.path_position),
            EntityData::Projectile(p) => Some(&mut p.path_position),
            EntityData::Obstacle(_) => None,
        }
    }

    pub fn quality(&self) -> Option<&Quality> {
        match &self.data {
            EntityData::Obstacle(o) => Some(&o.quality),
            _ => None,
        }
    }

    pub fn quality_mut(&mut self) -> Option<&mut Quality> {
        match &mut self.data {
            EntityData::Obstacle(o) => Some(&mut o.quality),
            _ => None,
        }
    }

    /// Owner of a projectile
    pub fn owner(&self) -> Option<EntityId> {
        match &self.data {
            EntityData::Projectile(p) => Some(p.owner),
            _ => None,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.collider.is_some_and(|c| c.is_solid())
    }
}

/// Live entities plus a graveyard of removed ones, both ordered by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    live: BTreeMap<EntityId, Entity>,
    dead: BTreeMap<EntityId, Entity>,
}

impl EntityStore {
    /// Insert (or replace) a live entity under its id
    pub fn create(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.dead.remove(&id);
        self.live.insert(id, entity);
        id
    }

    pub fn add(&mut self, entities: impl IntoIterator<Item = Entity>) {
        for entity in entities {
            self.create(entity);
        }
    }

    /// Move a live entity to the dead set
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.live.remove(&id) {
            Some(entity) => {
                self.dead.insert(id, entity);
                true
            }
            None => false,
        }
    }

    /// Forget removed entities; returns how many were dropped
    pub fn clear_the_dead(&mut self) -> usize {
        let n = self.dead.len();
        self.dead.clear();
        n
    }

    /// Run `f` on a live entity
    pub fn update<F: FnOnce(&mut Entity)>(&mut self, id: EntityId, f: F) -> bool {
        match self.live.get_mut(&id) {
            Some(entity) => {
                f(entity);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.live.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.live.get_mut(&id)
    }

    pub fn get_dead(&self, id: EntityId) -> Option<&Entity> {
        self.dead.get(&id)
    }

    pub fn is_live(&self, id: EntityId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn is_dead(&self, id: EntityId) -> bool {
        self.dead.contains_key(&id)
    }

    pub fn live(&self) -> impl Iterator<Item = &Entity> {
        self.live.values()
    }

    pub fn live_ids(&self) -> Vec<EntityId> {
        self.live.keys().copied().collect()
    }

    /// Live entities, skipping the given ids
    pub fn live_except(&self, ignore: &[EntityId]) -> Vec<&Entity> {
        self.live
            .values()
            .filter(|e| !ignore.contains(&e.id))
            .collect()
    }

    pub fn live_count(&self, kind: EntityKind) -> usize {
        self.live.values().filter(|e| e.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship(id: EntityId) -> Entity {
        let mut e = Entity::ship("path0", Body::default(), Power::default());
        e.id = id;
        e
    }

    #[test]
    fn test_remove_moves_to_dead() {
        let mut store = EntityStore::default();
        store.add([ship(1), ship(2)]);
        assert_eq!(store.len(), 2);

        assert!(store.remove(1));
        assert!(!store.remove(1));
        assert!(store.is_dead(1));
        assert!(store.get(1).is_none());
        assert_eq!(store.get_dead(1).unwrap().id, 1);

        assert_eq!(store.clear_the_dead(), 1);
        assert!(!store.is_dead(1));
    }

    #[test]
    fn test_live_except_and_update() {
        let mut store = EntityStore::default();
        store.add([ship(1), ship(2), ship(3)]);

        let rest: Vec<_> = store.live_except(&[2]).iter().map(|e| e.id).collect();
        assert_eq!(rest, vec![1, 3]);

        assert!(store.update(3, |e| e.body.x = 42.0));
        assert_eq!(store.get(3).unwrap().body.x, 42.0);
        assert!(!store.update(9, |e| e.body.x = 1.0));
    }

    #[test]
    fn test_kind_accessors() {
        let mut rock = Entity::obstacle(Body::new(500.0, 500.0, 15.0));
        assert_eq!(rock.kind(), EntityKind::Obstacle);
        assert!(rock.power().is_none());
        assert!(rock.path_position().is_none());
        rock.quality_mut().unwrap().set("hardness", 3.0);
        assert_eq!(rock.quality().unwrap().get("hardness"), Some(3.0));

        let shot = Entity::projectile(1, PathPosition::new("path0"), 200.0, Body::default());
        assert_eq!(shot.owner(), Some(1));
        assert!(shot.path_position().is_some());
        assert!(!shot.is_solid());
    }
}
