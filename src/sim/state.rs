//! Game state, commands and the director
//!
//! Entities change only through [`Command`]s dispatched to the state. The
//! director sits between a command and the entity it targets: it rejects
//! body moves that leave the arena (restoring the entity and flagging an
//! invalid move), tracks which entities are mid-animation, and keeps one
//! step of undo history.

use std::collections::BTreeSet;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::attributes::{Body, Collider, CollisionAction, PathPosition, Power, ValidationFlag};
use super::entity::{Entity, EntityData, EntityId, EntityKind, EntityStore};
use super::path::{Path, PathDef, PathId, PathSet};
use crate::dial::PowerSplit;
use crate::error::{Error, Result};
use crate::settings::Settings;

/// A change requested for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    // body
    Initialize(Body),
    By { dx: f32, dy: f32 },
    To { x: f32, y: Option<f32> },
    Up(f32),
    Down(f32),
    Left(f32),
    Right(f32),
    // power
    SetTotalPower(f32),
    ReduceTotalPower(f32),
    IncreaseTotalPower(f32),
    SetPowerLevels(PowerSplit),
    SetEnginePower(f32),
    SetWeaponsPower(f32),
    SetShieldsPower(f32),
    // path position
    SetLength(f32),
    IncreaseLength(f32),
    DecreaseLength(f32),
    ChangePath(PathId),
    // validation
    AddValidation(ValidationFlag),
    SetValidation(Vec<ValidationFlag>),
    RemoveValidation(ValidationFlag),
    // quality
    SetQuality { name: String, v: f32 },
    IncreaseQuality { name: String, v: f32 },
    DecreaseQuality { name: String, v: f32 },
}

impl Command {
    /// Moves the body; subject to arena bounds
    pub fn is_move(&self) -> bool {
        matches!(
            self,
            Command::Initialize(_)
                | Command::By { .. }
                | Command::To { .. }
                | Command::Up(_)
                | Command::Down(_)
                | Command::Left(_)
                | Command::Right(_)
        )
    }

    /// Moves the entity along or between paths
    pub fn is_pathing(&self) -> bool {
        matches!(
            self,
            Command::SetLength(_)
                | Command::IncreaseLength(_)
                | Command::DecreaseLength(_)
                | Command::ChangePath(_)
        )
    }

    /// Apply to an entity. Fails without touching the entity if its kind
    /// lacks the attribute.
    fn apply(&self, entity: &mut Entity) -> Result<()> {
        let id = entity.id;
        let missing = |attribute: &'static str| Error::MissingAttribute { id, attribute };

        match self {
            Command::Initialize(body) => entity.body = *body,
            Command::By { dx, dy } => entity.body.by(*dx, *dy),
            Command::To { x, y } => entity.body.to(*x, *y),
            Command::Up(a) => entity.body.up(*a),
            Command::Down(a) => entity.body.down(*a),
            Command::Left(a) => entity.body.left(*a),
            Command::Right(a) => entity.body.right(*a),

            Command::SetTotalPower(v)
            | Command::ReduceTotalPower(v)
            | Command::IncreaseTotalPower(v)
            | Command::SetEnginePower(v)
            | Command::SetWeaponsPower(v)
            | Command::SetShieldsPower(v) => {
                let power = entity.power_mut().ok_or_else(|| missing("power"))?;
                match self {
                    Command::SetTotalPower(_) => power.set_total_power(*v),
                    Command::ReduceTotalPower(_) => power.reduce_total_power(*v),
                    Command::IncreaseTotalPower(_) => power.increase_total_power(*v),
                    Command::SetEnginePower(_) => power.set_engine(*v),
                    Command::SetWeaponsPower(_) => power.set_weapons(*v),
                    _ => power.set_shields(*v),
                }
            }
            Command::SetPowerLevels(split) => {
                entity
                    .power_mut()
                    .ok_or_else(|| missing("power"))?
                    .set_levels(*split);
            }

            Command::SetLength(v) | Command::IncreaseLength(v) | Command::DecreaseLength(v) => {
                let pos = entity
                    .path_position_mut()
                    .ok_or_else(|| missing("path position"))?;
                match self {
                    Command::SetLength(_) => pos.set_length(*v),
                    Command::IncreaseLength(_) => pos.increase_length(*v),
                    _ => pos.decrease_length(*v),
                }
            }
            Command::ChangePath(path_id) => {
                entity
                    .path_position_mut()
                    .ok_or_else(|| missing("path position"))?
                    .change_path(path_id.clone());
            }

            Command::AddValidation(flag) => entity.validation.add(flag.clone()),
            Command::SetValidation(flags) => entity.validation.set(flags.iter().cloned()),
            Command::RemoveValidation(flag) => {
                entity.validation.remove(flag);
            }

            Command::SetQuality { name, v }
            | Command::IncreaseQuality { name, v }
            | Command::DecreaseQuality { name, v } => {
                let quality = entity.quality_mut().ok_or_else(|| missing("quality"))?;
                match self {
                    Command::SetQuality { .. } => quality.set(name.clone(), *v),
                    Command::IncreaseQuality { .. } => quality.increase(name.clone(), *v),
                    _ => quality.decrease(name.clone(), *v),
                }
            }
        }
        Ok(())
    }
}

/// What the director did with a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Move left the arena; entity restored and flagged
    Rejected,
    /// Target is already dead
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalCause {
    /// Reached the end of its path
    PathEnd,
    Collision,
    PowerDepleted,
}

/// Notable things that happened, for the host to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    EntitySpawned { id: EntityId, kind: EntityKind },
    EntityRemoved { id: EntityId, cause: RemovalCause },
    PathChanged { id: EntityId, from: PathId, to: PathId },
    MoveRejected { id: EntityId },
    Collision { a: EntityId, b: EntityId },
    ProjectileFired { id: EntityId, owner: EntityId },
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Fresh generator for the next draw; each call uses a new stream
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream += 1;
        rng
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub settings: Settings,
    pub rng_state: RngState,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub paths: PathSet,
    pub entities: EntityStore,
    pub player_id: EntityId,
    /// Entities whose last move the host is still animating
    animating: BTreeSet<EntityId>,
    /// State before the last dispatch or tick
    #[serde(skip)]
    history: Option<Box<GameState>>,
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_id: EntityId,
}

impl GameState {
    /// Build the playfield: paths, the player's ship and the obstacles
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let paths = PathSet::from_defs(&settings.paths)?;

        let mut state = Self {
            rng_state: RngState::new(settings.sim.seed),
            time_ticks: 0,
            paths,
            entities: EntityStore::default(),
            player_id: 0,
            animating: BTreeSet::new(),
            history: None,
            events: Vec::new(),
            next_id: 1,
            settings,
        };

        let ship = &state.settings.ship;
        let power = Power {
            total_power: ship.total_power,
            ..Power::default()
        };
        let player = Entity::ship(
            ship.start_path.clone(),
            Body::new(0.0, 0.0, ship.radius),
            power,
        )
        .with_collider(ship.collider);
        state.player_id = state.spawn(player)?;

        let obstacles: Vec<Entity> = state
            .settings
            .obstacles
            .iter()
            .map(|o| Entity::obstacle(Body::new(o.x, o.y, o.r)).with_collider(o.collider))
            .collect();
        for obstacle in obstacles {
            state.spawn(obstacle)?;
        }

        log::info!(
            "Game state ready: {} paths, {} entities, seed {}",
            state.paths.len(),
            state.entities.len(),
            state.settings.sim.seed
        );
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an entity under a fresh id. Path-bound entities are placed at
    /// their current length along the path.
    pub fn spawn(&mut self, mut entity: Entity) -> Result<EntityId> {
        if let Some(pos) = entity.path_position() {
            let path = self
                .paths
                .get(&pos.path_id)
                .ok_or_else(|| Error::UnknownPath(pos.path_id.clone()))?;
            entity.body.set_position(path.point_at_length(pos.length));
        }
        entity.id = self.next_entity_id();
        let kind = entity.kind();
        let id = self.entities.create(entity);
        log::debug!("spawned {kind:?} {id}");
        self.events.push(GameEvent::EntitySpawned { id, kind });
        Ok(id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn dead_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get_dead(id)
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.get(self.player_id)
    }

    /// Live entities except the given ids
    pub fn entities_except(&self, ignore: &[EntityId]) -> Vec<&Entity> {
        self.entities.live_except(ignore)
    }

    pub fn is_animating(&self, id: EntityId) -> bool {
        self.animating.contains(&id)
    }

    pub(crate) fn set_animating(&mut self, id: EntityId) {
        self.animating.insert(id);
    }

    /// The host finished animating this entity's last move. Clears the
    /// invalid-move flag once its shake has played.
    pub fn done_animating(&mut self, id: EntityId) {
        self.animating.remove(&id);
        self.entities.update(id, |e| {
            e.validation.remove(&ValidationFlag::InvalidMove);
        });
    }

    /// Complete every pending animation (headless hosts)
    pub fn finish_animations(&mut self) {
        let ids: Vec<EntityId> = self.animating.iter().copied().collect();
        for id in ids {
            self.done_animating(id);
        }
    }

    /// Send a command to an entity through the director
    pub fn dispatch(&mut self, id: EntityId, command: Command) -> Result<Outcome> {
        if self.entities.is_dead(id) {
            log::debug!("ignoring {command:?} for dead entity {id}");
            return Ok(Outcome::Ignored);
        }
        let before = self
            .entities
            .get(id)
            .cloned()
            .ok_or(Error::UnknownEntity(id))?;
        if let Command::ChangePath(path_id) = &command {
            if self.paths.get(path_id).is_none() {
                return Err(Error::UnknownPath(path_id.clone()));
            }
        }

        let mut next = before.clone();
        command.apply(&mut next)?;

        self.remember();
        Ok(self.direct(before, next, &command))
    }

    /// Apply without recording history (simulation internals)
    pub(crate) fn apply_internal(&mut self, id: EntityId, command: Command) -> Result<Outcome> {
        let Some(before) = self.entities.get(id).cloned() else {
            return Ok(Outcome::Ignored);
        };
        let mut next = before.clone();
        command.apply(&mut next)?;
        Ok(self.direct(before, next, &command))
    }

    fn direct(&mut self, before: Entity, next: Entity, command: &Command) -> Outcome {
        let id = next.id;
        if command.is_move() && !self.in_bounds(&next.body) {
            let mut restored = before;
            restored.validation.add_invalid_move();
            self.entities.create(restored);
            self.animating.insert(id);
            log::debug!("rejected {command:?} for entity {id}: out of bounds");
            self.events.push(GameEvent::MoveRejected { id });
            return Outcome::Rejected;
        }

        if let (Command::ChangePath(to), Some(from)) = (command, before.path_position()) {
            if from.path_id != *to {
                self.events.push(GameEvent::PathChanged {
                    id,
                    from: from.path_id.clone(),
                    to: to.clone(),
                });
            }
        }
        self.entities.create(next);
        if command.is_move() || command.is_pathing() {
            self.animating.insert(id);
        }
        Outcome::Applied
    }

    fn in_bounds(&self, body: &Body) -> bool {
        let arena = &self.settings.arena;
        (0.0..=arena.width).contains(&body.x) && (0.0..=arena.height).contains(&body.y)
    }

    /// Move an entity to the dead set
    pub fn remove_entity(&mut self, id: EntityId, cause: RemovalCause) -> bool {
        if !self.entities.remove(id) {
            return false;
        }
        self.animating.remove(&id);
        log::info!("entity {id} removed ({cause:?})");
        self.events.push(GameEvent::EntityRemoved { id, cause });
        true
    }

    pub fn clear_the_dead(&mut self) -> usize {
        self.entities.clear_the_dead()
    }

    /// Add or replace a path at runtime
    pub fn add_path(&mut self, def: &PathDef) -> Result<()> {
        let path = Path::from_def(def)?;
        log::info!("path '{}' added ({:.0} long)", path.id, path.total_length());
        self.paths.insert(path);
        Ok(())
    }

    /// Current position of a path-bound entity, from its path
    pub fn path_point(&self, id: EntityId) -> Option<Vec2> {
        let pos = self.entities.get(id)?.path_position()?;
        Some(self.paths.get(&pos.path_id)?.point_at_length(pos.length))
    }

    /// Apply a dial split to the player's ship
    pub fn set_player_power(&mut self, split: PowerSplit) -> Result<Outcome> {
        self.dispatch(self.player_id, Command::SetPowerLevels(split))
    }

    /// Fire a projectile from `shooter` along its current path.
    ///
    /// Returns `None` when the ship cannot fire yet (cooldown, too little
    /// weapons power) or is dead.
    pub fn fire(&mut self, shooter: EntityId) -> Result<Option<EntityId>> {
        if self.entities.is_dead(shooter) {
            return Ok(None);
        }
        let entity = self
            .entities
            .get(shooter)
            .ok_or(Error::UnknownEntity(shooter))?;
        let EntityData::Ship(ship) = &entity.data else {
            return Err(Error::MissingAttribute {
                id: shooter,
                attribute: "power",
            });
        };

        let tuning = self.settings.projectile.clone();
        let weapons_power = ship.power.weapons_power();
        if ship.fire_cooldown > 0 || weapons_power < tuning.min_weapons_power {
            return Ok(None);
        }
        let path_id = ship.path_position.path_id.clone();
        if self.paths.get(&path_id).is_none() {
            return Err(Error::UnknownPath(path_id));
        }

        // Start just ahead of the shooter so it does not touch its own shot
        let ahead = ship.path_position.length + entity.body.r + tuning.radius + 1.0;
        let mut path_position = PathPosition::new(path_id);
        path_position.set_length(ahead);

        let collider = Collider::new(
            Some(CollisionAction::RemoveEntity),
            Some(CollisionAction::Damage {
                amount: weapons_power * tuning.damage_per_weapons_power,
            }),
            false,
        );
        let projectile = Entity::projectile(
            shooter,
            path_position,
            weapons_power * tuning.speed_per_weapons_power,
            Body::new(0.0, 0.0, tuning.radius),
        )
        .with_collider(collider);

        let id = self.spawn(projectile)?;
        self.entities.update(shooter, |e| {
            if let EntityData::Ship(ship) = &mut e.data {
                ship.fire_cooldown = tuning.cooldown_ticks;
            }
        });
        log::debug!("entity {shooter} fired projectile {id}");
        self.events.push(GameEvent::ProjectileFired { id, owner: shooter });
        Ok(Some(id))
    }

    /// Take queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Snapshot the current state as the undo point
    pub(crate) fn remember(&mut self) {
        let mut snapshot = self.clone_without_history();
        snapshot.events.clear();
        self.history = Some(Box::new(snapshot));
    }

    fn clone_without_history(&self) -> Self {
        let history = None;
        Self {
            settings: self.settings.clone(),
            rng_state: self.rng_state.clone(),
            time_ticks: self.time_ticks,
            paths: self.paths.clone(),
            entities: self.entities.clone(),
            player_id: self.player_id,
            animating: self.animating.clone(),
            history,
            events: Vec::new(),
            next_id: self.next_id,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.is_some()
    }

    /// Roll back the last dispatch or tick (one level)
    pub fn undo(&mut self) -> bool {
        match self.history.take() {
            Some(previous) => {
                let events = std::mem::take(&mut self.events);
                *self = *previous;
                self.events = events;
                true
            }
            None => false,
        }
    }

    /// JSON snapshot for hosts
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
