//! Fixed timestep simulation tick

use glam::Vec2;
use rand::Rng;

use super::attributes::{Body, Power};
use super::collision::resolve_collisions;
use super::entity::{Entity, EntityData, EntityId, EntityKind};
use super::path::PathId;
use super::state::{Command, GameState, RemovalCause};
use crate::consts::{ENGINE_RATE, MAX_PATH_LENGTH};
use crate::dial::PowerSplit;
use crate::error::Result;

/// Upper bound on junction samples per entity per tick
const MAX_SWEEP_SAMPLES: usize = 256;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// New dial split for the player's ship
    pub power: Option<PowerSplit>,
    /// Fire from the player's ship
    pub fire: bool,
    /// Host has no animations; finish every move at the end of the tick
    pub complete_animations: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Result<()> {
    state.remember();
    state.time_ticks += 1;

    let player = state.player_id;
    if state.entities.is_live(player) {
        if let Some(split) = input.power {
            state.apply_internal(player, Command::SetPowerLevels(split))?;
        }
        if input.fire {
            state.fire(player)?;
        }
    }

    run_spawner(state)?;
    move_entities(state, dt)?;
    resolve_collisions(state)?;

    if input.complete_animations {
        state.finish_animations();
    }
    Ok(())
}

/// Spawn an NPC ship at a random spawn path every `interval_ticks`
fn run_spawner(state: &mut GameState) -> Result<()> {
    let spawner = state.settings.spawner.clone();
    if spawner.interval_ticks == 0 || state.time_ticks % u64::from(spawner.interval_ticks) != 0 {
        return Ok(());
    }
    let npcs = state
        .entities
        .live()
        .filter(|e| e.kind() == EntityKind::Ship && e.id != state.player_id)
        .count();
    if npcs >= spawner.max_live {
        return Ok(());
    }

    let spawn_paths: Vec<PathId> = state.paths.spawn_paths().map(|p| p.id.clone()).collect();
    if spawn_paths.is_empty() {
        log::debug!("spawner has no spawn paths");
        return Ok(());
    }

    let mut rng = state.rng_state.next_rng();
    let path_id = spawn_paths[rng.random_range(0..spawn_paths.len())].clone();
    let engine = if spawner.engine_max > spawner.engine_min {
        rng.random_range(spawner.engine_min..spawner.engine_max)
    } else {
        spawner.engine_min
    };
    let rest = (100.0 - engine) / 2.0;
    let mut power = Power::default();
    power.set_levels(PowerSplit {
        engine,
        weapons: rest,
        shields: rest,
    });

    let ship = Entity::ship(path_id.clone(), Body::new(0.0, 0.0, spawner.radius), power)
        .with_collider(spawner.collider);
    let id = state.spawn(ship)?;
    log::info!("spawned NPC ship {id} on '{path_id}' (engine {engine:.0}%)");
    Ok(())
}

/// How far an entity travels along its path this tick
fn travel(entity: &Entity, dt: f32) -> f32 {
    match &entity.data {
        EntityData::Ship(ship) => ship.power.engine_power() * ENGINE_RATE * dt,
        EntityData::Projectile(p) => p.speed * dt,
        EntityData::Obstacle(_) => 0.0,
    }
}

/// Path the entity can switch onto from `pos`
fn switch_target(state: &GameState, entity: &Entity, current: &str, pos: Vec2) -> Option<PathId> {
    let power = entity.power()?;
    state
        .paths
        .find_switch(pos, entity.body.r, current, power)
        .map(|p| p.id.clone())
}

fn move_entities(state: &mut GameState, dt: f32) -> Result<()> {
    for id in state.entities.live_ids() {
        move_entity(state, id, dt)?;
    }
    Ok(())
}

fn move_entity(state: &mut GameState, id: EntityId, dt: f32) -> Result<()> {
    // Removed by an earlier entity this tick
    let Some(entity) = state.entity(id).cloned() else {
        return Ok(());
    };
    let Some(pos) = entity.path_position().cloned() else {
        return Ok(());
    };
    let Some(path) = state.paths.get(&pos.path_id) else {
        log::debug!("entity {id} is on unknown path '{}'", pos.path_id);
        return Ok(());
    };
    let point = path.point_at_length(pos.length);
    let past_end = path.is_past_end(pos.length);
    let total = path.total_length();
    let closed = path.closed;
    state.entities.update(id, |e| {
        e.body.set_position(point);
        if let EntityData::Ship(ship) = &mut e.data {
            ship.fire_cooldown = ship.fire_cooldown.saturating_sub(1);
        }
    });

    let is_player = id == state.player_id;
    let is_projectile = entity.kind() == EntityKind::Projectile;
    // Projectiles make at most one lap of a closed path
    if !is_player && past_end && (!closed || is_projectile) {
        state.remove_entity(id, RemovalCause::PathEnd);
        return Ok(());
    }

    if let Some(next) = switch_target(state, &entity, &pos.path_id, point) {
        change_path(state, id, next)?;
        return Ok(());
    }

    if state.is_animating(id) || pos.length >= MAX_PATH_LENGTH {
        return Ok(());
    }

    let distance = travel(&entity, dt);
    if distance <= 0.0 {
        return Ok(());
    }

    // Sample the stretch travelled so fast ships cannot skip a junction.
    // One lap at most, in at most MAX_SWEEP_SAMPLES steps.
    let span = distance.min(total).min(MAX_PATH_LENGTH - pos.length);
    let step = (entity.body.r / 2.0).max(1.0).max(span / MAX_SWEEP_SAMPLES as f32);
    if entity.power().is_some() {
        for i in 1..=MAX_SWEEP_SAMPLES {
            let s = step * i as f32;
            if s >= span {
                break;
            }
            let len = pos.length + s;
            if !closed && len >= total {
                break;
            }
            let p = state
                .paths
                .get(&pos.path_id)
                .map_or(point, |path| path.point_at_length(len));
            if let Some(next) = switch_target(state, &entity, &pos.path_id, p) {
                change_path(state, id, next)?;
                return Ok(());
            }
        }
    }

    state.apply_internal(id, Command::IncreaseLength(distance))?;
    if let Some(point) = state.path_point(id) {
        state.entities.update(id, |e| e.body.set_position(point));
    }
    state.set_animating(id);
    Ok(())
}

fn change_path(state: &mut GameState, id: EntityId, next: PathId) -> Result<()> {
    log::info!("entity {id} switching to '{next}'");
    state.apply_internal(id, Command::ChangePath(next))?;
    if let Some(point) = state.path_point(id) {
        state.entities.update(id, |e| e.body.set_position(point));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::GameEvent;

    fn run() -> TickInput {
        TickInput {
            complete_animations: true,
            ..Default::default()
        }
    }

    fn player_length(state: &GameState) -> f32 {
        state.player().unwrap().path_position().unwrap().length
    }

    #[test]
    fn test_tick_advances_player_by_engine_power() {
        let mut state = GameState::new(Settings::default()).unwrap();
        tick(&mut state, &run(), SIM_DT).unwrap();
        assert_eq!(state.time_ticks, 1);
        // 34% of 100 power
        assert!((player_length(&state) - 34.0).abs() < 1e-3);
        let expected = state.path_point(state.player_id).unwrap();
        assert_eq!(state.player().unwrap().body.position(), expected);
    }

    #[test]
    fn test_animating_entities_wait() {
        let mut state = GameState::new(Settings::default()).unwrap();
        let input = TickInput::default();
        tick(&mut state, &input, SIM_DT).unwrap();
        tick(&mut state, &input, SIM_DT).unwrap();
        assert!((player_length(&state) - 34.0).abs() < 1e-3);

        state.done_animating(state.player_id);
        tick(&mut state, &input, SIM_DT).unwrap();
        assert!((player_length(&state) - 68.0).abs() < 1e-3);
    }

    #[test]
    fn test_power_input_changes_speed() {
        let mut state = GameState::new(Settings::default()).unwrap();
        let input = TickInput {
            power: Some(PowerSplit {
                engine: 10.0,
                weapons: 45.0,
                shields: 45.0,
            }),
            ..run()
        };
        tick(&mut state, &input, SIM_DT).unwrap();
        assert!((player_length(&state) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_high_engine_switches_to_spur() {
        let mut state = GameState::new(Settings::default()).unwrap();
        let input = TickInput {
            power: Some(PowerSplit {
                engine: 60.0,
                weapons: 20.0,
                shields: 20.0,
            }),
            ..run()
        };
        for _ in 0..12 {
            tick(&mut state, &input, SIM_DT).unwrap();
        }
        let pos = state.player().unwrap().path_position().unwrap();
        assert_eq!(pos.path_id, "path1");
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::PathChanged { to, .. } if to == "path1"))
        );
    }

    #[test]
    fn test_low_engine_stays_on_loop() {
        let mut state = GameState::new(Settings::default()).unwrap();
        for _ in 0..20 {
            tick(&mut state, &run(), SIM_DT).unwrap();
        }
        let pos = state.player().unwrap().path_position().unwrap();
        assert_eq!(pos.path_id, "path0");
    }

    #[test]
    fn test_default_player_hits_obstacle() {
        let mut state = GameState::new(Settings::default()).unwrap();
        let player = state.player_id;
        let mut events = Vec::new();
        for _ in 0..60 {
            tick(&mut state, &run(), SIM_DT).unwrap();
            events.extend(state.drain_events());
            if !state.entities.is_live(player) {
                break;
            }
        }
        assert!(state.entities.is_dead(player));
        assert!(state.time_ticks > 40);
        assert!(events.contains(&GameEvent::EntityRemoved {
            id: player,
            cause: RemovalCause::Collision
        }));
        // Obstacles only act on what hits them
        assert_eq!(state.entities.live_count(EntityKind::Obstacle), 1);
    }

    #[test]
    fn test_huge_travel_finishes() {
        let mut settings = Settings::default();
        settings.obstacles.clear();
        let mut state = GameState::new(settings.clone()).unwrap();
        let player = state.player_id;
        state.dispatch(player, Command::IncreaseTotalPower(1e9)).unwrap();
        state.finish_animations();
        tick(&mut state, &run(), SIM_DT).unwrap();
        assert!(player_length(&state) > 1e8);

        // Same through a very long timestep
        let mut state = GameState::new(settings).unwrap();
        tick(&mut state, &run(), 1e7).unwrap();
        assert!(player_length(&state) > 1e8);
    }

    #[test]
    fn test_undo_tick() {
        let mut state = GameState::new(Settings::default()).unwrap();
        tick(&mut state, &run(), SIM_DT).unwrap();
        assert!(state.undo());
        assert_eq!(state.time_ticks, 0);
        assert_eq!(player_length(&state), 0.0);
    }

    #[test]
    fn test_projectile_leaves_and_expires() {
        let mut settings = Settings::default();
        settings.obstacles.clear();
        let mut state = GameState::new(settings).unwrap();
        let input = TickInput { fire: true, ..run() };
        tick(&mut state, &input, SIM_DT).unwrap();
        assert_eq!(state.entities.live_count(EntityKind::Projectile), 1);

        // 990 units/s covers the loop in a couple of seconds
        for _ in 0..30 {
            tick(&mut state, &run(), SIM_DT).unwrap();
        }
        assert_eq!(state.entities.live_count(EntityKind::Projectile), 0);
        assert!(state.entities.is_live(state.player_id));
    }

    #[test]
    fn test_spawner_respects_cap() {
        let mut settings = Settings::default();
        settings.spawner.interval_ticks = 1;
        settings.spawner.max_live = 2;
        let mut state = GameState::new(settings).unwrap();
        state.drain_events();
        // Spawns land on the player's start; keep the player out of the way
        state.remove_entity(state.player_id, RemovalCause::Collision);

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), SIM_DT).unwrap();
        }
        assert!(state.entities.live_count(EntityKind::Ship) <= 2);
        let spawned = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::EntitySpawned { kind: EntityKind::Ship, .. }))
            .count();
        assert!(spawned >= 2);
    }

    #[test]
    fn test_determinism() {
        let mut settings = Settings::default();
        settings.spawner.interval_ticks = 3;
        let mut state1 = GameState::new(settings.clone()).unwrap();
        let mut state2 = GameState::new(settings).unwrap();

        let inputs = [
            TickInput {
                power: Some(PowerSplit {
                    engine: 40.0,
                    weapons: 40.0,
                    shields: 20.0,
                }),
                ..run()
            },
            TickInput { fire: true, ..run() },
            run(),
            run(),
        ];

        for _ in 0..5 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT).unwrap();
                tick(&mut state2, input, SIM_DT).unwrap();
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.entities.live_ids(), state2.entities.live_ids());
        assert_eq!(state1.snapshot_json().unwrap(), state2.snapshot_json().unwrap());
    }
}
