//! Full-game scenarios driven through the public API

use glam::Vec2;
use power_dial::consts::SIM_DT;
use power_dial::sim::{EntityKind, GameEvent, GameState, RemovalCause, TickInput, tick};
use power_dial::{DialController, Handle, Settings, polar_to_cartesian};

fn headless() -> TickInput {
    TickInput {
        complete_animations: true,
        ..Default::default()
    }
}

/// Run until the player dies or `ticks` pass, collecting events
fn run(state: &mut GameState, input: &TickInput, ticks: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        tick(state, input, SIM_DT).unwrap();
        events.extend(state.drain_events());
        if !state.entities.is_live(state.player_id) {
            break;
        }
    }
    events
}

#[test]
fn test_dial_drag_sends_ship_down_the_spur() {
    let settings = Settings::default();
    let mut dial = DialController::default();
    let mut state = GameState::new(settings).unwrap();

    // Drag scissor next to paper so rock->scissor becomes the long way round
    let scissor = dial.handle_position(Handle::Scissor);
    assert_eq!(dial.press_at(scissor), Some(Handle::Scissor));
    let geometry = *dial.geometry();
    let target = polar_to_cartesian(geometry.center, geometry.radius, 235f32.to_radians());
    let split = dial.pointer_move(target + Vec2::new(10.0, 20.0), Vec2::new(10.0, 20.0)).unwrap();
    dial.release();
    assert!(split.engine >= 50.0, "engine {}", split.engine);

    let input = TickInput {
        power: Some(split),
        ..headless()
    };
    let events = run(&mut state, &input, 20);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, GameEvent::PathChanged { to, .. } if to == "path1"))
    );
    let pos = state.player().unwrap().path_position().unwrap();
    assert_eq!(pos.path_id, "path1");
}

#[test]
fn test_default_split_runs_into_the_obstacle() {
    let mut state = GameState::new(Settings::default()).unwrap();
    let player = state.player_id;
    let events = run(&mut state, &headless(), 60);

    assert!(state.entities.is_dead(player));
    assert!(events.contains(&GameEvent::EntityRemoved {
        id: player,
        cause: RemovalCause::Collision
    }));
    // Commands to the dead ship are ignored
    let outcome = state
        .dispatch(player, power_dial::sim::Command::Up(1.0))
        .unwrap();
    assert_eq!(outcome, power_dial::sim::Outcome::Ignored);
}

#[test]
fn test_spawner_is_seeded() {
    let json = r#"{ "sim": { "seed": 42 }, "spawner": { "interval_ticks": 4, "max_live": 3 } }"#;
    let settings = Settings::from_json_str(json).unwrap();

    let mut a = GameState::new(settings.clone()).unwrap();
    let mut b = GameState::new(settings).unwrap();
    let ea = run(&mut a, &headless(), 30);
    let eb = run(&mut b, &headless(), 30);

    assert_eq!(ea, eb);
    assert!(
        ea.iter()
            .any(|e| matches!(e, GameEvent::EntitySpawned { kind: EntityKind::Ship, .. }))
    );
}

#[test]
fn test_firing_spawns_projectiles() {
    let mut settings = Settings::default();
    settings.obstacles.clear();
    let mut state = GameState::new(settings).unwrap();

    let input = TickInput {
        fire: true,
        ..headless()
    };
    let events = run(&mut state, &input, 10);
    let shots = events
        .iter()
        .filter(|e| matches!(e, GameEvent::ProjectileFired { .. }))
        .count();
    // Default cooldown is three ticks
    assert!((3..=5).contains(&shots), "shots {shots}");
    assert!(state.entities.live_count(EntityKind::Projectile) > 0);
}
