//! Power Dial entry point
//!
//! Natively this runs the simulation headless for a number of ticks and logs
//! what happens. The browser build starts from `power_dial::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use power_dial::sim::{GameEvent, GameState, TickInput, tick};
    use power_dial::{PowerSplit, Result, Settings};

    #[derive(Parser, Debug)]
    #[command(name = "power-dial")]
    #[command(about = "Run the power dial simulation headless")]
    pub struct Args {
        /// Settings JSON file (defaults are used when omitted)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Override the spawner seed
        #[arg(long)]
        seed: Option<u64>,

        /// Number of ticks to run
        #[arg(long, default_value_t = 200)]
        ticks: u64,

        /// Engine share of the power split (percent)
        #[arg(long)]
        engine: Option<f32>,

        #[arg(long)]
        weapons: Option<f32>,

        #[arg(long)]
        shields: Option<f32>,

        /// Fire every N ticks (0 never fires)
        #[arg(long, default_value_t = 0)]
        fire_every: u64,

        /// Print the final state as JSON
        #[arg(long)]
        dump: bool,
    }

    impl Args {
        /// Split from the flags; unset shares come from the default split
        fn split(&self) -> Option<PowerSplit> {
            if self.engine.is_none() && self.weapons.is_none() && self.shields.is_none() {
                return None;
            }
            let default = PowerSplit::default();
            let split = PowerSplit {
                engine: self.engine.unwrap_or(default.engine),
                weapons: self.weapons.unwrap_or(default.weapons),
                shields: self.shields.unwrap_or(default.shields),
            };
            let total = split.total();
            if total <= 0.0 {
                return Some(default);
            }
            // Renormalise so the shares add up to 100
            Some(PowerSplit {
                engine: split.engine * 100.0 / total,
                weapons: split.weapons * 100.0 / total,
                shields: split.shields * 100.0 / total,
            })
        }
    }

    pub fn run(args: Args) -> Result<()> {
        let mut settings = match &args.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(seed) = args.seed {
            settings.sim.seed = seed;
        }
        let dt = settings.sim.dt;
        let mut state = GameState::new(settings)?;
        let split = args.split();
        if let Some(split) = split {
            log::info!(
                "Power split: engine {:.1}%, weapons {:.1}%, shields {:.1}%",
                split.engine,
                split.weapons,
                split.shields
            );
        }

        let mut collisions = 0;
        let mut shots = 0;
        for n in 0..args.ticks {
            let input = TickInput {
                power: if n == 0 { split } else { None },
                fire: args.fire_every > 0 && n % args.fire_every == 0,
                complete_animations: true,
            };
            tick(&mut state, &input, dt)?;

            for event in state.drain_events() {
                match event {
                    GameEvent::Collision { .. } => collisions += 1,
                    GameEvent::ProjectileFired { .. } => shots += 1,
                    GameEvent::PathChanged { id, from, to } => {
                        log::info!("tick {}: entity {id} moved from '{from}' to '{to}'", state.time_ticks);
                    }
                    GameEvent::EntityRemoved { id, cause } if id == state.player_id => {
                        log::warn!("tick {}: player removed ({cause:?})", state.time_ticks);
                    }
                    _ => {}
                }
            }

            if !state.entities.is_live(state.player_id) {
                break;
            }
            state.clear_the_dead();
        }

        match state.player() {
            Some(player) => {
                let pos = player.path_position();
                log::info!(
                    "After {} ticks: player on '{}' at length {:.1}",
                    state.time_ticks,
                    pos.map_or("?", |p| p.path_id.as_str()),
                    pos.map_or(0.0, |p| p.length)
                );
            }
            None => log::info!("After {} ticks: player is gone", state.time_ticks),
        }
        log::info!(
            "{} live entities, {collisions} collisions, {shots} shots fired",
            state.entities.len()
        );

        if args.dump {
            println!("{}", state.snapshot_json()?);
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_split_renormalises() {
            let args = Args::parse_from(["power-dial", "--engine", "60", "--weapons", "60", "--shields", "80"]);
            let split = args.split().unwrap();
            assert!((split.engine - 30.0).abs() < 1e-4);
            assert!((split.shields - 40.0).abs() < 1e-4);
            assert!((split.total() - 100.0).abs() < 1e-3);

            let args = Args::parse_from(["power-dial"]);
            assert!(args.split().is_none());
            assert_eq!(args.ticks, 200);
        }

        #[test]
        fn test_run_headless() {
            let args = Args::parse_from(["power-dial", "--ticks", "20", "--fire-every", "5"]);
            run(args).unwrap();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = native::Args::parse();
    if let Err(e) = native::run(args) {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_main, this is just to satisfy the compiler
}
