//! Browser bindings
//!
//! The page draws the dial and arena as SVG; this layer owns the state and
//! hands back JSON for the page to render.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::consts::SIM_DT;
use crate::dial::{DialController, DialGeometry, PowerSplit};
use crate::settings::Settings;
use crate::sim::{EntityId, GameState, TickInput, tick};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    // Already set when the module is re-instantiated
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Power Dial starting...");
}

/// One game: dial plus simulation
#[wasm_bindgen]
pub struct WebGame {
    dial: DialController,
    state: GameState,
    /// Split from the last dial drag, applied on the next tick
    pending_power: Option<PowerSplit>,
    fire: bool,
}

#[wasm_bindgen]
impl WebGame {
    /// Start a game. `settings_json` may be empty for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> Result<WebGame, JsValue> {
        let mut settings = if settings_json.trim().is_empty() {
            Settings::default()
        } else {
            Settings::from_json_str(settings_json).map_err(js_err)?
        };
        settings.sim.seed = js_sys::Date::now() as u64;
        log::info!("Game initialized with seed: {}", settings.sim.seed);

        let geometry = DialGeometry::new(
            settings.dial.view_size,
            settings.dial.radius,
            settings.dial.handle_radius,
        );
        let state = GameState::new(settings).map_err(js_err)?;
        Ok(Self {
            dial: DialController::new(geometry),
            state,
            pending_power: None,
            fire: false,
        })
    }

    /// Pointer pressed in client coordinates; `origin_*` is the dial's
    /// top-left corner on the page. Returns the grabbed handle name.
    pub fn pointer_down(&mut self, client_x: f32, client_y: f32, origin_x: f32, origin_y: f32) -> Option<String> {
        let client = Vec2::new(client_x, client_y);
        let origin = Vec2::new(origin_x, origin_y);
        self.dial
            .pointer_down(client, origin)
            .map(|h| h.as_str().to_string())
    }

    /// Pointer moved in client coordinates; `origin_*` is the dial's
    /// top-left corner on the page
    pub fn pointer_move(&mut self, client_x: f32, client_y: f32, origin_x: f32, origin_y: f32) {
        let client = Vec2::new(client_x, client_y);
        let origin = Vec2::new(origin_x, origin_y);
        if let Some(split) = self.dial.pointer_move(client, origin) {
            self.pending_power = Some(split);
        }
    }

    pub fn pointer_up(&mut self) {
        self.dial.release();
    }

    /// Queue a shot for the next tick
    pub fn fire(&mut self) {
        self.fire = true;
    }

    /// Advance one step; returns the tick's events as JSON
    pub fn tick(&mut self) -> Result<String, JsValue> {
        let input = TickInput {
            power: self.pending_power.take(),
            fire: std::mem::take(&mut self.fire),
            complete_animations: false,
        };
        tick(&mut self.state, &input, SIM_DT).map_err(js_err)?;
        serde_json::to_string(&self.state.drain_events()).map_err(js_err)
    }

    /// The page finished animating an entity's move
    pub fn done_animating(&mut self, id: EntityId) {
        self.state.done_animating(id);
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.state.snapshot_json().map_err(js_err)
    }

    /// The three coloured dial segments as SVG path data
    pub fn dial_paths_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.dial.segment_paths()).map_err(js_err)
    }

    /// Current dial split as JSON
    pub fn power_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.dial.split()).map_err(js_err)
    }
}
