use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

pub mod ai;
pub mod app;
pub mod board;
pub mod config;
pub mod game;
pub mod layout;
pub mod logging;
pub mod render;
pub mod types;

use crate::app::App;
use crate::config::Config;

/// Handle to a running game, returned to the host page.
#[wasm_bindgen]
pub struct GameHandle {
    app: Rc<RefCell<App>>,
}

#[wasm_bindgen]
impl GameHandle {
    /// Current `GameState` as a plain JS object.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        let state = self.app.borrow().game.to_game_state();
        serde_wasm_bindgen::to_value(&state).map_err(Into::into)
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.app.borrow().is_running()
    }
}

/// Starts the game on the `<canvas>` with id `canvas_id`.
#[wasm_bindgen]
pub fn start(canvas_id: &str) -> Result<GameHandle, JsValue> {
    console_error_panic_hook::set_once();
    let config = Config::default();
    if let Err(err) = logging::init(config.log_level) {
        web_sys::console::warn_1(&JsValue::from_str(&err.to_string()));
    }

    let app = app::launch(canvas_id, config)?;
    Ok(GameHandle { app })
}
