//! Browser wiring: DOM events in, frames out.

use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, PageTransitionEvent, Window,
};
use web_time::Instant;

use crate::config::Config;
use crate::game::GameInstance;
use crate::render::Renderer;

pub const TITLE: &str = "特殊ルールオセロ (プレイヤー vs CPU)";

/// Whether the page still hosts the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Running,
    Closed,
}

impl Lifecycle {
    /// A persisted page goes to the back/forward cache and resumes as it was,
    /// so only a real unload closes the game.
    pub fn page_hidden(self, persisted: bool) -> Self {
        if persisted { self } else { Lifecycle::Closed }
    }

    pub fn is_running(self) -> bool {
        self == Lifecycle::Running
    }
}

/// Everything one running game needs, shared between event closures.
pub struct App {
    pub game: GameInstance,
    renderer: Renderer,
    lifecycle: Lifecycle,
}

impl App {
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    fn pointer_down(&mut self, x: f64, y: f64, now: Instant) {
        if self.is_running() {
            self.game.pointer_down(x, y, now);
        }
    }

    fn key_down(&mut self, key: &str, now: Instant) {
        if self.is_running() {
            self.game.key_down(key, now);
        }
    }

    fn tick(&mut self, now: Instant) {
        self.game.advance(now);
        if let Err(err) = self.renderer.draw(&self.game) {
            error!("frame draw failed: {err:?}");
        }
    }
}

/// Builds the app on the canvas and starts the frame loop.
pub fn launch(canvas_id: &str, config: Config) -> Result<Rc<RefCell<App>>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
        .dyn_into::<HtmlCanvasElement>()?;

    document.set_title(TITLE);
    let renderer = Renderer::new(&canvas, config.fonts)?;
    let app = Rc::new(RefCell::new(App {
        game: GameInstance::new_with_default_selector(config.pacing),
        renderer,
        lifecycle: Lifecycle::Running,
    }));

    listen_pointer(&canvas, &app)?;
    listen_keys(&document, &app)?;
    listen_close(&window, &app)?;
    run_frames(window, Rc::clone(&app))?;

    info!("game started on #{canvas_id}");
    Ok(app)
}

fn listen_pointer(canvas: &HtmlCanvasElement, app: &Rc<RefCell<App>>) -> Result<(), JsValue> {
    let app = Rc::clone(app);
    let on_down = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        let x = f64::from(event.offset_x());
        let y = f64::from(event.offset_y());
        app.borrow_mut().pointer_down(x, y, Instant::now());
    });
    canvas.add_event_listener_with_callback("mousedown", on_down.as_ref().unchecked_ref())?;
    on_down.forget();
    Ok(())
}

fn listen_keys(document: &Document, app: &Rc<RefCell<App>>) -> Result<(), JsValue> {
    let app = Rc::clone(app);
    let on_key = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        app.borrow_mut().key_down(&event.key(), Instant::now());
    });
    document.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
    on_key.forget();
    Ok(())
}

fn listen_close(window: &Window, app: &Rc<RefCell<App>>) -> Result<(), JsValue> {
    let app = Rc::clone(app);
    let on_close = Closure::<dyn FnMut(PageTransitionEvent)>::new(
        move |event: PageTransitionEvent| {
            let mut app = app.borrow_mut();
            app.lifecycle = app.lifecycle.page_hidden(event.persisted());
            if !app.is_running() {
                info!("window closing, stopping the game");
            }
        },
    );
    window.add_event_listener_with_callback("pagehide", on_close.as_ref().unchecked_ref())?;
    on_close.forget();
    Ok(())
}

fn run_frames(window: Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = Rc::clone(&frame);
    let loop_window = window.clone();

    *frame.borrow_mut() = Some(Closure::new(move || {
        if !app.borrow().is_running() {
            // Drops this closure and ends the loop.
            let _ = next.borrow_mut().take();
            return;
        }
        app.borrow_mut().tick(Instant::now());

        if let Some(callback) = next.borrow().as_ref()
            && let Err(err) = loop_window.request_animation_frame(callback.as_ref().unchecked_ref())
        {
            error!("could not schedule the next frame: {err:?}");
        }
    }));

    let first = frame.borrow();
    let callback = first
        .as_ref()
        .ok_or_else(|| JsValue::from_str("frame callback missing"))?;
    window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    Ok(())
}
