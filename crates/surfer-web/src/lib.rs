//! WASM entry point: finds the hero canvas, brings up WebGPU, kicks off the
//! asset loads, wires pointer and scroll listeners, and starts the frame
//! loop. Asset failures degrade the scene instead of aborting it.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use surfer_core::{
    LoadState, ScrollFx, ENVIRONMENT_HDR_URL, SHIP_MODEL_URL, WORMHOLE_MODEL_URL,
};

mod assets;
mod dom;
mod events;
mod frame;
mod input;
mod render;

const CANVAS_ID: &str = "surfer-canvas";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("surfer-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::find_canvas(&document, CANVAS_ID)?;

    dom::sync_canvas_backing_size(&canvas);
    {
        let canvas_resize = canvas.clone();
        let resize_closure = Closure::wrap(Box::new(move || {
            dom::sync_canvas_backing_size(&canvas_resize);
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())
            .ok();
        resize_closure.forget();
    }

    // Surface wants 'static; one canvas clone lives for the page lifetime
    let leaked_canvas: &'static web::HtmlCanvasElement = Box::leak(Box::new(canvas.clone()));
    let gpu = render::GpuState::new(leaked_canvas).await?;

    let ship_slot = Rc::new(RefCell::new(LoadState::Pending));
    let wormhole_slot = Rc::new(RefCell::new(LoadState::Pending));
    let env_slot = Rc::new(RefCell::new(LoadState::Pending));
    assets::spawn_model_load(SHIP_MODEL_URL, "spaceship model", ship_slot.clone());
    assets::spawn_model_load(WORMHOLE_MODEL_URL, "wormhole model", wormhole_slot.clone());
    assets::spawn_env_load(ENVIRONMENT_HDR_URL, env_slot.clone());

    let mouse = Rc::new(RefCell::new(input::MouseState::default()));
    events::wire_pointer(&window, mouse.clone())?;

    let initial_offset = window.scroll_y().unwrap_or(0.0);
    let fx = Rc::new(RefCell::new(ScrollFx::new(initial_offset)));
    events::wire_scroll(&window, fx.clone())?;

    let ctx = frame::FrameContext::new(
        canvas,
        gpu,
        mouse,
        fx,
        ship_slot,
        wormhole_slot,
        env_slot,
    );
    frame::start_loop(ctx);
    Ok(())
}
