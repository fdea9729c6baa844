use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use surfer_core::ScrollFx;

use crate::input;

/// Wire pointer tracking on the window: mousemove updates NDC, leaving the
/// document clears it so the ship drifts back to center.
pub fn wire_pointer(
    window: &web::Window,
    mouse: Rc<RefCell<input::MouseState>>,
) -> anyhow::Result<()> {
    {
        let mouse = mouse.clone();
        let win = window.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::MouseEvent| {
            mouse.borrow_mut().ndc = input::mouse_ndc(&ev, &win);
        }) as Box<dyn FnMut(_)>);
        window
            .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        closure.forget();
    }
    {
        let mouse = mouse.clone();
        let closure = Closure::wrap(Box::new(move |_ev: web::MouseEvent| {
            mouse.borrow_mut().ndc = None;
        }) as Box<dyn FnMut(_)>);
        if let Some(document) = window.document() {
            document
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())
                .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        }
        closure.forget();
    }
    Ok(())
}

/// Feed page scroll offsets into the acceleration state machine.
pub fn wire_scroll(window: &web::Window, fx: Rc<RefCell<ScrollFx>>) -> anyhow::Result<()> {
    let win = window.clone();
    let closure = Closure::wrap(Box::new(move || {
        let offset = win.scroll_y().unwrap_or(0.0);
        let now_ms = win
            .performance()
            .map(|p| p.now())
            .unwrap_or(0.0);
        fx.borrow_mut().on_scroll(offset, now_ms);
    }) as Box<dyn FnMut()>);
    window
        .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    closure.forget();
    Ok(())
}
