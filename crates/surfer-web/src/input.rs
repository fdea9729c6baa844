use glam::Vec2;
use web_sys as web;

/// Latest pointer position in normalized device coordinates, or `None`
/// while the pointer is outside the viewport.
#[derive(Default, Clone, Copy)]
pub struct MouseState {
    pub ndc: Option<Vec2>,
}

/// Client coordinates to [-1, 1] NDC over the whole viewport. The ship
/// follows the pointer anywhere on the page, not just over the canvas.
#[inline]
pub fn mouse_ndc(ev: &web::MouseEvent, window: &web::Window) -> Option<Vec2> {
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let x = (ev.client_x() as f64 / w) * 2.0 - 1.0;
    let y = -((ev.client_y() as f64 / h) * 2.0 - 1.0);
    Some(Vec2::new(x as f32, y as f32))
}
