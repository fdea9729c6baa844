use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys as web;

use surfer_core::{Notification, Severity};

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Keep the canvas backing store sized to CSS size * devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

pub fn find_canvas(document: &web::Document, id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    let el = document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{id}"))?;
    el.dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))
}

/// Surface a notification to the hosting page as a `surfer:notification`
/// CustomEvent on the document; the page decides how to present it.
pub fn notify(n: &Notification) {
    let Some(document) = window_document() else {
        return;
    };
    let detail = js_sys::Object::new();
    let severity = match n.severity {
        Severity::Info => "info",
        Severity::Error => "error",
    };
    let _ = js_sys::Reflect::set(&detail, &"severity".into(), &JsValue::from_str(severity));
    let _ = js_sys::Reflect::set(&detail, &"title".into(), &JsValue::from_str(&n.title));
    let _ = js_sys::Reflect::set(
        &detail,
        &"description".into(),
        &JsValue::from_str(&n.description),
    );
    let init = web::CustomEventInit::new();
    init.set_detail(detail.as_ref());
    if let Ok(ev) = web::CustomEvent::new_with_event_init_dict("surfer:notification", &init) {
        let _ = document.dispatch_event(&ev);
    }
}
