use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

use surfer_core::{decode_hdr, parse_glb, EquirectImage, LoadState, Notification, SceneModel};

use crate::dom;

async fn fetch_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resp_value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow::anyhow!(format!("fetch {url}: {:?}", e)))?;
    let resp: web::Response = resp_value
        .dyn_into()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    if !resp.ok() {
        anyhow::bail!("fetch {url}: HTTP {}", resp.status());
    }
    let buf = JsFuture::from(
        resp.array_buffer()
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?,
    )
    .await
    .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

/// Fetch and parse a GLB in the background; the frame driver polls `slot`.
/// Failure flips the slot to `Failed` and notifies the page, the scene keeps
/// rendering without the model.
pub fn spawn_model_load(url: &'static str, label: &'static str, slot: Rc<RefCell<LoadState<SceneModel>>>) {
    spawn_local(async move {
        let result = match fetch_bytes(url).await {
            Ok(bytes) => parse_glb(&bytes).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(model) => {
                log::info!("[assets] {label} ready ({} meshes)", model.meshes.len());
                *slot.borrow_mut() = LoadState::Ready(model);
            }
            Err(e) => {
                log::error!("[assets] {label} failed: {e}");
                dom::notify(&Notification::load_error(label, e));
                *slot.borrow_mut() = LoadState::Failed;
            }
        }
    });
}

/// Fetch and decode the equirect HDR environment in the background.
pub fn spawn_env_load(url: &'static str, slot: Rc<RefCell<LoadState<EquirectImage>>>) {
    spawn_local(async move {
        let result = match fetch_bytes(url).await {
            Ok(bytes) => decode_hdr(&bytes).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(image) => {
                log::info!("[assets] environment ready ({}x{})", image.width, image.height);
                *slot.borrow_mut() = LoadState::Ready(image);
            }
            Err(e) => {
                log::error!("[assets] environment failed: {e}");
                dom::notify(&Notification::load_error("environment", e));
                *slot.borrow_mut() = LoadState::Failed;
            }
        }
    });
}
