// Host-side tests for asset load-state tracking and decode fallbacks.

use surfer_core::assets::*;

#[test]
fn load_state_payload_is_taken_exactly_once() {
    let mut state: LoadState<u32> = LoadState::Pending;
    assert!(state.is_pending());
    assert!(state.take_ready().is_none());

    state = LoadState::Ready(7);
    assert!(!state.is_pending());
    assert_eq!(state.take_ready(), Some(7));
    assert!(state.take_ready().is_none());
    assert!(!state.is_pending());
}

#[test]
fn failed_state_yields_nothing() {
    let mut state: LoadState<u32> = LoadState::Failed;
    assert!(state.take_ready().is_none());
    assert!(!state.is_pending());
}

#[test]
fn load_error_notifications_carry_context() {
    let n = Notification::load_error("spaceship model", "HTTP 404".to_string());
    assert_eq!(n.severity, Severity::Error);
    assert_eq!(n.title, "spaceship model");
    assert_eq!(n.description, "HTTP 404");
}

#[test]
fn white_fallback_texture_is_opaque_white() {
    let tex = TextureData::white_1x1();
    assert_eq!((tex.width, tex.height), (1, 1));
    assert_eq!(tex.rgba8, vec![255, 255, 255, 255]);
}

#[test]
fn garbage_bytes_fail_to_parse() {
    assert!(parse_glb(b"not a glb").is_err());
    assert!(decode_hdr(b"not an hdr").is_err());
}

#[test]
fn mesh_without_emissive_image_reports_no_map() {
    let mesh = MeshData {
        positions: vec![],
        normals: vec![],
        uvs: vec![],
        indices: vec![],
        material_name: "HULL".to_string(),
        base_color_factor: [1.0; 4],
        emissive_factor: [0.0; 3],
        base_color_image: None,
        emissive_image: None,
    };
    assert!(!mesh.has_emissive_map());
}
