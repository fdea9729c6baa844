// Host-side tests for the scroll state machine driving the boost visuals.

use surfer_core::constants::*;
use surfer_core::scroll::*;

#[test]
fn starts_resting_with_resting_targets() {
    let fx = ScrollFx::new(0.0);
    assert_eq!(fx.phase(), FxPhase::Resting);
    assert_eq!(fx.targets(), FxTargets::resting());
    assert!(!fx.is_active());
}

#[test]
fn downward_scroll_activates_with_max_emissive() {
    let mut fx = ScrollFx::new(0.0);
    fx.on_scroll(5.0, 0.0);
    assert_eq!(fx.phase(), FxPhase::Active);
    // First activation jumps to the ceiling regardless of delta size.
    assert_eq!(fx.targets().emissive, EMISSIVE_ACTIVE_MAX);
    assert_eq!(fx.targets().boost_z, -FORWARD_BOOST_AMOUNT);
    assert_eq!(
        fx.targets().fov_deg,
        CAMERA_BASE_FOV_DEG - FOV_DECREASE_AMOUNT
    );
}

#[test]
fn sustained_scroll_tracks_speed_within_active_band() {
    let mut fx = ScrollFx::new(0.0);
    fx.on_scroll(100.0, 0.0);

    // Slow follow-up: 10px of the 50px normalization window.
    fx.on_scroll(110.0, 16.0);
    let slow = fx.targets().emissive;
    assert!((slow - (EMISSIVE_ACTIVE_MIN + 0.2 * 10.0)).abs() < 1e-4);

    // Fast follow-up clamps at the ceiling.
    fx.on_scroll(400.0, 32.0);
    assert_eq!(fx.targets().emissive, EMISSIVE_ACTIVE_MAX);
}

#[test]
fn upward_scroll_deactivates() {
    let mut fx = ScrollFx::new(100.0);
    fx.on_scroll(200.0, 0.0);
    assert!(fx.is_active());
    fx.on_scroll(150.0, 10.0);
    assert_eq!(fx.phase(), FxPhase::Decaying);
    assert_eq!(fx.targets(), FxTargets::resting());
}

#[test]
fn quiet_window_expiry_starts_decay() {
    let mut fx = ScrollFx::new(0.0);
    fx.on_scroll(50.0, 0.0);

    // Inside the window nothing changes.
    fx.tick(SCROLL_QUIET_WINDOW_MS - 1.0);
    assert!(fx.is_active());

    fx.tick(SCROLL_QUIET_WINDOW_MS + 1.0);
    assert_eq!(fx.phase(), FxPhase::Decaying);
    assert_eq!(fx.targets(), FxTargets::resting());
}

#[test]
fn settle_completes_the_cycle_back_to_resting() {
    let mut fx = ScrollFx::new(0.0);
    fx.on_scroll(50.0, 0.0);
    fx.tick(1000.0);
    assert_eq!(fx.phase(), FxPhase::Decaying);
    fx.settle();
    assert_eq!(fx.phase(), FxPhase::Resting);

    // settle() outside Decaying is a no-op.
    fx.on_scroll(100.0, 2000.0);
    fx.settle();
    assert_eq!(fx.phase(), FxPhase::Active);
}

#[test]
fn reactivation_after_decay_jumps_to_ceiling_again() {
    let mut fx = ScrollFx::new(0.0);
    fx.on_scroll(10.0, 0.0);
    fx.on_scroll(12.0, 5.0);
    assert!(fx.targets().emissive < EMISSIVE_ACTIVE_MAX);
    fx.tick(1000.0);
    fx.settle();

    fx.on_scroll(14.0, 2000.0);
    assert_eq!(fx.targets().emissive, EMISSIVE_ACTIVE_MAX);
}

#[test]
fn zero_delta_does_not_activate() {
    let mut fx = ScrollFx::new(50.0);
    fx.on_scroll(50.0, 0.0);
    assert_eq!(fx.phase(), FxPhase::Resting);
}
