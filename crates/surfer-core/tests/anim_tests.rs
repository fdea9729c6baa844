// Host-side tests for ship pose interpolation and animated scalars.

use glam::{Vec2, Vec3};

use surfer_core::anim::*;
use surfer_core::constants::*;

#[test]
fn animated_scalar_converges_scaled_by_dt() {
    let mut s = AnimatedScalar::new(EMISSIVE_INITIAL);
    s.target = EMISSIVE_RESTING;
    for _ in 0..200 {
        s.step_scaled(1.0 / 60.0, EMISSIVE_LERP_RATE_PER_SEC);
    }
    assert!(s.settled(0.01));

    // A huge dt clamps the lerp factor at 1 instead of overshooting.
    let mut s = AnimatedScalar::new(0.0);
    s.target = 100.0;
    s.step_scaled(10.0, EMISSIVE_LERP_RATE_PER_SEC);
    assert_eq!(s.current, 100.0);
}

#[test]
fn animated_scalar_fixed_step_never_overshoots() {
    let mut s = AnimatedScalar::new(CAMERA_BASE_FOV_DEG);
    s.target = CAMERA_BASE_FOV_DEG - FOV_DECREASE_AMOUNT;
    let mut prev = s.current;
    for _ in 0..300 {
        s.step_fixed(ACCEL_EFFECT_LERP);
        assert!(s.current <= prev);
        assert!(s.current >= s.target);
        prev = s.current;
    }
    assert!(s.settled(0.01));
}

#[test]
fn intro_holds_until_the_model_installs() {
    let mut pose = ShipPose::new();
    assert_eq!(pose.phase(), ShipPhase::Waiting);
    assert!(!pose.in_scene());
    let start = pose.position;

    // A slow model load must not consume the fly-in.
    for _ in 0..300 {
        pose.update(Some(Vec2::new(0.4, -0.2)), 0.0);
    }
    assert_eq!(pose.position, start);
    assert_eq!(pose.phase(), ShipPhase::Waiting);

    pose.begin_intro();
    assert_eq!(pose.phase(), ShipPhase::Intro);
    let rest = ship_rest_vec3();
    pose.update(None, 0.0);
    assert!(pose.position.distance(rest) < start.distance(rest));

    // Repeated calls do not restart a running intro.
    let moved = pose.position;
    pose.begin_intro();
    assert_eq!(pose.position, moved);
    assert_eq!(pose.phase(), ShipPhase::Intro);
}

#[test]
fn intro_flies_in_and_snaps_to_rest_once() {
    let mut pose = ShipPose::new();
    pose.begin_intro();
    assert_eq!(pose.phase(), ShipPhase::Intro);
    let rest = ship_rest_vec3();
    assert!((pose.position.z - (rest.z + SHIP_INTRO_DISTANCE)).abs() < 1e-6);

    let mut frames = 0;
    while !pose.intro_complete() && frames < 5000 {
        pose.update(None, 0.0);
        frames += 1;
    }
    assert!(pose.intro_complete(), "intro never converged");
    assert_eq!(pose.position, rest);

    // One-way transition: later frames stay in mouse-follow.
    for _ in 0..10 {
        pose.update(Some(Vec2::new(0.5, 0.5)), 0.0);
        assert_eq!(pose.phase(), ShipPhase::MouseFollow);
    }
}

#[test]
fn centered_pointer_targets_the_rest_pose() {
    let target = follow_target_position(Vec2::ZERO, 0.0);
    assert_eq!(target, ship_rest_vec3());

    let rot = follow_target_rotation(Vec2::ZERO);
    assert_eq!(rot, Vec3::new(0.0, SHIP_BASE_YAW, 0.0));
}

#[test]
fn pointer_parallax_scales_per_axis() {
    let target = follow_target_position(Vec2::new(1.0, -1.0), 0.0);
    let rest = ship_rest_vec3();
    assert!((target.x - (rest.x + PARALLAX_FACTOR_X)).abs() < 1e-6);
    assert!((target.y - (rest.y - PARALLAX_FACTOR_Y)).abs() < 1e-6);
    assert_eq!(target.z, rest.z);
}

#[test]
fn boost_offsets_the_depth_target_only() {
    let calm = follow_target_position(Vec2::new(0.3, 0.3), 0.0);
    let boosted = follow_target_position(Vec2::new(0.3, 0.3), -FORWARD_BOOST_AMOUNT);
    assert_eq!(boosted.x, calm.x);
    assert_eq!(boosted.y, calm.y);
    assert!((boosted.z - (calm.z - FORWARD_BOOST_AMOUNT)).abs() < 1e-6);
}

#[test]
fn tilt_is_clamped_for_extreme_pointer_positions() {
    let rot = follow_target_rotation(Vec2::new(100.0, 100.0));
    assert!((rot.x + SHIP_MAX_TILT).abs() < 1e-6);
    assert!((rot.y - (SHIP_BASE_YAW - SHIP_MAX_TILT * 0.8)).abs() < 1e-5);
    assert!((rot.z + SHIP_MAX_TILT).abs() < 1e-6);

    let rot = follow_target_rotation(Vec2::new(-100.0, -100.0));
    assert!((rot.x - SHIP_MAX_TILT).abs() < 1e-6);
    assert!((rot.y - (SHIP_BASE_YAW + SHIP_MAX_TILT * 0.8)).abs() < 1e-5);
    assert!((rot.z - SHIP_MAX_TILT).abs() < 1e-6);
}

#[test]
fn missing_pointer_is_treated_as_centered() {
    let mut with_mouse = ShipPose::new();
    let mut without = ShipPose::new();
    with_mouse.begin_intro();
    without.begin_intro();
    while !with_mouse.intro_complete() {
        with_mouse.update(None, 0.0);
        without.update(None, 0.0);
    }
    for _ in 0..50 {
        with_mouse.update(Some(Vec2::ZERO), 0.0);
        without.update(None, 0.0);
    }
    assert!(with_mouse.position.distance(without.position) < 1e-6);
}

#[test]
fn uv_scroll_accumulates_and_stays_bounded() {
    let mut uv = UvScroll::new(WORMHOLE2_OFFSET_SPEED);
    for _ in 0..10_000 {
        uv.advance(1.0 / 60.0);
        assert!(uv.offset.x >= 0.0 && uv.offset.x < 1.0);
        assert!(uv.offset.y >= 0.0 && uv.offset.y < 1.0);
    }
    // Still actually moving.
    let before = uv.offset;
    uv.advance(0.1);
    assert_ne!(before, uv.offset);
}
