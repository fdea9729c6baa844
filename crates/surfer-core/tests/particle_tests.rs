// Host-side tests for the engine-trail particle arena.

use rand::rngs::StdRng;
use rand::SeedableRng;

use surfer_core::anim::ShipPose;
use surfer_core::constants::*;
use surfer_core::particles::*;

fn particle(life: f32) -> TrailParticle {
    TrailParticle {
        life,
        max_life: life,
        initial_scale: PARTICLE_BASE_SIZE,
        ..TrailParticle::default()
    }
}

#[test]
fn arena_never_exceeds_capacity() {
    let mut arena = TrailArena::new();
    for _ in 0..MAX_TRAIL_PARTICLES {
        assert!(arena.spawn(particle(1.0)));
    }
    assert_eq!(arena.len(), MAX_TRAIL_PARTICLES);
    assert!(!arena.spawn(particle(1.0)), "spawn past capacity succeeded");
    assert_eq!(arena.len(), MAX_TRAIL_PARTICLES);
}

#[test]
fn expired_particles_free_their_slot_the_same_tick() {
    let mut arena = TrailArena::new();
    arena.spawn(particle(0.05));
    arena.spawn(particle(1.0));
    assert_eq!(arena.len(), 2);

    arena.update(0.1);
    assert_eq!(arena.len(), 1);

    // The freed slot is immediately reusable.
    for _ in 0..MAX_TRAIL_PARTICLES - 1 {
        assert!(arena.spawn(particle(1.0)));
    }
    assert_eq!(arena.len(), MAX_TRAIL_PARTICLES);
}

#[test]
fn opacity_tracks_remaining_life() {
    let mut p = particle(2.0);
    assert!((p.opacity() - 1.0).abs() < 1e-6);
    p.life = 1.0;
    assert!((p.opacity() - 0.5).abs() < 1e-6);
    p.life = 0.0;
    assert_eq!(p.opacity(), 0.0);
}

#[test]
fn scale_shrinks_to_half_over_lifetime() {
    let mut p = particle(1.0);
    assert!((p.scale() - PARTICLE_BASE_SIZE).abs() < 1e-6);
    p.life = 0.0;
    assert!((p.scale() - PARTICLE_BASE_SIZE * 0.5).abs() < 1e-6);
}

#[test]
fn emission_chance_spans_threshold_to_ceiling() {
    assert_eq!(emission_chance(0.0), 0.0);
    assert_eq!(emission_chance(PARTICLE_EMISSION_THRESHOLD), 0.0);
    let mid = (PARTICLE_EMISSION_THRESHOLD + EMISSIVE_ACTIVE_MAX) * 0.5;
    assert!((emission_chance(mid) - 0.5).abs() < 1e-6);
    assert_eq!(emission_chance(EMISSIVE_ACTIVE_MAX), 1.0);
    assert_eq!(emission_chance(EMISSIVE_ACTIVE_MAX + 50.0), 1.0);
}

#[test]
fn emission_is_gated_on_emissive_threshold() {
    let mut arena = TrailArena::new();
    let mut ship = ShipPose::new();
    ship.begin_intro();
    let mut rng = StdRng::seed_from_u64(7);
    let spawned = arena.emit_from_ship(&ship, PARTICLE_EMISSION_THRESHOLD, 1.0, &mut rng);
    assert_eq!(spawned, 0);
    assert!(arena.is_empty());
}

#[test]
fn no_trail_while_the_ship_model_is_still_loading() {
    let mut arena = TrailArena::new();
    let ship = ShipPose::new();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..60 {
        arena.emit_from_ship(&ship, EMISSIVE_ACTIVE_MAX, 0.05, &mut rng);
    }
    assert!(arena.is_empty());
}

#[test]
fn emission_at_full_intensity_fills_but_respects_the_cap() {
    let mut arena = TrailArena::new();
    let mut ship = ShipPose::new();
    ship.begin_intro();
    let mut rng = StdRng::seed_from_u64(7);
    let mut total = 0;
    for _ in 0..60 {
        total += arena.emit_from_ship(&ship, EMISSIVE_ACTIVE_MAX, 0.05, &mut rng);
    }
    assert!(total > 0);
    assert!(arena.len() <= MAX_TRAIL_PARTICLES);
    assert_eq!(arena.len(), MAX_TRAIL_PARTICLES, "cap never reached");
}

#[test]
fn spawned_particles_sit_behind_the_ship() {
    let mut arena = TrailArena::new();
    let mut ship = ShipPose::new();
    ship.begin_intro();
    let mut rng = StdRng::seed_from_u64(3);
    arena.emit_from_ship(&ship, EMISSIVE_ACTIVE_MAX, 0.1, &mut rng);
    let emit = ship.local_z_offset_point(PARTICLE_EMISSION_OFFSET);
    for p in arena.iter() {
        assert!(p.position.distance(emit) < 1e-4);
        assert!(p.life >= PARTICLE_LIFETIME_MIN && p.life <= PARTICLE_LIFETIME_MAX);
        let speed = p.velocity.length();
        assert!(speed > PARTICLE_SPEED_MIN - 3.0 * PARTICLE_VELOCITY_JITTER);
        assert!(speed < PARTICLE_SPEED_MAX + 3.0 * PARTICLE_VELOCITY_JITTER);
    }
}

#[test]
fn clear_is_idempotent_and_restores_capacity() {
    let mut arena = TrailArena::new();
    for _ in 0..40 {
        arena.spawn(particle(1.0));
    }
    arena.clear();
    assert!(arena.is_empty());
    arena.clear();
    assert!(arena.is_empty());
    for _ in 0..MAX_TRAIL_PARTICLES {
        assert!(arena.spawn(particle(1.0)));
    }
    assert_eq!(arena.len(), MAX_TRAIL_PARTICLES);
}

#[test]
fn update_integrates_position_for_live_particles() {
    let mut arena = TrailArena::new();
    let mut p = particle(1.0);
    p.velocity = glam::Vec3::new(0.0, 0.0, 2.0);
    arena.spawn(p);
    arena.update(0.5);
    let moved: Vec<_> = arena.iter().collect();
    assert_eq!(moved.len(), 1);
    assert!((moved[0].position.z - 1.0).abs() < 1e-6);
    assert!((moved[0].life - 0.5).abs() < 1e-6);
}
