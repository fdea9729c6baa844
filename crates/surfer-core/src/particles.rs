//! Engine-trail particles in a fixed-capacity arena.
//!
//! At most [`MAX_TRAIL_PARTICLES`] live at once; slots are reused through a
//! free list so steady-state emission does not allocate.

use glam::Vec3;
use rand::Rng;

use crate::anim::ShipPose;
use crate::constants::*;

#[derive(Clone, Copy, Debug, Default)]
pub struct TrailParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub life: f32,
    pub max_life: f32,
    pub initial_scale: f32,
}

impl TrailParticle {
    pub fn life_fraction(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Linear fade with remaining life.
    pub fn opacity(&self) -> f32 {
        self.life_fraction()
    }

    /// Shrinks toward half size as the particle ages.
    pub fn scale(&self) -> f32 {
        self.initial_scale * (0.5 + 0.5 * self.life_fraction())
    }
}

/// Emission probability from the ship's current emissive intensity:
/// 0 at the threshold, 1 at the intensity ceiling.
#[inline]
pub fn emission_chance(emissive_intensity: f32) -> f32 {
    ((emissive_intensity - PARTICLE_EMISSION_THRESHOLD)
        / (EMISSIVE_ACTIVE_MAX - PARTICLE_EMISSION_THRESHOLD))
        .clamp(0.0, 1.0)
}

pub struct TrailArena {
    slots: Vec<TrailParticle>,
    alive: Vec<bool>,
    free: Vec<u16>,
    alive_count: usize,
}

impl Default for TrailArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailArena {
    pub fn new() -> Self {
        Self {
            slots: vec![TrailParticle::default(); MAX_TRAIL_PARTICLES],
            alive: vec![false; MAX_TRAIL_PARTICLES],
            free: (0..MAX_TRAIL_PARTICLES as u16).rev().collect(),
            alive_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.alive_count
    }

    pub fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Insert one particle; returns false when the arena is at capacity.
    pub fn spawn(&mut self, particle: TrailParticle) -> bool {
        match self.free.pop() {
            Some(i) => {
                self.slots[i as usize] = particle;
                self.alive[i as usize] = true;
                self.alive_count += 1;
                true
            }
            None => false,
        }
    }

    /// Probabilistic emission for one frame, gated on emissive intensity.
    /// Returns the number of particles actually spawned.
    pub fn emit_from_ship(
        &mut self,
        ship: &ShipPose,
        emissive_intensity: f32,
        dt: f32,
        rng: &mut impl Rng,
    ) -> usize {
        // No trail until the ship model is actually in the scene.
        if !ship.in_scene() || emissive_intensity <= PARTICLE_EMISSION_THRESHOLD {
            return 0;
        }
        let chance = emission_chance(emissive_intensity);
        let candidates = (chance * PARTICLE_EMISSION_RATE * dt) as usize;
        let mut spawned = 0;
        for _ in 0..candidates {
            if rng.gen::<f32>() < chance && self.spawn(spawn_particle(ship, rng)) {
                spawned += 1;
            }
        }
        spawned
    }

    /// Age, integrate, and cull. A particle whose life reaches zero is
    /// released the same tick its opacity hits zero.
    pub fn update(&mut self, dt: f32) {
        for i in 0..self.slots.len() {
            if !self.alive[i] {
                continue;
            }
            let p = &mut self.slots[i];
            p.life -= dt;
            if p.life <= 0.0 {
                p.life = 0.0;
                self.alive[i] = false;
                self.alive_count -= 1;
                self.free.push(i as u16);
            } else {
                p.position += p.velocity * dt;
            }
        }
    }

    /// Release every live particle. Safe to call repeatedly.
    pub fn clear(&mut self) {
        for i in 0..self.alive.len() {
            if self.alive[i] {
                self.alive[i] = false;
                self.free.push(i as u16);
            }
        }
        self.alive_count = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailParticle> {
        self.slots
            .iter()
            .zip(self.alive.iter())
            .filter_map(|(p, a)| a.then_some(p))
    }
}

fn spawn_particle(ship: &ShipPose, rng: &mut impl Rng) -> TrailParticle {
    let position = ship.local_z_offset_point(PARTICLE_EMISSION_OFFSET);

    let speed = PARTICLE_SPEED_MIN + rng.gen::<f32>() * (PARTICLE_SPEED_MAX - PARTICLE_SPEED_MIN);
    let jitter = Vec3::new(
        (rng.gen::<f32>() - 0.5) * PARTICLE_VELOCITY_JITTER,
        (rng.gen::<f32>() - 0.5) * PARTICLE_VELOCITY_JITTER,
        (rng.gen::<f32>() - 0.5) * PARTICLE_VELOCITY_JITTER,
    );
    let velocity = ship.backward_dir() * speed + jitter;

    let life =
        PARTICLE_LIFETIME_MIN + rng.gen::<f32>() * (PARTICLE_LIFETIME_MAX - PARTICLE_LIFETIME_MIN);
    let initial_scale =
        PARTICLE_BASE_SIZE + (rng.gen::<f32>() - 0.5) * PARTICLE_BASE_SIZE * PARTICLE_SIZE_JITTER;

    TrailParticle {
        position,
        velocity,
        life,
        max_life: life,
        initial_scale,
    }
}
