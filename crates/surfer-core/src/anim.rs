//! Per-frame interpolation: animated scalars, ship pose, UV scrolling.

use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::constants::*;

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// A scalar with a "current" value chasing a "target" value.
#[derive(Clone, Copy, Debug)]
pub struct AnimatedScalar {
    pub current: f32,
    pub target: f32,
}

impl AnimatedScalar {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    /// Time-scaled exponential step: lerp factor `min(rate * dt, 1)`.
    pub fn step_scaled(&mut self, dt: f32, rate_per_sec: f32) {
        let t = (dt * rate_per_sec).min(1.0);
        self.current = lerp(self.current, self.target, t);
    }

    /// Fixed per-frame fraction step (frame-rate dependent, as shipped).
    pub fn step_fixed(&mut self, fraction: f32) {
        self.current = lerp(self.current, self.target, fraction);
    }

    pub fn settled(&self, eps: f32) -> bool {
        (self.current - self.target).abs() < eps
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShipPhase {
    /// Model not installed yet; the pose holds at the fly-in start.
    Waiting,
    /// Flying in from far behind the rest position toward it.
    Intro,
    /// Intro finished; pose follows the pointer. One-way transition.
    MouseFollow,
}

/// Ship transform state advanced once per frame.
#[derive(Clone, Copy, Debug)]
pub struct ShipPose {
    pub position: Vec3,
    /// Euler pitch/yaw/roll, XYZ order.
    pub rotation: Vec3,
    phase: ShipPhase,
}

impl Default for ShipPose {
    fn default() -> Self {
        Self::new()
    }
}

impl ShipPose {
    pub fn new() -> Self {
        let rest = ship_rest_vec3();
        Self {
            position: rest + Vec3::new(0.0, 0.0, SHIP_INTRO_DISTANCE),
            rotation: Vec3::new(0.0, SHIP_BASE_YAW, 0.0),
            phase: ShipPhase::Waiting,
        }
    }

    pub fn phase(&self) -> ShipPhase {
        self.phase
    }

    /// Start the fly-in. Called when the ship model is installed; a no-op
    /// once the intro has begun.
    pub fn begin_intro(&mut self) {
        if self.phase == ShipPhase::Waiting {
            self.phase = ShipPhase::Intro;
        }
    }

    /// True once the model is in the scene (intro running or finished).
    pub fn in_scene(&self) -> bool {
        self.phase != ShipPhase::Waiting
    }

    pub fn intro_complete(&self) -> bool {
        self.phase == ShipPhase::MouseFollow
    }

    /// Advance one frame. `mouse_ndc` is the pointer in [-1, 1] coordinates,
    /// or `None` while the pointer is outside the viewport (treated as
    /// centered). `boost_z` is the current forward-lurch offset.
    pub fn update(&mut self, mouse_ndc: Option<Vec2>, boost_z: f32) {
        match self.phase {
            ShipPhase::Waiting => {}
            ShipPhase::Intro => {
                let rest = ship_rest_vec3();
                self.position = self.position.lerp(rest, SHIP_INTRO_LERP);
                if self.position.distance(rest) < SHIP_INTRO_SNAP_EPS {
                    self.position = rest;
                    self.phase = ShipPhase::MouseFollow;
                }
            }
            ShipPhase::MouseFollow => {
                let mouse = mouse_ndc.unwrap_or(Vec2::ZERO);
                let target_pos = follow_target_position(mouse, boost_z);
                let target_rot = follow_target_rotation(mouse);
                self.position = self.position.lerp(target_pos, MOUSE_FOLLOW_SPEED);
                self.rotation.x = lerp(self.rotation.x, target_rot.x, MOUSE_FOLLOW_SPEED);
                self.rotation.y = lerp(self.rotation.y, target_rot.y, MOUSE_FOLLOW_SPEED);
                self.rotation.z = lerp(self.rotation.z, target_rot.z, MOUSE_FOLLOW_SPEED);
            }
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// World-space point `dist` along the ship's local Z axis (negative is
    /// behind the nose; trail particles spawn there).
    pub fn local_z_offset_point(&self, dist: f32) -> Vec3 {
        self.position + self.quat() * Vec3::new(0.0, 0.0, dist)
    }

    /// World-space direction of the ship's local backward axis.
    pub fn backward_dir(&self) -> Vec3 {
        self.quat() * Vec3::new(0.0, 0.0, -1.0)
    }
}

/// Parallax target: rest position offset by pointer position, plus the boost
/// lurch on the depth axis.
pub fn follow_target_position(mouse_ndc: Vec2, boost_z: f32) -> Vec3 {
    let rest = ship_rest_vec3();
    Vec3::new(
        mouse_ndc.x * PARALLAX_FACTOR_X + rest.x,
        mouse_ndc.y * PARALLAX_FACTOR_Y + rest.y,
        rest.z + boost_z,
    )
}

/// Tilt targets, each axis independently clamped.
pub fn follow_target_rotation(mouse_ndc: Vec2) -> Vec3 {
    let pitch = -(mouse_ndc.y * SHIP_ROTATION_FACTOR * 0.7).clamp(-SHIP_MAX_TILT, SHIP_MAX_TILT);
    let yaw = SHIP_BASE_YAW
        - (mouse_ndc.x * SHIP_ROTATION_FACTOR * 0.5)
            .clamp(-SHIP_MAX_TILT * 0.8, SHIP_MAX_TILT * 0.8);
    let roll = -(mouse_ndc.x * SHIP_ROTATION_FACTOR).clamp(-SHIP_MAX_TILT, SHIP_MAX_TILT);
    Vec3::new(pitch, yaw, roll)
}

/// Accumulating texture-coordinate offset for the wormhole materials.
#[derive(Clone, Copy, Debug)]
pub struct UvScroll {
    pub offset: Vec2,
    pub speed: Vec2,
}

impl UvScroll {
    pub fn new(speed: [f32; 2]) -> Self {
        Self {
            offset: Vec2::ZERO,
            speed: Vec2::from_array(speed),
        }
    }

    pub fn advance(&mut self, dt: f32) {
        // Textures use repeat wrapping; keep the offset in [0,1) so the
        // uniform never grows without bound. Euclidean wrap, since the
        // speeds can be negative.
        let o = self.offset + self.speed * dt;
        self.offset = o - o.floor();
    }
}
