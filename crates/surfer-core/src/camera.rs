//! Fixed camera with an animated field of view.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::constants::*;

/// Right-handed perspective camera. Position and rotation are fixed for the
/// scene's lifetime; only FOV (scroll boost) and aspect (resize) change.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    /// Euler pitch/yaw/roll, XYZ order.
    pub rotation: Vec3,
    pub fov_deg: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: camera_position_vec3(),
            rotation: Vec3::new(CAMERA_ROTATION_X, 0.0, 0.0),
            fov_deg: CAMERA_BASE_FOV_DEG,
            aspect,
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_deg.to_radians(),
            self.aspect.max(1e-6),
            self.znear,
            self.zfar,
        )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Billboard basis vectors for camera-facing particles.
    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation() * Vec3::Y
    }
}
