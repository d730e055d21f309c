//! Camera for the 3D orbit view.

use glam::{Mat4, Vec3};

/// Orbit camera looking at the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Camera {
    /// Near clip plane.
    pub const NEAR: f32 = 0.1;
    /// Far clip plane. Covers the far corner of the particle cube from the default eye.
    pub const FAR: f32 = 100.0;

    /// Create a new camera with default positioning.
    pub fn new() -> Self {
        Self::looking_at(Vec3::new(0.0, 0.0, 8.0), Vec3::ZERO, 50.0)
    }

    /// Camera placed at `eye`, orbiting `target`.
    pub fn looking_at(eye: Vec3, target: Vec3, fov_degrees: f32) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        Self {
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
            target,
            fov_degrees,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Perspective projection for a viewport of the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, Self::NEAR, Self::FAR)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Slowly auto-orbiting camera with an optional user drag offset.
///
/// Zoom and pan are fixed; only the viewing angle moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    /// Resting eye position.
    pub eye: Vec3,
    /// Point the camera orbits.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Auto-orbit speed; 1.0 is one revolution per minute.
    pub auto_rotate_speed: f32,
    /// Yaw added by user drags.
    pub user_yaw: f32,
    /// Pitch added by user drags.
    pub user_pitch: f32,
}

impl CameraRig {
    /// Pitch limit, just short of straight up or down.
    pub const MAX_PITCH: f32 = 1.5;

    /// Auto-orbit rate in radians per second.
    pub fn auto_rotate_rate(&self) -> f32 {
        std::f32::consts::TAU / 60.0 * self.auto_rotate_speed
    }

    /// Camera at elapsed time `t`.
    pub fn camera_at(&self, t: f32) -> Camera {
        let mut camera = Camera::looking_at(self.eye, self.target, self.fov_degrees);
        camera.yaw += self.user_yaw - t * self.auto_rotate_rate();
        camera.pitch = (camera.pitch + self.user_pitch).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
        camera
    }

    /// Apply a drag of `dx`, `dy` radians.
    pub fn orbit_by(&mut self, dx: f32, dy: f32) {
        self.user_yaw += dx;
        self.user_pitch = (self.user_pitch + dy).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 8.0),
            target: Vec3::ZERO,
            fov_degrees: 50.0,
            auto_rotate_speed: 0.5,
            user_yaw: 0.0,
            user_pitch: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looking_at_round_trips_eye() {
        let eye = Vec3::new(3.0, 2.0, 8.0);
        let camera = Camera::looking_at(eye, Vec3::ZERO, 50.0);
        assert!(camera.position().abs_diff_eq(eye, 1e-4));
    }

    #[test]
    fn test_default_camera_on_z_axis() {
        let camera = Camera::new();
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, 8.0), 1e-5));
        assert_eq!(camera.fov_degrees, 50.0);
    }

    #[test]
    fn test_rig_orbits_at_fixed_rate() {
        let rig = CameraRig::default();
        // Speed 0.5 is half a revolution per minute.
        let after_minute = rig.camera_at(60.0);
        let start = rig.camera_at(0.0);
        assert!((start.yaw - after_minute.yaw - std::f32::consts::PI).abs() < 1e-4);
        assert!((after_minute.distance - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_rig_is_pure_in_time() {
        let rig = CameraRig::default();
        assert_eq!(rig.camera_at(12.0), rig.camera_at(12.0));
    }

    #[test]
    fn test_orbit_by_clamps_pitch() {
        let mut rig = CameraRig::default();
        rig.orbit_by(0.25, 10.0);
        assert_eq!(rig.user_yaw, 0.25);
        assert_eq!(rig.user_pitch, CameraRig::MAX_PITCH);
        assert_eq!(rig.camera_at(0.0).pitch, CameraRig::MAX_PITCH);
    }
}
