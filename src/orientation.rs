//! Euler orientation shared by every primitive.

use glam::{EulerRot, Mat4, Quat};

/// Rotation angles in radians, applied in X, then Y, then Z order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Rotation about the X axis.
    pub x: f32,
    /// Rotation about the Y axis.
    pub y: f32,
    /// Rotation about the Z axis.
    pub z: f32,
}

impl Orientation {
    /// No rotation.
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Orientation from the two angles every primitive animates.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Orientation with all three angles.
    #[inline]
    pub const fn with_z(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Rotation as a quaternion.
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.x, self.y, self.z)
    }

    /// Rotation as a homogeneous matrix.
    pub fn to_mat4(self) -> Mat4 {
        Mat4::from_quat(self.to_quat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_identity_matrix() {
        assert!(Orientation::IDENTITY.to_mat4().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_x_then_y_order() {
        // Intrinsic XYZ: a point is rotated by Z first, then Y, then X.
        let o = Orientation::new(std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
        let expected = Mat4::from_rotation_x(o.x) * Mat4::from_rotation_y(o.y);
        let p = Vec3::new(1.0, 2.0, 3.0);
        let a = o.to_mat4().transform_point3(p);
        let b = expected.transform_point3(p);
        assert!(a.abs_diff_eq(b, 1e-5));
    }
}
