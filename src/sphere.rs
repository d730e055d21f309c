//! Distorting spheres.
//!
//! Each sphere wobbles about its own centre and, as a group, hovers gently
//! around the origin. Both motions are pure functions of elapsed time: calling
//! [`Sphere::update`] with the same `t` always produces the same state, and
//! nothing accumulates between frames.

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::orientation::Orientation;
use crate::visuals::SphereMaterial;

/// Floating group motion wrapped around a primitive.
///
/// The phase offset is drawn once when the sphere is created, so spheres
/// built together do not bob in lockstep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hover {
    /// Animation rate.
    pub speed: f32,
    /// Scale on the group's rotation wobble.
    pub rotation_intensity: f32,
    /// Scale on the vertical bob.
    pub float_intensity: f32,
    /// Phase offset in seconds.
    pub offset: f32,
}

impl Hover {
    /// Upper bound of the random phase offset.
    pub const MAX_OFFSET: f32 = 10_000.0;

    /// The hover used by the portfolio scene, with a random phase.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            offset: rng.gen_range(0.0..Self::MAX_OFFSET),
            ..Self::still()
        }
    }

    /// Portfolio hover parameters with zero phase offset.
    pub fn still() -> Self {
        Self {
            speed: 2.0,
            rotation_intensity: 1.0,
            float_intensity: 2.0,
            offset: 0.0,
        }
    }

    fn phase(&self, t: f32) -> f32 {
        (self.offset + t) / 4.0 * self.speed
    }

    /// Group rotation at time `t`.
    pub fn orientation_at(&self, t: f32) -> Orientation {
        let a = self.phase(t);
        Orientation::with_z(
            a.cos() / 8.0 * self.rotation_intensity,
            a.sin() / 8.0 * self.rotation_intensity,
            a.sin() / 20.0 * self.rotation_intensity,
        )
    }

    /// Group vertical offset at time `t`.
    pub fn lift_at(&self, t: f32) -> f32 {
        self.phase(t).sin() / 10.0 * self.float_intensity
    }

    /// Group transform at time `t`.
    pub fn transform_at(&self, t: f32) -> Mat4 {
        Mat4::from_translation(Vec3::Y * self.lift_at(t)) * self.orientation_at(t).to_mat4()
    }
}

/// A decorative sphere.
#[derive(Debug, Clone)]
pub struct Sphere {
    position: Vec3,
    scale: f32,
    color: Vec3,
    material: SphereMaterial,
    hover: Hover,
    rotation: Orientation,
    group: Mat4,
}

impl Sphere {
    /// Create a unit-scale sphere.
    ///
    /// `color` is linear RGB; see [`crate::visuals::hex_color`].
    pub fn new(position: Vec3, color: Vec3) -> Self {
        let hover = Hover::still();
        Self {
            position,
            scale: 1.0,
            color,
            material: SphereMaterial::default(),
            hover,
            rotation: Orientation::IDENTITY,
            group: hover.transform_at(0.0),
        }
    }

    /// Set the base scale. Non-positive or non-finite values are ignored.
    pub fn with_scale(mut self, scale: f32) -> Self {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
        self
    }

    /// Set the hover motion.
    pub fn with_hover(mut self, hover: Hover) -> Self {
        self.hover = hover;
        self.group = hover.transform_at(0.0);
        self
    }

    /// Wobble at time `t`.
    pub fn orientation_at(t: f32) -> Orientation {
        Orientation::new(t.sin() * 0.2, (t * 0.5).sin() * 0.3)
    }

    /// Distortion phase fed to the surface at time `t`.
    pub fn distortion_phase_at(&self, t: f32) -> f32 {
        t * self.material.speed
    }

    /// Re-derive the per-frame state for time `t`.
    pub fn update(&mut self, t: f32) {
        self.rotation = Self::orientation_at(t);
        self.group = self.hover.transform_at(t);
    }

    /// Centre relative to the hover group.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Linear RGB colour.
    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn material(&self) -> SphereMaterial {
        self.material
    }

    /// Distortion amplitude. Fixed for the sphere's lifetime.
    pub fn distort(&self) -> f32 {
        self.material.distort
    }

    /// Distortion speed. Fixed for the sphere's lifetime.
    pub fn speed(&self) -> f32 {
        self.material.speed
    }

    pub fn hover(&self) -> Hover {
        self.hover
    }

    /// Rotation computed by the last [`update`](Self::update).
    pub fn rotation(&self) -> Orientation {
        self.rotation
    }

    /// Hover group transform computed by the last [`update`](Self::update).
    pub fn group_transform(&self) -> Mat4 {
        self.group
    }

    /// Full model matrix: hover group, then translate, rotate and scale.
    pub fn model_matrix(&self) -> Mat4 {
        self.group
            * Mat4::from_translation(self.position)
            * self.rotation.to_mat4()
            * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sphere() -> Sphere {
        Sphere::new(Vec3::new(-4.0, 2.0, -2.0), Vec3::ONE).with_scale(0.8)
    }

    #[test]
    fn test_orientation_formula() {
        for &t in &[0.0f32, 0.5, 1.0, 3.14159, 42.0, 1234.5] {
            let o = Sphere::orientation_at(t);
            assert_eq!(o.x, t.sin() * 0.2);
            assert_eq!(o.y, (t * 0.5).sin() * 0.3);
            assert_eq!(o.z, 0.0);
        }
    }

    #[test]
    fn test_zero_time_is_unrotated() {
        let mut s = sphere();
        s.update(0.0);
        assert_eq!(s.rotation(), Orientation::IDENTITY);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut s = sphere();
        s.update(7.25);
        let first = (s.rotation(), s.group_transform());
        s.update(7.25);
        assert_eq!(first, (s.rotation(), s.group_transform()));
    }

    #[test]
    fn test_update_does_not_accumulate() {
        let mut a = sphere();
        let mut b = sphere();
        for i in 0..1000 {
            a.update(i as f32 * 0.016);
        }
        a.update(5.0);
        b.update(5.0);
        assert_eq!(a.rotation(), b.rotation());
    }

    #[test]
    fn test_scale_defaults_and_rejects_invalid() {
        let s = Sphere::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(s.scale(), 1.0);
        assert_eq!(s.clone().with_scale(0.0).scale(), 1.0);
        assert_eq!(s.clone().with_scale(-2.0).scale(), 1.0);
        assert_eq!(s.with_scale(f32::NAN).scale(), 1.0);
    }

    #[test]
    fn test_fixed_distortion_parameters() {
        let s = sphere();
        assert_eq!(s.distort(), 0.3);
        assert_eq!(s.speed(), 2.0);
        assert_eq!(s.distortion_phase_at(1.5), 3.0);
    }

    #[test]
    fn test_hover_formula() {
        let hover = Hover::still();
        let t = 2.0f32;
        let a = t / 4.0 * 2.0;
        let o = hover.orientation_at(t);
        assert!((o.x - a.cos() / 8.0).abs() < 1e-6);
        assert!((o.y - a.sin() / 8.0).abs() < 1e-6);
        assert!((o.z - a.sin() / 20.0).abs() < 1e-6);
        assert!((hover.lift_at(t) - a.sin() / 10.0 * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_random_hover_offset_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let hover = Hover::random(&mut rng);
            assert!(hover.offset >= 0.0 && hover.offset < Hover::MAX_OFFSET);
        }
    }

    #[test]
    fn test_model_matrix_places_centre() {
        let mut s = sphere();
        s.update(0.0);
        let centre = s.model_matrix().transform_point3(Vec3::ZERO);
        let expected = s.group_transform().transform_point3(s.position());
        assert!(centre.abs_diff_eq(expected, 1e-5));
    }
}
