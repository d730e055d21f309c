//! Drifting particle field.
//!
//! A fixed cloud of points sampled once, uniformly inside a cube. The points
//! are never touched again; each frame only the orientation of the whole
//! field changes, slowly, as a pure function of elapsed time.

use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::orientation::Orientation;
use crate::visuals::PointMaterial;

/// The particle field.
#[derive(Debug, Clone)]
pub struct ParticleField {
    points: Vec<Vec3>,
    material: PointMaterial,
    rotation: Orientation,
}

impl ParticleField {
    /// Number of points in every field.
    pub const COUNT: usize = 2000;
    /// Half-size of the sampling cube (points lie in `[-25, 25]` on each axis).
    pub const HALF_EXTENT: f32 = 25.0;

    /// Sample a new field from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(&mut SmallRng::from_entropy())
    }

    /// Sample a new field reproducibly from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(&mut SmallRng::seed_from_u64(seed))
    }

    /// Sample a new field from `rng`.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let range = -Self::HALF_EXTENT..=Self::HALF_EXTENT;
        let points = (0..Self::COUNT)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(range.clone()),
                    rng.gen_range(range.clone()),
                    rng.gen_range(range.clone()),
                )
            })
            .collect();

        Self {
            points,
            material: PointMaterial::default(),
            rotation: Orientation::IDENTITY,
        }
    }

    /// Replace the sprite appearance.
    pub fn with_material(mut self, material: PointMaterial) -> Self {
        self.material = material;
        self
    }

    /// Field orientation at time `t`.
    pub fn orientation_at(t: f32) -> Orientation {
        Orientation::new((t * 0.1).sin() * 0.1, (t * 0.05).sin() * 0.1)
    }

    /// Re-derive the per-frame orientation for time `t`.
    pub fn update(&mut self, t: f32) {
        self.rotation = Self::orientation_at(t);
    }

    /// The sampled points, in field-local space.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn material(&self) -> PointMaterial {
        self.material
    }

    /// Orientation computed by the last [`update`](Self::update).
    pub fn rotation(&self) -> Orientation {
        self.rotation
    }

    /// Field-to-world transform for the current orientation.
    pub fn model_matrix(&self) -> Mat4 {
        self.rotation.to_mat4()
    }
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_count_and_bounds() {
        let field = ParticleField::with_seed(1);
        assert_eq!(field.points().len(), ParticleField::COUNT);
        assert_eq!(field.points().len(), 2000);
        for p in field.points() {
            for c in p.to_array() {
                assert!((-25.0..=25.0).contains(&c), "coordinate {c} out of range");
            }
        }
    }

    #[test]
    fn test_points_fill_the_cube() {
        // 2000 uniform samples should reach well into every octant corner.
        let field = ParticleField::with_seed(2);
        let max = field.points().iter().fold(Vec3::splat(f32::MIN), |a, p| a.max(*p));
        let min = field.points().iter().fold(Vec3::splat(f32::MAX), |a, p| a.min(*p));
        assert!(max.min_element() > 20.0);
        assert!(min.max_element() < -20.0);
    }

    #[test]
    fn test_independent_samples_differ() {
        let a = ParticleField::new();
        let b = ParticleField::new();
        assert_ne!(a.points(), b.points());
    }

    #[test]
    fn test_seed_is_reproducible() {
        assert_eq!(
            ParticleField::with_seed(99).points(),
            ParticleField::with_seed(99).points()
        );
    }

    #[test]
    fn test_points_survive_updates() {
        let mut field = ParticleField::with_seed(3);
        let before = field.points().to_vec();
        for i in 0..600 {
            field.update(i as f32 / 60.0);
        }
        assert_eq!(field.points(), &before[..]);
    }

    #[test]
    fn test_orientation_formula() {
        for &t in &[0.0f32, 1.0, 3.14159, 100.0, 9999.0] {
            let o = ParticleField::orientation_at(t);
            assert_eq!(o.x, (t * 0.1).sin() * 0.1);
            assert_eq!(o.y, (t * 0.05).sin() * 0.1);
        }
    }

    #[test]
    fn test_update_idempotent_and_zero_at_start() {
        let mut field = ParticleField::with_seed(4);
        field.update(0.0);
        assert_eq!(field.rotation(), Orientation::IDENTITY);

        field.update(12.5);
        let once = field.rotation();
        field.update(12.5);
        assert_eq!(field.rotation(), once);
    }
}
