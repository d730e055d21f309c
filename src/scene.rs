//! Background scene builder and lifecycle.
//!
//! A [`BackgroundScene`] owns one [`ParticleField`] and any number of
//! [`Sphere`]s. It holds no clock: the host passes elapsed seconds on every
//! frame tick, and every orientation is re-derived from that value alone.
//!
//! ```ignore
//! let scene = BackgroundScene::builder()
//!     .with_seed(42)
//!     .with_sphere(Sphere::new(Vec3::new(-4.0, 2.0, -2.0), hex_color("#00bcd4")?).with_scale(0.8))
//!     .build();
//!
//! let mut mounted = scene.mount(surface);
//! mounted.tick(time.elapsed())?;
//! mounted.unmount();
//! ```

use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::gpu::CameraRig;
use crate::particles::ParticleField;
use crate::sphere::{Hover, Sphere};
use crate::surface::{FrameContext, ParticleDraw, RenderSurface, SphereDraw};
use crate::transition::{Keyframe, Transition};
use crate::visuals::{self, Lighting, DEFAULT_BACKGROUND};

/// Builder for [`BackgroundScene`].
///
/// Use method chaining to configure, then call `.build()`.
pub struct SceneBuilder {
    seed: Option<u64>,
    spheres: Vec<Sphere>,
    lighting: Lighting,
    camera: CameraRig,
    intro: Option<Transition>,
    background: Vec3,
}

impl SceneBuilder {
    fn new() -> Self {
        Self {
            seed: None,
            spheres: Vec::new(),
            lighting: Lighting::default(),
            camera: CameraRig::default(),
            intro: None,
            background: DEFAULT_BACKGROUND,
        }
    }

    /// Seed the particle layout and hover phases for a reproducible scene.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Add a sphere.
    ///
    /// Spheres keep the hover they were built with unless it is still the
    /// zero-phase default, in which case [`build`](Self::build) gives them a
    /// random phase.
    pub fn with_sphere(mut self, sphere: Sphere) -> Self {
        self.spheres.push(sphere);
        self
    }

    /// Replace the lights.
    pub fn with_lighting(mut self, lighting: Lighting) -> Self {
        self.lighting = lighting;
        self
    }

    /// Replace the camera rig.
    pub fn with_camera(mut self, camera: CameraRig) -> Self {
        self.camera = camera;
        self
    }

    /// Fade primitives in on mount.
    ///
    /// The particle field is item 0 of the stagger, spheres follow in order.
    pub fn with_intro(mut self, intro: Transition) -> Self {
        self.intro = Some(intro);
        self
    }

    /// Set the linear RGB clear colour.
    pub fn with_background(mut self, color: Vec3) -> Self {
        self.background = color;
        self
    }

    /// Sample the particle field and finish the scene.
    pub fn build(self) -> BackgroundScene {
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let field = ParticleField::from_rng(&mut rng);
        let spheres: Vec<Sphere> = self
            .spheres
            .into_iter()
            .map(|sphere| {
                if sphere.hover() == Hover::still() {
                    sphere.with_hover(Hover::random(&mut rng))
                } else {
                    sphere
                }
            })
            .collect();

        log::debug!(
            "Built background scene: {} particles, {} spheres (seed {:?})",
            field.points().len(),
            spheres.len(),
            self.seed
        );

        BackgroundScene {
            field,
            spheres,
            lighting: self.lighting,
            camera: self.camera,
            intro: self.intro,
            background: self.background,
        }
    }
}

/// The decorative background: one particle field plus spheres.
#[derive(Debug, Clone)]
pub struct BackgroundScene {
    field: ParticleField,
    spheres: Vec<Sphere>,
    lighting: Lighting,
    camera: CameraRig,
    intro: Option<Transition>,
    background: Vec3,
}

impl BackgroundScene {
    /// Start building a scene.
    pub fn builder() -> SceneBuilder {
        SceneBuilder::new()
    }

    /// The portfolio hero backdrop: four spheres in cyan, purple and indigo
    /// over a cyan particle field, with a staggered fade-in.
    pub fn portfolio() -> Self {
        Self::portfolio_builder().build()
    }

    /// Builder preloaded with the portfolio arrangement, for further tweaks.
    pub fn portfolio_builder() -> SceneBuilder {
        let cyan = visuals::palette(visuals::CYAN);
        let purple = visuals::palette(visuals::PURPLE);
        let indigo = visuals::palette(visuals::INDIGO);

        Self::builder()
            .with_sphere(Sphere::new(Vec3::new(-4.0, 2.0, -2.0), cyan).with_scale(0.8))
            .with_sphere(Sphere::new(Vec3::new(4.0, -1.0, -1.0), purple).with_scale(0.6))
            .with_sphere(Sphere::new(Vec3::new(0.0, 3.0, -3.0), indigo).with_scale(0.4))
            .with_sphere(Sphere::new(Vec3::new(-2.0, -2.0, 1.0), cyan).with_scale(0.5))
            .with_intro(Transition::hero())
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn particle_field(&self) -> &ParticleField {
        &self.field
    }

    pub fn lighting(&self) -> Lighting {
        self.lighting
    }

    pub fn camera(&self) -> CameraRig {
        self.camera
    }

    pub fn intro(&self) -> Option<Transition> {
        self.intro
    }

    /// Linear RGB clear colour.
    pub fn background(&self) -> Vec3 {
        self.background
    }

    /// Re-derive every primitive's orientation for time `t`.
    ///
    /// Idempotent: the result depends only on `t`.
    pub fn update(&mut self, t: f32) {
        self.field.update(t);
        for sphere in &mut self.spheres {
            sphere.update(t);
        }
    }

    fn intro_at(&self, t: f32, index: usize) -> Keyframe {
        self.intro
            .map_or(Keyframe::VISIBLE, |intro| intro.sample(t, index))
    }

    /// Update for time `t` and submit one frame to `surface`.
    pub fn submit<S: RenderSurface>(&mut self, t: f32, surface: &mut S) -> Result<(), S::Error> {
        self.update(t);

        let frame = FrameContext {
            time: t,
            camera: self.camera.camera_at(t),
            lighting: self.lighting,
            background: self.background,
        };
        surface.begin_frame(&frame)?;

        let intro = self.intro_at(t, 0);
        surface.submit_particles(&ParticleDraw {
            points: self.field.points(),
            rotation: self.field.rotation(),
            model: rise(intro) * self.field.model_matrix(),
            material: self.field.material(),
            opacity: intro.opacity,
        });

        for (i, sphere) in self.spheres.iter().enumerate() {
            let intro = self.intro_at(t, i + 1);
            surface.submit_sphere(&SphereDraw {
                position: sphere.position(),
                rotation: sphere.rotation(),
                scale: sphere.scale(),
                color: sphere.color(),
                opacity: intro.opacity,
                material: sphere.material(),
                distortion_phase: sphere.distortion_phase_at(t),
                model: rise(intro) * sphere.model_matrix(),
            });
        }

        surface.end_frame()
    }

    /// Attach the scene to an acquired rendering surface.
    pub fn mount<S: RenderSurface>(self, surface: S) -> MountedScene<S> {
        log::info!(
            "Mounting background: {} spheres, {} particles",
            self.spheres.len(),
            self.field.points().len()
        );
        MountedScene {
            scene: self,
            surface: Some(surface),
        }
    }
}

fn rise(frame: Keyframe) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, -frame.rise, 0.0))
}

/// A scene bound to its rendering surface.
///
/// Unmounting, or dropping, releases the surface exactly once.
pub struct MountedScene<S: RenderSurface> {
    scene: BackgroundScene,
    surface: Option<S>,
}

impl<S: RenderSurface> MountedScene<S> {
    /// Render one frame at elapsed time `t`.
    pub fn tick(&mut self, t: f32) -> Result<(), S::Error> {
        match self.surface.as_mut() {
            Some(surface) => self.scene.submit(t, surface),
            None => Ok(()),
        }
    }

    /// Forward a container resize to the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
        }
    }

    /// Apply a user drag to the camera, in radians.
    pub fn orbit_by(&mut self, dx: f32, dy: f32) {
        self.scene.camera.orbit_by(dx, dy);
    }

    pub fn scene(&self) -> &BackgroundScene {
        &self.scene
    }

    /// The surface, until unmount.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Stop rendering and release the surface.
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            log::info!("Background unmounted, surface released");
        }
    }
}

impl<S: RenderSurface> Drop for MountedScene<S> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::Orientation;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        frames: usize,
        spheres: Vec<SphereDraw>,
        particle_rotations: Vec<Orientation>,
        released: usize,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Log>>);

    impl RenderSurface for Recorder {
        type Error = ();

        fn begin_frame(&mut self, _frame: &FrameContext) -> Result<(), ()> {
            self.0.borrow_mut().frames += 1;
            Ok(())
        }

        fn submit_particles(&mut self, draw: &ParticleDraw<'_>) {
            self.0.borrow_mut().particle_rotations.push(draw.rotation);
        }

        fn submit_sphere(&mut self, draw: &SphereDraw) {
            self.0.borrow_mut().spheres.push(*draw);
        }

        fn end_frame(&mut self) -> Result<(), ()> {
            Ok(())
        }

        fn release(&mut self) {
            self.0.borrow_mut().released += 1;
        }
    }

    #[test]
    fn test_portfolio_layout() {
        let scene = BackgroundScene::portfolio();
        assert_eq!(scene.spheres().len(), 4);
        assert_eq!(scene.particle_field().points().len(), 2000);
        let scales: Vec<f32> = scene.spheres().iter().map(|s| s.scale()).collect();
        assert_eq!(scales, vec![0.8, 0.6, 0.4, 0.5]);
        assert_eq!(scene.spheres()[1].position(), Vec3::new(4.0, -1.0, -1.0));
    }

    #[test]
    fn test_build_assigns_distinct_hover_phases() {
        let scene = BackgroundScene::portfolio_builder().with_seed(5).build();
        let offsets: Vec<f32> = scene.spheres().iter().map(|s| s.hover().offset).collect();
        assert!(offsets.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn test_explicit_hover_is_kept() {
        let hover = Hover { offset: 12.0, ..Hover::still() };
        let scene = BackgroundScene::builder()
            .with_sphere(Sphere::new(Vec3::ZERO, Vec3::ONE).with_hover(hover))
            .build();
        assert_eq!(scene.spheres()[0].hover(), hover);
    }

    #[test]
    fn test_seeded_scenes_match() {
        let a = BackgroundScene::portfolio_builder().with_seed(11).build();
        let b = BackgroundScene::portfolio_builder().with_seed(11).build();
        assert_eq!(a.particle_field().points(), b.particle_field().points());
    }

    #[test]
    fn test_submit_order_and_counts() {
        let log = Recorder::default();
        let mut surface = log.clone();
        let mut scene = BackgroundScene::portfolio();

        scene.submit(1.0, &mut surface).unwrap();
        scene.submit(2.0, &mut surface).unwrap();

        let log = log.0.borrow();
        assert_eq!(log.frames, 2);
        assert_eq!(log.particle_rotations.len(), 2);
        assert_eq!(log.spheres.len(), 8);
        assert_eq!(log.particle_rotations[1], ParticleField::orientation_at(2.0));
    }

    #[test]
    fn test_submitted_spheres_carry_fixed_distortion() {
        let log = Recorder::default();
        let mut scene = BackgroundScene::portfolio();
        scene.submit(0.5, &mut log.clone()).unwrap();

        for draw in &log.0.borrow().spheres {
            assert_eq!(draw.material.distort, 0.3);
            assert_eq!(draw.material.speed, 2.0);
            assert_eq!(draw.distortion_phase, 1.0);
            assert_eq!(draw.rotation, Sphere::orientation_at(0.5));
        }
    }

    #[test]
    fn test_intro_fades_in() {
        let log = Recorder::default();
        let mut scene = BackgroundScene::portfolio();
        scene.submit(0.0, &mut log.clone()).unwrap();
        scene.submit(10.0, &mut log.clone()).unwrap();

        let spheres = &log.0.borrow().spheres;
        assert!(spheres[..4].iter().all(|d| d.opacity == 0.0));
        assert!(spheres[4..].iter().all(|d| d.opacity == 1.0));
    }

    #[test]
    fn test_no_intro_is_fully_visible() {
        let log = Recorder::default();
        let mut scene = BackgroundScene::builder()
            .with_sphere(Sphere::new(Vec3::ZERO, Vec3::ONE))
            .build();
        scene.submit(0.0, &mut log.clone()).unwrap();
        assert_eq!(log.0.borrow().spheres[0].opacity, 1.0);
    }

    #[test]
    fn test_update_twice_same_time() {
        let mut scene = BackgroundScene::portfolio();
        scene.update(3.0);
        let first: Vec<Orientation> = scene.spheres().iter().map(|s| s.rotation()).collect();
        let field = scene.particle_field().rotation();
        scene.update(3.0);
        let second: Vec<Orientation> = scene.spheres().iter().map(|s| s.rotation()).collect();
        assert_eq!(first, second);
        assert_eq!(field, scene.particle_field().rotation());
    }

    #[test]
    fn test_unmount_releases_once() {
        let log = Recorder::default();
        let mut mounted = BackgroundScene::portfolio().mount(log.clone());
        mounted.tick(0.1).unwrap();
        mounted.unmount();
        assert_eq!(log.0.borrow().released, 1);
        assert_eq!(log.0.borrow().frames, 1);
    }

    #[test]
    fn test_drop_releases_surface() {
        let log = Recorder::default();
        {
            let _mounted = BackgroundScene::portfolio().mount(log.clone());
        }
        assert_eq!(log.0.borrow().released, 1);
    }

    #[test]
    fn test_orbit_by_moves_camera() {
        let log = Recorder::default();
        let mut mounted = BackgroundScene::portfolio().mount(log);
        mounted.orbit_by(0.5, 0.0);
        assert_eq!(mounted.scene().camera().user_yaw, 0.5);
    }
}
