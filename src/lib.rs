//! # Backdrop - animated 3D page background
//!
//! A slowly drifting cloud of point particles with a few glossy, wobbling
//! spheres floating in front of it, viewed through a camera that orbits on its
//! own. Everything is a pure function of elapsed time, so the same `t` always
//! produces the same frame.
//!
//! ## Quick Start
//!
//! ```ignore
//! use backdrop::prelude::*;
//!
//! fn main() -> Result<(), BackdropError> {
//!     backdrop::run(SceneConfig::default())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The scene
//!
//! [`BackgroundScene`] owns a [`ParticleField`] of 2000 points scattered
//! through a 50-unit cube, plus any number of [`Sphere`]s. The built-in
//! [`BackgroundScene::portfolio`] layout places four spheres in the theme
//! colours:
//!
//! ```ignore
//! let scene = BackgroundScene::builder()
//!     .with_seed(42)
//!     .with_sphere(Sphere::new(Vec3::new(-4.0, 2.0, -2.0), hex_color("#00bcd4")?).with_scale(0.8))
//!     .with_intro(Transition::hero())
//!     .build();
//! ```
//!
//! ### Surfaces
//!
//! The scene does not draw. Each frame it hands its primitives to a
//! [`RenderSurface`]: [`GpuSurface`] renders them with wgpu, and anything else
//! implementing the trait (a recorder in tests, say) can take its place.
//!
//! ### Mounting
//!
//! A [`BackgroundView`] mounts one scene onto one surface. Frame ticks are
//! forwarded while mounted and ignored afterwards; unmounting releases the
//! surface exactly once.
//!
//! ```ignore
//! let mut view = BackgroundView::new();
//! view.mount(BackgroundScene::portfolio(), surface);
//! let mut time = Time::new();
//! loop {
//!     let (t, _) = time.update();
//!     view.on_frame(t)?;
//! }
//! ```
//!
//! ## Logging
//!
//! The crate logs through the `log` facade. The `backdrop` binary installs
//! `env_logger`, so `RUST_LOG=backdrop=debug` shows scene construction and
//! GPU setup.

pub mod config;
pub mod error;
mod gpu;
pub mod orientation;
pub mod particles;
pub mod scene;
pub mod shader_utils;
pub mod sphere;
pub mod surface;
pub mod time;
pub mod transition;
pub mod view;
pub mod visuals;
mod window;

pub use config::{CameraConfig, SceneConfig, SphereConfig, WindowConfig};
pub use error::{BackdropError, ConfigError, GpuError};
pub use glam::{Mat4, Quat, Vec3};
pub use gpu::{Camera, CameraRig, GpuSurface, MeshVertex, SphereMesh};
pub use orientation::Orientation;
pub use particles::ParticleField;
pub use scene::{BackgroundScene, MountedScene, SceneBuilder};
pub use sphere::{Hover, Sphere};
pub use surface::{FrameContext, ParticleDraw, RenderSurface, SphereDraw};
pub use time::Time;
pub use transition::{Easing, Keyframe, Transition};
pub use view::BackgroundView;
pub use visuals::{hex_color, Light, Lighting, PointMaterial, SphereMaterial};
pub use window::run;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use backdrop::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SceneConfig;
    pub use crate::error::BackdropError;
    pub use crate::particles::ParticleField;
    pub use crate::scene::BackgroundScene;
    pub use crate::sphere::{Hover, Sphere};
    pub use crate::surface::RenderSurface;
    pub use crate::time::Time;
    pub use crate::transition::Transition;
    pub use crate::view::BackgroundView;
    pub use crate::visuals::hex_color;
    pub use crate::Vec3;
}
