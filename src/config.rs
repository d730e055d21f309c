//! JSON scene descriptions.
//!
//! Lets the binary run a scene other than the built-in portfolio layout.
//! Every field is optional; omitted fields take the portfolio defaults.
//!
//! ```json
//! {
//!   "seed": 7,
//!   "spheres": [
//!     { "position": [-4, 2, -2], "color": "#00bcd4", "scale": 0.8 },
//!     { "position": [4, -1, -1], "color": "#9c27b0" }
//!   ],
//!   "background": "#05050d",
//!   "camera": { "eye": [0, 0, 8], "fov_degrees": 50, "auto_rotate_speed": 0.5 },
//!   "intro": true,
//!   "window": { "title": "Backdrop", "width": 1280, "height": 720 }
//! }
//! ```
//!
//! The particle field is always 2000 points in a 50-unit cube and cannot be
//! changed here.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gpu::CameraRig;
use crate::scene::{BackgroundScene, SceneBuilder};
use crate::sphere::Sphere;
use crate::transition::Transition;
use crate::visuals::{hex_color, CYAN, INDIGO, PURPLE};

/// One sphere entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereConfig {
    pub position: [f32; 3],
    /// `#rrggbb` or `#rgb`.
    pub color: String,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

/// Camera entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub fov_degrees: f32,
    pub auto_rotate_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let rig = CameraRig::default();
        Self {
            eye: rig.eye.to_array(),
            fov_degrees: rig.fov_degrees,
            auto_rotate_speed: rig.auto_rotate_speed,
        }
    }
}

/// Native window entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Backdrop".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// A complete scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for particle layout and hover phases; random when absent.
    pub seed: Option<u64>,
    pub spheres: Vec<SphereConfig>,
    /// Clear colour; the dark default when absent.
    pub background: Option<String>,
    pub camera: CameraConfig,
    /// Staggered fade-in on mount.
    pub intro: bool,
    pub window: WindowConfig,
}

impl Default for SceneConfig {
    /// The portfolio layout.
    fn default() -> Self {
        let sphere = |position: [f32; 3], color: &str, scale: f32| SphereConfig {
            position,
            color: color.to_string(),
            scale,
        };
        Self {
            seed: None,
            spheres: vec![
                sphere([-4.0, 2.0, -2.0], CYAN, 0.8),
                sphere([4.0, -1.0, -1.0], PURPLE, 0.6),
                sphere([0.0, 3.0, -3.0], INDIGO, 0.4),
                sphere([-2.0, -2.0, 1.0], CYAN, 0.5),
            ],
            background: None,
            camera: CameraConfig::default(),
            intro: true,
            window: WindowConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse a description from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a description file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded scene config from {}", path.as_ref().display());
        Self::from_json(&text)
    }

    /// Validate and turn the description into a scene builder.
    pub fn to_builder(&self) -> Result<SceneBuilder, ConfigError> {
        let mut builder = BackgroundScene::builder().with_camera(CameraRig {
            eye: Vec3::from_array(self.camera.eye),
            fov_degrees: self.camera.fov_degrees,
            auto_rotate_speed: self.camera.auto_rotate_speed,
            ..CameraRig::default()
        });

        for entry in &self.spheres {
            if !(entry.scale.is_finite() && entry.scale > 0.0) {
                return Err(ConfigError::InvalidScale(entry.scale));
            }
            let sphere = Sphere::new(Vec3::from_array(entry.position), hex_color(&entry.color)?)
                .with_scale(entry.scale);
            builder = builder.with_sphere(sphere);
        }

        if let Some(background) = &self.background {
            builder = builder.with_background(hex_color(background)?);
        }
        if let Some(seed) = self.seed {
            builder = builder.with_seed(seed);
        }
        if self.intro {
            builder = builder.with_intro(Transition::hero());
        }
        Ok(builder)
    }

    /// Validate and build the scene.
    pub fn build(&self) -> Result<BackgroundScene, ConfigError> {
        Ok(self.to_builder()?.build())
    }
}
