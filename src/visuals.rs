//! Visual configuration for the background.
//!
//! Colours, materials and lights. These control how primitives look; the
//! motion lives in [`crate::sphere`] and [`crate::particles`].
//!
//! Colours are stored as linear RGB `Vec3`s. Hex strings are treated as sRGB
//! and converted on parse, so `#00bcd4` here matches `#00bcd4` on a web page.

use glam::Vec3;

use crate::error::ConfigError;

/// Teal used by the particle field and two of the portfolio spheres.
pub const CYAN: &str = "#00bcd4";
/// Purple accent sphere.
pub const PURPLE: &str = "#9c27b0";
/// Indigo accent sphere.
pub const INDIGO: &str = "#3f51b5";

/// Parse a `#rrggbb` or `#rgb` sRGB hex colour into linear RGB.
///
/// ```ignore
/// let cyan = hex_color("#00bcd4")?;
/// ```
pub fn hex_color(hex: &str) -> Result<Vec3, ConfigError> {
    let invalid = || ConfigError::InvalidColor(hex.to_string());
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    let (r, g, b) = match digits.len() {
        6 => (channel(&digits[0..2])?, channel(&digits[2..4])?, channel(&digits[4..6])?),
        3 => {
            // #abc expands to #aabbcc
            let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
            (short(0)?, short(1)?, short(2)?)
        }
        _ => return Err(invalid()),
    };

    Ok(Vec3::new(
        srgb_to_linear(r as f32 / 255.0),
        srgb_to_linear(g as f32 / 255.0),
        srgb_to_linear(b as f32 / 255.0),
    ))
}

/// Convert one sRGB channel in [0, 1] to linear.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Parse one of the built-in palette constants.
///
/// The constants are valid by construction, so a failure here is a typo in
/// this file; fall back to white rather than propagate.
pub(crate) fn palette(hex: &'static str) -> Vec3 {
    hex_color(hex).unwrap_or(Vec3::ONE)
}

/// Surface parameters for the distorting spheres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereMaterial {
    /// Displacement amplitude fed to the noise distortion.
    pub distort: f32,
    /// Rate at which the distortion pattern evolves.
    pub speed: f32,
    /// 0 = rough, 1 = mirror-like.
    pub roughness: f32,
    /// 0 = dielectric, 1 = metal.
    pub metalness: f32,
}

impl SphereMaterial {
    /// Fixed distortion amplitude.
    pub const DISTORT: f32 = 0.3;
    /// Fixed distortion speed.
    pub const SPEED: f32 = 2.0;
}

impl Default for SphereMaterial {
    fn default() -> Self {
        Self {
            distort: Self::DISTORT,
            speed: Self::SPEED,
            roughness: 0.2,
            metalness: 0.8,
        }
    }
}

/// Appearance of the particle field's point sprites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// Sprite diameter in world units (shrinks with distance).
    pub size: f32,
    /// Linear RGB colour.
    pub color: Vec3,
    /// Base opacity.
    pub opacity: f32,
}

impl Default for PointMaterial {
    fn default() -> Self {
        Self {
            size: 0.05,
            color: palette(CYAN),
            opacity: 0.6,
        }
    }
}

/// A positional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// World-space position. Directional lights shine from here toward the origin.
    pub position: Vec3,
    /// Light intensity multiplier.
    pub intensity: f32,
}

/// The three lights the scene is lit with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Uniform ambient term.
    pub ambient: f32,
    /// Key light, treated as directional.
    pub key: Light,
    /// Fill light, treated as a point light.
    pub fill: Light,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.4,
            key: Light {
                position: Vec3::new(10.0, 10.0, 5.0),
                intensity: 1.0,
            },
            fill: Light {
                position: Vec3::new(-10.0, -10.0, -5.0),
                intensity: 0.5,
            },
        }
    }
}

/// Default clear colour behind the scene (dark blue-black).
pub const DEFAULT_BACKGROUND: Vec3 = Vec3::new(0.02, 0.02, 0.05);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_long_form() {
        let white = hex_color("#ffffff").unwrap();
        assert!(white.abs_diff_eq(Vec3::ONE, 1e-6));

        let black = hex_color("#000000").unwrap();
        assert_eq!(black, Vec3::ZERO);
    }

    #[test]
    fn test_hex_color_short_form_matches_long() {
        assert_eq!(hex_color("#f0a").unwrap(), hex_color("#ff00aa").unwrap());
    }

    #[test]
    fn test_hex_color_is_linearised() {
        // sRGB 0x80 is roughly 0.216 in linear space.
        let grey = hex_color("#808080").unwrap();
        assert!((grey.x - 0.2158).abs() < 1e-3);
    }

    #[test]
    fn test_hex_color_rejects_garbage() {
        assert!(hex_color("00bcd4").is_err());
        assert!(hex_color("#00bcd").is_err());
        assert!(hex_color("#zzzzzz").is_err());
        assert!(hex_color("#").is_err());
    }

    #[test]
    fn test_palette_constants_parse() {
        for hex in [CYAN, PURPLE, INDIGO] {
            assert!(hex_color(hex).is_ok(), "{hex} should parse");
        }
    }

    #[test]
    fn test_sphere_material_defaults() {
        let m = SphereMaterial::default();
        assert_eq!(m.distort, 0.3);
        assert_eq!(m.speed, 2.0);
    }
}
