//! The rendering-surface seam.
//!
//! The scene decides *what* to draw each frame; a [`RenderSurface`] decides
//! *how*. [`crate::GpuSurface`] draws with wgpu; tests and headless hosts can
//! plug in anything that records the submissions.
//!
//! Per frame the scene calls, in order:
//!
//! 1. [`begin_frame`](RenderSurface::begin_frame) once,
//! 2. [`submit_particles`](RenderSurface::submit_particles) once,
//! 3. [`submit_sphere`](RenderSurface::submit_sphere) once per sphere,
//! 4. [`end_frame`](RenderSurface::end_frame) once.

use glam::{Mat4, Vec3};

use crate::gpu::Camera;
use crate::orientation::Orientation;
use crate::visuals::{Lighting, PointMaterial, SphereMaterial};

/// Frame-wide state shared by every primitive.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Elapsed seconds since the animation started.
    pub time: f32,
    /// Viewpoint for this frame.
    pub camera: Camera,
    /// Scene lights.
    pub lighting: Lighting,
    /// Linear RGB clear colour.
    pub background: Vec3,
}

/// One sphere, as submitted for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereDraw {
    /// Centre relative to the hover group.
    pub position: Vec3,
    /// Wobble for this frame.
    pub rotation: Orientation,
    /// Uniform scale.
    pub scale: f32,
    /// Linear RGB colour.
    pub color: Vec3,
    /// Intro fade, 0..=1.
    pub opacity: f32,
    /// Distortion amplitude, speed and shading parameters.
    pub material: SphereMaterial,
    /// Distortion phase for this frame (`time * speed`).
    pub distortion_phase: f32,
    /// Complete model matrix including hover and intro rise.
    pub model: Mat4,
}

/// The particle field, as submitted for a frame.
#[derive(Debug, Clone, Copy)]
pub struct ParticleDraw<'a> {
    /// Field-local point positions. The same slice every frame.
    pub points: &'a [Vec3],
    /// Aggregate field orientation for this frame.
    pub rotation: Orientation,
    /// Complete model matrix including intro rise.
    pub model: Mat4,
    /// Sprite appearance.
    pub material: PointMaterial,
    /// Intro fade, 0..=1, multiplied into the material opacity.
    pub opacity: f32,
}

/// Something primitives can be drawn onto.
///
/// The surface is acquired before the scene is mounted and released when it
/// is unmounted. [`release`](RenderSurface::release) is called exactly once.
pub trait RenderSurface {
    /// Error produced when a frame cannot be started or presented.
    type Error;

    /// Start a frame.
    fn begin_frame(&mut self, frame: &FrameContext) -> Result<(), Self::Error>;

    /// Queue the particle field for the current frame.
    fn submit_particles(&mut self, draw: &ParticleDraw<'_>);

    /// Queue one sphere for the current frame.
    fn submit_sphere(&mut self, draw: &SphereDraw);

    /// Finish and present the current frame.
    fn end_frame(&mut self) -> Result<(), Self::Error>;

    /// The container was resized.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Release any resources held for the scene.
    fn release(&mut self) {}
}
