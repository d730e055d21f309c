//! The parent-view boundary.
//!
//! A [`BackgroundView`] is what a host embeds: it is either empty or holds one
//! mounted scene. The host forwards every frame tick; once the scene is
//! unmounted those ticks fall on the floor, however long the clock keeps
//! running.

use crate::scene::{BackgroundScene, MountedScene};
use crate::surface::RenderSurface;

/// Container that mounts and unmounts a background scene.
pub struct BackgroundView<S: RenderSurface> {
    mounted: Option<MountedScene<S>>,
}

impl<S: RenderSurface> BackgroundView<S> {
    /// An empty view.
    pub fn new() -> Self {
        Self { mounted: None }
    }

    /// Mount `scene` on `surface`, replacing (and releasing) any current one.
    pub fn mount(&mut self, scene: BackgroundScene, surface: S) {
        self.unmount();
        self.mounted = Some(scene.mount(surface));
    }

    /// Unmount the current scene, releasing its surface. No-op when empty.
    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.unmount();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn mounted(&self) -> Option<&MountedScene<S>> {
        self.mounted.as_ref()
    }

    pub fn mounted_mut(&mut self) -> Option<&mut MountedScene<S>> {
        self.mounted.as_mut()
    }

    /// Forward a container resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(mounted) = self.mounted.as_mut() {
            mounted.resize(width, height);
        }
    }

    /// Frame tick at elapsed time `t`.
    ///
    /// Returns `Ok(true)` if a frame was submitted, `Ok(false)` if nothing is
    /// mounted.
    pub fn on_frame(&mut self, t: f32) -> Result<bool, S::Error> {
        match self.mounted.as_mut() {
            Some(mounted) => mounted.tick(t).map(|()| true),
            None => Ok(false),
        }
    }
}

impl<S: RenderSurface> Default for BackgroundView<S> {
    fn default() -> Self {
        Self::new()
    }
}
