//! Sphere mesh generation.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::PI;

/// Mesh vertex: position and normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// An indexed triangle mesh.
#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Horizontal segments of the background spheres.
    pub const WIDTH_SEGMENTS: u32 = 100;
    /// Vertical segments of the background spheres.
    pub const HEIGHT_SEGMENTS: u32 = 200;

    /// The dense unit sphere the distortion is applied to.
    pub fn background() -> Self {
        Self::uv(1.0, Self::WIDTH_SEGMENTS, Self::HEIGHT_SEGMENTS)
    }

    /// Latitude/longitude sphere.
    ///
    /// Rows run from the north pole (+Y) to the south pole. Each row has
    /// `width_segments + 1` vertices so the seam has its own column. The
    /// degenerate triangles touching the poles are skipped.
    pub fn uv(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width = width_segments.max(3);
        let height = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((width + 1) * (height + 1)) as usize);
        for iy in 0..=height {
            let v = iy as f32 / height as f32;
            let theta = v * PI;
            for ix in 0..=width {
                let u = ix as f32 / width as f32;
                let phi = u * 2.0 * PI;

                let normal = [
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                ];
                vertices.push(MeshVertex {
                    position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                    normal,
                });
            }
        }

        let row = width + 1;
        let mut indices = Vec::with_capacity((width * (height - 1) * 6) as usize);
        for iy in 0..height {
            for ix in 0..width {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;

                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}
