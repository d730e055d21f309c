mod camera;
mod mesh;
mod points;
mod spheres;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use winit::window::Window;

pub use camera::{Camera, CameraRig};
pub use mesh::{MeshVertex, SphereMesh};

use crate::error::GpuError;
use crate::surface::{FrameContext, ParticleDraw, RenderSurface, SphereDraw};
use points::PointsPipeline;
use spheres::SpherePipeline;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Frame uniforms as declared in WGSL. Must match [`FrameUniforms`].
pub(crate) const FRAME_UNIFORMS_WGSL: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    view_matrix: mat4x4<f32>,
    proj_matrix: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    key_light: vec4<f32>,
    fill_light: vec4<f32>,
    time: f32,
};
"#;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    /// Direction towards the key light, intensity in `w`.
    key_light: [f32; 4],
    /// Fill light position, intensity in `w`.
    fill_light: [f32; 4],
    time: f32,
    _padding: [f32; 3],
}

impl FrameUniforms {
    fn new(frame: &FrameContext, aspect: f32) -> Self {
        let view = frame.camera.view_matrix();
        let proj = frame.camera.projection_matrix(aspect);
        let lighting = &frame.lighting;
        let key_dir = lighting.key.position.normalize_or_zero();

        Self {
            view_proj: (proj * view).to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            camera_pos: frame.camera.position().extend(1.0).to_array(),
            ambient: [lighting.ambient, lighting.ambient, lighting.ambient, 1.0],
            key_light: key_dir.extend(lighting.key.intensity).to_array(),
            fill_light: lighting.fill.position.extend(lighting.fill.intensity).to_array(),
            time: frame.time,
            _padding: [0.0; 3],
        }
    }
}

/// A window surface that draws the scene with wgpu.
///
/// Spheres go first and write depth; the translucent particle sprites are
/// drawn over them in the same pass.
pub struct GpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,
    uniform_buffer: wgpu::Buffer,
    spheres: SpherePipeline,
    points: PointsPipeline,
    clear_color: wgpu::Color,
    released: bool,
}

impl GpuSurface {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let spheres = SpherePipeline::new(&device, &uniform_buffer, surface_format);
        let points = PointsPipeline::new(&device, &uniform_buffer, surface_format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            uniform_buffer,
            spheres,
            points,
            clear_color: wgpu::Color::BLACK,
            released: false,
        })
    }

    /// Current surface size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }
}

impl RenderSurface for GpuSurface {
    type Error = wgpu::SurfaceError;

    fn begin_frame(&mut self, frame: &FrameContext) -> Result<(), Self::Error> {
        let uniforms = FrameUniforms::new(frame, self.aspect());
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        self.clear_color = wgpu::Color {
            r: frame.background.x as f64,
            g: frame.background.y as f64,
            b: frame.background.z as f64,
            a: 1.0,
        };
        self.spheres.clear();
        self.points.clear();
        Ok(())
    }

    fn submit_particles(&mut self, draw: &ParticleDraw<'_>) {
        self.points.prepare(&self.device, &self.queue, draw);
    }

    fn submit_sphere(&mut self, draw: &SphereDraw) {
        self.spheres.push(draw);
    }

    fn end_frame(&mut self) -> Result<(), Self::Error> {
        self.spheres.upload(&self.device, &self.queue);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.spheres.draw(&mut render_pass);
            self.points.draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.spheres.release();
        self.points.release();
        self.released = true;
        log::debug!("Released GPU scene resources");
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visuals::{Lighting, DEFAULT_BACKGROUND};

    fn frame() -> FrameContext {
        FrameContext {
            time: 1.5,
            camera: Camera::new(),
            lighting: Lighting::default(),
            background: DEFAULT_BACKGROUND,
        }
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 272);
    }

    #[test]
    fn test_frame_uniforms() {
        let u = FrameUniforms::new(&frame(), 16.0 / 9.0);
        assert_eq!(u.time, 1.5);
        assert_eq!(u.ambient[0], 0.4);
        assert!((u.camera_pos[2] - 8.0).abs() < 1e-5);

        let key = glam::Vec3::new(u.key_light[0], u.key_light[1], u.key_light[2]);
        assert!((key.length() - 1.0).abs() < 1e-6);
        assert_eq!(u.key_light[3], 1.0);
        assert_eq!(u.fill_light, [-10.0, -10.0, -5.0, 0.5]);
    }

    #[test]
    fn test_uniform_wgsl_parses() {
        naga::front::wgsl::parse_str(FRAME_UNIFORMS_WGSL).unwrap();
    }
}
