//! Sprite rendering of the particle field.
//!
//! Each point is one instance of a six-vertex quad, billboarded in view space
//! so the sprite keeps a world-space size and shrinks with distance.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use super::{DEPTH_FORMAT, FRAME_UNIFORMS_WGSL};
use crate::surface::ParticleDraw;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FieldUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    size: f32,
    _padding: [f32; 3],
}

impl FieldUniforms {
    pub(crate) fn from_draw(draw: &ParticleDraw<'_>) -> Self {
        Self {
            model: draw.model.to_cols_array_2d(),
            color: draw
                .material
                .color
                .extend(draw.material.opacity * draw.opacity)
                .to_array(),
            size: draw.material.size,
            _padding: [0.0; 3],
        }
    }
}

/// Generate the particle sprite shader.
pub(crate) fn points_shader() -> String {
    format!(
        r#"{FRAME_UNIFORMS_WGSL}

struct FieldUniforms {{
    model: mat4x4<f32>,
    color: vec4<f32>,
    size: f32,
}};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(0) @binding(1)
var<uniform> field_uniforms: FieldUniforms;

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) point_pos: vec3<f32>,
) -> VertexOutput {{
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let quad_pos = quad_vertices[vertex_index];

    let world_pos = field_uniforms.model * vec4<f32>(point_pos, 1.0);
    let view_pos = uniforms.view_matrix * world_pos;
    let corner = vec4<f32>(view_pos.xy + quad_pos * field_uniforms.size * 0.5, view_pos.zw);

    var out: VertexOutput;
    out.clip_position = uniforms.proj_matrix * corner;
    out.uv = quad_pos;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let dist = length(in.uv);
    if dist > 1.0 {{
        discard;
    }}
    let alpha = field_uniforms.color.a * (1.0 - smoothstep(0.5, 1.0, dist));
    return vec4<f32>(field_uniforms.color.rgb, alpha);
}}
"#
    )
}

/// GPU state for the particle field.
pub(crate) struct PointsPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    field_buffer: wgpu::Buffer,
    point_buffer: Option<wgpu::Buffer>,
    num_points: u32,
    queued: bool,
}

impl PointsPipeline {
    pub(crate) fn new(
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let field_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Field Uniform Buffer"),
            size: std::mem::size_of::<FieldUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Points Bind Group Layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Points Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: field_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Points Shader"),
            source: wgpu::ShaderSource::Wgsl(points_shader().into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Points Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Points Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vec3>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // Translucent sprites test against the spheres but never occlude each other.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group,
            field_buffer,
            point_buffer: None,
            num_points: 0,
            queued: false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.queued = false;
    }

    /// Queue the field for this frame.
    ///
    /// Point positions never change while a scene is mounted, so they are
    /// uploaded on the first submission only.
    pub(crate) fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, draw: &ParticleDraw<'_>) {
        if self.point_buffer.is_none() || self.num_points as usize != draw.points.len() {
            log::debug!("Uploading {} field points", draw.points.len());
            self.point_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Point Buffer"),
                contents: bytemuck::cast_slice(draw.points),
                usage: wgpu::BufferUsages::VERTEX,
            }));
            self.num_points = draw.points.len() as u32;
        }

        queue.write_buffer(&self.field_buffer, 0, bytemuck::bytes_of(&FieldUniforms::from_draw(draw)));
        self.queued = true;
    }

    pub(crate) fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if !self.queued || self.num_points == 0 {
            return;
        }
        let Some(point_buffer) = &self.point_buffer else {
            return;
        };

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, point_buffer.slice(..));
        render_pass.draw(0..6, 0..self.num_points);
    }

    pub(crate) fn release(&mut self) {
        self.point_buffer = None;
        self.num_points = 0;
        self.queued = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::Orientation;
    use crate::visuals::PointMaterial;
    use glam::Mat4;

    #[test]
    fn test_points_shader_is_valid() {
        let code = points_shader();
        let module = naga::front::wgsl::parse_str(&code)
            .unwrap_or_else(|e| panic!("{}", e.emit_to_string(&code)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap();
    }

    #[test]
    fn test_field_uniform_layout() {
        assert_eq!(std::mem::size_of::<FieldUniforms>(), 96);
    }

    #[test]
    fn test_intro_fade_scales_opacity() {
        let points = [Vec3::ZERO];
        let draw = ParticleDraw {
            points: &points,
            rotation: Orientation::IDENTITY,
            model: Mat4::IDENTITY,
            material: PointMaterial::default(),
            opacity: 0.5,
        };
        let uniforms = FieldUniforms::from_draw(&draw);
        assert!((uniforms.color[3] - 0.3).abs() < 1e-6);
        assert_eq!(uniforms.size, 0.05);
    }
}
