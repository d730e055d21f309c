//! Instanced rendering of the distorting spheres.
//!
//! One dense sphere mesh is shared by every sphere. Per-instance data carries
//! the model matrix, colour and distortion parameters; the vertex shader
//! pushes each vertex out along its direction by simplex noise.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::mesh::{MeshVertex, SphereMesh};
use super::{DEPTH_FORMAT, FRAME_UNIFORMS_WGSL};
use crate::shader_utils::NOISE_WGSL;
use crate::surface::SphereDraw;

/// Per-sphere GPU data.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct SphereInstance {
    model: [[f32; 4]; 4],
    /// Linear RGB plus opacity.
    color: [f32; 4],
    /// (distort, distortion phase, metalness, roughness).
    params: [f32; 4],
}

impl SphereInstance {
    pub(crate) fn from_draw(draw: &SphereDraw) -> Self {
        Self {
            model: draw.model.to_cols_array_2d(),
            color: draw.color.extend(draw.opacity).to_array(),
            params: [
                draw.material.distort,
                draw.distortion_phase,
                draw.material.metalness,
                draw.material.roughness,
            ],
        }
    }
}

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4,
    7 => Float32x4
];

/// Generate the sphere render shader.
pub(crate) fn sphere_shader() -> String {
    format!(
        r#"{NOISE_WGSL}
{FRAME_UNIFORMS_WGSL}

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct MeshInput {{
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}};

struct InstanceInput {{
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
}};

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) surface: vec2<f32>,
}};

@vertex
fn vs_main(mesh: MeshInput, inst: InstanceInput) -> VertexOutput {{
    let model = mat4x4<f32>(inst.model_0, inst.model_1, inst.model_2, inst.model_3);
    let distort = inst.params.x;
    let phase = inst.params.y;

    let wobble = noise3(mesh.position / 2.0 + vec3<f32>(phase * 0.3));
    let displaced = mesh.position * (wobble * distort * distort + 1.0);
    let world = model * vec4<f32>(displaced, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world;
    out.world_pos = world.xyz;
    out.world_normal = (model * vec4<f32>(mesh.normal, 0.0)).xyz;
    out.color = inst.color;
    out.surface = inst.params.zw;
    return out;
}}

fn shade(n: vec3<f32>, v: vec3<f32>, l: vec3<f32>, intensity: f32, diffuse: vec3<f32>, specular: vec3<f32>, shininess: f32) -> vec3<f32> {{
    let n_dot_l = max(dot(n, l), 0.0);
    let h = normalize(l + v);
    let highlight = pow(max(dot(n, h), 0.0), shininess) * (shininess + 8.0) / 25.132741;
    return (diffuse + specular * highlight) * n_dot_l * intensity;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let n = normalize(in.world_normal);
    let v = normalize(uniforms.camera_pos.xyz - in.world_pos);
    let albedo = in.color.rgb;
    let metalness = in.surface.x;
    let roughness = max(in.surface.y, 0.05);

    let diffuse = albedo * (1.0 - metalness);
    let specular = mix(vec3<f32>(0.04), albedo, metalness);
    let r2 = roughness * roughness;
    let shininess = 2.0 / (r2 * r2) - 2.0;

    var lit = albedo * uniforms.ambient.rgb;
    lit += shade(n, v, uniforms.key_light.xyz, uniforms.key_light.w, diffuse, specular, shininess);
    let to_fill = normalize(uniforms.fill_light.xyz - in.world_pos);
    lit += shade(n, v, to_fill, uniforms.fill_light.w, diffuse, specular, shininess);

    return vec4<f32>(lit, in.color.a);
}}
"#
    )
}

/// GPU state for sphere rendering.
pub(crate) struct SpherePipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: Option<wgpu::Buffer>,
    instance_capacity: usize,
    instances: Vec<SphereInstance>,
}

impl SpherePipeline {
    pub(crate) fn new(
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let mesh = SphereMesh::background();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sphere Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sphere Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sphere Shader"),
            source: wgpu::ShaderSource::Wgsl(sphere_shader().into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sphere Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &MESH_ATTRIBUTES,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<SphereInstance>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &INSTANCE_ATTRIBUTES,
                    },
                ],
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
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
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            instance_buffer: None,
            instance_capacity: 0,
            instances: Vec::new(),
        }
    }

    /// Forget last frame's spheres.
    pub(crate) fn clear(&mut self) {
        self.instances.clear();
    }

    pub(crate) fn push(&mut self, draw: &SphereDraw) {
        self.instances.push(SphereInstance::from_draw(draw));
    }

    /// Copy queued instances to the GPU, growing the buffer if needed.
    pub(crate) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.instances.is_empty() {
            return;
        }

        if self.instance_buffer.is_none() || self.instances.len() > self.instance_capacity {
            let capacity = self.instances.len().next_power_of_two().max(4);
            self.instance_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Sphere Instance Buffer"),
                size: (capacity * std::mem::size_of::<SphereInstance>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.instance_capacity = capacity;
        }

        if let Some(buffer) = &self.instance_buffer {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.instances));
        }
    }

    pub(crate) fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let Some(instance_buffer) = &self.instance_buffer else {
            return;
        };
        if self.instances.is_empty() {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, instance_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..self.instances.len() as u32);
    }

    /// Drop per-scene instance data.
    pub(crate) fn release(&mut self) {
        self.instances.clear();
        self.instance_buffer = None;
        self.instance_capacity = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::Orientation;
    use crate::visuals::SphereMaterial;
    use glam::{Mat4, Vec3};

    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {}", e.emit_to_string(code)))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_sphere_shader_is_valid() {
        validate_wgsl(&sphere_shader()).unwrap();
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<SphereInstance>(), 96);
        assert_eq!(INSTANCE_ATTRIBUTES[4].offset, 64);
        assert_eq!(INSTANCE_ATTRIBUTES[5].offset, 80);
    }

    #[test]
    fn test_instance_from_draw() {
        let draw = SphereDraw {
            position: Vec3::ZERO,
            rotation: Orientation::IDENTITY,
            scale: 0.5,
            color: Vec3::new(0.1, 0.2, 0.3),
            opacity: 0.75,
            material: SphereMaterial::default(),
            distortion_phase: 4.0,
            model: Mat4::from_scale(Vec3::splat(0.5)),
        };
        let instance = SphereInstance::from_draw(&draw);
        assert_eq!(instance.color, [0.1, 0.2, 0.3, 0.75]);
        assert_eq!(instance.params, [0.3, 4.0, 0.8, 0.2]);
        assert_eq!(instance.model[0][0], 0.5);
    }
}
