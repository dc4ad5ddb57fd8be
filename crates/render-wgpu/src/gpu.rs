use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};
use seascape_assets::{MaterialTextures, Mesh, Texture};
use seascape_common::{Color, MeshHandle, ShaderHandle};
use seascape_render::{
    FrameRenderer, FrameView, MeshDraw, ProgramLayout, ShaderProgram, SurfaceDraw,
};
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_position: [f32; 4],
}

/// World-space point light for textured meshes.
const LIGHT_POSITION: [f32; 4] = [10.0, 30.0, 20.0, 1.0];

/// Instance attributes follow the highest vertex attribute of any mesh program.
const FIRST_INSTANCE_LOCATION: u32 = 3;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
    tex_coord: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    shading: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4], shader: ShaderHandle) -> Self {
        let cols = model.to_cols_array_2d();
        let lit = if shader == ShaderHandle::COLORED { 0.0 } else { 1.0 };
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
            shading: [lit, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct SurfaceVertex {
    position: [f32; 4],
    color: [f32; 4],
    normal: [f32; 4],
    offset: [f32; 4],
}

/// A vertex struct field, keyed by the program attribute it feeds.
struct Field {
    attribute: &'static str,
    format: wgpu::VertexFormat,
    offset: u64,
}

const MESH_FIELDS: &[Field] = &[
    Field {
        attribute: "vertex",
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
    },
    Field {
        attribute: "normal",
        format: wgpu::VertexFormat::Float32x3,
        offset: 12,
    },
    Field {
        attribute: "texCoord",
        format: wgpu::VertexFormat::Float32x2,
        offset: 24,
    },
];

/// Texture uniforms of the textured program, in binding order.
const TEXTURE_UNIFORMS: [&str; 2] = ["tex", "rough"];

const SURFACE_FIELDS: &[Field] = &[
    Field {
        attribute: "vertex",
        format: wgpu::VertexFormat::Float32x4,
        offset: 0,
    },
    Field {
        attribute: "colors",
        format: wgpu::VertexFormat::Float32x4,
        offset: 16,
    },
    Field {
        attribute: "normals",
        format: wgpu::VertexFormat::Float32x4,
        offset: 32,
    },
    Field {
        attribute: "offset",
        format: wgpu::VertexFormat::Float32x4,
        offset: 48,
    },
];

/// Resolve struct fields to shader locations, skipping attributes the
/// program does not declare.
fn vertex_attributes(program: &impl ShaderProgram, fields: &[Field]) -> Vec<wgpu::VertexAttribute> {
    fields
        .iter()
        .filter_map(|field| match program.attribute_location(field.attribute) {
            Some(shader_location) => Some(wgpu::VertexAttribute {
                format: field.format,
                offset: field.offset,
                shader_location,
            }),
            None => {
                tracing::debug!(
                    program = program.name(),
                    attribute = field.attribute,
                    "attribute not bound"
                );
                None
            }
        })
        .collect()
}

/// Texture uniforms `program` declares. Each gets the next binding of the
/// material group; the shared sampler follows them.
fn texture_slots(program: &impl ShaderProgram) -> Vec<&'static str> {
    TEXTURE_UNIFORMS
        .into_iter()
        .filter(|name| {
            let bound = program.uniform_location(name).is_some();
            if !bound {
                tracing::debug!(program = program.name(), uniform = *name, "texture not bound");
            }
            bound
        })
        .collect()
}

fn instance_attributes() -> [wgpu::VertexAttribute; 6] {
    let first = FIRST_INSTANCE_LOCATION;
    std::array::from_fn(|i| wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x4,
        offset: (i * 16) as u64,
        shader_location: first + i as u32,
    })
}

/// Per-corner vertices of a mesh. Missing normals become flat face normals,
/// missing texture coordinates become zero.
fn mesh_vertices(mesh: &Mesh) -> Vec<MeshVertex> {
    let positions = mesh.draw_positions();
    let normals = if mesh.normals.is_empty() {
        mesh.flat_normals()
    } else {
        mesh.draw_normals()
    };
    let mut tex_coords = mesh.draw_tex_coords();
    tex_coords.resize(positions.len(), Vec2::ZERO);
    positions
        .iter()
        .zip(&normals)
        .zip(&tex_coords)
        .map(|((p, n), t)| MeshVertex {
            position: p.truncate().to_array(),
            normal: n.truncate().to_array(),
            tex_coord: t.to_array(),
        })
        .collect()
}

/// Expand a surface draw into world-space vertices.
fn surface_vertices<'a>(draw: &'a SurfaceDraw<'a>) -> impl Iterator<Item = SurfaceVertex> + 'a {
    let model = draw.model;
    let corners = draw
        .positions
        .iter()
        .zip(draw.colors)
        .zip(draw.normals)
        .zip(draw.offsets);
    corners.map(move |(((&p, &c), &n), &o)| SurfaceVertex {
        position: (model * p).to_array(),
        color: c.to_array(),
        normal: (model * Vec4::new(n.x, n.y, n.z, 0.0)).to_array(),
        offset: (model * Vec4::new(o.x, o.y, o.z, 0.0)).to_array(),
    })
}

/// Vertex buffer that is reallocated when a frame outgrows it.
struct GrowableBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: u64,
}

impl GrowableBuffer {
    fn new(device: &wgpu::Device, label: &'static str, capacity: u64) -> Self {
        Self {
            label,
            buffer: Self::allocate(device, label, capacity),
            capacity,
        }
    }

    fn allocate(device: &wgpu::Device, label: &'static str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write<T: Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let needed = bytes.len() as u64;
        if needed == 0 {
            return;
        }
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            tracing::debug!(buffer = self.label, capacity, "growing vertex buffer");
            self.buffer = Self::allocate(device, self.label, capacity);
            self.capacity = capacity;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
    }
}

struct GpuMesh {
    name: String,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    color: [f32; 4],
    /// Diffuse and roughness maps, when the material has them.
    material: Option<wgpu::BindGroup>,
}

/// Key of one instanced batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct BatchKey {
    mesh: MeshHandle,
    textured: bool,
}

/// wgpu-based scene renderer.
///
/// Meshes are uploaded once with [`upload_mesh`](Self::upload_mesh). Draws
/// issued through [`FrameRenderer`] are buffered until [`render`](Self::render).
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    textured_pipeline: wgpu::RenderPipeline,
    water_pipeline: wgpu::RenderPipeline,
    material_layout: wgpu::BindGroupLayout,
    texture_slots: Vec<&'static str>,
    map_sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    pending: BTreeMap<BatchKey, Vec<InstanceData>>,
    surface: Vec<SurfaceVertex>,
    instance_buffer: GrowableBuffer,
    surface_buffer: GrowableBuffer,
    view: FrameView,
    clear_color: Color,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                light_position: LIGHT_POSITION,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let textured_program = ProgramLayout::LAMBERT_TEXTURED;
        let slots = texture_slots(&textured_program);
        let mut material_entries: Vec<wgpu::BindGroupLayoutEntry> = (0..slots.len() as u32)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect();
        material_entries.push(wgpu::BindGroupLayoutEntry {
            binding: slots.len() as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &material_entries,
        });
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("textured_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let map_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("map_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let depth_stencil = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        };
        let color_targets = [Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        // Mesh pipeline
        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let mesh_attributes = vertex_attributes(&ProgramLayout::LAMBERT, MESH_FIELDS);
        let instance_attributes = instance_attributes();

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_mesh"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<MeshVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &mesh_attributes,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &instance_attributes,
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_mesh"),
                compilation_options: Default::default(),
                targets: &color_targets,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil.clone()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Textured pipeline
        let textured_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("textured_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::TEXTURED_SHADER.into()),
        });
        let textured_attributes = vertex_attributes(&textured_program, MESH_FIELDS);

        let textured_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("textured_pipeline"),
            layout: Some(&textured_layout),
            vertex: wgpu::VertexState {
                module: &textured_shader,
                entry_point: Some("vs_textured"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<MeshVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &textured_attributes,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &instance_attributes,
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &textured_shader,
                entry_point: Some("fs_textured"),
                compilation_options: Default::default(),
                targets: &color_targets,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil.clone()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Water pipeline
        let water_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("water_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::WATER_SHADER.into()),
        });
        let surface_attributes = vertex_attributes(&ProgramLayout::WATER, SURFACE_FIELDS);

        let water_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("water_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &water_shader,
                entry_point: Some("vs_water"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SurfaceVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &surface_attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &water_shader,
                entry_point: Some("fs_water"),
                compilation_options: Default::default(),
                targets: &color_targets,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let instance_buffer = GrowableBuffer::new(
            device,
            "instance_buffer",
            1024 * std::mem::size_of::<InstanceData>() as u64,
        );
        let surface_buffer = GrowableBuffer::new(
            device,
            "surface_buffer",
            64 * 1024 * std::mem::size_of::<SurfaceVertex>() as u64,
        );

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::debug!(?surface_format, "renderer ready");
        Self {
            mesh_pipeline,
            textured_pipeline,
            water_pipeline,
            material_layout,
            texture_slots: slots,
            map_sampler,
            uniform_buffer,
            uniform_bind_group,
            meshes: Vec::new(),
            pending: BTreeMap::new(),
            surface: Vec::new(),
            instance_buffer,
            surface_buffer,
            view: FrameView::default(),
            clear_color: Color::SKY,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Upload a mesh for non-indexed drawing and return its handle.
    ///
    /// `textures`, when given, are sampled by draws with the textured program;
    /// `tint` multiplies them, or colors the mesh on its own otherwise.
    pub fn upload_mesh(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mesh: &Mesh,
        tint: Color,
        textures: Option<&MaterialTextures>,
    ) -> MeshHandle {
        let vertices = mesh_vertices(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(mesh.name.as_str()),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let material = textures.map(|t| self.material_bind_group(device, queue, &mesh.name, t));

        let handle = MeshHandle(self.meshes.len() as u32);
        tracing::info!(
            mesh = %mesh.name,
            handle = handle.0,
            vertices = vertices.len(),
            textured = material.is_some(),
            "uploaded mesh"
        );
        self.meshes.push(GpuMesh {
            name: mesh.name.clone(),
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            color: tint.to_array(),
            material,
        });
        handle
    }

    fn material_bind_group(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        textures: &MaterialTextures,
    ) -> wgpu::BindGroup {
        let views: Vec<wgpu::TextureView> = self
            .texture_slots
            .iter()
            .map(|&slot| {
                let texture = match slot {
                    "rough" => &textures.roughness,
                    _ => &textures.diffuse,
                };
                upload_texture(device, queue, slot, texture)
            })
            .collect();
        let mut entries: Vec<wgpu::BindGroupEntry> = views
            .iter()
            .enumerate()
            .map(|(binding, view)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: views.len() as u32,
            resource: wgpu::BindingResource::Sampler(&self.map_sampler),
        });
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: &self.material_layout,
            entries: &entries,
        })
    }

    /// Submit the draws buffered since the last `begin_frame`.
    pub fn render(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, target: &wgpu::TextureView) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: self.view.view_projection().to_cols_array_2d(),
                light_position: LIGHT_POSITION,
            }),
        );

        let mut instances = Vec::new();
        let mut batches = Vec::with_capacity(self.pending.len());
        for (key, batch) in &self.pending {
            let start = instances.len() as u32;
            instances.extend_from_slice(batch);
            batches.push((*key, start..instances.len() as u32));
        }
        self.instance_buffer.write(device, queue, &instances);
        self.surface_buffer.write(device, queue, &self.surface);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let c = self.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: c.r as f64,
                            g: c.g as f64,
                            b: c.b as f64,
                            a: c.a as f64,
                        }),
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
                ..Default::default()
            });

            if !self.surface.is_empty() {
                pass.set_pipeline(&self.water_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.surface_buffer.buffer.slice(..));
                pass.draw(0..self.surface.len() as u32, 0..1);
            }

            if !instances.is_empty() {
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.buffer.slice(..));
                for (key, range) in batches {
                    let Some(mesh) = self.meshes.get(key.mesh.0 as usize) else {
                        continue;
                    };
                    match (&mesh.material, key.textured) {
                        (Some(material), true) => {
                            pass.set_pipeline(&self.textured_pipeline);
                            pass.set_bind_group(1, material, &[]);
                        }
                        _ => pass.set_pipeline(&self.mesh_pipeline),
                    }
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.draw(0..mesh.vertex_count, range);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn texture_extent(texture: &Texture) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: texture.width.max(1),
        height: texture.height.max(1),
        depth_or_array_layers: 1,
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    texture: &Texture,
) -> wgpu::TextureView {
    let gpu = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: texture_extent(texture),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &texture.rgba,
    );
    gpu.create_view(&Default::default())
}

impl FrameRenderer for WgpuRenderer {
    fn begin_frame(&mut self, view: FrameView) {
        self.view = view;
        self.pending.clear();
        self.surface.clear();
    }

    fn draw_mesh(&mut self, draw: MeshDraw) {
        let Some(mesh) = self.meshes.get(draw.mesh.0 as usize) else {
            tracing::trace!("draw of unknown mesh {:?}", draw.mesh);
            return;
        };
        let textured = draw.shader == ShaderHandle::LAMBERT_TEXTURED;
        if textured && mesh.material.is_none() {
            tracing::trace!(mesh = %mesh.name, "no maps bound, drawing untextured");
        }
        let instance = InstanceData::new(draw.model, mesh.color, draw.shader);
        let key = BatchKey {
            mesh: draw.mesh,
            textured: textured && mesh.material.is_some(),
        };
        self.pending.entry(key).or_default().push(instance);
    }

    fn draw_surface(&mut self, draw: SurfaceDraw<'_>) {
        if !draw.is_consistent() {
            tracing::warn!(
                "skipping surface draw with mismatched attributes: {} positions",
                draw.corner_count()
            );
            return;
        }
        self.surface.extend(surface_vertices(&draw));
    }
}

impl std::fmt::Debug for WgpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuRenderer")
            .field("meshes", &self.meshes.iter().map(|m| &m.name).collect::<Vec<_>>())
            .field("surface_format", &self.surface_format)
            .finish_non_exhaustive()
    }
}
