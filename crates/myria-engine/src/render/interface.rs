use anyhow::Result;
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::pipeline::{InterfaceVertex, SamplerState, TexelImage};

use super::bindings::{
    texture_layout, transform_layout, CAMERA_BINDING, FRAGMENT_ENTRY, LOCAL_BINDING,
    TEXTURE_GROUP, TRANSFORM_GROUP, VERTEX_ENTRY,
};
use super::texture::InterfaceTexture;
use super::uniforms::{local_slot_stride, pack_local_slots, GlobalUniform, LocalUniform};
use super::{RenderCtx, RenderTarget, INTERFACE_SHADER};

/// Fixed-function state of the interface pipeline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InterfacePipelineConfig {
    pub front_face: wgpu::FrontFace,
    /// `None` draws both windings.
    pub cull_mode: Option<wgpu::Face>,
}

impl Default for InterfacePipelineConfig {
    fn default() -> Self {
        Self {
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
        }
    }
}

/// One draw: geometry, its local transform and the texture pair it samples.
#[derive(Copy, Clone)]
pub struct InterfaceDraw<'a> {
    pub vertices: &'a [InterfaceVertex],
    /// Triangle list. Trailing indices that do not form a triangle are dropped.
    pub indices: &'a [u32],
    pub local: Mat4,
    pub texture: &'a InterfaceTexture,
}

/// Per-draw bookkeeping after the geometry has been packed into shared buffers.
struct PackedDraw {
    first_index: u32,
    index_count: u32,
    base_vertex: i32,
    local_offset: u32,
    draw: usize,
}

/// GPU executor of the interface pipeline.
///
/// Owns the set-A/set-B layouts, the render pipeline (rebuilt when the surface
/// format changes), the camera uniform, a dynamic-offset buffer of local
/// transforms and growable vertex/index buffers. Texture pairs are owned by the
/// caller as `InterfaceTexture`s created against `texture_layout()`.
pub struct InterfaceRenderer {
    config: InterfacePipelineConfig,

    transform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    camera: Mat4,
    camera_ubo: wgpu::Buffer,

    local_stride: u64,
    local_ubo: Option<wgpu::Buffer>,
    local_capacity: usize,
    transform_bind_group: Option<wgpu::BindGroup>,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,
    ibo: Option<wgpu::Buffer>,
    ibo_capacity: usize,
}

impl InterfaceRenderer {
    pub fn new(device: &wgpu::Device, config: InterfacePipelineConfig) -> Self {
        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("myria interface camera ubo"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let local_stride = local_slot_stride(device.limits().min_uniform_buffer_offset_alignment);

        Self {
            config,
            transform_layout: transform_layout(device),
            texture_layout: texture_layout(device),
            pipeline_format: None,
            pipeline: None,
            camera: Mat4::IDENTITY,
            camera_ubo,
            local_stride,
            local_ubo: None,
            local_capacity: 0,
            transform_bind_group: None,
            vbo: None,
            vbo_capacity: 0,
            ibo: None,
            ibo_capacity: 0,
        }
    }

    /// Set-B layout that `InterfaceTexture`s must be created against.
    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    /// Creates a texture pair usable with this renderer.
    pub fn create_texture(
        &self,
        ctx: &RenderCtx<'_>,
        image: &TexelImage,
        sampler: &SamplerState,
    ) -> Result<InterfaceTexture> {
        InterfaceTexture::from_image(ctx, &self.texture_layout, image, sampler)
    }

    /// Camera (view/projection) used by subsequent `render` calls.
    ///
    /// Calls recorded on the same encoder may each use a different camera.
    pub fn set_camera(&mut self, camera: Mat4) {
        self.camera = camera;
    }

    /// Changes fixed-function state; the pipeline is rebuilt on the next render.
    pub fn set_config(&mut self, config: InterfacePipelineConfig) {
        if self.config != config {
            self.config = config;
            self.pipeline = None;
        }
    }

    /// Records one render pass drawing `draws` in order into `target`.
    ///
    /// Existing target contents are loaded; fragments replace them (no blending).
    /// Draws without a full triangle are skipped. Uniform and geometry uploads
    /// are recorded on `target.encoder` ahead of the pass, so several calls per
    /// frame each draw with their own camera and geometry.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draws: &[InterfaceDraw<'_>],
    ) {
        self.ensure_pipeline(ctx);

        let (vertices, indices, locals, packed) = pack_draws(
            draws.iter().map(|d| (d.vertices, d.indices, d.local)),
            self.local_stride,
        );
        if packed.is_empty() {
            return;
        }

        // Mutating methods must happen before borrowing pipeline/buffers immutably.
        self.ensure_vertex_capacity(ctx, vertices.len());
        self.ensure_index_capacity(ctx, indices.len());
        self.ensure_local_capacity(ctx, locals.len());

        let Some(vbo) = self.vbo.as_ref() else {
            return;
        };
        let Some(ibo) = self.ibo.as_ref() else {
            return;
        };
        let Some(local_ubo) = self.local_ubo.as_ref() else {
            return;
        };

        let camera = GlobalUniform::new(self.camera);
        let local_bytes = pack_local_slots(&locals, self.local_stride);
        let uploads: [(&wgpu::Buffer, &[u8]); 4] = [
            (&self.camera_ubo, bytemuck::bytes_of(&camera)),
            (vbo, bytemuck::cast_slice(&vertices)),
            (ibo, bytemuck::cast_slice(&indices)),
            (local_ubo, local_bytes.as_slice()),
        ];
        for (dst, bytes) in uploads {
            record_upload(ctx.device, &mut *target.encoder, dst, bytes);
        }

        let Some(pipeline) = self.pipeline.as_ref() else {
            return;
        };
        let Some(transform_bind_group) = self.transform_bind_group.as_ref() else {
            return;
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("myria interface pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);

        for p in &packed {
            rpass.set_bind_group(TRANSFORM_GROUP, transform_bind_group, &[p.local_offset]);
            rpass.set_bind_group(TEXTURE_GROUP, draws[p.draw].texture.bind_group(), &[]);
            rpass.draw_indexed(
                p.first_index..p.first_index + p.index_count,
                p.base_vertex,
                0..1,
            );
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        log::debug!(
            "building interface pipeline (format {:?}, cull {:?})",
            ctx.surface_format,
            self.config.cull_mode
        );

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("myria interface shader"),
            source: wgpu::ShaderSource::Wgsl(INTERFACE_SHADER.into()),
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("myria interface pipeline layout"),
            // Index order is the group number: set A = 0, set B = 1.
            bind_group_layouts: &[&self.transform_layout, &self.texture_layout],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("myria interface pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[InterfaceVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: self.config.front_face,
                cull_mode: self.config.cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
    }

    fn ensure_vertex_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.vbo_capacity && self.vbo.is_some() {
            return;
        }
        let cap = required.next_power_of_two().max(64);
        self.vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("myria interface vbo"),
            size: (cap * std::mem::size_of::<InterfaceVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vbo_capacity = cap;
    }

    fn ensure_index_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.ibo_capacity && self.ibo.is_some() {
            return;
        }
        let cap = required.next_power_of_two().max(64);
        self.ibo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("myria interface ibo"),
            size: (cap * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.ibo_capacity = cap;
    }

    /// Grows the local-transform buffer; the set-A bind group references it, so
    /// it is rebuilt together with the buffer.
    fn ensure_local_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.local_capacity && self.transform_bind_group.is_some() {
            return;
        }
        let cap = required.next_power_of_two().max(16);

        let local_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("myria interface local ubo"),
            size: cap as u64 * self.local_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("myria interface transforms bind group"),
            layout: &self.transform_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: CAMERA_BINDING,
                    resource: self.camera_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: LOCAL_BINDING,
                    // Window of one slot; the dynamic offset selects which.
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &local_ubo,
                        offset: 0,
                        size: wgpu::BufferSize::new(std::mem::size_of::<LocalUniform>() as u64),
                    }),
                },
            ],
        });

        self.local_ubo = Some(local_ubo);
        self.local_capacity = cap;
        self.transform_bind_group = Some(bind_group);
    }
}

/// Stages `bytes` in a fresh buffer and records a copy into the start of `dst`.
///
/// Copies execute in encoder order, between the passes recorded around them.
/// `bytes.len()` must be a multiple of `wgpu::COPY_BUFFER_ALIGNMENT`.
fn record_upload(
    device: &wgpu::Device,
    encoder: &mut wgpu::CommandEncoder,
    dst: &wgpu::Buffer,
    bytes: &[u8],
) {
    if bytes.is_empty() {
        return;
    }
    let staging = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("myria interface staging"),
        contents: bytes,
        usage: wgpu::BufferUsages::COPY_SRC,
    });
    encoder.copy_buffer_to_buffer(&staging, 0, dst, 0, bytes.len() as u64);
}

/// Concatenates draw geometry into shared vertex/index streams.
///
/// Returns `(vertices, indices, locals, packed)`; `packed[i].draw` is the
/// position of the source draw in `draws`. Indices stay relative to their draw
/// and are rebased with `base_vertex` at draw time.
fn pack_draws<'a>(
    draws: impl Iterator<Item = (&'a [InterfaceVertex], &'a [u32], Mat4)>,
    local_stride: u64,
) -> (Vec<InterfaceVertex>, Vec<u32>, Vec<Mat4>, Vec<PackedDraw>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut locals = Vec::new();
    let mut packed = Vec::new();

    for (i, (draw_vertices, draw_indices, local)) in draws.enumerate() {
        let index_count = draw_indices.len() - draw_indices.len() % 3;
        if draw_vertices.is_empty() || index_count == 0 {
            continue;
        }

        packed.push(PackedDraw {
            first_index: indices.len() as u32,
            index_count: index_count as u32,
            base_vertex: vertices.len() as i32,
            local_offset: (locals.len() as u64 * local_stride) as u32,
            draw: i,
        });

        vertices.extend_from_slice(draw_vertices);
        indices.extend_from_slice(&draw_indices[..index_count]);
        locals.push(local);
    }

    (vertices, indices, locals, packed)
}
