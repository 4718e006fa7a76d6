//! Binding contract of the interface pipeline.
//!
//! These numbers are shared with `shaders/interface.wgsl` and with any
//! external pipeline that drives the shader. Changing one side alone breaks
//! interoperability silently.

use crate::pipeline::{InterfaceVertex, VARYINGS};

use super::uniforms::{GlobalUniform, LocalUniform};

// ── set A: transforms ─────────────────────────────────────────────────────

pub const TRANSFORM_GROUP: u32 = 0;
/// Camera matrix. Shared across a batch.
pub const CAMERA_BINDING: u32 = 0;
/// Local matrix. One slot per draw, selected with a dynamic offset.
pub const LOCAL_BINDING: u32 = 1;

// ── set B: texture pair ───────────────────────────────────────────────────

pub const TEXTURE_GROUP: u32 = 1;
pub const IMAGE_BINDING: u32 = 0;
pub const SAMPLER_BINDING: u32 = 1;

// ── vertex attributes ─────────────────────────────────────────────────────

pub const POSITION_ATTRIBUTE: u32 = 0;
pub const COLOR_ATTRIBUTE: u32 = 1;
pub const TEXCOORD_ATTRIBUTE: u32 = 2;
pub const INDEX_ATTRIBUTE: u32 = 3;

// ── inter-stage + output ──────────────────────────────────────────────────

pub const COLOR_VARYING: u32 = VARYINGS[0].location;
pub const TEXCOORD_VARYING: u32 = VARYINGS[1].location;
pub const INDEX_VARYING: u32 = VARYINGS[2].location;

pub const COLOR_OUTPUT: u32 = 0;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

impl InterfaceVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4, // color
        2 => Float32x2, // texcoord
        3 => Uint32     // index
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InterfaceVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Layout of set A: camera uniform + dynamically offset local uniform.
pub fn transform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("myria interface transforms bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: CAMERA_BINDING,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<GlobalUniform>() as u64,
                    ),
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: LOCAL_BINDING,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<LocalUniform>() as u64,
                    ),
                },
                count: None,
            },
        ],
    })
}

/// Layout of set B: sampled 2D float image + filtering sampler.
pub fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("myria interface texture bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: IMAGE_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: SAMPLER_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}
