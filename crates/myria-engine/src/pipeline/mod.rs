//! Pipeline data contract and CPU reference stages.
//!
//! The GPU runs `render/shaders/interface.wgsl`. The functions in this module
//! compute the same per-invocation results on the CPU and share the vertex
//! record, transform pair and varying table with the GPU side.
//!
//! Stage order per primitive:
//! - `vertex_stage` once per vertex
//! - rasterization (see `raster`)
//! - `fragment_stage` once per covered pixel

mod fragment;
mod interface;
pub mod raster;
pub mod sampler;
mod transform;
mod vertex;

pub use fragment::fragment_stage;
pub use interface::{Interpolation, Varying, Varyings, VARYINGS};
pub use raster::{draw_indexed, Framebuffer};
pub use sampler::{AddressMode, FilterMode, ImageError, SamplerState, TexelImage, TextureBinding};
pub use transform::TransformPair;
pub use vertex::{vertex_stage, InterfaceVertex, VertexOutput};
