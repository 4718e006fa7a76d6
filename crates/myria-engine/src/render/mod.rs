//! GPU rendering subsystem.
//!
//! The interface renderer executes the two pipeline stages on the GPU through
//! `shaders/interface.wgsl`. Binding points are fixed (see `bindings`) so any
//! external pipeline can drive the same shader.
//!
//! Convention:
//! - CPU geometry is submitted in object space; the camera uniform maps to clip space.
//! - Set A (group 0) holds transforms, set B (group 1) the texture + sampler pair.

pub mod bindings;
mod ctx;
mod interface;
mod texture;
mod uniforms;

pub use ctx::{RenderCtx, RenderTarget};
pub use interface::{InterfaceDraw, InterfacePipelineConfig, InterfaceRenderer};
pub use texture::InterfaceTexture;
pub use uniforms::{GlobalUniform, LocalUniform};

/// WGSL source of the interface pipeline (`vs_main` / `fs_main`).
pub const INTERFACE_SHADER: &str = include_str!("shaders/interface.wgsl");
