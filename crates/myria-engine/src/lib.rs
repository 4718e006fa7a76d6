//! Myria engine crate.
//!
//! A minimal two-stage 2D draw pipeline:
//! - `pipeline`: vertex/texture data contract and CPU reference stages
//! - `render`: the same stages on the GPU (WGSL shader, bindings, renderer)
//! - `device`, `window`, `core`: platform + GPU runtime driving an `App`

pub mod core;
pub mod device;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod window;
