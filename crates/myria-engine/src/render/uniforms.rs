use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Set A, slot 0. Column-major, as WGSL `mat4x4<f32>` expects.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GlobalUniform {
    pub camera: [[f32; 4]; 4],
}

impl GlobalUniform {
    #[inline]
    pub fn new(camera: Mat4) -> Self {
        Self {
            camera: camera.to_cols_array_2d(),
        }
    }
}

/// Set A, slot 1. One instance per draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LocalUniform {
    pub transform: [[f32; 4]; 4],
}

impl LocalUniform {
    #[inline]
    pub fn new(local: Mat4) -> Self {
        Self {
            transform: local.to_cols_array_2d(),
        }
    }
}

/// Byte distance between consecutive local-transform slots in the dynamic
/// uniform buffer. `alignment` is the device's `min_uniform_buffer_offset_alignment`.
pub(crate) fn local_slot_stride(alignment: u32) -> u64 {
    let size = std::mem::size_of::<LocalUniform>() as u64;
    let alignment = u64::from(alignment.max(1));
    size.div_ceil(alignment) * alignment
}

/// Packs one `LocalUniform` per slot, `stride` bytes apart.
pub(crate) fn pack_local_slots(locals: &[Mat4], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; locals.len() * stride];
    for (slot, local) in locals.iter().enumerate() {
        let uniform = LocalUniform::new(*local);
        let src = bytemuck::bytes_of(&uniform);
        bytes[slot * stride..slot * stride + src.len()].copy_from_slice(src);
    }
    bytes
}
