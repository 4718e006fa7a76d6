use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use super::interface::Varyings;
use super::transform::TransformPair;

/// One vertex as submitted by the draw call.
///
/// Memory layout matches vertex attributes 0..=3 of the interface shader:
/// position @ 0, color @ 8, texcoord @ 24, index @ 32 (36-byte stride).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InterfaceVertex {
    /// Object-space position.
    pub position: [f32; 2],
    /// RGBA tint. Range is the caller's convention; never clamped.
    pub color: [f32; 4],
    pub texcoord: [f32; 2],
    /// Opaque per-vertex value. Propagated flat, never interpreted.
    pub index: u32,
}

impl InterfaceVertex {
    #[inline]
    pub const fn new(position: [f32; 2], color: [f32; 4], texcoord: [f32; 2], index: u32) -> Self {
        Self {
            position,
            color,
            texcoord,
            index,
        }
    }
}

/// Result of one vertex-stage invocation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexOutput {
    pub clip_position: Vec4,
    pub varyings: Varyings,
}

/// Vertex transform stage.
///
/// Extends the 2D position to `(x, y, 0, 1)` and maps it to clip space as
/// `camera * (local * p)`. Color, texcoord and index pass through untouched.
///
/// Total over finite inputs. A singular matrix is the caller's problem and is
/// not detected here.
pub fn vertex_stage(vertex: &InterfaceVertex, transforms: &TransformPair) -> VertexOutput {
    let [x, y] = vertex.position;
    let object = Vec4::new(x, y, 0.0, 1.0);
    let clip_position = transforms.camera * (transforms.local * object);

    VertexOutput {
        clip_position,
        varyings: Varyings {
            color: vertex.color,
            texcoord: vertex.texcoord,
            index: vertex.index,
        },
    }
}
