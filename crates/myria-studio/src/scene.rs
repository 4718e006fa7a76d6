//! Demo scene: a unit quad covering the whole viewport.

use glam::Mat4;
use myria_engine::pipeline::InterfaceVertex;

const WHITE: [f32; 4] = [1.0; 4];

pub const QUAD_VERTICES: [InterfaceVertex; 4] = [
    InterfaceVertex::new([0.0, 0.0], WHITE, [0.0, 0.0], 0),
    InterfaceVertex::new([1.0, 0.0], WHITE, [1.0, 0.0], 0),
    InterfaceVertex::new([1.0, 1.0], WHITE, [1.0, 1.0], 0),
    InterfaceVertex::new([0.0, 1.0], WHITE, [0.0, 1.0], 0),
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Maps [0,1] x [0,1] onto the full viewport, y up. z = 0 sits mid-range.
pub fn demo_camera() -> Mat4 {
    Mat4::orthographic_rh(0.0, 1.0, 0.0, 1.0, -1.0, 1.0)
}
