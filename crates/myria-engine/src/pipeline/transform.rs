use glam::Mat4;

/// Camera and local transforms supplied by the draw call.
///
/// `camera` is shared across a batch (view/projection). `local` places a single
/// object. Positions are transformed as `camera * (local * p)`: local first.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformPair {
    pub camera: Mat4,
    pub local: Mat4,
}

impl TransformPair {
    pub const IDENTITY: Self = Self {
        camera: Mat4::IDENTITY,
        local: Mat4::IDENTITY,
    };

    #[inline]
    pub const fn new(camera: Mat4, local: Mat4) -> Self {
        Self { camera, local }
    }
}

impl Default for TransformPair {
    fn default() -> Self {
        Self::IDENTITY
    }
}
