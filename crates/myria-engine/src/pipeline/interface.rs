//! Inter-stage contract: which attributes cross from vertex to fragment stage,
//! at which location, and how the rasterizer propagates them.

/// How a varying is propagated across a primitive.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Interpolation {
    /// Perspective-correct blend of the three vertex values.
    Perspective,
    /// Taken unmodified from the provoking vertex; constant over the primitive.
    Flat,
}

/// One entry of the inter-stage interface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Varying {
    pub name: &'static str,
    pub location: u32,
    pub interpolation: Interpolation,
}

/// Varyings emitted by the vertex stage, in location order.
///
/// `index` must stay `Flat`. An interpolated integer is undefined per pixel.
pub const VARYINGS: [Varying; 3] = [
    Varying {
        name: "color",
        location: 0,
        interpolation: Interpolation::Perspective,
    },
    Varying {
        name: "texcoord",
        location: 1,
        interpolation: Interpolation::Perspective,
    },
    Varying {
        name: "index",
        location: 2,
        interpolation: Interpolation::Flat,
    },
];

/// Attribute bundle handed from the vertex stage to the fragment stage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Varyings {
    pub color: [f32; 4],
    pub texcoord: [f32; 2],
    pub index: u32,
}

impl Varyings {
    /// Combines the varyings of a triangle's three vertices.
    ///
    /// `weights` are the perspective-corrected barycentric weights of the pixel
    /// and sum to one. `color` and `texcoord` are blended; `index` is copied from
    /// `corners[0]`, the provoking vertex.
    pub fn interpolate(corners: [&Varyings; 3], weights: [f32; 3]) -> Varyings {
        let [a, b, c] = corners;
        let [wa, wb, wc] = weights;
        let blend = |x: f32, y: f32, z: f32| x * wa + y * wb + z * wc;

        Varyings {
            color: std::array::from_fn(|i| blend(a.color[i], b.color[i], c.color[i])),
            texcoord: std::array::from_fn(|i| blend(a.texcoord[i], b.texcoord[i], c.texcoord[i])),
            index: a.index,
        }
    }
}
