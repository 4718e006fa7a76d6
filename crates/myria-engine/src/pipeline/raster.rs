//! CPU rasterizer driving the reference stages.
//!
//! Conventions mirror wgpu:
//! - triangle lists, first vertex of each triangle is the provoking vertex
//! - NDC +Y up, framebuffer +Y down, pixel centers at `(x + 0.5, y + 0.5)`
//! - top-left fill rule, so shared edges are covered exactly once
//!
//! There is no culling, depth test or blending. Fragments overwrite (REPLACE).

use glam::{Vec2, Vec4};

use super::fragment::fragment_stage;
use super::interface::Varyings;
use super::sampler::TextureBinding;
use super::transform::TransformPair;
use super::vertex::{vertex_stage, InterfaceVertex, VertexOutput};

/// Color target plus the flat index observed by each covered pixel.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<[f32; 4]>,
    index: Vec<Option<u32>>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, clear: [f32; 4]) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![clear; len],
            index: vec![None; len],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.color[self.offset(x, y)]
    }

    /// Index varying seen by the last fragment written at `(x, y)`.
    #[inline]
    pub fn index_at(&self, x: u32, y: u32) -> Option<u32> {
        self.index[self.offset(x, y)]
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.color
    }

    pub fn covered_count(&self) -> usize {
        self.index.iter().filter(|i| i.is_some()).count()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn write(&mut self, x: u32, y: u32, color: [f32; 4], index: u32) {
        let i = self.offset(x, y);
        self.color[i] = color;
        self.index[i] = Some(index);
    }
}

/// Screen-space corner of a triangle after the viewport transform.
#[derive(Debug, Copy, Clone)]
struct Corner<'a> {
    screen: Vec2,
    inv_w: f32,
    varyings: &'a Varyings,
}

/// Draws an indexed triangle list into `target`.
///
/// Every vertex goes through `vertex_stage` once; every covered pixel through
/// `fragment_stage`. Trailing indices that do not form a full triangle are
/// ignored; triangles referencing a missing vertex or a vertex with `w <= 0`
/// are skipped.
///
/// Returns the number of fragments shaded.
pub fn draw_indexed(
    target: &mut Framebuffer,
    vertices: &[InterfaceVertex],
    indices: &[u32],
    transforms: &TransformPair,
    texture: TextureBinding<'_>,
) -> usize {
    if target.width == 0 || target.height == 0 {
        return 0;
    }

    let shaded: Vec<VertexOutput> = vertices.iter().map(|v| vertex_stage(v, transforms)).collect();
    let viewport = Vec2::new(target.width as f32, target.height as f32);

    let mut fragments = 0;
    for (tri, idx) in indices.chunks_exact(3).enumerate() {
        let Some(outputs) = fetch_triangle(&shaded, idx) else {
            log::debug!("raster: triangle {tri} references a missing vertex; skipped");
            continue;
        };
        let Some(corners) = to_screen(outputs, viewport) else {
            continue;
        };
        fragments += rasterize(target, corners, texture);
    }
    fragments
}

fn fetch_triangle<'a>(shaded: &'a [VertexOutput], idx: &[u32]) -> Option<[&'a VertexOutput; 3]> {
    Some([
        shaded.get(idx[0] as usize)?,
        shaded.get(idx[1] as usize)?,
        shaded.get(idx[2] as usize)?,
    ])
}

fn to_screen(outputs: [&VertexOutput; 3], viewport: Vec2) -> Option<[Corner<'_>; 3]> {
    Some([
        to_corner(outputs[0], viewport)?,
        to_corner(outputs[1], viewport)?,
        to_corner(outputs[2], viewport)?,
    ])
}

// Perspective divide + viewport transform. `None` when the vertex is at or behind the eye.
fn to_corner(out: &VertexOutput, viewport: Vec2) -> Option<Corner<'_>> {
    let clip: Vec4 = out.clip_position;
    if !(clip.w > 0.0) {
        return None;
    }
    let ndc = clip.truncate().truncate() / clip.w;
    let screen = Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.x,
        (1.0 - ndc.y) * 0.5 * viewport.y,
    );
    Some(Corner {
        screen,
        inv_w: 1.0 / clip.w,
        varyings: &out.varyings,
    })
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

// Edge `a -> b` of a positively oriented triangle (y down).
#[inline]
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    let d = b - a;
    (d.y == 0.0 && d.x > 0.0) || d.y < 0.0
}

fn rasterize(
    target: &mut Framebuffer,
    corners: [Corner<'_>; 3],
    texture: TextureBinding<'_>,
) -> usize {
    // Orient positively while keeping corner 0 (provoking) in place.
    let [c0, mut c1, mut c2] = corners;
    let mut area = edge(c0.screen, c1.screen, c2.screen);
    if area < 0.0 {
        std::mem::swap(&mut c1, &mut c2);
        area = -area;
    }
    if !(area > 0.0) {
        return 0;
    }

    let (p0, p1, p2) = (c0.screen, c1.screen, c2.screen);
    let min = p0.min(p1).min(p2);
    let max = p0.max(p1).max(p2);

    let x_start = min.x.floor().max(0.0) as u32;
    let y_start = min.y.floor().max(0.0) as u32;
    let x_end = (max.x.ceil().max(0.0) as u32).min(target.width);
    let y_end = (max.y.ceil().max(0.0) as u32).min(target.height);

    let inside = |w: f32, a: Vec2, b: Vec2| w > 0.0 || (w == 0.0 && is_top_left(a, b));

    let mut fragments = 0;
    for y in y_start..y_end {
        for x in x_start..x_end {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(p1, p2, p);
            let w1 = edge(p2, p0, p);
            let w2 = edge(p0, p1, p);

            if !(inside(w0, p1, p2) && inside(w1, p2, p0) && inside(w2, p0, p1)) {
                continue;
            }

            // Screen-space barycentrics, then perspective correction.
            let b = [w0 / area * c0.inv_w, w1 / area * c1.inv_w, w2 / area * c2.inv_w];
            let sum = b[0] + b[1] + b[2];
            let weights = [b[0] / sum, b[1] / sum, b[2] / sum];

            let varyings = Varyings::interpolate([c0.varyings, c1.varyings, c2.varyings], weights);
            let color = fragment_stage(&varyings, texture);
            target.write(x, y, color, varyings.index);
            fragments += 1;
        }
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sampler::{SamplerState, TexelImage};
    use glam::{Mat4, Vec3};

    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    const CLEAR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

    fn white_texture() -> (TexelImage, SamplerState) {
        (TexelImage::solid(1, 1, WHITE), SamplerState::nearest_clamp())
    }

    fn vtx(x: f32, y: f32, uv: [f32; 2], index: u32) -> InterfaceVertex {
        InterfaceVertex::new([x, y], WHITE, uv, index)
    }

    fn unit_quad() -> (Vec<InterfaceVertex>, Vec<u32>) {
        let vertices = vec![
            vtx(0.0, 0.0, [0.0, 1.0], 0),
            vtx(1.0, 0.0, [1.0, 1.0], 0),
            vtx(1.0, 1.0, [1.0, 0.0], 0),
            vtx(0.0, 1.0, [0.0, 0.0], 0),
        ];
        (vertices, vec![0, 1, 3, 1, 2, 3])
    }

    #[test]
    fn unit_quad_with_identity_covers_upper_right_quadrant_in_white() {
        let (image, sampler) = white_texture();
        let (vertices, indices) = unit_quad();
        let mut fb = Framebuffer::new(8, 8, CLEAR);

        let shaded = draw_indexed(
            &mut fb,
            &vertices,
            &indices,
            &TransformPair::IDENTITY,
            TextureBinding::new(&image, &sampler),
        );

        // NDC [0,1]^2 maps to x in [4, 8), y in [0, 4).
        assert_eq!(shaded, 16, "shared diagonal must not be shaded twice");
        assert_eq!(fb.covered_count(), 16);
        for y in 0..8 {
            for x in 0..8 {
                let expected = if x >= 4 && y < 4 { WHITE } else { CLEAR };
                assert_eq!(fb.pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn flat_index_comes_from_provoking_vertex() {
        let (image, sampler) = white_texture();
        let vertices = [
            vtx(-1.0, -1.0, [0.0, 0.0], 1),
            vtx(1.0, -1.0, [0.0, 0.0], 2),
            vtx(-1.0, 1.0, [0.0, 0.0], 3),
        ];
        let mut fb = Framebuffer::new(16, 16, CLEAR);

        let shaded = draw_indexed(
            &mut fb,
            &vertices,
            &[0, 1, 2],
            &TransformPair::IDENTITY,
            TextureBinding::new(&image, &sampler),
        );

        assert!(shaded > 0);
        for y in 0..16 {
            for x in 0..16 {
                if let Some(index) = fb.index_at(x, y) {
                    assert_eq!(index, 1, "pixel ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn provoking_vertex_survives_winding_flip() {
        let (image, sampler) = white_texture();
        // Opposite winding to the previous test.
        let vertices = [
            vtx(-1.0, -1.0, [0.0, 0.0], 3),
            vtx(-1.0, 1.0, [0.0, 0.0], 1),
            vtx(1.0, -1.0, [0.0, 0.0], 2),
        ];
        let mut fb = Framebuffer::new(8, 8, CLEAR);
        draw_indexed(
            &mut fb,
            &vertices,
            &[0, 1, 2],
            &TransformPair::IDENTITY,
            TextureBinding::new(&image, &sampler),
        );

        assert!(fb.covered_count() > 0);
        assert!((0..8).all(|y| (0..8).all(|x| fb.index_at(x, y).is_none_or(|i| i == 3))));
    }

    #[test]
    fn texcoords_interpolate_across_the_surface() {
        let image = TexelImage::new(
            2,
            2,
            vec![
                [1.0, 0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0, 1.0],
                [0.0, 0.0, 1.0, 1.0],
                [1.0, 1.0, 0.0, 1.0],
            ],
        )
        .unwrap();
        let sampler = SamplerState::nearest_clamp();

        // Full-screen quad; uv (0, 0) at the top-left of the framebuffer.
        let vertices = [
            vtx(-1.0, 1.0, [0.0, 0.0], 0),
            vtx(1.0, 1.0, [1.0, 0.0], 0),
            vtx(1.0, -1.0, [1.0, 1.0], 0),
            vtx(-1.0, -1.0, [0.0, 1.0], 0),
        ];
        let mut fb = Framebuffer::new(4, 4, CLEAR);
        let shaded = draw_indexed(
            &mut fb,
            &vertices,
            &[0, 1, 2, 0, 2, 3],
            &TransformPair::IDENTITY,
            TextureBinding::new(&image, &sampler),
        );

        assert_eq!(shaded, 16);
        for y in 0..4 {
            for x in 0..4 {
                let texel = image.texel(x / 2, y / 2);
                assert_eq!(fb.pixel(x, y), texel, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn texcoords_are_perspective_correct() {
        // Between the two texel centers the sampled red is 2u - 0.5.
        let image = TexelImage::new(2, 1, vec![[0.0, 0.0, 0.0, 1.0], [1.0; 4]]).unwrap();
        let sampler = SamplerState::linear_clamp();

        // Clip positions: v0 (-1, -1, 0, 1), v1 (3, -3, 0, 3), v2 (-1, 3, 0, 1).
        let camera = Mat4::from_cols(
            Vec4::new(4.0, -2.0, 0.0, 2.0),
            Vec4::new(0.0, 4.0, 0.0, 0.0),
            Vec4::Z,
            Vec4::new(-1.0, -1.0, 0.0, 1.0),
        );
        let vertices = [
            vtx(0.0, 0.0, [0.0, 0.0], 0),
            vtx(1.0, 0.0, [1.0, 0.0], 0),
            vtx(0.0, 1.0, [0.0, 0.0], 0),
        ];
        let mut fb = Framebuffer::new(4, 4, CLEAR);

        draw_indexed(
            &mut fb,
            &vertices,
            &[0, 1, 2],
            &TransformPair::new(camera, Mat4::IDENTITY),
            TextureBinding::new(&image, &sampler),
        );

        // Pixel (2, 3): screen weights (0.3125, 0.625, 0.0625). Dividing by
        // w = (1, 3, 1) gives u = 5/14; a screen-linear blend would give 0.625.
        let u = 5.0 / 14.0;
        let red = fb.pixel(2, 3)[0];
        assert!((red - (2.0 * u - 0.5)).abs() < 1e-4, "red = {red}");
        assert!((red - 0.75).abs() > 0.1);
    }

    #[test]
    fn camera_moves_geometry_on_screen() {
        let (image, sampler) = white_texture();
        let (vertices, indices) = unit_quad();
        // Shift the quad left by one NDC unit: it now covers x in [-1, 0].
        let camera = Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0));
        let mut fb = Framebuffer::new(8, 8, CLEAR);

        draw_indexed(
            &mut fb,
            &vertices,
            &indices,
            &TransformPair::new(camera, Mat4::IDENTITY),
            TextureBinding::new(&image, &sampler),
        );

        assert_eq!(fb.covered_count(), 16);
        assert_eq!(fb.pixel(0, 0), WHITE);
        assert_eq!(fb.pixel(3, 3), WHITE);
        assert_eq!(fb.pixel(4, 0), CLEAR);
    }

    #[test]
    fn missing_vertices_and_trailing_indices_are_skipped() {
        let (image, sampler) = white_texture();
        let (vertices, _) = unit_quad();
        let mut fb = Framebuffer::new(8, 8, CLEAR);

        let shaded = draw_indexed(
            &mut fb,
            &vertices,
            &[0, 1, 9, 1, 2],
            &TransformPair::IDENTITY,
            TextureBinding::new(&image, &sampler),
        );

        assert_eq!(shaded, 0);
        assert_eq!(fb.covered_count(), 0);
    }

    #[test]
    fn triangles_behind_the_eye_are_dropped() {
        let (image, sampler) = white_texture();
        let (vertices, indices) = unit_quad();
        let camera = Mat4::from_diagonal(Vec4::new(1.0, 1.0, 1.0, -1.0));
        let mut fb = Framebuffer::new(8, 8, CLEAR);

        let shaded = draw_indexed(
            &mut fb,
            &vertices,
            &indices,
            &TransformPair::new(camera, Mat4::IDENTITY),
            TextureBinding::new(&image, &sampler),
        );
        assert_eq!(shaded, 0);
    }
}
