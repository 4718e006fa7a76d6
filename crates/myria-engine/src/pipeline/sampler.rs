//! CPU texture resource and sampler state.
//!
//! Sampling follows the usual GPU conventions:
//! - texel centers sit at `(i + 0.5) / size` in normalized coordinates
//! - nearest picks the texel containing the coordinate
//! - linear blends the 2x2 footprint around it
//! - every integer texel coordinate is resolved through the address mode first

use std::fmt;

/// Errors raised when constructing a `TexelImage`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ImageError {
    /// Width or height is zero.
    EmptyImage,
    /// Supplied data does not cover `width * height` texels.
    TexelCountMismatch { expected: usize, actual: usize },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::EmptyImage => write!(f, "image has zero width or height"),
            ImageError::TexelCountMismatch { expected, actual } => {
                write!(f, "expected {expected} texels, got {actual}")
            }
        }
    }
}

impl std::error::Error for ImageError {}

/// Row-major RGBA image with `f32` channels.
#[derive(Debug, Clone, PartialEq)]
pub struct TexelImage {
    width: u32,
    height: u32,
    texels: Vec<[f32; 4]>,
}

impl TexelImage {
    pub fn new(width: u32, height: u32, texels: Vec<[f32; 4]>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyImage);
        }
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(ImageError::TexelCountMismatch {
                expected,
                actual: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Image filled with one color. Zero dimensions are bumped to 1.
    pub fn solid(width: u32, height: u32, color: [f32; 4]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            texels: vec![color; width as usize * height as usize],
        }
    }

    /// Builds an image from tightly packed RGBA8 bytes (`u8 / 255` per channel).
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() % 4 != 0 {
            return Err(ImageError::TexelCountMismatch {
                expected: width as usize * height as usize,
                actual: bytes.len() / 4,
            });
        }
        let texels = bytes
            .chunks_exact(4)
            .map(|px| std::array::from_fn(|i| px[i] as f32 / 255.0))
            .collect();
        Self::new(width, height, texels)
    }

    /// Packs the texels into RGBA8, clamping each channel to `[0, 1]`.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.texels
            .iter()
            .flat_map(|t| t.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
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
    pub fn texels(&self) -> &[[f32; 4]] {
        &self.texels
    }

    /// Texel at already-resolved integer coordinates.
    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        self.texels[y as usize * self.width as usize + x as usize]
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

/// How texel coordinates outside `[0, size)` are folded back into range.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum AddressMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

impl AddressMode {
    /// Maps an integer texel coordinate into `[0, size)`. `size` must be non-zero.
    pub fn resolve(self, coord: i64, size: u32) -> u32 {
        let n = i64::from(size);
        let resolved = match self {
            AddressMode::ClampToEdge => coord.clamp(0, n - 1),
            AddressMode::Repeat => coord.rem_euclid(n),
            AddressMode::MirrorRepeat => {
                let period = 2 * n;
                let m = coord.rem_euclid(period);
                if m < n { m } else { period - 1 - m }
            }
        };
        resolved as u32
    }
}

/// Addressing and filtering policy used when reading a texture.
///
/// One filter covers both magnification and minification; there is a single
/// mip level.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct SamplerState {
    pub filter: FilterMode,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
}

impl SamplerState {
    pub const fn nearest_clamp() -> Self {
        Self {
            filter: FilterMode::Nearest,
            address_u: AddressMode::ClampToEdge,
            address_v: AddressMode::ClampToEdge,
        }
    }

    pub const fn linear_clamp() -> Self {
        Self {
            filter: FilterMode::Linear,
            address_u: AddressMode::ClampToEdge,
            address_v: AddressMode::ClampToEdge,
        }
    }

    pub const fn with_address(self, u: AddressMode, v: AddressMode) -> Self {
        Self {
            address_u: u,
            address_v: v,
            ..self
        }
    }
}

/// A texture and sampler bound together for one draw. Read-only.
#[derive(Debug, Copy, Clone)]
pub struct TextureBinding<'a> {
    pub image: &'a TexelImage,
    pub sampler: &'a SamplerState,
}

impl<'a> TextureBinding<'a> {
    #[inline]
    pub fn new(image: &'a TexelImage, sampler: &'a SamplerState) -> Self {
        Self { image, sampler }
    }

    /// Samples at normalized coordinate `uv`. Never fails: out-of-range
    /// coordinates go through the sampler's address modes.
    pub fn sample(&self, uv: [f32; 2]) -> [f32; 4] {
        let x = uv[0] * self.image.width as f32 - 0.5;
        let y = uv[1] * self.image.height as f32 - 0.5;

        match self.sampler.filter {
            FilterMode::Nearest => self.fetch((x + 0.5).floor() as i64, (y + 0.5).floor() as i64),
            FilterMode::Linear => {
                let x0 = x.floor();
                let y0 = y.floor();
                let fx = x - x0;
                let fy = y - y0;
                // Far out-of-range coordinates saturate in the cast.
                let (x0, y0) = (x0 as i64, y0 as i64);
                let (x1, y1) = (x0.saturating_add(1), y0.saturating_add(1));

                let top = lerp(self.fetch(x0, y0), self.fetch(x1, y0), fx);
                let bottom = lerp(self.fetch(x0, y1), self.fetch(x1, y1), fx);
                lerp(top, bottom, fy)
            }
        }
    }

    #[inline]
    fn fetch(&self, x: i64, y: i64) -> [f32; 4] {
        let x = self.sampler.address_u.resolve(x, self.image.width);
        let y = self.sampler.address_v.resolve(y, self.image.height);
        self.image.texel(x, y)
    }
}

// `a + (b - a) * t` keeps equal endpoints exact.
#[inline]
fn lerp(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}
