use super::interface::Varyings;
use super::sampler::TextureBinding;

/// Fragment composite stage.
///
/// Samples the bound texture at the interpolated texcoord and returns the texel
/// as-is. `color` and `index` are available in `varyings` but do not take part
/// in the result. Addressing and filtering belong to the bound sampler.
#[inline]
pub fn fragment_stage(varyings: &Varyings, texture: TextureBinding<'_>) -> [f32; 4] {
    texture.sample(varyings.texcoord)
}
