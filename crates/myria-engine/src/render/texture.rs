use anyhow::Result;

use crate::pipeline::{AddressMode, FilterMode, SamplerState, TexelImage};

use super::bindings::{IMAGE_BINDING, SAMPLER_BINDING};
use super::RenderCtx;

/// Texture resource pair bound at set B: sampled image + sampler state.
///
/// Owns the GPU objects and the bind group that exposes them to the fragment
/// stage. Read-only once uploaded.
pub struct InterfaceTexture {
    /// Owned alongside the bind group that references them.
    _texture: wgpu::Texture,
    _view: wgpu::TextureView,
    _sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
}

impl InterfaceTexture {
    /// Uploads `image` as `Rgba8Unorm` and pairs it with a sampler built from `state`.
    ///
    /// `layout` must be the set-B layout of the renderer that will draw with it
    /// (see `InterfaceRenderer::texture_layout`).
    pub fn from_image(
        ctx: &RenderCtx<'_>,
        layout: &wgpu::BindGroupLayout,
        image: &TexelImage,
        state: &SamplerState,
    ) -> Result<Self> {
        let max = ctx.device.limits().max_texture_dimension_2d;
        anyhow::ensure!(
            image.width() <= max && image.height() <= max,
            "texture {}x{} exceeds device limit {max}",
            image.width(),
            image.height()
        );

        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("myria interface texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.to_rgba8(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width()),
                rows_per_image: Some(image.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&sampler_descriptor(state));

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("myria interface texture bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: IMAGE_BINDING,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        log::debug!(
            "interface texture uploaded ({}x{}, {:?})",
            image.width(),
            image.height(),
            state.filter
        );

        Ok(Self {
            _texture: texture,
            _view: view,
            _sampler: sampler,
            bind_group,
        })
    }

    /// 1x1 opaque white texture.
    pub fn solid_white(
        ctx: &RenderCtx<'_>,
        layout: &wgpu::BindGroupLayout,
        sampler: &SamplerState,
    ) -> Result<Self> {
        Self::from_image(ctx, layout, &TexelImage::solid(1, 1, [1.0; 4]), sampler)
    }

    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

pub(crate) fn sampler_descriptor(state: &SamplerState) -> wgpu::SamplerDescriptor<'static> {
    let filter = match state.filter {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    };

    wgpu::SamplerDescriptor {
        label: Some("myria interface sampler"),
        address_mode_u: address_mode(state.address_u),
        address_mode_v: address_mode(state.address_v),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    }
}

fn address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        AddressMode::Repeat => wgpu::AddressMode::Repeat,
        AddressMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}
