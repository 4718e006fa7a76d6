//! Offscreen rendering through `InterfaceRenderer`.
//!
//! Needs a GPU adapter (hardware or software). Tests return early when none
//! is available.

use glam::{Mat4, Vec3};

use myria_engine::pipeline::{InterfaceVertex, SamplerState, TexelImage};
use myria_engine::render::{
    InterfaceDraw, InterfacePipelineConfig, InterfaceRenderer, RenderCtx, RenderTarget,
};

const SIZE: u32 = 8;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
// Readback rows must be `COPY_BYTES_PER_ROW_ALIGNMENT` aligned.
const PADDED_ROW: u32 = 256;

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

fn device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok()?;

    pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("myria test device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::downlevel_defaults(),
        experimental_features: wgpu::ExperimentalFeatures::disabled(),
        memory_hints: wgpu::MemoryHints::Performance,
        trace: wgpu::Trace::Off,
    }))
    .ok()
}

/// Quad covering the left half of clip space: x in [-1, 0], y in [-1, 1].
fn left_half() -> [InterfaceVertex; 4] {
    [
        InterfaceVertex::new([-1.0, -1.0], [1.0; 4], [0.0, 1.0], 0),
        InterfaceVertex::new([0.0, -1.0], [1.0; 4], [1.0, 1.0], 0),
        InterfaceVertex::new([0.0, 1.0], [1.0; 4], [1.0, 0.0], 0),
        InterfaceVertex::new([-1.0, 1.0], [1.0; 4], [0.0, 0.0], 0),
    ]
}

const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

fn read_pixels(device: &wgpu::Device, buffer: &wgpu::Buffer) -> Vec<u8> {
    let slice = buffer.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        sender.send(result).ok();
    });
    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .expect("device poll failed");
    receiver
        .recv()
        .expect("map callback dropped")
        .expect("buffer mapping failed");

    let data = slice.get_mapped_range().to_vec();
    buffer.unmap();
    data
}

fn pixel(data: &[u8], x: u32, y: u32) -> [u8; 4] {
    let at = (y * PADDED_ROW + x * 4) as usize;
    [data[at], data[at + 1], data[at + 2], data[at + 3]]
}

#[test]
fn each_render_call_keeps_its_own_camera_and_geometry() {
    let Some((device, queue)) = device() else {
        eprintln!("no GPU adapter available; skipping");
        return;
    };
    let ctx = RenderCtx::new(&device, &queue, FORMAT);

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("myria test target"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut renderer = InterfaceRenderer::new(
        &device,
        InterfacePipelineConfig {
            cull_mode: None,
            ..Default::default()
        },
    );
    let sampler = SamplerState::nearest_clamp();
    let red = renderer
        .create_texture(&ctx, &TexelImage::solid(1, 1, RED), &sampler)
        .expect("red texture");
    let blue = renderer
        .create_texture(&ctx, &TexelImage::solid(1, 1, BLUE), &sampler)
        .expect("blue texture");

    let quad = left_half();
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("myria test encoder"),
    });

    // Two batches on one encoder: same geometry, different camera and texture.
    {
        let mut target = RenderTarget::new(&mut encoder, &view);

        renderer.set_camera(Mat4::IDENTITY);
        renderer.render(
            &ctx,
            &mut target,
            &[InterfaceDraw {
                vertices: &quad,
                indices: &QUAD_INDICES,
                local: Mat4::IDENTITY,
                texture: &red,
            }],
        );

        renderer.set_camera(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        renderer.render(
            &ctx,
            &mut target,
            &[InterfaceDraw {
                vertices: &quad,
                indices: &QUAD_INDICES,
                local: Mat4::IDENTITY,
                texture: &blue,
            }],
        );
    }

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("myria test readback"),
        size: u64::from(PADDED_ROW * SIZE),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(PADDED_ROW),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let data = read_pixels(&device, &readback);
    for y in 0..SIZE {
        assert_eq!(pixel(&data, 1, y), [255, 0, 0, 255], "left half, row {y}");
        assert_eq!(pixel(&data, 6, y), [0, 0, 255, 255], "right half, row {y}");
    }
}
