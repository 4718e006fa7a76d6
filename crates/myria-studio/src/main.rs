mod cli;
mod scene;

use anyhow::Result;
use clap::Parser;
use glam::Mat4;
use winit::dpi::LogicalSize;

use myria_engine::core::{App, AppControl, FrameCtx};
use myria_engine::device::GpuInit;
use myria_engine::logging::{init_logging, LoggingConfig};
use myria_engine::pipeline::SamplerState;
use myria_engine::render::{
    InterfaceDraw, InterfacePipelineConfig, InterfaceRenderer, InterfaceTexture, RenderCtx,
};
use myria_engine::window::{Runtime, RuntimeConfig};

use cli::Cli;
use scene::{demo_camera, QUAD_INDICES, QUAD_VERTICES};

/// GPU objects created on the first frame, once a device exists.
struct Resources {
    renderer: InterfaceRenderer,
    texture: InterfaceTexture,
}

impl Resources {
    fn create(
        ctx: &RenderCtx<'_>,
        pipeline: InterfacePipelineConfig,
        sampler: &SamplerState,
    ) -> Result<Self> {
        let mut renderer = InterfaceRenderer::new(ctx.device, pipeline);
        renderer.set_camera(demo_camera());
        let texture = InterfaceTexture::solid_white(ctx, renderer.texture_layout(), sampler)?;
        Ok(Self { renderer, texture })
    }
}

struct StudioApp {
    pipeline: InterfacePipelineConfig,
    sampler: SamplerState,
    resources: Option<Resources>,
}

impl StudioApp {
    fn new(cli: &Cli) -> Self {
        let mut pipeline = InterfacePipelineConfig::default();
        if cli.no_cull {
            pipeline.cull_mode = None;
        }
        let sampler = if cli.linear {
            SamplerState::linear_clamp()
        } else {
            SamplerState::nearest_clamp()
        };
        Self {
            pipeline,
            sampler,
            resources: None,
        }
    }
}

impl App for StudioApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.resources.is_none() {
            match Resources::create(&ctx.render_ctx(), self.pipeline, &self.sampler) {
                Ok(res) => self.resources = Some(res),
                Err(err) => {
                    log::error!("studio: failed to create render resources: {err:#}");
                    return AppControl::Exit;
                }
            }
        }
        let Some(Resources { renderer, texture }) = self.resources.as_mut() else {
            return AppControl::Exit;
        };

        ctx.render(wgpu::Color::BLACK, |rctx, target| {
            let draws = [InterfaceDraw {
                vertices: &QUAD_VERTICES,
                indices: &QUAD_INDICES,
                local: Mat4::IDENTITY,
                texture,
            }];
            renderer.render(rctx, target, &draws);
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log_filter.clone(),
        ..LoggingConfig::default()
    });

    anyhow::ensure!(cli.width > 0 && cli.height > 0, "window size must be non-zero");

    let config = RuntimeConfig {
        title: cli.title.clone(),
        initial_size: LogicalSize::new(f64::from(cli.width), f64::from(cli.height)),
        ..RuntimeConfig::default()
    };

    log::info!(
        "studio: {}x{} filter={} cull={}",
        cli.width,
        cli.height,
        if cli.linear { "linear" } else { "nearest" },
        if cli.no_cull { "none" } else { "back" },
    );

    Runtime::run(config, GpuInit::default(), StudioApp::new(&cli))
}
