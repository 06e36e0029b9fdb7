use anyhow::Result;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use castle_engine::core::{App, AppControl, FrameCtx};
use castle_engine::device::GpuInit;
use castle_engine::logging::{init_logging, LoggingConfig};
use castle_engine::paint::paint_grid;
use castle_engine::render::RenderCtx;
use castle_engine::time::FpsTimer;
use castle_engine::window::{Runtime, RuntimeConfig};
use castle_engine::{
    Canvas, Color, Engine, EngineConfig, Layer, Palette, ShaderKind, ShaderMode,
    ShaderUniforms, Sprite, SpriteFrame,
};

const WORLD: u32 = 540;
const CELL: i32 = 6;

/// Ground, walls and drifting clouds, bottom to top.
struct Scene {
    grass: Layer,
    walls: Layer,
    clouds: Layer,
    banner: Sprite,
}

impl Scene {
    fn build(engine: &Engine, ctx: &RenderCtx<'_>) -> castle_engine::RenderResult<Self> {
        let mut grass = engine.create_cpu_layer(ctx, WORLD, WORLD, "grass")?;
        paint_grid(
            &mut grass,
            engine.colors(),
            0,
            0,
            WORLD as i32 - 1,
            WORLD as i32 - 1,
            CELL,
            (0, 0),
            Palette::Grass,
        );

        let walls = engine.create_gpu_layer(ctx, WORLD, WORLD, "walls")?;

        let mut clouds = engine.create_cpu_layer(ctx, WORLD, WORLD, "clouds")?;
        let glow = engine.load_shader(ctx, ShaderKind::Glow, None)?;
        clouds.attach_shader(
            glow,
            ShaderMode::BakeOnDirty,
            ShaderUniforms::new(0.6).with_radius(2.0),
        );

        Ok(Self {
            grass,
            walls,
            clouds,
            banner: banner_sprite()?,
        })
    }

    /// Redraws the walls through a recording on the GPU layer.
    fn draw_walls(
        &mut self,
        engine: &mut Engine,
        ctx: &RenderCtx<'_>,
        tick: u64,
    ) -> castle_engine::RenderResult<()> {
        let mut rec = engine.begin_recording(ctx, &mut self.walls)?;
        rec.clear(Color::TRANSPARENT);

        let stone = Color::rgb(112, 112, 120);
        for i in 0..6 {
            let x = 40 + i * 80;
            rec.fill_rect(x, 60, x + 39, 99, stone);
            rec.fill_rect(x, 440, x + 39, 479, stone);
        }
        rec.fill_rect(40, 100, 59, 439, stone);
        rec.fill_rect(480, 100, 499, 439, stone);

        let frame = SpriteFrame::strip(8, (tick % 4) as u32);
        self.banner.draw_to(&mut rec, 254, 254, 4, Color::WHITE, frame);

        rec.end()
    }

    /// Moves the clouds; each move marks the glow for a rebake.
    fn drift_clouds(&mut self, engine: &Engine, tick: u64) {
        self.clouds.clear(Color::TRANSPARENT);
        let shift = (tick % WORLD as u64) as i32;
        for (i, y) in [80, 210, 350].into_iter().enumerate() {
            let x = (shift * (i as i32 + 1)) % WORLD as i32 - 60;
            paint_grid(
                &mut self.clouds,
                engine.colors(),
                x,
                y,
                x + 119,
                y + 35,
                CELL,
                (shift, 0),
                Palette::Cloud,
            );
        }
    }
}

/// Four 8-pixel frames of a flag, side by side.
fn banner_sprite() -> castle_engine::RenderResult<Sprite> {
    let (w, h) = (32u32, 8u32);
    let mut pixels = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let frame = x / 8;
            let wave = (x % 8 + frame) % 4 == 0;
            let c = match (y, wave) {
                (0, _) | (7, _) => Color::TRANSPARENT,
                (_, true) => Color::rgb(200, 40, 40),
                _ => Color::rgb(240, 200, 60),
            };
            pixels.extend_from_slice(&c.to_bytes());
        }
    }
    Sprite::from_rgba(w, h, pixels)
}

struct Demo {
    engine: Engine,
    scene: Option<Scene>,
    timer: FpsTimer,
    tick: u64,
}

impl Demo {
    fn new() -> Self {
        Self {
            engine: Engine::new(EngineConfig::default().with_seed(7)),
            scene: None,
            timer: FpsTimer::new(30.0),
            tick: 0,
        }
    }
}

impl App for Demo {
    fn on_window_event(&mut self, _id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Self { engine, scene, timer, tick } = self;

        if scene.is_none() {
            match Scene::build(engine, &ctx.render_ctx()) {
                Ok(s) => *scene = Some(s),
                Err(e) => {
                    log::error!("failed to build scene: {e}");
                    return AppControl::Exit;
                }
            }
        }
        let Some(scene) = scene.as_mut() else {
            return AppControl::Exit;
        };

        if timer.should_update() {
            *tick += 1;
            scene.drift_clouds(engine, *tick);
            if let Err(e) = scene.draw_walls(engine, &ctx.render_ctx(), *tick) {
                log::warn!("wall recording failed: {e}");
            }
            if *tick % 60 == 0 {
                log::info!("fps {:.1} (frame {})", timer.fps(), ctx.time.frame_index);
            }
        }

        let Scene { grass, walls, clouds, .. } = scene;
        ctx.render(Color::BLACK, |rctx, target| {
            let stats = engine.render_pie(rctx, target, &mut [grass, walls, clouds]);
            if stats.chunks_deferred > 0 {
                log::debug!("{} chunks deferred to next frame", stats.chunks_deferred);
            }
        })
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig::new("castle", WORLD as f64, WORLD as f64),
        GpuInit::default(),
        Demo::new(),
    )
}
