use anyhow::{Context, Result};
use ouroboros::self_referencing;
use std::collections::HashMap;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::{FrameClock, FrameTime};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "castle".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            resizable: true,
        }
    }
}

impl RuntimeConfig {
    pub fn new(title: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            title: title.into(),
            initial_size: LogicalSize::new(width, height),
            ..Self::default()
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn create_window(&mut self, config: RuntimeConfig) {
        self.commands.push(Command::CreateWindow(config));
    }

    pub fn close_window(&mut self, id: WindowId) {
        self.commands.push(Command::CloseWindow(id));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    fn exit_requested(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::Exit))
    }
}

enum Command {
    CreateWindow(RuntimeConfig),
    CloseWindow(WindowId),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the initial window and drives `app` until every window is
    /// closed or the app asks to exit.
    pub fn run<A: CoreApp>(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = LoopState::new(initial, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowSlot {
    clock: FrameClock,
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl WindowSlot {
    fn open(event_loop: &ActiveEventLoop, config: RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title)
            .with_inner_size(config.initial_size)
            .with_resizable(config.resizable);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        WindowSlotTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")
    }

    fn resize_to_window(&mut self) {
        let size = self.with_window(|w| w.inner_size());
        self.with_gpu_mut(|gpu| gpu.resize(size));
        self.with_window(|w| w.request_redraw());
    }
}

struct LoopState<A: CoreApp> {
    initial: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    windows: HashMap<WindowId, WindowSlot>,
    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<A: CoreApp> LoopState<A> {
    fn new(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            initial,
            gpu_init,
            app,
            windows: HashMap::new(),
            exit_requested: false,
            fatal: None,
        }
    }

    fn fail(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal.get_or_insert(err);
        self.exit_requested = true;
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop, config: RuntimeConfig) {
        match WindowSlot::open(event_loop, config, self.gpu_init.clone()) {
            Ok(slot) => {
                let id = slot.with_window(|w| {
                    w.request_redraw();
                    w.id()
                });
                log::debug!("window {id:?} opened");
                self.windows.insert(id, slot);
            }
            Err(e) => self.fail(e),
        }
    }

    fn close_window(&mut self, id: WindowId) {
        if self.windows.remove(&id).is_some() {
            log::debug!("window {id:?} closed");
        }
        if self.windows.is_empty() {
            self.exit_requested = true;
        }
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, ctx: RuntimeCtx) {
        for cmd in ctx.commands {
            match cmd {
                Command::CreateWindow(cfg) => self.open_window(event_loop, cfg),
                Command::CloseWindow(id) => self.close_window(id),
                Command::Exit => self.exit_requested = true,
            }
        }
    }

    /// Drives one frame of `window_id` and returns the commands it queued.
    fn redraw(&mut self, window_id: WindowId) -> RuntimeCtx {
        let mut runtime = RuntimeCtx::default();
        let Some(slot) = self.windows.get_mut(&window_id) else {
            return runtime;
        };

        let app = &mut self.app;
        let control = slot.with_mut(|fields| {
            let time: FrameTime = fields.clock.tick();
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: window_id,
                    window: fields.window,
                },
                gpu: fields.gpu,
                time,
                runtime: &mut runtime,
            };
            app.on_frame(&mut ctx)
        });

        if control == AppControl::Exit && !runtime.exit_requested() {
            runtime.exit();
        }
        runtime
    }
}

impl<A: CoreApp> ApplicationHandler for LoopState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.windows.is_empty() {
            let initial = self.initial.clone();
            self.open_window(event_loop, initial);
        } else {
            // Time spent suspended is not frame time.
            for slot in self.windows.values_mut() {
                slot.with_clock_mut(FrameClock::reset);
            }
        }
        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Layers animate: redraw continuously.
        event_loop.set_control_flow(ControlFlow::Poll);
        for slot in self.windows.values() {
            slot.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if !self.windows.contains_key(&window_id) {
            return;
        }

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.exit_requested = true;
        } else {
            match event {
                WindowEvent::CloseRequested => self.close_window(window_id),
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    if let Some(slot) = self.windows.get_mut(&window_id) {
                        slot.resize_to_window();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let commands = self.redraw(window_id);
                    self.apply_commands(event_loop, commands);
                }
                _ => {}
            }
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}
