use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use seascape_assets::{Scene, load_scene, primitives};
use seascape_common::{Color, MeshHandle, Sampler, ShaderHandle};
use seascape_input::{InputEvent, Key, RotationRates};
use seascape_kernel::{FrameClock, SceneConfig, SceneState};
use seascape_particles::{ParticleSystem, ParticleSystemConfig};
use seascape_render::{FrameRenderer, FrameView, MeshDraw};
use seascape_render_wgpu::WgpuRenderer;
use seascape_water::WaterField;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const WINDOW_SIZE: PhysicalSize<u32> = PhysicalSize::new(1280, 720);

#[derive(Parser)]
#[command(name = "seascape-desktop", about = "Ship on animated water")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Wavefront OBJ scene to load
    #[arg(long, default_value = "statek.obj")]
    scene: PathBuf,

    /// Seed for the smoke emitter; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn arrow_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        _ => None,
    }
}

/// Simulation state, created once the renderer can take mesh uploads.
struct AppState {
    scene: SceneState,
    rates: RotationRates,
    clock: FrameClock,
    water: WaterField,
    smoke: ParticleSystem,
    /// Scene meshes by name, with the program each is drawn with.
    meshes: Vec<(String, MeshHandle, ShaderHandle)>,
    last_dt: f32,
    show_stats: bool,
}

impl AppState {
    fn new(
        scene: &Scene,
        seed: Option<u64>,
        renderer: &mut WgpuRenderer,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Self> {
        let meshes = scene
            .meshes
            .iter()
            .map(|mesh| {
                let (handle, shader) = match mesh.material.load_textures() {
                    Some(textures) => (
                        renderer.upload_mesh(device, queue, mesh, Color::WHITE, Some(&textures)),
                        ShaderHandle::LAMBERT_TEXTURED,
                    ),
                    None => (
                        renderer.upload_mesh(device, queue, mesh, mesh.material.base_color, None),
                        ShaderHandle::LAMBERT,
                    ),
                };
                (mesh.name.clone(), handle, shader)
            })
            .collect();

        let config = SceneConfig::default();
        let puff = primitives::cube("smoke", 0.12);
        let puff = renderer.upload_mesh(device, queue, &puff, Color::SMOKE, None);
        let sampler = match seed {
            Some(seed) => Sampler::seeded(seed),
            None => Sampler::from_entropy(),
        };
        let smoke = ParticleSystem::new(
            ParticleSystemConfig::smoke(config.chimney, puff, ShaderHandle::LAMBERT),
            sampler,
        )
        .context("smoke emitter configuration")?;

        let water = WaterField::standard()
            .context("water grid")?
            .with_color(Color::WATER);

        Ok(Self {
            scene: SceneState::new(config),
            rates: RotationRates::default(),
            clock: FrameClock::new(),
            water,
            smoke,
            meshes,
            last_dt: 0.0,
            show_stats: true,
        })
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        if let Some(key) = arrow_key(code) {
            let event = if pressed {
                InputEvent::pressed(key)
            } else {
                InputEvent::released(key)
            };
            self.rates = self.rates.apply(event);
        } else if code == KeyCode::F1 && pressed {
            self.show_stats = !self.show_stats;
        }
    }

    /// Advance one frame and issue its draws.
    fn frame<R: FrameRenderer>(&mut self, aspect: f32, renderer: &mut R) {
        let dt = self.clock.tick();
        self.last_dt = dt;
        self.scene.advance(dt, self.rates);

        let camera = self.scene.camera(aspect);
        renderer.begin_frame(FrameView {
            projection: camera.projection_matrix(),
            view: camera.view_matrix(),
        });

        self.water
            .draw(self.scene.phase(), self.scene.water_model(), renderer);
        for (name, mesh, shader) in &self.meshes {
            renderer.draw_mesh(MeshDraw {
                shader: *shader,
                mesh: *mesh,
                model: self.scene.mesh_model(name),
            });
        }
        self.smoke.update(dt, self.scene.root_model(), renderer);
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_stats {
            return;
        }
        egui::Window::new("Seascape")
            .default_width(220.0)
            .show(ctx, |ui| {
                let fps = if self.last_dt > 0.0 {
                    1.0 / self.last_dt
                } else {
                    0.0
                };
                ui.label(format!("Frame: {:.1} ms ({fps:.0} fps)", self.last_dt * 1000.0));
                ui.label(format!("Time: {:.2} s", self.scene.time()));
                ui.label(format!("Phase: {:.2}", self.scene.phase()));
                let turning = if self.rates.is_idle() { "" } else { " (turning)" };
                ui.label(format!(
                    "Pitch: {:.2}  Yaw: {:.2}{turning}",
                    self.scene.pitch(),
                    self.scene.yaw()
                ));
                ui.label(format!("Wheel: {:.2} rad", self.scene.wheel_angle()));
                ui.separator();
                ui.label(format!("Meshes: {}", self.meshes.len()));
                ui.label(format!("Particles: {}", self.smoke.len()));
                ui.label(format!("Water corners: {}", self.water.corner_count()));
                ui.separator();
                ui.small("Arrows: rotate | F1: toggle stats");
            });
    }
}

/// Window and GPU resources, created on the first resume.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Seascape")
            .with_inner_size(WINDOW_SIZE);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("seascape_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        renderer.set_clear_color(Color::SKY);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Draw the egui overlay on top of the frame in `view`.
    fn render_overlay(&mut self, egui_ctx: &EguiContext, state: &mut AppState, view: &wgpu::TextureView) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    fn redraw(&mut self, egui_ctx: &EguiContext, state: &mut AppState) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        state.frame(self.aspect(), &mut self.renderer);
        self.renderer.render(&self.device, &self.queue, &view);
        self.render_overlay(egui_ctx, state, &view);

        output.present();
        self.window.request_redraw();
    }
}

struct GpuApp {
    scene: Scene,
    seed: Option<u64>,
    state: Option<AppState>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    init_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(scene: Scene, seed: Option<u64>) -> Self {
        Self {
            scene,
            seed,
            state: None,
            gpu: None,
            egui_ctx: EguiContext::default(),
            init_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut gpu = Gpu::new(event_loop, &self.egui_ctx)?;
        let state = AppState::new(&self.scene, self.seed, &mut gpu.renderer, &gpu.device, &gpu.queue)?;
        self.gpu = Some(gpu);
        self.state = Some(state);
        Ok(())
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("initialization failed: {e:#}");
            self.init_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(gpu), Some(state)) = (self.gpu.as_mut(), self.state.as_mut()) else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    event_loop.exit();
                } else {
                    state.handle_key(key, key_state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                gpu.redraw(&self.egui_ctx, state);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("seascape-desktop starting");

    let scene = match load_scene(&cli.scene) {
        Ok(scene) => scene,
        Err(e) => {
            tracing::error!("failed to load scene {}: {e}", cli.scene.display());
            Scene::default()
        }
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(scene, cli.seed);
    event_loop.run_app(&mut app)?;

    match app.init_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
