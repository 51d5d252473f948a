//! Windowed scatter engine: scene, camera, lighting and the draw pass.

/// The engine's interactive vocabulary.
pub mod command;

use std::path::Path;
use std::sync::Arc;

use web_time::Duration;

use self::command::ScatterCommand;
use crate::assets::GltfSource;
use crate::camera::controller::CameraController;
use crate::error::ScatterError;
use crate::gpu::backend::ResourceSet;
use crate::gpu::lighting::Lighting;
use crate::gpu::render_context::RenderContext;
use crate::gpu::wgpu_backend::WgpuBackend;
use crate::input::{InputEvent, InputProcessor};
use crate::options::Options;
use crate::renderer::scatter_pass::{FrameBindings, PassLayouts, ScatterPass};
use crate::scene::ScatterScene;
use crate::util::frame_timing::FrameTiming;

/// Frame cap for the viewer loop.
const TARGET_FPS: u32 = 240;

/// Owns every GPU-side object and the scene they draw.
pub struct ScatterEngine {
    context: RenderContext,
    scene: ScatterScene<WgpuBackend>,
    camera: CameraController,
    lighting: Lighting,
    pass: ScatterPass,
    input: InputProcessor,
    /// Frame rate tracking.
    pub frame_timing: FrameTiming,
}

impl ScatterEngine {
    /// Create the engine on a window surface.
    ///
    /// # Errors
    ///
    /// Fails if the GPU cannot be initialized or the options are invalid.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, ScatterError> {
        let context = RenderContext::new(window, size).await?;
        Self::from_context(context, options)
    }

    /// Create the engine on an already initialized context.
    ///
    /// # Errors
    ///
    /// Fails if the options are invalid.
    pub fn from_context(context: RenderContext, options: Options) -> Result<Self, ScatterError> {
        options.validate()?;
        let backend = WgpuBackend::new(&context);
        let camera = CameraController::new(&context, &options.camera);
        let lighting = Lighting::new(&context, &options.lighting);
        let pass = ScatterPass::new(
            &context,
            &PassLayouts {
                camera: &camera.layout,
                material: backend.material_layout(),
                lighting: &lighting.layout,
            },
        );
        let input = InputProcessor::with_key_bindings(options.keybindings.clone());
        let source = Arc::new(GltfSource::new(options.assets.clone()));
        let scene = ScatterScene::new(backend, source, options)?;

        Ok(Self {
            context,
            scene,
            camera,
            lighting,
            pass,
            input,
            frame_timing: FrameTiming::new(TARGET_FPS),
        })
    }

    /// Current options.
    pub fn options(&self) -> &Options {
        self.scene.options()
    }

    /// The scene being drawn.
    pub fn scene(&self) -> &ScatterScene<WgpuBackend> {
        &self.scene
    }

    /// Replace the options; only what changed is rebuilt or re-uploaded.
    ///
    /// # Errors
    ///
    /// Invalid options are rejected and the engine is left unchanged.
    pub fn set_options(&mut self, options: Options) -> Result<(), ScatterError> {
        let old = self.scene.options().clone();
        self.scene.set_options(options)?;
        let new = self.scene.options();
        if new.lighting != old.lighting {
            self.lighting.apply(&self.context.queue, &new.lighting);
        }
        if new.camera != old.camera {
            self.camera.apply_options(&new.camera);
        }
        if new.keybindings != old.keybindings {
            self.input.set_key_bindings(new.keybindings.clone());
        }
        Ok(())
    }

    /// Apply one `section.field = value` edit from an options panel.
    ///
    /// # Errors
    ///
    /// Unknown fields, unrecognized names and out-of-range values.
    pub fn apply_edit(
        &mut self,
        section: &str,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), ScatterError> {
        let mut options = self.options().clone();
        options.apply_edit(section, field, value)?;
        self.set_options(options)
    }

    /// Load a TOML preset and apply it.
    ///
    /// # Errors
    ///
    /// Unreadable or invalid presets; the current options stay in place.
    pub fn load_preset(&mut self, path: &Path) -> Result<(), ScatterError> {
        let options = Options::load(path)?;
        self.set_options(options)?;
        log::info!("applied preset {}", path.display());
        Ok(())
    }

    /// Per-frame bookkeeping: pick up finished asset loads and upload the
    /// camera.
    pub fn update(&mut self) {
        let _ = self.scene.update();
        self.camera.update_gpu(&self.context.queue);
    }

    /// Whether the frame cap allows another frame yet.
    pub fn should_render(&self) -> bool {
        self.frame_timing.should_render()
    }

    /// Draw one frame.
    ///
    /// # Errors
    ///
    /// Swapchain acquisition failures that survived one reconfigure.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.acquire()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Scatter Encoder"),
                });

        let drawables: Vec<&ResourceSet<WgpuBackend>> = self
            .scene
            .surface_resources()
            .into_iter()
            .chain(self.scene.batch_resources())
            .collect();
        self.pass.render(
            &mut encoder,
            &view,
            &FrameBindings {
                camera: &self.camera.bind_group,
                lighting: &self.lighting.bind_group,
            },
            &drawables,
        );

        let _ = self.context.queue.submit([encoder.finish()]);
        frame.present();
        self.frame_timing.end_frame();
        self.report_performance();
        Ok(())
    }

    /// Resize the swapchain, depth target and camera aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.camera.resize(width, height);
        self.pass.resize(&self.context.device, width, height);
    }

    /// Feed a pointer event; returns `true` if it produced a command.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match self.input.handle_event(event) {
            Some(command) => {
                self.execute(command);
                true
            }
            None => false,
        }
    }

    /// Feed a key press (`KeyCode` debug string); returns `true` if bound.
    pub fn handle_key_press(&mut self, key: &str) -> bool {
        match self.input.handle_key_press(key) {
            Some(command) => {
                self.execute(command);
                true
            }
            None => false,
        }
    }

    /// Run one command.
    pub fn execute(&mut self, command: ScatterCommand) {
        match command {
            ScatterCommand::RotateCamera { delta } => self.camera.rotate(delta),
            ScatterCommand::PanCamera { delta } => self.camera.pan(delta),
            ScatterCommand::Zoom { delta } => self.camera.zoom(delta),
            ScatterCommand::ResetCamera => self.camera.reset(),
            ScatterCommand::Resample => self.scene.resample(),
            _ => {
                let Some(options) = command.edit_options(self.options()) else {
                    return;
                };
                if let Err(e) = self.set_options(options) {
                    log::warn!("{command:?} rejected: {e}");
                }
            }
        }
    }

    fn report_performance(&mut self) {
        let debug = &self.scene.options().debug;
        if !debug.show_performance {
            return;
        }
        let interval = Duration::from_secs_f32(debug.report_interval_secs.max(0.1));
        let Some(report) = self.frame_timing.take_report(interval) else {
            return;
        };
        let stats = self.scene.stats();
        log::info!(
            "{:.1} fps (worst frame {:.1} ms), {} instances, {} live GPU resources",
            report.fps,
            report.worst_frame.as_secs_f32() * 1000.0,
            self.scene.batch().map_or(0, |b| b.len()),
            stats.live()
        );
    }
}
