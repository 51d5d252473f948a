//! Standalone scatter window backed by winit.
//!
//! ```no_run
//! # use strew::Viewer;
//! Viewer::builder()
//!     .with_preset("assets/presets/meadow.toml")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::error::ScatterError;
use crate::input::event::key_press;
use crate::options::Options;
use crate::{InputEvent, ScatterEngine};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    preset: Option<PathBuf>,
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    /// Create a builder with sensible defaults (title "strew", default
    /// options).
    fn new() -> Self {
        Self {
            preset: None,
            options: None,
            title: "strew".into(),
        }
    }

    /// Load options from a TOML preset when the window opens.
    #[must_use]
    pub fn with_preset(mut self, path: impl Into<PathBuf>) -> Self {
        self.preset = Some(path.into());
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            preset: self.preset,
            options: self.options,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that displays the scatter scene.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    preset: Option<PathBuf>,
    options: Option<Options>,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Event loop creation or run failures, and an unreadable preset.
    pub fn run(self) -> Result<(), ScatterError> {
        let options = match (&self.preset, self.options) {
            (Some(path), _) => {
                let options = Options::load(path)?;
                log::info!("loaded preset {}", path.display());
                options
            }
            (None, options) => options.unwrap_or_default(),
        };

        let event_loop =
            EventLoop::new().map_err(|e| ScatterError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            options: Some(options),
            title: self.title,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| ScatterError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<ScatterEngine>,
    options: Option<Options>,
    title: String,
}

fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    fn redraw(&mut self) {
        let (Some(window), Some(engine)) = (&self.window, &mut self.engine) else {
            return;
        };
        if engine.should_render() {
            engine.update();
            match engine.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Timeout) => log::debug!("swapchain timeout; frame skipped"),
                Err(e) => log::error!("render error: {e}"),
            }
        }
        window.request_redraw();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (f64::from(mon_size.width) / scale * 0.75) as u32;
            let logical_h = (f64::from(mon_size.height) / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(logical_w, logical_h))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let options = self.options.take().unwrap_or_default();
        let size = viewport_size(window.inner_size());
        let engine = match pollster::block_on(ScatterEngine::new(window.clone(), size, options)) {
            Ok(e) => e,
            Err(e) => {
                log::error!("Failed to initialize engine: {e}");
                event_loop.exit();
                return;
            }
        };

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        if matches!(event, WindowEvent::RedrawRequested) {
            self.redraw();
            return;
        }

        let Some(engine) = &mut self.engine else {
            return;
        };

        match &event {
            WindowEvent::Resized(size) => {
                let (w, h) = viewport_size(*size);
                engine.resize(w, h);
            }
            WindowEvent::KeyboardInput { event: key, .. } => {
                let Some(key) = key_press(key) else {
                    return;
                };
                if !engine.handle_key_press(&key) {
                    log::trace!("unbound key {key}");
                }
            }
            other => {
                if let Some(input) = InputEvent::from_window_event(other) {
                    let _ = engine.handle_input(input);
                }
            }
        }
    }
}
