use std::fmt;

/// Why the window's GPU context could not be brought up.
#[derive(Debug)]
pub enum RenderContextError {
    /// The window handle cannot back a wgpu surface.
    NoSurface(wgpu::CreateSurfaceError),
    /// No adapter can present to the window.
    NoAdapter(wgpu::RequestAdapterError),
    /// The adapter refused to open a device.
    NoDevice(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    NoSurfaceFormat,
}

impl fmt::Display for RenderContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSurface(e) => write!(f, "window cannot be drawn to: {e}"),
            Self::NoAdapter(e) => write!(f, "no GPU can present to the window: {e}"),
            Self::NoDevice(e) => write!(f, "GPU device unavailable: {e}"),
            Self::NoSurfaceFormat => f.write_str("window surface offers no texture format"),
        }
    }
}

impl std::error::Error for RenderContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoSurface(e) => Some(e),
            Self::NoAdapter(e) => Some(e),
            Self::NoDevice(e) => Some(e),
            Self::NoSurfaceFormat => None,
        }
    }
}

/// Device, queue and swapchain of the viewer window.
///
/// Everything else (backend, passes, camera, lighting) borrows the device
/// and queue from here; the swapchain itself stays private.
pub struct RenderContext {
    /// Logical device every resource is created on.
    pub device: wgpu::Device,
    /// Queue for uploads and submissions.
    pub queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl RenderContext {
    /// Open the GPU for `window` at `(width, height)` physical pixels.
    ///
    /// # Errors
    ///
    /// See [`RenderContextError`].
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        (width, height): (u32, u32),
    ) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(RenderContextError::NoSurface)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(RenderContextError::NoAdapter)?;
        let info = adapter.get_info();
        log::info!("rendering on {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("strew device"),
                ..Default::default()
            })
            .await
            .map_err(RenderContextError::NoDevice)?;

        let config = swapchain_config(&surface.get_capabilities(&adapter), width, height)
            .ok_or(RenderContextError::NoSurfaceFormat)?;
        log::debug!("swapchain {:?} {}x{}", config.format, config.width, config.height);
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            surface,
            config,
        })
    }

    /// Swapchain texture format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Swapchain size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Resize the swapchain; zero-sized (minimized) windows are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Next swapchain image. A lost or outdated swapchain is reconfigured
    /// and acquisition retried once.
    ///
    /// # Errors
    ///
    /// Whatever the retry (or a non-recoverable first attempt) reports.
    pub fn acquire(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        match self.surface.get_current_texture() {
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("swapchain out of date; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.surface.get_current_texture()
            }
            other => other,
        }
    }
}

/// Swapchain settings for a surface: an sRGB format when offered (the
/// shader writes linear colour), vsync, and a size of at least 1×1.
fn swapchain_config(
    caps: &wgpu::SurfaceCapabilities,
    width: u32,
    height: u32,
) -> Option<wgpu::SurfaceConfiguration> {
    let format = caps
        .formats
        .iter()
        .copied()
        .find(wgpu::TextureFormat::is_srgb)
        .or_else(|| caps.formats.first().copied())?;
    Some(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        desired_maximum_frame_latency: 2,
        alpha_mode: caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use wgpu::TextureFormat;

    use super::*;

    fn caps(formats: &[TextureFormat]) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            present_modes: vec![wgpu::PresentMode::Fifo],
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            usages: wgpu::TextureUsages::RENDER_ATTACHMENT,
        }
    }

    #[test]
    fn srgb_format_is_preferred() {
        let config = swapchain_config(
            &caps(&[TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb]),
            800,
            600,
        )
        .unwrap();
        assert_eq!(config.format, TextureFormat::Bgra8UnormSrgb);
        assert_eq!(config.alpha_mode, wgpu::CompositeAlphaMode::Opaque);
        assert_eq!((config.width, config.height), (800, 600));
    }

    #[test]
    fn linear_only_surface_uses_first_format() {
        let config =
            swapchain_config(&caps(&[TextureFormat::Rgba16Float, TextureFormat::Bgra8Unorm]), 0, 0)
                .unwrap();
        assert_eq!(config.format, TextureFormat::Rgba16Float);
        assert_eq!((config.width, config.height), (1, 1));
    }

    #[test]
    fn surface_without_formats_is_rejected() {
        assert!(swapchain_config(&caps(&[]), 640, 480).is_none());
    }
}
