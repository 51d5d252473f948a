//! Sampled 2D textures decoded from image files.

use std::fmt;
use std::path::{Path, PathBuf};

/// Errors from reading a texture image.
#[derive(Debug)]
pub enum TextureError {
    /// The file could not be opened or decoded.
    Decode {
        /// Image that failed.
        path: PathBuf,
        /// Underlying decoder error.
        source: image::ImageError,
    },
    /// The image has a zero dimension.
    Empty(PathBuf),
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { path, source } => {
                write!(f, "cannot decode {}: {source}", path.display())
            }
            Self::Empty(path) => write!(f, "{} is empty", path.display()),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
            Self::Empty(_) => None,
        }
    }
}

/// Decode an image file to tightly packed RGBA8.
pub fn load_rgba(path: &Path) -> Result<image::RgbaImage, TextureError> {
    let image = image::open(path)
        .map_err(|source| TextureError::Decode {
            path: path.to_owned(),
            source,
        })?
        .to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(TextureError::Empty(path.to_owned()));
    }
    Ok(image)
}

/// A sampled GPU texture and its default view.
pub struct Texture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Upload RGBA8 pixels. `srgb` selects colour (sRGB) versus data
    /// (linear) interpretation.
    #[must_use]
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        (width, height): (u32, u32),
        pixels: &[u8],
        srgb: bool,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let format = if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Decode and upload an image file.
    pub fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        srgb: bool,
    ) -> Result<Self, TextureError> {
        let image = load_rgba(path)?;
        let label = path.display().to_string();
        Ok(Self::from_rgba(
            device,
            queue,
            &label,
            image.dimensions(),
            image.as_raw(),
            srgb,
        ))
    }

    /// 1×1 texture of a single colour.
    #[must_use]
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        rgba: [u8; 4],
        srgb: bool,
    ) -> Self {
        Self::from_rgba(device, queue, label, (1, 1), &rgba, srgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_to_rgba() {
        let dir = std::env::temp_dir().join(format!("strew-tex-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("checker.png");
        let img = image::RgbImage::from_fn(4, 2, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        });
        img.save(&path).unwrap();

        let rgba = load_rgba(&path).unwrap();
        assert_eq!(rgba.dimensions(), (4, 2));
        assert_eq!(rgba.as_raw().len(), 4 * 2 * 4);
        assert_eq!(rgba.get_pixel(1, 0).0, [0, 0, 0, 255]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_decode_error() {
        let err = load_rgba(Path::new("/nonexistent/strew/diff.jpg")).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
        assert!(err.to_string().contains("diff.jpg"));
    }
}
