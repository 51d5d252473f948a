use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::gpu::render_context::RenderContext;
use crate::options::LightingOptions;

/// Sun and sky parameters shared by every draw.
/// NOTE: Must match WGSL struct layout exactly (48 bytes)
///
/// WGSL layout:
///   sun_dir: vec3<f32>        (offset 0,  align 16)
///   sun_intensity: f32        (offset 12)
///   sky_color: vec3<f32>      (offset 16, align 16)
///   ambient: f32              (offset 28)
///   exposure: f32             (offset 32)
///   _pad0.._pad2: f32         (offset 36..48)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    /// Unit vector pointing from the surface toward the sun.
    pub sun_dir: [f32; 3],
    /// Sun radiance multiplier.
    pub sun_intensity: f32,
    /// Hemisphere ambient tint.
    pub sky_color: [f32; 3],
    /// Ambient strength.
    pub ambient: f32,
    /// Exposure applied before tone mapping.
    pub exposure: f32,
    /// Padding to 48 bytes.
    pub _pad0: f32,
    /// Padding.
    pub _pad1: f32,
    /// Padding.
    pub _pad2: f32,
}

impl LightingUniform {
    /// Derive the uniform from panel options. A degenerate sun position
    /// falls back to straight overhead.
    #[must_use]
    pub fn from_options(options: &LightingOptions) -> Self {
        let sun_dir = Vec3::from(options.sun_position)
            .try_normalize()
            .unwrap_or(Vec3::Y);
        Self {
            sun_dir: sun_dir.to_array(),
            sun_intensity: options.sun_intensity,
            sky_color: options.sky_color,
            ambient: options.ambient,
            exposure: options.exposure,
            _pad0: 0.0,
            _pad1: 0.0,
            _pad2: 0.0,
        }
    }
}

impl Default for LightingUniform {
    fn default() -> Self {
        Self::from_options(&LightingOptions::default())
    }
}

/// Lighting uniform buffer and its bind group (group 2).
pub struct Lighting {
    /// CPU copy of the uploaded values.
    pub uniform: LightingUniform,
    /// GPU copy of `uniform`.
    pub buffer: wgpu::Buffer,
    /// Layout of group 2.
    pub layout: wgpu::BindGroupLayout,
    /// Group 2 bound by every draw.
    pub bind_group: wgpu::BindGroup,
}

impl Lighting {
    /// Allocate and fill the uniform from `options`.
    pub fn new(context: &RenderContext, options: &LightingOptions) -> Self {
        let uniform = LightingUniform::from_options(options);

        let buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lighting Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let layout = context
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Lighting Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
                label: Some("Lighting Bind Group"),
            });

        Self {
            uniform,
            buffer,
            layout,
            bind_group,
        }
    }

    /// Apply new options and upload.
    pub fn apply(&mut self, queue: &wgpu::Queue, options: &LightingOptions) {
        self.uniform = LightingUniform::from_options(options);
        self.update_gpu(queue);
    }

    /// Upload the CPU copy.
    pub fn update_gpu(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
