//! [`RenderBackend`] on top of wgpu.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use super::backend::{MaterialDesc, RenderBackend, ResourceStats};
use super::render_context::RenderContext;
use super::texture::Texture;
use crate::instancing::InstanceRaw;
use crate::surface::MeshData;

/// Material parameters as seen by the fragment shader.
/// NOTE: Must match WGSL `MaterialUniform` (32 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Linear RGBA base colour.
    pub base_color: [f32; 4],
    /// Roughness multiplier.
    pub roughness: f32,
    /// 1 when the image maps carry real data, 0 for flat colour.
    pub textured: u32,
    /// Padding to 32 bytes.
    pub _pad: [f32; 2],
}

impl From<&MaterialDesc> for MaterialUniform {
    fn from(desc: &MaterialDesc) -> Self {
        Self {
            base_color: desc.base_color,
            roughness: desc.roughness,
            textured: u32::from(desc.textures.is_some()),
            _pad: [0.0; 2],
        }
    }
}

/// Uploaded geometry.
pub struct GpuMesh {
    /// Interleaved [`MeshVertex`](crate::surface::MeshVertex) data.
    pub vertex_buffer: wgpu::Buffer,
    /// `u32` triangle indices.
    pub index_buffer: wgpu::Buffer,
}

/// Uploaded material (group 1).
pub struct GpuMaterial {
    /// Bind group with uniform, four maps and sampler.
    pub bind_group: wgpu::BindGroup,
    /// Selects the no-cull pipeline.
    pub double_sided: bool,
    uniform: wgpu::Buffer,
}

/// Uploaded per-instance transforms.
pub struct GpuInstances {
    /// [`InstanceRaw`] array.
    pub buffer: wgpu::Buffer,
}

/// Neutral maps used when a material has no textures or a file fails.
struct Fallbacks {
    white_srgb: Arc<Texture>,
    white: Arc<Texture>,
    flat_normal: Arc<Texture>,
}

/// Allocates meshes, materials and instance buffers on a wgpu device.
///
/// Decoded textures are cached by path for the lifetime of the backend,
/// since every surface rebuild reuses the same maps.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: FxHashMap<(PathBuf, bool), Arc<Texture>>,
    fallbacks: Fallbacks,
    stats: ResourceStats,
}

impl WgpuBackend {
    /// Backend sharing the context's device and queue.
    pub fn new(context: &RenderContext) -> Self {
        let device = context.device.clone();
        let queue = context.queue.clone();

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Bind Group Layout"),
                entries: &[
                    // Binding 0: material uniform
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // Bindings 1-4: diffuse, normal, roughness, occlusion
                    texture_entry(1),
                    texture_entry(2),
                    texture_entry(3),
                    texture_entry(4),
                    wgpu::BindGroupLayoutEntry {
                        binding: 5,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(
                            wgpu::SamplerBindingType::Filtering,
                        ),
                        count: None,
                    },
                ],
            });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let fallbacks = Fallbacks {
            white_srgb: Arc::new(Texture::solid(
                &device,
                &queue,
                "Fallback Diffuse",
                [255; 4],
                true,
            )),
            white: Arc::new(Texture::solid(
                &device,
                &queue,
                "Fallback Data",
                [255; 4],
                false,
            )),
            flat_normal: Arc::new(Texture::solid(
                &device,
                &queue,
                "Fallback Normal",
                [128, 128, 255, 255],
                false,
            )),
        };

        Self {
            device,
            queue,
            material_layout,
            sampler,
            textures: FxHashMap::default(),
            fallbacks,
            stats: ResourceStats::default(),
        }
    }

    /// Layout of group 1, needed to build the pipeline.
    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    /// Number of distinct image files decoded so far.
    pub fn cached_textures(&self) -> usize {
        self.textures.len()
    }

    fn texture(&mut self, path: &Path, srgb: bool, fallback: &Arc<Texture>) -> Arc<Texture> {
        let key = (path.to_owned(), srgb);
        if let Some(tex) = self.textures.get(&key) {
            return Arc::clone(tex);
        }
        match Texture::from_file(&self.device, &self.queue, path, srgb) {
            Ok(tex) => {
                log::debug!("decoded texture {}", path.display());
                let tex = Arc::new(tex);
                let _ = self.textures.insert(key, Arc::clone(&tex));
                tex
            }
            Err(e) => {
                log::warn!("{e}; using a neutral texture");
                // Cache the fallback so a missing file is reported once.
                let _ = self.textures.insert(key, Arc::clone(fallback));
                Arc::clone(fallback)
            }
        }
    }
}

impl RenderBackend for WgpuBackend {
    type Mesh = GpuMesh;
    type Material = GpuMaterial;
    type Instances = GpuInstances;

    fn create_mesh(&mut self, label: &str, mesh: &MeshData) -> GpuMesh {
        let vertices = mesh.vertices();
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertices")),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Indices")),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.stats.meshes += 1;
        self.stats.created += 1;
        GpuMesh {
            vertex_buffer,
            index_buffer,
        }
    }

    fn create_material(&mut self, label: &str, desc: &MaterialDesc) -> GpuMaterial {
        let white_srgb = Arc::clone(&self.fallbacks.white_srgb);
        let white = Arc::clone(&self.fallbacks.white);
        let flat_normal = Arc::clone(&self.fallbacks.flat_normal);
        let [diffuse, normal, roughness, occlusion] = match &desc.textures {
            Some(maps) => [
                self.texture(&maps.diffuse, true, &white_srgb),
                self.texture(&maps.normal, false, &flat_normal),
                self.texture(&maps.roughness, false, &white),
                self.texture(&maps.ambient_occlusion, false, &white),
            ],
            None => [white_srgb, flat_normal, Arc::clone(&white), white],
        };

        let uniform = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Material")),
                contents: bytemuck::cast_slice(&[MaterialUniform::from(desc)]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Material Bind Group")),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&roughness.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&occlusion.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.stats.materials += 1;
        self.stats.created += 1;
        GpuMaterial {
            bind_group,
            double_sided: desc.double_sided,
            uniform,
        }
    }

    fn create_instances(&mut self, label: &str, instances: &[InstanceRaw]) -> GpuInstances {
        // wgpu rejects zero-sized vertex buffers in some backends.
        let contents: &[InstanceRaw] = if instances.is_empty() {
            &[InstanceRaw::IDENTITY]
        } else {
            instances
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Instances")),
                contents: bytemuck::cast_slice(contents),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.stats.instance_buffers += 1;
        self.stats.created += 1;
        GpuInstances { buffer }
    }

    fn release_mesh(&mut self, mesh: GpuMesh) {
        mesh.vertex_buffer.destroy();
        mesh.index_buffer.destroy();
        self.stats.meshes = self.stats.meshes.saturating_sub(1);
        self.stats.released += 1;
    }

    fn release_material(&mut self, material: GpuMaterial) {
        material.uniform.destroy();
        drop(material.bind_group);
        self.stats.materials = self.stats.materials.saturating_sub(1);
        self.stats.released += 1;
    }

    fn release_instances(&mut self, instances: GpuInstances) {
        instances.buffer.destroy();
        self.stats.instance_buffers = self.stats.instance_buffers.saturating_sub(1);
        self.stats.released += 1;
    }

    fn stats(&self) -> ResourceStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_uniform_layout() {
        assert_eq!(size_of::<MaterialUniform>(), 32);
        let flat = MaterialUniform::from(&MaterialDesc::default());
        assert_eq!(flat.textured, 0);
        let textured = MaterialUniform::from(&MaterialDesc {
            textures: Some(crate::options::TextureMaps::default()),
            ..MaterialDesc::default()
        });
        assert_eq!(textured.textured, 1);
    }
}
