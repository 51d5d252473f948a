//! Allocation seam between the scene and the graphics API.
//!
//! [`ScatterScene`](crate::scene::ScatterScene) never talks to wgpu
//! directly; it creates and releases resources through a [`RenderBackend`].
//! [`WgpuBackend`](super::wgpu_backend::WgpuBackend) is the real one,
//! [`HeadlessBackend`] only counts, which is enough to check that
//! rebuilding never leaks.

use rustc_hash::FxHashSet;

use crate::instancing::InstanceRaw;
use crate::options::TextureMaps;
use crate::surface::MeshData;

/// Flat material parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    /// Linear RGBA base colour, multiplied with the diffuse map.
    pub base_color: [f32; 4],
    /// Perceptual roughness, multiplied with the roughness map.
    pub roughness: f32,
    /// Disable back-face culling.
    pub double_sided: bool,
    /// Image maps (absolute paths); `None` means untextured.
    pub textures: Option<TextureMaps>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            base_color: [1.0; 4],
            roughness: 1.0,
            double_sided: false,
            textures: None,
        }
    }
}

/// Live resource counts reported by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    /// Live vertex/index buffer pairs.
    pub meshes: usize,
    /// Live material bind groups.
    pub materials: usize,
    /// Live instance buffers.
    pub instance_buffers: usize,
    /// Total resources created since start-up.
    pub created: usize,
    /// Total resources released since start-up.
    pub released: usize,
}

impl ResourceStats {
    /// Resources currently alive.
    #[must_use]
    pub fn live(&self) -> usize {
        self.meshes + self.materials + self.instance_buffers
    }
}

/// Creates and releases the three kinds of resource a drawable needs.
///
/// Handles are plain values; a released handle must not be used again.
pub trait RenderBackend {
    /// Uploaded geometry.
    type Mesh;
    /// Uploaded material.
    type Material;
    /// Uploaded per-instance transforms.
    type Instances;

    /// Upload `mesh`.
    fn create_mesh(&mut self, label: &str, mesh: &MeshData) -> Self::Mesh;
    /// Upload a material.
    fn create_material(&mut self, label: &str, desc: &MaterialDesc) -> Self::Material;
    /// Upload instance transforms.
    fn create_instances(&mut self, label: &str, instances: &[InstanceRaw]) -> Self::Instances;

    /// Free geometry.
    fn release_mesh(&mut self, mesh: Self::Mesh);
    /// Free a material.
    fn release_material(&mut self, material: Self::Material);
    /// Free instance transforms.
    fn release_instances(&mut self, instances: Self::Instances);

    /// Current counts.
    fn stats(&self) -> ResourceStats;
}

/// Everything one drawable owns on the GPU.
pub struct ResourceSet<B: RenderBackend> {
    /// Geometry.
    pub mesh: B::Mesh,
    /// Material.
    pub material: B::Material,
    /// Instance transforms (a single identity for the surface).
    pub instances: B::Instances,
    /// Number of instances to draw.
    pub instance_count: u32,
    /// Number of indices to draw.
    pub index_count: u32,
}

impl<B: RenderBackend> ResourceSet<B> {
    /// Upload a drawable.
    pub fn create(
        backend: &mut B,
        label: &str,
        mesh: &MeshData,
        material: &MaterialDesc,
        instances: &[InstanceRaw],
    ) -> Self {
        Self {
            mesh: backend.create_mesh(label, mesh),
            material: backend.create_material(label, material),
            instances: backend.create_instances(label, instances),
            instance_count: instances.len() as u32,
            index_count: mesh.indices.len() as u32,
        }
    }

    /// Free all three resources.
    pub fn release(self, backend: &mut B) {
        backend.release_instances(self.instances);
        backend.release_material(self.material);
        backend.release_mesh(self.mesh);
    }
}

/// Opaque id handed out by [`HeadlessBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessHandle(u64);

/// Backend that allocates nothing and only tracks what is alive.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next: u64,
    meshes: FxHashSet<u64>,
    materials: FxHashSet<u64>,
    instance_buffers: FxHashSet<u64>,
    created: usize,
    released: usize,
    /// Vertex count of every mesh created, in order.
    pub uploaded_vertices: Vec<usize>,
    /// Instance count of every instance buffer created, in order.
    pub uploaded_instances: Vec<usize>,
}

impl HeadlessBackend {
    /// Empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, kind: Kind) -> HeadlessHandle {
        self.next += 1;
        self.created += 1;
        let id = self.next;
        let _ = self.set(kind).insert(id);
        HeadlessHandle(id)
    }

    fn free(&mut self, kind: Kind, handle: HeadlessHandle) {
        if self.set(kind).remove(&handle.0) {
            self.released += 1;
        } else {
            log::warn!("double release of {kind:?} {}", handle.0);
        }
    }

    fn set(&mut self, kind: Kind) -> &mut FxHashSet<u64> {
        match kind {
            Kind::Mesh => &mut self.meshes,
            Kind::Material => &mut self.materials,
            Kind::Instances => &mut self.instance_buffers,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Mesh,
    Material,
    Instances,
}

impl RenderBackend for HeadlessBackend {
    type Mesh = HeadlessHandle;
    type Material = HeadlessHandle;
    type Instances = HeadlessHandle;

    fn create_mesh(&mut self, _label: &str, mesh: &MeshData) -> HeadlessHandle {
        self.uploaded_vertices.push(mesh.vertex_count());
        self.alloc(Kind::Mesh)
    }

    fn create_material(&mut self, _label: &str, _desc: &MaterialDesc) -> HeadlessHandle {
        self.alloc(Kind::Material)
    }

    fn create_instances(&mut self, _label: &str, instances: &[InstanceRaw]) -> HeadlessHandle {
        self.uploaded_instances.push(instances.len());
        self.alloc(Kind::Instances)
    }

    fn release_mesh(&mut self, mesh: HeadlessHandle) {
        self.free(Kind::Mesh, mesh);
    }

    fn release_material(&mut self, material: HeadlessHandle) {
        self.free(Kind::Material, material);
    }

    fn release_instances(&mut self, instances: HeadlessHandle) {
        self.free(Kind::Instances, instances);
    }

    fn stats(&self) -> ResourceStats {
        ResourceStats {
            meshes: self.meshes.len(),
            materials: self.materials.len(),
            instance_buffers: self.instance_buffers.len(),
            created: self.created,
            released: self.released,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::primitives;

    #[test]
    fn headless_counts_create_and_release() {
        let mut backend = HeadlessBackend::new();
        let set = ResourceSet::create(
            &mut backend,
            "cube",
            &primitives::cube(1.0),
            &MaterialDesc::default(),
            &[InstanceRaw::IDENTITY],
        );
        assert_eq!(set.instance_count, 1);
        assert_eq!(set.index_count, 36);
        let stats = backend.stats();
        assert_eq!((stats.meshes, stats.materials, stats.instance_buffers), (1, 1, 1));
        assert_eq!(backend.uploaded_vertices, vec![24]);

        set.release(&mut backend);
        let stats = backend.stats();
        assert_eq!(stats.live(), 0);
        assert_eq!(stats.created, 3);
        assert_eq!(stats.released, 3);
    }

    #[test]
    fn double_release_is_not_counted() {
        let mut backend = HeadlessBackend::new();
        let mesh = backend.create_mesh("m", &primitives::plane(1.0));
        backend.release_mesh(mesh);
        backend.release_mesh(mesh);
        assert_eq!(backend.stats().released, 1);
    }
}
