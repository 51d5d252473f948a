//! CPU-side indexed triangle mesh shared by surfaces and loaded assets.

use glam::Vec3;

/// Interleaved vertex uploaded to the GPU.
/// Must match the WGSL `VertexInput` layout (32 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl MeshVertex {
    /// Vertex buffer layout for slot 0.
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 24,
                    shader_location: 2,
                },
            ],
        }
    }
}

/// Indexed triangle list with per-vertex normals and uvs.
///
/// `positions`, `normals` and `uvs` are parallel arrays; `indices` holds
/// three entries per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (same length as `positions`).
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (same length as `positions`).
    pub uvs: Vec<[f32; 2]>,
    /// Triangle index list.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of complete triangles in the index list. A trailing partial
    /// triangle is ignored.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex indices of triangle `i`.
    #[must_use]
    pub fn triangle_indices(&self, i: usize) -> Option<[u32; 3]> {
        let base = i.checked_mul(3)?;
        let tri = self.indices.get(base..base + 3)?;
        Some([tri[0], tri[1], tri[2]])
    }

    /// Corner positions of triangle `i`, or `None` when `i` is out of range
    /// or the triangle references a missing vertex.
    #[must_use]
    pub fn triangle(&self, i: usize) -> Option<[Vec3; 3]> {
        let [a, b, c] = self.triangle_indices(i)?;
        let p = |idx: u32| self.positions.get(idx as usize).copied().map(Vec3::from);
        Some([p(a)?, p(b)?, p(c)?])
    }

    /// `true` if every index of a complete triangle addresses an existing
    /// vertex. Like [`triangle_count`](Self::triangle_count), this ignores a
    /// trailing partial triangle.
    #[must_use]
    pub fn indices_in_bounds(&self) -> bool {
        let n = self.positions.len();
        self.indices[..self.triangle_count() * 3]
            .iter()
            .all(|&i| (i as usize) < n)
    }

    /// Flat normals for meshes that arrive without them: every vertex gets
    /// the area-weighted sum of its adjacent face normals.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for t in 0..self.triangle_count() {
            let (Some(idx), Some([a, b, c])) =
                (self.triangle_indices(t), self.triangle(t))
            else {
                continue;
            };
            let n = (b - a).cross(c - a);
            for i in idx {
                acc[i as usize] += n;
            }
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    /// Interleave into GPU vertices. Missing normals/uvs are zero-filled.
    #[must_use]
    pub fn vertices(&self) -> Vec<MeshVertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, &position)| MeshVertex {
                position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uv: self.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }

    /// Axis-aligned bounds `(min, max)`, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|&p| Vec3::from(p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn triangle_lookup_respects_bounds() {
        let mesh = quad();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangle_indices(1), Some([0, 2, 3]));
        assert!(mesh.triangle(2).is_none());

        let mut broken = quad();
        broken.indices.push(9);
        broken.indices.push(0);
        broken.indices.push(1);
        assert!(!broken.indices_in_bounds());
        assert!(broken.triangle(2).is_none());
    }

    #[test]
    fn trailing_partial_triangle_is_ignored() {
        let mut mesh = quad();
        mesh.indices.extend([1, 99]);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.indices_in_bounds());
        assert!(mesh.triangle(2).is_none());
    }

    #[test]
    fn computed_normals_face_plus_z() {
        let mut mesh = quad();
        mesh.compute_normals();
        assert_eq!(mesh.normals.len(), 4);
        for n in &mesh.normals {
            assert!((Vec3::from(*n) - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn vertices_fill_missing_attributes() {
        let verts = quad().vertices();
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[2].position, [1.0, 1.0, 0.0]);
        assert_eq!(verts[2].uv, [0.0, 0.0]);
    }

    #[test]
    fn bounds_cover_all_positions() {
        let (lo, hi) = quad().bounds().unwrap();
        assert_eq!(lo, Vec3::ZERO);
        assert_eq!(hi, Vec3::new(1.0, 1.0, 0.0));
        assert!(MeshData::default().bounds().is_none());
    }
}
