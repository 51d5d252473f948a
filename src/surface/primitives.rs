//! Primitive surface generators.
//!
//! Vertex order, segment counts and pole/apex handling follow the usual
//! web-3D primitive conventions so that index-uniform sampling produces the
//! same spatial bias users expect from those shapes.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::mesh::MeshData;

/// Sphere tessellation (width and height segments).
pub const SPHERE_SEGMENTS: u32 = 32;
/// Cone tessellation around the axis.
pub const CONE_RADIAL_SEGMENTS: u32 = 32;

/// Push one axis-aligned grid face. `u`, `v`, `w` are component indices
/// (0 = x, 1 = y, 2 = z); `depth` places the face at `w = depth / 2` and its
/// sign picks the normal direction.
#[allow(clippy::too_many_arguments)]
fn push_grid_face(
    mesh: &mut MeshData,
    (u, v, w): (usize, usize, usize),
    (udir, vdir): (f32, f32),
    width: f32,
    height: f32,
    depth: f32,
    (grid_x, grid_y): (u32, u32),
) {
    let segment_width = width / grid_x as f32;
    let segment_height = height / grid_y as f32;
    let width_half = width / 2.0;
    let height_half = height / 2.0;
    let depth_half = depth / 2.0;
    let base = mesh.positions.len() as u32;

    for iy in 0..=grid_y {
        let y = iy as f32 * segment_height - height_half;
        for ix in 0..=grid_x {
            let x = ix as f32 * segment_width - width_half;

            let mut position = [0.0; 3];
            position[u] = x * udir;
            position[v] = y * vdir;
            position[w] = depth_half;

            let mut normal = [0.0; 3];
            normal[w] = if depth > 0.0 { 1.0 } else { -1.0 };

            mesh.positions.push(position);
            mesh.normals.push(normal);
            mesh.uvs.push([
                ix as f32 / grid_x as f32,
                1.0 - iy as f32 / grid_y as f32,
            ]);
        }
    }

    let row = grid_x + 1;
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = base + ix + row * iy;
            let b = base + ix + row * (iy + 1);
            let c = base + (ix + 1) + row * (iy + 1);
            let d = base + (ix + 1) + row * iy;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
}

/// Square plane of side `size` in the local XY plane, facing +Z.
#[must_use]
pub fn plane(size: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let width_half = size / 2.0;
    for iy in 0..=1u32 {
        let y = iy as f32 * size - width_half;
        for ix in 0..=1u32 {
            let x = ix as f32 * size - width_half;
            mesh.positions.push([x, -y, 0.0]);
            mesh.normals.push([0.0, 0.0, 1.0]);
            mesh.uvs.push([ix as f32, 1.0 - iy as f32]);
        }
    }
    // a = 0, b = 2, c = 3, d = 1
    mesh.indices.extend_from_slice(&[0, 2, 1, 2, 3, 1]);
    mesh
}

/// Axis-aligned cube with edge length `size`, one quad per face.
#[must_use]
pub fn cube(size: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let s = size;
    let grid = (1, 1);
    push_grid_face(&mut mesh, (2, 1, 0), (-1.0, -1.0), s, s, s, grid); // +x
    push_grid_face(&mut mesh, (2, 1, 0), (1.0, -1.0), s, s, -s, grid); // -x
    push_grid_face(&mut mesh, (0, 2, 1), (1.0, 1.0), s, s, s, grid); // +y
    push_grid_face(&mut mesh, (0, 2, 1), (1.0, -1.0), s, s, -s, grid); // -y
    push_grid_face(&mut mesh, (0, 1, 2), (1.0, -1.0), s, s, s, grid); // +z
    push_grid_face(&mut mesh, (0, 1, 2), (-1.0, -1.0), s, s, -s, grid); // -z
    mesh
}

/// UV sphere of the given radius. Pole rows produce one triangle per
/// segment instead of a degenerate quad.
#[must_use]
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut mesh = MeshData::default();
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(height_segments as usize + 1);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (phi, theta) = (u * TAU, v * PI);
            let position = Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );
            row.push(mesh.positions.len() as u32);
            mesh.positions.push(position.to_array());
            mesh.normals
                .push(position.try_normalize().unwrap_or(Vec3::Y).to_array());
            mesh.uvs.push([u + u_offset, 1.0 - v]);
        }
        grid.push(row);
    }

    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// Closed cone standing on the XZ plane: apex at `+height / 2`, base disc
/// of `radius` at `-height / 2`.
#[must_use]
pub fn cone(radius: f32, height: f32, radial_segments: u32) -> MeshData {
    let radial_segments = radial_segments.max(3);
    let mut mesh = MeshData::default();
    let half_height = height / 2.0;
    let slope = radius / height;

    // Lateral surface: row 0 is the apex ring, row 1 the base ring.
    let mut rows: [Vec<u32>; 2] = [Vec::new(), Vec::new()];
    for (y, row) in rows.iter_mut().enumerate() {
        let v = y as f32;
        let ring_radius = v * radius;
        for x in 0..=radial_segments {
            let u = x as f32 / radial_segments as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            row.push(mesh.positions.len() as u32);
            mesh.positions
                .push([ring_radius * sin, -v * height + half_height, ring_radius * cos]);
            mesh.normals.push(
                Vec3::new(sin, slope, cos)
                    .try_normalize()
                    .unwrap_or(Vec3::Y)
                    .to_array(),
            );
            mesh.uvs.push([u, 1.0 - v]);
        }
    }
    for x in 0..radial_segments as usize {
        let b = rows[1][x];
        let c = rows[1][x + 1];
        let d = rows[0][x + 1];
        mesh.indices.extend_from_slice(&[b, c, d]);
    }

    // Base cap: one centre vertex per segment, then the rim.
    let center_start = mesh.positions.len() as u32;
    for _ in 1..=radial_segments {
        mesh.positions.push([0.0, -half_height, 0.0]);
        mesh.normals.push([0.0, -1.0, 0.0]);
        mesh.uvs.push([0.5, 0.5]);
    }
    let rim_start = mesh.positions.len() as u32;
    for x in 0..=radial_segments {
        let u = x as f32 / radial_segments as f32;
        let (sin, cos) = (u * TAU).sin_cos();
        mesh.positions.push([radius * sin, -half_height, radius * cos]);
        mesh.normals.push([0.0, -1.0, 0.0]);
        mesh.uvs.push([cos * 0.5 + 0.5, 0.5 - sin * 0.5]);
    }
    for x in 0..radial_segments {
        let c = center_start + x;
        let i = rim_start + x;
        mesh.indices.extend_from_slice(&[i + 1, i, c]);
    }
    mesh
}
