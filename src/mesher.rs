//! Mesh baking from terrain height queries.
//!
//! Samples a [`Terrain`] on a regular grid and converts the result into a
//! Bevy [`Mesh`] with:
//! - `TriangleList` topology
//! - Smooth per-vertex normals (area-weighted average of adjacent face normals)
//! - Tiling UV coordinates (world-space scaled by `uv_tile_size`)
//!
//! By default the *stepped* [`Terrain::height`] is baked so the voxel
//! terraces show up in the rendered geometry.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use crate::terrain::{HeightField, Terrain};

/// Bakes terrain into a Bevy [`Mesh`].
///
/// The mesh is centred on the world origin, covering
/// `[-extent/2, extent/2]` on X and Z, with `segments + 1` vertices per side.
/// Per-vertex normals are computed from the baked triangles: each triangle's
/// unnormalized cross product (proportional to its area) is accumulated at its
/// three vertices, then normalized. On terraced ground this keeps the shading
/// faithful to the visible steps rather than to the continuous surface.
///
/// # Example
///
/// ```ignore
/// use bevy_isle_ground::{HeightField, HeightFieldMeshBuilder};
///
/// let field = HeightField::new(42, 5000.0, Vec::new());
/// let mesh = HeightFieldMeshBuilder::new()
///     .with_uv_tile_size(40.0)
///     .build(&field);
/// ```
pub struct HeightFieldMeshBuilder {
    uv_tile_size: f32,
    segments: Option<u32>,
    smooth: bool,
}

impl Default for HeightFieldMeshBuilder {
    fn default() -> Self {
        Self {
            uv_tile_size: 1.0,
            segments: None,
            smooth: false,
        }
    }
}

impl HeightFieldMeshBuilder {
    /// Creates a new builder with default settings (`uv_tile_size = 1.0`, stepped heights).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the world-space size of one UV tile.
    ///
    /// Clamped to a positive minimum to avoid division by zero.
    pub fn with_uv_tile_size(mut self, size: f32) -> Self {
        self.uv_tile_size = size.max(f32::EPSILON);
        self
    }

    /// Overrides the height field's own segment count.
    pub fn with_segments(mut self, segments: u32) -> Self {
        self.segments = Some(segments);
        self
    }

    /// Bakes [`Terrain::smooth_height`] instead of the stepped height.
    pub fn with_smooth_heights(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    /// Bakes the whole island square of `field`.
    pub fn build(&self, field: &HeightField) -> Mesh {
        let segments = self.segments.unwrap_or(field.segments());
        self.build_terrain(field, field.size(), segments)
    }

    /// Bakes any terrain over a square of side `extent`.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is zero or `extent` is not finite and positive, as
    /// at least one quad is required to produce valid triangle geometry.
    pub fn build_terrain(&self, terrain: &dyn Terrain, extent: f64, segments: u32) -> Mesh {
        assert!(
            segments >= 1 && extent.is_finite() && extent > 0.0,
            "terrain mesh needs at least one segment and a positive extent (got {segments} over {extent})"
        );

        let side = segments as usize + 1;
        let step = extent / segments as f64;
        let origin = -extent * 0.5;

        let vertex_count = side * side;
        let mut positions: Vec<[f32; 3]> = Vec::with_capacity(vertex_count);
        let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(vertex_count);

        for z in 0..side {
            for x in 0..side {
                let world_x = origin + x as f64 * step;
                let world_z = origin + z as f64 * step;
                let world_y = if self.smooth {
                    terrain.smooth_height(world_x, world_z)
                } else {
                    terrain.height(world_x, world_z)
                };

                let (wx, wy, wz) = (world_x as f32, world_y as f32, world_z as f32);
                positions.push([wx, wy, wz]);
                uvs.push([wx / self.uv_tile_size, wz / self.uv_tile_size]);
            }
        }

        // CCW triangles (normal pointing +Y when terrain is flat).
        //   tl──tr
        //   │╲  │     Triangle 1: tl, bl, tr
        //   │ ╲ │     Triangle 2: tr, bl, br
        //   bl──br
        let quad_count = (side - 1) * (side - 1);
        let mut indices: Vec<u32> = Vec::with_capacity(quad_count * 6);

        for z in 0..(side - 1) {
            for x in 0..(side - 1) {
                let tl = (z * side + x) as u32;
                let tr = (z * side + x + 1) as u32;
                let bl = ((z + 1) * side + x) as u32;
                let br = ((z + 1) * side + x + 1) as u32;

                indices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
            }
        }

        let mut normals: Vec<Vec3> = vec![Vec3::ZERO; vertex_count];

        for tri in indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = Vec3::from(positions[i0]);
            let p1 = Vec3::from(positions[i1]);
            let p2 = Vec3::from(positions[i2]);
            let face_normal = (p1 - p0).cross(p2 - p0);
            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        let normals: Vec<[f32; 3]> = normals
            .iter()
            .map(|n| {
                let len = n.length();
                // Degenerate vertex (zero contributions): default to +Y.
                if len > f32::EPSILON { (*n / len).into() } else { [0.0, 1.0, 0.0] }
            })
            .collect();

        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        mesh.insert_indices(Indices::U32(indices));
        mesh
    }
}
