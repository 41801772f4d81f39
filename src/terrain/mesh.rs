use std::collections::BTreeMap;

use glam::{Vec2, Vec3};

use super::{Heightfield, MaterialMap};
use crate::geometry::{SurfaceMesh, Vertex};
use crate::scene::textures::TextureName;

/// Terrain quads that share one texture.
pub struct TerrainBatch {
    pub texture: TextureName,
    pub mesh: SurfaceMesh,
}

/// Generated terrain ready for GPU upload, one batch per texture.
pub struct TerrainMesh {
    pub batches: Vec<TerrainBatch>,
}

impl TerrainMesh {
    /// Generate textured quads from the heightfield.
    ///
    /// The grid is centred on the origin with `scale` world units per cell.
    /// Cell `(i, j)` picks its texture from `materials[i][j]`.
    pub fn build(heightfield: &Heightfield, materials: &MaterialMap, scale: f32) -> Self {
        let size = heightfield.size;
        let half = (size / 2) as f32;
        let mut batches: BTreeMap<TextureName, SurfaceMesh> = BTreeMap::new();

        let vertex = |i: usize, j: usize, uv: Vec2| {
            let position = Vec3::new(
                (i as f32 - half) * scale,
                heightfield.height(i, j),
                (j as f32 - half) * scale,
            );
            Vertex::new(position, sample_normal(heightfield, i, j, scale), uv)
        };

        for i in 0..size {
            for j in 0..size {
                let quad = [
                    vertex(i, j, Vec2::new(0.0, 0.0)),
                    vertex(i + 1, j, Vec2::new(1.0, 0.0)),
                    vertex(i + 1, j + 1, Vec2::new(1.0, 1.0)),
                    vertex(i, j + 1, Vec2::new(0.0, 1.0)),
                ];
                batches
                    .entry(materials.get(i, j).texture())
                    .or_default()
                    .push_quad(quad);
            }
        }

        Self {
            batches: batches
                .into_iter()
                .map(|(texture, mesh)| TerrainBatch { texture, mesh })
                .collect(),
        }
    }

    pub fn quad_count(&self) -> usize {
        self.batches.iter().map(|b| b.mesh.quads.len()).sum()
    }
}

/// Central-difference normal; one-sided at the grid border.
fn sample_normal(heightfield: &Heightfield, i: usize, j: usize, scale: f32) -> Vec3 {
    let last = heightfield.size;
    let (i0, i1) = (i.saturating_sub(1), (i + 1).min(last));
    let (j0, j1) = (j.saturating_sub(1), (j + 1).min(last));

    let dx = (heightfield.height(i1, j) - heightfield.height(i0, j))
        / ((i1 - i0).max(1) as f32 * scale);
    let dz = (heightfield.height(i, j1) - heightfield.height(i, j0))
        / ((j1 - j0).max(1) as f32 * scale);

    Vec3::new(-dx, 1.0, -dz).normalize()
}
