//! Terrain synthesis.
//!
//! This module provides:
//! - [`Heightfield`] - layered-sine elevation grid
//! - [`classify_materials`] - seeded per-cell surface material selection
//! - [`TerrainMesh`] - textured quad batches ready for upload

pub mod materials;
pub mod mesh;

pub use materials::{classify_materials, MaterialIndex, MaterialMap};
pub use mesh::{TerrainBatch, TerrainMesh};

/// Number of cells along each axis of the reference terrain.
pub const TERRAIN_SIZE: usize = 50;
/// World units per terrain cell.
pub const TERRAIN_SCALE: f32 = 2.0;
/// Amplitude multiplier for the height layers.
pub const HEIGHT_SCALE: f32 = 3.0;
/// Seed used by the reference scene for material classification.
pub const MATERIAL_SEED: u64 = 42;

/// Elevation samples on a `(size + 1) × (size + 1)` grid.
///
/// The coordinate system uses:
/// - X axis: first index `i`
/// - Z axis: second index `j`
/// - Y axis: height values
#[derive(Debug, Clone, PartialEq)]
pub struct Heightfield {
    /// Number of cells per axis; there are `size + 1` samples per axis
    pub size: usize,
    /// Height samples, indexed as `heights[i][j]`
    pub heights: Vec<Vec<f32>>,
}

impl Heightfield {
    /// Generate the heightfield with the reference height scale.
    ///
    /// # Example
    ///
    /// ```
    /// use windscape::terrain::Heightfield;
    ///
    /// let field = Heightfield::generate(4);
    /// assert_eq!(field.heights.len(), 5);
    /// assert_eq!(field.height(0, 0), 0.0);
    /// ```
    pub fn generate(size: usize) -> Self {
        Self::generate_with_scale(size, HEIGHT_SCALE)
    }

    /// Sum of three sine layers: mid frequency, low frequency with the largest
    /// amplitude, and a very low frequency swell.
    pub fn generate_with_scale(size: usize, height_scale: f32) -> Self {
        let heights = (0..=size)
            .map(|i| {
                (0..=size)
                    .map(|j| sample_height(i as f32, j as f32, height_scale))
                    .collect()
            })
            .collect();
        Self { size, heights }
    }

    /// Number of samples per axis.
    pub fn samples(&self) -> usize {
        self.size + 1
    }

    pub fn height(&self, i: usize, j: usize) -> f32 {
        self.heights[i][j]
    }

    /// Corner heights of cell `(i, j)` in the order
    /// `(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)`.
    pub fn quad_corners(&self, i: usize, j: usize) -> [f32; 4] {
        [
            self.heights[i][j],
            self.heights[i + 1][j],
            self.heights[i + 1][j + 1],
            self.heights[i][j + 1],
        ]
    }

    /// Returns the minimum and maximum height values in the terrain.
    ///
    /// Returns `(0.0, 0.0)` for empty terrain.
    pub fn height_bounds(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;

        for row in &self.heights {
            for &h in row {
                min = min.min(h);
                max = max.max(h);
            }
        }

        if min > max {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }
}

fn sample_height(i: f32, j: f32, scale: f32) -> f32 {
    let mut h = (i * 0.3).sin() * (j * 0.3).cos() * scale;
    h += (i * 0.1).sin() * (j * 0.15).sin() * scale * 2.0;
    h += (i * 0.05).sin() * (j * 0.08).cos() * scale * 0.5;
    h
}
