//! Surface material classification for terrain cells.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Heightfield;
use crate::scene::textures::TextureName;

/// Surface material of a terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum MaterialIndex {
    #[default]
    Grass = 0,
    Alt1 = 1,
    Alt2 = 2,
    Sand = 3,
}

impl MaterialIndex {
    /// Map a numeric code to a material; codes wrap modulo 4.
    pub fn from_code(code: u32) -> Self {
        match code % 4 {
            0 => MaterialIndex::Grass,
            1 => MaterialIndex::Alt1,
            2 => MaterialIndex::Alt2,
            _ => MaterialIndex::Sand,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Texture used to draw cells of this material.
    pub fn texture(self) -> TextureName {
        match self {
            MaterialIndex::Grass => TextureName::Grass,
            _ => TextureName::Sand,
        }
    }
}

/// Per-cell materials, same shape as the heightfield, indexed as `cells[i][j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialMap {
    pub cells: Vec<Vec<MaterialIndex>>,
}

impl MaterialMap {
    pub fn get(&self, i: usize, j: usize) -> MaterialIndex {
        self.cells[i][j]
    }

    /// Row-major sequence of material codes.
    pub fn codes(&self) -> Vec<u8> {
        self.cells
            .iter()
            .flat_map(|row| row.iter().map(|m| m.code()))
            .collect()
    }
}

/// Classify every heightfield sample by elevation band and a seeded random draw.
///
/// Cells are visited row-major. Each cell consumes one draw `r` in `[0, 1)`
/// (hundredths); when `r > 0.95` a second draw picks a random material instead
/// of the banded one.
pub fn classify_materials(heightfield: &Heightfield, seed: u64) -> MaterialMap {
    let mut rng = StdRng::seed_from_u64(seed);

    let cells = heightfield
        .heights
        .iter()
        .map(|row| {
            row.iter()
                .map(|&height| {
                    let r = rng.gen_range(0..100u32) as f32 / 100.0;
                    let banded = classify_band(height, r);
                    if r > 0.95 {
                        MaterialIndex::from_code(rng.gen_range(0..4u32))
                    } else {
                        banded
                    }
                })
                .collect()
        })
        .collect();

    MaterialMap { cells }
}

fn classify_band(height: f32, r: f32) -> MaterialIndex {
    if height < -2.0 {
        if r > 0.7 {
            MaterialIndex::Sand
        } else {
            MaterialIndex::Alt2
        }
    } else if height < 2.0 {
        if r > 0.6 {
            MaterialIndex::Sand
        } else {
            MaterialIndex::Grass
        }
    } else if height < 5.0 {
        if r > 0.5 {
            MaterialIndex::Alt1
        } else {
            MaterialIndex::Grass
        }
    } else {
        MaterialIndex::Alt1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{MATERIAL_SEED, TERRAIN_SIZE};

    #[test]
    fn test_classification_is_reproducible() {
        let field = Heightfield::generate(TERRAIN_SIZE);
        let a = classify_materials(&field, MATERIAL_SEED);
        let b = classify_materials(&field, MATERIAL_SEED);
        assert_eq!(a.codes(), b.codes());
    }

    #[test]
    fn test_map_matches_heightfield_shape() {
        let field = Heightfield::generate(TERRAIN_SIZE);
        let map = classify_materials(&field, MATERIAL_SEED);
        assert_eq!(map.cells.len(), field.samples());
        assert!(map.cells.iter().all(|row| row.len() == field.samples()));
    }

    #[test]
    fn test_different_seeds_differ() {
        let field = Heightfield::generate(TERRAIN_SIZE);
        let a = classify_materials(&field, 42);
        let b = classify_materials(&field, 7);
        assert_ne!(a.codes(), b.codes());
    }

    #[test]
    fn test_band_table() {
        assert_eq!(classify_band(-3.0, 0.8), MaterialIndex::Sand);
        assert_eq!(classify_band(-3.0, 0.7), MaterialIndex::Alt2);
        assert_eq!(classify_band(0.0, 0.61), MaterialIndex::Sand);
        assert_eq!(classify_band(0.0, 0.6), MaterialIndex::Grass);
        assert_eq!(classify_band(-2.0, 0.1), MaterialIndex::Grass);
        assert_eq!(classify_band(3.0, 0.9), MaterialIndex::Alt1);
        assert_eq!(classify_band(3.0, 0.2), MaterialIndex::Grass);
        assert_eq!(classify_band(5.0, 0.0), MaterialIndex::Alt1);
    }

    #[test]
    fn test_high_ground_without_override_is_alt1() {
        // Flat plateau above every band threshold: only the override can pick
        // something other than Alt1
        let field = Heightfield {
            size: 20,
            heights: vec![vec![8.0; 21]; 21],
        };
        let map = classify_materials(&field, MATERIAL_SEED);
        let alt1 = map
            .codes()
            .iter()
            .filter(|&&c| c == MaterialIndex::Alt1.code())
            .count();
        // The override fires for roughly 4 % of cells
        assert!(alt1 as f32 > 0.85 * 441.0);
    }

    #[test]
    fn test_texture_mapping() {
        assert_eq!(MaterialIndex::Grass.texture(), TextureName::Grass);
        assert_eq!(MaterialIndex::Alt1.texture(), TextureName::Sand);
        assert_eq!(MaterialIndex::Sand.texture(), TextureName::Sand);
        assert_eq!(MaterialIndex::from_code(6), MaterialIndex::Alt2);
    }
}
