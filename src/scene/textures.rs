//! Texture names and placeholder texel generation.
//!
//! Image loading lives outside the scene; every texture is a noisy solid colour
//! generated from a seed so the scene renders without any asset files.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Logical texture identifiers requested by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextureName {
    Grass,
    Sand,
    Metal,
    Concrete,
    Blade,
    Nacelle,
    HouseWall,
    Roof,
    Door,
    Water,
    Wood,
    Glass,
    Window,
    Tree,
}

impl TextureName {
    pub const ALL: [TextureName; 14] = [
        TextureName::Grass,
        TextureName::Sand,
        TextureName::Metal,
        TextureName::Concrete,
        TextureName::Blade,
        TextureName::Nacelle,
        TextureName::HouseWall,
        TextureName::Roof,
        TextureName::Door,
        TextureName::Water,
        TextureName::Wood,
        TextureName::Glass,
        TextureName::Window,
        TextureName::Tree,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextureName::Grass => "grass",
            TextureName::Sand => "sand",
            TextureName::Metal => "metal",
            TextureName::Concrete => "concrete",
            TextureName::Blade => "blade",
            TextureName::Nacelle => "nacelle",
            TextureName::HouseWall => "house-wall",
            TextureName::Roof => "roof",
            TextureName::Door => "door",
            TextureName::Water => "water",
            TextureName::Wood => "wood",
            TextureName::Glass => "glass",
            TextureName::Window => "window",
            TextureName::Tree => "tree",
        }
    }

    /// Base RGB colour and per-channel variation of the placeholder.
    fn palette(self) -> ([u8; 3], u8) {
        match self {
            TextureName::Grass => ([86, 140, 60], 30),
            TextureName::Sand => ([194, 178, 128], 24),
            TextureName::Metal => ([170, 174, 180], 12),
            TextureName::Concrete => ([150, 148, 142], 28),
            TextureName::Blade => ([236, 236, 236], 8),
            TextureName::Nacelle => ([220, 222, 226], 10),
            TextureName::HouseWall => ([160, 82, 60], 30),
            TextureName::Roof => ([120, 80, 50], 26),
            TextureName::Door => ([100, 66, 40], 20),
            TextureName::Water => ([60, 110, 170], 20),
            TextureName::Wood => ([140, 100, 60], 26),
            TextureName::Glass => ([170, 210, 230], 10),
            TextureName::Window => ([128, 204, 255], 10),
            TextureName::Tree => ([50, 100, 40], 30),
        }
    }
}

/// Edge length of generated placeholder textures.
pub const TEXTURE_SIZE: u32 = 128;

/// RGBA8 texels for `name`: the palette colour jittered by seeded noise.
pub fn procedural_texels(name: TextureName, size: u32, seed: u64) -> Vec<u8> {
    let ([r, g, b], variation) = name.palette();
    let mut rng = StdRng::seed_from_u64(seed ^ name as u64);
    let mut jitter = |base: u8| -> u8 {
        let offset = rng.gen_range(0..variation.max(1) as i32) - variation as i32 / 2;
        (base as i32 + offset).clamp(0, 255) as u8
    };

    let mut texels = Vec::with_capacity((size * size * 4) as usize);
    for _ in 0..size * size {
        texels.push(jitter(r));
        texels.push(jitter(g));
        texels.push(jitter(b));
        texels.push(255);
    }
    texels
}
