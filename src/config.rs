//! Scene configuration.
//!
//! [`SceneConfig::default`] reproduces the reference scene; the binary overrides
//! individual fields from command-line flags.

use glam::Vec3;
use thiserror::Error;

use crate::animation::{DEFAULT_GLOBAL_ANGLE_STEP, DEFAULT_TIME_STEP};
use crate::geometry::GeometryError;
use crate::terrain::{HEIGHT_SCALE, MATERIAL_SEED, TERRAIN_SCALE, TERRAIN_SIZE};
use crate::turbine::TurbineGeometry;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Terrain must have at least one cell per axis")]
    EmptyTerrain,
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("Scene needs at least one turbine")]
    NoTurbines,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Turbine placements of the reference scene, relative to the house.
pub const REFERENCE_PLACEMENTS: [Vec3; 3] = [
    Vec3::new(-20.0, 0.0, -30.0),
    Vec3::new(30.0, 0.0, -25.0),
    Vec3::new(-5.0, 0.0, -40.0),
];

/// Placements for `count` turbines: the reference three first, then a row
/// further back.
pub fn turbine_placements(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|k| match REFERENCE_PLACEMENTS.get(k) {
            Some(&p) => p,
            None => {
                let extra = (k - REFERENCE_PLACEMENTS.len()) as f32;
                Vec3::new(-40.0 + extra * 25.0, 0.0, -70.0)
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Cells per terrain axis
    pub terrain_size: usize,
    /// World units per terrain cell
    pub terrain_scale: f32,
    pub height_scale: f32,
    pub material_seed: u64,
    /// Seed for the placeholder textures
    pub texture_seed: u64,
    /// Simulated seconds per tick
    pub time_step: f32,
    /// Decorative angle increment per tick, degrees
    pub global_angle_step: f32,
    pub wind_speed: f32,
    pub animation_enabled: bool,
    pub lighting_enabled: bool,
    pub orthographic: bool,
    pub house_offset: Vec3,
    pub turbine_placements: Vec<Vec3>,
    pub turbine: TurbineGeometry,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            terrain_size: TERRAIN_SIZE,
            terrain_scale: TERRAIN_SCALE,
            height_scale: HEIGHT_SCALE,
            material_seed: MATERIAL_SEED,
            texture_seed: 0,
            time_step: DEFAULT_TIME_STEP,
            global_angle_step: DEFAULT_GLOBAL_ANGLE_STEP,
            wind_speed: 1.0,
            animation_enabled: true,
            lighting_enabled: true,
            orthographic: false,
            house_offset: Vec3::new(0.0, 1.5, 0.0),
            turbine_placements: REFERENCE_PLACEMENTS.to_vec(),
            turbine: TurbineGeometry::default(),
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terrain_size == 0 {
            return Err(ConfigError::EmptyTerrain);
        }
        for (name, value) in [
            ("terrain_scale", self.terrain_scale),
            ("time_step", self.time_step),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.turbine_placements.is_empty() {
            return Err(ConfigError::NoTurbines);
        }
        self.turbine.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid_reference_scene() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.terrain_size, 50);
        assert_eq!(config.material_seed, 42);
        assert_eq!(config.time_step, 0.016);
        assert_eq!(config.turbine_placements.len(), 3);
    }

    #[test]
    fn test_placements_extend_reference() {
        assert_eq!(turbine_placements(2), REFERENCE_PLACEMENTS[..2].to_vec());
        let five = turbine_placements(5);
        assert_eq!(five[..3], REFERENCE_PLACEMENTS);
        assert_eq!(five[3], Vec3::new(-40.0, 0.0, -70.0));
        assert_eq!(five[4], Vec3::new(-15.0, 0.0, -70.0));
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = SceneConfig {
            terrain_size: 0,
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyTerrain));

        let config = SceneConfig {
            time_step: 0.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                name: "time_step",
                ..
            })
        ));

        let config = SceneConfig {
            turbine_placements: vec![],
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoTurbines));

        let config = SceneConfig {
            turbine: TurbineGeometry {
                top_radius: -1.0,
                ..TurbineGeometry::default()
            },
            ..SceneConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Geometry(_))));
    }
}
