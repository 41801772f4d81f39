//! Scene state and per-frame composition.
//!
//! This module provides:
//! - [`SceneState`] - everything the update and render steps read or mutate
//! - [`Frame`] - ordered draw commands plus camera matrices for one redraw
//! - [`graph`] - scene nodes with parent-relative transforms
//! - [`house`] - the fixed house model
//! - [`textures`] - texture names and placeholder texels

pub mod graph;
pub mod house;
pub mod textures;

use glam::{Mat4, Vec3};

use crate::animation::{AnimationState, WindSpeed};
use crate::config::{ConfigError, SceneConfig};
use crate::geometry::{GeometryError, MeshCache, MeshKey};
use crate::renderer::camera::{Camera, Projection};
use crate::terrain::{classify_materials, Heightfield, MaterialMap, TerrainMesh};
use crate::turbine::{build_turbine, TurbineGeometry};
use graph::{DrawCommand, SceneNode};

pub const CLEAR_COLOR: [f32; 4] = [0.6, 0.8, 1.0, 1.0];
pub const SKY_COLOR: [f32; 4] = [0.53, 0.81, 0.98, 1.0];

/// Everything needed to draw one frame, in draw order.
#[derive(Debug, Clone)]
pub struct Frame {
    pub clear_color: [f32; 4],
    /// Full-screen background, drawn first with depth testing disabled
    pub sky_color: [f32; 4],
    pub view: Mat4,
    /// Projection matrix for `projection` at the aspect ratio passed to compose
    pub proj: Mat4,
    pub projection: Projection,
    pub lighting_enabled: bool,
    pub draws: Vec<DrawCommand>,
}

impl Frame {
    pub fn view_projection(&self) -> Mat4 {
        self.proj * self.view
    }
}

/// Static scene content registered in the mesh cache at startup.
struct StaticParts {
    terrain: Vec<graph::Part>,
    house: Vec<graph::Part>,
}

pub struct SceneState {
    pub camera: Camera,
    pub animation: AnimationState,
    pub wind_speed: WindSpeed,
    pub animation_enabled: bool,
    pub lighting_enabled: bool,
    pub projection: Projection,
    pub heightfield: Heightfield,
    pub materials: MaterialMap,
    pub turbine: TurbineGeometry,
    pub config: SceneConfig,
    statics: StaticParts,
}

impl SceneState {
    /// Generate terrain and static meshes, registering them in `cache`.
    pub fn new(config: SceneConfig, cache: &mut MeshCache) -> Result<Self, ConfigError> {
        config.validate()?;

        let heightfield = Heightfield::generate_with_scale(config.terrain_size, config.height_scale);
        let materials = classify_materials(&heightfield, config.material_seed);
        let terrain_mesh = TerrainMesh::build(&heightfield, &materials, config.terrain_scale);
        let (min_h, max_h) = heightfield.height_bounds();
        log::info!(
            "Generated terrain: {}x{} samples, height range {:.2}..{:.2}, {} quads in {} batches",
            heightfield.samples(),
            heightfield.samples(),
            min_h,
            max_h,
            terrain_mesh.quad_count(),
            terrain_mesh.batches.len()
        );

        let terrain = terrain_mesh
            .batches
            .into_iter()
            .map(|batch| {
                let key = cache.insert_static(terrain_key(batch.texture), batch.mesh);
                graph::Part::textured(key, batch.texture)
            })
            .collect();

        let house = house::house_parts()
            .into_iter()
            .map(|part| {
                let key = cache.insert_static(part.name, part.mesh);
                graph::Part {
                    mesh: key,
                    texture: part.texture,
                    tint: part.tint,
                }
            })
            .collect();

        let projection = if config.orthographic {
            Projection::Orthographic
        } else {
            Projection::Perspective
        };

        Ok(Self {
            camera: Camera::new(),
            animation: AnimationState::new(),
            wind_speed: WindSpeed::new(config.wind_speed),
            animation_enabled: config.animation_enabled,
            lighting_enabled: config.lighting_enabled,
            projection,
            heightfield,
            materials,
            turbine: config.turbine,
            statics: StaticParts { terrain, house },
            config,
        })
    }

    /// One simulation tick.
    pub fn update(&mut self) {
        self.animation.advance(
            self.config.time_step,
            self.wind_speed,
            self.animation_enabled,
            self.config.global_angle_step,
        );
    }

    /// Scene-wide translation simulating wind sway.
    pub fn sway_offset(&self) -> Vec3 {
        let sway = self.animation.tower_sway;
        Vec3::new(sway, 0.0, sway * 0.3)
    }

    /// Build the ordered draw list for the current state.
    ///
    /// Order: terrain, house, then every turbine instance. The sky is carried
    /// separately in [`Frame::sky_color`] and drawn before all of these.
    pub fn compose(&self, cache: &mut MeshCache, aspect: f32) -> Result<Frame, GeometryError> {
        let mut root = SceneNode::group("scene", Mat4::from_translation(self.sway_offset()));

        for part in &self.statics.terrain {
            root.push(SceneNode::leaf("terrain", Mat4::IDENTITY, *part));
        }

        let mut house = SceneNode::group("house", Mat4::from_translation(self.config.house_offset));
        for part in &self.statics.house {
            house.push(SceneNode::leaf("house-part", Mat4::IDENTITY, *part));
        }
        root.push(house);

        for placement in &self.config.turbine_placements {
            let turbine = build_turbine(&self.turbine, &self.animation, cache)?;
            root.push(
                SceneNode::group("placement", Mat4::from_translation(*placement))
                    .with_child(turbine),
            );
        }

        let mut draws = Vec::with_capacity(root.part_count());
        root.flatten(Mat4::IDENTITY, &mut draws);

        Ok(Frame {
            clear_color: CLEAR_COLOR,
            sky_color: SKY_COLOR,
            view: self.camera.build_view_matrix(),
            proj: self.camera.build_projection_matrix(self.projection, aspect),
            projection: self.projection,
            lighting_enabled: self.lighting_enabled,
            draws,
        })
    }
}

fn terrain_key(texture: textures::TextureName) -> &'static str {
    match texture {
        textures::TextureName::Grass => "terrain/grass",
        textures::TextureName::Sand => "terrain/sand",
        _ => "terrain/other",
    }
}

/// Whether `key` belongs to the terrain batches.
pub fn is_terrain(key: &MeshKey) -> bool {
    matches!(key, MeshKey::Static(name) if name.starts_with("terrain/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turbine::{BLADE_COUNT, BOLT_COUNT, VENT_COUNT};

    fn small_scene() -> (SceneState, MeshCache) {
        let mut cache = MeshCache::new();
        let config = SceneConfig {
            terrain_size: 10,
            ..SceneConfig::default()
        };
        let scene = SceneState::new(config, &mut cache).unwrap();
        (scene, cache)
    }

    const ASPECT: f32 = 4.0 / 3.0;

    const PARTS_PER_TURBINE: usize = 4 + VENT_COUNT + 1 + BOLT_COUNT + BLADE_COUNT;

    #[test]
    fn test_draw_order() {
        let (scene, mut cache) = small_scene();
        let frame = scene.compose(&mut cache, ASPECT).unwrap();

        let terrain = frame.draws.iter().take_while(|d| is_terrain(&d.mesh)).count();
        assert!(terrain >= 1);

        let house: Vec<_> = frame.draws[terrain..terrain + 4]
            .iter()
            .map(|d| d.mesh)
            .collect();
        assert_eq!(
            house,
            vec![
                MeshKey::Static("house/walls"),
                MeshKey::Static("house/roof"),
                MeshKey::Static("house/door"),
                MeshKey::Static("house/windows"),
            ]
        );

        let turbines = frame.draws.len() - terrain - 4;
        assert_eq!(turbines, 3 * PARTS_PER_TURBINE);
        assert!(frame.draws[terrain + 4..]
            .iter()
            .all(|d| matches!(d.mesh, MeshKey::Shape { .. })));
    }

    #[test]
    fn test_every_draw_has_a_mesh() {
        let (scene, mut cache) = small_scene();
        let frame = scene.compose(&mut cache, ASPECT).unwrap();
        assert!(frame.draws.iter().all(|d| cache.get(&d.mesh).is_some()));
    }

    #[test]
    fn test_house_offset_applied() {
        let (scene, mut cache) = small_scene();
        let frame = scene.compose(&mut cache, ASPECT).unwrap();
        let walls = frame
            .draws
            .iter()
            .find(|d| d.mesh == MeshKey::Static("house/walls"))
            .unwrap();
        assert_eq!(walls.model.transform_point3(Vec3::ZERO), Vec3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn test_turbines_animate_in_lockstep() {
        let (mut scene, mut cache) = small_scene();
        for _ in 0..37 {
            scene.update();
        }
        let frame = scene.compose(&mut cache, ASPECT).unwrap();
        let sway = scene.sway_offset();

        // First turbine part (foundation slab) of every instance sits at its placement
        let start = frame.draws.len() - 3 * PARTS_PER_TURBINE;
        let models: Vec<Mat4> = (0..3)
            .map(|k| frame.draws[start + k * PARTS_PER_TURBINE].model)
            .collect();
        for (k, model) in models.iter().enumerate() {
            let expected = crate::config::REFERENCE_PLACEMENTS[k] + sway + Vec3::new(0.0, -1.0, 0.0);
            assert!((model.transform_point3(Vec3::ZERO) - expected).length() < 1e-4);
        }

        // Same relative pose: blade transforms differ only by the placement offset
        let blade = |k: usize| frame.draws[start + (k + 1) * PARTS_PER_TURBINE - 1].model;
        let offset = crate::config::REFERENCE_PLACEMENTS[1] - crate::config::REFERENCE_PLACEMENTS[0];
        let a = blade(0).transform_point3(Vec3::new(0.0, 45.0, 0.0));
        let b = blade(1).transform_point3(Vec3::new(0.0, 45.0, 0.0));
        assert!((b - a - offset).length() < 1e-3);
    }

    #[test]
    fn test_update_uses_configured_step() {
        let mut cache = MeshCache::new();
        let config = SceneConfig {
            terrain_size: 4,
            time_step: 0.1,
            ..SceneConfig::default()
        };
        let mut scene = SceneState::new(config, &mut cache).unwrap();
        scene.update();
        assert_eq!(scene.animation.time_accumulator, 0.1);

        scene.animation_enabled = false;
        scene.update();
        assert_eq!(scene.animation.time_accumulator, 0.1);
        assert!(scene.animation.global_angle > 0.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut cache = MeshCache::new();
        let config = SceneConfig {
            turbine_placements: Vec::new(),
            ..SceneConfig::default()
        };
        assert!(SceneState::new(config, &mut cache).is_err());
    }

    #[test]
    fn test_frame_carries_toggles() {
        let (mut scene, mut cache) = small_scene();
        scene.lighting_enabled = false;
        scene.projection = Projection::Orthographic;
        let frame = scene.compose(&mut cache, ASPECT).unwrap();
        assert!(!frame.lighting_enabled);
        assert_eq!(frame.projection, Projection::Orthographic);
        assert_eq!(frame.sky_color, SKY_COLOR);
    }

    #[test]
    fn test_frame_matrices_follow_camera() {
        let (mut scene, mut cache) = small_scene();
        for projection in [Projection::Perspective, Projection::Orthographic] {
            scene.projection = projection;
            let frame = scene.compose(&mut cache, ASPECT).unwrap();
            let expected = scene.camera.build_projection_matrix(projection, ASPECT)
                * scene.camera.build_view_matrix();
            assert_eq!(frame.view_projection(), expected);
        }

        // Camera target lands in the middle of the screen
        let frame = scene.compose(&mut cache, ASPECT).unwrap();
        let clip = frame.view_projection() * scene.camera.target.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-4);
        assert!((clip.y / clip.w).abs() < 1e-4);
    }
}
