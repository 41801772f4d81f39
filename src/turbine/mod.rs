//! Wind turbine assembly.
//!
//! A turbine is a [`SceneNode`] tree rooted at ground level:
//!
//! ```text
//! turbine
//! ├── foundation ── slab, ring
//! ├── tower
//! └── nacelle (yaw)
//!     ├── body ── vent × 8
//!     └── rotor
//!         ├── hub ── bolt × 12
//!         └── blade-0, blade-1, blade-2 (spin)
//! ```

pub mod blade;

use crate::animation::AnimationState;
use crate::geometry::{nonzero, positive, GeometryError, MeshCache, Shape};
use crate::scene::graph::{rotate_x_deg, rotate_y_deg, translate, Part, SceneNode};
use crate::scene::textures::TextureName;

pub const BLADE_COUNT: usize = 3;
pub const VENT_COUNT: usize = 8;
pub const BOLT_COUNT: usize = 12;

const FOUNDATION_SEGMENTS: u32 = 32;
const RING_MINOR_RADIUS: f32 = 0.5;
const RING_MAJOR_SEGMENTS: u32 = 24;
const RING_MINOR_SEGMENTS: u32 = 16;
const NACELLE_SEGMENTS: u32 = 20;
const HUB_SEGMENTS: u32 = 16;
const BOLT_RADIUS: f32 = 0.15;
const BOLT_SEGMENTS: u32 = 8;
/// Rotor mount distance from the nacelle centre, as a fraction of nacelle length.
const ROTOR_OFFSET: f32 = 0.6;
/// The cylinder generator builds along +Z; this turns it to world +Y.
const UPRIGHT_DEG: f32 = -90.0;

const BLADE_NAMES: [&str; BLADE_COUNT] = ["blade-0", "blade-1", "blade-2"];
const VENT_TINT: [f32; 3] = [0.3, 0.3, 0.3];
const HUB_TINT: [f32; 3] = [0.8, 0.8, 0.8];
const BLADE_TINT: [f32; 3] = [0.95, 0.95, 0.95];

/// Dimensions shared by every turbine instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbineGeometry {
    pub base_radius: f32,
    pub top_radius: f32,
    /// Tower height
    pub height: f32,
    /// Tower tessellation around its axis
    pub segments: u32,
    pub nacelle_length: f32,
    pub nacelle_width: f32,
    pub nacelle_height: f32,
    pub blade_length: f32,
    /// Hub sphere radius, also the blade's root half width
    pub hub_radius: f32,
    pub blade_segments: u32,
    pub foundation_radius: f32,
    pub foundation_height: f32,
}

impl Default for TurbineGeometry {
    fn default() -> Self {
        Self {
            base_radius: 3.5,
            top_radius: 1.8,
            height: 80.0,
            segments: 24,
            nacelle_length: 12.0,
            nacelle_width: 4.0,
            nacelle_height: 4.5,
            blade_length: 45.0,
            hub_radius: 2.2,
            blade_segments: 20,
            foundation_radius: 8.0,
            foundation_height: 2.0,
        }
    }
}

impl TurbineGeometry {
    /// Reject any non-positive dimension or zero segment count.
    pub fn validate(&self) -> Result<(), GeometryError> {
        positive("base_radius", self.base_radius)?;
        positive("top_radius", self.top_radius)?;
        positive("height", self.height)?;
        nonzero("segments", self.segments)?;
        positive("nacelle_length", self.nacelle_length)?;
        positive("nacelle_width", self.nacelle_width)?;
        positive("nacelle_height", self.nacelle_height)?;
        positive("blade_length", self.blade_length)?;
        positive("hub_radius", self.hub_radius)?;
        nonzero("blade_segments", self.blade_segments)?;
        positive("foundation_radius", self.foundation_radius)?;
        positive("foundation_height", self.foundation_height)?;
        Ok(())
    }

    /// Height of the nacelle centre above the turbine origin.
    pub fn hub_height(&self) -> f32 {
        self.foundation_height + self.height
    }
}

/// Build one turbine posed by `animation`, registering its part meshes in `cache`.
pub fn build_turbine(
    geometry: &TurbineGeometry,
    animation: &AnimationState,
    cache: &mut MeshCache,
) -> Result<SceneNode, GeometryError> {
    geometry.validate()?;

    let mut turbine = SceneNode::group("turbine", glam::Mat4::IDENTITY);
    turbine.push(build_foundation(geometry, cache)?);
    turbine.push(build_tower(geometry, cache)?);

    let nacelle = SceneNode::group(
        "nacelle",
        translate(0.0, geometry.hub_height(), 0.0) * rotate_y_deg(animation.nacelle_yaw),
    )
    .with_child(build_nacelle_body(geometry, cache)?)
    .with_child(build_rotor(geometry, animation, cache)?);
    turbine.push(nacelle);

    Ok(turbine)
}

fn build_foundation(
    geometry: &TurbineGeometry,
    cache: &mut MeshCache,
) -> Result<SceneNode, GeometryError> {
    let slab = cache.get_or_build(&Shape::TaperedCylinder {
        base_radius: geometry.foundation_radius,
        top_radius: geometry.foundation_radius,
        height: geometry.foundation_height,
        segments: FOUNDATION_SEGMENTS,
    })?;
    let ring = cache.get_or_build(&Shape::Torus {
        major_radius: geometry.foundation_radius * 1.1,
        minor_radius: RING_MINOR_RADIUS,
        major_segments: RING_MAJOR_SEGMENTS,
        minor_segments: RING_MINOR_SEGMENTS,
    })?;

    Ok(
        SceneNode::group("foundation", translate(0.0, -geometry.foundation_height * 0.5, 0.0))
            .with_child(SceneNode::leaf(
                "slab",
                rotate_x_deg(UPRIGHT_DEG),
                Part::textured(slab, TextureName::Concrete),
            ))
            .with_child(SceneNode::leaf(
                "ring",
                translate(0.0, geometry.foundation_height * 0.8, 0.0) * rotate_x_deg(UPRIGHT_DEG),
                Part::textured(ring, TextureName::Concrete),
            )),
    )
}

fn build_tower(
    geometry: &TurbineGeometry,
    cache: &mut MeshCache,
) -> Result<SceneNode, GeometryError> {
    let tower = cache.get_or_build(&Shape::TaperedCylinder {
        base_radius: geometry.base_radius,
        top_radius: geometry.top_radius,
        height: geometry.height,
        segments: geometry.segments,
    })?;

    Ok(SceneNode::leaf(
        "tower",
        translate(0.0, geometry.foundation_height, 0.0) * rotate_x_deg(UPRIGHT_DEG),
        Part::textured(tower, TextureName::Metal),
    ))
}

fn build_nacelle_body(
    geometry: &TurbineGeometry,
    cache: &mut MeshCache,
) -> Result<SceneNode, GeometryError> {
    let body = cache.get_or_build(&Shape::Ellipsoid {
        a: geometry.nacelle_length,
        b: geometry.nacelle_height,
        c: geometry.nacelle_width,
        segments: NACELLE_SEGMENTS,
    })?;
    let vent = cache.get_or_build(&Shape::Cuboid {
        width: 0.2,
        height: 0.8,
        depth: 0.2,
    })?;

    // Long axis across the rotor mount; only the width semi-axis lies along +X
    let mut node = SceneNode::leaf(
        "body",
        rotate_y_deg(90.0),
        Part::textured(body, TextureName::Nacelle),
    );
    let radius = geometry.nacelle_width * 0.9;
    for k in 0..VENT_COUNT {
        let angle = (k as f32 * 45.0).to_radians();
        node.push(SceneNode::leaf(
            "vent",
            translate(angle.cos() * radius, 0.0, angle.sin() * radius),
            Part::flat(vent, VENT_TINT),
        ));
    }
    Ok(node)
}

fn build_rotor(
    geometry: &TurbineGeometry,
    animation: &AnimationState,
    cache: &mut MeshCache,
) -> Result<SceneNode, GeometryError> {
    let hub = cache.get_or_build(&Shape::Sphere {
        radius: geometry.hub_radius,
        segments: HUB_SEGMENTS,
    })?;
    let bolt = cache.get_or_build(&Shape::Sphere {
        radius: BOLT_RADIUS,
        segments: BOLT_SEGMENTS,
    })?;
    let blade = cache.get_or_build(&Shape::Blade {
        length: geometry.blade_length,
        root_half_width: geometry.hub_radius,
        segments: geometry.blade_segments,
    })?;

    let mut hub_node = SceneNode::leaf(
        "hub",
        glam::Mat4::IDENTITY,
        Part::textured(hub, TextureName::Metal).with_tint(HUB_TINT),
    );
    let bolt_radius = geometry.hub_radius * 0.8;
    for k in 0..BOLT_COUNT {
        let angle = (k as f32 * 30.0).to_radians();
        hub_node.push(SceneNode::leaf(
            "bolt",
            translate(angle.cos() * bolt_radius, 0.0, angle.sin() * bolt_radius),
            Part::textured(bolt, TextureName::Metal),
        ));
    }

    let mut rotor = SceneNode::group(
        "rotor",
        translate(geometry.nacelle_length * ROTOR_OFFSET, 0.0, 0.0),
    )
    .with_child(hub_node);

    // The rotor spins about its local X axis
    for (k, name) in BLADE_NAMES.iter().enumerate() {
        rotor.push(SceneNode::leaf(
            *name,
            rotate_x_deg(animation.blade_rotation + 120.0 * k as f32),
            Part::textured(blade, TextureName::Blade).with_tint(BLADE_TINT),
        ));
    }

    Ok(rotor)
}
