//! Memoized surface meshes.
//!
//! The generators are pure, so a mesh is fully identified by its shape kind and
//! parameter tuple. Parameters are keyed by their bit patterns.

use std::collections::HashMap;
use std::sync::Arc;

use super::{primitives, GeometryError, SurfaceMesh};
use crate::turbine::blade;

/// A parametric shape the cache knows how to generate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    TaperedCylinder {
        base_radius: f32,
        top_radius: f32,
        height: f32,
        segments: u32,
    },
    Ellipsoid {
        a: f32,
        b: f32,
        c: f32,
        segments: u32,
    },
    Sphere {
        radius: f32,
        segments: u32,
    },
    Torus {
        major_radius: f32,
        minor_radius: f32,
        major_segments: u32,
        minor_segments: u32,
    },
    Cuboid {
        width: f32,
        height: f32,
        depth: f32,
    },
    Blade {
        length: f32,
        root_half_width: f32,
        segments: u32,
    },
}

impl Shape {
    pub fn generate(&self) -> Result<SurfaceMesh, GeometryError> {
        match *self {
            Shape::TaperedCylinder {
                base_radius,
                top_radius,
                height,
                segments,
            } => primitives::tapered_cylinder(base_radius, top_radius, height, segments),
            Shape::Ellipsoid { a, b, c, segments } => primitives::ellipsoid(a, b, c, segments),
            Shape::Sphere { radius, segments } => primitives::sphere(radius, segments),
            Shape::Torus {
                major_radius,
                minor_radius,
                major_segments,
                minor_segments,
            } => primitives::torus(major_radius, minor_radius, major_segments, minor_segments),
            Shape::Cuboid {
                width,
                height,
                depth,
            } => primitives::cuboid(width, height, depth),
            Shape::Blade {
                length,
                root_half_width,
                segments,
            } => blade::blade_mesh(length, root_half_width, segments),
        }
    }

    pub fn key(&self) -> MeshKey {
        let (kind, params) = match *self {
            Shape::TaperedCylinder {
                base_radius,
                top_radius,
                height,
                segments,
            } => (
                0,
                [base_radius.to_bits(), top_radius.to_bits(), height.to_bits(), segments],
            ),
            Shape::Ellipsoid { a, b, c, segments } => {
                (1, [a.to_bits(), b.to_bits(), c.to_bits(), segments])
            }
            Shape::Sphere { radius, segments } => (2, [radius.to_bits(), segments, 0, 0]),
            Shape::Torus {
                major_radius,
                minor_radius,
                major_segments,
                minor_segments,
            } => (
                3,
                [
                    major_radius.to_bits(),
                    minor_radius.to_bits(),
                    major_segments,
                    minor_segments,
                ],
            ),
            Shape::Cuboid {
                width,
                height,
                depth,
            } => (4, [width.to_bits(), height.to_bits(), depth.to_bits(), 0]),
            Shape::Blade {
                length,
                root_half_width,
                segments,
            } => (5, [length.to_bits(), root_half_width.to_bits(), segments, 0]),
        };
        MeshKey::Shape { kind, params }
    }
}

/// Identifies a mesh in the cache (and its GPU buffers in the renderer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKey {
    Shape { kind: u8, params: [u32; 4] },
    /// Hand-authored or one-off meshes (terrain batches, house parts).
    Static(&'static str),
}

/// Mesh store shared by the scene composer and the renderer.
#[derive(Debug, Default)]
pub struct MeshCache {
    meshes: HashMap<MeshKey, Arc<SurfaceMesh>>,
    misses: usize,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the mesh for `shape`, generating it on first use.
    pub fn get_or_build(&mut self, shape: &Shape) -> Result<MeshKey, GeometryError> {
        let key = shape.key();
        if !self.meshes.contains_key(&key) {
            let mesh = shape.generate()?;
            log::debug!(
                "Generated {:?}: {} quads, {} triangles",
                shape,
                mesh.quads.len(),
                mesh.triangles.len()
            );
            self.meshes.insert(key, Arc::new(mesh));
            self.misses += 1;
        }
        Ok(key)
    }

    pub fn insert_static(&mut self, name: &'static str, mesh: SurfaceMesh) -> MeshKey {
        let key = MeshKey::Static(name);
        self.meshes.insert(key, Arc::new(mesh));
        key
    }

    pub fn get(&self, key: &MeshKey) -> Option<Arc<SurfaceMesh>> {
        self.meshes.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Number of shapes generated so far (cache misses).
    pub fn generated(&self) -> usize {
        self.misses
    }
}
