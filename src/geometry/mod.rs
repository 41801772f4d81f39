//! Procedural surface geometry.
//!
//! This module provides:
//! - [`Vertex`] - GPU vertex layout (position, normal, texture coordinate)
//! - [`SurfaceMesh`] - quads and triangles produced by the generators
//! - [`primitives`] - tapered cylinder, ellipsoid, torus, sphere and cuboid generators
//! - [`MeshCache`] - memoized meshes keyed by shape parameters

pub mod cache;
pub mod primitives;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use thiserror::Error;

pub use cache::{MeshCache, MeshKey, Shape};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid geometry parameter `{name}`: {value} (must be positive)")]
    InvalidGeometryParameter { name: &'static str, value: f32 },
}

/// Fails unless `value` is strictly positive (NaN fails too).
pub(crate) fn positive(name: &'static str, value: f32) -> Result<f32, GeometryError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(GeometryError::InvalidGeometryParameter { name, value })
    }
}

pub(crate) fn nonzero(name: &'static str, value: u32) -> Result<u32, GeometryError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(GeometryError::InvalidGeometryParameter {
            name,
            value: value as f32,
        })
    }
}

/// Vertex data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }

    fn transformed(&self, matrix: &Mat4) -> Self {
        let position = matrix.transform_point3(Vec3::from_array(self.position));
        let normal = matrix.transform_vector3(Vec3::from_array(self.normal));
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: self.uv,
        }
    }
}

/// Tessellated surface: an ordered list of quads plus triangles (cap fans, gables).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    pub quads: Vec<[Vertex; 4]>,
    pub triangles: Vec<[Vertex; 3]>,
}

impl SurfaceMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_quad(&mut self, quad: [Vertex; 4]) {
        self.quads.push(quad);
    }

    pub fn push_triangle(&mut self, triangle: [Vertex; 3]) {
        self.triangles.push(triangle);
    }

    /// Number of quad corner entries (4 per quad).
    pub fn quad_corner_count(&self) -> usize {
        self.quads.len() * 4
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty() && self.triangles.is_empty()
    }

    /// Appends `other` after transforming it by `matrix`.
    ///
    /// Only rigid transforms keep the normals meaningful; normals are not renormalized.
    pub fn append_transformed(&mut self, other: &SurfaceMesh, matrix: &Mat4) {
        self.quads.extend(
            other
                .quads
                .iter()
                .map(|q| q.map(|v| v.transformed(matrix))),
        );
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| t.map(|v| v.transformed(matrix))),
        );
    }

    /// Flatten into an indexed triangle list for GPU upload.
    ///
    /// Each quad `(0, 1, 2, 3)` becomes triangles `(0, 1, 2)` and `(0, 2, 3)`.
    pub fn to_indexed(&self) -> (Vec<Vertex>, Vec<u32>) {
        let mut vertices = Vec::with_capacity(self.quads.len() * 4 + self.triangles.len() * 3);
        let mut indices = Vec::with_capacity(self.quads.len() * 6 + self.triangles.len() * 3);

        for quad in &self.quads {
            let base = vertices.len() as u32;
            vertices.extend_from_slice(quad);
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        for triangle in &self.triangles {
            let base = vertices.len() as u32;
            vertices.extend_from_slice(triangle);
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        (vertices, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_quad() -> [Vertex; 4] {
        let n = Vec3::Y;
        [
            Vertex::new(Vec3::new(0.0, 0.0, 0.0), n, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(1.0, 0.0, 0.0), n, Vec2::new(1.0, 0.0)),
            Vertex::new(Vec3::new(1.0, 0.0, 1.0), n, Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(0.0, 0.0, 1.0), n, Vec2::new(0.0, 1.0)),
        ]
    }

    #[test]
    fn test_positive_rejects_zero_negative_and_nan() {
        assert!(positive("radius", 1.0).is_ok());
        assert!(positive("radius", 0.0).is_err());
        assert!(positive("radius", -2.0).is_err());
        assert!(positive("radius", f32::NAN).is_err());
        assert_eq!(
            nonzero("segments", 0),
            Err(GeometryError::InvalidGeometryParameter {
                name: "segments",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_to_indexed_splits_quads() {
        let mut mesh = SurfaceMesh::new();
        mesh.push_quad(flat_quad());
        let (vertices, indices) = mesh.to_indexed();

        assert_eq!(vertices.len(), 4);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_append_transformed_moves_positions() {
        let mut source = SurfaceMesh::new();
        source.push_quad(flat_quad());

        let mut target = SurfaceMesh::new();
        target.append_transformed(&source, &Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));

        assert_eq!(target.quads.len(), 1);
        assert!(target.quads[0].iter().all(|v| v.position[1] == 5.0));
        // Translation must not touch normals
        assert!(target.quads[0].iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }
}
