//! Parametric surface generators.
//!
//! Every generator is a pure function of its parameters: the same input always
//! produces the same vertex, normal and UV sequence.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use super::{nonzero, positive, GeometryError, SurfaceMesh, Vertex};

/// Cylinder around local +Z from `z = 0` to `z = height`, radius tapering linearly
/// from `base_radius` to `top_radius`, closed by two cap fans.
pub fn tapered_cylinder(
    base_radius: f32,
    top_radius: f32,
    height: f32,
    segments: u32,
) -> Result<SurfaceMesh, GeometryError> {
    let base_radius = positive("base_radius", base_radius)?;
    let top_radius = positive("top_radius", top_radius)?;
    let height = positive("height", height)?;
    let segments = nonzero("segments", segments)?;

    let mut mesh = SurfaceMesh::new();
    // Radius shrinks by this much per unit of height; tilts the lateral normal
    let slope = (base_radius - top_radius) / height;
    let ring = |k: u32| {
        let s = k as f32 / segments as f32;
        let angle = s * TAU;
        (s, angle.cos(), angle.sin())
    };

    for k in 0..segments {
        let (s1, c1, n1) = ring(k);
        let (s2, c2, n2) = ring(k + 1);
        let normal1 = Vec3::new(c1, n1, slope).normalize();
        let normal2 = Vec3::new(c2, n2, slope).normalize();

        mesh.push_quad([
            Vertex::new(
                Vec3::new(c1 * base_radius, n1 * base_radius, 0.0),
                normal1,
                Vec2::new(s1, 0.0),
            ),
            Vertex::new(
                Vec3::new(c2 * base_radius, n2 * base_radius, 0.0),
                normal2,
                Vec2::new(s2, 0.0),
            ),
            Vertex::new(
                Vec3::new(c2 * top_radius, n2 * top_radius, height),
                normal2,
                Vec2::new(s2, 1.0),
            ),
            Vertex::new(
                Vec3::new(c1 * top_radius, n1 * top_radius, height),
                normal1,
                Vec2::new(s1, 1.0),
            ),
        ]);
    }

    push_disk(&mut mesh, base_radius, 0.0, -Vec3::Z, segments);
    push_disk(&mut mesh, top_radius, height, Vec3::Z, segments);

    Ok(mesh)
}

/// Triangle fan in the plane `z = z`, wound to face `normal`.
fn push_disk(mesh: &mut SurfaceMesh, radius: f32, z: f32, normal: Vec3, segments: u32) {
    let center = Vertex::new(Vec3::new(0.0, 0.0, z), normal, Vec2::splat(0.5));
    let rim = |k: u32| {
        let angle = k as f32 / segments as f32 * TAU;
        let (sin, cos) = angle.sin_cos();
        Vertex::new(
            Vec3::new(cos * radius, sin * radius, z),
            normal,
            Vec2::new(0.5 + cos * 0.5, 0.5 + sin * 0.5),
        )
    };

    for k in 0..segments {
        let (a, b) = (rim(k), rim(k + 1));
        if normal.z >= 0.0 {
            mesh.push_triangle([center, a, b]);
        } else {
            mesh.push_triangle([center, b, a]);
        }
    }
}

/// Ellipsoid with radii `a`, `b`, `c` along X, Y, Z; `segments²` quads.
///
/// Normals are the positions scaled by `(1/a, 1/b, 1/c)` and are left unnormalized.
pub fn ellipsoid(a: f32, b: f32, c: f32, segments: u32) -> Result<SurfaceMesh, GeometryError> {
    let a = positive("a", a)?;
    let b = positive("b", b)?;
    let c = positive("c", c)?;
    let segments = nonzero("segments", segments)?;

    let n = segments as f32;
    let point = |i: u32, j: u32| {
        let u = i as f32 / n * PI;
        let v = j as f32 / n * TAU;
        let position = Vec3::new(a * u.sin() * v.cos(), b * u.cos(), c * u.sin() * v.sin());
        let normal = position / Vec3::new(a, b, c);
        Vertex::new(position, normal, Vec2::new(j as f32 / n, i as f32 / n))
    };

    let mut mesh = SurfaceMesh::new();
    for i in 0..segments {
        for j in 0..segments {
            mesh.push_quad([
                point(i, j),
                point(i + 1, j),
                point(i + 1, j + 1),
                point(i, j + 1),
            ]);
        }
    }
    Ok(mesh)
}

/// Sphere of `radius`, tessellated as an ellipsoid with equal radii.
pub fn sphere(radius: f32, segments: u32) -> Result<SurfaceMesh, GeometryError> {
    ellipsoid(radius, radius, radius, segments)
}

/// Torus revolved around local +Z; `major_segments × minor_segments` quads.
pub fn torus(
    major_radius: f32,
    minor_radius: f32,
    major_segments: u32,
    minor_segments: u32,
) -> Result<SurfaceMesh, GeometryError> {
    let major_radius = positive("major_radius", major_radius)?;
    let minor_radius = positive("minor_radius", minor_radius)?;
    let major_segments = nonzero("major_segments", major_segments)?;
    let minor_segments = nonzero("minor_segments", minor_segments)?;

    let point = |i: u32, j: u32| {
        let u = i as f32 / major_segments as f32 * TAU;
        let v = j as f32 / minor_segments as f32 * TAU;
        let ring = major_radius + minor_radius * v.cos();
        let position = Vec3::new(ring * u.cos(), ring * u.sin(), minor_radius * v.sin());
        let normal = Vec3::new(v.cos() * u.cos(), v.cos() * u.sin(), v.sin());
        Vertex::new(position, normal, Vec2::new(u / TAU, v / TAU))
    };

    let mut mesh = SurfaceMesh::new();
    for i in 0..major_segments {
        for j in 0..minor_segments {
            mesh.push_quad([
                point(i, j),
                point(i + 1, j),
                point(i + 1, j + 1),
                point(i, j + 1),
            ]);
        }
    }
    Ok(mesh)
}

/// Axis-aligned box centred on the origin.
pub fn cuboid(width: f32, height: f32, depth: f32) -> Result<SurfaceMesh, GeometryError> {
    let half = Vec3::new(
        positive("width", width)?,
        positive("height", height)?,
        positive("depth", depth)?,
    ) * 0.5;

    let faces = [
        (Vec3::X, Vec3::Z),
        (-Vec3::X, Vec3::Y),
        (Vec3::Y, Vec3::X),
        (-Vec3::Y, Vec3::Z),
        (Vec3::Z, Vec3::Y),
        (-Vec3::Z, Vec3::X),
    ];

    let mut mesh = SurfaceMesh::new();
    for (normal, tangent) in faces {
        // Counter-clockwise seen from outside
        let bitangent = normal.cross(tangent);
        let corner = |s: f32, t: f32| {
            let p = (normal + tangent * s + bitangent * t) * half;
            Vertex::new(p, normal, Vec2::new((s + 1.0) * 0.5, (t + 1.0) * 0.5))
        };
        mesh.push_quad([
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        ]);
    }
    Ok(mesh)
}
