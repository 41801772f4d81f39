//! Twisted, tapered rotor blade.

use glam::{Vec2, Vec3};

use crate::geometry::{nonzero, positive, GeometryError, SurfaceMesh, Vertex};
use crate::scene::graph::{rotate_y_deg, translate};

/// Fraction of the root width lost at the tip.
pub const TIP_TAPER: f32 = 0.8;
/// Half thickness as a fraction of half width.
pub const THICKNESS_RATIO: f32 = 0.15;
/// Twist at the tip, degrees about the blade's length axis.
pub const TIP_TWIST_DEG: f32 = 25.0;

/// Half width at normalized span `t`.
pub fn half_width(root_half_width: f32, t: f32) -> f32 {
    root_half_width * (1.0 - t * TIP_TAPER)
}

pub fn twist_deg(t: f32) -> f32 {
    t * TIP_TWIST_DEG
}

/// Blade along +Y built from `segments` thin prisms.
///
/// Segment `i` starts at `t_i = i / segments`, is translated to `t_i * length`
/// and twisted about Y by [`twist_deg`]`(t_i)`. Each segment emits four quads:
/// top, bottom, leading edge and trailing edge.
pub fn blade_mesh(
    length: f32,
    root_half_width: f32,
    segments: u32,
) -> Result<SurfaceMesh, GeometryError> {
    let length = positive("blade_length", length)?;
    let root_half_width = positive("hub_radius", root_half_width)?;
    let segments = nonzero("blade_segments", segments)?;

    let segment_length = length / segments as f32;
    let mut blade = SurfaceMesh::new();

    for i in 0..segments {
        let t1 = i as f32 / segments as f32;
        let t2 = (i + 1) as f32 / segments as f32;
        let w1 = half_width(root_half_width, t1);
        let w2 = half_width(root_half_width, t2);
        let k1 = w1 * THICKNESS_RATIO;
        let k2 = w2 * THICKNESS_RATIO;
        let h = segment_length;

        let v = |x: f32, y: f32, z: f32, normal: Vec3, u: f32, t: f32| {
            Vertex::new(Vec3::new(x, y, z), normal, Vec2::new(u, t))
        };

        let mut segment = SurfaceMesh::new();
        // top
        segment.push_quad([
            v(-w1, 0.0, k1, Vec3::Z, 0.0, t1),
            v(w1, 0.0, k1, Vec3::Z, 1.0, t1),
            v(w2, h, k2, Vec3::Z, 1.0, t2),
            v(-w2, h, k2, Vec3::Z, 0.0, t2),
        ]);
        // bottom
        segment.push_quad([
            v(-w1, 0.0, -k1, -Vec3::Z, 0.0, t1),
            v(-w2, h, -k2, -Vec3::Z, 0.0, t2),
            v(w2, h, -k2, -Vec3::Z, 1.0, t2),
            v(w1, 0.0, -k1, -Vec3::Z, 1.0, t1),
        ]);
        // leading edge
        segment.push_quad([
            v(w1, 0.0, k1, Vec3::X, 0.0, t1),
            v(w1, 0.0, -k1, Vec3::X, 0.0, t1),
            v(w2, h, -k2, Vec3::X, 1.0, t2),
            v(w2, h, k2, Vec3::X, 1.0, t2),
        ]);
        // trailing edge
        segment.push_quad([
            v(-w1, 0.0, k1, -Vec3::X, 0.0, t1),
            v(-w2, h, k2, -Vec3::X, 1.0, t2),
            v(-w2, h, -k2, -Vec3::X, 1.0, t2),
            v(-w1, 0.0, -k1, -Vec3::X, 0.0, t1),
        ]);

        let placement = translate(0.0, t1 * length, 0.0) * rotate_y_deg(twist_deg(t1));
        blade.append_transformed(&segment, &placement);
    }

    Ok(blade)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_quads_per_segment() {
        let mesh = blade_mesh(45.0, 2.2, 20).unwrap();
        assert_eq!(mesh.quads.len(), 80);
        assert!(mesh.triangles.is_empty());
    }

    #[test]
    fn test_profile_taper_and_twist() {
        assert_eq!(half_width(2.2, 0.0), 2.2);
        assert!((half_width(2.2, 1.0) - 0.44).abs() < 1e-6);
        assert_eq!(twist_deg(0.0), 0.0);
        assert_eq!(twist_deg(1.0), 25.0);
    }

    #[test]
    fn test_blade_spans_its_length() {
        let mesh = blade_mesh(45.0, 2.2, 20).unwrap();
        let max_y = mesh
            .quads
            .iter()
            .flatten()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        let min_y = mesh
            .quads
            .iter()
            .flatten()
            .map(|v| v.position[1])
            .fold(f32::MAX, f32::min);
        assert!((max_y - 45.0).abs() < 1e-3);
        assert!(min_y.abs() < 1e-6);
    }

    #[test]
    fn test_root_segment_is_untwisted() {
        let mesh = blade_mesh(45.0, 2.2, 20).unwrap();
        // First quad is the root segment's top face, at z = +thickness
        let top = &mesh.quads[0];
        assert_eq!(top[0].position, [-2.2, 0.0, 2.2 * THICKNESS_RATIO]);
        assert_eq!(top[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_tip_segment_is_twisted() {
        let mesh = blade_mesh(45.0, 2.2, 20).unwrap();
        // Top face of the last segment: its normal is +Z turned about Y by the twist
        let top = &mesh.quads[76];
        let expected = rotate_y_deg(twist_deg(19.0 / 20.0)).transform_vector3(Vec3::Z);
        let normal = Vec3::from_array(top[0].normal);
        assert!((normal - expected).length() < 1e-5);
    }

    #[test]
    fn test_rejects_zero_segments() {
        assert!(matches!(
            blade_mesh(45.0, 2.2, 0),
            Err(GeometryError::InvalidGeometryParameter {
                name: "blade_segments",
                ..
            })
        ));
    }
}
