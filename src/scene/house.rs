//! Fixed, hand-authored house model: brick walls, gabled roof, door, windows.

use glam::{Vec2, Vec3};

use super::textures::TextureName;
use crate::geometry::{SurfaceMesh, Vertex};

const WINDOW_TINT: [f32; 3] = [0.5, 0.8, 1.0];

/// One material group of the house.
pub struct HousePart {
    pub name: &'static str,
    pub texture: Option<TextureName>,
    pub tint: [f32; 3],
    pub mesh: SurfaceMesh,
}

/// Face normal from the first three corners.
fn face_normal(p: &[Vec3]) -> Vec3 {
    (p[1] - p[0]).cross(p[2] - p[0]).normalize_or_zero()
}

fn quad(corners: [[f32; 3]; 4], uvs: [[f32; 2]; 4]) -> [Vertex; 4] {
    let p = corners.map(Vec3::from_array);
    let n = face_normal(&p);
    [0, 1, 2, 3].map(|k| Vertex::new(p[k], n, Vec2::from_array(uvs[k])))
}

fn triangle(corners: [[f32; 3]; 3], uvs: [[f32; 2]; 3]) -> [Vertex; 3] {
    let p = corners.map(Vec3::from_array);
    let n = face_normal(&p);
    [0, 1, 2].map(|k| Vertex::new(p[k], n, Vec2::from_array(uvs[k])))
}

const UNIT_UV: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// House centred on the origin; walls span `[-2, 2]` on every axis, roof peaks at `y = 4`.
pub fn house_parts() -> Vec<HousePart> {
    let mut walls = SurfaceMesh::new();
    walls.push_quad(quad(
        [[-2.0, -2.0, 2.0], [2.0, -2.0, 2.0], [2.0, 2.0, 2.0], [-2.0, 2.0, 2.0]],
        UNIT_UV,
    ));
    walls.push_quad(quad(
        [[-2.0, -2.0, -2.0], [-2.0, 2.0, -2.0], [2.0, 2.0, -2.0], [2.0, -2.0, -2.0]],
        UNIT_UV,
    ));
    walls.push_quad(quad(
        [[2.0, -2.0, -2.0], [2.0, 2.0, -2.0], [2.0, 2.0, 2.0], [2.0, -2.0, 2.0]],
        UNIT_UV,
    ));
    walls.push_quad(quad(
        [[-2.0, -2.0, -2.0], [-2.0, -2.0, 2.0], [-2.0, 2.0, 2.0], [-2.0, 2.0, -2.0]],
        UNIT_UV,
    ));

    let mut roof = SurfaceMesh::new();
    roof.push_triangle(triangle(
        [[-2.5, 2.0, 2.0], [2.5, 2.0, 2.0], [0.0, 4.0, 2.0]],
        [[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]],
    ));
    roof.push_triangle(triangle(
        [[-2.5, 2.0, -2.0], [0.0, 4.0, -2.0], [2.5, 2.0, -2.0]],
        [[0.0, 0.0], [0.5, 1.0], [1.0, 0.0]],
    ));
    roof.push_quad(quad(
        [[-2.5, 2.0, 2.0], [0.0, 4.0, 2.0], [0.0, 4.0, -2.0], [-2.5, 2.0, -2.0]],
        UNIT_UV,
    ));
    roof.push_quad(quad(
        [[2.5, 2.0, 2.0], [2.5, 2.0, -2.0], [0.0, 4.0, -2.0], [0.0, 4.0, 2.0]],
        UNIT_UV,
    ));

    let mut door = SurfaceMesh::new();
    door.push_quad(quad(
        [[-0.5, -2.0, 2.01], [0.5, -2.0, 2.01], [0.5, 0.0, 2.01], [-0.5, 0.0, 2.01]],
        UNIT_UV,
    ));

    let mut windows = SurfaceMesh::new();
    for x in [-1.5, 0.5] {
        windows.push_quad(quad(
            [
                [x, 0.5, 2.01],
                [x + 1.0, 0.5, 2.01],
                [x + 1.0, 1.5, 2.01],
                [x, 1.5, 2.01],
            ],
            UNIT_UV,
        ));
    }

    vec![
        HousePart {
            name: "house/walls",
            texture: Some(TextureName::HouseWall),
            tint: [1.0; 3],
            mesh: walls,
        },
        HousePart {
            name: "house/roof",
            texture: Some(TextureName::Roof),
            tint: [1.0; 3],
            mesh: roof,
        },
        HousePart {
            name: "house/door",
            texture: Some(TextureName::Door),
            tint: [1.0; 3],
            mesh: door,
        },
        HousePart {
            name: "house/windows",
            texture: None,
            tint: WINDOW_TINT,
            mesh: windows,
        },
    ]
}
