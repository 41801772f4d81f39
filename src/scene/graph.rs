//! Hierarchical scene nodes.
//!
//! Each node carries its transform relative to its parent. Flattening walks the
//! tree top-down, multiplying transforms, and emits one [`DrawCommand`] per part.

use glam::{Mat4, Vec3};

use super::textures::TextureName;
use crate::geometry::MeshKey;

pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

pub fn rotate_x_deg(degrees: f32) -> Mat4 {
    Mat4::from_rotation_x(degrees.to_radians())
}

pub fn rotate_y_deg(degrees: f32) -> Mat4 {
    Mat4::from_rotation_y(degrees.to_radians())
}

/// Drawable attached to a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub mesh: MeshKey,
    /// `None` draws flat-coloured
    pub texture: Option<TextureName>,
    pub tint: [f32; 3],
}

impl Part {
    pub fn textured(mesh: MeshKey, texture: TextureName) -> Self {
        Self {
            mesh,
            texture: Some(texture),
            tint: [1.0; 3],
        }
    }

    pub fn flat(mesh: MeshKey, tint: [f32; 3]) -> Self {
        Self {
            mesh,
            texture: None,
            tint,
        }
    }

    pub fn with_tint(mut self, tint: [f32; 3]) -> Self {
        self.tint = tint;
        self
    }
}

/// One draw in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub mesh: MeshKey,
    pub model: Mat4,
    pub texture: Option<TextureName>,
    pub tint: [f32; 3],
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: &'static str,
    pub local: Mat4,
    pub part: Option<Part>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: &'static str, local: Mat4) -> Self {
        Self {
            name,
            local,
            part: None,
            children: Vec::new(),
        }
    }

    pub fn leaf(name: &'static str, local: Mat4, part: Part) -> Self {
        Self {
            name,
            local,
            part: Some(part),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Append draws for this subtree, parts before children, depth-first.
    pub fn flatten(&self, parent: Mat4, out: &mut Vec<DrawCommand>) {
        let world = parent * self.local;
        if let Some(part) = self.part {
            out.push(DrawCommand {
                mesh: part.mesh,
                model: world,
                texture: part.texture,
                tint: part.tint,
            });
        }
        for child in &self.children {
            child.flatten(world, out);
        }
    }

    /// World transforms of every node called `name`, in traversal order.
    pub fn world_transforms(&self, name: &str, parent: Mat4) -> Vec<Mat4> {
        let mut found = Vec::new();
        self.collect_transforms(name, parent, &mut found);
        found
    }

    fn collect_transforms(&self, name: &str, parent: Mat4, found: &mut Vec<Mat4>) {
        let world = parent * self.local;
        if self.name == name {
            found.push(world);
        }
        for child in &self.children {
            child.collect_transforms(name, world, found);
        }
    }

    /// Number of drawable parts in this subtree.
    pub fn part_count(&self) -> usize {
        self.part.is_some() as usize + self.children.iter().map(|c| c.part_count()).sum::<usize>()
    }
}
