//! Procedural wind-farm scene: terrain, a house and animated wind turbines,
//! rendered with wgpu.

pub mod animation;
pub mod config;
pub mod geometry;
pub mod input;
pub mod renderer;
pub mod scene;
pub mod terrain;
pub mod turbine;
pub mod ui;
