use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use windscape::config::{turbine_placements, SceneConfig};
use windscape::geometry::MeshCache;
use windscape::input::{InputAction, InputController};
use windscape::renderer::{RenderError, Renderer};
use windscape::scene::SceneState;

#[derive(Parser, Debug)]
#[command(name = "windscape")]
#[command(about = "Procedural wind farm scene")]
struct Args {
    /// Initial wind speed (clamped to 0.1..=5.0)
    #[arg(long, default_value = "1.0")]
    wind_speed: f32,

    /// Number of turbine instances
    #[arg(long, default_value = "3")]
    turbines: usize,

    /// Start with the orthographic projection
    #[arg(long)]
    orthographic: bool,

    /// Start with animation paused
    #[arg(long)]
    paused: bool,

    /// Start with lighting disabled
    #[arg(long)]
    no_lighting: bool,

    /// Simulated seconds per tick
    #[arg(long, default_value = "0.016")]
    time_step: f32,

    /// Terrain cells per axis
    #[arg(long, default_value = "50")]
    terrain_size: usize,

    /// Seed for terrain material classification
    #[arg(long, default_value = "42")]
    seed: u64,
}

impl Args {
    fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            wind_speed: self.wind_speed,
            turbine_placements: turbine_placements(self.turbines),
            orthographic: self.orthographic,
            animation_enabled: !self.paused,
            lighting_enabled: !self.no_lighting,
            time_step: self.time_step,
            terrain_size: self.terrain_size,
            material_seed: self.seed,
            ..SceneConfig::default()
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: SceneState,
    cache: MeshCache,
    input: InputController,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes().with_title("windscape");
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Renderer::new(window.clone(), self.scene.config.texture_seed)) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let (Some(window), Some(renderer)) = (self.window.as_ref(), self.renderer.as_mut()) else {
            return;
        };

        let consumed = renderer.handle_window_event(window, &event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } if !consumed || !renderer.wants_keyboard_input() => {
                if self.input.handle_keyboard(code, state, &mut self.scene) == InputAction::Exit {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                self.input.handle_scroll(delta, &mut self.scene);
            }
            WindowEvent::Resized(physical_size) => {
                renderer.resize(physical_size);
            }
            WindowEvent::RedrawRequested => {
                // One simulation tick per rendered frame
                self.scene.update();
                match renderer.render(window, &mut self.scene, &mut self.cache) {
                    Ok(()) => {}
                    Err(RenderError::Surface(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    )) => renderer.resize(renderer.size),
                    Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                        log::error!("Out of GPU memory");
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("Render error: {}", e),
                }
                window.request_redraw();
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut cache = MeshCache::new();
    let scene = SceneState::new(args.scene_config(), &mut cache)?;
    log::info!(
        "Scene ready: {} turbines, {} static meshes, wind speed {:.1}",
        scene.config.turbine_placements.len(),
        cache.len(),
        scene.wind_speed.get()
    );

    // Create window and run
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        renderer: None,
        scene,
        cache,
        input: InputController::new(),
    };

    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args_match_reference_scene() {
        let args = Args::parse_from(["windscape"]);
        assert_eq!(args.scene_config(), SceneConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "windscape",
            "--turbines",
            "5",
            "--paused",
            "--no-lighting",
            "--orthographic",
            "--seed",
            "7",
        ]);
        let config = args.scene_config();
        assert_eq!(config.turbine_placements.len(), 5);
        assert!(!config.animation_enabled);
        assert!(!config.lighting_enabled);
        assert!(config.orthographic);
        assert_eq!(config.material_seed, 7);
    }
}
