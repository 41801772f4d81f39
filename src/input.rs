//! Input handling for camera control and scene toggles.
//!
//! Maps keyboard and mouse wheel events onto [`SceneState`].

use winit::event::{ElementState, MouseScrollDelta};
use winit::keyboard::KeyCode;

use crate::scene::SceneState;

/// Sensitivity constants for input handling.
pub struct InputConfig {
    /// Zoom steps per wheel line
    pub scroll_zoom_steps: f32,
    /// Pixels of touchpad scroll per wheel line
    pub pixels_per_line: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            scroll_zoom_steps: 1.0,
            pixels_per_line: 20.0,
        }
    }
}

/// What the application should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Continue,
    Exit,
}

/// Input controller that processes events and updates scene state.
pub struct InputController {
    pub config: InputConfig,
}

impl InputController {
    pub fn new() -> Self {
        Self {
            config: InputConfig::default(),
        }
    }

    /// Handle keyboard key press/release. Releases are ignored; held keys
    /// repeat through the platform's key repeat.
    pub fn handle_keyboard(
        &mut self,
        key: KeyCode,
        state: ElementState,
        scene: &mut SceneState,
    ) -> InputAction {
        if state != ElementState::Pressed {
            return InputAction::Continue;
        }

        let camera = &mut scene.camera;
        match key {
            KeyCode::Escape => return InputAction::Exit,
            KeyCode::KeyW => camera.advance(true),
            KeyCode::KeyS => camera.advance(false),
            KeyCode::KeyA => camera.strafe(-1.0, 0.0),
            KeyCode::KeyD => camera.strafe(1.0, 0.0),
            KeyCode::KeyQ => camera.strafe(0.0, 1.0),
            KeyCode::KeyE => camera.strafe(0.0, -1.0),
            KeyCode::KeyR => camera.reset(),
            KeyCode::ArrowUp => camera.turn(1.0, 0.0),
            KeyCode::ArrowDown => camera.turn(-1.0, 0.0),
            KeyCode::ArrowLeft => camera.turn(0.0, -1.0),
            KeyCode::ArrowRight => camera.turn(0.0, 1.0),
            KeyCode::Equal | KeyCode::NumpadAdd => camera.zoom_by(1.0),
            KeyCode::Minus | KeyCode::NumpadSubtract => camera.zoom_by(-1.0),
            KeyCode::Space => {
                scene.animation_enabled = !scene.animation_enabled;
                log::info!("Animation {}", on_off(scene.animation_enabled));
            }
            KeyCode::KeyL => {
                scene.lighting_enabled = !scene.lighting_enabled;
                log::info!("Lighting {}", on_off(scene.lighting_enabled));
            }
            KeyCode::KeyP => {
                scene.projection = scene.projection.toggled();
                log::info!("Projection: {:?}", scene.projection);
            }
            KeyCode::Digit1 => {
                scene.wind_speed.decrease();
                log::info!("Wind speed: {:.1}", scene.wind_speed.get());
            }
            KeyCode::Digit2 => {
                scene.wind_speed.increase();
                log::info!("Wind speed: {:.1}", scene.wind_speed.get());
            }
            _ => {}
        }
        InputAction::Continue
    }

    /// Handle mouse scroll for zooming.
    pub fn handle_scroll(&mut self, delta: MouseScrollDelta, scene: &mut SceneState) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / self.config.pixels_per_line,
        };

        scene.camera.zoom_by(lines * self.config.scroll_zoom_steps);
    }
}

impl Default for InputController {
    fn default() -> Self {
        Self::new()
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::geometry::MeshCache;
    use crate::renderer::camera::{Camera, Projection};
    use glam::Vec3;

    fn scene() -> SceneState {
        let config = SceneConfig {
            terrain_size: 4,
            ..SceneConfig::default()
        };
        SceneState::new(config, &mut MeshCache::new()).unwrap()
    }

    fn press(controller: &mut InputController, key: KeyCode, scene: &mut SceneState) -> InputAction {
        controller.handle_keyboard(key, ElementState::Pressed, scene)
    }

    #[test]
    fn test_escape_exits() {
        let mut controller = InputController::new();
        let mut scene = scene();
        assert_eq!(press(&mut controller, KeyCode::Escape, &mut scene), InputAction::Exit);
        assert_eq!(press(&mut controller, KeyCode::KeyW, &mut scene), InputAction::Continue);
    }

    #[test]
    fn test_release_is_ignored() {
        let mut controller = InputController::new();
        let mut scene = scene();
        controller.handle_keyboard(KeyCode::Space, ElementState::Released, &mut scene);
        assert!(scene.animation_enabled);
    }

    #[test]
    fn test_toggles() {
        let mut controller = InputController::new();
        let mut scene = scene();

        press(&mut controller, KeyCode::Space, &mut scene);
        assert!(!scene.animation_enabled);
        press(&mut controller, KeyCode::KeyL, &mut scene);
        assert!(!scene.lighting_enabled);
        press(&mut controller, KeyCode::KeyP, &mut scene);
        assert_eq!(scene.projection, Projection::Orthographic);
        press(&mut controller, KeyCode::KeyP, &mut scene);
        assert_eq!(scene.projection, Projection::Perspective);
    }

    #[test]
    fn test_wind_speed_keys_clamp() {
        let mut controller = InputController::new();
        let mut scene = scene();

        press(&mut controller, KeyCode::Digit2, &mut scene);
        assert!((scene.wind_speed.get() - 1.2).abs() < 1e-5);

        for _ in 0..50 {
            press(&mut controller, KeyCode::Digit1, &mut scene);
        }
        assert_eq!(scene.wind_speed.get(), 0.1);
    }

    #[test]
    fn test_movement_keys() {
        let mut controller = InputController::new();
        let mut scene = scene();
        let start = scene.camera.position;

        press(&mut controller, KeyCode::KeyD, &mut scene);
        assert_eq!(scene.camera.position, start + Vec3::new(2.0, 0.0, 0.0));
        press(&mut controller, KeyCode::KeyQ, &mut scene);
        assert_eq!(scene.camera.position, start + Vec3::new(2.0, 2.0, 0.0));

        press(&mut controller, KeyCode::ArrowLeft, &mut scene);
        assert_eq!(scene.camera.yaw, -32.0);

        press(&mut controller, KeyCode::KeyR, &mut scene);
        assert_eq!(scene.camera.position, Camera::new().position);
    }

    #[test]
    fn test_zoom_keys_and_scroll() {
        let mut controller = InputController::new();
        let mut scene = scene();

        press(&mut controller, KeyCode::Equal, &mut scene);
        assert_eq!(scene.camera.zoom, 43.0);
        press(&mut controller, KeyCode::Minus, &mut scene);
        assert_eq!(scene.camera.zoom, 45.0);

        for _ in 0..100 {
            controller.handle_scroll(MouseScrollDelta::LineDelta(0.0, 1.0), &mut scene);
        }
        assert_eq!(scene.camera.zoom, 10.0);

        for _ in 0..100 {
            controller.handle_scroll(MouseScrollDelta::LineDelta(0.0, -1.0), &mut scene);
        }
        assert_eq!(scene.camera.zoom, 120.0);
    }
}
