use glam::{Mat4, Vec3};

/// Projection used for the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

impl Projection {
    pub fn toggled(self) -> Self {
        match self {
            Projection::Perspective => Projection::Orthographic,
            Projection::Orthographic => Projection::Perspective,
        }
    }
}

/// Distance of the recomputed look-at target from the camera.
const LOOK_DISTANCE: f32 = 50.0;
const MIN_ZOOM: f32 = 10.0;
const MAX_ZOOM: f32 = 120.0;
const ZOOM_STEP: f32 = 2.0;
/// Degrees per arrow key press
const TURN_STEP: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Look-at target point
    pub target: Vec3,
    /// Degrees, positive looks up
    pub pitch: f32,
    /// Degrees, 0 looks along +Z
    pub yaw: f32,
    /// Field of view in degrees (perspective) or half extent (orthographic)
    pub zoom: f32,
    /// World units per strafe step
    pub speed: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(50.0, 30.0, 80.0),
            target: Vec3::new(0.0, 20.0, 0.0),
            pitch: -10.0,
            yaw: -30.0,
            zoom: 45.0,
            speed: 2.0,
        }
    }

    /// Restore position, target and zoom. Pitch and yaw are kept.
    pub fn reset(&mut self) {
        let fresh = Self::new();
        self.position = fresh.position;
        self.target = fresh.target;
        self.zoom = fresh.zoom;
    }

    /// Recompute the target from position, pitch and yaw.
    pub fn update_target(&mut self) {
        let (pitch, yaw) = (self.pitch.to_radians(), self.yaw.to_radians());
        let direction = Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos());
        self.target = self.position + direction * LOOK_DISTANCE;
    }

    pub fn turn(&mut self, pitch_steps: f32, yaw_steps: f32) {
        self.pitch += pitch_steps * TURN_STEP;
        self.yaw += yaw_steps * TURN_STEP;
        self.update_target();
    }

    /// Move a tenth of the horizontal distance toward (or away from) the target.
    pub fn advance(&mut self, forward: bool) {
        let delta = (self.target - self.position) * 0.1;
        let sign = if forward { 1.0 } else { -1.0 };
        self.position.x += delta.x * sign;
        self.position.z += delta.z * sign;
    }

    pub fn strafe(&mut self, dx: f32, dy: f32) {
        self.position.x += dx * self.speed;
        self.position.y += dy * self.speed;
    }

    /// Positive steps zoom in (narrower view).
    pub fn zoom_by(&mut self, steps: f32) {
        self.zoom = (self.zoom - steps * ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Build view matrix (camera transform)
    pub fn build_view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Build projection matrix for the given mode
    pub fn build_projection_matrix(&self, projection: Projection, aspect: f32) -> Mat4 {
        match projection {
            Projection::Perspective => {
                Mat4::perspective_rh(self.zoom.to_radians(), aspect, 1.0, 500.0)
            }
            Projection::Orthographic => {
                let size = self.zoom;
                Mat4::orthographic_rh(-size * aspect, size * aspect, -size, size, -200.0, 200.0)
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_default() {
        let camera = Camera::new();
        assert_eq!(camera.position, Vec3::new(50.0, 30.0, 80.0));
        assert_eq!(camera.target, Vec3::new(0.0, 20.0, 0.0));
        assert_eq!(camera.zoom, 45.0);
    }

    #[test]
    fn test_turn_recomputes_target() {
        let mut camera = Camera::new();
        camera.pitch = 0.0;
        camera.yaw = 0.0;
        camera.update_target();
        // Level, yaw 0 looks along +Z
        assert!((camera.target - (camera.position + Vec3::new(0.0, 0.0, 50.0))).length() < 1e-4);

        camera.turn(1.0, 0.0);
        assert_eq!(camera.pitch, 2.0);
        assert!(camera.target.y > camera.position.y);
        assert!(((camera.target - camera.position).length() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_advance_moves_horizontally() {
        let mut camera = Camera::new();
        let before = camera.position;
        camera.advance(true);
        assert_eq!(camera.position.y, before.y);
        assert!((camera.position.x - 45.0).abs() < 1e-4);
        assert!((camera.position.z - 72.0).abs() < 1e-4);

        camera.advance(false);
        assert!(camera.position.x > 45.0);
    }

    #[test]
    fn test_zoom_limits() {
        let mut camera = Camera::new();
        for _ in 0..100 {
            camera.zoom_by(1.0);
        }
        assert_eq!(camera.zoom, 10.0);
        for _ in 0..100 {
            camera.zoom_by(-1.0);
        }
        assert_eq!(camera.zoom, 120.0);
    }

    #[test]
    fn test_reset_keeps_orientation() {
        let mut camera = Camera::new();
        camera.turn(3.0, 3.0);
        camera.strafe(1.0, 1.0);
        camera.zoom_by(2.0);
        camera.reset();

        assert_eq!(camera.position, Vec3::new(50.0, 30.0, 80.0));
        assert_eq!(camera.zoom, 45.0);
        assert_eq!(camera.pitch, -4.0);
    }

    #[test]
    fn test_view_projection_matrix() {
        let camera = Camera::new();
        for projection in [Projection::Perspective, Projection::Orthographic] {
            let vp = camera.build_projection_matrix(projection, 4.0 / 3.0)
                * camera.build_view_matrix();
            assert!(vp.determinant().abs() > 0.0);
        }
        assert_eq!(Projection::Perspective.toggled(), Projection::Orthographic);
    }
}
