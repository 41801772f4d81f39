//! Time-driven animation scalars shared by every turbine.
//!
//! The simulation advances by a fixed step per tick rather than by measured
//! frame time, so a run is reproducible regardless of frame rate.

/// Default simulation step per tick (about 60 Hz).
pub const DEFAULT_TIME_STEP: f32 = 0.016;
/// Default increment of the decorative global angle per tick, degrees.
pub const DEFAULT_GLOBAL_ANGLE_STEP: f32 = 0.02;
/// Blade rotation per tick per unit of wind speed, degrees.
pub const BLADE_DEGREES_PER_WIND: f32 = 2.0;
/// Peak nacelle yaw, degrees.
pub const NACELLE_YAW_AMPLITUDE: f32 = 15.0;

pub const MIN_WIND_SPEED: f32 = 0.1;
pub const MAX_WIND_SPEED: f32 = 5.0;
/// Wind speed change per key press.
pub const WIND_SPEED_STEP: f32 = 0.2;

/// Nacelle yaw in degrees after `time` seconds of animation.
pub fn nacelle_yaw_at(time: f32) -> f32 {
    (time * 0.3).sin() * NACELLE_YAW_AMPLITUDE
}

/// Sway offset after `time` seconds of animation.
pub fn tower_sway_at(time: f32) -> f32 {
    (time * 0.8).sin() * 0.5 + (time * 0.6).cos() * 0.3
}

fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Wind speed clamped to `[MIN_WIND_SPEED, MAX_WIND_SPEED]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSpeed(f32);

impl WindSpeed {
    pub fn new(value: f32) -> Self {
        let value = if value.is_nan() { 1.0 } else { value };
        Self(value.clamp(MIN_WIND_SPEED, MAX_WIND_SPEED))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn increase(&mut self) {
        *self = Self::new(self.0 + WIND_SPEED_STEP);
    }

    pub fn decrease(&mut self) {
        *self = Self::new(self.0 - WIND_SPEED_STEP);
    }
}

impl Default for WindSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Per-tick animation state; all turbines read the same instance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    /// Degrees in `[0, 360)`
    pub blade_rotation: f32,
    /// Degrees, bounded by the yaw amplitude
    pub nacelle_yaw: f32,
    pub tower_sway: f32,
    /// Simulated seconds; only advances while animation is enabled
    pub time_accumulator: f32,
    /// Decorative angle in `[0, 360)`, advances every tick
    pub global_angle: f32,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick.
    pub fn advance(&mut self, step: f32, wind_speed: WindSpeed, enabled: bool, global_step: f32) {
        if enabled {
            self.time_accumulator += step;
            self.blade_rotation =
                wrap_degrees(self.blade_rotation + wind_speed.get() * BLADE_DEGREES_PER_WIND);
            self.nacelle_yaw = nacelle_yaw_at(self.time_accumulator);
            self.tower_sway = tower_sway_at(self.time_accumulator);
        }

        self.global_angle = wrap_degrees(self.global_angle + global_step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tick_scenario() {
        let mut state = AnimationState::new();
        state.advance(
            DEFAULT_TIME_STEP,
            WindSpeed::new(1.0),
            true,
            DEFAULT_GLOBAL_ANGLE_STEP,
        );

        assert_eq!(state.blade_rotation, 2.0);
        assert_eq!(state.time_accumulator, 0.016);
        assert!((state.nacelle_yaw - 0.072).abs() < 1e-3);
        assert_eq!(state.nacelle_yaw, nacelle_yaw_at(0.016));
    }

    #[test]
    fn test_blade_rotation_wraps() {
        let mut state = AnimationState::new();
        let wind = WindSpeed::new(MAX_WIND_SPEED);
        for _ in 0..10_000 {
            state.advance(DEFAULT_TIME_STEP, wind, true, DEFAULT_GLOBAL_ANGLE_STEP);
            assert!((0.0..360.0).contains(&state.blade_rotation));
        }
    }

    #[test]
    fn test_blade_rotation_wraps_with_odd_wind() {
        let mut state = AnimationState::new();
        let wind = WindSpeed::new(1.7);
        for _ in 0..5_000 {
            state.advance(0.016, wind, true, 0.02);
            assert!(state.blade_rotation >= 0.0 && state.blade_rotation < 360.0);
            assert!(state.global_angle >= 0.0 && state.global_angle < 360.0);
        }
    }

    #[test]
    fn test_disabled_animation_only_moves_global_angle() {
        let mut state = AnimationState::new();
        state.advance(0.016, WindSpeed::default(), false, 0.02);
        state.advance(0.016, WindSpeed::default(), false, 0.02);

        assert_eq!(state.time_accumulator, 0.0);
        assert_eq!(state.blade_rotation, 0.0);
        assert_eq!(state.nacelle_yaw, 0.0);
        assert!((state.global_angle - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_oscillations_are_pure_functions_of_time() {
        for &t in &[0.0, 0.016, 1.5, 42.0, 1000.0] {
            assert_eq!(nacelle_yaw_at(t), nacelle_yaw_at(t));
            assert_eq!(tower_sway_at(t), tower_sway_at(t));
            assert!(nacelle_yaw_at(t).abs() <= NACELLE_YAW_AMPLITUDE);
            assert!(tower_sway_at(t).abs() <= 0.8 + 1e-6);
        }
    }

    #[test]
    fn test_state_matches_time_functions() {
        let mut state = AnimationState::new();
        for _ in 0..250 {
            state.advance(0.016, WindSpeed::new(2.0), true, 0.02);
        }
        assert_eq!(state.nacelle_yaw, nacelle_yaw_at(state.time_accumulator));
        assert_eq!(state.tower_sway, tower_sway_at(state.time_accumulator));
    }

    #[test]
    fn test_custom_time_step() {
        let mut state = AnimationState::new();
        state.advance(0.5, WindSpeed::default(), true, 0.0);
        assert_eq!(state.time_accumulator, 0.5);
        assert_eq!(state.nacelle_yaw, nacelle_yaw_at(0.5));
    }

    #[test]
    fn test_wind_speed_clamps() {
        assert_eq!(WindSpeed::new(-3.0).get(), MIN_WIND_SPEED);
        assert_eq!(WindSpeed::new(99.0).get(), MAX_WIND_SPEED);
        assert_eq!(WindSpeed::new(f32::NAN).get(), 1.0);

        let mut wind = WindSpeed::new(0.2);
        wind.decrease();
        wind.decrease();
        assert_eq!(wind.get(), MIN_WIND_SPEED);

        let mut wind = WindSpeed::new(4.9);
        wind.increase();
        assert_eq!(wind.get(), MAX_WIND_SPEED);
    }
}
