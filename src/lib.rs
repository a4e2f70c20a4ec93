//! Twoball Volley - physics and prediction core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, obstacles, stepping, prediction)
//! - `config`: Explicit tunables passed to every constructor
//!
//! Court coordinates: net at x = 0, ground at y = 0, +y is up.

pub mod config;
pub mod sim;

pub use config::{ConfigError, PhysicsConfig};

use glam::Vec2;

/// Default tunables
pub mod consts {
    /// Real-time physics sub-step (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum sub-steps per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the clock will accept before clipping
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Global gravity (court units/s²)
    pub const GRAVITY_Y: f32 = -1.9;

    /// Half the playable court width (inner wall faces at ±this)
    pub const COURT_HALF_WIDTH: f32 = 1.0;
    pub const WALL_THICKNESS: f32 = 0.2;
    pub const WALL_HEIGHT: f32 = 4.0;
    pub const NET_WIDTH: f32 = 0.02;
    pub const NET_HEIGHT: f32 = 0.25;
    pub const FLOOR_THICKNESS: f32 = 0.2;

    /// Ball defaults
    pub const BALL_DIAMETER: f32 = 0.08;
    pub const BALL_DENSITY: f32 = 1.0;
    pub const BALL_MAX_SPEED: f32 = 3.0;
    pub const BALL_ELASTICITY: f32 = 0.8;

    /// Player defaults
    pub const PLAYER_DIAMETER: f32 = 0.2;
    pub const PLAYER_MIN_DIAMETER: f32 = 0.12;
    pub const PLAYER_MAX_DIAMETER: f32 = 0.32;
    pub const PLAYER_DENSITY: f32 = 4.0;
    pub const PLAYER_GRAVITY_MULTIPLIER: f32 = 1.5;
    pub const PLAYER_MAX_SPEED: f32 = 2.5;
    pub const PLAYER_JUMP_SPEED: f32 = 1.6;
    /// Rate at which horizontal velocity springs toward the target (1/s)
    pub const PLAYER_HORIZONTAL_SPRING: f32 = 12.0;
    /// Diameter change per second at full grow intent
    pub const PLAYER_GROW_RATE: f32 = 0.1;
    pub const PLAYER_ELASTICITY: f32 = 0.6;

    /// Prediction defaults
    pub const PREDICTION_LOOKAHEAD: f32 = 2.0;
    pub const PREDICTION_FINE_DT: f32 = 1.0 / 240.0;
    pub const PREDICTION_SAMPLE_DT: f32 = 0.05;
    pub const PREDICTION_INTERVAL: f32 = 0.25;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Counter-clockwise perpendicular, the contact tangent for a given normal
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Move `current` toward `target` by `rate * dt` of the remaining gap (never overshoots)
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (rate * dt).min(1.0)
}

/// Rescale `velocity` to at most `max_speed`, preserving direction
#[inline]
pub fn clamp_speed(velocity: Vec2, max_speed: f32) -> Vec2 {
    velocity.clamp_length_max(max_speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle() {
        use std::f32::consts::PI;
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert!((normalize_angle(-2.5 * PI) + 0.5 * PI).abs() < 1e-5);
        // Odd multiples of pi land on either end of the range depending on rounding
        assert!((normalize_angle(3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_approach_never_overshoots() {
        assert_eq!(approach(0.0, 1.0, 1000.0, 1.0), 1.0);
        assert!((approach(0.0, 1.0, 10.0, 0.01) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_speed_keeps_direction() {
        let v = clamp_speed(Vec2::new(3.0, 4.0), 1.0);
        assert!((v.length() - 1.0).abs() < 1e-5);
        assert!((v.x / v.y - 0.75).abs() < 1e-5);
        assert_eq!(clamp_speed(Vec2::new(0.1, 0.0), 1.0), Vec2::new(0.1, 0.0));
    }
}
