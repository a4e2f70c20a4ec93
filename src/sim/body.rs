//! Dynamic circular bodies (players and balls)

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionResult, resolve_circle_circle};
use crate::config::{BodyConfig, ConfigError};
use crate::{clamp_speed, normalize_angle};

/// Options for one velocity integration
#[derive(Debug, Clone, Copy)]
pub struct VelocityStep {
    /// Extra scale on top of the body's own gravity multiplier
    pub gravity_scale: f32,
    /// Rescale the velocity to at most this magnitude
    pub max_speed: Option<f32>,
}

impl Default for VelocityStep {
    fn default() -> Self {
        Self {
            gravity_scale: 1.0,
            max_speed: None,
        }
    }
}

impl VelocityStep {
    pub fn clamped(max_speed: f32) -> Self {
        Self {
            max_speed: Some(max_speed),
            ..Default::default()
        }
    }
}

/// A circular physical object
///
/// Diameter and density are always positive, so mass is too. The diameter
/// is not range-limited here; owners that grow or shrink a body enforce
/// their own bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub center: Vec2,
    pub velocity: Vec2,
    /// Radians, normalized to [-π, π)
    pub orientation: f32,
    pub angular_velocity: f32,
    diameter: f32,
    density: f32,
    pub gravity_multiplier: f32,
    pub can_spin: bool,
    pub spin_elasticity_off_friction_points: f32,
    pub bump_off_friction_points: f32,
    /// Angular velocity decay rate (1/s)
    pub angular_friction: f32,
}

impl PhysicsBody {
    /// A plain, non-spinning body at rest
    pub fn new(center: Vec2, diameter: f32, density: f32) -> Result<Self, ConfigError> {
        Self::from_config(
            center,
            &BodyConfig {
                diameter,
                density,
                gravity_multiplier: 1.0,
                can_spin: false,
                spin_elasticity_off_friction_points: 0.0,
                bump_off_friction_points: 0.0,
                angular_friction: 0.0,
            },
        )
    }

    pub fn from_config(center: Vec2, config: &BodyConfig) -> Result<Self, ConfigError> {
        let body_error = |reason: String| ConfigError::InvalidBody {
            what: "dynamic",
            reason,
        };
        if !(config.diameter.is_finite() && config.diameter > 0.0) {
            return Err(body_error(format!("diameter must be > 0, got {}", config.diameter)));
        }
        if !(config.density.is_finite() && config.density > 0.0) {
            return Err(body_error(format!("density must be > 0, got {}", config.density)));
        }
        if !center.is_finite() {
            return Err(body_error(format!("center {center} is not finite")));
        }

        Ok(Self {
            center,
            velocity: Vec2::ZERO,
            orientation: 0.0,
            angular_velocity: 0.0,
            diameter: config.diameter,
            density: config.density,
            gravity_multiplier: config.gravity_multiplier,
            can_spin: config.can_spin,
            spin_elasticity_off_friction_points: config.spin_elasticity_off_friction_points,
            bump_off_friction_points: config.bump_off_friction_points,
            angular_friction: config.angular_friction,
        })
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    #[inline]
    pub fn diameter(&self) -> f32 {
        self.diameter
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.diameter / 2.0
    }

    /// Resize the body. Panics on a non-positive diameter.
    pub fn set_diameter(&mut self, diameter: f32) {
        assert!(
            diameter.is_finite() && diameter > 0.0,
            "body diameter must stay positive, got {diameter}"
        );
        self.diameter = diameter;
    }

    #[inline]
    pub fn density(&self) -> f32 {
        self.density
    }

    /// Area-proportional mass
    #[inline]
    pub fn mass(&self) -> f32 {
        self.density * PI * self.radius() * self.radius()
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass()
    }

    #[inline]
    pub fn momentum(&self) -> Vec2 {
        self.velocity * self.mass()
    }

    /// Lowest point of the circle
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y - self.radius()
    }

    pub fn is_finite(&self) -> bool {
        self.center.is_finite()
            && self.velocity.is_finite()
            && self.orientation.is_finite()
            && self.angular_velocity.is_finite()
    }

    /// Apply gravity, optional speed clamp, and spin decay
    pub fn step_velocity(&mut self, dt: f32, gravity: Vec2, step: VelocityStep) {
        self.velocity.y += dt * gravity.y * self.gravity_multiplier * step.gravity_scale;
        self.velocity.x += dt * gravity.x * self.gravity_multiplier * step.gravity_scale;

        if let Some(max_speed) = step.max_speed {
            self.velocity = clamp_speed(self.velocity, max_speed);
        }

        let decay = (dt * self.angular_friction).min(1.0);
        self.angular_velocity -= self.angular_velocity * decay;
    }

    /// Semi-implicit Euler: uses the velocity already updated this step
    #[inline]
    pub fn step_position(&mut self, dt: f32) {
        self.center += self.velocity * dt;
    }

    pub fn step_position_and_orientation(&mut self, dt: f32) {
        self.step_position(dt);
        self.orientation = normalize_angle(self.orientation + self.angular_velocity * dt);
    }

    /// Resolve overlap with another circle and exchange momentum
    ///
    /// Touching without overlap is not a collision. `did_collide` is false
    /// when the pair is already separating (overlap is still corrected).
    /// `is_simulation` does not change the physics; it is carried in the
    /// result so callers can suppress real-world cues.
    pub fn handle_hitting_other_circle(
        &mut self,
        other: &mut PhysicsBody,
        elasticity: f32,
        is_simulation: bool,
    ) -> CollisionResult {
        resolve_circle_circle(self, other, elasticity, is_simulation)
    }
}
