//! Player owner: a dynamic body driven by intent

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{PhysicsBody, VelocityStep};
use crate::approach;
use crate::config::{ConfigError, PlayerConfig};

/// Slack when deciding whether a body rests on the ground
pub const GROUND_SLOP: f32 = 1e-4;

/// Half of the court, split at the net
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Direction away from the net, along x
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// Which side `x` lies on (the net line itself counts as right)
    pub fn of_x(x: f32, net_x: f32) -> Side {
        if x < net_x { Side::Left } else { Side::Right }
    }

    /// `x` is on this side, at least `margin` away from the net line
    #[inline]
    pub fn is_beyond(self, x: f32, net_x: f32, margin: f32) -> bool {
        (x - net_x) * self.sign() >= margin
    }
}

/// What the player's controller (human or AI) wants this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// Desired horizontal velocity; clamped to the player's max speed
    pub target_velocity_x: f32,
    /// Jump if currently grounded
    pub jump: bool,
    /// Size change in [-1, 1]: positive grows, negative shrinks
    pub grow: f32,
}

/// A player body with its size bounds and movement tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: PhysicsBody,
    pub side: Side,
    pub intent: PlayerIntent,
    pub min_diameter: f32,
    pub max_diameter: f32,
    pub max_speed: f32,
    pub jump_speed: f32,
    pub horizontal_spring: f32,
    pub grow_rate: f32,
}

impl Player {
    pub fn new(side: Side, center: Vec2, config: &PlayerConfig) -> Result<Self, ConfigError> {
        if !(config.min_diameter > 0.0
            && config.min_diameter <= config.max_diameter
            && (config.min_diameter..=config.max_diameter).contains(&config.body.diameter))
        {
            return Err(ConfigError::InvalidDiameterRange {
                min: config.min_diameter,
                max: config.max_diameter,
                diameter: config.body.diameter,
            });
        }

        Ok(Self {
            body: PhysicsBody::from_config(center, &config.body)?,
            side,
            intent: PlayerIntent::default(),
            min_diameter: config.min_diameter,
            max_diameter: config.max_diameter,
            max_speed: config.max_speed,
            jump_speed: config.jump_speed,
            horizontal_spring: config.horizontal_spring,
            grow_rate: config.grow_rate,
        })
    }

    /// Standing on the ground at `x`
    pub fn standing(
        side: Side,
        x: f32,
        ground: f32,
        config: &PlayerConfig,
    ) -> Result<Self, ConfigError> {
        let center = Vec2::new(x, ground + config.body.diameter / 2.0);
        Self::new(side, center, config)
    }

    pub fn is_grounded(&self, ground: f32) -> bool {
        self.body.bottom() <= ground + GROUND_SLOP
    }

    /// Grow or shrink within `[min_diameter, max_diameter]`
    pub fn resize(&mut self, diameter: f32) {
        self.body
            .set_diameter(diameter.clamp(self.min_diameter, self.max_diameter));
    }

    /// Apply intent (size, jump, horizontal spring), then gravity
    pub fn step_velocity(&mut self, dt: f32, gravity: Vec2, ground: f32) {
        let grow = self.intent.grow.clamp(-1.0, 1.0);
        if grow != 0.0 {
            self.resize(self.body.diameter() + self.grow_rate * grow * dt);
        }

        if self.intent.jump && self.is_grounded(ground) && self.body.velocity.y <= 0.0 {
            self.body.velocity.y = self.jump_speed;
        }

        let target = self
            .intent
            .target_velocity_x
            .clamp(-self.max_speed, self.max_speed);
        self.body.velocity.x = approach(self.body.velocity.x, target, self.horizontal_spring, dt);

        self.body.step_velocity(dt, gravity, VelocityStep::default());
    }

    /// Highest point the player's top can reach with a standing jump
    pub fn max_jump_height(&self, gravity: Vec2, ground: f32) -> f32 {
        let fall = -gravity.y * self.body.gravity_multiplier;
        if fall <= 0.0 {
            return f32::INFINITY;
        }
        let rise = self.jump_speed * self.jump_speed / (2.0 * fall);
        ground + self.body.diameter() + rise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAVITY: Vec2 = Vec2::new(0.0, -1.9);

    fn player() -> Player {
        Player::standing(Side::Left, -0.5, 0.0, &PlayerConfig::default()).unwrap()
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::of_x(-0.1, 0.0), Side::Left);
        assert_eq!(Side::of_x(0.1, 0.0), Side::Right);
        assert_eq!(Side::Left.opponent(), Side::Right);
        assert!(Side::Left.is_beyond(-0.5, 0.0, 0.01));
        assert!(!Side::Left.is_beyond(-0.005, 0.0, 0.01));
        assert!(Side::Right.is_beyond(0.01, 0.0, 0.01));
    }

    #[test]
    fn test_rejects_diameter_outside_range() {
        let config = PlayerConfig {
            min_diameter: 0.3,
            ..PlayerConfig::default()
        };
        assert!(Player::new(Side::Left, Vec2::ZERO, &config).is_err());
    }

    #[test]
    fn test_grow_is_clamped_by_owner() {
        let mut p = player();
        p.intent.grow = 1.0;
        for _ in 0..10_000 {
            p.step_velocity(0.01, GRAVITY, 0.0);
        }
        assert_eq!(p.body.diameter(), p.max_diameter);

        p.intent.grow = -1.0;
        for _ in 0..10_000 {
            p.step_velocity(0.01, GRAVITY, 0.0);
        }
        assert_eq!(p.body.diameter(), p.min_diameter);
    }

    #[test]
    fn test_velocity_springs_toward_target() {
        let mut p = player();
        p.intent.target_velocity_x = 1.0;
        p.step_velocity(0.01, GRAVITY, 0.0);
        let first = p.body.velocity.x;
        assert!(first > 0.0 && first < 1.0);
        for _ in 0..200 {
            p.step_velocity(0.01, GRAVITY, 0.0);
        }
        assert!((p.body.velocity.x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_target_clamped_to_max_speed() {
        let mut p = player();
        p.intent.target_velocity_x = 100.0;
        for _ in 0..500 {
            p.step_velocity(0.01, GRAVITY, 0.0);
        }
        assert!(p.body.velocity.x <= p.max_speed + 1e-4);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut p = player();
        p.intent.jump = true;
        p.step_velocity(0.01, GRAVITY, 0.0);
        assert!(p.body.velocity.y > 0.0);

        let mut airborne = player();
        airborne.body.center.y += 0.5;
        airborne.intent.jump = true;
        airborne.step_velocity(0.01, GRAVITY, 0.0);
        assert!(airborne.body.velocity.y < 0.0);
    }

    #[test]
    fn test_max_jump_height() {
        let p = player();
        let fall = 1.9 * p.body.gravity_multiplier;
        let expected = p.body.diameter() + p.jump_speed * p.jump_speed / (2.0 * fall);
        assert!((p.max_jump_height(GRAVITY, 0.0) - expected).abs() < 1e-6);
        assert_eq!(p.max_jump_height(Vec2::ZERO, 0.0), f32::INFINITY);
    }
}
