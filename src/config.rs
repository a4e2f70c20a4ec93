//! Physics configuration
//!
//! Every tunable the core uses lives here and is passed explicitly to the
//! body, stepper and prediction constructors. Loadable from JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::RectangularObstacle;

/// Rejected configuration. Fatal at construction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {what} body: {reason}")]
    InvalidBody { what: &'static str, reason: String },
    #[error("invalid diameter range [{min}, {max}] for diameter {diameter}")]
    InvalidDiameterRange { min: f32, max: f32, diameter: f32 },
    #[error("elasticity `{name}` = {value} is outside [0, 1]")]
    InvalidElasticity { name: &'static str, value: f32 },
    #[error("obstacle `{name}` has malformed geometry: {reason}")]
    InvalidObstacle { name: &'static str, reason: String },
    #[error("court layout is inconsistent: {0}")]
    InvalidCourt(String),
    #[error("invalid timing `{name}`: {reason}")]
    InvalidTiming { name: &'static str, reason: String },
    #[error("invalid tuning `{name}`: {reason}")]
    InvalidTuning { name: &'static str, reason: String },
    #[error("failed to parse configuration")]
    Parse(#[from] serde_json::Error),
}

/// Per-body physical parameters
///
/// Has no default of its own: a `body` table in JSON must be complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyConfig {
    pub diameter: f32,
    pub density: f32,
    /// Scalar applied to global gravity
    pub gravity_multiplier: f32,
    /// Whether contacts may impart angular velocity
    pub can_spin: bool,
    /// Fraction of tangential contact slip converted into spin
    pub spin_elasticity_off_friction_points: f32,
    /// Fraction of the other body's surface spin converted into a tangential kick
    pub bump_off_friction_points: f32,
    /// Angular velocity decay rate (1/s)
    pub angular_friction: f32,
}

impl BodyConfig {
    fn validate(&self, what: &'static str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBody { what, reason };
        if !(self.diameter.is_finite() && self.diameter > 0.0) {
            return Err(invalid(format!("diameter must be > 0, got {}", self.diameter)));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(invalid(format!("density must be > 0, got {}", self.density)));
        }
        if !self.gravity_multiplier.is_finite() {
            return Err(invalid("gravity multiplier is not finite".into()));
        }
        if !(self.angular_friction.is_finite() && self.angular_friction >= 0.0) {
            return Err(invalid(format!(
                "angular friction must be >= 0, got {}",
                self.angular_friction
            )));
        }
        for (name, value) in [
            ("spin elasticity", self.spin_elasticity_off_friction_points),
            ("bump", self.bump_off_friction_points),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} coefficient {value} is outside [0, 1]")));
            }
        }
        Ok(())
    }
}

/// Ball tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub body: BodyConfig,
    pub max_speed: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            body: BodyConfig {
                diameter: BALL_DIAMETER,
                density: BALL_DENSITY,
                gravity_multiplier: 1.0,
                can_spin: true,
                spin_elasticity_off_friction_points: 0.3,
                bump_off_friction_points: 0.1,
                angular_friction: 0.5,
            },
            max_speed: BALL_MAX_SPEED,
        }
    }
}

/// Player tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub body: BodyConfig,
    pub min_diameter: f32,
    pub max_diameter: f32,
    pub max_speed: f32,
    pub jump_speed: f32,
    /// Rate at which horizontal velocity springs toward the target (1/s)
    pub horizontal_spring: f32,
    /// Diameter change per second at full grow intent
    pub grow_rate: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            body: BodyConfig {
                diameter: PLAYER_DIAMETER,
                density: PLAYER_DENSITY,
                gravity_multiplier: PLAYER_GRAVITY_MULTIPLIER,
                can_spin: false,
                spin_elasticity_off_friction_points: 0.0,
                bump_off_friction_points: 0.0,
                angular_friction: 0.0,
            },
            min_diameter: PLAYER_MIN_DIAMETER,
            max_diameter: PLAYER_MAX_DIAMETER,
            max_speed: PLAYER_MAX_SPEED,
            jump_speed: PLAYER_JUMP_SPEED,
            horizontal_spring: PLAYER_HORIZONTAL_SPRING,
            grow_rate: PLAYER_GROW_RATE,
        }
    }
}

/// Static court geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtConfig {
    pub left_wall: RectangularObstacle,
    pub right_wall: RectangularObstacle,
    pub net: RectangularObstacle,
    pub floor: RectangularObstacle,
}

impl Default for CourtConfig {
    fn default() -> Self {
        let wall_x = COURT_HALF_WIDTH + WALL_THICKNESS / 2.0;
        let wall_y = WALL_HEIGHT / 2.0 - FLOOR_THICKNESS;
        Self {
            left_wall: RectangularObstacle::new(
                Vec2::new(-wall_x, wall_y),
                WALL_THICKNESS,
                WALL_HEIGHT,
            ),
            right_wall: RectangularObstacle::new(
                Vec2::new(wall_x, wall_y),
                WALL_THICKNESS,
                WALL_HEIGHT,
            ),
            net: RectangularObstacle::new(Vec2::new(0.0, NET_HEIGHT / 2.0), NET_WIDTH, NET_HEIGHT),
            floor: RectangularObstacle::new(
                Vec2::new(0.0, -FLOOR_THICKNESS / 2.0),
                2.0 * (COURT_HALF_WIDTH + WALL_THICKNESS),
                FLOOR_THICKNESS,
            ),
        }
    }
}

impl CourtConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, obstacle) in [
            ("left_wall", &self.left_wall),
            ("right_wall", &self.right_wall),
            ("net", &self.net),
            ("floor", &self.floor),
        ] {
            obstacle.validate(name)?;
        }

        let net_left = self.net.min().x;
        let net_right = self.net.max().x;
        if self.left_wall.max().x >= net_left {
            return Err(ConfigError::InvalidCourt(
                "left wall must lie left of the net".into(),
            ));
        }
        if self.right_wall.min().x <= net_right {
            return Err(ConfigError::InvalidCourt(
                "right wall must lie right of the net".into(),
            ));
        }
        if self.floor.min().x > self.left_wall.max().x || self.floor.max().x < self.right_wall.min().x
        {
            return Err(ConfigError::InvalidCourt(
                "floor must span the court between the walls".into(),
            ));
        }
        Ok(())
    }
}

/// Forward-simulation tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Simulated time covered by one cycle
    pub lookahead_seconds: f32,
    /// Sub-step used while predicting (finer than the real-time step)
    pub fine_dt: f32,
    /// Spacing of recorded trajectory samples
    pub coarse_sample_dt: f32,
    /// Minimum real time between cycles
    pub interval_seconds: f32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            lookahead_seconds: PREDICTION_LOOKAHEAD,
            fine_dt: PREDICTION_FINE_DT,
            coarse_sample_dt: PREDICTION_SAMPLE_DT,
            interval_seconds: PREDICTION_INTERVAL,
        }
    }
}

/// Real-time pacing tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub sim_dt: f32,
    pub max_frame_time: f32,
    pub max_substeps: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            sim_dt: SIM_DT,
            max_frame_time: MAX_FRAME_TIME,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

/// All tunables for the physics core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: Vec2,
    /// Ball vs. walls, net and floor
    pub ball_elasticity: f32,
    pub ball_ball_elasticity: f32,
    /// Player vs. ball
    pub player_elasticity: f32,
    pub ball: BallConfig,
    pub player: PlayerConfig,
    pub court: CourtConfig,
    pub prediction: PredictionConfig,
    pub clock: ClockConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, GRAVITY_Y),
            ball_elasticity: BALL_ELASTICITY,
            ball_ball_elasticity: 1.0,
            player_elasticity: PLAYER_ELASTICITY,
            ball: BallConfig::default(),
            player: PlayerConfig::default(),
            court: CourtConfig::default(),
            prediction: PredictionConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

impl PhysicsConfig {
    /// Parse from JSON and validate
    ///
    /// Missing fields take their defaults, including inside nested tables
    /// such as `ball` or `prediction`. A `body` table must be complete.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Ground level: the top of the floor obstacle
    pub fn ground_level(&self) -> f32 {
        self.court.floor.max().y
    }

    /// Check every tunable. Nothing is clamped silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(ConfigError::InvalidTuning {
                name: "gravity",
                reason: format!("{} is not finite", self.gravity),
            });
        }

        for (name, value) in [
            ("ball_elasticity", self.ball_elasticity),
            ("ball_ball_elasticity", self.ball_ball_elasticity),
            ("player_elasticity", self.player_elasticity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidElasticity { name, value });
            }
        }

        self.ball.body.validate("ball")?;
        self.player.body.validate("player")?;

        let p = &self.player;
        if !(p.min_diameter > 0.0
            && p.min_diameter <= p.max_diameter
            && (p.min_diameter..=p.max_diameter).contains(&p.body.diameter))
        {
            return Err(ConfigError::InvalidDiameterRange {
                min: p.min_diameter,
                max: p.max_diameter,
                diameter: p.body.diameter,
            });
        }

        for (name, value) in [
            ("player.jump_speed", p.jump_speed),
            ("player.horizontal_spring", p.horizontal_spring),
            ("player.grow_rate", p.grow_rate),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidTuning {
                    name,
                    reason: format!("must be > 0, got {value}"),
                });
            }
        }

        self.court.validate()?;
        self.validate_timing()
    }

    fn validate_timing(&self) -> Result<(), ConfigError> {
        let positive = |name: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidTiming {
                    name,
                    reason: format!("must be > 0, got {value}"),
                })
            }
        };
        let pred = &self.prediction;
        positive("ball.max_speed", self.ball.max_speed)?;
        positive("player.max_speed", self.player.max_speed)?;
        positive("prediction.lookahead_seconds", pred.lookahead_seconds)?;
        positive("prediction.fine_dt", pred.fine_dt)?;
        positive("prediction.coarse_sample_dt", pred.coarse_sample_dt)?;
        positive("prediction.interval_seconds", pred.interval_seconds)?;
        positive("clock.sim_dt", self.clock.sim_dt)?;
        positive("clock.max_frame_time", self.clock.max_frame_time)?;

        if pred.fine_dt > self.clock.sim_dt {
            return Err(ConfigError::InvalidTiming {
                name: "prediction.fine_dt",
                reason: format!(
                    "{} is coarser than the real-time step {}",
                    pred.fine_dt, self.clock.sim_dt
                ),
            });
        }
        if pred.fine_dt > pred.coarse_sample_dt {
            return Err(ConfigError::InvalidTiming {
                name: "prediction.coarse_sample_dt",
                reason: "sample spacing is finer than the prediction step".into(),
            });
        }
        if self.clock.max_substeps == 0 {
            return Err(ConfigError::InvalidTiming {
                name: "clock.max_substeps",
                reason: "must allow at least one sub-step".into(),
            });
        }
        Ok(())
    }
}
