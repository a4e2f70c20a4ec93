//! Fixed timestep world stepper
//!
//! One call advances every body by one sub-step in a fixed order:
//! integrate, collide with statics, ball/ball, player/ball, player/player,
//! then hard containment.

use glam::Vec2;

use super::body::VelocityStep;
use super::clock::FixedStepClock;
use super::collision::CollisionResult;
use super::obstacle::{Court, ObstacleKind};
use super::state::BodySet;
use crate::config::{ConfigError, PhysicsConfig};

/// Whether a step is gameplay or a speculative replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepMode {
    #[default]
    Real,
    Simulation,
}

/// Per-step switches supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOptions {
    pub mode: StepMode,
    /// The floor can be switched off briefly, e.g. right after a serve
    pub floor_enabled: bool,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            mode: StepMode::Real,
            floor_enabled: true,
        }
    }
}

impl StepOptions {
    pub fn simulation(floor_enabled: bool) -> Self {
        Self {
            mode: StepMode::Simulation,
            floor_enabled,
        }
    }

    #[inline]
    pub fn is_simulation(&self) -> bool {
        self.mode == StepMode::Simulation
    }
}

/// Index of a dynamic body within a [`BodySet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRef {
    Player(usize),
    Ball(usize),
}

/// A contact resolved during a step, for the caller's cue logic
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactEvent {
    Obstacle {
        body: BodyRef,
        obstacle: ObstacleKind,
        result: CollisionResult,
    },
    BallBall {
        first: usize,
        second: usize,
        result: CollisionResult,
    },
    PlayerBall {
        player: usize,
        ball: usize,
        result: CollisionResult,
    },
    PlayerPlayer {
        first: usize,
        second: usize,
        result: CollisionResult,
    },
}

impl ContactEvent {
    pub fn result(&self) -> &CollisionResult {
        match self {
            ContactEvent::Obstacle { result, .. }
            | ContactEvent::BallBall { result, .. }
            | ContactEvent::PlayerBall { result, .. }
            | ContactEvent::PlayerPlayer { result, .. } => result,
        }
    }
}

/// Court geometry plus tunables; steps body sets it does not own
#[derive(Debug, Clone)]
pub struct World {
    config: PhysicsConfig,
    court: Court,
}

impl World {
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let court = Court::from_config(&config.court);
        log::info!(
            "World ready: court [{:.3}, {:.3}], net at x={:.3} h={:.3}, gravity {}",
            court.inner_left(),
            court.inner_right(),
            court.net_x(),
            court.net.height,
            config.gravity
        );
        Ok(Self { config, court })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn court(&self) -> &Court {
        &self.court
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Run as many sub-steps as `clock` grants for `elapsed` seconds of real time
    pub fn step_frame(
        &self,
        bodies: &mut BodySet,
        clock: &mut FixedStepClock,
        elapsed: f32,
        options: StepOptions,
    ) -> Vec<ContactEvent> {
        let substeps = clock.advance(elapsed);
        let mut contacts = Vec::new();
        for _ in 0..substeps {
            contacts.extend(self.step(bodies, clock.sim_dt(), options));
        }
        contacts
    }

    /// Advance every body by `dt`
    ///
    /// Panics if any body ends the step with a non-finite state.
    pub fn step(&self, bodies: &mut BodySet, dt: f32, options: StepOptions) -> Vec<ContactEvent> {
        let simulated = options.is_simulation();
        let gravity = self.config.gravity;
        let ground = self.court.ground_level();
        let mut contacts = Vec::new();

        // Integrate: velocity strictly before position
        for player in &mut bodies.players {
            player.step_velocity(dt, gravity, ground);
            player.body.step_position_and_orientation(dt);
        }
        let ball_step = VelocityStep::clamped(self.config.ball.max_speed);
        for ball in &mut bodies.balls {
            ball.step_velocity(dt, gravity, ball_step);
            ball.step_position_and_orientation(dt);
        }

        // Statics: walls, net, floor for balls; the net only blocks players
        for (index, ball) in bodies.balls.iter_mut().enumerate() {
            for kind in self.court.ball_obstacles(options.floor_enabled) {
                let result = self.court.obstacle(kind).resolve(
                    ball,
                    self.config.ball_elasticity,
                    simulated,
                );
                if result.did_collide {
                    contacts.push(ContactEvent::Obstacle {
                        body: BodyRef::Ball(index),
                        obstacle: kind,
                        result,
                    });
                }
            }
        }
        for (index, player) in bodies.players.iter_mut().enumerate() {
            let result = self.court.net.resolve(&mut player.body, 0.0, simulated);
            if result.did_collide {
                contacts.push(ContactEvent::Obstacle {
                    body: BodyRef::Player(index),
                    obstacle: ObstacleKind::Net,
                    result,
                });
            }
        }

        // Ball vs ball
        let ball_count = bodies.balls.len();
        for first in 0..ball_count {
            let (head, tail) = bodies.balls.split_at_mut(first + 1);
            for (offset, other) in tail.iter_mut().enumerate() {
                let result = head[first].handle_hitting_other_circle(
                    other,
                    self.config.ball_ball_elasticity,
                    simulated,
                );
                if result.did_collide {
                    contacts.push(ContactEvent::BallBall {
                        first,
                        second: first + 1 + offset,
                        result,
                    });
                }
            }
        }

        // Player vs ball
        for (player_index, player) in bodies.players.iter_mut().enumerate() {
            for (ball_index, ball) in bodies.balls.iter_mut().enumerate() {
                let result = player.body.handle_hitting_other_circle(
                    ball,
                    self.config.player_elasticity,
                    simulated,
                );
                if result.did_collide {
                    contacts.push(ContactEvent::PlayerBall {
                        player: player_index,
                        ball: ball_index,
                        result,
                    });
                }
            }
        }

        // Player vs player: block, never bounce
        let player_count = bodies.players.len();
        for first in 0..player_count {
            let (head, tail) = bodies.players.split_at_mut(first + 1);
            for (offset, other) in tail.iter_mut().enumerate() {
                let result =
                    head[first]
                        .body
                        .handle_hitting_other_circle(&mut other.body, 0.0, simulated);
                if result.did_collide {
                    contacts.push(ContactEvent::PlayerPlayer {
                        first,
                        second: first + 1 + offset,
                        result,
                    });
                }
            }
        }

        self.apply_constraints(bodies, options.floor_enabled);

        assert!(
            bodies.all_finite(),
            "non-finite body state after physics step: {bodies:?}"
        );

        if !simulated {
            for contact in &contacts {
                log::trace!("contact {:?} hardness {:.3}", contact, contact.result().hardness());
            }
        }

        contacts
    }

    /// Hard containment after the elastic pass
    ///
    /// Balls stay between the walls and above the floor (when enabled).
    /// Players stay between the walls and above the ground, losing any
    /// velocity that points further out.
    fn apply_constraints(&self, bodies: &mut BodySet, floor_enabled: bool) {
        let left = self.court.inner_left();
        let right = self.court.inner_right();
        let ground = self.court.ground_level();

        for ball in &mut bodies.balls {
            let r = ball.radius();
            ball.center.x = ball.center.x.clamp(left + r, (right - r).max(left + r));
            if floor_enabled && ball.center.y < ground + r {
                ball.center.y = ground + r;
            }
        }

        for player in &mut bodies.players {
            let body = &mut player.body;
            let r = body.radius();
            if body.center.y < ground + r {
                body.center.y = ground + r;
                body.velocity.y = body.velocity.y.max(0.0);
            }
            if body.center.x < left + r {
                body.center.x = left + r;
                body.velocity.x = body.velocity.x.max(0.0);
            } else if body.center.x > right - r {
                body.center.x = right - r;
                body.velocity.x = body.velocity.x.min(0.0);
            }
        }
    }
}
