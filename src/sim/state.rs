//! Live body set and speculative snapshots
//!
//! Bodies are plain values. A snapshot is a deep copy that shares nothing
//! with the live set, so a speculative run cannot reach gameplay state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PhysicsBody;
use super::player::{Player, Side};
use crate::config::{ConfigError, PhysicsConfig};

/// Every dynamic body in the world, in a fixed iteration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodySet {
    pub players: Vec<Player>,
    pub balls: Vec<PhysicsBody>,
}

impl BodySet {
    pub fn new(players: Vec<Player>, balls: Vec<PhysicsBody>) -> Self {
        Self { players, balls }
    }

    /// Standard rally layout: one player per side standing at mid-half,
    /// `ball_count` balls hanging above the players.
    pub fn kickoff(config: &PhysicsConfig, ball_count: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        let court = &config.court;
        let ground = config.ground_level();
        let net_x = court.net.center.x;
        let half_left = (net_x - court.left_wall.max().x) / 2.0;
        let half_right = (court.right_wall.min().x - net_x) / 2.0;

        let players = vec![
            Player::standing(Side::Left, net_x - half_left, ground, &config.player)?,
            Player::standing(Side::Right, net_x + half_right, ground, &config.player)?,
        ];

        let serve_height = ground + 2.0 * court.net.height.max(config.player.max_diameter);
        let balls = (0..ball_count)
            .map(|i| {
                let side = Side::ALL[i % 2];
                let x = match side {
                    Side::Left => net_x - half_left,
                    Side::Right => net_x + half_right,
                };
                PhysicsBody::from_config(Vec2::new(x, serve_height), &config.ball.body)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { players, balls })
    }

    /// First player belonging to `side`
    pub fn player_on(&self, side: Side) -> Option<&Player> {
        self.players.iter().find(|p| p.side == side)
    }

    pub fn player_on_mut(&mut self, side: Side) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.side == side)
    }

    /// Iterate every body, players first
    pub fn bodies(&self) -> impl Iterator<Item = &PhysicsBody> {
        self.players.iter().map(|p| &p.body).chain(self.balls.iter())
    }

    pub fn all_finite(&self) -> bool {
        self.bodies().all(PhysicsBody::is_finite)
    }

    /// Independent copy for a speculative run
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            bodies: self.clone(),
        }
    }
}

/// Deep copy of the dynamic bodies, owned by one prediction cycle
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    bodies: BodySet,
}

impl WorldSnapshot {
    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut BodySet {
        &mut self.bodies
    }
}
