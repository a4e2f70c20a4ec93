//! Static axis-aligned rectangles (walls, net, floor)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PhysicsBody;
use super::collision::{CollisionResult, reflect_with_restitution, surface_friction};
use crate::config::{ConfigError, CourtConfig};

/// An immovable rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangularObstacle {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

impl RectangularObstacle {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    pub(crate) fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        let malformed = |reason: String| ConfigError::InvalidObstacle { name, reason };
        if !self.center.is_finite() {
            return Err(malformed(format!("center {} is not finite", self.center)));
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(malformed(format!("width must be > 0, got {}", self.width)));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(malformed(format!("height must be > 0, got {}", self.height)));
        }
        Ok(())
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Bottom-left corner
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents()
    }

    /// Top-right corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Push a circle out of the rectangle and bounce it
    ///
    /// Returns whether an approaching contact was reflected.
    pub fn handle_ball_collision(
        &self,
        body: &mut PhysicsBody,
        elasticity: f32,
        is_simulation: bool,
    ) -> bool {
        self.resolve(body, elasticity, is_simulation).did_collide
    }

    /// Closest-point test against the rectangle, with full contact details
    ///
    /// `normal` points out of the rectangle toward the body. A circle exactly
    /// tangent to an edge does not collide. A center inside the rectangle
    /// leaves through the nearest edge.
    pub fn resolve(
        &self,
        body: &mut PhysicsBody,
        elasticity: f32,
        is_simulation: bool,
    ) -> CollisionResult {
        let radius = body.radius();
        let (min, max) = (self.min(), self.max());
        let closest = body.center.clamp(min, max);
        let delta = body.center - closest;
        let dist_sq = delta.length_squared();

        let (normal, penetration, point) = if dist_sq > 0.0 {
            if dist_sq >= radius * radius {
                return CollisionResult::miss(is_simulation);
            }
            let dist = dist_sq.sqrt();
            (delta / dist, radius - dist, closest)
        } else {
            self.nearest_exit(body.center, radius)
        };

        body.center += normal * penetration;

        let approach_speed = body.velocity.dot(normal);
        if approach_speed >= 0.0 {
            return CollisionResult {
                point_of_contact: point,
                normal,
                penetration,
                ..CollisionResult::miss(is_simulation)
            };
        }

        let before = body.velocity;
        body.velocity = reflect_with_restitution(body.velocity, normal, elasticity);
        let momentum_delta = (body.velocity - before) * body.mass();
        surface_friction(body, normal);

        CollisionResult {
            did_collide: true,
            momentum_delta,
            point_of_contact: point,
            normal,
            penetration,
            simulated: is_simulation,
        }
    }

    /// Exit direction for a center strictly inside the rectangle
    ///
    /// Ties prefer the top edge, then left, right, bottom.
    fn nearest_exit(&self, center: Vec2, radius: f32) -> (Vec2, f32, Vec2) {
        let (min, max) = (self.min(), self.max());
        let exits = [
            (Vec2::Y, max.y - center.y, Vec2::new(center.x, max.y)),
            (Vec2::NEG_X, center.x - min.x, Vec2::new(min.x, center.y)),
            (Vec2::X, max.x - center.x, Vec2::new(max.x, center.y)),
            (Vec2::NEG_Y, center.y - min.y, Vec2::new(center.x, min.y)),
        ];
        let mut best = exits[0];
        for exit in &exits[1..] {
            if exit.1 < best.1 {
                best = *exit;
            }
        }
        let (normal, depth, point) = best;
        (normal, depth + radius, point)
    }
}

/// Which static obstacle a contact involved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    LeftWall,
    RightWall,
    Net,
    Floor,
}

/// The fixed court geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Court {
    pub left_wall: RectangularObstacle,
    pub right_wall: RectangularObstacle,
    pub net: RectangularObstacle,
    pub floor: RectangularObstacle,
}

impl Court {
    pub fn from_config(config: &CourtConfig) -> Self {
        Self {
            left_wall: config.left_wall.clone(),
            right_wall: config.right_wall.clone(),
            net: config.net.clone(),
            floor: config.floor.clone(),
        }
    }

    pub fn obstacle(&self, kind: ObstacleKind) -> &RectangularObstacle {
        match kind {
            ObstacleKind::LeftWall => &self.left_wall,
            ObstacleKind::RightWall => &self.right_wall,
            ObstacleKind::Net => &self.net,
            ObstacleKind::Floor => &self.floor,
        }
    }

    /// Obstacles a ball collides with, in resolution order
    pub fn ball_obstacles(&self, floor_enabled: bool) -> impl Iterator<Item = ObstacleKind> {
        [
            ObstacleKind::LeftWall,
            ObstacleKind::RightWall,
            ObstacleKind::Net,
            ObstacleKind::Floor,
        ]
        .into_iter()
        .filter(move |kind| floor_enabled || *kind != ObstacleKind::Floor)
    }

    /// Inner face of the left wall
    #[inline]
    pub fn inner_left(&self) -> f32 {
        self.left_wall.max().x
    }

    /// Inner face of the right wall
    #[inline]
    pub fn inner_right(&self) -> f32 {
        self.right_wall.min().x
    }

    /// Top of the floor
    #[inline]
    pub fn ground_level(&self) -> f32 {
        self.floor.max().y
    }

    #[inline]
    pub fn net_x(&self) -> f32 {
        self.net.center.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(x: f32, y: f32, diameter: f32) -> PhysicsBody {
        PhysicsBody::new(Vec2::new(x, y), diameter, 1.0).unwrap()
    }

    fn block() -> RectangularObstacle {
        // Faces at x = ±0.25, y = 0 and 0.5
        RectangularObstacle::new(Vec2::new(0.0, 0.25), 0.5, 0.5)
    }

    #[test]
    fn test_corners() {
        let rect = block();
        assert_eq!(rect.min(), Vec2::new(-0.25, 0.0));
        assert_eq!(rect.max(), Vec2::new(0.25, 0.5));
        assert!(rect.contains_point(Vec2::new(0.1, 0.1)));
        assert!(!rect.contains_point(Vec2::new(0.3, 0.1)));
    }

    #[test]
    fn test_side_hit_reflects_and_pushes_out() {
        let rect = block();
        let mut body = ball(0.3, 0.25, 0.25).with_velocity(Vec2::new(-1.0, 0.5));
        assert!(rect.handle_ball_collision(&mut body, 1.0, false));
        assert!((body.center.x - 0.375).abs() < 1e-6);
        assert!((body.velocity - Vec2::new(1.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_elasticity_scales_bounce() {
        let rect = block();
        let mut body = ball(0.0, 0.6, 0.25).with_velocity(Vec2::new(0.0, -2.0));
        let result = rect.resolve(&mut body, 0.5, false);
        assert!(result.did_collide);
        assert_eq!(result.normal, Vec2::Y);
        assert!((body.velocity.y - 1.0).abs() < 1e-6);
        assert!(result.momentum_delta.y > 0.0);
    }

    #[test]
    fn test_zero_elasticity_blocks() {
        let rect = block();
        let mut body = ball(-0.3, 0.25, 0.25).with_velocity(Vec2::new(2.0, 0.3));
        assert!(rect.handle_ball_collision(&mut body, 0.0, false));
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.velocity.y, 0.3);
    }

    #[test]
    fn test_corner_hit_uses_diagonal_normal() {
        let rect = block();
        let mut body = ball(0.3, 0.55, 0.25).with_velocity(Vec2::new(-1.0, -1.0));
        let result = rect.resolve(&mut body, 1.0, false);
        assert!(result.did_collide);
        assert!((result.normal - Vec2::new(1.0, 1.0).normalize()).length() < 1e-5);
        assert!((body.velocity - Vec2::new(1.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_tangent_is_not_a_collision() {
        let rect = block();
        let mut body = ball(0.375, 0.25, 0.25).with_velocity(Vec2::new(-1.0, 0.0));
        assert!(!rect.handle_ball_collision(&mut body, 1.0, false));
        assert_eq!(body.center, Vec2::new(0.375, 0.25));
        assert_eq!(body.velocity, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_center_inside_exits_nearest_edge() {
        let rect = block();
        let mut body = ball(0.2, 0.25, 0.125).with_velocity(Vec2::new(0.5, 0.0));
        let result = rect.resolve(&mut body, 1.0, false);
        assert_eq!(result.normal, Vec2::X);
        assert!((body.center.x - 0.3125).abs() < 1e-6);
        // Already moving outward: pushed out but not bounced
        assert!(!result.did_collide);
        assert_eq!(body.velocity, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_separating_overlap_reports_no_collision() {
        let rect = block();
        let mut body = ball(0.0, 0.55, 0.25).with_velocity(Vec2::new(0.0, 1.0));
        assert!(!rect.handle_ball_collision(&mut body, 1.0, false));
        assert!((body.center.y - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_court_ball_obstacle_order() {
        let court = Court::from_config(&CourtConfig::default());
        let all: Vec<_> = court.ball_obstacles(true).collect();
        assert_eq!(
            all,
            vec![
                ObstacleKind::LeftWall,
                ObstacleKind::RightWall,
                ObstacleKind::Net,
                ObstacleKind::Floor
            ]
        );
        assert!(!court.ball_obstacles(false).any(|k| k == ObstacleKind::Floor));
        assert!(court.inner_left() < court.net.min().x);
        assert!(court.inner_right() > court.net.max().x);
        assert_eq!(court.ground_level(), 0.0);
    }
}
