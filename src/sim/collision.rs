//! Collision response for circular bodies
//!
//! Circle-circle impulses, restitution along a contact normal, and the
//! friction exchange between linear motion and spin at a contact point.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PhysicsBody;
use crate::perp;

/// Below this separation two centers are treated as coincident
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionResult {
    /// Whether an approaching contact was resolved
    pub did_collide: bool,
    /// Impulse applied to the second body (the first received the negation)
    pub momentum_delta: Vec2,
    /// Contact point on the first body's surface
    pub point_of_contact: Vec2,
    /// Unit normal from the first body toward the second
    pub normal: Vec2,
    /// Overlap that was corrected
    pub penetration: f32,
    /// Produced by a speculative run; no real-world cues should fire
    pub simulated: bool,
}

impl CollisionResult {
    pub fn miss(simulated: bool) -> Self {
        Self {
            did_collide: false,
            momentum_delta: Vec2::ZERO,
            point_of_contact: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
            simulated,
        }
    }

    /// Magnitude of the exchanged impulse, used for "hardness" feedback
    pub fn hardness(&self) -> f32 {
        self.momentum_delta.length()
    }
}

/// Unit normal along `delta`, falling back to `fallback` and then to +Y
/// when the centers coincide.
pub fn contact_normal(delta: Vec2, fallback: Vec2) -> Vec2 {
    if delta.length_squared() > COINCIDENT_EPSILON * COINCIDENT_EPSILON {
        return delta.normalize();
    }
    let fallback = fallback.normalize_or_zero();
    if fallback != Vec2::ZERO {
        fallback
    } else {
        Vec2::Y
    }
}

/// Reflect only the normal component, keeping `elasticity` of it
#[inline]
pub fn reflect_with_restitution(velocity: Vec2, normal: Vec2, elasticity: f32) -> Vec2 {
    velocity - (1.0 + elasticity) * velocity.dot(normal) * normal
}

/// Circle-circle overlap, positional split and impulse
///
/// Overlap is removed along the normal, split by inverse mass so the
/// heavier body moves less. An impulse is applied only while the bodies
/// approach each other.
pub fn resolve_circle_circle(
    a: &mut PhysicsBody,
    b: &mut PhysicsBody,
    elasticity: f32,
    simulated: bool,
) -> CollisionResult {
    let delta = b.center - a.center;
    let reach = a.radius() + b.radius();
    let dist_sq = delta.length_squared();
    if dist_sq >= reach * reach {
        return CollisionResult::miss(simulated);
    }

    let dist = dist_sq.sqrt();
    let normal = contact_normal(delta, a.velocity - b.velocity);
    let penetration = reach - dist;

    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    a.center -= normal * (penetration * inv_a / inv_sum);
    b.center += normal * (penetration * inv_b / inv_sum);

    let point_of_contact = a.center + normal * a.radius();
    let closing = (b.velocity - a.velocity).dot(normal);
    if closing >= 0.0 {
        return CollisionResult {
            point_of_contact,
            normal,
            penetration,
            ..CollisionResult::miss(simulated)
        };
    }

    let impulse = normal * (-(1.0 + elasticity) * closing / inv_sum);
    a.velocity -= impulse * inv_a;
    b.velocity += impulse * inv_b;

    exchange_spin(a, b, normal);

    CollisionResult {
        did_collide: true,
        momentum_delta: impulse,
        point_of_contact,
        normal,
        penetration,
        simulated,
    }
}

/// Friction at a circle-circle contact
///
/// Tangential slip between the two surfaces turns into spin on bodies that
/// can spin, and a spinning surface kicks the other body along the tangent.
fn exchange_spin(a: &mut PhysicsBody, b: &mut PhysicsBody, normal: Vec2) {
    if !a.can_spin && !b.can_spin {
        return;
    }
    let tangent = perp(normal);
    let (ra, rb) = (a.radius(), b.radius());

    // Surface speed along the tangent at the contact point due to spin
    let surface_a = a.angular_velocity * ra;
    let surface_b = -b.angular_velocity * rb;
    let slip = (b.velocity - a.velocity).dot(tangent) + surface_b - surface_a;

    if a.can_spin {
        a.angular_velocity += a.spin_elasticity_off_friction_points * slip / ra;
        b.velocity += tangent * (surface_a * b.bump_off_friction_points);
    }
    if b.can_spin {
        b.angular_velocity += b.spin_elasticity_off_friction_points * slip / rb;
        a.velocity += tangent * (surface_b * a.bump_off_friction_points);
    }
}

/// Friction at a contact with a static surface whose outward normal is `normal`
pub fn surface_friction(body: &mut PhysicsBody, normal: Vec2) {
    if !body.can_spin {
        return;
    }
    let tangent = perp(normal);
    let radius = body.radius();
    let surface = body.angular_velocity * radius;
    let slip = body.velocity.dot(tangent) - surface;

    body.velocity += tangent * (surface * body.bump_off_friction_points);
    body.angular_velocity += body.spin_elasticity_off_friction_points * slip / radius;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(x: f32, y: f32, diameter: f32) -> PhysicsBody {
        PhysicsBody::new(Vec2::new(x, y), diameter, 1.0).unwrap()
    }

    #[test]
    fn test_restitution_zero_removes_normal_component() {
        let v = reflect_with_restitution(Vec2::new(2.0, -3.0), Vec2::Y, 0.0);
        assert_eq!(v, Vec2::new(2.0, 0.0));
        let v = reflect_with_restitution(Vec2::new(2.0, -3.0), Vec2::Y, 1.0);
        assert_eq!(v, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_equal_masses_swap_velocities() {
        let mut a = circle(-0.039, 0.5, 0.08).with_velocity(Vec2::new(1.0, 0.0));
        let mut b = circle(0.039, 0.5, 0.08).with_velocity(Vec2::new(-1.0, 0.0));

        let result = a.handle_hitting_other_circle(&mut b, 1.0, false);
        assert!(result.did_collide);
        assert!((a.velocity - Vec2::new(-1.0, 0.0)).length() < 1e-5);
        assert!((b.velocity - Vec2::new(1.0, 0.0)).length() < 1e-5);
        assert!(!result.simulated);
    }

    #[test]
    fn test_momentum_conserved_unequal_masses() {
        let mut a = circle(0.0, 0.0, 0.3).with_velocity(Vec2::new(0.7, 0.2));
        let mut b = circle(0.18, 0.05, 0.1).with_velocity(Vec2::new(-1.5, 0.4));
        let before = a.momentum() + b.momentum();

        let result = a.handle_hitting_other_circle(&mut b, 1.0, true);
        assert!(result.did_collide);
        assert!(result.simulated);
        let after = a.momentum() + b.momentum();
        assert!((before - after).length() < 1e-5);
    }

    #[test]
    fn test_elastic_collision_conserves_energy() {
        let mut a = circle(0.0, 0.0, 0.2).with_velocity(Vec2::new(1.0, 0.0));
        let mut b = circle(0.14, 0.0, 0.1);
        let energy = |a: &PhysicsBody, b: &PhysicsBody| {
            0.5 * a.mass() * a.velocity.length_squared() + 0.5 * b.mass() * b.velocity.length_squared()
        };
        let before = energy(&a, &b);
        a.handle_hitting_other_circle(&mut b, 1.0, false);
        assert!((energy(&a, &b) - before).abs() < 1e-5);
    }

    #[test]
    fn test_inelastic_collision_matches_velocities() {
        let mut a = circle(0.0, 0.0, 0.1).with_velocity(Vec2::new(1.0, 0.0));
        let mut b = circle(0.09, 0.0, 0.1);
        a.handle_hitting_other_circle(&mut b, 0.0, false);
        assert!((a.velocity.x - b.velocity.x).abs() < 1e-5);
        assert!((a.velocity.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_heavier_body_moves_less() {
        let mut heavy = PhysicsBody::new(Vec2::new(0.0, 0.0), 0.2, 9.0).unwrap();
        let mut light = PhysicsBody::new(Vec2::new(0.1, 0.0), 0.2, 1.0).unwrap();
        let heavy_start = heavy.center;
        let light_start = light.center;

        heavy.handle_hitting_other_circle(&mut light, 1.0, false);
        let heavy_moved = (heavy.center - heavy_start).length();
        let light_moved = (light.center - light_start).length();
        assert!((heavy_moved * 9.0 - light_moved).abs() < 1e-5);
        // Overlap is fully removed
        assert!(((light.center - heavy.center).length() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_tangent_circles_do_not_collide() {
        let mut a = circle(0.0, 0.0, 0.25).with_velocity(Vec2::new(1.0, 0.0));
        let mut b = circle(0.25, 0.0, 0.25);
        let result = a.handle_hitting_other_circle(&mut b, 1.0, false);
        assert!(!result.did_collide);
        assert_eq!(a.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_separating_overlap_is_corrected_without_impulse() {
        let mut a = circle(0.0, 0.0, 0.2).with_velocity(Vec2::new(-1.0, 0.0));
        let mut b = circle(0.1, 0.0, 0.2).with_velocity(Vec2::new(1.0, 0.0));
        let result = a.handle_hitting_other_circle(&mut b, 1.0, false);
        assert!(!result.did_collide);
        assert_eq!(result.momentum_delta, Vec2::ZERO);
        assert_eq!(a.velocity, Vec2::new(-1.0, 0.0));
        assert!((b.center.x - a.center.x - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_coincident_centers_use_relative_velocity() {
        let mut a = circle(0.5, 0.5, 0.1).with_velocity(Vec2::new(1.0, 0.0));
        let mut b = circle(0.5, 0.5, 0.1);
        let result = a.handle_hitting_other_circle(&mut b, 1.0, false);
        assert_eq!(result.normal, Vec2::X);
        assert!(a.is_finite() && b.is_finite());
        assert!(b.center.x > a.center.x);
    }

    #[test]
    fn test_coincident_centers_at_rest_stay_finite() {
        let mut a = circle(0.5, 0.5, 0.1);
        let mut b = circle(0.5, 0.5, 0.1);
        let result = a.handle_hitting_other_circle(&mut b, 1.0, false);
        assert!(!result.did_collide);
        assert_eq!(result.normal, Vec2::Y);
        assert!(a.is_finite() && b.is_finite());
        assert!(b.center.y > a.center.y);
    }

    #[test]
    fn test_glancing_contact_spins_ball() {
        let mut player = circle(0.0, 0.0, 0.2);
        let mut ball = circle(0.13, 0.0, 0.08).with_velocity(Vec2::new(-1.0, 1.0));
        ball.can_spin = true;
        ball.spin_elasticity_off_friction_points = 0.5;

        let result = player.handle_hitting_other_circle(&mut ball, 1.0, false);
        assert!(result.did_collide);
        assert!(ball.angular_velocity != 0.0);
        assert_eq!(player.angular_velocity, 0.0);
    }

    #[test]
    fn test_spinning_ball_kicks_other_body() {
        let mut ball = circle(0.0, 0.0, 0.1).with_velocity(Vec2::new(1.0, 0.0));
        ball.can_spin = true;
        ball.angular_velocity = 20.0;
        let mut other = circle(0.09, 0.0, 0.1);
        other.bump_off_friction_points = 0.5;

        ball.handle_hitting_other_circle(&mut other, 1.0, false);
        // Counter-clockwise spin moves the ball's right-hand surface upward
        assert!(other.velocity.y > 0.0);
    }

    #[test]
    fn test_surface_friction_backspin_on_floor() {
        let mut ball = circle(0.0, 0.04, 0.08);
        ball.can_spin = true;
        ball.bump_off_friction_points = 0.5;
        ball.angular_velocity = 10.0;
        surface_friction(&mut ball, Vec2::Y);
        // Counter-clockwise spin drags the bottom surface forward, pushing the ball back
        assert!(ball.velocity.x < 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn momentum_conserved_without_spin(
                da in 0.05f32..0.4,
                db in 0.05f32..0.4,
                density_a in 0.5f32..8.0,
                density_b in 0.5f32..8.0,
                angle in 0.0f32..std::f32::consts::TAU,
                overlap in 0.1f32..0.95,
                va in (-3.0f32..3.0, -3.0f32..3.0),
                vb in (-3.0f32..3.0, -3.0f32..3.0),
                elasticity in 0.0f32..=1.0,
            ) {
                let reach = (da + db) / 2.0;
                let offset = Vec2::from_angle(angle) * reach * overlap;
                let mut a = PhysicsBody::new(Vec2::ZERO, da, density_a)
                    .unwrap()
                    .with_velocity(Vec2::new(va.0, va.1));
                let mut b = PhysicsBody::new(offset, db, density_b)
                    .unwrap()
                    .with_velocity(Vec2::new(vb.0, vb.1));
                let before = a.momentum() + b.momentum();

                a.handle_hitting_other_circle(&mut b, elasticity, false);

                let after = a.momentum() + b.momentum();
                prop_assert!((after - before).length() < 1e-4 * (1.0 + before.length()));
                prop_assert!(a.is_finite() && b.is_finite());
                // Overlap is fully removed
                prop_assert!(a.center.distance(b.center) >= reach - 1e-5);
            }
        }
    }
}
