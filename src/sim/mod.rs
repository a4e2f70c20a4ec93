//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (players, then balls, by index)
//! - No rendering or platform dependencies
//!
//! Prediction reuses the same stepper on a deep copy of the bodies.

pub mod body;
pub mod clock;
pub mod collision;
pub mod obstacle;
pub mod player;
pub mod predict;
pub mod state;
pub mod tick;

pub use body::{PhysicsBody, VelocityStep};
pub use clock::FixedStepClock;
pub use collision::CollisionResult;
pub use obstacle::{Court, ObstacleKind, RectangularObstacle};
pub use player::{Player, PlayerIntent, Side};
pub use predict::{
    FuturePrediction, PredictedState, PredictionConsumer, PredictionPhase, PredictionRecord,
};
pub use state::{BodySet, WorldSnapshot};
pub use tick::{BodyRef, ContactEvent, StepMode, StepOptions, World};
