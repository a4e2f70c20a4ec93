//! Forward prediction of ball trajectories
//!
//! A cycle deep-copies the live bodies, replays the world stepper on the
//! copy at a finer timestep for a bounded window, samples each ball's path
//! and notes the first time each event of interest happens. The live
//! bodies are only read.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::{GROUND_SLOP, Side};
use super::state::BodySet;
use super::tick::{StepOptions, World};
use crate::config::PredictionConfig;

/// A predicted position at a simulated time (seconds after the cycle started)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedState {
    pub position: Vec2,
    pub time: f32,
}

/// What one prediction cycle learned about one ball
///
/// Every event holds its first occurrence within the cycle; `None` means
/// it did not happen inside the lookahead window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    sampled_states: Vec<PredictedState>,
    ground_impact: Option<PredictedState>,
    net_crossing: Option<PredictedState>,
    jump_range_entry: [Option<PredictedState>; 2],
}

impl PredictionRecord {
    /// Forget everything from the previous cycle
    pub fn reset(&mut self) {
        self.sampled_states.clear();
        self.ground_impact = None;
        self.net_crossing = None;
        self.jump_range_entry = [None; 2];
    }

    /// Coarse trajectory samples, oldest first
    pub fn sampled_states(&self) -> &[PredictedState] {
        &self.sampled_states
    }

    /// First time the ball's bottom reaches the ground
    pub fn ground_impact(&self) -> Option<PredictedState> {
        self.ground_impact
    }

    /// First time the ball passes over the net line
    pub fn net_crossing(&self) -> Option<PredictedState> {
        self.net_crossing
    }

    /// First time the ball is on `side`, clear of the net, and low enough
    /// for that side's player to reach with a jump
    pub fn jump_range_entry(&self, side: Side) -> Option<PredictedState> {
        self.jump_range_entry[side.index()]
    }

    fn record_ground_impact(&mut self, state: PredictedState) -> bool {
        record_first(&mut self.ground_impact, state)
    }

    fn record_net_crossing(&mut self, state: PredictedState) -> bool {
        record_first(&mut self.net_crossing, state)
    }

    fn record_jump_range_entry(&mut self, side: Side, state: PredictedState) -> bool {
        record_first(&mut self.jump_range_entry[side.index()], state)
    }
}

/// Set `slot` only if it is still unknown
fn record_first(slot: &mut Option<PredictedState>, state: PredictedState) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(state);
    true
}

/// Anything that reads predictions (AI controllers, debug overlays)
pub trait PredictionConsumer {
    fn on_predictions(&mut self, records: &[PredictionRecord]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionPhase {
    Idle,
    Running,
}

/// Periodic forward simulation over a throwaway copy of the world
#[derive(Debug, Clone)]
pub struct FuturePrediction {
    config: PredictionConfig,
    records: Vec<PredictionRecord>,
    phase: PredictionPhase,
    since_last_cycle: f32,
    cycles: u64,
}

impl FuturePrediction {
    /// One record per tracked ball
    pub fn new(config: &PredictionConfig, ball_count: usize) -> Self {
        Self {
            config: config.clone(),
            records: vec![PredictionRecord::default(); ball_count],
            phase: PredictionPhase::Idle,
            // First update runs straight away
            since_last_cycle: config.interval_seconds,
            cycles: 0,
        }
    }

    pub fn phase(&self) -> PredictionPhase {
        self.phase
    }

    /// Completed cycles so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn record(&self, ball: usize) -> Option<&PredictionRecord> {
        self.records.get(ball)
    }

    /// Hand the latest records to a consumer, read-only
    pub fn publish(&self, consumer: &mut dyn PredictionConsumer) {
        consumer.on_predictions(&self.records);
    }

    /// Upper bound on stepper calls per cycle
    pub fn steps_per_cycle(&self) -> u32 {
        (self.config.lookahead_seconds / self.config.fine_dt).ceil() as u32
    }

    /// Account for `elapsed` real seconds; run a cycle if the interval has passed
    ///
    /// Returns whether a cycle ran.
    pub fn update(
        &mut self,
        elapsed: f32,
        world: &World,
        live: &BodySet,
        floor_enabled: bool,
    ) -> bool {
        self.since_last_cycle += elapsed.max(0.0);
        if self.since_last_cycle < self.config.interval_seconds {
            return false;
        }
        self.run_cycle(world, live, floor_enabled);
        true
    }

    /// Run one full cycle now
    pub fn run_cycle(&mut self, world: &World, live: &BodySet, floor_enabled: bool) {
        self.phase = PredictionPhase::Running;
        self.since_last_cycle = 0.0;

        let mut snapshot = live.snapshot();
        if self.records.len() != live.balls.len() {
            log::debug!(
                "Tracking {} balls (was {})",
                live.balls.len(),
                self.records.len()
            );
            self.records
                .resize_with(live.balls.len(), PredictionRecord::default);
        }
        for record in &mut self.records {
            record.reset();
        }

        let court = world.court();
        let ground = court.ground_level();
        let net_x = court.net_x();
        let net_half_width = court.net.width / 2.0;
        let jump_heights = Side::ALL.map(|side| {
            live.player_on(side)
                .map(|player| player.max_jump_height(world.gravity(), ground))
        });

        let fine_dt = self.config.fine_dt;
        let options = StepOptions::simulation(floor_enabled);
        let steps = self.steps_per_cycle();
        let mut last_sample: Option<u32> = None;

        for step in 1..=steps {
            let time = step as f32 * fine_dt;
            world.step(snapshot.bodies_mut(), fine_dt, options);

            let sample = (time / self.config.coarse_sample_dt).floor() as u32;
            let take_sample = last_sample != Some(sample);
            last_sample = Some(sample);

            for (ball, record) in snapshot.bodies().balls.iter().zip(&mut self.records) {
                let state = PredictedState {
                    position: ball.center,
                    time,
                };
                if take_sample {
                    record.sampled_states.push(state);
                }

                if ball.bottom() <= ground + GROUND_SLOP {
                    record.record_ground_impact(state);
                }
                if (ball.center.x - net_x).abs() < ball.diameter() / 4.0 {
                    record.record_net_crossing(state);
                }
                for side in Side::ALL {
                    let Some(reach) = jump_heights[side.index()] else {
                        continue;
                    };
                    if side.is_beyond(ball.center.x, net_x, net_half_width)
                        && ball.center.y <= reach
                    {
                        record.record_jump_range_entry(side, state);
                    }
                }
            }
        }

        self.cycles += 1;
        self.phase = PredictionPhase::Idle;

        if log::log_enabled!(log::Level::Debug) {
            for (index, record) in self.records.iter().enumerate() {
                log::debug!(
                    "Prediction #{} ball {}: {} samples, ground {:?}, net {:?}, reach L {:?} R {:?}",
                    self.cycles,
                    index,
                    record.sampled_states.len(),
                    record.ground_impact.map(|s| s.time),
                    record.net_crossing.map(|s| s.time),
                    record.jump_range_entry[0].map(|s| s.time),
                    record.jump_range_entry[1].map(|s| s.time),
                );
            }
        }
    }
}
