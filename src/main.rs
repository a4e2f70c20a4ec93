//! Twoball Volley headless demo
//!
//! Runs a short rally between a prediction-driven AI on the left and a
//! seeded random opponent on the right, logging contacts and predictions.
//!
//! Usage: `twoball-volley [config.json] [seconds] [seed]`
//! (`RUST_LOG=debug` shows prediction cycles, `trace` shows every contact.)

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use twoball_volley::consts::SIM_DT;
    use twoball_volley::sim::{
        BodySet, ContactEvent, FixedStepClock, FuturePrediction, PlayerIntent, PredictionConsumer,
        PredictionRecord, Side, StepOptions, World,
    };
    use twoball_volley::{ConfigError, PhysicsConfig};

    /// Rendered-frame length the demo pretends to run at
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// How often the random opponent picks a new move
    const SCRIPT_INTERVAL: f32 = 0.4;

    /// Chases the earliest ball predicted to come down on its side
    struct PredictiveAi {
        side: Side,
        target_x: Option<f32>,
        time_to_target: f32,
    }

    impl PredictiveAi {
        fn new(side: Side) -> Self {
            Self {
                side,
                target_x: None,
                time_to_target: f32::INFINITY,
            }
        }

        fn intent(&self, bodies: &BodySet, home_x: f32) -> PlayerIntent {
            let Some(player) = bodies.player_on(self.side) else {
                return PlayerIntent::default();
            };
            let x = player.body.center.x;
            let goal = self.target_x.unwrap_or(home_x);
            // Stand slightly behind the ball so it is sent over the net
            let goal = goal + self.side.sign() * player.body.radius() * 0.5;
            PlayerIntent {
                target_velocity_x: (goal - x) * 8.0,
                jump: self.target_x.is_some() && self.time_to_target < 0.35,
                grow: if self.target_x.is_some() { 1.0 } else { -0.5 },
            }
        }
    }

    impl PredictionConsumer for PredictiveAi {
        fn on_predictions(&mut self, records: &[PredictionRecord]) {
            let earliest = records
                .iter()
                .filter_map(|record| record.jump_range_entry(self.side))
                .min_by(|a, b| a.time.total_cmp(&b.time));
            self.target_x = earliest.map(|state| state.position.x);
            self.time_to_target = earliest.map_or(f32::INFINITY, |state| state.time);
        }
    }

    /// Random but reproducible opponent
    struct ScriptedOpponent {
        rng: Pcg32,
        intent: PlayerIntent,
        until_next: f32,
    }

    impl ScriptedOpponent {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                intent: PlayerIntent::default(),
                until_next: 0.0,
            }
        }

        fn intent(&mut self, dt: f32, max_speed: f32) -> PlayerIntent {
            self.until_next -= dt;
            if self.until_next <= 0.0 {
                self.until_next = SCRIPT_INTERVAL;
                self.intent = PlayerIntent {
                    target_velocity_x: self.rng.random_range(-max_speed..=max_speed),
                    jump: self.rng.random_bool(0.25),
                    grow: self.rng.random_range(-1.0..=1.0),
                };
            }
            self.intent
        }
    }

    pub struct Args {
        pub config: PhysicsConfig,
        pub seconds: f32,
        pub seed: u64,
    }

    pub fn parse_args() -> Result<Args, String> {
        let mut args = std::env::args().skip(1);
        let config = match args.next() {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {path}: {e}"))?;
                PhysicsConfig::from_json(&json).map_err(|e| format!("{path}: {e}"))?
            }
            None => PhysicsConfig::default(),
        };
        let seconds = match args.next() {
            Some(s) => s.parse().map_err(|e| format!("Bad duration {s:?}: {e}"))?,
            None => 10.0,
        };
        let seed = match args.next() {
            Some(s) => s.parse().map_err(|e| format!("Bad seed {s:?}: {e}"))?,
            None => 42,
        };
        Ok(Args {
            config,
            seconds,
            seed,
        })
    }

    pub fn run(args: Args) -> Result<(), ConfigError> {
        let world = World::new(args.config)?;
        let config = world.config().clone();
        let mut bodies = BodySet::kickoff(&config, 2)?;
        let mut clock = FixedStepClock::new(&config.clock);
        let mut prediction = FuturePrediction::new(&config.prediction, bodies.balls.len());

        let home_x = bodies
            .player_on(Side::Left)
            .map_or(-0.5, |player| player.body.center.x);
        let mut ai = PredictiveAi::new(Side::Left);
        let mut opponent = ScriptedOpponent::new(args.seed);

        log::info!(
            "Demo: {:.1}s at {:.0} Hz physics, seed {}",
            args.seconds,
            1.0 / SIM_DT,
            args.seed
        );

        let frames = (args.seconds / FRAME_DT).ceil() as u32;
        let mut touches = [0u32; 2];
        let mut landings = [0u32; 2];
        let ground = world.court().ground_level();
        let net_x = world.court().net_x();

        for frame in 0..frames {
            if prediction.update(FRAME_DT, &world, &bodies, true) {
                prediction.publish(&mut ai);
            }

            let left = ai.intent(&bodies, home_x);
            let right = opponent.intent(FRAME_DT, config.player.max_speed);
            if let Some(player) = bodies.player_on_mut(Side::Left) {
                player.intent = left;
            }
            if let Some(player) = bodies.player_on_mut(Side::Right) {
                player.intent = right;
            }

            let contacts = world.step_frame(&mut bodies, &mut clock, FRAME_DT, StepOptions::default());
            for contact in &contacts {
                if let ContactEvent::PlayerBall { player, ball, .. } = contact {
                    let side = bodies.players[*player].side;
                    touches[side.index()] += 1;
                    log::debug!("Frame {frame}: {side:?} player touched ball {ball}");
                }
            }

            // Balls resting on the floor count as a point and are re-served
            for ball in &mut bodies.balls {
                if ball.bottom() <= ground + 1e-3 && ball.velocity.y.abs() < 0.05 {
                    let side = Side::of_x(ball.center.x, net_x);
                    landings[side.index()] += 1;
                    log::info!("Ball landed on the {side:?} side at x={:.3}", ball.center.x);
                    ball.center = Vec2::new(ball.center.x, ground + 0.6);
                    ball.velocity = Vec2::ZERO;
                    ball.angular_velocity = 0.0;
                }
            }
        }

        log::info!(
            "Done after {} prediction cycles: touches L {} R {}, landings L {} R {}",
            prediction.cycles(),
            touches[0],
            touches[1],
            landings[0],
            landings[1]
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Twoball Volley (native) starting...");

    let args = match demo::parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };
    if let Err(e) = demo::run(args) {
        log::error!("Invalid configuration: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library only on wasm
}
