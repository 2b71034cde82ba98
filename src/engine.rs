use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{ConfigError, EngineError, SpawnError};
use crate::game::{DeathReason, GameSnapshot, GameState, GameStatus};
use crate::geometry::{BoundaryMode, Projection, project};
use crate::input::{Direction, DirectionBuffer};
use crate::powerup::{PowerUpEvent, PowerUpScheduler};
use crate::score::HighScoreStore;
use crate::snake::{Position, Snake};
use crate::spawn::SpawnPlanner;
use crate::speed::{speed_multiplier, tick_interval_for_score};

/// Heading of a fresh snake.
pub const START_DIRECTION: Direction = Direction::Right;

/// What a call to [`SimulationEngine::tick`] did.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    /// Not running, paused or over; nothing changed.
    Idle,
    Moved,
    AteFood,
    AtePowerUp { growth: usize },
    GameOver(DeathReason),
}

#[derive(Default)]
struct Callbacks {
    game_over: Vec<Box<dyn FnMut(u32)>>,
    score_change: Vec<Box<dyn FnMut(u32)>>,
    power_up_spawn: Vec<Box<dyn FnMut(Position)>>,
    power_up_expire: Vec<Box<dyn FnMut()>>,
}

/// Owns the game state and every rule that changes it.
///
/// The engine never schedules its own ticks: the caller invokes [`tick`] at
/// [`tick_interval`] and re-reads the interval after each tick. Power-up
/// deadlines live on the injected [`Clock`] and fire from [`poll_timers`].
/// All of this is meant to run on one thread; the engine is the single
/// writer of its state.
///
/// [`tick`]: SimulationEngine::tick
/// [`tick_interval`]: SimulationEngine::tick_interval
/// [`poll_timers`]: SimulationEngine::poll_timers
pub struct SimulationEngine {
    config: EngineConfig,
    state: GameState,
    planner: SpawnPlanner,
    scheduler: PowerUpScheduler,
    rng: StdRng,
    clock: Box<dyn Clock>,
    store: Box<dyn HighScoreStore>,
    callbacks: Callbacks,
    epoch: u64,
}

impl SimulationEngine {
    /// Builds an engine with an entropy-seeded RNG.
    pub fn new(
        config: EngineConfig,
        clock: impl Clock + 'static,
        store: impl HighScoreStore + 'static,
    ) -> Result<Self, ConfigError> {
        Self::build(
            config,
            StdRng::from_entropy(),
            Box::new(clock),
            Box::new(store),
        )
    }

    /// Builds a deterministic engine for tests and reproducible runs.
    pub fn with_seed(
        config: EngineConfig,
        seed: u64,
        clock: impl Clock + 'static,
        store: impl HighScoreStore + 'static,
    ) -> Result<Self, ConfigError> {
        Self::build(
            config,
            StdRng::seed_from_u64(seed),
            Box::new(clock),
            Box::new(store),
        )
    }

    fn build(
        config: EngineConfig,
        mut rng: StdRng,
        clock: Box<dyn Clock>,
        mut store: Box<dyn HighScoreStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let high_score = store.load().unwrap_or_else(|error| {
            warn!(%error, "failed to load high score, starting from zero");
            0
        });
        let planner = SpawnPlanner::new(config.grid, config.spawn_attempts);
        let mode = config.boundary_mode;
        let state = fresh_state(&config, &planner, &mut rng, mode, high_score)?;

        info!(
            width = config.grid.width,
            height = config.grid.height,
            mode = mode.label(),
            high_score,
            "simulation engine ready"
        );

        Ok(Self {
            scheduler: PowerUpScheduler::new(config.power_up),
            config,
            state,
            planner,
            rng,
            clock,
            store,
            callbacks: Callbacks::default(),
            epoch: 0,
        })
    }

    /// Advances the game by one step.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.status != GameStatus::Running {
            return TickOutcome::Idle;
        }

        self.state.tick_count += 1;
        let direction = self.state.directions.commit();
        let head = self.state.snake.head();

        let next = match project(head, direction, self.state.boundary_mode, self.state.bounds) {
            Projection::Inside(next) => next,
            Projection::OutOfBounds => return self.finish(DeathReason::OutOfBounds),
        };

        let eats_food = self.state.food == Some(next);
        let eats_power_up = !eats_food && self.state.power_up == Some(next);

        if self.state.snake.collides_with(next, eats_food || eats_power_up) {
            return self.finish(DeathReason::SelfCollision);
        }

        if eats_food {
            self.state.snake.advance(next, true);
            self.add_score(self.config.food_points);

            let excluded = self.state.cells_blocking_food();
            return match self.planner.place(&mut self.rng, &excluded) {
                Ok(food) => {
                    self.state.food = Some(food);
                    TickOutcome::AteFood
                }
                Err(SpawnError::NoSpaceAvailable { .. }) => {
                    self.state.food = None;
                    self.finish(DeathReason::NoSpaceAvailable)
                }
            };
        }

        if eats_power_up {
            let length_before = self.state.snake.len();
            let growth = power_up_growth(length_before, self.config.power_up_growth_factor);

            // The new head accounts for one segment; the rest waits on the tail.
            self.state.snake.advance(next, true);
            self.state.snake.stack_on_tail(growth - 1);
            self.state.power_up = None;
            self.scheduler.consume();
            self.add_score(self.config.power_up_points);

            info!(growth, length = self.state.snake.len(), "power-up eaten");
            return TickOutcome::AtePowerUp { growth };
        }

        self.state.snake.advance(next, false);
        TickOutcome::Moved
    }

    /// Queues a turn for the next tick. The first accepted turn on a fresh
    /// board starts the game.
    pub fn set_intent(&mut self, direction: Direction) -> Result<(), EngineError> {
        match self.state.status {
            GameStatus::GameOver => return Err(EngineError::GameOver),
            GameStatus::Paused => return Err(EngineError::Paused),
            GameStatus::Ready | GameStatus::Running => {}
        }

        if !self.state.directions.offer(direction) {
            let current = self.state.directions.committed();
            debug!(?current, requested = ?direction, "reversal rejected");
            return Err(EngineError::ReversalRejected {
                current,
                requested: direction,
            });
        }

        if self.state.status == GameStatus::Ready {
            self.state.status = GameStatus::Running;
            self.epoch += 1;
            self.scheduler.start(self.clock.now());
            info!(mode = self.state.boundary_mode.label(), "game started");
        }

        Ok(())
    }

    /// Suspends a running game. Pausing a paused game changes nothing.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        match self.state.status {
            GameStatus::Running => {
                self.state.status = GameStatus::Paused;
                self.epoch += 1;
                self.stop_power_ups();
                info!(score = self.state.score, "game paused");
                Ok(())
            }
            GameStatus::Paused => Ok(()),
            GameStatus::Ready => Err(EngineError::NotRunning),
            GameStatus::GameOver => Err(EngineError::GameOver),
        }
    }

    /// Continues a paused game. Resuming a running game changes nothing.
    pub fn resume(&mut self) -> Result<(), EngineError> {
        match self.state.status {
            GameStatus::Paused => {
                self.state.status = GameStatus::Running;
                self.epoch += 1;
                self.scheduler.start(self.clock.now());
                info!("game resumed");
                Ok(())
            }
            GameStatus::Running => Ok(()),
            GameStatus::Ready => Err(EngineError::NotRunning),
            GameStatus::GameOver => Err(EngineError::GameOver),
        }
    }

    pub fn toggle_pause(&mut self) -> Result<(), EngineError> {
        if self.state.is_paused() {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Replaces the game with a fresh board in `mode`. The high score survives.
    pub fn reset(&mut self, mode: BoundaryMode) -> Result<(), EngineError> {
        self.stop_power_ups();

        let previous_score = self.state.score;
        self.state = fresh_state(
            &self.config,
            &self.planner,
            &mut self.rng,
            mode,
            self.state.high_score,
        )?;
        self.epoch += 1;

        if previous_score != 0 {
            self.emit_score_change();
        }

        info!(mode = mode.label(), "game reset");
        Ok(())
    }

    /// Changes the boundary policy of the next game. Refused while a game
    /// is running or paused.
    pub fn set_boundary_mode(&mut self, mode: BoundaryMode) -> Result<(), EngineError> {
        if self.state.is_running() {
            debug!(requested = mode.label(), "boundary change refused");
            return Err(EngineError::InvalidModeChange);
        }

        self.state.boundary_mode = mode;
        Ok(())
    }

    pub fn toggle_boundary_mode(&mut self) -> Result<BoundaryMode, EngineError> {
        let mode = self.state.boundary_mode.toggled();
        self.set_boundary_mode(mode)?;
        Ok(mode)
    }

    /// Stops every timer and parks a running game. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if self.state.status == GameStatus::Running {
            self.state.status = GameStatus::Paused;
            self.epoch += 1;
        }
        self.stop_power_ups();
    }

    /// Fires due power-up deadlines.
    pub fn poll_timers(&mut self) {
        if self.state.status != GameStatus::Running {
            return;
        }

        let now = self.clock.now();
        for event in self.scheduler.poll(now, &mut self.rng) {
            match event {
                PowerUpEvent::Spawn => self.spawn_power_up(now),
                PowerUpEvent::Expire => {
                    if self.state.power_up.take().is_some() {
                        debug!("power-up expired");
                        self.emit_power_up_expire();
                    }
                }
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let state = &self.state;
        GameSnapshot {
            snake: state.snake.segments().copied().collect(),
            length: state.snake.len(),
            direction: state.directions.committed(),
            pending_direction: state.directions.pending(),
            food: state.food,
            power_up: state.power_up,
            power_up_remaining: state
                .power_up
                .and_then(|_| self.scheduler.expires_in(self.clock.now())),
            score: state.score,
            high_score: state.high_score,
            new_high_score: state.new_high_score,
            tick_interval: state.tick_interval,
            speed_multiplier: speed_multiplier(state.score, &self.config.speed),
            boundary_mode: state.boundary_mode,
            status: state.status,
            running: state.is_running(),
            paused: state.is_paused(),
            game_over: state.is_game_over(),
            death_reason: state.death_reason,
            tick_count: state.tick_count,
            bounds: state.bounds,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current interval between ticks.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.state.tick_interval
    }

    /// Counter bumped on every lifecycle transition; work scheduled under an
    /// older epoch must be dropped.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    #[must_use]
    pub fn scheduler(&self) -> &PowerUpScheduler {
        &self.scheduler
    }

    pub fn on_game_over(&mut self, callback: impl FnMut(u32) + 'static) {
        self.callbacks.game_over.push(Box::new(callback));
    }

    pub fn on_score_change(&mut self, callback: impl FnMut(u32) + 'static) {
        self.callbacks.score_change.push(Box::new(callback));
    }

    pub fn on_power_up_spawn(&mut self, callback: impl FnMut(Position) + 'static) {
        self.callbacks.power_up_spawn.push(Box::new(callback));
    }

    pub fn on_power_up_expire(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.power_up_expire.push(Box::new(callback));
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Places a power-up. A live one is replaced and reported as expired.
    fn spawn_power_up(&mut self, now: Duration) {
        let excluded = self.state.occupied_cells();

        match self.planner.place(&mut self.rng, &excluded) {
            Ok(cell) => {
                let replaced = self.state.power_up.replace(cell);
                self.scheduler.arm_expiry(now);
                if replaced.is_some() {
                    debug!("power-up replaced before expiry");
                    self.emit_power_up_expire();
                }
                debug!(x = cell.x, y = cell.y, "power-up spawned");
                for callback in &mut self.callbacks.power_up_spawn {
                    callback(cell);
                }
            }
            Err(error) => warn!(%error, "skipping power-up spawn"),
        }
    }

    fn stop_power_ups(&mut self) {
        self.scheduler.stop();
        if self.state.power_up.take().is_some() {
            self.emit_power_up_expire();
        }
    }

    fn add_score(&mut self, points: u32) {
        self.state.score = self.state.score.saturating_add(points);
        self.state.tick_interval = tick_interval_for_score(self.state.score, &self.config.speed);
        self.emit_score_change();
    }

    fn finish(&mut self, reason: DeathReason) -> TickOutcome {
        self.state.status = GameStatus::GameOver;
        self.state.death_reason = Some(reason);
        self.epoch += 1;
        self.stop_power_ups();

        let score = self.state.score;
        if score > self.state.high_score {
            self.state.high_score = score;
            self.state.new_high_score = true;
            if let Err(error) = self.store.save(score) {
                warn!(%error, score, "failed to save high score");
            }
        }

        info!(score, ?reason, ticks = self.state.tick_count, "game over");
        for callback in &mut self.callbacks.game_over {
            callback(score);
        }

        TickOutcome::GameOver(reason)
    }

    fn emit_score_change(&mut self) {
        let score = self.state.score;
        for callback in &mut self.callbacks.score_change {
            callback(score);
        }
    }

    fn emit_power_up_expire(&mut self) {
        for callback in &mut self.callbacks.power_up_expire {
            callback();
        }
    }
}

/// Extra length granted by a power-up: a fraction of the current length,
/// never less than one segment.
#[must_use]
pub fn power_up_growth(length: usize, factor: f64) -> usize {
    let scaled = (length as f64 * factor).floor();
    if scaled.is_finite() && scaled >= 1.0 {
        scaled as usize
    } else {
        1
    }
}

fn fresh_state(
    config: &EngineConfig,
    planner: &SpawnPlanner,
    rng: &mut StdRng,
    mode: BoundaryMode,
    high_score: u32,
) -> Result<GameState, SpawnError> {
    let snake = Snake::new(Position::center_of(config.grid));
    let excluded = snake.segments().copied().collect();
    let food = planner.place(rng, &excluded)?;

    Ok(GameState {
        snake,
        directions: DirectionBuffer::new(START_DIRECTION),
        food: Some(food),
        power_up: None,
        score: 0,
        high_score,
        new_high_score: false,
        tick_interval: tick_interval_for_score(0, &config.speed),
        boundary_mode: mode,
        status: GameStatus::Ready,
        death_reason: None,
        tick_count: 0,
        bounds: config.grid,
    })
}
