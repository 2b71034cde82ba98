use std::time::Duration;

use tracing::trace;

use crate::engine::{SimulationEngine, TickOutcome};
use crate::game::GameStatus;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct PendingTick {
    epoch: u64,
    due: Duration,
}

/// Periodic tick source for a [`SimulationEngine`].
///
/// The pending tick is tagged with the engine epoch it was scheduled under;
/// after a pause, reset or game over the tag no longer matches and the tick is
/// dropped instead of firing into the new game. The interval is re-read from
/// the engine after every tick, so speed changes apply to the very next one.
#[derive(Debug, Default)]
pub struct GameLoop {
    next_tick: Option<PendingTick>,
}

impl GameLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires power-up deadlines and, when due, one tick.
    pub fn pump(&mut self, engine: &mut SimulationEngine) -> Option<TickOutcome> {
        engine.poll_timers();

        if engine.state().status != GameStatus::Running {
            self.next_tick = None;
            return None;
        }

        let now = engine.now();
        let pending = match self.next_tick {
            Some(pending) if pending.epoch == engine.epoch() => pending,
            stale => {
                if stale.is_some() {
                    trace!("dropping tick scheduled under a previous epoch");
                }
                self.schedule(engine, now)
            }
        };

        if pending.due > now {
            return None;
        }

        let outcome = engine.tick();
        self.schedule(engine, now);
        Some(outcome)
    }

    /// Time until the next scheduled tick, if one is pending.
    #[must_use]
    pub fn until_next_tick(&self, now: Duration) -> Option<Duration> {
        self.next_tick.map(|tick| tick.due.saturating_sub(now))
    }

    /// Drops the pending tick. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        self.next_tick = None;
    }

    fn schedule(&mut self, engine: &SimulationEngine, now: Duration) -> PendingTick {
        let pending = PendingTick {
            epoch: engine.epoch(),
            due: now + engine.tick_interval(),
        };
        self.next_tick = Some(pending);
        pending
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::GameLoop;
    use crate::clock::{Clock, ManualClock};
    use crate::config::EngineConfig;
    use crate::engine::{SimulationEngine, TickOutcome};
    use crate::geometry::BoundaryMode;
    use crate::input::Direction;
    use crate::score::MemoryHighScoreStore;

    fn engine(clock: &ManualClock) -> SimulationEngine {
        let config = EngineConfig {
            boundary_mode: BoundaryMode::Wrap,
            ..EngineConfig::default()
        };
        SimulationEngine::with_seed(config, 3, clock.clone(), MemoryHighScoreStore::default())
            .expect("valid config")
    }

    #[test]
    fn nothing_ticks_before_the_game_starts() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        let mut game_loop = GameLoop::new();

        clock.advance_ms(1_000);

        assert_eq!(game_loop.pump(&mut engine), None);
        assert_eq!(game_loop.until_next_tick(clock.now()), None);
    }

    #[test]
    fn ticks_fire_once_per_interval() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        let mut game_loop = GameLoop::new();
        engine.set_intent(Direction::Down).expect("starts");

        assert_eq!(game_loop.pump(&mut engine), None);
        clock.advance_ms(119);
        assert_eq!(game_loop.pump(&mut engine), None);
        clock.advance_ms(1);
        assert!(matches!(
            game_loop.pump(&mut engine),
            Some(TickOutcome::Moved | TickOutcome::AteFood)
        ));
        assert_eq!(
            game_loop.until_next_tick(clock.now()),
            Some(Duration::from_millis(120))
        );
    }

    #[test]
    fn pause_drops_pending_tick() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        let mut game_loop = GameLoop::new();
        engine.set_intent(Direction::Down).expect("starts");
        game_loop.pump(&mut engine);

        engine.pause().expect("pause");
        clock.advance_ms(500);
        assert_eq!(game_loop.pump(&mut engine), None);

        engine.resume().expect("resume");
        // A fresh interval starts at resume time.
        assert_eq!(game_loop.pump(&mut engine), None);
        assert_eq!(
            game_loop.until_next_tick(clock.now()),
            Some(Duration::from_millis(120))
        );
    }

    #[test]
    fn reset_invalidates_tick_from_previous_game() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        let mut game_loop = GameLoop::new();
        engine.set_intent(Direction::Down).expect("starts");
        game_loop.pump(&mut engine);
        clock.advance_ms(100);

        engine.reset(BoundaryMode::Wrap).expect("reset");
        engine.set_intent(Direction::Up).expect("restart");
        clock.advance_ms(20);

        // The old tick was due now, but belongs to the previous epoch.
        assert_eq!(game_loop.pump(&mut engine), None);
        assert_eq!(engine.state().tick_count, 0);
    }
}
