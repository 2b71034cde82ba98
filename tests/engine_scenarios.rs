use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use grid_snake::clock::ManualClock;
use grid_snake::config::EngineConfig;
use grid_snake::engine::{SimulationEngine, TickOutcome};
use grid_snake::error::EngineError;
use grid_snake::game::{DeathReason, GameStatus};
use grid_snake::geometry::BoundaryMode;
use grid_snake::input::Direction;
use grid_snake::score::MemoryHighScoreStore;
use grid_snake::snake::Position;

fn engine(mode: BoundaryMode, store: MemoryHighScoreStore) -> (SimulationEngine, ManualClock) {
    let clock = ManualClock::new();
    let config = EngineConfig {
        boundary_mode: mode,
        ..EngineConfig::default()
    };
    let engine =
        SimulationEngine::with_seed(config, 2024, clock.clone(), store).expect("valid config");
    (engine, clock)
}

/// Ticks until the game ends, giving up after `limit` ticks.
fn tick_until_over(engine: &mut SimulationEngine, limit: usize) -> Option<TickOutcome> {
    (0..limit).find_map(|_| match engine.tick() {
        outcome @ TickOutcome::GameOver(_) => Some(outcome),
        _ => None,
    })
}

#[test]
fn heading_right_on_walled_board_ends_at_the_wall() {
    let store = MemoryHighScoreStore::with_high_score(5_000);
    let (mut engine, _) = engine(BoundaryMode::Walled, store.clone());
    let finals = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&finals);
    engine.on_game_over(move |score| sink.borrow_mut().push(score));

    engine.set_intent(Direction::Right).expect("first move");
    assert_eq!(engine.state().status, GameStatus::Running);

    // From (10, 10) the wall is ten steps away; food on the row only lengthens the snake.
    let outcome = tick_until_over(&mut engine, 10);

    let hit_wall = TickOutcome::GameOver(DeathReason::OutOfBounds);
    assert_eq!(outcome, Some(hit_wall));
    let snapshot = engine.snapshot();
    assert!(snapshot.game_over);
    assert!(!snapshot.running);
    assert_eq!(snapshot.high_score, 5_000);
    assert_eq!(store.saves(), 0);
    assert_eq!(finals.borrow().len(), 1);
}

#[test]
fn heading_right_on_wrap_board_comes_back_around() {
    let (mut engine, _) = engine(BoundaryMode::Wrap, MemoryHighScoreStore::default());
    engine.set_intent(Direction::Right).expect("first move");

    for _ in 0..10 {
        assert!(!matches!(engine.tick(), TickOutcome::GameOver(_)));
    }

    assert_eq!(engine.state().snake.head(), Position { x: 0, y: 10 });
    assert_eq!(engine.state().status, GameStatus::Running);
}

#[test]
fn mode_is_locked_during_play_and_free_after_game_over() {
    let (mut engine, _) = engine(BoundaryMode::Walled, MemoryHighScoreStore::default());
    engine.set_intent(Direction::Up).expect("starts");

    assert_eq!(
        engine.set_boundary_mode(BoundaryMode::Wrap),
        Err(EngineError::InvalidModeChange)
    );

    tick_until_over(&mut engine, 20).expect("walled board ends the run");
    assert_eq!(engine.set_boundary_mode(BoundaryMode::Wrap), Ok(()));
    assert_eq!(engine.set_intent(Direction::Up), Err(EngineError::GameOver));
}

#[test]
fn high_score_never_decreases_across_resets() {
    let store = MemoryHighScoreStore::default();
    let (mut engine, _) = engine(BoundaryMode::Walled, store.clone());
    let mut best = 0;

    for round in 0..5 {
        engine.reset(BoundaryMode::Walled).expect("reset");
        let direction = if round % 2 == 0 {
            Direction::Up
        } else {
            Direction::Down
        };
        engine.set_intent(direction).expect("starts");
        tick_until_over(&mut engine, 50).expect("run ends at a wall");

        let high_score = engine.state().high_score;
        assert!(high_score >= best);
        best = high_score;
    }

    assert_eq!(store.high_score(), best);
}

#[test]
fn power_up_appears_after_initial_delay_and_is_cleared_on_pause() {
    let (mut engine, clock) = engine(BoundaryMode::Wrap, MemoryHighScoreStore::default());
    let spawned = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&spawned);
    engine.on_power_up_spawn(move |cell| sink.borrow_mut().push(cell));

    engine.set_intent(Direction::Up).expect("starts");
    clock.advance(Duration::from_millis(1_999));
    engine.poll_timers();
    assert!(spawned.borrow().is_empty());

    clock.advance(Duration::from_millis(1));
    engine.poll_timers();
    let cell = *spawned.borrow().first().expect("power-up spawned at 2s");
    assert_eq!(engine.state().power_up, Some(cell));
    assert_ne!(Some(cell), engine.state().food);
    assert!(!engine.state().snake.occupies(cell));
    assert!(engine.snapshot().power_up_remaining.is_some());

    engine.pause().expect("pause");
    assert_eq!(engine.state().power_up, None);
    assert_eq!(engine.snapshot().power_up_remaining, None);
}
