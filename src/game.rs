use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;

use crate::config::GridSize;
use crate::geometry::BoundaryMode;
use crate::input::{Direction, DirectionBuffer};
use crate::snake::{Position, Snake};

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum GameStatus {
    /// Fresh board waiting for the first move.
    Ready,
    Running,
    Paused,
    GameOver,
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum DeathReason {
    OutOfBounds,
    SelfCollision,
    /// No free cell was left for the next food.
    NoSpaceAvailable,
}

/// Authoritative state of one game. Only the engine mutates it.
#[derive(Debug, Clone)]
pub struct GameState {
    pub snake: Snake,
    pub directions: DirectionBuffer,
    /// Absent only after the board filled up.
    pub food: Option<Position>,
    pub power_up: Option<Position>,
    pub score: u32,
    pub high_score: u32,
    /// Set when the finished game beat the stored record.
    pub new_high_score: bool,
    pub tick_interval: Duration,
    pub boundary_mode: BoundaryMode,
    pub status: GameStatus,
    pub death_reason: Option<DeathReason>,
    pub tick_count: u64,
    pub bounds: GridSize,
}

impl GameState {
    /// `Running` or `Paused`: a game is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.status, GameStatus::Running | GameStatus::Paused)
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.status == GameStatus::Paused
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    /// Cells a newly spawned item must avoid.
    #[must_use]
    pub fn occupied_cells(&self) -> HashSet<Position> {
        let mut cells = self.cells_blocking_food();
        cells.extend(self.food);
        cells
    }

    /// Cells the next food must avoid once the current food has been eaten.
    #[must_use]
    pub fn cells_blocking_food(&self) -> HashSet<Position> {
        let mut cells: HashSet<Position> = self.snake.segments().copied().collect();
        if let Some(power_up) = self.power_up {
            cells.insert(power_up);
        }
        cells
    }
}

/// Read-only copy of the game handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub snake: Vec<Position>,
    pub length: usize,
    pub direction: Direction,
    pub pending_direction: Direction,
    pub food: Option<Position>,
    pub power_up: Option<Position>,
    pub power_up_remaining: Option<Duration>,
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub tick_interval: Duration,
    pub speed_multiplier: f64,
    pub boundary_mode: BoundaryMode,
    pub status: GameStatus,
    pub running: bool,
    pub paused: bool,
    pub game_over: bool,
    pub death_reason: Option<DeathReason>,
    pub tick_count: u64,
    pub bounds: GridSize,
}

impl GameSnapshot {
    /// Best score to show while playing: the stored record or the live score.
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.high_score.max(self.score)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{GameState, GameStatus};
    use crate::config::GridSize;
    use crate::geometry::BoundaryMode;
    use crate::input::{Direction, DirectionBuffer};
    use crate::snake::{Position, Snake};

    fn state(status: GameStatus) -> GameState {
        GameState {
            snake: Snake::from_segments(vec![Position { x: 2, y: 2 }, Position { x: 1, y: 2 }]),
            directions: DirectionBuffer::new(Direction::Right),
            food: Some(Position { x: 5, y: 5 }),
            power_up: Some(Position { x: 0, y: 0 }),
            score: 0,
            high_score: 0,
            new_high_score: false,
            tick_interval: Duration::from_millis(120),
            boundary_mode: BoundaryMode::Walled,
            status,
            death_reason: None,
            tick_count: 0,
            bounds: GridSize::square(8),
        }
    }

    #[test]
    fn paused_counts_as_running() {
        assert!(state(GameStatus::Paused).is_running());
        assert!(state(GameStatus::Running).is_running());
        assert!(!state(GameStatus::Ready).is_running());
        assert!(!state(GameStatus::GameOver).is_running());
    }

    #[test]
    fn occupied_cells_cover_snake_food_and_power_up() {
        let cells = state(GameStatus::Running).occupied_cells();

        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&Position { x: 1, y: 2 }));
        assert!(cells.contains(&Position { x: 5, y: 5 }));
        assert!(cells.contains(&Position { x: 0, y: 0 }));
    }

    #[test]
    fn cleared_food_blocks_nothing() {
        let mut state = state(GameStatus::GameOver);
        state.food = None;

        let cells = state.occupied_cells();

        assert_eq!(cells, state.cells_blocking_food());
        assert!(!cells.contains(&Position { x: 5, y: 5 }));
    }
}
