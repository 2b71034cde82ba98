use std::collections::VecDeque;

use serde::Serialize;

use crate::config::GridSize;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns this position wrapped into bounds on both axes.
    #[must_use]
    pub fn wrapped(self, bounds: GridSize) -> Self {
        Self {
            x: self.x.rem_euclid(i32::from(bounds.width)),
            y: self.y.rem_euclid(i32::from(bounds.height)),
        }
    }

    /// Centre cell of the board, used as the spawn point of a fresh snake.
    #[must_use]
    pub fn center_of(bounds: GridSize) -> Self {
        Self {
            x: i32::from(bounds.width / 2),
            y: i32::from(bounds.height / 2),
        }
    }
}

/// Snake body, head first.
///
/// Growth that has not unfolded yet is kept as segments stacked on the tail
/// cell: they count towards [`Snake::len`] but the tail cell stays occupied
/// until every stacked segment has been pulled along.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    stacked: usize,
}

impl Snake {
    /// Creates a one-cell snake at `start`.
    #[must_use]
    pub fn new(start: Position) -> Self {
        let mut body = VecDeque::new();
        body.push_front(start);

        Self { body, stacked: 0 }
    }

    /// Creates a snake from explicit body segments (front is head).
    ///
    /// # Panics
    ///
    /// Panics when `segments` is empty.
    #[must_use]
    pub fn from_segments(segments: Vec<Position>) -> Self {
        assert!(!segments.is_empty(), "snake needs at least one segment");
        Self {
            body: VecDeque::from(segments),
            stacked: 0,
        }
    }

    /// Returns true if moving the head to `next` would hit the body.
    ///
    /// The tail cell counts as free when it is vacated by this same move,
    /// which is only the case when the snake is not growing and has no
    /// stacked segments left on it.
    #[must_use]
    pub fn collides_with(&self, next: Position, growing: bool) -> bool {
        let tail_vacates = !growing && self.stacked == 0;
        let checked = if tail_vacates {
            self.body.len() - 1
        } else {
            self.body.len()
        };

        self.body.iter().take(checked).any(|cell| *cell == next)
    }

    /// Moves the head to `next`. The tail follows unless `grow` is set.
    pub fn advance(&mut self, next: Position, grow: bool) {
        self.body.push_front(next);
        if grow {
            return;
        }

        if self.stacked > 0 {
            self.stacked -= 1;
        } else {
            let _ = self.body.pop_back();
        }
    }

    /// Adds `segments` extra segments on the current tail cell.
    pub fn stack_on_tail(&mut self, segments: usize) {
        self.stacked += segments;
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Returns the current tail position.
    #[must_use]
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns the segment count, stacked segments included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len() + self.stacked
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Segments still waiting on the tail cell.
    #[must_use]
    pub fn stacked(&self) -> usize {
        self.stacked
    }

    /// Iterates over occupied cells from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}
