use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::Serialize;

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit step `(dx, dy)`; y grows downwards.
    #[must_use]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Returns whether a direction change is legal (no immediate 180° turns).
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    next != current.opposite()
}

/// Committed heading plus the single intent waiting for the next tick.
///
/// Intents are checked against the committed heading, not the pending one, so
/// any number of inputs between two ticks collapse into the latest legal one.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DirectionBuffer {
    committed: Direction,
    pending: Direction,
}

impl DirectionBuffer {
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            committed: direction,
            pending: direction,
        }
    }

    /// Stores `direction` as the pending intent unless it reverses the
    /// committed heading. Returns whether the intent was accepted.
    pub fn offer(&mut self, direction: Direction) -> bool {
        if !direction_change_is_valid(self.committed, direction) {
            return false;
        }

        self.pending = direction;
        true
    }

    /// Promotes the pending intent to the committed heading.
    pub fn commit(&mut self) -> Direction {
        self.committed = self.pending;
        self.committed
    }

    #[must_use]
    pub fn committed(&self) -> Direction {
        self.committed
    }

    #[must_use]
    pub fn pending(&self) -> Direction {
        self.pending
    }
}

/// High-level input events consumed by the game loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Direction(Direction),
    Pause,
    Confirm,
    ToggleBoundary,
    Quit,
}

/// Decodes terminal key events into [`GameInput`].
#[derive(Debug, Clone, Copy)]
pub struct InputHandler {
    poll_timeout: Duration,
}

impl InputHandler {
    #[must_use]
    pub fn new(poll_timeout: Duration) -> Self {
        Self { poll_timeout }
    }

    /// Waits up to the poll timeout for one decoded input.
    pub fn poll_input(&mut self) -> io::Result<Option<GameInput>> {
        if !event::poll(self.poll_timeout)? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) => Ok(decode_key(key)),
            _ => Ok(None),
        }
    }
}

/// Maps one key press to a game input; releases and repeats of unbound keys
/// are ignored.
#[must_use]
pub fn decode_key(key: KeyEvent) -> Option<GameInput> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(GameInput::Quit);
    }

    let input = match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'W' | 'k') => GameInput::Direction(Direction::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S' | 'j') => GameInput::Direction(Direction::Down),
        KeyCode::Left | KeyCode::Char('a' | 'A' | 'h') => GameInput::Direction(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D' | 'l') => GameInput::Direction(Direction::Right),
        KeyCode::Char(' ' | 'p' | 'P') => GameInput::Pause,
        KeyCode::Enter => GameInput::Confirm,
        KeyCode::Char('m' | 'M') => GameInput::ToggleBoundary,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => GameInput::Quit,
        _ => return None,
    };

    Some(input)
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

    use super::{Direction, DirectionBuffer, GameInput, decode_key, direction_change_is_valid};

    #[test]
    fn opposite_direction_is_correct() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[test]
    fn direction_change_rejects_reverse() {
        let valid = direction_change_is_valid;

        assert!(!valid(Direction::Up, Direction::Down));
        assert!(!valid(Direction::Right, Direction::Left));

        assert!(valid(Direction::Up, Direction::Left));
        assert!(valid(Direction::Up, Direction::Up));
    }

    #[test]
    fn buffer_rejects_reversal_and_keeps_previous_intent() {
        let mut buffer = DirectionBuffer::new(Direction::Right);

        assert!(buffer.offer(Direction::Up));
        assert!(!buffer.offer(Direction::Left));

        assert_eq!(buffer.pending(), Direction::Up);
        assert_eq!(buffer.committed(), Direction::Right);
    }

    #[test]
    fn buffer_latest_accepted_intent_wins() {
        let mut buffer = DirectionBuffer::new(Direction::Right);

        buffer.offer(Direction::Up);
        buffer.offer(Direction::Down);

        assert_eq!(buffer.commit(), Direction::Down);
    }

    #[test]
    fn buffer_checks_against_committed_not_pending() {
        let mut buffer = DirectionBuffer::new(Direction::Right);

        // Down is queued, but Up is still only a right angle to Right.
        buffer.offer(Direction::Down);
        assert!(buffer.offer(Direction::Up));
        assert_eq!(buffer.commit(), Direction::Up);
    }

    #[test]
    fn keys_decode_to_inputs() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert_eq!(
            decode_key(press(KeyCode::Char('w'))),
            Some(GameInput::Direction(Direction::Up))
        );
        assert_eq!(
            decode_key(press(KeyCode::Left)),
            Some(GameInput::Direction(Direction::Left))
        );
        assert_eq!(
            decode_key(press(KeyCode::Char(' '))),
            Some(GameInput::Pause)
        );
        assert_eq!(
            decode_key(press(KeyCode::Char('m'))),
            Some(GameInput::ToggleBoundary)
        );
        assert_eq!(decode_key(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut release = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;

        assert_eq!(decode_key(release), None);
    }
}
