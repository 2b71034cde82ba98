use serde::{Deserialize, Serialize};

use crate::config::GridSize;
use crate::input::Direction;
use crate::snake::Position;

/// What happens when the head leaves the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Leaving the board is fatal.
    #[default]
    Walled,
    /// The board is a torus; the head re-enters on the opposite edge.
    Wrap,
}

impl BoundaryMode {
    /// Returns the other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Walled => Self::Wrap,
            Self::Wrap => Self::Walled,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Walled => "walls",
            Self::Wrap => "wrap",
        }
    }
}

/// Result of projecting a cell one step in some direction.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Projection {
    Inside(Position),
    OutOfBounds,
}

/// Moves `cell` one step in `direction` under the boundary policy.
#[must_use]
pub fn project(
    cell: Position,
    direction: Direction,
    mode: BoundaryMode,
    bounds: GridSize,
) -> Projection {
    let (dx, dy) = direction.delta();
    let candidate = Position {
        x: cell.x + dx,
        y: cell.y + dy,
    };

    match mode {
        BoundaryMode::Wrap => Projection::Inside(candidate.wrapped(bounds)),
        BoundaryMode::Walled if candidate.is_within_bounds(bounds) => Projection::Inside(candidate),
        BoundaryMode::Walled => Projection::OutOfBounds,
    }
}
