use std::collections::HashSet;

use rand::Rng;

use crate::config::GridSize;
use crate::error::SpawnError;
use crate::snake::Position;

/// Picks free cells for food and power-ups.
///
/// Random draws are tried first; once `attempts` draws have all landed on
/// excluded cells the board is scanned row by row for the first free cell.
#[derive(Debug, Clone, Copy)]
pub struct SpawnPlanner {
    bounds: GridSize,
    attempts: u32,
}

impl SpawnPlanner {
    #[must_use]
    pub fn new(bounds: GridSize, attempts: u32) -> Self {
        Self { bounds, attempts }
    }

    /// Returns a cell that is not in `excluded`.
    pub fn place<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        excluded: &HashSet<Position>,
    ) -> Result<Position, SpawnError> {
        if excluded.len() >= self.bounds.total_cells() {
            return Err(self.no_space());
        }

        let width = i32::from(self.bounds.width);
        let height = i32::from(self.bounds.height);

        for _ in 0..self.attempts {
            let candidate = Position {
                x: rng.gen_range(0..width),
                y: rng.gen_range(0..height),
            };
            if !excluded.contains(&candidate) {
                return Ok(candidate);
            }
        }

        (0..height)
            .flat_map(|y| (0..width).map(move |x| Position { x, y }))
            .find(|position| !excluded.contains(position))
            .ok_or_else(|| self.no_space())
    }

    fn no_space(&self) -> SpawnError {
        SpawnError::NoSpaceAvailable {
            width: self.bounds.width,
            height: self.bounds.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::SpawnPlanner;
    use crate::config::GridSize;
    use crate::error::SpawnError;
    use crate::snake::Position;

    fn all_cells(bounds: GridSize) -> HashSet<Position> {
        let width = i32::from(bounds.width);
        (0..i32::from(bounds.height))
            .flat_map(|y| (0..width).map(move |x| Position { x, y }))
            .collect()
    }

    #[test]
    fn spawn_never_lands_on_excluded_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = GridSize {
            width: 8,
            height: 6,
        };
        let planner = SpawnPlanner::new(bounds, 100);
        let excluded: HashSet<_> = [
            Position { x: 0, y: 0 },
            Position { x: 1, y: 0 },
            Position { x: 2, y: 0 },
        ]
        .into_iter()
        .collect();

        for _ in 0..100 {
            let cell = planner.place(&mut rng, &excluded).expect("board has room");
            assert!(!excluded.contains(&cell));
            assert!(cell.is_within_bounds(bounds));
        }
    }

    #[test]
    fn dense_board_falls_back_to_row_major_scan() {
        let mut rng = StdRng::seed_from_u64(11);
        let bounds = GridSize::square(4);
        let mut excluded = all_cells(bounds);
        let free = Position { x: 3, y: 2 };
        excluded.remove(&free);

        // With zero random attempts the scan is the only path.
        let planner = SpawnPlanner::new(bounds, 0);
        assert_eq!(planner.place(&mut rng, &excluded), Ok(free));

        let planner = SpawnPlanner::new(bounds, 100);
        assert_eq!(planner.place(&mut rng, &excluded), Ok(free));
    }

    #[test]
    fn scan_returns_first_free_cell_in_row_major_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = GridSize::square(3);
        let mut excluded = all_cells(bounds);
        excluded.remove(&Position { x: 2, y: 1 });
        excluded.remove(&Position { x: 0, y: 2 });

        let planner = SpawnPlanner::new(bounds, 0);
        let first_free = Position { x: 2, y: 1 };
        assert_eq!(planner.place(&mut rng, &excluded), Ok(first_free));
    }

    #[test]
    fn full_board_reports_no_space() {
        let mut rng = StdRng::seed_from_u64(5);
        let bounds = GridSize::square(3);
        let planner = SpawnPlanner::new(bounds, 100);

        assert_eq!(
            planner.place(&mut rng, &all_cells(bounds)),
            Err(SpawnError::NoSpaceAvailable {
                width: 3,
                height: 3
            })
        );
    }
}
