//! Grid coordinates and random placement on the square board.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::action::Direction;
use super::error::{ConfigError, MAX_GRID_SIZE};

/// Cells kept free between a spawning snake head and every wall
const SAFE_MARGIN: i32 = 2;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// Square board of `size` x `size` cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    size: i32,
}

impl Grid {
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        if size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge { size });
        }
        let size = i32::try_from(size).map_err(|_| ConfigError::GridTooLarge { size })?;
        Ok(Self { size })
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        let side = self.size as usize;
        side * side
    }

    /// Check if a position is within the grid bounds
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.size && pos.y >= 0 && pos.y < self.size
    }

    /// Uniform random cell anywhere on the board
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(rng.gen_range(0..self.size), rng.gen_range(0..self.size))
    }

    /// Uniform random cell at least two cells away from every wall
    pub fn random_safe_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        let range = SAFE_MARGIN..self.size - SAFE_MARGIN;
        Position::new(rng.gen_range(range.clone()), rng.gen_range(range))
    }

    /// Random free cell, or `None` once `occupied` covers the whole board.
    ///
    /// Sampling is unbounded while a free cell exists.
    pub fn unique_random_position<R: Rng + ?Sized>(
        &self,
        occupied: &HashSet<Position>,
        rng: &mut R,
    ) -> Option<Position> {
        let taken = occupied.iter().filter(|pos| self.contains(**pos)).count();
        if taken >= self.cell_count() {
            return None;
        }

        loop {
            let pos = self.random_position(rng);
            if !occupied.contains(&pos) {
                return Some(pos);
            }
        }
    }

    /// Length-2 snake with its head in the safe zone and its tail either
    /// directly left of or directly above the head.
    pub fn random_initial_snake<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Position> {
        let head = self.random_safe_position(rng);
        let horizontal = rng.gen_bool(0.5);
        let max = self.size - 1;

        let tail = if horizontal {
            let mut x = (head.x - 1).clamp(0, max);
            if x == head.x {
                x = (head.x + 1).min(max);
            }
            Position::new(x, head.y)
        } else {
            let mut y = (head.y - 1).clamp(0, max);
            if y == head.y {
                y = (head.y + 1).min(max);
            }
            Position::new(head.x, y)
        };

        vec![head, tail]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_in_direction(Direction::Down), Position::new(5, 6));
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(5, 4));
    }

    #[test]
    fn test_bounds_checking() {
        let grid = Grid::new(20).unwrap();

        assert!(grid.contains(Position::new(0, 0)));
        assert!(grid.contains(Position::new(19, 19)));
        assert!(!grid.contains(Position::new(-1, 0)));
        assert!(!grid.contains(Position::new(20, 0)));
        assert!(!grid.contains(Position::new(0, 20)));
        assert_eq!(grid.cell_count(), 400);
    }

    #[test]
    fn test_random_positions_stay_in_bounds() {
        let grid = Grid::new(15).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            assert!(grid.contains(grid.random_position(&mut rng)));

            let safe = grid.random_safe_position(&mut rng);
            assert!((2..13).contains(&safe.x), "{:?}", safe);
            assert!((2..13).contains(&safe.y), "{:?}", safe);
        }
    }

    #[test]
    fn test_unique_position_avoids_occupied() {
        let grid = Grid::new(5).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        // Leave only (4, 4) free
        let occupied: HashSet<Position> = (0..5)
            .flat_map(|x| (0..5).map(move |y| Position::new(x, y)))
            .filter(|p| *p != Position::new(4, 4))
            .collect();

        for _ in 0..10 {
            assert_eq!(
                grid.unique_random_position(&occupied, &mut rng),
                Some(Position::new(4, 4))
            );
        }
    }

    #[test]
    fn test_unique_position_on_full_grid() {
        let grid = Grid::new(5).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut occupied: HashSet<Position> = (0..5)
            .flat_map(|x| (0..5).map(move |y| Position::new(x, y)))
            .collect();
        // Off-board entries don't count toward capacity
        occupied.insert(Position::new(-1, -1));

        assert_eq!(grid.unique_random_position(&occupied, &mut rng), None);
    }

    #[test]
    fn test_initial_snake_shape() {
        let grid = Grid::new(15).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            let snake = grid.random_initial_snake(&mut rng);
            assert_eq!(snake.len(), 2);
            let (head, tail) = (snake[0], snake[1]);

            assert!(grid.contains(head) && grid.contains(tail));
            let behind_left = tail == head.moved_by(-1, 0);
            let behind_above = tail == head.moved_by(0, -1);
            assert!(behind_left || behind_above, "{:?}", snake);
        }
    }

    #[test]
    fn test_initial_snake_on_smallest_grid() {
        // Safe zone on a 5x5 grid is the single cell (2, 2)
        let grid = Grid::new(5).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..20 {
            let snake = grid.random_initial_snake(&mut rng);
            assert_eq!(snake[0], Position::new(2, 2));
            assert_ne!(snake[0], snake[1]);
        }
    }

    #[test]
    fn test_oversized_grid_rejected() {
        assert_eq!(
            Grid::new(MAX_GRID_SIZE + 1),
            Err(ConfigError::GridTooLarge {
                size: MAX_GRID_SIZE + 1
            })
        );

        let largest = Grid::new(MAX_GRID_SIZE).unwrap();
        assert_eq!(largest.cell_count(), MAX_GRID_SIZE * MAX_GRID_SIZE);
    }
}
