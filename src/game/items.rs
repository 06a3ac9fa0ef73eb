//! Fruit, bombs, hearts and the time booster.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::grid::{Grid, Position};

/// How many of each repeatable item a board carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCounts {
    pub fruits: usize,
    pub bombs: usize,
    pub hearts: usize,
}

/// One item on the board. Repeatable items carry their slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Fruit(usize),
    Bomb(usize),
    Heart(usize),
    Booster,
}

/// Items found on a single cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pickups {
    pub fruit: Option<usize>,
    pub bomb: Option<usize>,
    pub heart: Option<usize>,
    pub booster: bool,
}

/// Every item currently on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardItems {
    pub fruits: Vec<Position>,
    pub bombs: Vec<Position>,
    pub hearts: Vec<Position>,
    pub booster: Position,
}

/// Place a full board of items around `snake`.
///
/// Fruits go first, then bombs, then hearts, then the booster; each placement
/// reserves its cell for the ones after it. Returns `None` if the board runs
/// out of free cells.
pub fn place_items<R: Rng + ?Sized>(
    grid: &Grid,
    snake: &[Position],
    counts: ItemCounts,
    rng: &mut R,
) -> Option<BoardItems> {
    let mut occupied: HashSet<Position> = snake.iter().copied().collect();

    let mut place = |count: usize, occupied: &mut HashSet<Position>| {
        (0..count)
            .map(|_| {
                let pos = grid.unique_random_position(occupied, rng)?;
                occupied.insert(pos);
                Some(pos)
            })
            .collect::<Option<Vec<_>>>()
    };

    let fruits = place(counts.fruits, &mut occupied)?;
    let bombs = place(counts.bombs, &mut occupied)?;
    let hearts = place(counts.hearts, &mut occupied)?;
    let booster = grid.unique_random_position(&occupied, rng)?;

    Some(BoardItems {
        fruits,
        bombs,
        hearts,
        booster,
    })
}

impl BoardItems {
    /// Every item cell, booster last
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.fruits
            .iter()
            .chain(&self.bombs)
            .chain(&self.hearts)
            .copied()
            .chain(std::iter::once(self.booster))
    }

    pub fn pickups_at(&self, pos: Position) -> Pickups {
        Pickups {
            fruit: self.fruits.iter().position(|p| *p == pos),
            bomb: self.bombs.iter().position(|p| *p == pos),
            heart: self.hearts.iter().position(|p| *p == pos),
            booster: self.booster == pos,
        }
    }

    /// Move one item to a cell that is free of `snake` and of every item.
    ///
    /// Returns `None`, leaving the item where it was, if no free cell exists.
    pub fn relocate<R: Rng + ?Sized>(
        &mut self,
        kind: ItemKind,
        grid: &Grid,
        snake: &[Position],
        rng: &mut R,
    ) -> Option<Position> {
        let occupied: HashSet<Position> = snake.iter().copied().chain(self.positions()).collect();
        let pos = grid.unique_random_position(&occupied, rng)?;

        let slot = match kind {
            ItemKind::Fruit(i) => self.fruits.get_mut(i)?,
            ItemKind::Bomb(i) => self.bombs.get_mut(i)?,
            ItemKind::Heart(i) => self.hearts.get_mut(i)?,
            ItemKind::Booster => &mut self.booster,
        };
        *slot = pos;
        Some(pos)
    }
}
