use super::action::Direction;
use super::grid::{Grid, Position};
use super::state::{CollisionType, Snake};

/// Cell the head would enter on the next move. Not bounds-checked.
pub fn propose_next_head(snake: &Snake) -> Position {
    snake.head().moved_in_direction(snake.direction)
}

/// Classify a proposed head against the board and the current body.
///
/// The whole pre-move body counts, tail included, even though the tail
/// would vacate its cell on a plain move.
pub fn classify_collision(grid: &Grid, snake: &Snake, candidate: Position) -> Option<CollisionType> {
    if !grid.contains(candidate) {
        return Some(CollisionType::Wall);
    }

    if snake.occupies(candidate) {
        return Some(CollisionType::SelfCollision);
    }

    None
}

/// Direction after a steering request; reversals are ignored
pub fn change_direction(current: Direction, requested: Direction) -> Direction {
    if current.is_opposite(requested) {
        current
    } else {
        requested
    }
}
