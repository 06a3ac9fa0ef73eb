use serde::{Deserialize, Serialize};

use super::action::Direction;
use super::config::INITIAL_SNAKE_LENGTH;
use super::grid::Position;
use super::items::BoardItems;

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Build a snake from `body`, repeating its tail cell until it is
    /// `length` segments long.
    ///
    /// Respawns use this to keep the snake's size; the stacked tail cells
    /// unfold as the snake moves.
    pub fn padded(mut body: Vec<Position>, length: usize, direction: Direction) -> Self {
        if let Some(&tail) = body.last() {
            while body.len() < length {
                body.push(tail);
            }
        }
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Check if position is covered by any segment, head and tail included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Push `new_head` to the front, dropping the tail unless growing
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Fruits eaten since the round began; snake length is the score
    pub fn fruits_eaten(&self) -> usize {
        self.len().saturating_sub(INITIAL_SNAKE_LENGTH)
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Round phase. Decides which timers run and which inputs count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NameEntry,
    Countdown,
    Playing,
    GameOver,
}

/// Complete game state, owned by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub items: BoardItems,
    pub lives: u32,
    /// Movement interval in milliseconds
    pub speed_ms: u64,
    /// Whole seconds of play this round
    pub timer_secs: u64,
    /// Timer value after which the active time boost expires
    pub boost_ends_at: Option<u64>,
    pub phase: Phase,
    pub countdown_remaining: u32,
    pub player_name: Option<String>,
}

impl GameState {
    pub fn boost_active(&self) -> bool {
        self.boost_ends_at.is_some()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            snake: self.snake.body.clone(),
            direction: self.snake.direction,
            fruits: self.items.fruits.clone(),
            bombs: self.items.bombs.clone(),
            hearts: self.items.hearts.clone(),
            booster: self.items.booster,
            lives: self.lives,
            speed_ms: self.speed_ms,
            timer_secs: self.timer_secs,
            boost_active: self.boost_active(),
            boost_ends_at: self.boost_ends_at,
            phase: self.phase,
            countdown_remaining: self.countdown_remaining,
            player_name: self.player_name.clone(),
            fruits_eaten: self.snake.fruits_eaten(),
        }
    }
}

/// Read-only copy of the state handed to presentation after each transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub snake: Vec<Position>,
    pub direction: Direction,
    pub fruits: Vec<Position>,
    pub bombs: Vec<Position>,
    pub hearts: Vec<Position>,
    pub booster: Position,
    pub lives: u32,
    pub speed_ms: u64,
    pub timer_secs: u64,
    pub boost_active: bool,
    pub boost_ends_at: Option<u64>,
    pub phase: Phase,
    pub countdown_remaining: u32,
    pub player_name: Option<String>,
    pub fruits_eaten: usize,
}

impl GameSnapshot {
    /// Elapsed play time as `MM:SS`
    pub fn format_time(&self) -> String {
        let minutes = self.timer_secs / 60;
        let seconds = self.timer_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}
