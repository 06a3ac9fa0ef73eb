use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{
    action::{Action, Direction},
    config::GameConfig,
    error::ConfigError,
    grid::{Grid, Position},
    items::{place_items, BoardItems, ItemCounts, ItemKind},
    movement::{change_direction, classify_collision, propose_next_head},
    state::{CollisionType, GameSnapshot, GameState, Phase, Snake},
};

/// Something that happened during a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    NameAccepted,
    /// Seconds of countdown left after this tick
    CountdownTick(u32),
    /// Countdown finished, play begins
    RoundStarted,
    DirectionChanged(Direction),
    Moved,
    AteFruit,
    HitBomb,
    GainedLife,
    BoostStarted { ends_at: u64 },
    BoostExpired,
    /// The timer advanced to this many seconds
    ClockTick(u64),
    SpeedRamp,
    LifeLost(CollisionType),
    SpeedChanged { from: u64, to: u64 },
    /// No free cell was left for an item
    BoardFull,
    GameOver,
    Restarted,
}

/// Result of a single engine transition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepResult {
    pub events: Vec<GameEvent>,
}

impl StepResult {
    /// True when the input was ignored in the current phase
    pub fn is_ignored(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, event: &GameEvent) -> bool {
        self.events.contains(event)
    }

    pub fn speed_changed(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, GameEvent::SpeedChanged { .. }))
    }

    fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

/// The game engine. Owns the authoritative state; every change goes through
/// one of its transition methods.
pub struct GameEngine {
    config: GameConfig,
    grid: Grid,
    rng: StdRng,
    state: GameState,
}

impl GameEngine {
    /// Create an engine seeded from OS entropy
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine whose every random draw follows from `seed`
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, mut rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let grid = Grid::new(config.grid_size)?;
        let (snake, items) =
            new_round(&config, &grid, &mut rng).ok_or(ConfigError::Overcrowded {
                reserved: config.reserved_cells(),
                capacity: config.cell_count(),
                limit: config.cell_count() / 2,
            })?;

        let state = fresh_state(&config, snake, items, Phase::NameEntry, None);

        Ok(Self {
            config,
            grid,
            rng,
            state,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Current movement interval in milliseconds
    pub fn speed_ms(&self) -> u64 {
        self.state.speed_ms
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    /// Dispatch a player command
    pub fn apply(&mut self, action: Action) -> StepResult {
        match action {
            Action::Move(direction) => self.change_direction(direction),
            Action::Restart => self.restart(),
            Action::ConfirmName(name) => self.confirm_name(&name),
        }
    }

    /// Leave name entry and start the countdown. Blank names are ignored.
    pub fn confirm_name(&mut self, name: &str) -> StepResult {
        let mut result = StepResult::default();
        if self.state.phase != Phase::NameEntry {
            return result;
        }

        let name = name.trim();
        if name.is_empty() {
            debug!("Ignoring blank player name");
            return result;
        }

        info!("Player {} entered", name);
        self.state.player_name = Some(name.to_string());
        self.enter_countdown();
        result.push(GameEvent::NameAccepted);
        result
    }

    /// One second of countdown
    pub fn countdown_tick(&mut self) -> StepResult {
        let mut result = StepResult::default();
        if self.state.phase != Phase::Countdown {
            return result;
        }

        self.state.countdown_remaining = self.state.countdown_remaining.saturating_sub(1);
        result.push(GameEvent::CountdownTick(self.state.countdown_remaining));

        if self.state.countdown_remaining == 0 {
            info!("Countdown finished, round on");
            self.state.phase = Phase::Playing;
            result.push(GameEvent::RoundStarted);
        }

        result
    }

    /// Steer immediately; the next movement tick consumes the direction.
    pub fn change_direction(&mut self, requested: Direction) -> StepResult {
        let mut result = StepResult::default();
        if self.state.phase != Phase::Playing {
            return result;
        }

        let current = self.state.snake.direction;
        let next = change_direction(current, requested);
        if next != current {
            self.state.snake.direction = next;
            result.push(GameEvent::DirectionChanged(next));
        }

        result
    }

    /// Advance the snake one cell and resolve whatever it runs into
    pub fn movement_tick(&mut self) -> StepResult {
        let mut result = StepResult::default();
        if self.state.phase != Phase::Playing {
            return result;
        }

        let speed_before = self.state.speed_ms;
        let candidate = propose_next_head(&self.state.snake);

        match classify_collision(&self.grid, &self.state.snake, candidate) {
            Some(collision) => self.resolve_collision(collision, &mut result),
            None => self.resolve_move(candidate, &mut result),
        }

        self.note_speed_change(speed_before, &mut result);
        result
    }

    /// One second of play: timer, difficulty ramp and boost expiry
    pub fn clock_tick(&mut self) -> StepResult {
        let mut result = StepResult::default();
        if self.state.phase != Phase::Playing {
            return result;
        }

        let speed_before = self.state.speed_ms;
        self.state.timer_secs += 1;
        let timer = self.state.timer_secs;
        result.push(GameEvent::ClockTick(timer));

        let rules = self.config.speed.clone();
        if let Some(every) = rules.ramp_every_secs {
            if timer % every == 0 {
                self.tighten(rules.ramp_step, rules.floor_ms);
                result.push(GameEvent::SpeedRamp);
            }
        }

        if let Some(ends_at) = self.state.boost_ends_at {
            if timer > ends_at {
                info!("Time boost expired at {}s", timer);
                self.state.boost_ends_at = None;
                self.relax(rules.boost_restore_ms);
                result.push(GameEvent::BoostExpired);
            }
        }

        self.note_speed_change(speed_before, &mut result);
        result
    }

    /// Throw away the round and start a new one with the countdown.
    /// Accepted while playing or after game over.
    pub fn restart(&mut self) -> StepResult {
        let mut result = StepResult::default();
        if !matches!(self.state.phase, Phase::Playing | Phase::GameOver) {
            return result;
        }

        match new_round(&self.config, &self.grid, &mut self.rng) {
            Some((snake, items)) => {
                let name = self.state.player_name.take();
                self.state = fresh_state(&self.config, snake, items, Phase::Countdown, name);
                info!("Round restarted");
                result.push(GameEvent::Restarted);
            }
            None => self.end_on_full_board(&mut result),
        }

        result
    }

    fn enter_countdown(&mut self) {
        self.state.phase = Phase::Countdown;
        self.state.countdown_remaining = self.config.countdown_secs;
    }

    fn item_counts(&self) -> ItemCounts {
        ItemCounts {
            fruits: self.config.num_fruits,
            bombs: self.config.num_bombs,
            hearts: self.config.num_hearts,
        }
    }

    fn resolve_collision(&mut self, collision: CollisionType, result: &mut StepResult) {
        result.push(GameEvent::LifeLost(collision));

        if self.state.lives <= 1 {
            self.state.lives = 0;
            self.game_over(result);
            return;
        }

        self.state.lives -= 1;
        info!(
            "Lost a life to {:?}, {} left",
            collision, self.state.lives
        );

        let length = self.state.snake.len();
        let body = self.grid.random_initial_snake(&mut self.rng);
        let snake = Snake::padded(body, length, Direction::Right);

        match place_items(&self.grid, &snake.body, self.item_counts(), &mut self.rng) {
            Some(items) => {
                self.state.snake = snake;
                self.state.items = items;
                self.tighten(self.config.speed.collision_step, self.config.speed.floor_ms);
            }
            None => self.end_on_full_board(result),
        }
    }

    fn resolve_move(&mut self, head: Position, result: &mut StepResult) {
        let pickups = self.state.items.pickups_at(head);
        let rules = self.config.speed.clone();

        self.state.snake.advance(head, pickups.fruit.is_some());
        result.push(GameEvent::Moved);

        if let Some(index) = pickups.fruit {
            debug!("Fruit eaten at {:?}", head);
            result.push(GameEvent::AteFruit);
            if self.state.snake.fruits_eaten() % rules.fruit_every == 0 {
                self.tighten(rules.fruit_step, rules.floor_ms);
            }
            if !self.relocate(ItemKind::Fruit(index), result) {
                return;
            }
        }

        if let Some(index) = pickups.bomb {
            self.state.lives = self.state.lives.saturating_sub(1);
            debug!("Bomb hit at {:?}, {} lives left", head, self.state.lives);
            result.push(GameEvent::HitBomb);
            self.tighten(rules.bomb_step, rules.floor_ms);
            if self.state.lives == 0 {
                self.game_over(result);
                return;
            }
            if !self.relocate(ItemKind::Bomb(index), result) {
                return;
            }
        }

        if let Some(index) = pickups.heart {
            self.state.lives += 1;
            debug!("Heart collected at {:?}, {} lives", head, self.state.lives);
            result.push(GameEvent::GainedLife);
            if !self.relocate(ItemKind::Heart(index), result) {
                return;
            }
        }

        if pickups.booster {
            let ends_at = self.state.timer_secs + self.config.boost_duration_secs;
            info!("Time boost until {}s", ends_at);
            self.state.boost_ends_at = Some(ends_at);
            result.push(GameEvent::BoostStarted { ends_at });
            self.tighten(rules.boost_step, rules.boost_floor_ms);
            self.relocate(ItemKind::Booster, result);
        }
    }

    /// Move an eaten item; ends the round if the board has no room left
    fn relocate(&mut self, kind: ItemKind, result: &mut StepResult) -> bool {
        let placed = self.state.items.relocate(
            kind,
            &self.grid,
            &self.state.snake.body,
            &mut self.rng,
        );
        if placed.is_none() {
            self.end_on_full_board(result);
            return false;
        }
        true
    }

    /// Lower the interval by `step`, not below `floor`. Never raises it.
    fn tighten(&mut self, step: u64, floor: u64) {
        let speed = self.state.speed_ms;
        if speed > floor {
            self.state.speed_ms = speed.saturating_sub(step).max(floor);
        }
    }

    /// Raise the interval by `step`, capped at the initial speed
    fn relax(&mut self, step: u64) {
        let speed = self.state.speed_ms.saturating_add(step);
        self.state.speed_ms = speed.min(self.config.initial_speed_ms);
    }

    fn note_speed_change(&self, before: u64, result: &mut StepResult) {
        let after = self.state.speed_ms;
        if after != before {
            debug!("Speed {}ms -> {}ms", before, after);
            result.push(GameEvent::SpeedChanged {
                from: before,
                to: after,
            });
        }
    }

    fn end_on_full_board(&mut self, result: &mut StepResult) {
        warn!("No free cell left on the board, ending the round");
        result.push(GameEvent::BoardFull);
        self.game_over(result);
    }

    fn game_over(&mut self, result: &mut StepResult) {
        info!(
            "Game over after {}s with {} fruits",
            self.state.timer_secs,
            self.state.snake.fruits_eaten()
        );
        self.state.phase = Phase::GameOver;
        result.push(GameEvent::GameOver);
    }
}

/// Fresh length-2 snake and a full set of items around it
fn new_round(config: &GameConfig, grid: &Grid, rng: &mut StdRng) -> Option<(Snake, BoardItems)> {
    let body = grid.random_initial_snake(rng);
    let counts = ItemCounts {
        fruits: config.num_fruits,
        bombs: config.num_bombs,
        hearts: config.num_hearts,
    };
    let items = place_items(grid, &body, counts, rng)?;
    let snake = Snake {
        body,
        direction: Direction::Right,
    };
    Some((snake, items))
}

fn fresh_state(
    config: &GameConfig,
    snake: Snake,
    items: BoardItems,
    phase: Phase,
    player_name: Option<String>,
) -> GameState {
    GameState {
        snake,
        items,
        lives: config.initial_lives,
        speed_ms: config.initial_speed_ms,
        timer_secs: 0,
        boost_ends_at: None,
        phase,
        countdown_remaining: config.countdown_secs,
        player_name,
    }
}
