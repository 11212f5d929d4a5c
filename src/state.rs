use std::time::Duration;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{SimulationConfig, SpeedFormula};
use crate::error::{ConfigError, InvalidDirection};
use crate::food::{Food, FOOD_VALUES};
use crate::grid::{Cell, Grid};
use crate::snake::{Direction, MoveOutcome, Snake};

pub const POINTS_PER_LEVEL: u32 = 3;

pub fn level_for(score: u32) -> u32 {
    score / POINTS_PER_LEVEL
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameOverReason {
    SelfCollision,
    OutOfBounds,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Running,
    GameOver(GameOverReason),
    /// The snake fills the grid and no food can be placed.
    Won,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickResult {
    Ok { score: u32, level: u32, eaten: Option<u32> },
    GameOver { reason: GameOverReason, score: u32, level: u32 },
    Won { score: u32, level: u32 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FoodView {
    pub location: Cell,
    pub value: u32,
}

/// Owned copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub segments: Vec<Cell>,
    pub food: Option<FoodView>,
    pub score: u32,
    pub level: u32,
    pub status: Status,
}

/// One game: the snake, its food, and the score, advanced one tick at a time.
///
/// Time is passed in as an offset from the start of the game, and food
/// placement draws from the injected rng, so a given seed and input sequence
/// always plays out the same way.
pub struct SimulationState<R = StdRng> {
    grid: Grid,
    snake: Snake,
    food: Food,
    heading: Option<Direction>,
    score: u32,
    level: u32,
    status: Status,
    food_lifetime: Duration,
    speed: SpeedFormula,
    rng: R,
}

impl SimulationState<StdRng> {
    pub fn from_config(config: &SimulationConfig, now: Duration) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SimulationState::new(config, rng, now)
    }
}

impl<R: Rng> SimulationState<R> {
    pub fn new(config: &SimulationConfig, mut rng: R, now: Duration) -> Result<Self, ConfigError> {
        let grid = config.validate()?;
        let snake = Snake::new(
            grid.center(),
            config.initial_length,
            config.initial_heading.unwrap_or(Direction::Right),
        );
        let food = Food::spawn(snake.body(), &grid, now, config.food_lifetime, &mut rng)
            .map_err(|_| ConfigError::NoRoomForFood { area: grid.area(), length: snake.len() })?;

        info!("new {}x{} game, snake at {}", grid.width(), grid.height(), snake.head());
        Ok(SimulationState {
            grid,
            snake,
            food,
            heading: config.initial_heading,
            score: 0,
            level: 0,
            status: Status::Running,
            food_lifetime: config.food_lifetime,
            speed: config.speed,
            rng,
        })
    }

    /// Starts from an explicit arrangement. Respawned food keeps the lifetime
    /// of `food`.
    pub fn from_parts(
        grid: Grid,
        snake: Snake,
        food: Food,
        heading: Option<Direction>,
        rng: R,
    ) -> Result<Self, ConfigError> {
        if let Some(cell) = snake.body().iter().find(|cell| !grid.contains(**cell)) {
            return Err(ConfigError::OutOfGrid(*cell));
        }
        if !grid.contains(food.location()) {
            return Err(ConfigError::OutOfGrid(food.location()));
        }
        if snake.occupies(food.location()) {
            return Err(ConfigError::FoodOverlapsSnake(food.location()));
        }
        if !FOOD_VALUES.contains(&food.value()) {
            return Err(ConfigError::InvalidFoodValue(food.value()));
        }
        if food.lifetime().is_zero() {
            return Err(ConfigError::InvalidLifetime);
        }
        if heading.is_none() && snake.len() > 1 {
            return Err(ConfigError::MissingHeading);
        }

        Ok(SimulationState {
            grid,
            snake,
            food_lifetime: food.lifetime(),
            food,
            heading,
            score: 0,
            level: 0,
            status: Status::Running,
            speed: SpeedFormula::default(),
            rng,
        })
    }

    /// Turns towards `direction` unless that is a straight reversal.
    pub fn steer(&mut self, direction: Direction) -> Result<(), InvalidDirection> {
        match self.heading {
            Some(heading) if heading.is_opposite(direction) => {
                Err(InvalidDirection { heading, requested: direction })
            }
            _ => {
                self.heading = Some(direction);
                Ok(())
            }
        }
    }

    /// Advances the game by one step. Once the game has ended this changes
    /// nothing and repeats the final result.
    pub fn tick(&mut self, requested: Option<Direction>, now: Duration) -> TickResult {
        if self.is_terminal() {
            trace!("tick ignored, game already ended: {:?}", self.status);
            return self.result(None);
        }

        if let Some(direction) = requested {
            if let Err(err) = self.steer(direction) {
                trace!("{}", err);
            }
        }

        if self.food.is_expired(now) {
            debug!("food at {} expired", self.food.location());
            if !self.respawn_food(now) {
                return self.result(None);
            }
        }

        let (dx, dy) = self.heading.map_or((0, 0), Direction::delta);
        let reason = match self.snake.move_step(dx, dy, &self.grid) {
            MoveOutcome::Continuing => None,
            MoveOutcome::SelfCollision => Some(GameOverReason::SelfCollision),
            MoveOutcome::OutOfBounds => Some(GameOverReason::OutOfBounds),
        };
        if let Some(reason) = reason {
            self.status = Status::GameOver(reason);
            info!("game over ({:?}) at {} with score {}", reason, self.snake.head(), self.score);
            return self.result(None);
        }

        if !self.food.matches(self.snake.head()) {
            return self.result(None);
        }

        let value = self.food.value();
        self.score += value;
        self.level = level_for(self.score);
        debug!("ate food worth {}, score {} level {}", value, self.score, self.level);

        self.respawn_food(now);
        self.snake.grow();
        self.result(Some(value))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &Food {
        &self.food
    }

    pub fn heading(&self) -> Option<Direction> {
        self.heading
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status != Status::Running
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.speed.ticks_per_second(self.level)
    }

    pub fn tick_interval(&self) -> Duration {
        self.speed.tick_interval(self.level)
    }

    /// Food is left out once the game is won, since the last item was eaten
    /// and never replaced.
    pub fn snapshot(&self) -> Snapshot {
        let food = match self.status {
            Status::Won => None,
            _ => Some(FoodView { location: self.food.location(), value: self.food.value() }),
        };

        Snapshot {
            segments: self.snake.body().to_vec(),
            food,
            score: self.score,
            level: self.level,
            status: self.status,
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    // Returns false, and ends the game as won, when the snake covers the grid.
    fn respawn_food(&mut self, now: Duration) -> bool {
        match Food::spawn(self.snake.body(), &self.grid, now, self.food_lifetime, &mut self.rng) {
            Ok(food) => {
                self.food = food;
                true
            }
            Err(err) => {
                info!("{}, game won with score {}", err, self.score);
                self.status = Status::Won;
                false
            }
        }
    }

    fn result(&self, eaten: Option<u32>) -> TickResult {
        let (score, level) = (self.score, self.level);

        match self.status {
            Status::Running => TickResult::Ok { score, level, eaten },
            Status::GameOver(reason) => TickResult::GameOver { reason, score, level },
            Status::Won => TickResult::Won { score, level },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn state(
        snake: Vec<(i32, i32)>,
        food: (i32, i32),
        value: u32,
        heading: Option<Direction>,
    ) -> SimulationState {
        let grid = Grid::new(5, 5).unwrap();
        let snake = Snake::from_segments(snake.into_iter().map(Cell::from).collect()).unwrap();
        let food = Food::new(Cell::from(food), value, secs(0), secs(5));

        SimulationState::from_parts(grid, snake, food, heading, StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn level_is_score_divided_by_three() {
        let expected = [(0, 0), (1, 0), (2, 0), (3, 1), (4, 1), (5, 1), (6, 2), (8, 2), (9, 3)];

        for (score, level) in expected.iter() {
            assert_eq!(level_for(*score), *level, "score {}", score);
        }
    }

    #[test]
    fn reversal_is_ignored() {
        let mut sim = state(vec![(2, 2)], (4, 4), 1, Some(Direction::Right));

        assert_eq!(
            sim.steer(Direction::Left),
            Err(InvalidDirection { heading: Direction::Right, requested: Direction::Left })
        );
        assert_eq!(sim.heading(), Some(Direction::Right));

        sim.tick(Some(Direction::Left), secs(0));
        assert_eq!(sim.heading(), Some(Direction::Right));
        assert_eq!(sim.snake().head(), Cell::new(3, 2));
    }

    #[test]
    fn idle_snake_accepts_any_first_direction() {
        let mut sim = state(vec![(2, 2)], (4, 4), 1, None);

        assert_eq!(sim.tick(None, secs(0)), TickResult::Ok { score: 0, level: 0, eaten: None });
        assert_eq!(sim.snake().head(), Cell::new(2, 2));

        sim.tick(Some(Direction::Up), secs(0));
        assert_eq!(sim.snake().head(), Cell::new(2, 1));
    }

    #[test]
    fn expired_food_is_replaced_before_the_move() {
        let mut sim = state(vec![(2, 2)], (3, 2), 1, None);

        let result = sim.tick(None, secs(6));
        assert_eq!(result, TickResult::Ok { score: 0, level: 0, eaten: None });
        assert_eq!(sim.food().created_at(), secs(6));
        assert!(!sim.snake().occupies(sim.food().location()));
    }

    #[test]
    fn fresh_food_is_not_replaced() {
        let mut sim = state(vec![(0, 0)], (4, 4), 2, Some(Direction::Down));
        let old = *sim.food();

        sim.tick(None, secs(5));
        assert_eq!(*sim.food(), old);
    }

    #[test]
    fn eating_scores_and_levels() {
        let mut sim = state(vec![(0, 2)], (1, 2), 3, Some(Direction::Right));

        let result = sim.tick(None, secs(1));
        assert_eq!(result, TickResult::Ok { score: 3, level: 1, eaten: Some(3) });
        assert_eq!(sim.snake().len(), 2);
        assert_eq!(sim.ticks_per_second(), 7);
    }

    #[test]
    fn filling_the_grid_wins() {
        // tail still doubled from the previous meal, so nothing is vacated
        let grid = Grid::new(2, 1).unwrap();
        let snake = Snake::from_segments(vec![Cell::new(0, 0), Cell::new(0, 0)]).unwrap();
        let food = Food::new(Cell::new(1, 0), 2, secs(0), secs(5));
        let mut sim = SimulationState::from_parts(
            grid,
            snake,
            food,
            Some(Direction::Right),
            StdRng::seed_from_u64(0),
        )
        .unwrap();

        assert_eq!(sim.tick(None, secs(1)), TickResult::Won { score: 2, level: 0 });
        assert_eq!(sim.status(), Status::Won);
        assert_eq!(sim.snake().len(), 3);
        assert_eq!(sim.snapshot().food, None);
        assert_eq!(sim.tick(Some(Direction::Down), secs(2)), TickResult::Won { score: 2, level: 0 });
        assert_eq!(sim.snake().head(), Cell::new(1, 0));
    }

    #[test]
    fn from_parts_rejects_inconsistent_state() {
        let grid = Grid::new(3, 3).unwrap();
        let food = Food::new(Cell::new(1, 1), 1, secs(0), secs(5));
        let rng = || StdRng::seed_from_u64(0);

        let overlapping = Snake::from_segments(vec![Cell::new(1, 1)]).unwrap();
        assert_eq!(
            SimulationState::from_parts(grid, overlapping, food, None, rng()).err(),
            Some(ConfigError::FoodOverlapsSnake(Cell::new(1, 1)))
        );

        let outside = Snake::from_segments(vec![Cell::new(3, 0)]).unwrap();
        assert_eq!(
            SimulationState::from_parts(grid, outside, food, None, rng()).err(),
            Some(ConfigError::OutOfGrid(Cell::new(3, 0)))
        );
    }

    #[test]
    fn from_parts_needs_heading_for_long_snake() {
        let grid = Grid::new(5, 5).unwrap();
        let snake = Snake::from_segments(vec![Cell::new(2, 2), Cell::new(1, 2)]).unwrap();
        let food = Food::new(Cell::new(4, 4), 1, secs(0), secs(5));

        assert_eq!(
            SimulationState::from_parts(grid, snake.clone(), food, None, StdRng::seed_from_u64(0)).err(),
            Some(ConfigError::MissingHeading)
        );
        assert!(SimulationState::from_parts(
            grid,
            snake,
            food,
            Some(Direction::Up),
            StdRng::seed_from_u64(0)
        )
        .is_ok());
    }

    #[test]
    fn from_parts_rejects_food_values_outside_range() {
        let grid = Grid::new(5, 5).unwrap();
        let snake = Snake::from_segments(vec![Cell::new(2, 2)]).unwrap();

        for value in [0, 4, 7] {
            let food = Food::new(Cell::new(4, 4), value, secs(0), secs(5));
            assert_eq!(
                SimulationState::from_parts(grid, snake.clone(), food, None, StdRng::seed_from_u64(0))
                    .err(),
                Some(ConfigError::InvalidFoodValue(value))
            );
        }

        let food = Food::new(Cell::new(4, 4), 3, secs(0), secs(5));
        assert!(SimulationState::from_parts(grid, snake, food, None, StdRng::seed_from_u64(0)).is_ok());
    }

    #[test]
    fn from_config_places_snake_at_centre() {
        let mut config = SimulationConfig::default();
        config.seed = Some(11);
        let sim = SimulationState::from_config(&config, secs(0)).unwrap();

        assert_eq!(sim.snake().body(), &[Cell::new(10, 8)]);
        assert!(!sim.snake().occupies(sim.food().location()));
        assert_eq!(sim.status(), Status::Running);
        assert_eq!(sim.tick_interval(), Duration::from_millis(200));
    }

    #[test]
    fn same_seed_same_food() {
        let mut config = SimulationConfig::default();
        config.seed = Some(42);

        let a = SimulationState::from_config(&config, secs(0)).unwrap();
        let b = SimulationState::from_config(&config, secs(0)).unwrap();
        assert_eq!(a.food(), b.food());
    }
}
