use std::time::Duration;

use crate::error::ConfigError;
use crate::food::DEFAULT_LIFETIME;
use crate::grid::{Cell, Grid};
use crate::snake::Direction;

/// Ticks per second as a linear function of the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedFormula {
    pub base: u32,
    pub per_level: u32,
}

impl Default for SpeedFormula {
    fn default() -> Self {
        SpeedFormula { base: 5, per_level: 2 }
    }
}

impl SpeedFormula {
    pub fn ticks_per_second(&self, level: u32) -> u32 {
        self.per_level.saturating_mul(level).saturating_add(self.base)
    }

    /// Zero ticks per second is treated as one.
    pub fn tick_interval(&self, level: u32) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second(level).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub grid_width: i32,
    pub grid_height: i32,
    pub initial_length: usize,
    /// `None` starts the snake idle until the first direction arrives.
    pub initial_heading: Option<Direction>,
    pub food_lifetime: Duration,
    pub speed: SpeedFormula,
    /// Fixed seed for reproducible food placement.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            grid_width: 20,
            grid_height: 17,
            initial_length: 1,
            initial_heading: None,
            food_lifetime: DEFAULT_LIFETIME,
            speed: SpeedFormula::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(grid_width: i32, grid_height: i32) -> Self {
        SimulationConfig { grid_width, grid_height, ..Default::default() }
    }

    pub fn validate(&self) -> Result<Grid, ConfigError> {
        let grid = Grid::new(self.grid_width, self.grid_height)?;
        let length = self.initial_length;

        if length == 0 {
            return Err(ConfigError::EmptySnake);
        }

        if self.food_lifetime.is_zero() {
            return Err(ConfigError::InvalidLifetime);
        }

        if length > 1 {
            let heading = self.initial_heading.ok_or(ConfigError::MissingHeading)?;
            if length > room_behind(&grid, grid.center(), heading) {
                return Err(ConfigError::SnakeDoesNotFit { length, heading });
            }
        }

        if grid.area() <= length {
            return Err(ConfigError::NoRoomForFood { area: grid.area(), length });
        }

        Ok(grid)
    }
}

// Cells from `head` (inclusive) to the edge opposite `heading`.
fn room_behind(grid: &Grid, head: Cell, heading: Direction) -> usize {
    let room = match heading.opposite() {
        Direction::Left => head.x + 1,
        Direction::Right => grid.width() - head.x,
        Direction::Up => head.y + 1,
        Direction::Down => grid.height() - head.y,
    };
    room.max(0) as usize
}
