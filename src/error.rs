use thiserror::Error;

use crate::grid::{Cell, Grid};
use crate::snake::Direction;

/// Rejected construction parameters. The simulation never starts with these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid must be at least 1x1 cells, got {width}x{height}")]
    InvalidGrid { width: i32, height: i32 },

    #[error("snake needs at least one segment")]
    EmptySnake,

    #[error("a snake of length {length} heading {heading:?} does not fit behind the grid centre")]
    SnakeDoesNotFit { length: usize, heading: Direction },

    #[error("a snake longer than one segment needs an initial heading")]
    MissingHeading,

    #[error("grid of {area} cells leaves no room for food next to a snake of length {length}")]
    NoRoomForFood { area: usize, length: usize },

    #[error("food value {0} is outside 1..=3")]
    InvalidFoodValue(u32),

    #[error("food lifetime must be non-zero")]
    InvalidLifetime,

    #[error("cell {0} lies outside the grid")]
    OutOfGrid(Cell),

    #[error("food at {0} overlaps the snake")]
    FoodOverlapsSnake(Cell),
}

/// Every cell of the grid is taken by the snake, so food has nowhere to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no free cell left for food on a {width}x{height} grid")]
pub struct FoodPlacementExhausted {
    pub width: i32,
    pub height: i32,
}

impl From<&Grid> for FoodPlacementExhausted {
    fn from(grid: &Grid) -> Self {
        FoodPlacementExhausted { width: grid.width(), height: grid.height() }
    }
}

/// A steering request that would turn the snake straight back into itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot reverse from {heading:?} to {requested:?}")]
pub struct InvalidDirection {
    pub heading: Direction,
    pub requested: Direction,
}
