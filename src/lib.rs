//! Simulation core for grid snake: movement, collisions, food and scoring,
//! with no I/O. Time and randomness are supplied by the caller.

pub mod config;
pub mod error;
pub mod food;
pub mod grid;
pub mod snake;
pub mod state;

pub use config::{SimulationConfig, SpeedFormula};
pub use error::{ConfigError, FoodPlacementExhausted, InvalidDirection};
pub use food::Food;
pub use grid::{Cell, Grid};
pub use snake::{Direction, MoveOutcome, Snake};
pub use state::{FoodView, GameOverReason, SimulationState, Snapshot, Status, TickResult};
