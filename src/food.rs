use std::ops::RangeInclusive;
use std::time::Duration;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::FoodPlacementExhausted;
use crate::grid::{Cell, Grid};

pub const FOOD_VALUES: RangeInclusive<u32> = 1..=3;
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(5);

// Random probes before falling back to enumerating the free cells.
const SAMPLE_ATTEMPTS: usize = 64;

/// A single weighted, time-limited item. Times are offsets from the start of
/// the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    location: Cell,
    value: u32,
    created_at: Duration,
    lifetime: Duration,
}

impl Food {
    pub fn new(location: Cell, value: u32, created_at: Duration, lifetime: Duration) -> Self {
        Food { location, value, created_at, lifetime }
    }

    /// Places fresh food on a uniformly random cell of `grid` that is not in
    /// `excluded`, with a uniformly random value.
    pub fn spawn<R: Rng + ?Sized>(
        excluded: &[Cell],
        grid: &Grid,
        now: Duration,
        lifetime: Duration,
        rng: &mut R,
    ) -> Result<Self, FoodPlacementExhausted> {
        let location = match free_cell(excluded, grid, rng) {
            Some(cell) => cell,
            None => return Err(FoodPlacementExhausted::from(grid)),
        };
        let value = rng.gen_range(FOOD_VALUES);

        debug!("food worth {} spawned at {}", value, location);
        Ok(Food::new(location, value, now, lifetime))
    }

    pub fn location(&self) -> Cell {
        self.location
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn created_at(&self) -> Duration {
        self.created_at
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn is_expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.created_at) > self.lifetime
    }

    pub fn matches(&self, cell: Cell) -> bool {
        self.location == cell
    }
}

fn free_cell<R: Rng + ?Sized>(excluded: &[Cell], grid: &Grid, rng: &mut R) -> Option<Cell> {
    for _ in 0..SAMPLE_ATTEMPTS {
        let cell = grid.random_cell(rng);
        if !excluded.contains(&cell) {
            return Some(cell);
        }
    }

    let choices: Vec<Cell> = grid.cells().filter(|cell| !excluded.contains(cell)).collect();
    choices.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn expires_strictly_after_lifetime() {
        let food = Food::new(Cell::new(1, 1), 2, secs(10), DEFAULT_LIFETIME);

        assert!(!food.is_expired(secs(10)));
        assert!(!food.is_expired(secs(15)));
        assert!(food.is_expired(secs(15) + Duration::from_millis(1)));
    }

    #[test]
    fn clock_before_creation_is_not_expired() {
        let food = Food::new(Cell::new(1, 1), 2, secs(10), DEFAULT_LIFETIME);
        assert!(!food.is_expired(secs(3)));
    }

    #[test]
    fn matches_only_its_location() {
        let food = Food::new(Cell::new(3, 2), 1, secs(0), DEFAULT_LIFETIME);

        assert!(food.matches(Cell::new(3, 2)));
        assert!(!food.matches(Cell::new(2, 3)));
    }

    #[test]
    fn spawn_finds_the_last_free_cell() {
        let grid = Grid::new(3, 3).unwrap();
        let free = Cell::new(2, 1);
        let excluded: Vec<Cell> = grid.cells().filter(|c| *c != free).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let food = Food::spawn(&excluded, &grid, secs(4), DEFAULT_LIFETIME, &mut rng).unwrap();
        assert_eq!(food.location(), free);
        assert_eq!(food.created_at(), secs(4));
    }

    #[test]
    fn spawn_reports_a_full_grid() {
        let grid = Grid::new(2, 2).unwrap();
        let excluded: Vec<Cell> = grid.cells().collect();
        let mut rng = StdRng::seed_from_u64(1);

        let err = Food::spawn(&excluded, &grid, secs(0), DEFAULT_LIFETIME, &mut rng).unwrap_err();
        assert_eq!(err, FoodPlacementExhausted { width: 2, height: 2 });
    }

    #[test]
    fn spawn_samples_every_value() {
        let grid = Grid::new(5, 5).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        let mut seen = [false; 3];

        for _ in 0..200 {
            let food = Food::spawn(&[], &grid, secs(0), DEFAULT_LIFETIME, &mut rng).unwrap();
            assert!(FOOD_VALUES.contains(&food.value()));
            seen[food.value() as usize - 1] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    proptest! {
        #[test]
        fn spawn_never_lands_on_excluded_cells(seed in any::<u64>(), taken in 0usize..24) {
            let grid = Grid::new(5, 5).unwrap();
            let excluded: Vec<Cell> = grid.cells().take(taken).collect();
            let mut rng = StdRng::seed_from_u64(seed);

            let food = Food::spawn(&excluded, &grid, secs(0), DEFAULT_LIFETIME, &mut rng).unwrap();
            prop_assert!(grid.contains(food.location()));
            prop_assert!(!excluded.contains(&food.location()));
        }
    }
}
