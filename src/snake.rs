use crate::error::ConfigError;
use crate::grid::{Cell, Grid};
use Direction::*;
use MoveOutcome::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Continuing,
    SelfCollision,
    OutOfBounds,
}

/// Ordered segments, head first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Cell>,
}

impl Snake {
    /// Straight snake with `length` segments trailing behind `head`, opposite
    /// to `direction`.
    pub fn new(head: Cell, length: usize, direction: Direction) -> Self {
        let (dx, dy) = direction.opposite().delta();

        let body = (0..length.max(1) as i32)
            .map(|i| head.offset(dx * i, dy * i))
            .collect();
        Snake { body }
    }

    pub fn from_segments(body: Vec<Cell>) -> Result<Self, ConfigError> {
        if body.is_empty() {
            return Err(ConfigError::EmptySnake);
        }

        Ok(Snake { body })
    }

    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Every segment takes its predecessor's previous cell, then the head
    /// advances by `(dx, dy)`. The body is updated even when the outcome is
    /// fatal.
    pub fn move_step(&mut self, dx: i32, dy: i32, grid: &Grid) -> MoveOutcome {
        for idx in (1..self.body.len()).rev() {
            self.body[idx] = self.body[idx - 1];
        }

        let head = self.body[0].offset(dx, dy);
        self.body[0] = head;

        if self.body[1..].iter().rev().any(|segment| *segment == head) {
            return SelfCollision;
        }

        if !grid.contains(head) {
            return OutOfBounds;
        }

        Continuing
    }

    /// Duplicates the tail. The copy separates on the next move, when the old
    /// tail moves up and the new one stays put.
    pub fn grow(&mut self) {
        let tail = self.tail();
        self.body.push(tail);
    }
}
