use std::{thread::sleep, time::{Duration, Instant}};

use crate::{Coords, TermInt};
use crate::term::TermManager;

use anyhow::{bail, Result};
use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use crossterm::style::Color;
use grid_snake::{Cell, Direction::{self, *}, SimulationConfig, SimulationState, Snapshot, TickResult};
use grid_snake::{FoodView, GameOverReason};
use log::info;

const POLL_INTERVAL_MS: u64 = 5;

const SNAKE_HEAD_CHAR: char = '@';
const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

const HEAD_COLOR: Color = Color::Rgb { r: 255, g: 0, b: 0 };
const BODY_COLOR: Color = Color::Rgb { r: 0, g: 0, b: 255 };

pub struct SnakeGame {
    config: SimulationConfig,
    paused: bool,
    term: TermManager,
    origin: Coords,
    board: Coords,
}

/// Simulation time. Stands still while the game is paused, so food does not
/// rot behind the pause screen.
struct PlayClock {
    elapsed: Duration,
    resumed: Option<Instant>,
}

impl SnakeGame {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let board = board_size(&config)?;
        Ok(SnakeGame { config, paused: false, term: TermManager::new()?, origin: (0, 0), board })
    }

    pub fn initialize(&mut self) -> Result<()> {
        let (w, h) = self.term.get_terminal_size();
        let (board_w, board_h) = self.board;

        // status line below the frame
        if board_w > w || board_h >= h {
            bail!(
                "a {}x{} grid needs a terminal of at least {}x{}, this one is {}x{}",
                self.config.grid_width, self.config.grid_height, board_w, u32::from(board_h) + 1, w, h
            );
        }

        self.origin = ((w - board_w) / 2, (h - board_h - 1) / 2);
        self.term.setup()?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore()?;
        Ok(())
    }

    /// Intro, then games until the player quits.
    pub fn run(&mut self) -> Result<()> {
        if !self.show_intro()? {
            return Ok(());
        }

        while self.play()? {}

        Ok(())
    }

    /// Returns false if the player asked to quit.
    pub fn show_intro(&mut self) -> Result<bool> {
        let lines = &[
            "Arrow keys or WASD to move",
            "Esc to pause",
            "Q or CTRL+C to quit",
            "",
            "Press any key to begin"
        ];

        self.term.show_message(lines)?;

        if is_quit(&self.term.read_key_blocking()?) {
            return Ok(false);
        }

        self.term.hide_message()?;
        Ok(true)
    }

    /// Plays one game. Returns whether the player wants another one.
    pub fn play(&mut self) -> Result<bool> {
        self.term.clear()?;
        self.term.draw_borders(self.origin, self.board)?;
        self.term.hide_message()?;
        self.paused = false;

        let mut clock = PlayClock::start();
        let mut sim = SimulationState::from_config(&self.config, clock.now())?;
        let mut dir_change: Option<Direction> = None;
        let mut last_step = clock.now();

        self.draw(&sim.snapshot(), false)?;

        loop {
            sleep(Duration::from_millis(POLL_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue()? {
                match &key_ev {
                    ev if is_quit(ev) => return Ok(false),
                    KeyEvent { code: KeyCode::Esc, modifiers: _ } => self.toggle_pause(&mut clock)?,
                    KeyEvent { code, modifiers: _ } => {
                        if let Some(dir) = key_direction(code) {
                            dir_change = Some(dir);
                        }
                    }
                }
            }

            if self.paused { continue; }

            let now = clock.now();
            if now - last_step < sim.tick_interval() { continue; }
            last_step = now;

            let result = sim.tick(dir_change.take(), now);
            let snapshot = sim.snapshot();

            match result {
                TickResult::Ok { .. } => self.draw(&snapshot, false)?,
                TickResult::GameOver { reason, score, .. } => {
                    self.draw(&snapshot, true)?;
                    self.game_over(Some(reason), score)?;
                    break;
                }
                TickResult::Won { score, .. } => {
                    self.draw(&snapshot, false)?;
                    self.game_over(None, score)?;
                    break;
                }
            }
        }

        Ok(!is_quit(&self.term.read_key_blocking()?))
    }

    ///////////////////////////////////////////////////////////////////////////

    fn game_over(&mut self, reason: Option<GameOverReason>, score: u32) -> Result<()> {
        let s = match reason {
            None => "You won!",
            Some(GameOverReason::SelfCollision) => "Game over! You bit yourself.",
            Some(GameOverReason::OutOfBounds) => "Game over! You hit the wall.",
        };
        info!("{} final score {}", s, score);

        self.term.show_message(&[
            s,
            &*format!("Score: {}", score),
            "",
            "Press any key to play again,",
            "or Q to quit."
        ])?;
        Ok(())
    }

    fn draw(&mut self, snapshot: &Snapshot, dead: bool) -> Result<()> {
        for y in 0..self.config.grid_height {
            for x in 0..self.config.grid_width {
                if let Some(pos) = self.screen_pos(Cell::new(x, y)) {
                    self.term.print_at(pos, ' ')?;
                }
            }
        }

        if let Some(FoodView { location, value }) = snapshot.food {
            if let Some(pos) = self.screen_pos(location) {
                self.term.print_colored_at(pos, FOOD_CHAR, food_color(value))?;
            }
        }

        // tail first so the head is drawn last
        for (i, cell) in snapshot.segments.iter().enumerate().rev() {
            let pos = match self.screen_pos(*cell) {
                Some(pos) => pos,
                None => continue,
            };

            if dead {
                self.term.print_colored_at(pos, DEAD_SNAKE_CHAR, HEAD_COLOR)?;
            } else if i == 0 {
                self.term.print_colored_at(pos, SNAKE_HEAD_CHAR, HEAD_COLOR)?;
            } else {
                self.term.print_colored_at(pos, SNAKE_BODY_CHAR, BODY_COLOR)?;
            }
        }

        let (board_w, board_h) = self.board;
        let status_y = self.origin.1 + board_h;
        let half = board_w / 2;
        self.term.print_str_at(
            (self.origin.0, status_y),
            &format!("{:<width$}", format!("Score: {}", snapshot.score), width = half as usize),
        )?;
        self.term.print_str_at(
            (self.origin.0 + half, status_y),
            &format!("{:<width$}", format!("Level: {}", snapshot.level), width = (board_w - half) as usize),
        )?;

        self.term.flush()?;
        Ok(())
    }

    // None for cells off the grid, such as a head that left it.
    fn screen_pos(&self, cell: Cell) -> Option<Coords> {
        let on_grid = (0..self.config.grid_width).contains(&cell.x)
            && (0..self.config.grid_height).contains(&cell.y);
        if !on_grid {
            return None;
        }

        let x = TermInt::try_from(cell.x).ok()?.checked_add(self.origin.0 + 1)?;
        let y = TermInt::try_from(cell.y).ok()?.checked_add(self.origin.1 + 1)?;
        Some((x, y))
    }

    fn toggle_pause(&mut self, clock: &mut PlayClock) -> Result<()> {
        if !self.paused {
            clock.pause();
            self.term.show_message(&["Paused", "Press Esc to resume", "or Q to quit"])?;
        } else {
            clock.resume();
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        Ok(())
    }
}

impl PlayClock {
    fn start() -> Self {
        PlayClock { elapsed: Duration::ZERO, resumed: Some(Instant::now()) }
    }

    fn now(&self) -> Duration {
        self.elapsed + self.resumed.map_or(Duration::ZERO, |t| t.elapsed())
    }

    fn pause(&mut self) {
        if let Some(t) = self.resumed.take() {
            self.elapsed += t.elapsed();
        }
    }

    fn resume(&mut self) {
        if self.resumed.is_none() {
            self.resumed = Some(Instant::now());
        }
    }
}

/// Frame size in terminal cells, border included.
fn board_size(config: &SimulationConfig) -> Result<Coords> {
    let framed = |cells: i32| TermInt::try_from(cells).ok().and_then(|n| n.checked_add(2));

    match (framed(config.grid_width), framed(config.grid_height)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => bail!(
            "a {}x{} grid is too large for a terminal",
            config.grid_width, config.grid_height
        ),
    }
}

fn key_direction(code: &KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Char('w') | KeyCode::Up => Some(Up),
        KeyCode::Char('a') | KeyCode::Left => Some(Left),
        KeyCode::Char('s') | KeyCode::Down => Some(Down),
        KeyCode::Char('d') | KeyCode::Right => Some(Right),
        _ => None,
    }
}

// green, silver and gold by weight
fn food_color(value: u32) -> Color {
    match value {
        1 => Color::Rgb { r: 0, g: 255, b: 0 },
        2 => Color::Rgb { r: 192, g: 192, b: 192 },
        _ => Color::Rgb { r: 255, g: 215, b: 0 },
    }
}

fn is_quit(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
        || matches!(ev.code, KeyCode::Char('q') | KeyCode::Char('Q'))
}
