mod game;
mod term;

use std::{fs::File, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use grid_snake::{Direction, SimulationConfig, SpeedFormula};
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

pub type TermInt = u16;
pub type Coords = (u16, u16);

#[derive(Parser)]
#[command(name = "grid-snake")]
#[command(version, about = "Snake on a fixed grid, in the terminal")]
struct Cli {
    /// Grid width in cells
    #[arg(long, default_value_t = 20)]
    width: i32,

    /// Grid height in cells
    #[arg(long, default_value_t = 17)]
    height: i32,

    /// Starting snake length; longer snakes start moving right
    #[arg(long, default_value_t = 1)]
    length: usize,

    /// Seconds before uneaten food moves elsewhere
    #[arg(long, default_value_t = 5)]
    lifetime_secs: u64,

    /// Ticks per second at level 0
    #[arg(long, default_value_t = 5)]
    base_speed: u32,

    /// Extra ticks per second for every level
    #[arg(long, default_value_t = 2)]
    speed_per_level: u32,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// The terminal is taken over by the game, so logs go here
    #[arg(long, default_value = "grid-snake.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

impl Cli {
    fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            grid_width: self.width,
            grid_height: self.height,
            initial_length: self.length,
            initial_heading: if self.length > 1 { Some(Direction::Right) } else { None },
            food_lifetime: Duration::from_secs(self.lifetime_secs),
            speed: SpeedFormula { base: self.base_speed, per_level: self.speed_per_level },
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("cannot create log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)?;

    let config = cli.simulation_config();
    config.validate().context("invalid game settings")?;
    info!("starting grid-snake with {:?}", config);

    let mut game = game::SnakeGame::new(config)?;
    game.initialize()?;

    // The terminal is restored even when the game loop fails, and the game
    // loop's error wins over a failed restore
    let outcome = game.run();
    let restored = game.restore();
    outcome?;
    restored
}
