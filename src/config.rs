use std::fs;
use std::path::Path;

use ratatui::style::Color;
use ratatui::symbols::border;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::BoundaryMode;

/// Logical grid dimensions passed through the game as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Creates a square grid of `size` × `size` cells.
    #[must_use]
    pub fn square(size: u16) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::square(DEFAULT_GRID_SIZE)
    }
}

/// Side length of the default square board.
pub const DEFAULT_GRID_SIZE: u16 = 20;

/// Base tick interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 120;

/// Minimum tick interval in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 30;

/// Score needed per speed step.
pub const POINTS_PER_SPEED_STEP: u32 = 200;

/// Divisor applied to the tick interval at every speed step.
pub const SPEED_STEP_FACTOR: f64 = 1.2;

/// Points granted for ordinary food.
pub const FOOD_POINTS: u32 = 10;

/// Points granted for a power-up.
pub const POWER_UP_POINTS: u32 = 50;

/// Fraction of the current length added when a power-up is eaten.
pub const POWER_UP_GROWTH_FACTOR: f64 = 0.5;

/// How long a spawned power-up stays on the board.
pub const POWER_UP_LIFETIME_MS: u64 = 5_000;

/// Delay before the first power-up of a running stretch.
pub const POWER_UP_INITIAL_DELAY_MS: u64 = 2_000;

/// Lower bound of the delay between power-up spawns.
pub const POWER_UP_MIN_SPAWN_DELAY_MS: u64 = 3_000;

/// Upper bound of the delay between power-up spawns.
pub const POWER_UP_MAX_SPAWN_DELAY_MS: u64 = 6_000;

/// Random placement attempts before falling back to a full scan.
pub const SPAWN_ATTEMPTS: u32 = 100;

/// Timing of the power-up lifecycle, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTiming {
    pub initial_delay_ms: u64,
    pub min_spawn_delay_ms: u64,
    pub max_spawn_delay_ms: u64,
    pub lifetime_ms: u64,
}

impl Default for PowerUpTiming {
    fn default() -> Self {
        Self {
            initial_delay_ms: POWER_UP_INITIAL_DELAY_MS,
            min_spawn_delay_ms: POWER_UP_MIN_SPAWN_DELAY_MS,
            max_spawn_delay_ms: POWER_UP_MAX_SPAWN_DELAY_MS,
            lifetime_ms: POWER_UP_LIFETIME_MS,
        }
    }
}

/// Tick interval scaling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub base_interval_ms: u64,
    pub min_interval_ms: u64,
    pub points_per_step: u32,
    pub step_factor: f64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            min_interval_ms: MIN_TICK_INTERVAL_MS,
            points_per_step: POINTS_PER_SPEED_STEP,
            step_factor: SPEED_STEP_FACTOR,
        }
    }
}

/// Every tunable of the simulation engine.
///
/// Loaded from JSON with missing fields falling back to the defaults above, so
/// a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub grid: GridSize,
    pub boundary_mode: BoundaryMode,
    pub speed: SpeedConfig,
    pub food_points: u32,
    pub power_up_points: u32,
    pub power_up_growth_factor: f64,
    pub power_up: PowerUpTiming,
    pub spawn_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            boundary_mode: BoundaryMode::Walled,
            speed: SpeedConfig::default(),
            food_points: FOOD_POINTS,
            power_up_points: POWER_UP_POINTS,
            power_up_growth_factor: POWER_UP_GROWTH_FACTOR,
            power_up: PowerUpTiming::default(),
            spawn_attempts: SPAWN_ATTEMPTS,
        }
    }
}

impl EngineConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects combinations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::EmptyGrid);
        }

        if self.grid.total_cells() < 2 {
            return Err(ConfigError::GridTooSmall);
        }

        if self.speed.min_interval_ms == 0
            || self.speed.min_interval_ms > self.speed.base_interval_ms
        {
            return Err(ConfigError::InvalidSpeedFloor {
                floor_ms: self.speed.min_interval_ms,
                base_ms: self.speed.base_interval_ms,
            });
        }

        if self.speed.points_per_step == 0 || self.speed.step_factor <= 1.0 {
            return Err(ConfigError::InvalidSpeedStep);
        }

        if self.power_up.min_spawn_delay_ms > self.power_up.max_spawn_delay_ms {
            return Err(ConfigError::InvertedSpawnDelay {
                min_ms: self.power_up.min_spawn_delay_ms,
                max_ms: self.power_up.max_spawn_delay_ms,
            });
        }

        let growth_factor = self.power_up_growth_factor;
        if !growth_factor.is_finite() || growth_factor < 0.0 {
            return Err(ConfigError::InvalidGrowthFactor(growth_factor));
        }

        Ok(())
    }
}

/// A color theme applied to all visual elements.
#[derive(Debug)]
pub struct Theme {
    pub snake_head: Color,
    pub snake_body: Color,
    pub snake_tail: Color,
    pub food: Color,
    pub power_up: Color,
    pub border_fg: Color,
    pub border_bg: Color,
    pub hud_score: Color,
    pub hud_muted: Color,
    pub menu_title: Color,
}

/// Classic green-on-dark theme used by the terminal frontend.
pub const THEME_CLASSIC: Theme = Theme {
    snake_head: Color::White,
    snake_body: Color::Green,
    snake_tail: Color::DarkGray,
    food: Color::Red,
    power_up: Color::Yellow,
    border_fg: Color::White,
    border_bg: Color::DarkGray,
    hud_score: Color::Green,
    hud_muted: Color::DarkGray,
    menu_title: Color::Green,
};

/// Border used in wrap mode, where the edges are passable.
pub const BORDER_WRAP: border::Set = border::Set {
    top_left: "┌",
    top_right: "┐",
    bottom_left: "└",
    bottom_right: "┘",
    vertical_left: "┆",
    vertical_right: "┆",
    horizontal_top: "┄",
    horizontal_bottom: "┄",
};

/// Solid border used in walled mode.
pub const BORDER_WALLED: border::Set = border::THICK;

pub const GLYPH_SNAKE_HEAD: &str = "█";
pub const GLYPH_SNAKE_BODY: &str = "▓";
pub const GLYPH_SNAKE_TAIL: &str = "▒";
pub const GLYPH_FOOD: &str = "●";
pub const GLYPH_POWER_UP: &str = "★";
