//! Grid snake simulation: a tick-driven engine with walled or wrapping
//! boundaries, timed power-ups and score-driven speed, plus the terminal
//! frontend that drives it.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod geometry;
pub mod input;
pub mod powerup;
pub mod renderer;
pub mod runtime;
pub mod score;
pub mod snake;
pub mod spawn;
pub mod speed;
pub mod terminal;
pub mod ui;
