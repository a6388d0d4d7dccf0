//! A terminal maze game: carve or load a maze, then walk a token to the goal.

pub mod canvas;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod input;
pub mod logging;
pub mod maze;
pub mod screen;
pub mod session;
