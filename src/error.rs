use std::io;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze literal has no rows")]
    EmptyGrid,
    #[error("maze literal row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("maze literal cell ({col}, {row}) is {value}, expected 0 (path) or 1 (wall)")]
    InvalidCell { row: usize, col: usize, value: u8 },
    #[error("maze dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: usize, height: usize },
    #[error("carving start ({x}, {y}) lies outside a {width}x{height} maze")]
    StartOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("({x}, {y}) is not a path cell")]
    NotPath { x: usize, y: usize },
    #[error("goal ({x}, {y}) is the start cell")]
    GoalOnStart { x: usize, y: usize },
    #[error("maze needs at least two path cells, found {found}")]
    TooFewPathCells { found: usize },
    #[error("maze has no path cells")]
    NoPathCells,
    #[error("no path cell found after {attempts} samples")]
    SamplingExhausted { attempts: usize },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid maze: {0}")]
    Maze(#[from] MazeError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}
