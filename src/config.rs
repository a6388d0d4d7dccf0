use crate::maze::{Grid, MazeSource, Pos};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

const DEFAULT_WIDTH: usize = 31;
const DEFAULT_HEIGHT: usize = 21;
// 5 is the smallest side that carves two lattice cells from (1, 1)
const MIN_SIDE: usize = 5;
// keeps `side * 2` columns and `side + 2` rows inside a u16 terminal
const MAX_SIDE: usize = 1024;
const DEFAULT_FPS: u64 = 60;
const MAX_FPS: u64 = 1000;
const DEFAULT_TILE_SIZE: u32 = 40;
const MAX_TILE_SIZE: u32 = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MazeMode {
    Generated,
    Classic,
}

impl FromStr for MazeMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generated" | "random" => Ok(MazeMode::Generated),
            "classic" | "literal" => Ok(MazeMode::Classic),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub mode: MazeMode,
    pub seed: Option<u64>,
    pub fps: u64,
    pub tile_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            mode: MazeMode::Generated,
            seed: None,
            fps: DEFAULT_FPS,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; bad values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Settings::default();
        let side = |v: &usize| (MIN_SIDE..=MAX_SIDE).contains(v);
        Settings {
            width: read(&lookup, "MAZE_WIDTH", side).unwrap_or(defaults.width),
            height: read(&lookup, "MAZE_HEIGHT", side).unwrap_or(defaults.height),
            mode: read(&lookup, "MAZE_MODE", |_: &MazeMode| true).unwrap_or(defaults.mode),
            seed: read(&lookup, "MAZE_SEED", |_: &u64| true),
            fps: read(&lookup, "MAZE_FPS", |v: &u64| (1..=MAX_FPS).contains(v))
                .unwrap_or(defaults.fps),
            tile_size: read(&lookup, "MAZE_TILE", |v: &u32| (1..=MAX_TILE_SIZE).contains(v))
                .unwrap_or(defaults.tile_size),
        }
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.fps.max(1))
    }

    pub fn maze_source(&self) -> MazeSource {
        match self.mode {
            MazeMode::Generated => MazeSource::Generated {
                width: self.width,
                height: self.height,
                start: Pos::new(1, 1),
            },
            MazeMode::Classic => MazeSource::Literal(Grid::classic()),
        }
    }
}

fn read<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    valid: impl Fn(&T) -> bool,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => Some(value),
        _ => {
            warn!(key, value = %raw, "ignoring invalid setting");
            None
        }
    }
}
