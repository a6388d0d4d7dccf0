use crate::error::MazeError;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use tracing::debug;

const MIN_SAMPLE_ATTEMPTS: usize = 1024;
const SAMPLES_PER_CELL: usize = 64;

/// The maze from the original browser build. 0 is path, 1 is wall.
pub const CLASSIC: [[u8; 13]; 10] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 0, 0, 0, 1, 0, 1, 1, 1, 0, 1],
    [1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 0, 0, 0, 0, 0, 1, 1, 1, 0, 1],
    [1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 0, 0, 1],
    [1, 0, 1, 0, 1, 0, 0, 0, 1, 1, 1, 0, 1],
    [1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Path,
    Wall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Offset by a signed delta, `None` if either coordinate would go negative.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Pos> {
        Some(Pos {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn from_delta(dx: isize, dy: isize) -> Option<Dir> {
        match (dx, dy) {
            (0, -1) => Some(Dir::Up),
            (0, 1) => Some(Dir::Down),
            (-1, 0) => Some(Dir::Left),
            (1, 0) => Some(Dir::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Vec<Tile>>,
    path_count: usize,
}

impl Grid {
    fn from_tiles(tiles: Vec<Vec<Tile>>) -> Self {
        let height = tiles.len();
        let width = tiles.first().map_or(0, |row| row.len());
        let path_count = tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&tile| tile == Tile::Path)
            .count();
        Self {
            width,
            height,
            tiles,
            path_count,
        }
    }

    /// Connectivity is not checked; see [`Grid::is_connected`].
    pub fn from_literal<R: AsRef<[u8]>>(rows: &[R]) -> Result<Grid, MazeError> {
        let expected = match rows.first() {
            Some(row) if !row.as_ref().is_empty() => row.as_ref().len(),
            _ => return Err(MazeError::EmptyGrid),
        };
        let mut tiles = Vec::with_capacity(rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != expected {
                return Err(MazeError::RaggedRow {
                    row: y,
                    expected,
                    found: row.len(),
                });
            }
            let mut line = Vec::with_capacity(expected);
            for (x, &value) in row.iter().enumerate() {
                line.push(match value {
                    0 => Tile::Path,
                    1 => Tile::Wall,
                    _ => {
                        return Err(MazeError::InvalidCell {
                            row: y,
                            col: x,
                            value,
                        })
                    }
                });
            }
            tiles.push(line);
        }
        Ok(Grid::from_tiles(tiles))
    }

    pub fn classic() -> Grid {
        let tiles = CLASSIC
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&v| if v == 0 { Tile::Path } else { Tile::Wall })
                    .collect()
            })
            .collect();
        Grid::from_tiles(tiles)
    }

    /// Randomized depth-first carving. Only cells with the parity of `start`
    /// are visited, so an even `width - start.x` leaves the last column wall
    /// (likewise for rows).
    pub fn generate(
        width: usize,
        height: usize,
        start: Pos,
        rng: &mut impl Rng,
    ) -> Result<Grid, MazeError> {
        if width == 0 || height == 0 {
            return Err(MazeError::ZeroDimension { width, height });
        }
        if start.x >= width || start.y >= height {
            return Err(MazeError::StartOutOfBounds {
                x: start.x,
                y: start.y,
                width,
                height,
            });
        }

        let mut tiles = vec![vec![Tile::Wall; width]; height];
        tiles[start.y][start.x] = Tile::Path;
        let mut stack = vec![CarveFrame::new(start, rng)];
        let mut deepest = 1;

        while let Some(frame) = stack.last_mut() {
            let mut advanced = None;
            while let Some(dir) = frame.next_dir() {
                let Some((between, target)) = two_steps(frame.pos, dir, width, height) else {
                    continue;
                };
                if tiles[target.y][target.x] == Tile::Wall {
                    tiles[between.y][between.x] = Tile::Path;
                    tiles[target.y][target.x] = Tile::Path;
                    advanced = Some(target);
                    break;
                }
            }
            match advanced {
                Some(pos) => {
                    stack.push(CarveFrame::new(pos, rng));
                    deepest = deepest.max(stack.len());
                }
                None => {
                    stack.pop();
                }
            }
        }

        let grid = Grid::from_tiles(tiles);
        debug!(
            width,
            height,
            path_cells = grid.path_count,
            max_depth = deepest,
            "carved maze"
        );
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn path_count(&self) -> usize {
        self.path_count
    }

    pub fn tile(&self, pos: Pos) -> Option<Tile> {
        self.tiles.get(pos.y)?.get(pos.x).copied()
    }

    /// Signed lookup; anything outside the grid is not a path.
    pub fn is_path(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.tile(Pos::new(x as usize, y as usize)) == Some(Tile::Path)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.iter().map(|row| row.as_slice())
    }

    pub fn path_cells(&self) -> Vec<Pos> {
        let mut cells = Vec::with_capacity(self.path_count);
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if *tile == Tile::Path {
                    cells.push(Pos { x, y });
                }
            }
        }
        cells
    }

    /// Number of path cells reachable from `start` through 4-neighbour moves.
    pub fn reachable_from(&self, start: Pos) -> usize {
        if self.tile(start) != Some(Tile::Path) {
            return 0;
        }
        let mut seen = vec![vec![false; self.width]; self.height];
        let mut q = VecDeque::new();
        seen[start.y][start.x] = true;
        q.push_back(start);
        let mut count = 0;
        while let Some(pos) = q.pop_front() {
            count += 1;
            for dir in Dir::ALL {
                let (dx, dy) = dir.delta();
                let Some(next) = pos.offset(dx, dy) else {
                    continue;
                };
                if self.tile(next) != Some(Tile::Path) || seen[next.y][next.x] {
                    continue;
                }
                seen[next.y][next.x] = true;
                q.push_back(next);
            }
        }
        count
    }

    pub fn is_connected(&self) -> bool {
        match self.path_cells().first() {
            Some(&start) => self.reachable_from(start) == self.path_count,
            None => true,
        }
    }
}

struct CarveFrame {
    pos: Pos,
    dirs: [Dir; 4],
    next: usize,
}

impl CarveFrame {
    fn new(pos: Pos, rng: &mut impl Rng) -> Self {
        let mut dirs = Dir::ALL;
        dirs.shuffle(rng);
        Self { pos, dirs, next: 0 }
    }

    fn next_dir(&mut self) -> Option<Dir> {
        let dir = self.dirs.get(self.next).copied();
        self.next += 1;
        dir
    }
}

/// The wall cell one step away and the target cell two steps away, if both are in bounds.
fn two_steps(pos: Pos, dir: Dir, width: usize, height: usize) -> Option<(Pos, Pos)> {
    let (dx, dy) = dir.delta();
    let between = pos.offset(dx, dy)?;
    let target = pos.offset(dx * 2, dy * 2)?;
    if target.x >= width || target.y >= height {
        return None;
    }
    Some((between, target))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MazeSource {
    Generated {
        width: usize,
        height: usize,
        start: Pos,
    },
    Literal(Grid),
}

impl MazeSource {
    pub fn build(&self, rng: &mut impl Rng) -> Result<Grid, MazeError> {
        match self {
            MazeSource::Generated {
                width,
                height,
                start,
            } => Grid::generate(*width, *height, *start, rng),
            MazeSource::Literal(grid) => Ok(grid.clone()),
        }
    }
}

/// Uniform rejection sampling of a path cell, capped at a bounded number of draws.
pub fn pick_path_cell(grid: &Grid, rng: &mut impl Rng) -> Result<Pos, MazeError> {
    if grid.path_count == 0 {
        return Err(MazeError::NoPathCells);
    }
    let attempts = (grid.width * grid.height * SAMPLES_PER_CELL).max(MIN_SAMPLE_ATTEMPTS);
    for _ in 0..attempts {
        let pos = Pos {
            x: rng.gen_range(0..grid.width),
            y: rng.gen_range(0..grid.height),
        };
        if grid.tiles[pos.y][pos.x] == Tile::Path {
            return Ok(pos);
        }
    }
    Err(MazeError::SamplingExhausted { attempts })
}
