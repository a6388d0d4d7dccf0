use crate::canvas::{Canvas, Rect};
use crate::error::MazeError;
use crate::maze::{pick_path_cell, Dir, Grid, Pos, Tile};
use crossterm::style::Color;
use rand::Rng;
use tracing::{debug, info};

const WALL_FILL: Color = Color::DarkGreen;
const WALL_EDGE: Color = Color::Green;
const PATH_FILL: Color = Color::Black;
const GOAL_COLOR: Color = Color::Blue;
const PLAYER_COLOR: Color = Color::Red;
const WALL_LINE_WIDTH: u32 = 2;
const GOAL_REDRAWS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    pub pos: Pos,
    pub radius: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Blocked,
    ReachedGoal,
}

#[derive(Clone, Debug)]
pub struct Session {
    grid: Grid,
    player: Player,
    goal: Pos,
    tile_size: u32,
    round: u32,
    moves: u32,
}

impl Session {
    pub fn new(grid: Grid, tile_size: u32, rng: &mut impl Rng) -> Result<Session, MazeError> {
        let (start, goal) = place(&grid, rng)?;
        Session::with_positions(grid, tile_size, start, goal)
    }

    pub fn with_positions(
        grid: Grid,
        tile_size: u32,
        start: Pos,
        goal: Pos,
    ) -> Result<Session, MazeError> {
        for pos in [start, goal] {
            if grid.tile(pos) != Some(Tile::Path) {
                return Err(MazeError::NotPath { x: pos.x, y: pos.y });
            }
        }
        if start == goal {
            return Err(MazeError::GoalOnStart {
                x: goal.x,
                y: goal.y,
            });
        }
        let tile_size = tile_size.max(1);
        info!(
            width = grid.width(),
            height = grid.height(),
            start = ?start,
            goal = ?goal,
            "session started"
        );
        Ok(Session {
            grid,
            player: Player {
                pos: start,
                radius: (tile_size / 4).max(1),
            },
            goal,
            tile_size,
            round: 1,
            moves: 0,
        })
    }

    pub fn reset(&mut self, grid: Grid, rng: &mut impl Rng) -> Result<(), MazeError> {
        let (start, goal) = place(&grid, rng)?;
        self.grid = grid;
        self.player.pos = start;
        self.goal = goal;
        self.round += 1;
        self.moves = 0;
        info!(round = self.round, start = ?start, goal = ?goal, "round started");
        Ok(())
    }

    /// Moves one cell if `(dx, dy)` is a unit axis step onto a path cell.
    ///
    /// Anything else leaves the player where it is and reports `Blocked`.
    pub fn try_move(&mut self, dx: isize, dy: isize) -> MoveOutcome {
        match Dir::from_delta(dx, dy) {
            Some(dir) => self.move_player(dir),
            None => MoveOutcome::Blocked,
        }
    }

    pub fn move_player(&mut self, dir: Dir) -> MoveOutcome {
        let (dx, dy) = dir.delta();
        let target = match self.player.pos.offset(dx, dy) {
            Some(pos) if self.grid.tile(pos) == Some(Tile::Path) => pos,
            _ => {
                debug!(?dir, pos = ?self.player.pos, "move blocked");
                return MoveOutcome::Blocked;
            }
        };
        self.player.pos = target;
        self.moves += 1;
        if target == self.goal {
            MoveOutcome::ReachedGoal
        } else {
            MoveOutcome::Moved
        }
    }

    pub fn render(&self, canvas: &mut impl Canvas) {
        let ts = self.tile_size;
        canvas.clear();
        for (y, row) in self.grid.rows().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                let rect = Rect::new(pixel(x, ts), pixel(y, ts), ts, ts);
                match tile {
                    Tile::Wall => {
                        canvas.fill_rect(rect, WALL_FILL);
                        canvas.stroke_rect(rect.inset(WALL_LINE_WIDTH), WALL_EDGE);
                    }
                    Tile::Path => canvas.fill_rect(rect, PATH_FILL),
                }
            }
        }

        let (gx, gy) = self.centre(self.goal);
        canvas.fill_circle(gx, gy, ts / 2, GOAL_COLOR);
        let (px, py) = self.centre(self.player.pos);
        canvas.fill_circle(px, py, self.player.radius, PLAYER_COLOR);
    }

    fn centre(&self, pos: Pos) -> (u32, u32) {
        let ts = self.tile_size;
        (
            pixel(pos.x, ts).saturating_add(ts / 2),
            pixel(pos.y, ts).saturating_add(ts / 2),
        )
    }

    pub fn status_line(&self) -> String {
        format!(
            "Round: {}  Moves: {}  (arrows or hjkl to move, q to quit)",
            self.round, self.moves
        )
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }
}

fn pixel(cell: usize, ts: u32) -> u32 {
    u32::try_from(cell).unwrap_or(u32::MAX).saturating_mul(ts)
}

/// Picks a start and a distinct goal. A single path cell leaves nothing to walk to.
fn place(grid: &Grid, rng: &mut impl Rng) -> Result<(Pos, Pos), MazeError> {
    let start = pick_path_cell(grid, rng)?;
    if grid.path_count() < 2 {
        return Err(MazeError::TooFewPathCells {
            found: grid.path_count(),
        });
    }
    for _ in 0..GOAL_REDRAWS {
        let goal = pick_path_cell(grid, rng)?;
        if goal != start {
            return Ok((start, goal));
        }
    }
    let goal = grid
        .path_cells()
        .into_iter()
        .find(|&pos| pos != start)
        .ok_or(MazeError::TooFewPathCells { found: 1 })?;
    Ok((start, goal))
}
