use crossterm::style::Color;
use std::io;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Shrinks every side by `by`, collapsing to an empty rect at the centre.
    pub fn inset(self, by: u32) -> Rect {
        let by_w = by.min(self.w / 2);
        let by_h = by.min(self.h / 2);
        Rect {
            x: self.x.saturating_add(by_w),
            y: self.y.saturating_add(by_h),
            w: self.w - by_w * 2,
            h: self.h - by_h * 2,
        }
    }
}

pub trait Canvas {
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, cx: u32, cy: u32, radius: u32, color: Color);
}

/// A canvas that can show a finished frame together with a status line.
pub trait Surface: Canvas {
    fn present(&mut self, status: &str) -> io::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkSize {
    Small,
    Large,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mark {
    pub size: MarkSize,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub fill: Color,
    pub stroke: Option<Color>,
    pub mark: Option<Mark>,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        fill: Color::Reset,
        stroke: None,
        mark: None,
    };
}

/// Rasterizes pixel-space drawing onto one cell per tile.
///
/// Later operations paint over earlier ones: a fill wipes any stroke or
/// mark below it, a circle replaces the mark of the tile holding its centre.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileCanvas {
    tile_size: u32,
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
    status: String,
    presented: u64,
}

impl TileCanvas {
    pub fn new(cols: usize, rows: usize, tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            cols,
            rows,
            cells: vec![Cell::BLANK; cols * rows],
            status: String::new(),
            presented: 0,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Tile columns and rows covered by `rect`, clipped to the canvas.
    fn span(&self, rect: Rect) -> Option<(usize, usize, usize, usize)> {
        if rect.w == 0 || rect.h == 0 {
            return None;
        }
        let ts = self.tile_size;
        let c0 = (rect.x / ts) as usize;
        let r0 = (rect.y / ts) as usize;
        let c1 = (rect.x.saturating_add(rect.w - 1) / ts) as usize;
        let r1 = (rect.y.saturating_add(rect.h - 1) / ts) as usize;
        if c0 >= self.cols || r0 >= self.rows {
            return None;
        }
        Some((c0, r0, c1.min(self.cols - 1), r1.min(self.rows - 1)))
    }
}

impl Canvas for TileCanvas {
    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((c0, r0, c1, r1)) = self.span(rect) else {
            return;
        };
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.cells[row * self.cols + col] = Cell {
                    fill: color,
                    stroke: None,
                    mark: None,
                };
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        let Some((c0, r0, c1, r1)) = self.span(rect) else {
            return;
        };
        for row in r0..=r1 {
            for col in c0..=c1 {
                if row == r0 || row == r1 || col == c0 || col == c1 {
                    self.cells[row * self.cols + col].stroke = Some(color);
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: u32, cy: u32, radius: u32, color: Color) {
        if radius == 0 {
            return;
        }
        let col = (cx / self.tile_size) as usize;
        let row = (cy / self.tile_size) as usize;
        if col >= self.cols || row >= self.rows {
            return;
        }
        let size = if radius.saturating_mul(2) >= self.tile_size {
            MarkSize::Large
        } else {
            MarkSize::Small
        };
        self.cells[row * self.cols + col].mark = Some(Mark { size, color });
    }
}

impl Surface for TileCanvas {
    fn present(&mut self, status: &str) -> io::Result<()> {
        self.status.clear();
        self.status.push_str(status);
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_covers_every_touched_tile() {
        let mut canvas = TileCanvas::new(4, 3, 10);
        canvas.fill_rect(Rect::new(5, 0, 10, 10), Color::Green);
        assert_eq!(canvas.cell(0, 0).unwrap().fill, Color::Green);
        assert_eq!(canvas.cell(1, 0).unwrap().fill, Color::Green);
        assert_eq!(canvas.cell(2, 0).unwrap(), Cell::BLANK);
        assert_eq!(canvas.cell(0, 1).unwrap(), Cell::BLANK);
    }

    #[test]
    fn fill_paints_over_stroke_and_mark() {
        let mut canvas = TileCanvas::new(1, 1, 10);
        canvas.stroke_rect(Rect::new(0, 0, 10, 10), Color::Green);
        canvas.fill_circle(5, 5, 5, Color::Blue);
        canvas.fill_rect(Rect::new(0, 0, 10, 10), Color::Black);
        assert_eq!(
            canvas.cell(0, 0),
            Some(Cell {
                fill: Color::Black,
                stroke: None,
                mark: None
            })
        );
    }

    #[test]
    fn stroke_only_touches_outline() {
        let mut canvas = TileCanvas::new(3, 3, 10);
        canvas.stroke_rect(Rect::new(0, 0, 30, 30), Color::Green);
        assert_eq!(canvas.cell(0, 0).unwrap().stroke, Some(Color::Green));
        assert_eq!(canvas.cell(2, 1).unwrap().stroke, Some(Color::Green));
        assert_eq!(canvas.cell(1, 1).unwrap().stroke, None);
    }

    #[test]
    fn circle_size_follows_radius() {
        let mut canvas = TileCanvas::new(2, 1, 40);
        canvas.fill_circle(20, 20, 20, Color::Blue);
        canvas.fill_circle(60, 20, 10, Color::Red);
        assert_eq!(canvas.cell(0, 0).unwrap().mark.unwrap().size, MarkSize::Large);
        assert_eq!(canvas.cell(1, 0).unwrap().mark.unwrap().size, MarkSize::Small);
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut canvas = TileCanvas::new(2, 2, 10);
        canvas.fill_rect(Rect::new(15, 15, 100, 100), Color::Green);
        canvas.fill_circle(500, 5, 5, Color::Red);
        assert_eq!(canvas.cell(1, 1).unwrap().fill, Color::Green);
        assert_eq!(canvas.cell(0, 0).unwrap(), Cell::BLANK);
    }

    #[test]
    fn huge_coordinates_saturate() {
        let mut canvas = TileCanvas::new(2, 2, u32::MAX);
        canvas.fill_rect(Rect::new(u32::MAX - 1, 0, u32::MAX, 10), Color::Green);
        canvas.fill_circle(0, 0, u32::MAX, Color::Blue);
        assert_eq!(canvas.cell(0, 0).unwrap().mark.unwrap().size, MarkSize::Large);
    }

    #[test]
    fn inset_never_underflows() {
        assert_eq!(Rect::new(0, 0, 40, 40).inset(2), Rect::new(2, 2, 36, 36));
        assert_eq!(Rect::new(10, 10, 3, 3).inset(2), Rect::new(11, 11, 1, 1));
    }

    #[test]
    fn present_records_status() {
        let mut canvas = TileCanvas::new(1, 1, 1);
        canvas.present("Round: 1").unwrap();
        canvas.present("Round: 2").unwrap();
        assert_eq!(canvas.status(), "Round: 2");
        assert_eq!(canvas.presented(), 2);
    }
}
