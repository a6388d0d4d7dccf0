use crate::canvas::{Canvas, Cell, Mark, MarkSize, Rect, Surface, TileCanvas};
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;

/// Presents a [`TileCanvas`] on a crossterm terminal, redrawing only cells
/// that changed since the previous frame.
pub struct TerminalSurface<W: Write> {
    out: W,
    canvas: TileCanvas,
    last: Vec<Cell>,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, cols: usize, rows: usize, tile_size: u32) -> Self {
        Self {
            out,
            canvas: TileCanvas::new(cols, rows, tile_size),
            last: vec![Cell::BLANK; cols * rows],
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    fn draw_cell(&mut self, col: usize, row: usize, cell: Cell) -> io::Result<()> {
        let (text, fg, bg) = glyph(cell);
        let x_pos = self.origin_x + (col * CELL_W) as u16;
        let y_pos = self.origin_y + row as u16;
        self.out.queue(MoveTo(x_pos, y_pos))?;
        self.out.queue(SetForegroundColor(fg))?;
        self.out.queue(SetBackgroundColor(bg))?;
        self.out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                self.out.queue(Print(' '))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

/// Top-left terminal cell of the maze, centred below a status line, or
/// `None` when the terminal cannot hold `cols` x `rows` tiles.
fn layout(cols: usize, rows: usize, term_w: u16, term_h: u16) -> Option<(u16, u16)> {
    let needed_w = u16::try_from(cols.checked_mul(CELL_W)?).ok()?;
    let needed_h = u16::try_from(rows.checked_add(2)?).ok()?;
    if term_w < needed_w || term_h < needed_h {
        return None;
    }
    Some(((term_w - needed_w) / 2, (term_h - needed_h) / 2 + 1))
}

/// Text, foreground and background used to show one tile.
fn glyph(cell: Cell) -> (&'static str, Color, Color) {
    match (cell.mark, cell.stroke) {
        (
            Some(Mark {
                size: MarkSize::Large,
                color,
            }),
            _,
        ) => ("⬤", color, cell.fill),
        (
            Some(Mark {
                size: MarkSize::Small,
                color,
            }),
            _,
        ) => ("●", color, cell.fill),
        (None, Some(stroke)) => ("▒▒", stroke, cell.fill),
        (None, None) => ("  ", Color::Reset, cell.fill),
    }
}

impl<W: Write> Canvas for TerminalSurface<W> {
    fn clear(&mut self) {
        self.canvas.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.canvas.fill_rect(rect, color);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.canvas.stroke_rect(rect, color);
    }

    fn fill_circle(&mut self, cx: u32, cy: u32, radius: u32, color: Color) {
        self.canvas.fill_circle(cx, cy, radius, color);
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn present(&mut self, status: &str) -> io::Result<()> {
        let cols = self.canvas.cols();
        let rows = self.canvas.rows();
        let (term_w, term_h) = terminal::size()?;
        self.out.queue(MoveTo(0, 0))?;

        let Some((origin_x, origin_y)) = layout(cols, rows, term_w, term_h) else {
            self.out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small for a {}x{} maze ({}x{} needed). Current: {}x{}.",
                cols,
                rows,
                cols.saturating_mul(CELL_W),
                rows.saturating_add(2),
                term_w,
                term_h
            );
            self.out.queue(Print(msg))?;
            self.out.flush()?;
            self.needs_full = true;
            return Ok(());
        };

        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            self.out.queue(Clear(ClearType::All))?;
        }

        if self.needs_full || status != self.last_status {
            self.out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            self.out.queue(SetForegroundColor(Color::White))?;
            self.out.queue(Clear(ClearType::CurrentLine))?;
            self.out.queue(Print(status))?;
            self.out.queue(ResetColor)?;
            self.last_status.clear();
            self.last_status.push_str(status);
        }

        for row in 0..rows {
            for col in 0..cols {
                let idx = row * cols + col;
                let cell = self.canvas.cells()[idx];
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(col, row, cell)?;
                }
            }
        }
        self.needs_full = false;

        self.out.flush()?;
        Ok(())
    }
}
