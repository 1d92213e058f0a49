//! Drawing the maze onto an abstract pixel canvas.

use std::io;

use crossterm::style::Color;

use crate::grid::{Cell, Direction};
use crate::session::Session;

pub const BACKGROUND: Color = Color::Black;
pub const WALL: Color = Color::White;
pub const PLAYER: Color = Color::Blue;
pub const GOAL: Color = Color::Green;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.x + self.w && p.y < self.y + self.h
    }
}

/// Drawing surface measured in pixels.
pub trait Canvas {
    fn clear(&mut self, color: Color) -> io::Result<()>;
    fn draw_line(&mut self, from: Point, to: Point, color: Color) -> io::Result<()>;
    fn fill_rect(&mut self, rect: Rect, color: Color) -> io::Result<()>;
    /// One line of text shown next to the drawing.
    fn caption(&mut self, text: &str) -> io::Result<()>;
    fn present(&mut self) -> io::Result<()>;
}

/// Pixel segment for the wall on `side` of `cell`.
pub fn wall_segment(cell: Cell, side: Direction, cell_size: u32) -> (Point, Point) {
    let x0 = cell.x as u32 * cell_size;
    let y0 = cell.y as u32 * cell_size;
    let x1 = x0 + cell_size;
    let y1 = y0 + cell_size;
    match side {
        Direction::Up => (Point::new(x0, y0), Point::new(x1, y0)),
        Direction::Right => (Point::new(x1, y0), Point::new(x1, y1)),
        Direction::Down => (Point::new(x0, y1), Point::new(x1, y1)),
        Direction::Left => (Point::new(x0, y0), Point::new(x0, y1)),
    }
}

/// Marker rectangle for a token standing on `cell`, inset by one pixel.
pub fn marker_rect(cell: Cell, cell_size: u32) -> Rect {
    Rect {
        x: cell.x as u32 * cell_size + 1,
        y: cell.y as u32 * cell_size + 1,
        w: cell_size.saturating_sub(2),
        h: cell_size.saturating_sub(2),
    }
}

pub fn status_line(session: &Session) -> String {
    format!(
        "Moves: {}  Seed: {}  (arrows/hjkl to move, q to quit)",
        session.moves(),
        session.seed()
    )
}

/// Draws one full frame and presents it.
pub fn draw_maze(canvas: &mut impl Canvas, session: &Session, cell_size: u32) -> io::Result<()> {
    let grid = session.grid();
    canvas.clear(BACKGROUND)?;
    canvas.caption(&status_line(session))?;

    for cell in grid.cells() {
        for side in Direction::ALL {
            if grid.has_wall(cell, side) {
                let (from, to) = wall_segment(cell, side, cell_size);
                canvas.draw_line(from, to, WALL)?;
            }
        }
    }

    canvas.fill_rect(marker_rect(session.player(), cell_size), PLAYER)?;
    canvas.fill_rect(marker_rect(session.goal(), cell_size), GOAL)?;
    canvas.present()
}
