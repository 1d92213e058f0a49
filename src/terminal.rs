//! crossterm backend: block-character canvas, keyboard input, win notice.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::grid::Direction;
use crate::render::{Canvas, Point, Rect};

// Terminal columns per lattice point. A maze of rows x cols cells is drawn
// on a (2 * cols + 1) x (2 * rows + 1) lattice.
const POINT_W: usize = 2;
const WIN_MESSAGE: &str = "Congratulations — you reached the goal! (press any key)";

/// Whether a `rows` x `cols` maze (lattice plus status and notice lines)
/// can be addressed with terminal cursor coordinates.
pub fn lattice_fits(rows: usize, cols: usize) -> bool {
    let needed_w = cols
        .checked_mul(2)
        .and_then(|w| w.checked_add(1))
        .and_then(|w| w.checked_mul(POINT_W));
    let needed_h = rows.checked_mul(2).and_then(|h| h.checked_add(3));
    matches!(
        (needed_w, needed_h),
        (Some(w), Some(h)) if w <= u16::MAX as usize && h <= u16::MAX as usize
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tile {
    Blank,
    Line(Color),
    Fill(Color),
}

impl Tile {
    fn glyph(self) -> (&'static str, Color) {
        match self {
            Tile::Blank => ("  ", Color::Reset),
            Tile::Line(color) => ("██", color),
            Tile::Fill(color) => ("●", color),
        }
    }
}

pub struct TerminalCanvas<W: Write> {
    out: W,
    cell_size: u32,
    width: usize,
    height: usize,
    frame: Vec<Tile>,
    last: Vec<Tile>,
    caption: String,
    last_caption: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
    fixed_size: Option<(u16, u16)>,
}

impl<W: Write> TerminalCanvas<W> {
    pub fn new(out: W, rows: usize, cols: usize, cell_size: u32) -> Self {
        let width = cols * 2 + 1;
        let height = rows * 2 + 1;
        Self {
            out,
            cell_size,
            width,
            height,
            frame: vec![Tile::Blank; width * height],
            last: vec![Tile::Blank; width * height],
            caption: String::new(),
            last_caption: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
            fixed_size: None,
        }
    }

    /// Pins the terminal size instead of asking the tty.
    pub fn with_size(mut self, cols: u16, rows: u16) -> Self {
        self.fixed_size = Some((cols, rows));
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn terminal_size(&self) -> io::Result<(u16, u16)> {
        match self.fixed_size {
            Some(size) => Ok(size),
            None => terminal::size(),
        }
    }

    // Sizes past u16 saturate, which always reads as "terminal too small".
    fn needed(&self) -> (u16, u16) {
        let w = u16::try_from(self.width * POINT_W).unwrap_or(u16::MAX);
        let h = u16::try_from(self.height + 2).unwrap_or(u16::MAX);
        (w, h)
    }

    /// Nearest lattice coordinate for a pixel coordinate.
    fn to_lattice(&self, px: u32) -> usize {
        let cell = u64::from(self.cell_size);
        ((2 * u64::from(px) + cell / 2) / cell) as usize
    }

    /// Pixel coordinate of a lattice coordinate.
    fn to_pixel(&self, l: usize) -> u32 {
        (l as u64 * u64::from(self.cell_size) / 2).min(u64::from(u32::MAX)) as u32
    }

    fn plot(&mut self, lx: usize, ly: usize, tile: Tile) {
        if lx < self.width && ly < self.height {
            self.frame[ly * self.width + lx] = tile;
        }
    }

    fn draw_point(&mut self, lx: usize, ly: usize, tile: Tile) -> io::Result<()> {
        let (text, color) = tile.glyph();
        let x_pos = self.origin_x + (lx * POINT_W) as u16;
        let y_pos = self.origin_y + ly as u16;
        self.out.queue(MoveTo(x_pos, y_pos))?;
        self.out.queue(SetForegroundColor(color))?;
        self.out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < POINT_W {
            for _ in 0..(POINT_W - w) {
                self.out.queue(Print(' '))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }

    /// Prints `message` on the line below the maze.
    pub fn notify(&mut self, message: &str) -> io::Result<()> {
        let (needed_w, needed_h) = self.needed();
        let (term_w, term_h) = self.terminal_size()?;
        if term_w < needed_w || term_h < needed_h {
            self.out.queue(MoveTo(0, needed_h))?;
        } else {
            self.out
                .queue(MoveTo(self.origin_x, self.origin_y + self.height as u16))?;
        }
        self.out.queue(SetForegroundColor(Color::White))?;
        self.out.queue(Print(message))?;
        self.out.queue(ResetColor)?;
        self.out.flush()
    }

    #[cfg(test)]
    fn tile_at(&self, lx: usize, ly: usize) -> Tile {
        self.frame[ly * self.width + lx]
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    fn clear(&mut self, color: Color) -> io::Result<()> {
        let tile = match color {
            Color::Reset | Color::Black => Tile::Blank,
            other => Tile::Fill(other),
        };
        self.frame.fill(tile);
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) -> io::Result<()> {
        let (x0, y0) = (self.to_lattice(from.x) as isize, self.to_lattice(from.y) as isize);
        let (x1, y1) = (self.to_lattice(to.x) as isize, self.to_lattice(to.y) as isize);
        let steps = (x1 - x0).abs().max((y1 - y0).abs());
        for i in 0..=steps {
            let (lx, ly) = if steps == 0 {
                (x0, y0)
            } else {
                (x0 + (x1 - x0) * i / steps, y0 + (y1 - y0) * i / steps)
            };
            self.plot(lx as usize, ly as usize, Tile::Line(color));
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> io::Result<()> {
        for ly in 0..self.height {
            for lx in 0..self.width {
                let p = Point::new(self.to_pixel(lx), self.to_pixel(ly));
                if rect.contains(p) {
                    self.plot(lx, ly, Tile::Fill(color));
                }
            }
        }
        Ok(())
    }

    fn caption(&mut self, text: &str) -> io::Result<()> {
        self.caption.clear();
        self.caption.push_str(text);
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        let (needed_w, needed_h) = self.needed();
        self.out.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = self.terminal_size()?;
        if term_w < needed_w || term_h < needed_h {
            self.out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            self.out.queue(Print(msg))?;
            self.out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            self.out.queue(Clear(ClearType::All))?;
        }

        if self.needs_full || self.caption != self.last_caption {
            self.out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            self.out.queue(SetForegroundColor(Color::White))?;
            self.out.queue(Clear(ClearType::CurrentLine))?;
            self.out.queue(Print(&self.caption))?;
            self.out.queue(ResetColor)?;
            self.last_caption.clone_from(&self.caption);
        }

        for ly in 0..self.height {
            for lx in 0..self.width {
                let idx = ly * self.width + lx;
                let tile = self.frame[idx];
                if self.needs_full || tile != self.last[idx] {
                    self.last[idx] = tile;
                    self.draw_point(lx, ly, tile)?;
                }
            }
        }
        self.needs_full = false;

        self.out.flush()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    Move(Direction),
}

/// Maps one terminal event to a game input; everything unrecognized is
/// `None`.
pub fn map_event(event: &Event) -> Option<InputEvent> {
    let Event::Key(key) = event else {
        return None;
    };
    map_key(key)
}

fn map_key(key: &KeyEvent) -> Option<InputEvent> {
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => {}
        _ => return None,
    }
    let input = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputEvent::Quit,
        KeyCode::Char('q') | KeyCode::Esc => InputEvent::Quit,
        KeyCode::Up | KeyCode::Char('k') => InputEvent::Move(Direction::Up),
        KeyCode::Right | KeyCode::Char('l') => InputEvent::Move(Direction::Right),
        KeyCode::Down | KeyCode::Char('j') => InputEvent::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => InputEvent::Move(Direction::Left),
        _ => return None,
    };
    Some(input)
}

/// Events already queued by the terminal; iteration ends as soon as the
/// queue is empty and never blocks.
pub struct PendingInput {
    _private: (),
}

pub fn pending_input() -> PendingInput {
    PendingInput { _private: () }
}

impl Iterator for PendingInput {
    type Item = io::Result<InputEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match event::poll(Duration::from_millis(0)) {
                Ok(false) => return None,
                Ok(true) => {}
                Err(err) => return Some(Err(err)),
            }
            match event::read() {
                Ok(ev) => {
                    if let Some(input) = map_event(&ev) {
                        return Some(Ok(input));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Blocks until a key is pressed.
pub fn wait_for_key() -> io::Result<()> {
    loop {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }
    }
}

/// Shows the win message and waits for acknowledgement.
pub fn announce_win<W: Write>(canvas: &mut TerminalCanvas<W>) -> io::Result<()> {
    canvas.notify(WIN_MESSAGE)?;
    wait_for_key()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{draw_maze, GOAL, PLAYER, WALL};
    use crate::session::Session;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn canvas_for(session: &Session, cell_size: u32) -> TerminalCanvas<Vec<u8>> {
        TerminalCanvas::new(
            Vec::new(),
            session.grid().rows(),
            session.grid().cols(),
            cell_size,
        )
        .with_size(200, 80)
    }

    #[test]
    fn test_arrow_and_vi_keys() {
        let cases = [
            (KeyCode::Up, Direction::Up),
            (KeyCode::Char('k'), Direction::Up),
            (KeyCode::Right, Direction::Right),
            (KeyCode::Char('l'), Direction::Right),
            (KeyCode::Down, Direction::Down),
            (KeyCode::Char('j'), Direction::Down),
            (KeyCode::Left, Direction::Left),
            (KeyCode::Char('h'), Direction::Left),
        ];
        for (code, dir) in cases {
            assert_eq!(
                map_event(&key(code, KeyEventKind::Press)),
                Some(InputEvent::Move(dir))
            );
        }
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(
            map_event(&key(KeyCode::Char('q'), KeyEventKind::Press)),
            Some(InputEvent::Quit)
        );
        assert_eq!(
            map_event(&key(KeyCode::Esc, KeyEventKind::Press)),
            Some(InputEvent::Quit)
        );
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&ctrl_c), Some(InputEvent::Quit));
    }

    #[test]
    fn test_ignored_events() {
        assert_eq!(map_event(&key(KeyCode::Up, KeyEventKind::Release)), None);
        assert_eq!(map_event(&key(KeyCode::Char('x'), KeyEventKind::Press)), None);
        assert_eq!(map_event(&key(KeyCode::Char('c'), KeyEventKind::Press)), None);
        assert_eq!(map_event(&Event::Resize(80, 24)), None);
        assert_eq!(map_event(&Event::FocusGained), None);
    }

    #[test]
    fn test_lattice_mapping() {
        let canvas = TerminalCanvas::new(Vec::<u8>::new(), 3, 3, 25);
        assert_eq!(canvas.to_lattice(0), 0);
        assert_eq!(canvas.to_lattice(25), 2);
        assert_eq!(canvas.to_lattice(75), 6);
        assert_eq!(canvas.to_lattice(37), 3);
        assert_eq!(canvas.to_pixel(3), 37);
    }

    #[test]
    fn test_maze_rasterizes_onto_lattice() {
        let session = Session::new(4, 5, 2718).unwrap();
        let mut canvas = canvas_for(&session, 20);
        draw_maze(&mut canvas, &session, 20).unwrap();

        let grid = session.grid();
        for cell in grid.cells() {
            let (cx, cy) = (cell.x * 2 + 1, cell.y * 2 + 1);
            for dir in Direction::ALL {
                let (dx, dy) = dir.delta();
                let lx = (cx as isize + dx) as usize;
                let ly = (cy as isize + dy) as usize;
                let walled = grid.has_wall(cell, dir);
                assert_eq!(
                    canvas.tile_at(lx, ly) == Tile::Line(WALL),
                    walled,
                    "cell {cell:?} side {dir:?}"
                );
            }
        }
        assert_eq!(canvas.tile_at(1, 1), Tile::Fill(PLAYER));
        assert_eq!(canvas.tile_at(9, 7), Tile::Fill(GOAL));
        assert_eq!(canvas.tile_at(0, 0), Tile::Line(WALL));
    }

    #[test]
    fn test_present_only_redraws_changes() {
        let mut session = Session::new(3, 3, 5).unwrap();
        let mut canvas = canvas_for(&session, 20);
        draw_maze(&mut canvas, &session, 20).unwrap();
        let first = canvas.into_inner();
        let text = String::from_utf8_lossy(&first);
        assert!(text.contains("██"));
        assert!(text.contains("●"));
        assert!(text.contains("Moves: 0"));

        let mut canvas = canvas_for(&session, 20);
        draw_maze(&mut canvas, &session, 20).unwrap();
        canvas.out.clear();
        draw_maze(&mut canvas, &session, 20).unwrap();
        let text = String::from_utf8_lossy(&canvas.out).into_owned();
        assert!(!text.contains("██"));
        assert!(!text.contains("Moves:"));

        let dir = Direction::ALL
            .into_iter()
            .find(|&d| session.can_move(d))
            .unwrap();
        session.try_move(dir);
        canvas.out.clear();
        draw_maze(&mut canvas, &session, 20).unwrap();
        let text = String::from_utf8_lossy(&canvas.out).into_owned();
        assert!(text.contains("●"));
        assert!(text.contains("Moves: 1"));
    }

    #[test]
    fn test_small_terminal_reports_size() {
        let session = Session::new(10, 10, 1).unwrap();
        let mut canvas = canvas_for(&session, 20).with_size(20, 10);
        draw_maze(&mut canvas, &session, 20).unwrap();
        let text = String::from_utf8_lossy(&canvas.into_inner()).into_owned();
        assert!(text.contains("Terminal too small. Need at least 42x23"));
    }

    #[test]
    fn test_lattice_fits_cursor_range() {
        assert!(lattice_fits(15, 20));
        assert!(lattice_fits(16_383, 16_383));
        assert!(!lattice_fits(2, 32_768));
        assert!(!lattice_fits(32_767, 2));
        assert!(!lattice_fits(usize::MAX, usize::MAX));
    }

    #[test]
    fn test_wide_maze_reads_as_too_small() {
        let session = Session::new(2, 32_768, 3).unwrap();
        let mut canvas = canvas_for(&session, 4);
        assert_eq!(canvas.needed(), (u16::MAX, 7));
        draw_maze(&mut canvas, &session, 4).unwrap();
        let text = String::from_utf8_lossy(&canvas.into_inner()).into_owned();
        assert!(text.contains("Terminal too small"));
    }

    #[test]
    fn test_lattice_math_handles_huge_pixels() {
        let canvas = TerminalCanvas::new(Vec::<u8>::new(), 4, 4, 1_000_000_000);
        assert_eq!(canvas.to_lattice(4_000_000_000), 8);
        assert_eq!(canvas.to_lattice(u32::MAX), 9);
        assert_eq!(canvas.to_pixel(8), 4_000_000_000);
    }

    #[test]
    fn test_notify_prints_below_maze() {
        let session = Session::new(2, 2, 1).unwrap();
        let mut canvas = canvas_for(&session, 20);
        draw_maze(&mut canvas, &session, 20).unwrap();
        canvas.out.clear();
        canvas.notify(WIN_MESSAGE).unwrap();
        let text = String::from_utf8_lossy(&canvas.out).into_owned();
        assert!(text.contains("Congratulations"));
    }
}
