//! Wall-mask grid.
//!
//! Every cell stores which of its four sides carry a wall as a 4-bit mask.
//! A wall shared by two neighbouring cells is recorded in both masks, and
//! [`Grid::carve`] is the only operation that removes one, clearing both bits
//! together.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Canonical scan order used by the generator before shuffling.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// The wall bit guarding this side of a cell.
    pub fn wall(self) -> WallMask {
        match self {
            Direction::Up => WallMask::TOP,
            Direction::Right => WallMask::RIGHT,
            Direction::Down => WallMask::BOTTOM,
            Direction::Left => WallMask::LEFT,
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WallMask(u8);

impl WallMask {
    pub const TOP: WallMask = WallMask(1);
    pub const RIGHT: WallMask = WallMask(2);
    pub const BOTTOM: WallMask = WallMask(4);
    pub const LEFT: WallMask = WallMask(8);

    /// Sentinel for a cell the generator has not reached yet.
    pub const UNVISITED: WallMask = WallMask(0);
    pub const ALL_WALLS: WallMask = WallMask(15);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: WallMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn without(self, other: WallMask) -> WallMask {
        WallMask(self.0 & !other.0)
    }

    pub const fn is_unvisited(self) -> bool {
        self.0 == Self::UNVISITED.0
    }
}

impl fmt::Debug for WallMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WallMask({:04b})", self.0)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<WallMask>,
}

impl Grid {
    /// Creates a grid with every cell set to [`WallMask::UNVISITED`].
    ///
    /// Panics if either dimension is zero; callers validate dimensions first.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid must have at least one cell");
        Self {
            rows,
            cols,
            cells: vec![WallMask::UNVISITED; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.cols && cell.y < self.rows
    }

    fn index(&self, cell: Cell) -> usize {
        assert!(
            self.contains(cell),
            "cell ({}, {}) outside {}x{} grid",
            cell.x,
            cell.y,
            self.cols,
            self.rows
        );
        cell.y * self.cols + cell.x
    }

    pub fn get(&self, cell: Cell) -> WallMask {
        self.cells[self.index(cell)]
    }

    pub fn set(&mut self, cell: Cell, mask: WallMask) {
        let idx = self.index(cell);
        self.cells[idx] = mask;
    }

    pub fn has_wall(&self, cell: Cell, side: Direction) -> bool {
        self.get(cell).contains(side.wall())
    }

    /// The adjacent cell on `side`, if it lies inside the grid.
    pub fn neighbor(&self, cell: Cell, side: Direction) -> Option<Cell> {
        let (dx, dy) = side.delta();
        let nx = cell.x.checked_add_signed(dx)?;
        let ny = cell.y.checked_add_signed(dy)?;
        let next = Cell::new(nx, ny);
        self.contains(next).then_some(next)
    }

    /// Removes the wall between `cell` and its neighbour on `side`.
    ///
    /// Returns the neighbour, or `None` (and leaves the grid untouched) when
    /// `side` points off the grid.
    pub fn carve(&mut self, cell: Cell, side: Direction) -> Option<Cell> {
        let next = self.neighbor(cell, side)?;
        let here = self.get(cell).without(side.wall());
        self.set(cell, here);
        let there = self.get(next).without(side.opposite().wall());
        self.set(next, there);
        Some(next)
    }

    /// Row-major iterator over every cell coordinate.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |y| (0..self.cols).map(move |x| Cell::new(x, y)))
    }

    /// Number of open passages between in-bounds neighbours.
    ///
    /// Only the right and bottom side of each cell is inspected so every
    /// shared wall is counted once.
    pub fn open_passages(&self) -> usize {
        self.cells()
            .map(|cell| {
                [Direction::Right, Direction::Down]
                    .into_iter()
                    .filter(|&side| {
                        self.neighbor(cell, side).is_some() && !self.has_wall(cell, side)
                    })
                    .count()
            })
            .sum()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}", self.cols, self.rows)?;
        for y in 0..self.rows {
            for x in 0..self.cols {
                write!(f, "{:x}", self.get(Cell::new(x, y)).bits())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
