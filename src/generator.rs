//! Randomized depth-first maze carving (iterative recursive backtracker).

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::grid::{Cell, Direction, Grid, WallMask};

/// Counters describing one generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub carved: usize,
    pub max_stack_depth: usize,
}

/// Generates a perfect maze of `rows` x `cols` cells rooted at (0, 0).
pub fn generate_maze(rng: &mut impl Rng, rows: usize, cols: usize) -> Grid {
    let mut grid = Grid::new(rows, cols);
    carve_maze(&mut grid, rng);
    grid
}

/// Carves a spanning tree into `grid`, which must be entirely unvisited.
pub fn carve_maze(grid: &mut Grid, rng: &mut impl Rng) -> GenerationStats {
    debug_assert!(grid.cells().all(|c| grid.get(c).is_unvisited()));

    let start = Cell::new(0, 0);
    let mut stack: Vec<Cell> = Vec::with_capacity(grid.len());
    let mut stats = GenerationStats::default();

    grid.set(start, WallMask::ALL_WALLS);
    stack.push(start);

    while let Some(current) = stack.pop() {
        let mut dirs = Direction::ALL;
        dirs.shuffle(rng);

        for dir in dirs {
            let Some(next) = grid.neighbor(current, dir) else {
                continue;
            };
            if !grid.get(next).is_unvisited() {
                continue;
            }
            grid.set(next, WallMask::ALL_WALLS);
            grid.carve(current, dir);
            stats.carved += 1;

            stack.push(current);
            stack.push(next);
            stats.max_stack_depth = stats.max_stack_depth.max(stack.len());
            break;
        }
    }

    debug!(
        carved = stats.carved,
        max_stack_depth = stats.max_stack_depth,
        "maze carved"
    );
    stats
}

/// Clears the masks of the start and goal cells.
///
/// Only those two cells change; neighbours keep their recorded walls, so the
/// mirrored-wall property no longer holds along their edges.
pub fn open_endpoints(grid: &mut Grid, start: Cell, goal: Cell) {
    grid.set(start, WallMask::UNVISITED);
    grid.set(goal, WallMask::UNVISITED);
}
