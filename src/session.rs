use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::generator::{carve_maze, open_endpoints};
use crate::grid::{Cell, Direction, Grid};
use crate::{MazeError, MazeResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Blocked,
}

/// One playthrough: a frozen maze, the player token and the goal.
#[derive(Clone, Debug)]
pub struct Session {
    grid: Grid,
    player: Cell,
    goal: Cell,
    seed: u64,
    moves: u32,
    won: bool,
}

impl Session {
    /// Carves a `rows` x `cols` maze from `seed` and places the player at the
    /// origin and the goal at the far corner.
    pub fn new(rows: usize, cols: usize, seed: u64) -> MazeResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(MazeError::EmptyGrid { rows, cols });
        }
        let mut grid = Grid::new(rows, cols);
        let mut rng = StdRng::seed_from_u64(seed);
        let stats = carve_maze(&mut grid, &mut rng);
        info!(
            seed,
            rows,
            cols,
            carved = stats.carved,
            max_stack_depth = stats.max_stack_depth,
            "new maze session"
        );
        Ok(Self {
            grid,
            player: Cell::new(0, 0),
            goal: Cell::new(cols - 1, rows - 1),
            seed,
            moves: 0,
            won: false,
        })
    }

    /// Clears the start and goal masks the way the classic SDL demo did.
    pub fn with_open_endpoints(mut self) -> Self {
        open_endpoints(&mut self.grid, self.player, self.goal);
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn can_move(&self, dir: Direction) -> bool {
        !self.grid.has_wall(self.player, dir) && self.grid.neighbor(self.player, dir).is_some()
    }

    /// Steps the player one cell; walls and the grid edge turn this into a
    /// no-op.
    pub fn try_move(&mut self, dir: Direction) -> MoveOutcome {
        if self.grid.has_wall(self.player, dir) {
            return MoveOutcome::Blocked;
        }
        let Some(next) = self.grid.neighbor(self.player, dir) else {
            return MoveOutcome::Blocked;
        };
        self.player = next;
        self.moves += 1;
        MoveOutcome::Moved
    }

    pub fn at_goal(&self) -> bool {
        self.player == self.goal
    }

    /// Returns `true` the first time the player is seen on the goal and
    /// `false` on every later call.
    pub fn check_win(&mut self) -> bool {
        if self.won || !self.at_goal() {
            return false;
        }
        self.won = true;
        info!(seed = self.seed, moves = self.moves, "goal reached");
        true
    }
}
