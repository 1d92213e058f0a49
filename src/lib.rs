//! Perfect-maze generation and navigation.
//!
//! A [`Session`] owns a maze carved by randomized depth-first search, the
//! player token and the goal. Drawing goes through the [`render::Canvas`]
//! trait; the binary plugs in the crossterm canvas from [`terminal`].

pub mod config;
pub mod generator;
pub mod grid;
pub mod render;
pub mod session;
pub mod terminal;

pub use config::Config;
pub use generator::{carve_maze, generate_maze, GenerationStats};
pub use grid::{Cell, Direction, Grid, WallMask};
pub use session::{MoveOutcome, Session};

/// Errors raised while setting up a maze session.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MazeError {
    /// The grid would have no rows or no columns.
    #[error("maze needs at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    /// The canvas cell size cannot be rasterized.
    #[error("cell size must be at least {min} pixels, got {got}")]
    CellTooSmall { got: u32, min: u32 },

    /// The canvas is smaller than a single cell.
    #[error("canvas {width}x{height} cannot hold a {cell_size}px cell")]
    CanvasTooSmall {
        width: u32,
        height: u32,
        cell_size: u32,
    },

    /// The canvas is too large for the terminal lattice.
    #[error("canvas {width}x{height} exceeds the {max}px limit")]
    CanvasTooLarge { width: u32, height: u32, max: u32 },

    /// The frame delay would spin the event loop.
    #[error("frame delay must be positive")]
    ZeroFrameDelay,
}

pub type MazeResult<T> = Result<T, MazeError>;
