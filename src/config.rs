use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;

use crate::terminal::lattice_fits;
use crate::{MazeError, MazeResult};

pub const DEFAULT_CANVAS_W: u32 = 800;
pub const DEFAULT_CANVAS_H: u32 = 600;
pub const DEFAULT_CELL_SIZE: u32 = 40;
pub const DEFAULT_FRAME_MS: u64 = 100;

/// Smallest cell that still leaves room for a 1px inset marker.
pub const MIN_CELL_SIZE: u32 = 4;

/// Largest canvas edge accepted; keeps lattice and cursor math inside `u16`.
pub const MAX_CANVAS_PX: u32 = u16::MAX as u32;

/// Walk a randomly carved maze from the top-left corner to the bottom-right.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Canvas width in pixels
    #[arg(
        long,
        env = "MAZE_WIDTH",
        default_value_t = DEFAULT_CANVAS_W,
        value_parser = clap::value_parser!(u32).range(1..=MAX_CANVAS_PX as i64)
    )]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(
        long,
        env = "MAZE_HEIGHT",
        default_value_t = DEFAULT_CANVAS_H,
        value_parser = clap::value_parser!(u32).range(1..=MAX_CANVAS_PX as i64)
    )]
    pub height: u32,

    /// Edge length of one maze cell in pixels
    #[arg(
        long,
        env = "MAZE_CELL_SIZE",
        default_value_t = DEFAULT_CELL_SIZE,
        value_parser = clap::value_parser!(u32).range(MIN_CELL_SIZE as i64..)
    )]
    pub cell_size: u32,

    /// Random seed; defaults to the current time
    #[arg(long, env = "MAZE_SEED")]
    pub seed: Option<u64>,

    /// Pause between frames in milliseconds
    #[arg(long, env = "MAZE_FRAME_MS", default_value_t = DEFAULT_FRAME_MS)]
    pub frame_ms: u64,

    /// Clear the recorded walls of the start and goal cells after carving
    #[arg(long)]
    pub open_endpoints: bool,

    /// Write logs to this file (the terminal is busy drawing the maze)
    #[arg(long, env = "MAZE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_W,
            height: DEFAULT_CANVAS_H,
            cell_size: DEFAULT_CELL_SIZE,
            seed: None,
            frame_ms: DEFAULT_FRAME_MS,
            open_endpoints: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Grid `(rows, cols)` derived from the canvas and cell size.
    pub fn dimensions(&self) -> MazeResult<(usize, usize)> {
        if self.cell_size < MIN_CELL_SIZE {
            return Err(MazeError::CellTooSmall {
                got: self.cell_size,
                min: MIN_CELL_SIZE,
            });
        }
        if self.width > MAX_CANVAS_PX || self.height > MAX_CANVAS_PX {
            return Err(MazeError::CanvasTooLarge {
                width: self.width,
                height: self.height,
                max: MAX_CANVAS_PX,
            });
        }
        let rows = (self.height / self.cell_size) as usize;
        let cols = (self.width / self.cell_size) as usize;
        if rows == 0 || cols == 0 {
            return Err(MazeError::CanvasTooSmall {
                width: self.width,
                height: self.height,
                cell_size: self.cell_size,
            });
        }
        if !lattice_fits(rows, cols) {
            return Err(MazeError::CanvasTooLarge {
                width: self.width,
                height: self.height,
                max: MAX_CANVAS_PX,
            });
        }
        Ok((rows, cols))
    }

    pub fn frame_delay(&self) -> MazeResult<Duration> {
        if self.frame_ms == 0 {
            return Err(MazeError::ZeroFrameDelay);
        }
        Ok(Duration::from_millis(self.frame_ms))
    }

    /// The configured seed, or one taken from the wall clock.
    pub fn seed_or_clock(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dimensions() {
        let config = Config::default();
        assert_eq!(config.dimensions(), Ok((15, 20)));
        assert_eq!(config.frame_delay(), Ok(Duration::from_millis(100)));
    }

    #[test]
    fn test_dimensions_use_integer_division() {
        let config = Config {
            width: 810,
            height: 619,
            cell_size: 20,
            ..Config::default()
        };
        assert_eq!(config.dimensions(), Ok((30, 40)));
    }

    #[test]
    fn test_rejects_tiny_cells() {
        let config = Config {
            cell_size: 2,
            ..Config::default()
        };
        assert_eq!(
            config.dimensions(),
            Err(MazeError::CellTooSmall { got: 2, min: 4 })
        );
    }

    #[test]
    fn test_rejects_canvas_smaller_than_cell() {
        let config = Config {
            width: 30,
            cell_size: 40,
            ..Config::default()
        };
        assert!(matches!(
            config.dimensions(),
            Err(MazeError::CanvasTooSmall { .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_canvas() {
        let wide = Config {
            width: 131_072,
            height: 8,
            cell_size: 4,
            ..Config::default()
        };
        assert_eq!(
            wide.dimensions(),
            Err(MazeError::CanvasTooLarge {
                width: 131_072,
                height: 8,
                max: MAX_CANVAS_PX,
            })
        );

        let huge = Config {
            width: 4_000_000_000,
            height: 4_000_000_000,
            cell_size: 1_000_000_000,
            ..Config::default()
        };
        assert!(matches!(
            huge.dimensions(),
            Err(MazeError::CanvasTooLarge { .. })
        ));
    }

    #[test]
    fn test_largest_canvas_fits_terminal_lattice() {
        let config = Config {
            width: MAX_CANVAS_PX,
            height: MAX_CANVAS_PX,
            cell_size: MIN_CELL_SIZE,
            ..Config::default()
        };
        let (rows, cols) = config.dimensions().unwrap();
        assert_eq!((rows, cols), (16_383, 16_383));
        assert!(lattice_fits(rows, cols));
    }

    #[test]
    fn test_cli_rejects_out_of_range_sizes() {
        assert!(Config::try_parse_from(["maze", "--width", "131072"]).is_err());
        assert!(Config::try_parse_from(["maze", "--height", "0"]).is_err());
        assert!(Config::try_parse_from(["maze", "--cell-size", "2"]).is_err());
    }

    #[test]
    fn test_rejects_zero_frame_delay() {
        let config = Config {
            frame_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.frame_delay(), Err(MazeError::ZeroFrameDelay));
    }

    #[test]
    fn test_seed_passthrough() {
        let config = Config {
            seed: Some(2918957128),
            ..Config::default()
        };
        assert_eq!(config.seed_or_clock(), 2918957128);
    }

    #[test]
    fn test_parse_flags() {
        let config = Config::try_parse_from([
            "maze",
            "--width",
            "400",
            "--height",
            "200",
            "--cell-size",
            "20",
            "--seed",
            "7",
            "--open-endpoints",
        ])
        .unwrap();
        assert_eq!(config.dimensions(), Ok((10, 20)));
        assert_eq!(config.seed, Some(7));
        assert!(config.open_endpoints);
    }
}
