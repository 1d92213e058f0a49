use std::fs::File;
use std::io::{self, Stdout};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use maze_walker::render::draw_maze;
use maze_walker::terminal::{announce_win, pending_input, InputEvent, TerminalCanvas};
use maze_walker::{Config, MoveOutcome, Session};

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    let (rows, cols) = config.dimensions()?;
    let frame_delay = config.frame_delay()?;
    let mut session = Session::new(rows, cols, config.seed_or_clock())?;
    if config.open_endpoints {
        session = session.with_open_endpoints();
    }

    let mut stdout = io::stdout();
    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &mut session, config.cell_size, frame_delay);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(
    stdout: &mut Stdout,
    session: &mut Session,
    cell_size: u32,
    frame_delay: Duration,
) -> Result<()> {
    let grid = session.grid();
    let mut canvas = TerminalCanvas::new(stdout, grid.rows(), grid.cols(), cell_size);

    loop {
        for input in pending_input() {
            match input.context("failed to read terminal input")? {
                InputEvent::Quit => {
                    info!(moves = session.moves(), "quit before reaching the goal");
                    return Ok(());
                }
                InputEvent::Move(dir) => {
                    if session.try_move(dir) == MoveOutcome::Blocked {
                        debug!(?dir, player = ?session.player(), "move blocked");
                    }
                }
            }
        }

        draw_maze(&mut canvas, session, cell_size).context("failed to draw frame")?;

        if session.check_win() {
            announce_win(&mut canvas)?;
            return Ok(());
        }

        thread::sleep(frame_delay);
    }
}
