use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use maze_runner::config::Settings;
use maze_runner::error::GameError;
use maze_runner::game_loop::{GameLoop, LoopSummary, SystemClock};
use maze_runner::input::TerminalInput;
use maze_runner::logging;
use maze_runner::screen::TerminalSurface;
use maze_runner::session::Session;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Stdout};
use std::path::PathBuf;
use tracing::{info, warn};

fn main() -> Result<(), GameError> {
    let log_path = std::env::var_os("MAZE_LOG").map(PathBuf::from);
    logging::init(log_path.as_deref())?;

    let settings = Settings::from_env();
    info!(?settings, "starting");
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let source = settings.maze_source();
    let grid = source.build(&mut rng)?;
    if !grid.is_connected() {
        warn!("maze has path cells that cannot be reached from each other");
    }
    let session = Session::new(grid, settings.tile_size, &mut rng)?;
    let game = GameLoop::new(settings.frame_time(), source);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &game, session, &mut rng);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    let summary = result?;
    println!(
        "Reached the goal {} time(s) over {} frames.",
        summary.rounds_completed, summary.frames
    );
    Ok(())
}

fn run(
    stdout: &mut Stdout,
    game: &GameLoop,
    mut session: Session,
    rng: &mut StdRng,
) -> Result<LoopSummary, GameError> {
    let grid = session.grid();
    let mut surface = TerminalSurface::new(stdout, grid.width(), grid.height(), session.tile_size());
    game.run(
        &mut session,
        &mut surface,
        &mut TerminalInput,
        &mut SystemClock,
        rng,
    )
}
