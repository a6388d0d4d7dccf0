use crate::canvas::Surface;
use crate::error::GameError;
use crate::input::{Command, InputSource};
use crate::maze::MazeSource;
use crate::session::{MoveOutcome, Session};
use rand::Rng;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&mut self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: u64,
    pub rounds_completed: u32,
}

/// Fixed-rate frame loop: drain input, draw once, present, wait for the next frame.
pub struct GameLoop {
    frame_time: Duration,
    source: MazeSource,
}

impl GameLoop {
    pub fn new(frame_time: Duration, source: MazeSource) -> Self {
        Self { frame_time, source }
    }

    pub fn run(
        &self,
        session: &mut Session,
        surface: &mut impl Surface,
        input: &mut impl InputSource,
        clock: &mut impl Clock,
        rng: &mut impl Rng,
    ) -> Result<LoopSummary, GameError> {
        let mut summary = LoopSummary::default();

        loop {
            let frame_start = clock.now();
            while let Some(command) = input.poll()? {
                let dir = match command {
                    Command::Quit => {
                        info!(
                            frames = summary.frames,
                            rounds = summary.rounds_completed,
                            "quit"
                        );
                        return Ok(summary);
                    }
                    Command::Move(dir) => dir,
                };
                if session.move_player(dir) == MoveOutcome::ReachedGoal {
                    summary.rounds_completed += 1;
                    info!(
                        round = session.round(),
                        moves = session.moves(),
                        "goal reached"
                    );
                    let grid = self.source.build(rng)?;
                    session.reset(grid, rng)?;
                }
            }

            session.render(surface);
            surface.present(&session.status_line())?;
            summary.frames += 1;

            let elapsed = clock.now().duration_since(frame_start);
            if elapsed < self.frame_time {
                clock.sleep(self.frame_time - elapsed);
            } else {
                debug!(?elapsed, "frame overran");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, Rect, TileCanvas};
    use crate::maze::{Dir, Grid, Pos};
    use crossterm::style::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use std::io;

    const FRAME: Duration = Duration::from_millis(16);

    /// Commands grouped per frame; once the script runs out it quits.
    struct Scripted {
        frames: VecDeque<VecDeque<Command>>,
    }

    impl Scripted {
        fn new(frames: Vec<Vec<Command>>) -> Self {
            Self {
                frames: frames.into_iter().map(VecDeque::from).collect(),
            }
        }
    }

    impl InputSource for Scripted {
        fn poll(&mut self) -> io::Result<Option<Command>> {
            let Some(frame) = self.frames.front_mut() else {
                return Ok(Some(Command::Quit));
            };
            match frame.pop_front() {
                Some(command) => Ok(Some(command)),
                None => {
                    self.frames.pop_front();
                    Ok(None)
                }
            }
        }
    }

    struct ManualClock {
        now: Instant,
        slept: Duration,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Instant::now(),
                slept: Duration::ZERO,
            }
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.now
        }

        fn sleep(&mut self, duration: Duration) {
            self.now += duration;
            self.slept += duration;
        }
    }

    #[derive(Default)]
    struct Counting {
        clears: u64,
        presents: u64,
    }

    impl Canvas for Counting {
        fn clear(&mut self) {
            self.clears += 1;
        }

        fn fill_rect(&mut self, _rect: Rect, _color: Color) {}

        fn stroke_rect(&mut self, _rect: Rect, _color: Color) {}

        fn fill_circle(&mut self, _cx: u32, _cy: u32, _radius: u32, _color: Color) {}
    }

    impl Surface for Counting {
        fn present(&mut self, _status: &str) -> io::Result<()> {
            self.presents += 1;
            Ok(())
        }
    }

    fn classic_session(start: Pos, goal: Pos) -> Session {
        Session::with_positions(Grid::classic(), 40, start, goal).unwrap()
    }

    #[test]
    fn renders_exactly_once_per_frame() {
        let mut session = classic_session(Pos::new(1, 1), Pos::new(11, 8));
        let mut surface = Counting::default();
        let mut input = Scripted::new(vec![vec![], vec![Command::Move(Dir::Down)], vec![]]);
        let mut clock = ManualClock::new();
        let mut rng = StdRng::seed_from_u64(1);
        let game = GameLoop::new(FRAME, MazeSource::Literal(Grid::classic()));

        let summary = game
            .run(&mut session, &mut surface, &mut input, &mut clock, &mut rng)
            .unwrap();

        assert_eq!(summary.frames, 3);
        assert_eq!(surface.clears, 3);
        assert_eq!(surface.presents, 3);
        assert_eq!(clock.slept, FRAME * 3);
        assert_eq!(session.player().pos, Pos::new(1, 2));
    }

    #[test]
    fn blocked_moves_are_silent() {
        let mut session = classic_session(Pos::new(1, 1), Pos::new(11, 8));
        let mut surface = TileCanvas::new(13, 10, 40);
        let mut input = Scripted::new(vec![vec![
            Command::Move(Dir::Right),
            Command::Move(Dir::Up),
            Command::Move(Dir::Left),
        ]]);
        let mut clock = ManualClock::new();
        let mut rng = StdRng::seed_from_u64(1);
        let game = GameLoop::new(FRAME, MazeSource::Literal(Grid::classic()));

        let summary = game
            .run(&mut session, &mut surface, &mut input, &mut clock, &mut rng)
            .unwrap();

        assert_eq!(summary.frames, 1);
        assert_eq!(session.player().pos, Pos::new(1, 1));
        assert_eq!(surface.status(), session.status_line());
    }

    #[test]
    fn reaching_goal_starts_a_new_round() {
        let mut session = classic_session(Pos::new(1, 1), Pos::new(1, 2));
        let mut surface = TileCanvas::new(13, 10, 40);
        let mut input = Scripted::new(vec![vec![Command::Move(Dir::Down)]]);
        let mut clock = ManualClock::new();
        let mut rng = StdRng::seed_from_u64(4);
        let game = GameLoop::new(FRAME, MazeSource::Literal(Grid::classic()));

        let summary = game
            .run(&mut session, &mut surface, &mut input, &mut clock, &mut rng)
            .unwrap();

        assert_eq!(summary.rounds_completed, 1);
        assert_eq!(session.round(), 2);
        assert_eq!(session.moves(), 0);
        assert!(surface.status().starts_with("Round: 2"));
    }

    #[test]
    fn generated_source_carves_a_new_maze_each_round() {
        let mut rng = StdRng::seed_from_u64(9);
        let source = MazeSource::Generated {
            width: 3,
            height: 5,
            start: Pos::new(1, 1),
        };
        // a 3x5 maze from (1,1) is a single vertical corridor
        let grid = source.build(&mut rng).unwrap();
        let mut session = Session::with_positions(grid, 40, Pos::new(1, 1), Pos::new(1, 2)).unwrap();
        let mut surface = Counting::default();
        let mut input = Scripted::new(vec![vec![Command::Move(Dir::Down)]]);
        let mut clock = ManualClock::new();
        let game = GameLoop::new(FRAME, source);

        let summary = game
            .run(&mut session, &mut surface, &mut input, &mut clock, &mut rng)
            .unwrap();

        assert_eq!(summary.rounds_completed, 1);
        assert_eq!(session.grid().width(), 3);
        assert_ne!(session.player().pos, session.goal());
    }

    #[test]
    fn quit_stops_before_drawing() {
        let mut session = classic_session(Pos::new(1, 1), Pos::new(11, 8));
        let mut surface = Counting::default();
        let mut input = Scripted::new(vec![]);
        let mut clock = ManualClock::new();
        let mut rng = StdRng::seed_from_u64(1);
        let game = GameLoop::new(FRAME, MazeSource::Literal(Grid::classic()));

        let summary = game
            .run(&mut session, &mut surface, &mut input, &mut clock, &mut rng)
            .unwrap();

        assert_eq!(summary, LoopSummary::default());
        assert_eq!(surface.presents, 0);
    }

    #[test]
    fn zero_frame_time_never_sleeps() {
        let mut session = classic_session(Pos::new(1, 1), Pos::new(11, 8));
        let mut surface = Counting::default();
        let mut input = Scripted::new(vec![vec![]]);
        let mut clock = ManualClock::new();
        let mut rng = StdRng::seed_from_u64(1);
        let game = GameLoop::new(Duration::ZERO, MazeSource::Literal(Grid::classic()));

        game.run(&mut session, &mut surface, &mut input, &mut clock, &mut rng)
            .unwrap();

        assert_eq!(clock.slept, Duration::ZERO);
    }
}
