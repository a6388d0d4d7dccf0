use crate::maze::Dir;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Dir),
    Quit,
}

/// Maps a key press to a command. Releases and unknown keys map to nothing.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => {}
        KeyEventKind::Release => return None,
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Command::Move(Dir::Up)),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::Move(Dir::Down)),
        KeyCode::Left | KeyCode::Char('h') => Some(Command::Move(Dir::Left)),
        KeyCode::Right | KeyCode::Char('l') => Some(Command::Move(Dir::Right)),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Command::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

pub trait InputSource {
    /// Next pending command, or `None` once nothing is queued for this frame.
    fn poll(&mut self) -> io::Result<Option<Command>>;
}

/// Non-blocking reader over the crossterm event queue.
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn poll(&mut self) -> io::Result<Option<Command>> {
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if let Some(command) = command_for(key) {
                    return Ok(Some(command));
                }
            }
        }
        Ok(None)
    }
}
