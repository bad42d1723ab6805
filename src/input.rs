//! Key decoding. Turns terminal key presses into engine commands.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::game::Command;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Game(Command),
    Quit,
}

/// Key help shown next to the board, in display order.
pub const KEY_HELP: [(&str, &str); 8] = [
    ("←", "Move Left"),
    ("→", "Move Right"),
    ("↓", "Soft Drop"),
    ("Space", "Hard Drop"),
    ("↑ / X", "Rotate"),
    ("Z", "Rotate CCW"),
    ("R", "Restart"),
    ("Q / Esc", "Quit"),
];

/// Decodes a key press. Releases, repeats and unbound keys yield `None`.
pub fn decode(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    decode_code(key.code)
}

pub fn decode_code(code: KeyCode) -> Option<Action> {
    let command = match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Some(Action::Quit),
        KeyCode::Left => Command::MoveLeft,
        KeyCode::Right => Command::MoveRight,
        KeyCode::Down => Command::SoftDrop,
        KeyCode::Char(' ') => Command::HardDrop,
        KeyCode::Up | KeyCode::Char('x') | KeyCode::Char('X') => Command::RotateCw,
        KeyCode::Char('z') | KeyCode::Char('Z') => Command::RotateCcw,
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Restart,
        _ => return None,
    };
    Some(Action::Game(command))
}
