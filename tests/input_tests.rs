use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use tetramaster::game::Command;
use tetramaster::input::{decode, decode_code, Action};

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn arrows_and_letters_map_to_commands() {
    let cases = [
        (KeyCode::Left, Command::MoveLeft),
        (KeyCode::Right, Command::MoveRight),
        (KeyCode::Down, Command::SoftDrop),
        (KeyCode::Char(' '), Command::HardDrop),
        (KeyCode::Up, Command::RotateCw),
        (KeyCode::Char('x'), Command::RotateCw),
        (KeyCode::Char('Z'), Command::RotateCcw),
        (KeyCode::Char('r'), Command::Restart),
    ];

    for (code, command) in cases {
        assert_eq!(decode(press(code)), Some(Action::Game(command)), "{code:?}");
    }
}

#[test]
fn quit_keys() {
    assert_eq!(decode_code(KeyCode::Esc), Some(Action::Quit));
    assert_eq!(decode_code(KeyCode::Char('q')), Some(Action::Quit));
}

#[test]
fn unbound_keys_are_ignored() {
    assert_eq!(decode(press(KeyCode::Char('p'))), None);
    assert_eq!(decode(press(KeyCode::Tab)), None);
    assert_eq!(decode(press(KeyCode::F(5))), None);
}

#[test]
fn key_release_is_ignored() {
    let release = KeyEvent::new_with_kind(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release);

    assert_eq!(decode(release), None);
}
