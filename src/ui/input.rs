use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::dispatcher::Action;

/// Maps a key event to an action. Releases and bare modifier keys map to
/// nothing; repeats map like presses. Any key without a binding advances one
/// frame.
pub fn action_for_key(key: &KeyEvent, large_step: usize) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('1') => Action::MarkStart,
        KeyCode::Char('2') => Action::MarkEnd,
        KeyCode::Char('r') | KeyCode::Left => Action::Rewind(1),
        KeyCode::Char('h') => Action::Rewind(large_step),
        KeyCode::Char('l') => Action::Advance(large_step),
        KeyCode::Modifier(_) | KeyCode::Null => return None,
        _ => Action::Advance(1),
    };
    Some(action)
}
