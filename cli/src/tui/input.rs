//! Keyboard mapping.
//!
//! Each view mode owns the keyboard: a key only means something in the mode
//! that is active, and modal modes ignore everything but their own keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use portpatrol_core::ViewMode;

/// What the operator asked for, independent of list contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Quit,
    MoveUp,
    MoveDown,
    JumpTop,
    JumpBottom,
    StartSearch,
    AppendSearch(char),
    BackspaceSearch,
    /// Enter in the search box: keep the query, back to the list.
    EndSearch,
    /// Esc in the search box: clear a query, or leave when already empty.
    CancelSearch,
    /// Esc in the list: drop an active filter.
    ClearFilter,
    OpenKillConfirm,
    ConfirmKill,
    CancelKill,
    ToggleForce,
    /// Force kill the selection without confirmation.
    ForceKill,
    Refresh,
    ToggleSortField,
    ToggleSortOrder,
    OpenHelp,
    OpenDetails,
    CloseModal,
}

/// Map a key press to an intent for the given mode.
pub fn map_key(mode: ViewMode, key: KeyEvent) -> Option<Intent> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Intent::Quit);
    }

    match mode {
        ViewMode::Search => map_search(key),
        ViewMode::KillConfirm => map_kill_confirm(key),
        ViewMode::Help => map_close(key, '?'),
        ViewMode::Details => map_close(key, 'i'),
        ViewMode::List => map_list(key),
    }
}

/// The character of a key pressed without Ctrl or Alt. Shift is allowed.
fn plain_char(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => Some(c),
        _ => None,
    }
}

fn map_search(key: KeyEvent) -> Option<Intent> {
    match key.code {
        KeyCode::Esc => Some(Intent::CancelSearch),
        KeyCode::Enter => Some(Intent::EndSearch),
        KeyCode::Backspace | KeyCode::Delete => Some(Intent::BackspaceSearch),
        _ => plain_char(key).map(Intent::AppendSearch),
    }
}

fn map_kill_confirm(key: KeyEvent) -> Option<Intent> {
    match key.code {
        KeyCode::Enter => return Some(Intent::ConfirmKill),
        KeyCode::Esc => return Some(Intent::CancelKill),
        _ => {}
    }
    match plain_char(key)? {
        'y' => Some(Intent::ConfirmKill),
        'n' => Some(Intent::CancelKill),
        'f' => Some(Intent::ToggleForce),
        _ => None,
    }
}

fn map_close(key: KeyEvent, toggle: char) -> Option<Intent> {
    if key.code == KeyCode::Esc {
        return Some(Intent::CloseModal);
    }
    match plain_char(key)? {
        'q' => Some(Intent::CloseModal),
        c if c == toggle => Some(Intent::CloseModal),
        _ => None,
    }
}

fn map_list(key: KeyEvent) -> Option<Intent> {
    match key.code {
        KeyCode::Esc => return Some(Intent::ClearFilter),
        KeyCode::Enter => return Some(Intent::OpenKillConfirm),
        KeyCode::Down => return Some(Intent::MoveDown),
        KeyCode::Up => return Some(Intent::MoveUp),
        _ => {}
    }

    let intent = match plain_char(key)? {
        'q' => Intent::Quit,
        '/' | 'f' => Intent::StartSearch,
        'j' => Intent::MoveDown,
        'k' => Intent::MoveUp,
        'g' => Intent::JumpTop,
        'G' => Intent::JumpBottom,
        'K' => Intent::ForceKill,
        'r' => Intent::Refresh,
        's' => Intent::ToggleSortField,
        'o' => Intent::ToggleSortOrder,
        '?' => Intent::OpenHelp,
        'i' => Intent::OpenDetails,
        _ => return None,
    };
    Some(intent)
}
