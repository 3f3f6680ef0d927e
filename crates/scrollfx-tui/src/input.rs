use crossterm::event::KeyEvent;

use crate::app::App;
use crate::keymap::KeyBinding;

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    ScrollPageDown,
    ScrollPageUp,
    JumpToTop,
    JumpToBottom,
    /// First key of a two-key sequence
    Pending(char),
    NextTrigger,
    PrevTrigger,
    ScrollToTrigger,
    TogglePause,
    StepFrame,
    PlayScript,
    Refresh,
    ClearLog,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    let binding = KeyBinding::from(key);

    if let Some(c) = app.keymap.starts_sequence(&binding) {
        if app.pending_key == Some(c) {
            if let Some(action) = app.keymap.sequence(c) {
                return action;
            }
        }
        return Action::Pending(c);
    }

    app.keymap.get(&binding).unwrap_or(Action::None)
}
