//! Vim-style key notation
//!
//! `j`, `G` (shift), `<C-d>` (ctrl), `<S-Tab>`, `<CR>`, `<Space>`, and
//! doubled-letter sequences such as `gg`.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use scrollfx_core::config::KeymapConfig;
use tracing::warn;

use crate::input::Action;

/// Key names accepted inside `<...>`, compared case-insensitively
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("cr", KeyCode::Enter),
    ("enter", KeyCode::Enter),
    ("return", KeyCode::Enter),
    ("esc", KeyCode::Esc),
    ("tab", KeyCode::Tab),
    ("backtab", KeyCode::BackTab),
    ("space", KeyCode::Char(' ')),
    ("bs", KeyCode::Backspace),
    ("up", KeyCode::Up),
    ("down", KeyCode::Down),
    ("left", KeyCode::Left),
    ("right", KeyCode::Right),
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
    ("pageup", KeyCode::PageUp),
    ("pagedown", KeyCode::PageDown),
];

/// A key code with its modifiers, as crossterm reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Parse one key in Vim notation; `None` for anything unrecognised
    pub fn parse(notation: &str) -> Option<Self> {
        let notation = notation.trim();
        if let Some(inner) = notation
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .filter(|inner| !inner.is_empty())
        {
            return Self::parse_bracketed(inner);
        }

        let c = single_char(notation)?;
        let modifiers = if c.is_ascii_uppercase() {
            KeyModifiers::SHIFT
        } else {
            KeyModifiers::NONE
        };
        Some(Self::new(KeyCode::Char(c), modifiers))
    }

    fn parse_bracketed(inner: &str) -> Option<Self> {
        let (modifiers, name) = match inner.split_once('-') {
            Some(("C", name)) | Some(("c", name)) => (KeyModifiers::CONTROL, name),
            Some(("S", name)) | Some(("s", name)) => (KeyModifiers::SHIFT, name),
            _ => (KeyModifiers::NONE, inner),
        };

        let code = NAMED_KEYS
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, code)| *code)
            .or_else(|| single_char(name).map(|c| KeyCode::Char(c.to_ascii_lowercase())))?;

        // terminals report Shift+Tab as BackTab
        let code = match (modifiers, code) {
            (KeyModifiers::SHIFT, KeyCode::Tab) => KeyCode::BackTab,
            (_, code) => code,
        };
        Some(Self::new(code, modifiers))
    }
}

impl From<KeyEvent> for KeyBinding {
    fn from(key: KeyEvent) -> Self {
        Self::new(key.code, key.modifiers)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Doubled-letter sequence like `gg`
fn parse_sequence(notation: &str) -> Option<char> {
    let mut chars = notation.trim().chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(a), Some(b), None) if a == b && a.is_ascii_lowercase() => Some(a),
        _ => None,
    }
}

/// Key → action lookup built from `[keymap]`
pub struct Keymap {
    keys: HashMap<KeyBinding, Action>,
    sequences: HashMap<char, Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeymapConfig::default())
    }
}

impl Keymap {
    pub fn from_config(config: &KeymapConfig) -> Self {
        let entries = [
            (&config.quit, Action::Quit),
            (&config.scroll_down, Action::ScrollDown),
            (&config.scroll_up, Action::ScrollUp),
            (&config.scroll_half_down, Action::ScrollHalfPageDown),
            (&config.scroll_half_up, Action::ScrollHalfPageUp),
            (&config.scroll_page_down, Action::ScrollPageDown),
            (&config.scroll_page_up, Action::ScrollPageUp),
            (&config.jump_to_top, Action::JumpToTop),
            (&config.jump_to_bottom, Action::JumpToBottom),
            (&config.next_trigger, Action::NextTrigger),
            (&config.prev_trigger, Action::PrevTrigger),
            (&config.scroll_to_trigger, Action::ScrollToTrigger),
            (&config.toggle_pause, Action::TogglePause),
            (&config.step_frame, Action::StepFrame),
            (&config.play_script, Action::PlayScript),
            (&config.refresh, Action::Refresh),
            (&config.clear_log, Action::ClearLog),
        ];

        let mut keymap = Self {
            keys: HashMap::new(),
            sequences: HashMap::new(),
        };
        for (notation, action) in entries {
            keymap.bind(notation, action);
        }

        // fixed fallbacks; config bindings win
        keymap
            .keys
            .insert(KeyBinding::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
        for (code, action) in [
            (KeyCode::Down, Action::ScrollDown),
            (KeyCode::Up, Action::ScrollUp),
            (KeyCode::PageDown, Action::ScrollPageDown),
            (KeyCode::PageUp, Action::ScrollPageUp),
        ] {
            keymap.keys.entry(KeyBinding::plain(code)).or_insert(action);
        }
        keymap
    }

    fn bind(&mut self, notation: &str, action: Action) {
        if let Some(c) = parse_sequence(notation) {
            self.sequences.insert(c, action);
            return;
        }
        let Some(binding) = KeyBinding::parse(notation) else {
            warn!("Ignoring unparseable key binding {:?} for {:?}", notation, action);
            return;
        };
        match self.keys.get(&binding) {
            Some(existing) => warn!(
                "{:?} is already bound to {:?}; ignoring it for {:?}",
                notation, existing, action
            ),
            None => {
                self.keys.insert(binding, action);
            }
        }
    }

    pub fn get(&self, binding: &KeyBinding) -> Option<Action> {
        self.keys.get(binding).copied()
    }

    /// Action completed by pressing `c` twice
    pub fn sequence(&self, c: char) -> Option<Action> {
        self.sequences.get(&c).copied()
    }

    /// Whether `binding` is the first key of a sequence
    pub fn starts_sequence(&self, binding: &KeyBinding) -> Option<char> {
        match (binding.code, binding.modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE) if self.sequences.contains_key(&c) => Some(c),
            _ => None,
        }
    }
}
