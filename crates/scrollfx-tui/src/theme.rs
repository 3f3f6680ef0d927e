use ratatui::style::Color;
use tracing::warn;

/// Runtime theme with configurable colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey1: Color,
    pub grey2: Color,

    // Palette colors
    pub red: Color,
    pub orange: Color,
    pub yellow: Color,
    pub green: Color,
    pub aqua: Color,
    pub blue: Color,

    // Semantic colors
    pub selection: Color,
    pub active: Color,
    pub idle: Color,
    pub enter: Color,
    pub leave: Color,
    pub leave_back: Color,
    pub fault: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::gruvbox()
    }
}

impl Theme {
    /// Look up a built-in theme, falling back to gruvbox
    pub fn named(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "gruvbox" | "gruvbox-dark" => Self::gruvbox(),
            "nord" => Self::nord(),
            "dracula" => Self::dracula(),
            other => {
                warn!("Unknown theme '{}', using gruvbox", other);
                Self::gruvbox()
            }
        }
    }

    pub fn gruvbox() -> Self {
        let green = Color::Rgb(0xa9, 0xb6, 0x65);
        let red = Color::Rgb(0xea, 0x69, 0x62);
        let orange = Color::Rgb(0xe7, 0x8a, 0x4e);
        let blue = Color::Rgb(0x7d, 0xae, 0xa3);
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            red,
            orange,
            yellow: Color::Rgb(0xd8, 0xa6, 0x57),
            green,
            aqua: Color::Rgb(0x89, 0xb4, 0x82),
            blue,
            selection: Color::Rgb(0x45, 0x40, 0x3d),
            active: green,
            idle: Color::Rgb(0x7c, 0x6f, 0x64),
            enter: green,
            leave: orange,
            leave_back: blue,
            fault: red,
        }
    }

    pub fn nord() -> Self {
        let green = Color::Rgb(0xa3, 0xbe, 0x8c);
        let red = Color::Rgb(0xbf, 0x61, 0x6a);
        let orange = Color::Rgb(0xd0, 0x87, 0x70);
        let blue = Color::Rgb(0x81, 0xa1, 0xc1);
        Self {
            bg0: Color::Rgb(0x2e, 0x34, 0x40),
            bg1: Color::Rgb(0x3b, 0x42, 0x52),
            bg2: Color::Rgb(0x43, 0x4c, 0x5e),
            fg0: Color::Rgb(0xec, 0xef, 0xf4),
            grey1: Color::Rgb(0x61, 0x6e, 0x88),
            grey2: Color::Rgb(0xd8, 0xde, 0xe9),
            red,
            orange,
            yellow: Color::Rgb(0xeb, 0xcb, 0x8b),
            green,
            aqua: Color::Rgb(0x88, 0xc0, 0xd0),
            blue,
            selection: Color::Rgb(0x43, 0x4c, 0x5e),
            active: green,
            idle: Color::Rgb(0x4c, 0x56, 0x6a),
            enter: green,
            leave: orange,
            leave_back: blue,
            fault: red,
        }
    }

    pub fn dracula() -> Self {
        let green = Color::Rgb(0x50, 0xfa, 0x7b);
        let red = Color::Rgb(0xff, 0x55, 0x55);
        let orange = Color::Rgb(0xff, 0xb8, 0x6c);
        let blue = Color::Rgb(0xbd, 0x93, 0xf9);
        Self {
            bg0: Color::Rgb(0x28, 0x2a, 0x36),
            bg1: Color::Rgb(0x34, 0x37, 0x46),
            bg2: Color::Rgb(0x44, 0x47, 0x5a),
            fg0: Color::Rgb(0xf8, 0xf8, 0xf2),
            grey1: Color::Rgb(0x62, 0x72, 0xa4),
            grey2: Color::Rgb(0xbf, 0xbf, 0xbf),
            red,
            orange,
            yellow: Color::Rgb(0xf1, 0xfa, 0x8c),
            green,
            aqua: Color::Rgb(0x8b, 0xe9, 0xfd),
            blue,
            selection: Color::Rgb(0x44, 0x47, 0x5a),
            active: green,
            idle: Color::Rgb(0x62, 0x72, 0xa4),
            enter: green,
            leave: orange,
            leave_back: blue,
            fault: red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_themes() {
        assert_eq!(Theme::named("Nord").bg0, Theme::nord().bg0);
        assert_eq!(Theme::named("gruvbox-dark").bg0, Theme::gruvbox().bg0);
        assert_eq!(Theme::named("solarized").bg0, Theme::gruvbox().bg0);
    }
}
