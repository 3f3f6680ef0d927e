use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Mode};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let mode_str = match app.mode {
            Mode::Live => "PLAYING",
            Mode::Paused => "PAUSED",
            Mode::Script => "SCRIPT",
        };

        let velocity = app.last_frame.as_ref().map(|f| f.velocity_y).unwrap_or(0.0);

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {} | {}", mode_str, msg)
        } else {
            format!(
                " {} | {} | y: {:.0} | v: {:.2} | frame: {} | {:.0}ms",
                mode_str,
                app.runtime.name,
                app.scroll_y(),
                velocity,
                app.runtime.engine.frame_count(),
                app.runtime.clock()
            )
        };

        let help_hint = " q:quit j/k:scroll Tab:trigger Enter:go Space:pause p:script ";
        let padding_len = area
            .width
            .saturating_sub(status_text.chars().count() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
