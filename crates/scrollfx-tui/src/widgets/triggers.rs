use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::App;

const BAR_WIDTH: usize = 20;

pub struct TriggerListWidget;

impl TriggerListWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let snapshot = app.runtime.snapshot();

        let block = Block::default()
            .title(format!(" Triggers ({}) ", snapshot.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.grey1))
            .style(Style::default().bg(theme.bg0));

        let items: Vec<ListItem> = snapshot
            .iter()
            .map(|trigger| {
                let color = if trigger.active { theme.active } else { theme.idle };
                let filled = (trigger.progress * BAR_WIDTH as f64).round() as usize;
                let filled = filled.min(BAR_WIDTH);
                let marker = if trigger.active { "●" } else { "○" };

                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", marker), Style::default().fg(color)),
                    Span::styled(
                        format!("{:<24}", trigger.name),
                        Style::default().fg(theme.fg0),
                    ),
                    Span::styled("█".repeat(filled), Style::default().fg(color)),
                    Span::styled(
                        "░".repeat(BAR_WIDTH - filled),
                        Style::default().fg(theme.bg2),
                    ),
                    Span::styled(
                        format!(" {:>4.0}%", trigger.progress * 100.0),
                        Style::default().fg(theme.grey2),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(theme.selection)
                .add_modifier(Modifier::BOLD),
        );

        let mut state = ListState::default();
        if !snapshot.is_empty() {
            state.select(Some(app.selected_trigger.min(snapshot.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}
