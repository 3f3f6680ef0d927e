use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use scrollfx_core::TriggerEventKind;

use crate::app::{App, LogKind};

pub struct EventLogWidget;

impl EventLogWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let block = Block::default()
            .title(" Events ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.grey1))
            .style(Style::default().bg(theme.bg0));

        // newest entries at the bottom, keep what fits
        let visible = area.height.saturating_sub(2) as usize;
        let skip = app.log.len().saturating_sub(visible);

        let lines: Vec<Line> = app
            .log
            .iter()
            .skip(skip)
            .map(|entry| {
                let color = match entry.kind {
                    LogKind::Event(TriggerEventKind::Enter) => theme.enter,
                    LogKind::Event(TriggerEventKind::Leave) => theme.leave,
                    LogKind::Event(TriggerEventKind::LeaveBack) => theme.leave_back,
                    LogKind::Fault => theme.fault,
                    LogKind::Info => theme.grey2,
                };
                Line::from(vec![
                    Span::styled(
                        entry.time.format("%H:%M:%S%.3f ").to_string(),
                        Style::default().fg(theme.grey1),
                    ),
                    Span::styled(
                        format!("#{:<6}", entry.frame),
                        Style::default().fg(theme.aqua),
                    ),
                    Span::styled(entry.message.clone(), Style::default().fg(color)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
