use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

pub struct TriggerDetailWidget;

impl TriggerDetailWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let block = Block::default()
            .title(" Detail ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.grey1))
            .style(Style::default().bg(theme.bg0));

        let label = Style::default().fg(theme.grey2);
        let value = Style::default().fg(theme.fg0);
        let heading = Style::default()
            .fg(theme.yellow)
            .add_modifier(Modifier::BOLD);

        let field = |name: &str, text: String| {
            Line::from(vec![
                Span::styled(format!("{:<10}", name), label),
                Span::styled(text, value),
            ])
        };

        let mut lines = Vec::new();
        let trigger = app.runtime.engine.triggers().nth(app.selected_trigger);
        match trigger {
            Some(trigger) => {
                let (start, end) = trigger.bounds();
                lines.push(Line::from(Span::styled(
                    app.runtime.trigger_name(trigger.id()),
                    heading,
                )));
                lines.push(field("bounds", format!("{:.0} → {:.0}", start, end)));
                lines.push(field("progress", format!("{:.3}", trigger.progress())));
                let state = if trigger.is_active() { "active" } else { "inactive" };
                lines.push(field("state", state.to_string()));

                if let Some(target) = trigger.target() {
                    lines.push(field("target", target.to_string()));
                    if let Some(node) = app.runtime.page.node(target) {
                        let rect = node.rect;
                        lines.push(field(
                            "box",
                            format!(
                                "{:.0},{:.0} {:.0}×{:.0}",
                                rect.left, rect.top, rect.width, rect.height
                            ),
                        ));
                        if !node.classes.is_empty() {
                            lines.push(field("classes", node.classes.join(" ")));
                        }
                        if !node.styles.is_empty() {
                            lines.push(Line::from(""));
                            lines.push(Line::from(Span::styled("Styles", heading)));
                            for (property, text) in &node.styles {
                                lines.push(field(property, text.clone()));
                            }
                        }
                    }
                }
            }
            None => lines.push(Line::from(Span::styled("No triggers", label))),
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}
