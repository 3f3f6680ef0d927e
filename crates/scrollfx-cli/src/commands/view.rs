use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use scrollfx_core::AppConfig;
use scrollfx_tui::{
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    widgets::{EventLogWidget, StatusBarWidget, TriggerDetailWidget, TriggerListWidget},
    App,
};

pub fn run(config: Arc<AppConfig>, path: &Path) -> Result<()> {
    let runtime = super::load_runtime(&config, path)?;
    let mut app = App::new(runtime, config.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        SetTitle(format!("scrollfx: {}", app.runtime.name))
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &config);

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, config: &AppConfig) -> Result<()> {
    let mut events = EventHandler::new(config.ui.tick_rate_ms);

    while !app.should_quit {
        terminal.draw(|frame| draw(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => {
                let action = handle_key_event(key, app);
                app.handle_action(action);
            }
            // the page keeps its own geometry; only the layout changes
            AppEvent::Resize(_, _) => {}
            AppEvent::Frame(elapsed_ms) => app.tick(elapsed_ms),
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[0]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[0]);

    TriggerListWidget::render(frame, left[0], app);
    EventLogWidget::render(frame, left[1], app);
    TriggerDetailWidget::render(frame, columns[1], app);
    StatusBarWidget::render(frame, rows[1], app);
}
