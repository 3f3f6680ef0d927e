use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Local};
use scrollfx_core::effects::ScrollTo;
use scrollfx_core::scenario::FrameRecord;
use scrollfx_core::{AppConfig, ManualFrames, ScenarioRuntime, TriggerEventKind, Viewport};
use tracing::{debug, warn};

use crate::input::Action;
use crate::keymap::Keymap;
use crate::theme::Theme;

/// How frames are being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One frame per tick at whatever offset the viewer scrolled to
    Live,
    /// Frame loop stopped; frames only advance on demand
    Paused,
    /// Replaying the scenario's scripted offsets
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Event(TriggerEventKind),
    Fault,
    Info,
}

/// One line of the event log
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: DateTime<Local>,
    pub frame: u64,
    pub kind: LogKind,
    pub message: String,
}

/// Viewer state around a running scenario
pub struct App {
    pub runtime: ScenarioRuntime,
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    pub keymap: Keymap,
    frames: ManualFrames,
    /// Index into the trigger snapshot
    pub selected_trigger: usize,
    pub mode: Mode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// For multi-key sequences like 'gg'
    pub pending_key: Option<char>,
    pub log: VecDeque<LogEntry>,
    script: VecDeque<f64>,
    pub last_frame: Option<FrameRecord>,
}

impl App {
    pub fn new(mut runtime: ScenarioRuntime, config: Arc<AppConfig>) -> Self {
        let mut frames = ManualFrames::new();
        runtime.engine.start(&mut frames);
        let mut app = Self {
            theme: Theme::named(&config.ui.theme),
            keymap: Keymap::from_config(&config.keymap),
            runtime,
            config,
            frames,
            selected_trigger: 0,
            mode: Mode::Live,
            should_quit: false,
            status_message: None,
            pending_key: None,
            log: VecDeque::new(),
            script: VecDeque::new(),
            last_frame: None,
        };
        let name = app.runtime.name.clone();
        app.push_log(LogKind::Info, format!("Loaded scenario `{}`", name));
        app
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    fn push_log(&mut self, kind: LogKind, message: String) {
        let capacity = self.config.ui.event_log_size.max(1);
        while self.log.len() >= capacity {
            self.log.pop_front();
        }
        self.log.push_back(LogEntry {
            time: Local::now(),
            frame: self.runtime.engine.frame_count(),
            kind,
            message,
        });
    }

    fn observe(&mut self, record: FrameRecord) {
        for event in &record.events {
            self.push_log(
                LogKind::Event(event.kind),
                format!("{} {} at {:.2}", event.trigger, event.kind, event.progress),
            );
        }
        for fault in &record.faults {
            self.push_log(LogKind::Fault, fault.clone());
        }
        self.last_frame = Some(record);
    }

    /// Advance the simulation by one UI tick
    pub fn tick(&mut self, elapsed_ms: f64) {
        if self.mode == Mode::Paused {
            return;
        }
        if let Some(y) = self.script.pop_front() {
            let (x, _) = self.runtime.page.scroll_offset();
            self.runtime.page.set_scroll_offset(x, y);
        }

        for token in self.frames.take_due() {
            if let Some(record) = self.runtime.on_frame(token, elapsed_ms, &mut self.frames) {
                self.observe(record);
            }
        }

        if self.mode == Mode::Script && self.script.is_empty() {
            self.mode = Mode::Live;
            self.set_status("Script finished");
        }
    }

    pub fn scroll_y(&self) -> f64 {
        self.runtime.page.scroll_offset().1
    }

    fn max_scroll(&self) -> f64 {
        let (_, viewport) = self.runtime.page.viewport_size();
        let (_, document) = self.runtime.page.document_size();
        (document - viewport).max(0.0)
    }

    /// Smooth-scroll to `y`, clamped to the document
    pub fn scroll_to(&mut self, y: f64) {
        let target = y.clamp(0.0, self.max_scroll());
        let request = ScrollTo::offset(target).duration(self.config.ui.scroll_duration_ms);
        match self.runtime.engine.scroll_to(request, &mut self.runtime.page) {
            Ok(handle) => debug!("Viewer scroll {} to {}", handle, target),
            Err(e) => {
                warn!("Scroll failed: {}", e);
                self.set_status(format!("Scroll failed: {}", e));
            }
        }
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.scroll_y() + delta);
    }

    fn viewport_height(&self) -> f64 {
        self.runtime.page.viewport_size().1
    }

    pub fn trigger_count(&self) -> usize {
        self.runtime.engine.triggers().count()
    }

    pub fn next_trigger(&mut self) {
        let count = self.trigger_count();
        if count > 0 {
            self.selected_trigger = (self.selected_trigger + 1) % count;
        }
    }

    pub fn prev_trigger(&mut self) {
        let count = self.trigger_count();
        if count > 0 {
            self.selected_trigger = (self.selected_trigger + count - 1) % count;
        }
    }

    /// Scroll to where the focused trigger starts
    pub fn scroll_to_trigger(&mut self) {
        let snapshot = self.runtime.snapshot();
        match snapshot.get(self.selected_trigger) {
            Some(trigger) => {
                let (name, start) = (trigger.name.clone(), trigger.start);
                self.set_status(format!("Scrolling to {}", name));
                self.scroll_to(start);
            }
            None => self.set_status("No triggers"),
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.mode == Mode::Paused {
            self.runtime.engine.start(&mut self.frames);
            self.mode = Mode::Live;
            self.set_status("Resumed");
        } else {
            self.runtime.engine.stop(&mut self.frames);
            self.script.clear();
            self.mode = Mode::Paused;
            self.set_status("Paused");
        }
    }

    /// Run exactly one frame while paused
    pub fn step_frame(&mut self) {
        if self.mode != Mode::Paused {
            self.set_status("Pause first to step frames");
            return;
        }
        let record = self.runtime.tick(self.runtime.script.frame_ms);
        self.observe(record);
    }

    pub fn play_script(&mut self) {
        if self.runtime.script.offsets.is_empty() {
            self.set_status("Scenario has no script");
            return;
        }
        if self.mode == Mode::Paused {
            self.runtime.engine.start(&mut self.frames);
        }
        self.script = self.runtime.script.offsets.iter().copied().collect();
        self.mode = Mode::Script;
        let count = self.script.len();
        self.push_log(LogKind::Info, format!("Playing script ({} offsets)", count));
    }

    pub fn refresh(&mut self) {
        let faults = self.runtime.engine.refresh(&self.runtime.page);
        let count = faults.len();
        for fault in faults {
            self.push_log(LogKind::Fault, fault.to_string());
        }
        self.set_status(format!("Refreshed geometry ({} faults)", count));
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn handle_action(&mut self, action: Action) {
        if !matches!(action, Action::Pending(_)) {
            self.pending_key = None;
        }
        if action != Action::None {
            self.clear_status();
        }

        let step = self.config.ui.scroll_step;
        let half = self.viewport_height() / 2.0;
        let page = self.viewport_height();
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.scroll_by(step),
            Action::ScrollUp => self.scroll_by(-step),
            Action::ScrollHalfPageDown => self.scroll_by(half),
            Action::ScrollHalfPageUp => self.scroll_by(-half),
            Action::ScrollPageDown => self.scroll_by(page),
            Action::ScrollPageUp => self.scroll_by(-page),
            Action::JumpToTop => self.scroll_to(0.0),
            Action::JumpToBottom => self.scroll_to(self.max_scroll()),
            Action::Pending(c) => self.pending_key = Some(c),
            Action::NextTrigger => self.next_trigger(),
            Action::PrevTrigger => self.prev_trigger(),
            Action::ScrollToTrigger => self.scroll_to_trigger(),
            Action::TogglePause => self.toggle_pause(),
            Action::StepFrame => self.step_frame(),
            Action::PlayScript => self.play_script(),
            Action::Refresh => self.refresh(),
            Action::ClearLog => self.clear_log(),
            Action::None => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use scrollfx_core::Scenario;

    const DEMO: &str = r#"
        name = "demo"

        [viewport]
        document_height = 2000

        [[elements]]
        id = "box"
        top = 1000
        height = 200

        [[triggers]]
        name = "range"
        start = 100
        end = 300

        [[triggers]]
        name = "box"
        element = "box"

        [[animations]]
        target = "box"
        trigger = "range"
        properties.opacity = { from = 0, to = 1 }

        [script]
        offsets = [50, 100, 200, 300, 400]
    "#;

    pub(crate) fn demo_app_with(config: AppConfig) -> App {
        let runtime = Scenario::parse(DEMO)
            .unwrap()
            .build(&config.engine)
            .unwrap();
        App::new(runtime, Arc::new(config))
    }

    pub(crate) fn demo_app() -> App {
        demo_app_with(AppConfig::default())
    }

    fn event_kinds(app: &App) -> Vec<TriggerEventKind> {
        app.log
            .iter()
            .filter_map(|entry| match entry.kind {
                LogKind::Event(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_trigger_navigation_wraps() {
        let mut app = demo_app();
        assert_eq!(app.trigger_count(), 2);

        app.prev_trigger();
        assert_eq!(app.selected_trigger, 1);
        app.next_trigger();
        assert_eq!(app.selected_trigger, 0);
    }

    #[test]
    fn test_script_playback_logs_edges() {
        let mut app = demo_app();
        app.play_script();
        assert_eq!(app.mode, Mode::Script);

        for _ in 0..5 {
            app.tick(16.0);
        }
        assert_eq!(app.mode, Mode::Live);
        assert_eq!(
            event_kinds(&app),
            vec![TriggerEventKind::Enter, TriggerEventKind::Leave]
        );
        assert_eq!(app.scroll_y(), 400.0);
    }

    #[test]
    fn test_log_is_capped() {
        let mut config = AppConfig::default();
        config.ui.event_log_size = 1;
        let mut app = demo_app_with(config);
        app.play_script();
        for _ in 0..5 {
            app.tick(16.0);
        }
        assert_eq!(app.log.len(), 1);
        assert_eq!(event_kinds(&app), vec![TriggerEventKind::Leave]);
    }

    #[test]
    fn test_pause_and_step() {
        let mut app = demo_app();
        app.tick(16.0);
        let frames = app.runtime.engine.frame_count();

        app.handle_action(Action::TogglePause);
        assert_eq!(app.mode, Mode::Paused);
        app.tick(16.0);
        assert_eq!(app.runtime.engine.frame_count(), frames);

        app.handle_action(Action::StepFrame);
        assert_eq!(app.runtime.engine.frame_count(), frames + 1);

        app.handle_action(Action::TogglePause);
        app.tick(16.0);
        assert_eq!(app.runtime.engine.frame_count(), frames + 2);
    }

    #[test]
    fn test_smooth_scroll_settles() {
        let mut app = demo_app();
        app.handle_action(Action::ScrollPageDown);
        for _ in 0..12 {
            app.tick(16.0);
        }
        assert_eq!(app.scroll_y(), 800.0);

        app.handle_action(Action::JumpToBottom);
        for _ in 0..12 {
            app.tick(16.0);
        }
        assert_eq!(app.scroll_y(), 1200.0);
    }

    #[test]
    fn test_pending_key_resets() {
        let mut app = demo_app();
        app.handle_action(Action::Pending('g'));
        assert_eq!(app.pending_key, Some('g'));
        app.handle_action(Action::ScrollDown);
        assert_eq!(app.pending_key, None);
    }
}
