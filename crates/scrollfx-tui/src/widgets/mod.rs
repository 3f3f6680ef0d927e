mod detail;
mod event_log;
mod status_bar;
mod triggers;

pub use detail::TriggerDetailWidget;
pub use event_log::EventLogWidget;
pub use status_bar::StatusBarWidget;
pub use triggers::TriggerListWidget;
