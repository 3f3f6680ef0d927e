use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// What woke the viewer loop
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// A frame is due; carries milliseconds since the previous one
    Frame(f64),
}

/// Multiplexes terminal input with a fixed frame cadence.
///
/// Input never delays frames: polling only waits until the next frame
/// deadline, so a burst of key presses still yields frames on schedule.
pub struct EventHandler {
    frame_interval: Duration,
    last_frame: Instant,
}

impl EventHandler {
    pub fn new(frame_ms: u64) -> Self {
        Self {
            frame_interval: Duration::from_millis(frame_ms.max(1)),
            last_frame: Instant::now(),
        }
    }

    pub fn next(&mut self) -> Result<AppEvent> {
        loop {
            let since = self.last_frame.elapsed();
            if since >= self.frame_interval {
                self.last_frame = Instant::now();
                return Ok(AppEvent::Frame(since.as_secs_f64() * 1000.0));
            }

            if !event::poll(self.frame_interval - since)? {
                continue;
            }
            match event::read()? {
                // release/repeat events arrive on some platforms
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(AppEvent::Key(key))
                }
                Event::Resize(w, h) => return Ok(AppEvent::Resize(w, h)),
                _ => {}
            }
        }
    }
}
