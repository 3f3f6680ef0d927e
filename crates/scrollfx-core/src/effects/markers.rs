//! Debug markers
//!
//! Three nodes per trigger: a dot on the right edge of the viewport showing
//! progress, and lines at the trigger's start and end offsets.

use tracing::debug;

use crate::engine::ScrollEngine;
use crate::frame::FrameSample;
use crate::host::{Host, TargetId};
use crate::trigger::{TriggerEngine, TriggerId, TriggerKind};
use crate::{Error, Result};

use super::px;

const ACTIVE_COLOR: &str = "rgba(0, 255, 0, 0.75)";
const IDLE_COLOR: &str = "rgba(255, 0, 0, 0.5)";

#[derive(Debug)]
pub struct Markers {
    trigger: TriggerId,
    dot: TargetId,
    start_line: TargetId,
    end_line: TargetId,
}

impl Markers {
    fn create(trigger: TriggerId, host: &mut dyn Host) -> Result<Self> {
        let dot = host.create_placeholder(10.0, 10.0);
        host.append_to_root(&dot)?;
        host.add_class(&dot, "scrollfx-marker")?;
        for (property, value) in [
            ("position", "fixed"),
            ("right", "10px"),
            ("width", "10px"),
            ("height", "10px"),
            ("border-radius", "50%"),
            ("background-color", IDLE_COLOR),
            ("z-index", "9999"),
            ("pointer-events", "none"),
        ] {
            host.set_style(&dot, property, value)?;
        }

        let start_line = line(host, "scrollfx-start-marker", "green")?;
        let end_line = line(host, "scrollfx-end-marker", "red")?;
        Ok(Self {
            trigger,
            dot,
            start_line,
            end_line,
        })
    }

    pub fn trigger(&self) -> TriggerId {
        self.trigger
    }

    /// Progress dot, start line and end line
    pub fn nodes(&self) -> [&TargetId; 3] {
        [&self.dot, &self.start_line, &self.end_line]
    }

    /// Move the nodes to match the trigger; a removed trigger leaves them as they are
    pub fn update(&self, triggers: &TriggerEngine, sample: &FrameSample, host: &mut dyn Host) -> Result<()> {
        let trigger = match triggers.get(self.trigger) {
            Some(trigger) => trigger,
            None => return Ok(()),
        };

        let progress = trigger.progress();
        host.set_style(&self.dot, "top", &px(sample.viewport_height * progress))?;
        let color = if trigger.is_active() { ACTIVE_COLOR } else { IDLE_COLOR };
        host.set_style(&self.dot, "background-color", color)?;

        let (start, end) = match trigger.kind() {
            TriggerKind::Element { .. } => match trigger.geometry() {
                Some(rect) => (rect.top, rect.bottom()),
                None => return Ok(()),
            },
            TriggerKind::ScrollRange { start, end } => (start.resolve(&*host), end.resolve(&*host)),
        };
        host.set_style(&self.start_line, "top", &px(start - sample.scroll_y))?;
        host.set_style(&self.end_line, "top", &px(end - sample.scroll_y))?;
        Ok(())
    }

    pub fn destroy(self, host: &mut dyn Host) -> Result<()> {
        for node in [&self.dot, &self.start_line, &self.end_line] {
            host.remove_node(node)?;
        }
        Ok(())
    }
}

fn line(host: &mut dyn Host, class: &str, color: &str) -> Result<TargetId> {
    let node = host.create_placeholder(0.0, 2.0);
    host.append_to_root(&node)?;
    host.add_class(&node, class)?;
    for (property, value) in [
        ("position", "absolute"),
        ("top", "0"),
        ("left", "0"),
        ("width", "100%"),
        ("height", "2px"),
        ("background-color", color),
        ("pointer-events", "none"),
    ] {
        host.set_style(&node, property, value)?;
    }
    Ok(node)
}

impl ScrollEngine {
    /// Show debug markers for `trigger`; does nothing if it already has them
    pub fn create_markers(&mut self, trigger: TriggerId, host: &mut dyn Host) -> Result<()> {
        if self.trigger(trigger).is_none() {
            return Err(Error::TriggerNotFound(trigger.to_string()));
        }
        if self.has_markers(trigger) {
            return Ok(());
        }

        let markers = Markers::create(trigger, host)?;
        let (scroll_x, scroll_y) = host.scroll_offset();
        let (viewport_width, viewport_height) = host.viewport_size();
        let sample = FrameSample {
            scroll_x,
            scroll_y,
            viewport_width,
            viewport_height,
            ..Default::default()
        };
        markers.update(self.trigger_engine(), &sample, host)?;
        debug!("Created markers for trigger {}", trigger);
        self.add_markers(markers);
        Ok(())
    }

    /// Remove the markers of `trigger`; `false` if it had none
    pub fn destroy_markers(&mut self, trigger: TriggerId, host: &mut dyn Host) -> Result<bool> {
        let markers = self.markers_mut();
        let index = match markers.iter().position(|m| m.trigger() == trigger) {
            Some(index) => index,
            None => return Ok(false),
        };
        markers.remove(index).destroy(host)?;
        debug!("Removed markers for trigger {}", trigger);
        Ok(true)
    }
}
