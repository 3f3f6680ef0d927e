//! Per-frame data shared by every pass of one tick

use std::fmt;

use serde::Serialize;

use crate::animation::AnimationId;
use crate::effects::scroll_to::{ScrollHandle, ScrollTo};
use crate::effects::timeline::TimelineId;
use crate::host::Host;
use crate::trigger::{TriggerEvent, TriggerId};
use crate::Result;

/// One read of the viewport, taken at the start of a frame.
///
/// Every trigger and animation in the frame observes this sample, even if a
/// callback moves the scroll position mid-pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FrameSample {
    pub frame: u64,
    pub timestamp_ms: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub document_width: f64,
    pub document_height: f64,
}

/// Work run once a delay has elapsed
pub type Deferred = Box<dyn FnOnce(&mut dyn Host) -> Result<()>>;

/// Requests collected from callbacks, applied after the trigger and animation passes
#[derive(Default)]
pub(crate) struct Commands {
    pub scrolls: Vec<(ScrollHandle, ScrollTo)>,
    pub cancels: Vec<ScrollHandle>,
    pub timers: Vec<(f64, Deferred)>,
}

/// What a trigger callback can see and do during a frame
pub struct FrameContext<'a> {
    pub sample: &'a FrameSample,
    pub host: &'a mut dyn Host,
    commands: &'a mut Commands,
}

impl<'a> FrameContext<'a> {
    pub(crate) fn new(
        sample: &'a FrameSample,
        host: &'a mut dyn Host,
        commands: &'a mut Commands,
    ) -> Self {
        Self {
            sample,
            host,
            commands,
        }
    }

    /// Run `action` on the first frame at least `delay_ms` after this one
    pub fn defer<F>(&mut self, delay_ms: f64, action: F)
    where
        F: FnOnce(&mut dyn Host) -> Result<()> + 'static,
    {
        self.commands.timers.push((delay_ms.max(0.0), Box::new(action)));
    }

    /// Start a smooth scroll at the end of this frame
    pub fn scroll_to(&mut self, request: ScrollTo) -> ScrollHandle {
        let handle = ScrollHandle::new();
        self.commands.scrolls.push((handle, request));
        handle
    }

    /// Cancel a smooth scroll at the end of this frame
    pub fn cancel_scroll(&mut self, handle: ScrollHandle) {
        self.commands.cancels.push(handle);
    }
}

/// Where an isolated failure came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FaultSource {
    Trigger { id: TriggerId, hook: &'static str },
    Animation { id: AnimationId },
    Timeline { id: TimelineId },
    Scroll { handle: ScrollHandle },
    Markers { trigger: TriggerId },
    Timer,
}

impl fmt::Display for FaultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultSource::Trigger { id, hook } => write!(f, "trigger {} ({})", id, hook),
            FaultSource::Animation { id } => write!(f, "animation {}", id),
            FaultSource::Timeline { id } => write!(f, "timeline {}", id),
            FaultSource::Scroll { handle } => write!(f, "scroll {}", handle),
            FaultSource::Markers { trigger } => write!(f, "markers for {}", trigger),
            FaultSource::Timer => f.write_str("timer"),
        }
    }
}

/// A failure isolated to one entry; the rest of the pass still ran
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fault {
    pub source: FaultSource,
    pub message: String,
}

impl Fault {
    pub fn new(source: FaultSource, error: impl fmt::Display) -> Self {
        Self {
            source,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// Everything observable about one tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameReport {
    pub sample: FrameSample,
    pub events: Vec<TriggerEvent>,
    pub faults: Vec<Fault>,
}
