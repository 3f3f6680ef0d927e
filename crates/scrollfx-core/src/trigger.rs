//! Trigger engine
//!
//! A trigger watches one scroll region and turns the current scroll offset
//! into a normalized progress value. Each frame, triggers are evaluated in
//! registration order against the same sample; crossing into or out of the
//! open interval (0, 1) fires exactly one of the enter / leave / leave-back
//! hooks, and `on_update` fires on every frame spent inside it.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::frame::{Fault, FaultSource, FrameContext};
use crate::host::{Host, Rect, TargetId};
use crate::{Error, Result};

/// Handle to a registered trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerId(Uuid);

impl TriggerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scroll offset, fixed or computed from the host each frame
#[derive(Clone)]
pub enum Offset {
    Fixed(f64),
    Computed(Rc<dyn Fn(&dyn Host) -> f64>),
}

impl Offset {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&dyn Host) -> f64 + 'static,
    {
        Offset::Computed(Rc::new(f))
    }

    pub fn resolve(&self, host: &dyn Host) -> f64 {
        match self {
            Offset::Fixed(v) => *v,
            Offset::Computed(f) => f(host),
        }
    }
}

impl fmt::Debug for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Fixed(v) => write!(f, "Fixed({})", v),
            Offset::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<f64> for Offset {
    fn from(v: f64) -> Self {
        Offset::Fixed(v)
    }
}

/// How a trigger maps scroll offset to progress
#[derive(Debug, Clone)]
pub enum TriggerKind {
    /// Absolute scroll offsets
    ScrollRange { start: Offset, end: Offset },
    /// Visibility of an element; thresholds are viewport fractions
    Element {
        target: TargetId,
        start_trigger: f64,
        end_trigger: f64,
    },
}

/// Runtime state of one trigger
#[derive(Debug, Clone)]
pub struct Trigger {
    id: TriggerId,
    label: Option<String>,
    kind: TriggerKind,
    geometry: Option<Rect>,
    bounds: (f64, f64),
    progress: f64,
    is_active: bool,
}

impl Trigger {
    pub fn id(&self) -> TriggerId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn kind(&self) -> &TriggerKind {
        &self.kind
    }

    /// Cached element box, refreshed on registration and on `refresh`
    pub fn geometry(&self) -> Option<Rect> {
        self.geometry
    }

    /// Start and end scroll offsets resolved on the last update
    pub fn bounds(&self) -> (f64, f64) {
        self.bounds
    }

    /// Progress in [0, 1]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// True strictly inside the range, `0 < progress < 1`
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn target(&self) -> Option<&TargetId> {
        match &self.kind {
            TriggerKind::Element { target, .. } => Some(target),
            TriggerKind::ScrollRange { .. } => None,
        }
    }
}

/// Lifecycle hook invoked with the trigger and the current frame
pub type TriggerCallback = Box<dyn FnMut(&Trigger, &mut FrameContext<'_>) -> Result<()>>;

#[derive(Default)]
struct Hooks {
    on_enter: Option<TriggerCallback>,
    on_leave: Option<TriggerCallback>,
    on_leave_back: Option<TriggerCallback>,
    on_update: Option<TriggerCallback>,
}

enum Region {
    Scroll {
        start: Offset,
        end: Offset,
    },
    Element {
        target: TargetId,
        start_trigger: Option<f64>,
        end_trigger: Option<f64>,
    },
}

/// Options for `create_trigger`
///
/// Element thresholds left unset take `engine.start_trigger` /
/// `engine.end_trigger` from the configuration (0.8 / 0.2 by default).
pub struct TriggerOptions {
    region: Region,
    label: Option<String>,
    hooks: Hooks,
}

impl TriggerOptions {
    /// A trigger over absolute scroll offsets
    pub fn scroll(start: impl Into<Offset>, end: impl Into<Offset>) -> Self {
        Self {
            region: Region::Scroll {
                start: start.into(),
                end: end.into(),
            },
            label: None,
            hooks: Hooks::default(),
        }
    }

    /// A trigger over an element's visibility
    pub fn element(target: impl Into<TargetId>) -> Self {
        Self {
            region: Region::Element {
                target: target.into(),
                start_trigger: None,
                end_trigger: None,
            },
            label: None,
            hooks: Hooks::default(),
        }
    }

    /// Viewport fractions where an element trigger starts and ends.
    /// Ignored for scroll ranges.
    pub fn thresholds(mut self, start: f64, end: f64) -> Self {
        if let Region::Element {
            start_trigger,
            end_trigger,
            ..
        } = &mut self.region
        {
            *start_trigger = Some(start);
            *end_trigger = Some(end);
        }
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn on_enter<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Trigger, &mut FrameContext<'_>) -> Result<()> + 'static,
    {
        self.hooks.on_enter = Some(Box::new(f));
        self
    }

    pub fn on_leave<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Trigger, &mut FrameContext<'_>) -> Result<()> + 'static,
    {
        self.hooks.on_leave = Some(Box::new(f));
        self
    }

    pub fn on_leave_back<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Trigger, &mut FrameContext<'_>) -> Result<()> + 'static,
    {
        self.hooks.on_leave_back = Some(Box::new(f));
        self
    }

    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Trigger, &mut FrameContext<'_>) -> Result<()> + 'static,
    {
        self.hooks.on_update = Some(Box::new(f));
        self
    }
}

/// Which edge a trigger crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEventKind {
    Enter,
    Leave,
    LeaveBack,
}

impl fmt::Display for TriggerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEventKind::Enter => f.write_str("enter"),
            TriggerEventKind::Leave => f.write_str("leave"),
            TriggerEventKind::LeaveBack => f.write_str("leave-back"),
        }
    }
}

/// A recorded edge crossing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerEvent {
    pub trigger: TriggerId,
    pub label: Option<String>,
    pub kind: TriggerEventKind,
    pub progress: f64,
}

/// Normalized progress of `scroll` through `[start, end]`, clamped to [0, 1].
///
/// A zero-width or non-finite range has no defined progress.
pub fn compute_progress(scroll: f64, start: f64, end: f64) -> Result<f64> {
    let range = end - start;
    let raw = (scroll - start) / range;
    if range == 0.0 || raw.is_nan() {
        return Err(Error::InvalidTriggerRange(start));
    }
    Ok(raw.clamp(0.0, 1.0))
}

struct Entry {
    trigger: Trigger,
    hooks: Hooks,
    range_warned: bool,
}

/// Owns the registered triggers
#[derive(Default)]
pub struct TriggerEngine {
    entries: Vec<Entry>,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger, caching element geometry immediately
    pub fn register(
        &mut self,
        options: TriggerOptions,
        defaults: (f64, f64),
        host: &dyn Host,
    ) -> Result<TriggerId> {
        let TriggerOptions { region, label, hooks } = options;

        let (kind, geometry) = match region {
            Region::Scroll { start, end } => {
                if let (Offset::Fixed(s), Offset::Fixed(e)) = (&start, &end) {
                    if s == e {
                        warn!("Scroll trigger registered with empty range at {}", s);
                    }
                }
                (TriggerKind::ScrollRange { start, end }, None)
            }
            Region::Element {
                target,
                start_trigger,
                end_trigger,
            } => {
                let start_trigger = start_trigger.unwrap_or(defaults.0);
                let end_trigger = end_trigger.unwrap_or(defaults.1);
                for threshold in [start_trigger, end_trigger] {
                    if !(0.0..=1.0).contains(&threshold) {
                        return Err(Error::InvalidOption(format!(
                            "trigger threshold {} is outside [0, 1]",
                            threshold
                        )));
                    }
                }
                let rect = host
                    .geometry(&target)
                    .ok_or_else(|| Error::MissingTarget(target.to_string()))?;
                (
                    TriggerKind::Element {
                        target,
                        start_trigger,
                        end_trigger,
                    },
                    Some(rect),
                )
            }
        };

        let id = TriggerId::new();
        debug!("Registered trigger {} ({:?})", id, label);
        self.entries.push(Entry {
            trigger: Trigger {
                id,
                label,
                kind,
                geometry,
                bounds: (0.0, 0.0),
                progress: 0.0,
                is_active: false,
            },
            hooks,
            range_warned: false,
        });
        Ok(id)
    }

    pub fn get(&self, id: TriggerId) -> Option<&Trigger> {
        self.entries
            .iter()
            .find(|e| e.trigger.id == id)
            .map(|e| &e.trigger)
    }

    /// Triggers in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.entries.iter().map(|e| &e.trigger)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove(&mut self, id: TriggerId) -> Option<Trigger> {
        let index = self.entries.iter().position(|e| e.trigger.id == id)?;
        debug!("Removed trigger {}", id);
        Some(self.entries.remove(index).trigger)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Re-query geometry for every element trigger.
    ///
    /// Targets that no longer resolve keep their previous box; `update`
    /// skips them until the node comes back.
    pub fn refresh_geometry(&mut self, host: &dyn Host) -> Vec<Fault> {
        let mut faults = Vec::new();
        for entry in &mut self.entries {
            let trigger = &mut entry.trigger;
            if let TriggerKind::Element { target, .. } = &trigger.kind {
                match host.geometry(target) {
                    Some(rect) => trigger.geometry = Some(rect),
                    None => faults.push(Fault::new(
                        FaultSource::Trigger {
                            id: trigger.id,
                            hook: "refresh",
                        },
                        Error::MissingTarget(target.to_string()),
                    )),
                }
            }
        }
        faults
    }

    /// Evaluate every trigger against the frame's sample
    pub fn update(
        &mut self,
        ctx: &mut FrameContext<'_>,
        events: &mut Vec<TriggerEvent>,
        faults: &mut Vec<Fault>,
    ) {
        let scroll_y = ctx.sample.scroll_y;
        let viewport_height = ctx.sample.viewport_height;

        for entry in &mut self.entries {
            let Entry {
                trigger,
                hooks,
                range_warned,
            } = entry;

            let (start, end) = match &trigger.kind {
                TriggerKind::ScrollRange { start, end } => {
                    (start.resolve(&*ctx.host), end.resolve(&*ctx.host))
                }
                TriggerKind::Element {
                    target,
                    start_trigger,
                    end_trigger,
                } => match trigger.geometry.filter(|_| ctx.host.geometry(target).is_some()) {
                    Some(rect) => (
                        rect.top - viewport_height * (1.0 - start_trigger),
                        rect.bottom() - viewport_height * end_trigger,
                    ),
                    None => {
                        faults.push(Fault::new(
                            FaultSource::Trigger {
                                id: trigger.id,
                                hook: "update",
                            },
                            Error::MissingTarget(target.to_string()),
                        ));
                        continue;
                    }
                },
            };
            trigger.bounds = (start, end);

            let progress = match compute_progress(scroll_y, start, end) {
                Ok(p) => p,
                Err(e) => {
                    if !*range_warned {
                        warn!("Trigger {}: {}; progress held at 0", trigger.id, e);
                        *range_warned = true;
                    }
                    0.0
                }
            };

            let was_active = trigger.is_active;
            trigger.progress = progress;
            trigger.is_active = progress > 0.0 && progress < 1.0;

            let edge = match (was_active, trigger.is_active) {
                (false, true) => Some((TriggerEventKind::Enter, &mut hooks.on_enter, "on_enter")),
                (true, false) if progress <= 0.0 => Some((
                    TriggerEventKind::LeaveBack,
                    &mut hooks.on_leave_back,
                    "on_leave_back",
                )),
                (true, false) => Some((TriggerEventKind::Leave, &mut hooks.on_leave, "on_leave")),
                _ => None,
            };

            if let Some((kind, hook, name)) = edge {
                events.push(TriggerEvent {
                    trigger: trigger.id,
                    label: trigger.label.clone(),
                    kind,
                    progress,
                });
                fire(hook, name, trigger, ctx, faults);
            }

            if trigger.is_active {
                fire(&mut hooks.on_update, "on_update", trigger, ctx, faults);
            }
        }
    }
}

fn fire(
    hook: &mut Option<TriggerCallback>,
    name: &'static str,
    trigger: &Trigger,
    ctx: &mut FrameContext<'_>,
    faults: &mut Vec<Fault>,
) {
    if let Some(callback) = hook.as_mut() {
        if let Err(e) = callback(trigger, ctx) {
            warn!("Trigger {} {} failed: {}", trigger.id, name, e);
            faults.push(Fault::new(
                FaultSource::Trigger {
                    id: trigger.id,
                    hook: name,
                },
                e,
            ));
        }
    }
}
