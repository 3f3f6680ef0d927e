//! Pinning
//!
//! Holds an element fixed in the viewport for a scroll range. A spacer of
//! the element's original size is inserted in front of it so the layout
//! does not collapse; with `push_followers` the spacer's margin grows as
//! the range is scrolled through.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::ScrollEngine;
use crate::host::{Host, TargetId};
use crate::trigger::{TriggerId, TriggerOptions};
use crate::value::parse_float_prefix;
use crate::{Error, Result};

use super::px;

/// Inline styles captured before pinning and restored on leave-back
const SNAPSHOT_PROPERTIES: [&str; 5] = ["position", "top", "left", "width", "z-index"];

/// Length of the pinned range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDuration", into = "String")]
pub enum PinDuration {
    Pixels(f64),
    /// Percentage of the viewport height
    ViewportPercent(f64),
}

impl PinDuration {
    pub fn resolve(&self, viewport_height: f64) -> f64 {
        match self {
            PinDuration::Pixels(px) => *px,
            PinDuration::ViewportPercent(pct) => viewport_height * pct / 100.0,
        }
    }
}

impl Default for PinDuration {
    fn default() -> Self {
        PinDuration::ViewportPercent(100.0)
    }
}

impl FromStr for PinDuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let amount = parse_float_prefix(s)
            .ok_or_else(|| Error::InvalidOption(format!("invalid pin duration: {}", s)))?;
        if s.trim_end().ends_with('%') {
            Ok(PinDuration::ViewportPercent(amount))
        } else {
            Ok(PinDuration::Pixels(amount))
        }
    }
}

impl fmt::Display for PinDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinDuration::Pixels(px) => write!(f, "{}px", px),
            PinDuration::ViewportPercent(pct) => write!(f, "{}%", pct),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Number(f64),
    Text(String),
}

impl TryFrom<RawDuration> for PinDuration {
    type Error = Error;

    fn try_from(raw: RawDuration) -> Result<Self> {
        match raw {
            RawDuration::Number(px) => Ok(PinDuration::Pixels(px)),
            RawDuration::Text(s) => s.parse(),
        }
    }
}

impl From<PinDuration> for String {
    fn from(duration: PinDuration) -> Self {
        duration.to_string()
    }
}

/// Options for [`ScrollEngine::pin`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinOptions {
    /// Distance from the viewport top at which the element pins
    pub start_position: f64,
    pub duration: PinDuration,
    pub push_followers: bool,
    /// Pixels to start pinning early
    pub anticipate_pin: f64,
    /// Absolute start offset, overriding the element position
    pub start: Option<f64>,
    /// Absolute end offset, overriding `duration`
    pub end: Option<f64>,
    /// Push followers sideways instead of down
    pub horizontal: bool,
    /// Move the element to the document root while pinned
    pub reparent: bool,
}

impl Default for PinOptions {
    fn default() -> Self {
        Self {
            start_position: 0.0,
            duration: PinDuration::default(),
            push_followers: true,
            anticipate_pin: 0.0,
            start: None,
            end: None,
            horizontal: false,
            reparent: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinPhase {
    #[default]
    Before,
    Pinned,
    After,
}

#[derive(Debug, Default)]
struct PinState {
    phase: PinPhase,
    push: f64,
}

/// A pinned element
#[derive(Debug, Clone)]
pub struct PinHandle {
    trigger: TriggerId,
    target: TargetId,
    spacer: TargetId,
    start: f64,
    end: f64,
    state: Rc<RefCell<PinState>>,
}

impl PinHandle {
    pub fn trigger(&self) -> TriggerId {
        self.trigger
    }

    pub fn target(&self) -> &TargetId {
        &self.target
    }

    pub fn spacer(&self) -> &TargetId {
        &self.spacer
    }

    /// Scroll offsets where pinning starts and ends
    pub fn range(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    pub fn phase(&self) -> PinPhase {
        self.state.borrow().phase
    }

    /// Current follower push in pixels
    pub fn push(&self) -> f64 {
        self.state.borrow().push
    }
}

impl ScrollEngine {
    /// Pin `target` for a scroll range derived from its position
    pub fn pin(&mut self, target: impl Into<TargetId>, options: PinOptions, host: &mut dyn Host) -> Result<PinHandle> {
        let target = target.into();
        let rect = host
            .geometry(&target)
            .ok_or_else(|| Error::MissingTarget(target.to_string()))?;
        let (_, viewport_height) = host.viewport_size();

        let start = options.start.unwrap_or(rect.top - options.start_position) - options.anticipate_pin;
        let end = match options.end {
            Some(end) => end,
            None => start + options.duration.resolve(viewport_height),
        };
        if end <= start {
            return Err(Error::InvalidOption(format!(
                "pin range is empty ({} to {})",
                start, end
            )));
        }
        let span = end - start;

        let spacer = host.create_placeholder(rect.width, rect.height);
        host.insert_before(&spacer, &target)?;
        host.add_class(&spacer, "scrollfx-pin-spacer")?;
        host.set_style(&spacer, "width", &px(rect.width))?;
        host.set_style(&spacer, "height", &px(rect.height))?;

        let snapshot: Vec<(&'static str, String)> = SNAPSHOT_PROPERTIES
            .iter()
            .map(|p| (*p, host.read(&target, p).unwrap_or_default()))
            .collect();
        let pinned = [
            ("position", "fixed".to_string()),
            ("top", px(options.start_position)),
            ("left", px(rect.left)),
            ("width", px(rect.width)),
            ("z-index", "999".to_string()),
        ];
        let margin = if options.horizontal { "margin-left" } else { "margin-top" };
        let state = Rc::new(RefCell::new(PinState::default()));

        let reparent = options.reparent;
        let push_followers = options.push_followers;
        let trigger_options = TriggerOptions::scroll(start, end)
            .label(format!("pin {}", target))
            .on_enter({
                let (target, state) = (target.clone(), state.clone());
                move |_, ctx| {
                    for (property, value) in &pinned {
                        ctx.host.set_style(&target, property, value)?;
                    }
                    if reparent {
                        ctx.host.append_to_root(&target)?;
                    }
                    state.borrow_mut().phase = PinPhase::Pinned;
                    Ok(())
                }
            })
            .on_leave({
                let (target, spacer, state) = (target.clone(), spacer.clone(), state.clone());
                move |_, ctx| {
                    ctx.host.set_style(&target, "position", "absolute")?;
                    ctx.host.set_style(&target, "top", &px(span))?;
                    ctx.host.set_style(&target, "left", "0")?;
                    if reparent {
                        ctx.host.insert_after(&target, &spacer)?;
                    }
                    let mut state = state.borrow_mut();
                    if push_followers {
                        ctx.host.set_style(&spacer, margin, &px(span))?;
                        state.push = span;
                    }
                    state.phase = PinPhase::After;
                    Ok(())
                }
            })
            .on_leave_back({
                let (target, spacer, state) = (target.clone(), spacer.clone(), state.clone());
                move |_, ctx| {
                    for (property, value) in &snapshot {
                        ctx.host.set_style(&target, property, value)?;
                    }
                    if reparent {
                        ctx.host.insert_after(&target, &spacer)?;
                    }
                    let mut state = state.borrow_mut();
                    if push_followers {
                        ctx.host.set_style(&spacer, margin, "0px")?;
                        state.push = 0.0;
                    }
                    state.phase = PinPhase::Before;
                    Ok(())
                }
            })
            .on_update({
                let (spacer, state) = (spacer.clone(), state.clone());
                move |_, ctx| {
                    if push_followers {
                        let push = span.min(ctx.sample.scroll_y - start);
                        ctx.host.set_style(&spacer, margin, &px(push))?;
                        state.borrow_mut().push = push;
                    }
                    Ok(())
                }
            });
        let trigger = self.create_trigger(trigger_options, &*host)?;

        debug!("Pinned {} from {} to {}", target, start, end);
        Ok(PinHandle {
            trigger,
            target,
            spacer,
            start,
            end,
            state,
        })
    }
}
