//! Horizontal scroll-jacking
//!
//! Pins a container for a vertical scroll range and translates its content
//! sideways by `progress * (content width - container width)`. With `snap`,
//! a slow scroll is finished off by a smooth scroll to the nearest section.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use tracing::debug;

use crate::easing::Easing;
use crate::effects::pin::{PinDuration, PinHandle, PinOptions};
use crate::effects::scroll_to::{ScrollHandle, ScrollTo};
use crate::engine::ScrollEngine;
use crate::frame::FrameContext;
use crate::host::{Host, Rect, TargetId};
use crate::trigger::{TriggerCallback, TriggerId, TriggerOptions};
use crate::value::parse_float_prefix;
use crate::{Error, Result};

use super::px;

const SECTION_SCROLL_MS: f64 = 1000.0;

/// Options for [`ScrollEngine::horizontal_scroll`]
///
/// `start` takes a scroll offset (`"1200"`), `"+=N"` from the container
/// top, or an `"<element> <viewport>"` anchor pair where each side is
/// `top`, `center`, `bottom` or a pixel offset. `end` additionally takes
/// `"+=N"` / `"+=N%"` relative to the start, percentages being of the
/// viewport height.
#[derive(Deserialize)]
#[serde(default)]
pub struct HorizontalOptions {
    pub start: String,
    pub end: String,
    /// Push following content down by the pinned distance
    pub pin_spacing: bool,
    pub anticipate_pin: f64,
    pub snap: bool,
    /// Milliseconds of snap animation per pixel of scroll distance
    pub snap_speed: f64,
    /// Snap targets inside the content; evenly spaced when empty
    pub sections: Vec<TargetId>,
    #[serde(skip)]
    pub on_update: Option<TriggerCallback>,
}

impl Default for HorizontalOptions {
    fn default() -> Self {
        Self {
            start: "top top".to_string(),
            end: "+=100%".to_string(),
            pin_spacing: true,
            anticipate_pin: 0.0,
            snap: false,
            snap_speed: 0.3,
            sections: Vec::new(),
            on_update: None,
        }
    }
}

/// Resolve a start spec against the container box (document coordinates)
fn resolve_start(spec: &str, rect: &Rect, viewport_height: f64) -> f64 {
    let spec = spec.trim();
    if let Some(rest) = spec.strip_prefix("+=") {
        return rect.top + parse_float_prefix(rest).unwrap_or(0.0);
    }
    if let Some((element, viewport)) = spec.split_once(' ') {
        let element_offset = match element {
            "top" => rect.top,
            "center" => rect.top + rect.height / 2.0,
            "bottom" => rect.bottom(),
            other => rect.top + parse_float_prefix(other).unwrap_or(0.0),
        };
        let viewport_offset = match viewport.trim() {
            "top" => 0.0,
            "center" => viewport_height / 2.0,
            "bottom" => viewport_height,
            other => parse_float_prefix(other).unwrap_or(0.0),
        };
        return element_offset - viewport_offset;
    }
    parse_float_prefix(spec).unwrap_or(0.0)
}

fn resolve_end(spec: &str, start: f64, rect: &Rect, viewport_height: f64) -> f64 {
    let spec = spec.trim();
    if let Some(rest) = spec.strip_prefix("+=") {
        let amount = parse_float_prefix(rest).unwrap_or(0.0);
        return if rest.trim_end().ends_with('%') {
            start + viewport_height * amount / 100.0
        } else {
            start + amount
        };
    }
    resolve_start(spec, rect, viewport_height)
}

/// Nearest snap point to `progress`, as progress
fn closest_snap(points: &[f64], progress: f64, distance: f64) -> f64 {
    let position = progress * distance;
    let closest = points
        .iter()
        .copied()
        .min_by(|a, b| (a - position).abs().total_cmp(&(b - position).abs()))
        .unwrap_or(0.0);
    closest / distance
}

fn translate(host: &mut dyn Host, content: &TargetId, x: f64) -> Result<()> {
    host.set_style(content, "transform", &format!("translateX({})", px(-x)))
}

#[derive(Debug, Default)]
struct SnapState {
    snapping: bool,
    last_progress: f64,
}

/// Where to move a horizontal section to
#[derive(Debug, Clone, PartialEq)]
pub enum HorizontalTarget {
    /// Horizontal progress, clamped to [0, 1]
    Progress(f64),
    /// Left edge of a node inside the content
    Section(TargetId),
}

/// A horizontal scroll section
#[derive(Debug, Clone)]
pub struct HorizontalHandle {
    trigger: TriggerId,
    pin: PinHandle,
    content: TargetId,
    start: f64,
    end: f64,
    distance: f64,
    snap_points: Vec<f64>,
    state: Rc<RefCell<SnapState>>,
}

impl HorizontalHandle {
    pub fn trigger(&self) -> TriggerId {
        self.trigger
    }

    pub fn pin(&self) -> &PinHandle {
        &self.pin
    }

    pub fn content(&self) -> &TargetId {
        &self.content
    }

    pub fn range(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    /// How far the content travels, in pixels
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Snap offsets within the content, empty unless snapping
    pub fn snap_points(&self) -> &[f64] {
        &self.snap_points
    }

    pub fn is_snapping(&self) -> bool {
        self.state.borrow().snapping
    }

    /// Smooth-scroll the page so the content shows `target`
    pub fn scroll_to(
        &self,
        engine: &mut ScrollEngine,
        target: HorizontalTarget,
        host: &mut dyn Host,
    ) -> Result<ScrollHandle> {
        let progress = match target {
            HorizontalTarget::Progress(p) => p.clamp(0.0, 1.0),
            HorizontalTarget::Section(section) => {
                let left = host
                    .geometry(&section)
                    .ok_or_else(|| Error::MissingTarget(section.to_string()))?
                    .left;
                let origin = host
                    .geometry(&self.content)
                    .ok_or_else(|| Error::MissingTarget(self.content.to_string()))?
                    .left;
                if self.distance > 0.0 {
                    (left - origin) / self.distance
                } else {
                    0.0
                }
            }
        };
        let offset = self.start + (self.end - self.start) * progress;
        engine.scroll_to(
            ScrollTo::offset(offset)
                .duration(SECTION_SCROLL_MS)
                .timing(Easing::EaseInOutQuad),
            host,
        )
    }
}

impl ScrollEngine {
    /// Scroll `content` sideways inside the pinned `container`
    pub fn horizontal_scroll(
        &mut self,
        container: impl Into<TargetId>,
        content: impl Into<TargetId>,
        options: HorizontalOptions,
        host: &mut dyn Host,
    ) -> Result<HorizontalHandle> {
        let (container, content) = (container.into(), content.into());
        let HorizontalOptions {
            start,
            end,
            pin_spacing,
            anticipate_pin,
            snap,
            snap_speed,
            sections,
            mut on_update,
        } = options;

        let frame = host
            .geometry(&container)
            .ok_or_else(|| Error::MissingTarget(container.to_string()))?;
        let inner = host
            .geometry(&content)
            .ok_or_else(|| Error::MissingTarget(content.to_string()))?;
        let (_, viewport_height) = host.viewport_size();

        let start = resolve_start(&start, &frame, viewport_height);
        let end = resolve_end(&end, start, &frame, viewport_height);
        let distance = (inner.width - frame.width).max(0.0);

        let snap_points = if snap && distance > 0.0 {
            if sections.is_empty() {
                let count = (inner.width / frame.width).ceil().max(1.0) as usize;
                (0..count)
                    .map(|i| inner.width / count as f64 * i as f64)
                    .collect()
            } else {
                sections
                    .iter()
                    .map(|section| {
                        host.geometry(section)
                            .map(|rect| rect.left - inner.left)
                            .ok_or_else(|| Error::MissingTarget(section.to_string()))
                    })
                    .collect::<Result<Vec<f64>>>()?
            }
        } else {
            Vec::new()
        };

        host.set_style(&container, "overflow", "hidden")?;
        host.set_style(&content, "position", "relative")?;
        host.set_style(&content, "display", "inline-flex")?;
        host.set_style(&content, "will-change", "transform")?;

        let pin = self.pin(
            container.clone(),
            PinOptions {
                start_position: frame.top - start,
                duration: PinDuration::Pixels(end - start),
                push_followers: pin_spacing,
                anticipate_pin,
                horizontal: true,
                ..Default::default()
            },
            &mut *host,
        )?;

        let state = Rc::new(RefCell::new(SnapState::default()));
        let velocity_threshold = self.config().snap_velocity_threshold;
        let tolerance = self.config().snap_tolerance;

        let trigger_options = TriggerOptions::scroll(start, end)
            .label(format!("horizontal {}", container))
            .on_update({
                let (content, state, points) = (content.clone(), state.clone(), snap_points.clone());
                move |trigger, ctx| {
                    let progress = trigger.progress();
                    if !points.is_empty() && !state.borrow().snapping {
                        state.borrow_mut().last_progress = progress;
                        if ctx.sample.velocity_y.abs() < velocity_threshold {
                            let target = closest_snap(&points, progress, distance);
                            if (target - progress).abs() > tolerance {
                                begin_snap(ctx, &state, &content, (start, end), distance, snap_speed, target);
                                return Ok(());
                            }
                        }
                    }

                    translate(&mut *ctx.host, &content, progress * distance)?;
                    match on_update.as_mut() {
                        Some(callback) => callback(trigger, ctx),
                        None => Ok(()),
                    }
                }
            });
        let trigger = self.create_trigger(trigger_options, &*host)?;

        debug!(
            "Horizontal scroll on {} from {} to {} over {}px",
            container, start, end, distance
        );
        Ok(HorizontalHandle {
            trigger,
            pin,
            content,
            start,
            end,
            distance,
            snap_points,
            state,
        })
    }
}

fn begin_snap(
    ctx: &mut FrameContext<'_>,
    state: &Rc<RefCell<SnapState>>,
    content: &TargetId,
    (start, end): (f64, f64),
    distance: f64,
    snap_speed: f64,
    target: f64,
) {
    let last = {
        let mut state = state.borrow_mut();
        state.snapping = true;
        state.last_progress
    };
    let offset = start + (end - start) * target;
    let travel = (offset - ctx.sample.scroll_y).abs();
    debug!("Snapping to {} ({}px away)", target, travel);

    let (content, done, cancelled) = (content.clone(), state.clone(), state.clone());
    ctx.scroll_to(
        ScrollTo::offset(offset)
            .duration(travel * snap_speed)
            .timing(Easing::EaseOutQuad)
            .on_update(move |p, _, host| {
                let progress = last + (target - last) * p;
                translate(host, &content, progress * distance)
            })
            .on_complete(move |_| {
                done.borrow_mut().snapping = false;
                Ok(())
            })
            .on_cancel(move |_| {
                cancelled.borrow_mut().snapping = false;
                Ok(())
            }),
    );
}
