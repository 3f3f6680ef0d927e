//! Sticky header
//!
//! Tracks scroll direction to pin or unpin a header, applying state classes
//! and an optional slide transform.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::engine::ScrollEngine;
use crate::frame::FrameContext;
use crate::host::{Host, TargetId};
use crate::trigger::{Offset, TriggerId, TriggerOptions};
use crate::{Error, Result};

use super::px;

/// Options for [`ScrollEngine::sticky_header`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StickyOptions {
    pub show_on_up: bool,
    pub hide_on_down: bool,
    /// Pixels scrolled in one frame before the direction counts
    pub tolerance: f64,
    /// Scroll offset below which the header is at the top
    pub offset: f64,
    pub pinned_class: String,
    pub unpinned_class: String,
    pub top_class: String,
    pub not_top_class: String,
    /// Slide the header with a transform transition
    pub animation: bool,
    pub animation_duration_ms: f64,
}

impl Default for StickyOptions {
    fn default() -> Self {
        Self {
            show_on_up: false,
            hide_on_down: false,
            tolerance: 5.0,
            offset: 0.0,
            pinned_class: "header--pinned".to_string(),
            unpinned_class: "header--unpinned".to_string(),
            top_class: "header--top".to_string(),
            not_top_class: "header--not-top".to_string(),
            animation: true,
            animation_duration_ms: 300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderState {
    Top,
    Pinned,
    Unpinned,
}

/// Direction and tolerance logic, independent of any host
#[derive(Debug, Clone)]
pub struct HeaderStateMachine {
    state: HeaderState,
    last_y: f64,
    tolerance_exceeded: bool,
    tolerance: f64,
    offset: f64,
    directional: bool,
}

impl HeaderStateMachine {
    pub fn new(initial_y: f64, options: &StickyOptions) -> Self {
        Self {
            state: HeaderState::Top,
            last_y: initial_y,
            tolerance_exceeded: false,
            tolerance: options.tolerance,
            offset: options.offset,
            directional: options.show_on_up || options.hide_on_down,
        }
    }

    pub fn state(&self) -> HeaderState {
        self.state
    }

    /// Feed a scroll offset; returns the new state when it changed
    pub fn step(&mut self, y: f64) -> Option<HeaderState> {
        let down = y > self.last_y;
        if (y - self.last_y).abs() > self.tolerance {
            self.tolerance_exceeded = true;
        }

        let mut next = self.state;
        if y <= self.offset {
            next = HeaderState::Top;
        } else if self.tolerance_exceeded {
            if self.directional {
                next = if down {
                    HeaderState::Unpinned
                } else {
                    HeaderState::Pinned
                };
            }
            self.tolerance_exceeded = false;
        }
        self.last_y = y;

        if next == self.state {
            return None;
        }
        self.state = next;
        Some(next)
    }
}

/// A sticky header
#[derive(Debug, Clone)]
pub struct StickyHandle {
    trigger: TriggerId,
    header: TargetId,
    machine: Rc<RefCell<HeaderStateMachine>>,
}

impl StickyHandle {
    pub fn trigger(&self) -> TriggerId {
        self.trigger
    }

    pub fn header(&self) -> &TargetId {
        &self.header
    }

    pub fn state(&self) -> HeaderState {
        self.machine.borrow().state()
    }
}

struct HeaderView {
    header: TargetId,
    height: f64,
    options: StickyOptions,
    machine: Rc<RefCell<HeaderStateMachine>>,
}

impl HeaderView {
    fn follow(&self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let changed = self.machine.borrow_mut().step(ctx.sample.scroll_y);
        match changed {
            Some(state) => {
                trace!("Header {} is now {:?}", self.header, state);
                self.show(&mut *ctx.host, state)
            }
            None => Ok(()),
        }
    }

    fn show(&self, host: &mut dyn Host, state: HeaderState) -> Result<()> {
        let o = &self.options;
        for class in [&o.top_class, &o.not_top_class, &o.pinned_class, &o.unpinned_class] {
            host.remove_class(&self.header, class)?;
        }
        let class = match state {
            HeaderState::Top => return host.add_class(&self.header, &o.top_class),
            HeaderState::Pinned => &o.pinned_class,
            HeaderState::Unpinned => &o.unpinned_class,
        };
        host.add_class(&self.header, &o.not_top_class)?;
        host.add_class(&self.header, class)?;

        if o.animation {
            let transform = match state {
                HeaderState::Unpinned => format!("translateY({})", px(-self.height)),
                _ => "translateY(0)".to_string(),
            };
            host.set_style(&self.header, "transform", &transform)?;
        }
        Ok(())
    }
}

impl ScrollEngine {
    /// Pin `header` while scrolling up and hide it while scrolling down
    pub fn sticky_header(
        &mut self,
        header: impl Into<TargetId>,
        options: StickyOptions,
        host: &mut dyn Host,
    ) -> Result<StickyHandle> {
        let header = header.into();
        let height = host
            .geometry(&header)
            .ok_or_else(|| Error::MissingTarget(header.to_string()))?
            .height;

        host.add_class(&header, &options.top_class)?;
        if options.animation {
            host.set_style(
                &header,
                "transition",
                &format!("transform {}ms ease-in-out", options.animation_duration_ms),
            )?;
            host.set_style(&header, "will-change", "transform")?;
        }

        let (_, y) = host.scroll_offset();
        let machine = Rc::new(RefCell::new(HeaderStateMachine::new(y, &options)));
        let view = Rc::new(HeaderView {
            header: header.clone(),
            height,
            options,
            machine: machine.clone(),
        });

        // leave and leave-back fire on the frames that reach either end of
        // the document, where on_update does not
        let (on_leave, on_leave_back) = (view.clone(), view.clone());
        let trigger = self.create_trigger(
            TriggerOptions::scroll(0.0, Offset::computed(|host| host.document_size().1))
                .label(format!("sticky {}", header))
                .on_update(move |_, ctx| view.follow(ctx))
                .on_leave(move |_, ctx| on_leave.follow(ctx))
                .on_leave_back(move |_, ctx| on_leave_back.follow(ctx)),
            &*host,
        )?;

        debug!("Sticky header on {}", header);
        Ok(StickyHandle {
            trigger,
            header,
            machine,
        })
    }
}
