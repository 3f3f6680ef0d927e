//! Smooth scroll-to
//!
//! A time-based eased move of the vertical scroll offset. The start offset
//! and destination are resolved when the scroll begins; progress is
//! `elapsed / duration` measured from the first frame it runs on.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::easing::Timing;
use crate::frame::{Fault, FaultSource};
use crate::host::{Host, TargetId};
use crate::{Error, Result};

/// Handle to a smooth scroll, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrollHandle(Uuid);

impl ScrollHandle {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ScrollHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScrollTarget {
    Offset(f64),
    /// Top edge of an element
    Element(TargetId),
}

pub type ScrollUpdate = Box<dyn FnMut(f64, f64, &mut dyn Host) -> Result<()>>;
pub type ScrollDone = Box<dyn FnOnce(&mut dyn Host) -> Result<()>>;

/// A smooth scroll request
///
/// Duration and easing fall back to `engine.scroll_to_duration_ms` and
/// `engine.scroll_to_easing`.
pub struct ScrollTo {
    target: ScrollTarget,
    offset: f64,
    duration_ms: Option<f64>,
    timing: Option<Timing>,
    on_update: Option<ScrollUpdate>,
    on_complete: Option<ScrollDone>,
    on_cancel: Option<ScrollDone>,
}

impl ScrollTo {
    pub fn offset(y: f64) -> Self {
        Self::new(ScrollTarget::Offset(y))
    }

    pub fn element(target: impl Into<TargetId>) -> Self {
        Self::new(ScrollTarget::Element(target.into()))
    }

    fn new(target: ScrollTarget) -> Self {
        Self {
            target,
            offset: 0.0,
            duration_ms: None,
            timing: None,
            on_update: None,
            on_complete: None,
            on_cancel: None,
        }
    }

    /// Pixels added to the resolved destination
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn duration(mut self, ms: f64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn timing(mut self, timing: impl Into<Timing>) -> Self {
        self.timing = Some(timing.into());
        self
    }

    /// Called every frame with linear progress and the written offset
    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: FnMut(f64, f64, &mut dyn Host) -> Result<()> + 'static,
    {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut dyn Host) -> Result<()> + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_cancel<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut dyn Host) -> Result<()> + 'static,
    {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn target(&self) -> &ScrollTarget {
        &self.target
    }
}

struct ActiveScroll {
    handle: ScrollHandle,
    x: f64,
    from: f64,
    to: f64,
    duration: f64,
    timing: Timing,
    started_at: Option<f64>,
    on_update: Option<ScrollUpdate>,
    on_complete: Option<ScrollDone>,
    on_cancel: Option<ScrollDone>,
}

impl ActiveScroll {
    /// Write this frame's offset; `Ok(true)` once finished
    fn advance(&mut self, timestamp: f64, host: &mut dyn Host) -> Result<bool> {
        let started_at = *self.started_at.get_or_insert(timestamp);
        let progress = if self.duration <= 0.0 {
            1.0
        } else {
            ((timestamp - started_at) / self.duration).clamp(0.0, 1.0)
        };

        let position = self.from + (self.to - self.from) * self.timing.apply(progress);
        host.set_scroll_offset(self.x, position);

        if let Some(callback) = self.on_update.as_mut() {
            callback(progress, position, &mut *host)?;
        }

        if progress >= 1.0 {
            if let Some(callback) = self.on_complete.take() {
                callback(&mut *host)?;
            }
            return Ok(true);
        }
        Ok(false)
    }
}

/// In-flight smooth scrolls
///
/// The host holds a single scroll position, so starting a scroll cancels
/// the one in flight. A cancel hook that fails while being replaced is
/// held and reported with the next frame.
#[derive(Default)]
pub struct ScrollAnimator {
    active: Option<ActiveScroll>,
    held: Vec<Fault>,
}

impl ScrollAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `request` against the host and make it the active scroll
    pub fn begin(
        &mut self,
        handle: ScrollHandle,
        request: ScrollTo,
        host: &mut dyn Host,
        config: &EngineConfig,
    ) -> Result<()> {
        let ScrollTo {
            target,
            offset,
            duration_ms,
            timing,
            on_update,
            on_complete,
            on_cancel,
        } = request;

        let destination = match &target {
            ScrollTarget::Offset(y) => *y,
            ScrollTarget::Element(id) => {
                host.geometry(id)
                    .ok_or_else(|| Error::MissingTarget(id.to_string()))?
                    .top
            }
        } + offset;

        if let Some(previous) = self.active.as_ref().map(|s| s.handle) {
            if let Err(e) = self.cancel(previous, host) {
                warn!("Cancel hook of smooth scroll {} failed: {}", previous, e);
                self.held.push(Fault::new(FaultSource::Scroll { handle: previous }, e));
            }
        }

        let (x, y) = host.scroll_offset();
        debug!("Smooth scroll {} from {} to {}", handle, y, destination);
        self.active = Some(ActiveScroll {
            handle,
            x,
            from: y,
            to: destination,
            duration: duration_ms.unwrap_or(config.scroll_to_duration_ms),
            timing: timing.unwrap_or(Timing::Named(config.scroll_to_easing)),
            started_at: None,
            on_update,
            on_complete,
            on_cancel,
        });
        Ok(())
    }

    /// Stop `handle` and run its cancel hook; `false` if it was not running
    pub fn cancel(&mut self, handle: ScrollHandle, host: &mut dyn Host) -> Result<bool> {
        match self.active.take() {
            Some(scroll) if scroll.handle == handle => {
                debug!("Cancelled smooth scroll {}", handle);
                if let Some(callback) = scroll.on_cancel {
                    callback(host)?;
                }
                Ok(true)
            }
            other => {
                self.active = other;
                Ok(false)
            }
        }
    }

    pub fn is_active(&self, handle: ScrollHandle) -> bool {
        self.active.as_ref().is_some_and(|s| s.handle == handle)
    }

    pub fn current(&self) -> Option<ScrollHandle> {
        self.active.as_ref().map(|s| s.handle)
    }

    /// Run one frame of the active scroll
    pub fn advance(&mut self, timestamp: f64, host: &mut dyn Host, faults: &mut Vec<Fault>) {
        faults.append(&mut self.held);
        let Some(scroll) = self.active.as_mut() else {
            return;
        };
        match scroll.advance(timestamp, host) {
            Ok(false) => {}
            Ok(true) => {
                debug!("Smooth scroll {} complete", scroll.handle);
                self.active = None;
            }
            Err(e) => {
                warn!("Smooth scroll {} failed: {}", scroll.handle, e);
                faults.push(Fault::new(FaultSource::Scroll { handle: scroll.handle }, e));
                self.active = None;
            }
        }
    }

    /// Drop the active scroll without running hooks
    pub fn clear(&mut self) {
        self.active = None;
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::easing::Easing;
    use crate::host::{Rect, Viewport};
    use crate::page::Page;

    fn page() -> Page {
        let mut page = Page::new(1000.0, 800.0).with_document_size(2000.0, 5000.0);
        page.add("section", Rect::new(2000.0, 0.0, 1000.0, 600.0));
        page
    }

    #[test]
    fn test_linear_scroll() {
        let mut page = page();
        page.set_scroll_offset(30.0, 0.0);
        let mut animator = ScrollAnimator::new();
        let handle = ScrollHandle::new();
        animator
            .begin(
                handle,
                ScrollTo::offset(1000.0).duration(100.0).timing(Easing::Linear),
                &mut page,
                &EngineConfig::default(),
            )
            .unwrap();

        let mut faults = Vec::new();
        animator.advance(500.0, &mut page, &mut faults);
        assert_eq!(page.scroll_offset(), (30.0, 0.0));
        animator.advance(550.0, &mut page, &mut faults);
        assert_eq!(page.scroll_offset(), (30.0, 500.0));
        animator.advance(650.0, &mut page, &mut faults);
        assert_eq!(page.scroll_offset(), (30.0, 1000.0));
        assert!(!animator.is_active(handle));
        assert!(faults.is_empty());
    }

    #[test]
    fn test_element_target_with_offset() {
        let mut page = page();
        let mut animator = ScrollAnimator::new();
        animator
            .begin(
                ScrollHandle::new(),
                ScrollTo::element("section").with_offset(-100.0).duration(0.0),
                &mut page,
                &EngineConfig::default(),
            )
            .unwrap();
        animator.advance(0.0, &mut page, &mut Vec::new());
        assert_eq!(page.scroll_offset().1, 1900.0);
    }

    #[test]
    fn test_missing_element() {
        let mut page = page();
        let mut animator = ScrollAnimator::new();
        let err = animator
            .begin(
                ScrollHandle::new(),
                ScrollTo::element("nope"),
                &mut page,
                &EngineConfig::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::MissingTarget(_)));
    }

    #[test]
    fn test_callbacks() {
        let mut page = page();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (on_update, on_complete) = (log.clone(), log.clone());
        let mut animator = ScrollAnimator::new();
        animator
            .begin(
                ScrollHandle::new(),
                ScrollTo::offset(200.0)
                    .duration(100.0)
                    .timing(Easing::Linear)
                    .on_update(move |p, pos, _| {
                        on_update.borrow_mut().push(format!("{} {}", p, pos));
                        Ok(())
                    })
                    .on_complete(move |_| {
                        on_complete.borrow_mut().push("done".to_string());
                        Ok(())
                    }),
                &mut page,
                &EngineConfig::default(),
            )
            .unwrap();

        for ts in [0.0, 50.0, 100.0, 150.0] {
            animator.advance(ts, &mut page, &mut Vec::new());
        }
        assert_eq!(*log.borrow(), vec!["0 0", "0.5 100", "1 200", "done"]);
    }

    #[test]
    fn test_cancel_runs_hook_once() {
        let mut page = page();
        let cancelled = Rc::new(RefCell::new(0));
        let counter = cancelled.clone();
        let mut animator = ScrollAnimator::new();
        let handle = ScrollHandle::new();
        animator
            .begin(
                handle,
                ScrollTo::offset(500.0).on_cancel(move |_| {
                    *counter.borrow_mut() += 1;
                    Ok(())
                }),
                &mut page,
                &EngineConfig::default(),
            )
            .unwrap();

        assert!(animator.cancel(handle, &mut page).unwrap());
        assert!(!animator.cancel(handle, &mut page).unwrap());
        assert_eq!(*cancelled.borrow(), 1);
    }

    #[test]
    fn test_new_scroll_cancels_previous() {
        let mut page = page();
        let cancelled = Rc::new(RefCell::new(false));
        let flag = cancelled.clone();
        let mut animator = ScrollAnimator::new();
        let first = ScrollHandle::new();
        let second = ScrollHandle::new();
        let config = EngineConfig::default();

        animator
            .begin(
                first,
                ScrollTo::offset(500.0).on_cancel(move |_| {
                    *flag.borrow_mut() = true;
                    Ok(())
                }),
                &mut page,
                &config,
            )
            .unwrap();
        animator
            .begin(second, ScrollTo::offset(100.0), &mut page, &config)
            .unwrap();

        assert!(*cancelled.borrow());
        assert_eq!(animator.current(), Some(second));
    }

    #[test]
    fn test_failing_cancel_hook_does_not_block_next_scroll() {
        let mut page = page();
        let mut animator = ScrollAnimator::new();
        let first = ScrollHandle::new();
        let second = ScrollHandle::new();
        let config = EngineConfig::default();

        animator
            .begin(
                first,
                ScrollTo::offset(500.0).on_cancel(|_| Err(Error::Other("hook".to_string()))),
                &mut page,
                &config,
            )
            .unwrap();
        animator
            .begin(second, ScrollTo::offset(100.0).duration(100.0), &mut page, &config)
            .unwrap();
        assert_eq!(animator.current(), Some(second));

        let mut faults = Vec::new();
        animator.advance(0.0, &mut page, &mut faults);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].source, FaultSource::Scroll { handle: first });
        assert!(animator.is_active(second));

        faults.clear();
        animator.advance(100.0, &mut page, &mut faults);
        assert!(faults.is_empty());
        assert_eq!(page.scroll_offset().1, 100.0);
    }

    #[test]
    fn test_defaults_from_config() {
        let mut page = page();
        let config = EngineConfig {
            scroll_to_duration_ms: 200.0,
            scroll_to_easing: Easing::EaseInQuad,
            ..Default::default()
        };
        let mut animator = ScrollAnimator::new();
        animator
            .begin(ScrollHandle::new(), ScrollTo::offset(1000.0), &mut page, &config)
            .unwrap();
        animator.advance(0.0, &mut page, &mut Vec::new());
        animator.advance(100.0, &mut page, &mut Vec::new());
        assert_eq!(page.scroll_offset().1, 250.0);
    }

    #[test]
    fn test_failing_update_aborts_scroll() {
        let mut page = page();
        let mut animator = ScrollAnimator::new();
        let handle = ScrollHandle::new();
        animator
            .begin(
                handle,
                ScrollTo::offset(1000.0).on_update(|_, _, _| Err(Error::Other("nope".to_string()))),
                &mut page,
                &EngineConfig::default(),
            )
            .unwrap();
        let mut faults = Vec::new();
        animator.advance(0.0, &mut page, &mut faults);
        assert_eq!(faults.len(), 1);
        assert!(!animator.is_active(handle));
    }
}
