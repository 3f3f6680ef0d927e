//! The scroll engine
//!
//! [`ScrollEngine`] owns every trigger, animation, timeline, marker set,
//! smooth scroll and deferred timer of one scroll context. One call to
//! [`ScrollEngine::tick`] is one frame:
//!
//! 1. sample the viewport and compute velocity
//! 2. trigger pass, in registration order
//! 3. animation pass, in registration order
//! 4. timelines (scrub smoothing and playback)
//! 5. debug markers
//! 6. apply requests queued by callbacks (scroll cancels, new scrolls, timers)
//! 7. advance the active smooth scroll
//! 8. fire due timers
//!
//! Failures inside one entry are logged, recorded in the [`FrameReport`] and
//! do not stop the rest of the frame.

use tracing::{debug, info, trace, warn};

use crate::animation::{Animation, AnimationEngine, AnimationId, AnimationOptions};
use crate::config::EngineConfig;
use crate::effects::markers::Markers;
use crate::effects::scroll_to::{ScrollAnimator, ScrollHandle, ScrollTo};
use crate::effects::timeline::{Timeline, TimelineId};
use crate::frame::{Commands, Deferred, Fault, FaultSource, FrameContext, FrameReport, FrameSample};
use crate::host::Host;
use crate::scheduler::{FrameLoop, FrameScheduler, FrameToken};
use crate::trigger::{Trigger, TriggerEngine, TriggerId, TriggerOptions};
use crate::{Error, Result};

/// Handles returned by `create_scene`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    pub trigger: TriggerId,
    pub animation: AnimationId,
}

pub struct ScrollEngine {
    config: EngineConfig,
    triggers: TriggerEngine,
    animations: AnimationEngine,
    timelines: Vec<Timeline>,
    markers: Vec<Markers>,
    scrolls: ScrollAnimator,
    timers: Vec<(f64, Deferred)>,
    frame_loop: FrameLoop,
    last_offset: Option<(f64, f64)>,
    frame: u64,
}

impl ScrollEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            triggers: TriggerEngine::new(),
            animations: AnimationEngine::new(),
            timelines: Vec::new(),
            markers: Vec::new(),
            scrolls: ScrollAnimator::new(),
            timers: Vec::new(),
            frame_loop: FrameLoop::new(),
            last_offset: None,
            frame: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    // Registration

    pub fn create_trigger(&mut self, options: TriggerOptions, host: &dyn Host) -> Result<TriggerId> {
        let defaults = (self.config.start_trigger, self.config.end_trigger);
        self.triggers.register(options, defaults, host)
    }

    /// Register an animation; a bound trigger must exist
    pub fn create_animation(&mut self, options: AnimationOptions) -> Result<AnimationId> {
        if let Some(trigger) = options.bound_trigger() {
            if self.triggers.get(trigger).is_none() {
                return Err(Error::TriggerNotFound(trigger.to_string()));
            }
        }
        Ok(self.animations.register(options))
    }

    /// Create a trigger and an animation bound to it
    pub fn create_scene(
        &mut self,
        trigger: TriggerOptions,
        animation: AnimationOptions,
        host: &dyn Host,
    ) -> Result<Scene> {
        let trigger = self.create_trigger(trigger, host)?;
        let animation = self.create_animation(animation.bind_default(trigger))?;
        Ok(Scene { trigger, animation })
    }

    pub fn trigger(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.get(id)
    }

    pub(crate) fn trigger_engine(&self) -> &TriggerEngine {
        &self.triggers
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter()
    }

    pub fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(id)
    }

    pub fn animations(&self) -> impl Iterator<Item = &Animation> {
        self.animations.iter()
    }

    /// Remove a trigger; animations bound to it stop receiving progress
    pub fn remove_trigger(&mut self, id: TriggerId) -> Result<Trigger> {
        self.triggers
            .remove(id)
            .ok_or_else(|| Error::TriggerNotFound(id.to_string()))
    }

    pub fn remove_animation(&mut self, id: AnimationId) -> Result<Animation> {
        self.animations
            .remove(id)
            .ok_or_else(|| Error::AnimationNotFound(id.to_string()))
    }

    /// Feed progress to an animation without a trigger
    pub fn drive(&mut self, id: AnimationId, progress: f64) -> Result<()> {
        self.animations.drive(id, progress)
    }

    pub fn set_animation_active(&mut self, id: AnimationId, active: bool) -> Result<()> {
        self.animations.set_active(id, active)
    }

    // Timelines

    pub(crate) fn add_timeline(&mut self, timeline: Timeline) -> TimelineId {
        let id = timeline.id();
        self.timelines.push(timeline);
        id
    }

    pub fn timeline(&self, id: TimelineId) -> Result<&Timeline> {
        self.timelines
            .iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| Error::TimelineNotFound(id.to_string()))
    }

    pub fn timeline_mut(&mut self, id: TimelineId) -> Result<&mut Timeline> {
        self.timelines
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| Error::TimelineNotFound(id.to_string()))
    }

    pub fn timelines(&self) -> impl Iterator<Item = &Timeline> {
        self.timelines.iter()
    }

    pub fn remove_timeline(&mut self, id: TimelineId) -> Result<Timeline> {
        let index = self
            .timelines
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| Error::TimelineNotFound(id.to_string()))?;
        Ok(self.timelines.remove(index))
    }

    // Markers

    pub(crate) fn add_markers(&mut self, markers: Markers) {
        self.markers.push(markers);
    }

    pub(crate) fn markers_mut(&mut self) -> &mut Vec<Markers> {
        &mut self.markers
    }

    pub fn has_markers(&self, trigger: TriggerId) -> bool {
        self.markers.iter().any(|m| m.trigger() == trigger)
    }

    // Smooth scrolling

    /// Start a smooth scroll now; it advances from the next frame
    pub fn scroll_to(&mut self, request: ScrollTo, host: &mut dyn Host) -> Result<ScrollHandle> {
        let handle = ScrollHandle::new();
        self.scrolls.begin(handle, request, host, &self.config)?;
        Ok(handle)
    }

    /// Cancel a smooth scroll; `false` if it already finished
    pub fn cancel_scroll(&mut self, handle: ScrollHandle, host: &mut dyn Host) -> Result<bool> {
        self.scrolls.cancel(handle, host)
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolls.current().is_some()
    }

    /// Re-query element geometry after a resize or reflow
    pub fn refresh(&mut self, host: &dyn Host) -> Vec<Fault> {
        debug!("Refreshing trigger geometry");
        let faults = self.triggers.refresh_geometry(host);
        for fault in &faults {
            warn!("Refresh: {}", fault);
        }
        faults
    }

    // Frame loop

    /// Run one frame at `timestamp` (milliseconds)
    pub fn tick(&mut self, timestamp: f64, host: &mut dyn Host) -> FrameReport {
        let (x, y) = host.scroll_offset();
        let (last_x, last_y) = self.last_offset.unwrap_or((x, y));
        self.last_offset = Some((x, y));
        self.frame += 1;

        let (viewport_width, viewport_height) = host.viewport_size();
        let (document_width, document_height) = host.document_size();
        let sample = FrameSample {
            frame: self.frame,
            timestamp_ms: timestamp,
            scroll_x: x,
            scroll_y: y,
            velocity_x: x - last_x,
            velocity_y: y - last_y,
            viewport_width,
            viewport_height,
            document_width,
            document_height,
        };
        trace!("Frame {} at y={} (v={})", sample.frame, y, sample.velocity_y);

        let mut report = FrameReport {
            sample,
            ..Default::default()
        };
        let mut commands = Commands::default();

        {
            let mut ctx = FrameContext::new(&sample, &mut *host, &mut commands);
            self.triggers
                .update(&mut ctx, &mut report.events, &mut report.faults);
        }

        self.animations
            .update(&self.triggers, &mut *host, &mut report.faults);

        for timeline in &mut self.timelines {
            if let Err(e) = timeline.frame(&self.triggers, timestamp, &self.config, &mut *host) {
                warn!("Timeline {} failed: {}", timeline.id(), e);
                report
                    .faults
                    .push(Fault::new(FaultSource::Timeline { id: timeline.id() }, e));
            }
        }

        for markers in &self.markers {
            if let Err(e) = markers.update(&self.triggers, &sample, &mut *host) {
                warn!("Markers for {} failed: {}", markers.trigger(), e);
                report.faults.push(Fault::new(
                    FaultSource::Markers {
                        trigger: markers.trigger(),
                    },
                    e,
                ));
            }
        }

        self.apply_commands(commands, timestamp, &mut *host, &mut report.faults);
        self.scrolls.advance(timestamp, &mut *host, &mut report.faults);
        self.fire_timers(timestamp, &mut *host, &mut report.faults);

        report
    }

    fn apply_commands(
        &mut self,
        commands: Commands,
        timestamp: f64,
        host: &mut dyn Host,
        faults: &mut Vec<Fault>,
    ) {
        let Commands {
            scrolls,
            cancels,
            timers,
        } = commands;

        for handle in cancels {
            if let Err(e) = self.scrolls.cancel(handle, &mut *host) {
                faults.push(Fault::new(FaultSource::Scroll { handle }, e));
            }
        }

        for (handle, request) in scrolls {
            if let Err(e) = self.scrolls.begin(handle, request, &mut *host, &self.config) {
                warn!("Smooth scroll {} could not start: {}", handle, e);
                faults.push(Fault::new(FaultSource::Scroll { handle }, e));
            }
        }

        self.timers.extend(
            timers
                .into_iter()
                .map(|(delay, action)| (timestamp + delay, action)),
        );
    }

    fn fire_timers(&mut self, timestamp: f64, host: &mut dyn Host, faults: &mut Vec<Fault>) {
        if self.timers.is_empty() {
            return;
        }
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|(at, _)| *at <= timestamp);
        self.timers = pending;

        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, action) in due {
            if let Err(e) = action(&mut *host) {
                warn!("Deferred action failed: {}", e);
                faults.push(Fault::new(FaultSource::Timer, e));
            }
        }
    }

    /// Timers waiting for their due frame
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Start the loop; restarting cancels the outstanding frame first
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        info!("Scroll engine started");
        self.frame_loop.start(scheduler);
    }

    /// Stop the loop; a no-op when already stopped
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.frame_loop.is_running() {
            info!("Scroll engine stopped");
        }
        self.frame_loop.stop(scheduler);
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// Scheduler callback. Runs a frame for the outstanding token and
    /// requests the next one; stale tokens are ignored.
    pub fn on_frame(
        &mut self,
        token: FrameToken,
        timestamp: f64,
        host: &mut dyn Host,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<FrameReport> {
        if !self.frame_loop.accept(token) {
            trace!("Ignoring stale frame token {:?}", token);
            return None;
        }
        let report = self.tick(timestamp, host);
        self.frame_loop.reschedule(scheduler);
        Some(report)
    }

    /// Stop the loop and release everything this engine owns.
    ///
    /// Marker nodes are removed from the host. In-flight scrolls and pending
    /// timers are dropped without running their hooks.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler, host: &mut dyn Host) {
        self.stop(scheduler);
        for markers in self.markers.drain(..) {
            if let Err(e) = markers.destroy(&mut *host) {
                warn!("Failed to remove markers: {}", e);
            }
        }
        info!(
            "Tearing down {} triggers, {} animations, {} timelines",
            self.triggers.len(),
            self.animations.len(),
            self.timelines.len()
        );
        self.triggers.clear();
        self.animations.clear();
        self.timelines.clear();
        self.scrolls.clear();
        self.timers.clear();
        self.last_offset = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::animation::PropertySpec;
    use crate::host::{Rect, Viewport};
    use crate::page::Page;
    use crate::scheduler::ManualFrames;
    use crate::trigger::TriggerEventKind;

    fn page() -> Page {
        Page::new(1000.0, 800.0).with_document_size(1000.0, 5000.0)
    }

    #[test]
    fn test_scroll_range_scenario() {
        let mut page = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let id = engine
            .create_trigger(TriggerOptions::scroll(100.0, 300.0), &page)
            .unwrap();

        let mut progress = Vec::new();
        let mut edges = Vec::new();
        for (i, y) in [50.0, 100.0, 200.0, 300.0, 400.0].into_iter().enumerate() {
            page.set_scroll_offset(0.0, y);
            let report = engine.tick(i as f64 * 16.0, &mut page);
            progress.push(engine.trigger(id).unwrap().progress());
            edges.extend(report.events.into_iter().map(|e| (i, e.kind)));
        }

        assert_eq!(progress, vec![0.0, 0.0, 0.5, 1.0, 1.0]);
        assert_eq!(
            edges,
            vec![(2, TriggerEventKind::Enter), (3, TriggerEventKind::Leave)]
        );
    }

    #[test]
    fn test_velocity() {
        let mut page = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        page.set_scroll_offset(0.0, 100.0);
        assert_eq!(engine.tick(0.0, &mut page).sample.velocity_y, 0.0);
        page.set_scroll_offset(0.0, 130.0);
        assert_eq!(engine.tick(16.0, &mut page).sample.velocity_y, 30.0);
        page.set_scroll_offset(0.0, 120.0);
        assert_eq!(engine.tick(32.0, &mut page).sample.velocity_y, -10.0);
    }

    #[test]
    fn test_scene_binds_animation() {
        let mut page = page();
        let hero = page.add("hero", Rect::new(0.0, 0.0, 1000.0, 600.0));
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let scene = engine
            .create_scene(
                TriggerOptions::scroll(0.0, 200.0),
                AnimationOptions::new(hero.clone()).property("opacity", PropertySpec::tween(0.0, 1.0)),
                &page,
            )
            .unwrap();

        assert_eq!(engine.animation(scene.animation).unwrap().trigger(), Some(scene.trigger));
        page.set_scroll_offset(0.0, 50.0);
        engine.tick(0.0, &mut page);
        assert_eq!(page.style(&hero, "opacity"), Some("0.25"));
    }

    #[test]
    fn test_animation_with_unknown_trigger_rejected() {
        let page = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let id = engine.create_trigger(TriggerOptions::scroll(0.0, 1.0), &page).unwrap();
        engine.remove_trigger(id).unwrap();
        let err = engine
            .create_animation(AnimationOptions::new("hero").trigger(id))
            .unwrap_err();
        assert!(matches!(err, Error::TriggerNotFound(_)));
        assert!(matches!(engine.remove_trigger(id), Err(Error::TriggerNotFound(_))));
    }

    #[test]
    fn test_sample_is_shared_within_frame() {
        let mut page = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = seen.clone();
        engine
            .create_trigger(
                TriggerOptions::scroll(0.0, 1000.0).on_update(move |t, ctx| {
                    first.borrow_mut().push(t.progress());
                    ctx.host.set_scroll_offset(0.0, 900.0);
                    Ok(())
                }),
                &page,
            )
            .unwrap();
        let second = seen.clone();
        engine
            .create_trigger(
                TriggerOptions::scroll(0.0, 1000.0).on_update(move |t, _| {
                    second.borrow_mut().push(t.progress());
                    Ok(())
                }),
                &page,
            )
            .unwrap();

        page.set_scroll_offset(0.0, 500.0);
        engine.tick(0.0, &mut page);
        assert_eq!(*seen.borrow(), vec![0.5, 0.5]);

        // the write lands on the next frame
        let report = engine.tick(16.0, &mut page);
        assert_eq!(report.sample.scroll_y, 900.0);
    }

    #[test]
    fn test_restart_runs_one_loop() {
        let mut page = page();
        let mut frames = ManualFrames::new();
        let mut engine = ScrollEngine::new(EngineConfig::default());

        engine.start(&mut frames);
        engine.start(&mut frames);
        assert_eq!(frames.pending(), 1);

        let mut ran = 0;
        for step in 0..3 {
            for token in frames.take_due() {
                if engine.on_frame(token, step as f64 * 16.0, &mut page, &mut frames).is_some() {
                    ran += 1;
                }
            }
        }
        assert_eq!(ran, 3);
        assert_eq!(engine.frame_count(), 3);
        assert_eq!(frames.pending(), 1);
    }

    #[test]
    fn test_stop_and_stale_tokens() {
        let mut page = page();
        let mut frames = ManualFrames::new();
        let mut engine = ScrollEngine::new(EngineConfig::default());

        engine.stop(&mut frames);
        engine.start(&mut frames);
        let token = frames.take_due()[0];
        engine.stop(&mut frames);
        engine.stop(&mut frames);

        assert!(engine.on_frame(token, 0.0, &mut page, &mut frames).is_none());
        assert_eq!(frames.pending(), 0);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_deferred_timer_fires_on_due_frame() {
        let mut page = page();
        let hero = page.add("hero", Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let target = hero.clone();
        engine
            .create_trigger(
                TriggerOptions::scroll(0.0, 1000.0).on_enter(move |_, ctx| {
                    let target = target.clone();
                    ctx.defer(100.0, move |host| host.set_style(&target, "opacity", "1"));
                    Ok(())
                }),
                &page,
            )
            .unwrap();

        page.set_scroll_offset(0.0, 100.0);
        engine.tick(1000.0, &mut page);
        assert_eq!(engine.pending_timers(), 1);
        engine.tick(1050.0, &mut page);
        assert_eq!(page.style(&hero, "opacity"), None);
        engine.tick(1100.0, &mut page);
        assert_eq!(page.style(&hero, "opacity"), Some("1"));
        assert_eq!(engine.pending_timers(), 0);
    }

    #[test]
    fn test_scroll_requested_from_callback() {
        let mut page = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        engine
            .create_trigger(
                TriggerOptions::scroll(0.0, 1000.0).on_enter(|_, ctx| {
                    ctx.scroll_to(ScrollTo::offset(600.0).duration(100.0));
                    Ok(())
                }),
                &page,
            )
            .unwrap();

        page.set_scroll_offset(0.0, 100.0);
        engine.tick(0.0, &mut page);
        assert!(engine.is_scrolling());
        engine.tick(50.0, &mut page);
        engine.tick(100.0, &mut page);
        assert_eq!(page.scroll_offset().1, 600.0);
        assert!(!engine.is_scrolling());
    }

    #[test]
    fn test_scroll_to_and_cancel() {
        let mut page = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let handle = engine.scroll_to(ScrollTo::offset(1000.0), &mut page).unwrap();
        engine.tick(0.0, &mut page);
        assert!(engine.cancel_scroll(handle, &mut page).unwrap());
        assert!(!engine.cancel_scroll(handle, &mut page).unwrap());
    }

    #[test]
    fn test_fault_reported_and_pass_continues() {
        let mut page = page();
        let hero = page.add("hero", Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut engine = ScrollEngine::new(EngineConfig::default());
        engine
            .create_trigger(
                TriggerOptions::scroll(0.0, 100.0).on_update(|_, _| Err(Error::Other("bad".to_string()))),
                &page,
            )
            .unwrap();
        let animation = engine
            .create_animation(AnimationOptions::new(hero.clone()).property("opacity", PropertySpec::tween(0.0, 1.0)))
            .unwrap();
        engine.drive(animation, 1.0).unwrap();

        page.set_scroll_offset(0.0, 50.0);
        let report = engine.tick(0.0, &mut page);
        assert_eq!(report.faults.len(), 1);
        assert_eq!(page.style(&hero, "opacity"), Some("1"));
    }

    #[test]
    fn test_refresh_picks_up_moved_element() {
        let mut page = page();
        let card = page.add("card", Rect::new(2000.0, 0.0, 500.0, 400.0));
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let id = engine.create_trigger(TriggerOptions::element(card.clone()), &page).unwrap();

        page.set_rect(&card, Rect::new(1000.0, 0.0, 500.0, 400.0)).unwrap();
        page.set_scroll_offset(0.0, 1040.0);
        engine.tick(0.0, &mut page);
        assert_eq!(engine.trigger(id).unwrap().progress(), 0.0);

        assert!(engine.refresh(&page).is_empty());
        engine.tick(16.0, &mut page);
        assert!((engine.trigger(id).unwrap().progress() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_removed_element_skipped_for_frame() {
        let mut page = page();
        let hero = page.add("hero", Rect::new(0.0, 0.0, 1000.0, 600.0));
        let card = page.add("card", Rect::new(1000.0, 0.0, 500.0, 400.0));
        let mut engine = ScrollEngine::new(EngineConfig::default());

        let calls = Rc::new(RefCell::new(0));
        let calls_in = calls.clone();
        let card_trigger = engine
            .create_trigger(
                TriggerOptions::element(card.clone()).on_update(move |_, _| {
                    *calls_in.borrow_mut() += 1;
                    Ok(())
                }),
                &page,
            )
            .unwrap();
        let range = engine.create_trigger(TriggerOptions::scroll(0.0, 2000.0), &page).unwrap();
        for target in [&card, &hero] {
            engine
                .create_animation(
                    AnimationOptions::new(target.clone())
                        .property("opacity", PropertySpec::tween(0.0, 1.0))
                        .trigger(range),
                )
                .unwrap();
        }

        crate::host::NodeOps::remove_node(&mut page, &card).unwrap();
        assert_eq!(engine.refresh(&page).len(), 1);

        page.set_scroll_offset(0.0, 1000.0);
        let report = engine.tick(0.0, &mut page);

        assert_eq!(*calls.borrow(), 0);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].trigger, range);
        assert_eq!(report.faults.len(), 2);
        assert!(report
            .faults
            .iter()
            .any(|f| f.source == FaultSource::Trigger { id: card_trigger, hook: "update" }));
        assert!(!engine.trigger(card_trigger).unwrap().is_active());
        assert_eq!(page.style(&hero, "opacity"), Some("0.5"));
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut page = page();
        let mut frames = ManualFrames::new();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let id = engine.create_trigger(TriggerOptions::scroll(0.0, 100.0), &page).unwrap();
        engine.create_animation(AnimationOptions::new("x").trigger(id)).unwrap();
        engine.start(&mut frames);

        engine.teardown(&mut frames, &mut page);
        assert!(!engine.is_running());
        assert_eq!(frames.pending(), 0);
        assert_eq!(engine.triggers().count(), 0);
        assert_eq!(engine.animations().count(), 0);
    }
}
