//! Timelines
//!
//! A timeline sequences tweens along a normalized axis. Each item occupies
//! `[position, position + duration]`; at timeline position `m` its local
//! progress is `clamp((m - position) / duration, 0, 1)` run through its
//! timing. Timelines are driven by their trigger (scrub mode, with
//! exponential smoothing), by [`Timeline::play`] (time based), or by
//! [`Timeline::seek`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::animation::{apply_properties, PropertySpec};
use crate::config::EngineConfig;
use crate::easing::Timing;
use crate::engine::ScrollEngine;
use crate::host::{Host, TargetId};
use crate::trigger::{Offset, TriggerEngine, TriggerId, TriggerOptions};
use crate::value::parse_float_prefix;
use crate::{Error, Result};

use super::pin::{PinHandle, PinOptions};

const DEFAULT_TWEEN_DURATION: f64 = 0.5;
const DEFAULT_PLAY_DURATION_MS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimelineId(Uuid);

impl TimelineId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an item or label is placed
///
/// Parsed from strings: `"+=0.2"` / `"-=0.2"` relative to the end of the
/// last item, `"0.4"` absolute, `"intro"`, `"intro+=0.1"`, `"intro-=0.1"`
/// relative to a label.
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    Absolute(f64),
    Relative(f64),
    Label { name: String, offset: f64 },
}

impl From<f64> for Position {
    fn from(at: f64) -> Self {
        Position::Absolute(at)
    }
}

impl From<&str> for Position {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("+=") {
            return Position::Relative(parse_float_prefix(rest).unwrap_or(0.0));
        }
        if let Some(rest) = s.strip_prefix("-=") {
            return Position::Relative(-parse_float_prefix(rest).unwrap_or(0.0));
        }
        if let Some(at) = s.parse::<f64>().ok().filter(|at| at.is_finite()) {
            return Position::Absolute(at);
        }

        let (name, offset) = if let Some(i) = s.find("+=") {
            (&s[..i], parse_float_prefix(&s[i + 2..]).unwrap_or(0.0))
        } else if let Some(i) = s.find("-=") {
            (&s[..i], -parse_float_prefix(&s[i + 2..]).unwrap_or(0.0))
        } else {
            (s, 0.0)
        };
        Position::Label {
            name: name.to_string(),
            offset,
        }
    }
}

impl From<String> for Position {
    fn from(s: String) -> Self {
        Position::from(s.as_str())
    }
}

/// A tween waiting to be placed on a timeline
#[derive(Debug, Clone)]
pub struct TimelineTween {
    target: TargetId,
    properties: Vec<(String, PropertySpec)>,
    duration: f64,
    timing: Timing,
}

impl TimelineTween {
    pub fn new(target: impl Into<TargetId>) -> Self {
        Self {
            target: target.into(),
            properties: Vec::new(),
            duration: DEFAULT_TWEEN_DURATION,
            timing: Timing::default(),
        }
    }

    pub fn property(mut self, name: impl Into<String>, spec: PropertySpec) -> Self {
        self.properties.push((name.into(), spec));
        self
    }

    /// Length on the timeline axis; zero or less makes a step
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn timing(mut self, timing: impl Into<Timing>) -> Self {
        self.timing = timing.into();
        self
    }

    pub fn target(&self) -> &TargetId {
        &self.target
    }

    pub fn properties(&self) -> &[(String, PropertySpec)] {
        &self.properties
    }

    /// Local progress at timeline position `at`
    pub fn progress_at(&self, position: f64, at: f64) -> f64 {
        if self.duration <= 0.0 {
            return if at >= position { 1.0 } else { 0.0 };
        }
        let local = ((at - position) / self.duration).clamp(0.0, 1.0);
        self.timing.apply(local)
    }
}

/// A placed tween
#[derive(Debug, Clone)]
pub struct TimelineItem {
    pub position: f64,
    pub tween: TimelineTween,
}

impl TimelineItem {
    pub fn end(&self) -> f64 {
        self.position + self.tween.duration
    }
}

type PlayUpdate = Box<dyn FnMut(f64, &mut dyn Host) -> Result<()>>;
type PlayComplete = Box<dyn FnOnce(&mut dyn Host) -> Result<()>>;

/// Options for [`Timeline::play`]
pub struct PlayOptions {
    duration_ms: f64,
    timing: Timing,
    on_update: Option<PlayUpdate>,
    on_complete: Option<PlayComplete>,
}

impl PlayOptions {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            ..Default::default()
        }
    }

    pub fn timing(mut self, timing: impl Into<Timing>) -> Self {
        self.timing = timing.into();
        self
    }

    /// Called each frame with the raw playback progress
    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: FnMut(f64, &mut dyn Host) -> Result<()> + 'static,
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
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_PLAY_DURATION_MS,
            timing: Timing::default(),
            on_update: None,
            on_complete: None,
        }
    }
}

struct Playback {
    options: PlayOptions,
    started: Option<f64>,
}

/// Exponential smoothing step toward `target`
pub fn scrub_step(current: f64, target: f64, smoothness: f64) -> f64 {
    if smoothness <= 0.0 {
        target
    } else {
        current + (target - current) * (1.0 - smoothness)
    }
}

pub struct Timeline {
    id: TimelineId,
    trigger: TriggerId,
    pin: Option<PinHandle>,
    scrub: bool,
    smoothness: f64,
    items: Vec<TimelineItem>,
    labels: BTreeMap<String, f64>,
    current: f64,
    last_target: Option<f64>,
    settled: bool,
    playback: Option<Playback>,
}

impl Timeline {
    fn new(trigger: TriggerId, pin: Option<PinHandle>, scrub: bool, smoothness: f64) -> Self {
        Self {
            id: TimelineId::new(),
            trigger,
            pin,
            scrub,
            smoothness,
            items: Vec::new(),
            labels: BTreeMap::new(),
            current: 0.0,
            last_target: None,
            settled: false,
            playback: None,
        }
    }

    pub fn id(&self) -> TimelineId {
        self.id
    }

    pub fn trigger(&self) -> TriggerId {
        self.trigger
    }

    pub fn pin(&self) -> Option<&PinHandle> {
        self.pin.as_ref()
    }

    pub fn is_scrubbed(&self) -> bool {
        self.scrub
    }

    /// Smoothed position last applied
    pub fn progress(&self) -> f64 {
        self.current
    }

    /// True once a scrubbed timeline has caught up with an idle trigger
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub fn labels(&self) -> &BTreeMap<String, f64> {
        &self.labels
    }

    pub fn label_position(&self, name: &str) -> Option<f64> {
        self.labels.get(name).copied()
    }

    /// End of the last item added, where relative positions count from
    pub fn end(&self) -> f64 {
        self.items.last().map(TimelineItem::end).unwrap_or(0.0)
    }

    fn resolve(&self, position: Position) -> f64 {
        match position {
            Position::Absolute(at) => at,
            Position::Relative(offset) => self.end() + offset,
            Position::Label { name, offset } => match self.labels.get(&name) {
                Some(at) => at + offset,
                None => {
                    warn!("Timeline {}: unknown label {:?}, using 0", self.id, name);
                    offset
                }
            },
        }
    }

    /// Place `tween` at an absolute position
    pub fn add(&mut self, tween: TimelineTween, position: f64) -> &mut Self {
        debug!("Timeline {}: {} at {}", self.id, tween.target, position);
        self.items.push(TimelineItem { position, tween });
        self
    }

    /// Place `tween` at a position string or number
    pub fn from(&mut self, tween: TimelineTween, position: impl Into<Position>) -> &mut Self {
        let at = self.resolve(position.into());
        self.add(tween, at)
    }

    /// Place `tween` right after the last item
    pub fn to(&mut self, tween: TimelineTween) -> &mut Self {
        self.from(tween, Position::Relative(0.0))
    }

    pub fn add_label(&mut self, name: impl Into<String>, position: impl Into<Position>) -> &mut Self {
        let at = self.resolve(position.into());
        self.labels.insert(name.into(), at);
        self
    }

    /// Apply every item at a position or label without moving the scrub state
    pub fn seek(&mut self, position: impl Into<Position>, host: &mut dyn Host) -> Result<&mut Self> {
        let at = self.resolve(position.into());
        self.apply_at(at, host)?;
        Ok(self)
    }

    /// Run the timeline from 0 to 1 over time, starting on the next frame.
    /// Replaces a playback already in progress.
    pub fn play(&mut self, options: PlayOptions) -> &mut Self {
        debug!("Timeline {}: playing over {}ms", self.id, options.duration_ms);
        self.playback = Some(Playback {
            options,
            started: None,
        });
        self
    }

    /// Stop playback without completing it
    pub fn stop(&mut self) -> bool {
        self.playback.take().is_some()
    }

    fn apply_at(&self, at: f64, host: &mut dyn Host) -> Result<()> {
        for item in &self.items {
            let t = item.tween.progress_at(item.position, at);
            apply_properties(&mut *host, &item.tween.target, &item.tween.properties, t)?;
        }
        Ok(())
    }

    pub(crate) fn frame(
        &mut self,
        triggers: &TriggerEngine,
        timestamp: f64,
        config: &EngineConfig,
        host: &mut dyn Host,
    ) -> Result<()> {
        if let Some(playback) = self.playback.take() {
            return self.advance_playback(playback, timestamp, host);
        }
        if !self.scrub {
            return Ok(());
        }

        let trigger = match triggers.get(self.trigger) {
            Some(trigger) => trigger,
            None => return Ok(()),
        };
        let target = trigger.progress();
        if trigger.is_active() || self.last_target != Some(target) {
            self.settled = false;
        }
        self.last_target = Some(target);
        if self.settled {
            return Ok(());
        }

        self.current = scrub_step(self.current, target, self.smoothness);
        if !trigger.is_active() && (self.current - target).abs() <= config.settle_epsilon {
            self.current = target;
            self.settled = true;
        }
        self.apply_at(self.current, host)
    }

    fn advance_playback(&mut self, mut playback: Playback, timestamp: f64, host: &mut dyn Host) -> Result<()> {
        let started = *playback.started.get_or_insert(timestamp);
        let duration = playback.options.duration_ms;
        let progress = if duration <= 0.0 {
            1.0
        } else {
            ((timestamp - started) / duration).clamp(0.0, 1.0)
        };

        self.current = playback.options.timing.apply(progress);
        let applied = self.apply_at(self.current, &mut *host);
        let updated = match playback.options.on_update.as_mut() {
            Some(on_update) => on_update(progress, &mut *host),
            None => Ok(()),
        };

        if progress < 1.0 {
            self.playback = Some(playback);
        } else {
            debug!("Timeline {}: playback complete", self.id);
            self.settled = false;
            self.last_target = None;
            if let Some(on_complete) = playback.options.on_complete.take() {
                on_complete(&mut *host)?;
            }
        }
        applied.and(updated)
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("id", &self.id)
            .field("trigger", &self.trigger)
            .field("scrub", &self.scrub)
            .field("smoothness", &self.smoothness)
            .field("items", &self.items.len())
            .field("labels", &self.labels)
            .field("current", &self.current)
            .field("playing", &self.playback.is_some())
            .finish_non_exhaustive()
    }
}

enum Driver {
    Trigger(TriggerOptions),
    Element(TargetId),
}

/// Options for [`ScrollEngine::create_timeline`]
pub struct TimelineOptions {
    driver: Driver,
    scrub: bool,
    smoothness: Option<f64>,
    pin: Option<(Option<TargetId>, PinOptions)>,
    markers: bool,
}

impl TimelineOptions {
    fn with_driver(driver: Driver) -> Self {
        Self {
            driver,
            scrub: false,
            smoothness: None,
            pin: None,
            markers: false,
        }
    }

    /// Driven by absolute scroll offsets
    pub fn scroll(start: impl Into<Offset>, end: impl Into<Offset>) -> Self {
        Self::with_driver(Driver::Trigger(
            TriggerOptions::scroll(start, end).label("timeline"),
        ))
    }

    /// Driven by the first viewport height of scrolling
    pub fn viewport() -> Self {
        Self::scroll(0.0, Offset::computed(|host| host.viewport_size().1))
    }

    /// Driven by an element's visibility with the default thresholds
    pub fn element(target: impl Into<TargetId>) -> Self {
        Self::with_driver(Driver::Element(target.into()))
    }

    /// Driven by a fully configured trigger
    pub fn trigger(options: TriggerOptions) -> Self {
        Self::with_driver(Driver::Trigger(options))
    }

    /// Follow the trigger's progress each frame
    pub fn scrub(mut self, scrub: bool) -> Self {
        self.scrub = scrub;
        self
    }

    /// Scrub smoothing in [0, 1); 0 tracks the trigger exactly
    pub fn smoothness(mut self, smoothness: f64) -> Self {
        self.smoothness = Some(smoothness);
        self
    }

    /// Pin the trigger element while the timeline runs
    pub fn pin(mut self, options: PinOptions) -> Self {
        self.pin = Some((None, options));
        self
    }

    /// Pin a different element while the timeline runs
    pub fn pin_target(mut self, target: impl Into<TargetId>, options: PinOptions) -> Self {
        self.pin = Some((Some(target.into()), options));
        self
    }

    /// Show debug markers for the trigger
    pub fn markers(mut self, markers: bool) -> Self {
        self.markers = markers;
        self
    }
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self::viewport()
    }
}

impl ScrollEngine {
    pub fn create_timeline(&mut self, options: TimelineOptions, host: &mut dyn Host) -> Result<TimelineId> {
        let TimelineOptions {
            driver,
            scrub,
            smoothness,
            pin,
            markers,
        } = options;

        let smoothness = smoothness.unwrap_or(self.config().scrub_smoothness);
        if !(0.0..1.0).contains(&smoothness) {
            return Err(Error::InvalidOption(format!(
                "scrub smoothness {} is outside [0, 1)",
                smoothness
            )));
        }

        let (trigger_options, element) = match driver {
            Driver::Trigger(options) => (options, None),
            Driver::Element(target) => (
                TriggerOptions::element(target.clone()).label(format!("timeline {}", target)),
                Some(target),
            ),
        };
        let pin_target = match &pin {
            Some((Some(target), _)) => Some(target.clone()),
            Some((None, _)) => Some(element.ok_or_else(|| {
                Error::InvalidOption("pinning needs an element trigger or an explicit target".to_string())
            })?),
            None => None,
        };

        let trigger = self.create_trigger(trigger_options, &*host)?;
        let pin = match (pin_target, pin) {
            (Some(target), Some((_, options))) => Some(self.pin(target, options, &mut *host)?),
            _ => None,
        };
        if markers {
            self.create_markers(trigger, &mut *host)?;
        }

        let timeline = Timeline::new(trigger, pin, scrub, smoothness);
        debug!("Created timeline {} (scrub: {})", timeline.id(), scrub);
        Ok(self.add_timeline(timeline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::easing::Easing;
    use crate::host::{Rect, Viewport};
    use crate::page::Page;

    fn page() -> (Page, TargetId) {
        let mut page = Page::new(1000.0, 800.0).with_document_size(1000.0, 5000.0);
        let card = page.add("card", Rect::new(1000.0, 0.0, 400.0, 400.0));
        (page, card)
    }

    fn fade(target: &TargetId) -> TimelineTween {
        TimelineTween::new(target).property("opacity", PropertySpec::tween(0.0, 1.0))
    }

    fn detached() -> Timeline {
        Timeline::new(TriggerId::new(), None, false, 0.0)
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!(Position::from("+=0.5"), Position::Relative(0.5));
        assert_eq!(Position::from("-=0.25"), Position::Relative(-0.25));
        assert_eq!(Position::from("+=abc"), Position::Relative(0.0));
        assert_eq!(Position::from("0.3"), Position::Absolute(0.3));
        assert_eq!(
            Position::from("2col"),
            Position::Label {
                name: "2col".to_string(),
                offset: 0.0
            }
        );
        assert_eq!(
            Position::from("2col+=0.5"),
            Position::Label {
                name: "2col".to_string(),
                offset: 0.5
            }
        );
        assert_eq!(
            Position::from("intro"),
            Position::Label {
                name: "intro".to_string(),
                offset: 0.0
            }
        );
        assert_eq!(
            Position::from("intro+=0.1"),
            Position::Label {
                name: "intro".to_string(),
                offset: 0.1
            }
        );
        assert_eq!(
            Position::from("intro-=0.1"),
            Position::Label {
                name: "intro".to_string(),
                offset: -0.1
            }
        );
    }

    #[test]
    fn test_chained_positions() {
        let target = TargetId::new("card");
        let mut timeline = detached();
        timeline
            .to(fade(&target))
            .to(fade(&target))
            .from(fade(&target), "-=0.25")
            .add_label("mid", "+=0")
            .from(fade(&target).duration(0.1), "mid+=0.25")
            .from(fade(&target), "ghost")
            .add(fade(&target), 2.0);

        let positions: Vec<f64> = timeline.items().iter().map(|i| i.position).collect();
        assert_eq!(positions, vec![0.0, 0.5, 0.75, 1.5, 0.0, 2.0]);
        assert_eq!(timeline.label_position("mid"), Some(1.25));
        assert_eq!(timeline.end(), 2.5);
    }

    #[test]
    fn test_item_progress() {
        let tween = fade(&TargetId::new("card")).duration(0.5);
        assert_eq!(tween.progress_at(0.25, 0.0), 0.0);
        assert_eq!(tween.progress_at(0.25, 0.5), 0.5);
        assert_eq!(tween.progress_at(0.25, 2.0), 1.0);

        let step = fade(&TargetId::new("card")).duration(0.0);
        assert_eq!(step.progress_at(0.5, 0.49), 0.0);
        assert_eq!(step.progress_at(0.5, 0.5), 1.0);

        let eased = fade(&TargetId::new("card")).duration(1.0).timing(Easing::EaseInQuad);
        assert_eq!(eased.progress_at(0.0, 0.5), 0.25);
    }

    #[test]
    fn test_seek_position_and_label() {
        let (mut page, card) = page();
        let mut timeline = detached();
        timeline.add(fade(&card).duration(1.0), 0.0).add_label("half", 0.5);

        timeline.seek(0.25, &mut page).unwrap();
        assert_eq!(page.style(&card, "opacity"), Some("0.25"));

        timeline.seek("half", &mut page).unwrap();
        assert_eq!(page.style(&card, "opacity"), Some("0.5"));
        assert_eq!(timeline.progress(), 0.0);
    }

    #[test]
    fn test_scrub_step_converges() {
        for smoothness in [0.0, 0.1, 0.5, 0.9, 0.99] {
            let (mut current, target) = (0.0_f64, 1.0_f64);
            let mut ticks = 0;
            while (target - current).abs() >= 1e-3 {
                let next = scrub_step(current, target, smoothness);
                assert!(next >= current);
                current = next;
                ticks += 1;
                assert!(ticks <= 1000, "no convergence at smoothness {}", smoothness);
            }
        }
        assert_eq!(scrub_step(0.2, 0.8, 0.0), 0.8);
    }

    #[test]
    fn test_scrubbed_timeline_smooths_toward_trigger() {
        let (mut page, card) = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let id = engine
            .create_timeline(
                TimelineOptions::scroll(0.0, 1000.0).scrub(true).smoothness(0.5),
                &mut page,
            )
            .unwrap();
        engine.timeline_mut(id).unwrap().add(fade(&card).duration(1.0), 0.0);

        page.set_scroll_offset(0.0, 500.0);
        engine.tick(0.0, &mut page);
        assert_eq!(page.style(&card, "opacity"), Some("0.25"));
        engine.tick(16.0, &mut page);
        assert_eq!(page.style(&card, "opacity"), Some("0.375"));
    }

    #[test]
    fn test_scrub_settles_after_trigger_leaves() {
        let (mut page, card) = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let id = engine
            .create_timeline(
                TimelineOptions::scroll(0.0, 100.0).scrub(true).smoothness(0.5),
                &mut page,
            )
            .unwrap();
        engine.timeline_mut(id).unwrap().add(fade(&card).duration(1.0), 0.0);

        page.set_scroll_offset(0.0, 50.0);
        engine.tick(0.0, &mut page);
        page.set_scroll_offset(0.0, 1000.0);
        let mut frames = 0;
        while !engine.timeline(id).unwrap().is_settled() {
            engine.tick(frames as f64 * 16.0, &mut page);
            frames += 1;
            assert!(frames < 100);
        }
        assert_eq!(engine.timeline(id).unwrap().progress(), 1.0);
        assert_eq!(page.style(&card, "opacity"), Some("1"));

        // settled: no further writes
        crate::host::PropertySink::set_style(&mut page, &card, "opacity", "0.3").unwrap();
        engine.tick(5000.0, &mut page);
        assert_eq!(page.style(&card, "opacity"), Some("0.3"));
    }

    #[test]
    fn test_play_over_time() {
        let (mut page, card) = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let id = engine.create_timeline(TimelineOptions::default(), &mut page).unwrap();

        let updates = Rc::new(Cell::new(0));
        let done = Rc::new(Cell::new(false));
        let (u, d) = (updates.clone(), done.clone());
        engine
            .timeline_mut(id)
            .unwrap()
            .add(fade(&card).duration(1.0), 0.0)
            .play(
                PlayOptions::new(100.0)
                    .on_update(move |_, _| {
                        u.set(u.get() + 1);
                        Ok(())
                    })
                    .on_complete(move |_| {
                        d.set(true);
                        Ok(())
                    }),
            );

        engine.tick(1000.0, &mut page);
        assert_eq!(page.style(&card, "opacity"), Some("0"));
        engine.tick(1050.0, &mut page);
        assert_eq!(page.style(&card, "opacity"), Some("0.5"));
        assert!(!done.get());

        engine.tick(1200.0, &mut page);
        assert_eq!(page.style(&card, "opacity"), Some("1"));
        assert!(done.get());
        assert_eq!(updates.get(), 3);
        assert!(!engine.timeline(id).unwrap().is_playing());
    }

    #[test]
    fn test_element_timeline_with_pin_and_markers() {
        let (mut page, card) = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let id = engine
            .create_timeline(
                TimelineOptions::element(card.clone())
                    .pin(PinOptions::default())
                    .markers(true),
                &mut page,
            )
            .unwrap();

        let timeline = engine.timeline(id).unwrap();
        assert_eq!(timeline.pin().unwrap().target(), &card);
        assert!(engine.has_markers(timeline.trigger()));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let (mut page, _) = page();
        let mut engine = ScrollEngine::new(EngineConfig::default());
        assert!(matches!(
            engine.create_timeline(TimelineOptions::viewport().smoothness(1.0), &mut page),
            Err(Error::InvalidOption(_))
        ));
        assert!(matches!(
            engine.create_timeline(TimelineOptions::viewport().pin(PinOptions::default()), &mut page),
            Err(Error::InvalidOption(_))
        ));
        assert_eq!(engine.triggers().count(), 0);
    }
}
