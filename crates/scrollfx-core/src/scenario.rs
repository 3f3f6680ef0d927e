//! TOML scenarios
//!
//! A scenario describes a page (viewport and element boxes), the triggers,
//! animations and effects registered on it, and a scripted list of scroll
//! offsets to replay. [`Scenario::build`] turns it into a live engine over an
//! in-memory [`Page`].
//!
//! ```toml
//! name = "fade"
//!
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[elements]]
//! id = "hero"
//! top = 900
//! height = 600
//!
//! [[triggers]]
//! name = "hero"
//! element = "hero"
//!
//! [[animations]]
//! target = "hero"
//! trigger = "hero"
//! easing = "easeOutCubic"
//! properties.opacity = { from = 0, to = 1 }
//!
//! [[effects]]
//! kind = "markers"
//! trigger = "hero"
//!
//! [script]
//! offsets = [0, 400, 800, 1200]
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::animation::{AnimationOptions, PropertySpec};
use crate::config::EngineConfig;
use crate::easing::Easing;
use crate::effects::{
    HorizontalOptions, ParallaxOptions, PinOptions, ProgressOptions, RevealOptions, StickyOptions,
};
use crate::engine::ScrollEngine;
use crate::frame::FrameReport;
use crate::host::{Rect, TargetId, Viewport};
use crate::page::Page;
use crate::scheduler::{FrameScheduler, FrameToken};
use crate::trigger::{TriggerEventKind, TriggerId, TriggerOptions};
use crate::{Error, Result};

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    800.0
}

fn default_frame_ms() -> f64 {
    16.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewportSpec {
    #[serde(default = "default_viewport_width")]
    pub width: f64,
    #[serde(default = "default_viewport_height")]
    pub height: f64,
    /// Fixed scrollable height; derived from element boxes when absent
    #[serde(default)]
    pub document_height: Option<f64>,
}

impl Default for ViewportSpec {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
            document_height: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementSpec {
    pub id: TargetId,
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    /// Defaults to the viewport width
    #[serde(default)]
    pub width: Option<f64>,
    pub height: f64,
    #[serde(default)]
    pub parent: Option<TargetId>,
}

/// A named trigger: either `element` or both `start` and `end`
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerSpec {
    pub name: String,
    #[serde(default)]
    pub element: Option<TargetId>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub start_trigger: Option<f64>,
    #[serde(default)]
    pub end_trigger: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationSpec {
    pub target: TargetId,
    /// Name of a trigger declared in `[[triggers]]`
    pub trigger: String,
    #[serde(default)]
    pub easing: Option<Easing>,
    #[serde(default)]
    pub label: Option<String>,
    pub properties: BTreeMap<String, PropertySpec>,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EffectSpec {
    Pin {
        target: TargetId,
        #[serde(default)]
        options: PinOptions,
    },
    Parallax {
        target: TargetId,
        #[serde(default)]
        options: ParallaxOptions,
    },
    Reveal {
        targets: Vec<TargetId>,
        #[serde(default)]
        options: RevealOptions,
    },
    Sticky {
        target: TargetId,
        #[serde(default)]
        options: StickyOptions,
    },
    Progress {
        #[serde(default)]
        bar: Option<TargetId>,
        #[serde(default)]
        options: ProgressOptions,
    },
    Horizontal {
        container: TargetId,
        content: TargetId,
        #[serde(default)]
        options: HorizontalOptions,
    },
    Markers {
        trigger: String,
    },
}

impl EffectSpec {
    fn kind(&self) -> &'static str {
        match self {
            EffectSpec::Pin { .. } => "pin",
            EffectSpec::Parallax { .. } => "parallax",
            EffectSpec::Reveal { .. } => "reveal",
            EffectSpec::Sticky { .. } => "sticky",
            EffectSpec::Progress { .. } => "progress",
            EffectSpec::Horizontal { .. } => "horizontal",
            EffectSpec::Markers { .. } => "markers",
        }
    }
}

/// Scroll offsets to replay, one per frame
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptSpec {
    #[serde(default)]
    pub offsets: Vec<f64>,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f64,
}

impl Default for ScriptSpec {
    fn default() -> Self {
        Self {
            offsets: Vec::new(),
            frame_ms: default_frame_ms(),
        }
    }
}

#[derive(Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub viewport: ViewportSpec,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    #[serde(default)]
    pub triggers: Vec<TriggerSpec>,
    #[serde(default)]
    pub animations: Vec<AnimationSpec>,
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
    #[serde(default)]
    pub script: ScriptSpec,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut scenario = Self::parse(&content)?;
        if scenario.name.is_empty() {
            scenario.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(scenario)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for element in &self.elements {
            if !ids.insert(&element.id) {
                return Err(Error::Scenario(format!("duplicate element `{}`", element.id)));
            }
            if let Some(parent) = &element.parent {
                if !ids.contains(parent) {
                    return Err(Error::Scenario(format!(
                        "element `{}` has unknown parent `{}`; parents must come first",
                        element.id, parent
                    )));
                }
            }
        }

        let mut names = HashSet::new();
        for trigger in &self.triggers {
            if !names.insert(trigger.name.as_str()) {
                return Err(Error::Scenario(format!("duplicate trigger `{}`", trigger.name)));
            }
        }
        for animation in &self.animations {
            if !names.contains(animation.trigger.as_str()) {
                return Err(Error::Scenario(format!(
                    "animation on `{}` names unknown trigger `{}`",
                    animation.target, animation.trigger
                )));
            }
        }
        if self.script.frame_ms <= 0.0 {
            return Err(Error::Scenario("script.frame_ms must be positive".to_string()));
        }
        Ok(())
    }

    fn page(&self) -> Page {
        let viewport = &self.viewport;
        let mut page = Page::new(viewport.width, viewport.height);
        if let Some(height) = viewport.document_height {
            page = page.with_document_size(viewport.width, height);
        }
        for element in &self.elements {
            let rect = Rect::new(
                element.top,
                element.left,
                element.width.unwrap_or(viewport.width),
                element.height,
            );
            match &element.parent {
                Some(parent) => page.add_child(parent, element.id.clone(), rect),
                None => page.add(element.id.clone(), rect),
            };
        }
        page
    }

    /// Register everything on a fresh engine over a fresh page
    pub fn build(self, config: &EngineConfig) -> Result<ScenarioRuntime> {
        let mut page = self.page();
        let mut engine = ScrollEngine::new(config.clone());
        let mut triggers = Vec::with_capacity(self.triggers.len());

        for spec in &self.triggers {
            let options = match (&spec.element, spec.start, spec.end) {
                (Some(element), _, _) => TriggerOptions::element(element.clone()).thresholds(
                    spec.start_trigger.unwrap_or(config.start_trigger),
                    spec.end_trigger.unwrap_or(config.end_trigger),
                ),
                (None, Some(start), Some(end)) => TriggerOptions::scroll(start, end),
                _ => {
                    return Err(Error::Scenario(format!(
                        "trigger `{}` needs `element` or both `start` and `end`",
                        spec.name
                    )))
                }
            };
            let id = engine.create_trigger(options.label(spec.name.clone()), &page)?;
            triggers.push((spec.name.clone(), id));
        }

        let lookup = |name: &str| {
            triggers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, id)| *id)
                .ok_or_else(|| Error::Scenario(format!("unknown trigger `{}`", name)))
        };

        for spec in self.animations {
            let mut options = AnimationOptions::new(spec.target).trigger(lookup(&spec.trigger)?);
            if let Some(easing) = spec.easing {
                options = options.timing(easing);
            }
            if let Some(label) = spec.label {
                options = options.label(label);
            }
            for (name, property) in spec.properties {
                options = options.property(name, property);
            }
            engine.create_animation(options)?;
        }

        for effect in self.effects {
            let kind = effect.kind();
            match effect {
                EffectSpec::Pin { target, options } => {
                    engine.pin(target, options, &mut page)?;
                }
                EffectSpec::Parallax { target, options } => {
                    engine.parallax(target, options, &mut page)?;
                }
                EffectSpec::Reveal { targets, options } => {
                    engine.reveal(targets, options, &mut page)?;
                }
                EffectSpec::Sticky { target, options } => {
                    engine.sticky_header(target, options, &mut page)?;
                }
                EffectSpec::Progress { bar, options } => {
                    engine.scroll_progress(bar, options, &mut page)?;
                }
                EffectSpec::Horizontal {
                    container,
                    content,
                    options,
                } => {
                    engine.horizontal_scroll(container, content, options, &mut page)?;
                }
                EffectSpec::Markers { trigger } => {
                    engine.create_markers(lookup(&trigger)?, &mut page)?;
                }
            }
            debug!("Scenario effect `{}` registered", kind);
        }

        info!(
            "Scenario `{}` built: {} elements, {} triggers",
            self.name,
            page.order().len(),
            engine.triggers().count()
        );
        Ok(ScenarioRuntime {
            name: self.name,
            engine,
            page,
            names: triggers,
            script: self.script,
            clock: 0.0,
        })
    }
}

/// State of one trigger after a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerSnapshot {
    pub name: String,
    pub progress: f64,
    pub active: bool,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub trigger: String,
    pub kind: TriggerEventKind,
    pub progress: f64,
}

/// Everything one replayed frame produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub frame: u64,
    pub timestamp: f64,
    pub scroll_y: f64,
    pub velocity_y: f64,
    pub triggers: Vec<TriggerSnapshot>,
    pub events: Vec<EventRecord>,
    pub faults: Vec<String>,
}

/// A built scenario: the engine, its page and the trigger names
pub struct ScenarioRuntime {
    pub name: String,
    pub engine: ScrollEngine,
    pub page: Page,
    pub script: ScriptSpec,
    names: Vec<(String, TriggerId)>,
    clock: f64,
}

impl ScenarioRuntime {
    pub fn trigger_id(&self, name: &str) -> Option<TriggerId> {
        self.names.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }

    /// Scenario name of a trigger, falling back to its label, then its id
    pub fn trigger_name(&self, id: TriggerId) -> String {
        if let Some((name, _)) = self.names.iter().find(|(_, t)| *t == id) {
            return name.clone();
        }
        self.engine
            .trigger(id)
            .and_then(|t| t.label().map(str::to_string))
            .unwrap_or_else(|| id.to_string())
    }

    /// Every trigger on the engine, in registration order
    pub fn snapshot(&self) -> Vec<TriggerSnapshot> {
        self.engine
            .triggers()
            .map(|t| {
                let (start, end) = t.bounds();
                TriggerSnapshot {
                    name: self.trigger_name(t.id()),
                    progress: t.progress(),
                    active: t.is_active(),
                    start,
                    end,
                }
            })
            .collect()
    }

    /// Milliseconds of simulated time elapsed
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Run one frame at the current scroll offset
    pub fn tick(&mut self, elapsed_ms: f64) -> FrameRecord {
        self.clock += elapsed_ms;
        let report = self.engine.tick(self.clock, &mut self.page);
        self.record(report)
    }

    /// Run the frame `scheduler` handed out for `token`; `None` for a stale token
    pub fn on_frame(
        &mut self,
        token: FrameToken,
        elapsed_ms: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<FrameRecord> {
        let timestamp = self.clock + elapsed_ms;
        let report = self
            .engine
            .on_frame(token, timestamp, &mut self.page, scheduler)?;
        self.clock = timestamp;
        Some(self.record(report))
    }

    fn record(&self, report: FrameReport) -> FrameRecord {
        let events = report
            .events
            .iter()
            .map(|e| EventRecord {
                trigger: self.trigger_name(e.trigger),
                kind: e.kind,
                progress: e.progress,
            })
            .collect();
        FrameRecord {
            frame: self.engine.frame_count(),
            timestamp: self.clock,
            scroll_y: report.sample.scroll_y,
            velocity_y: report.sample.velocity_y,
            triggers: self.snapshot(),
            events,
            faults: report.faults.iter().map(ToString::to_string).collect(),
        }
    }

    /// Jump to `scroll_y` and run a frame
    pub fn step(&mut self, scroll_y: f64) -> FrameRecord {
        let (x, _) = self.page.scroll_offset();
        self.page.set_scroll_offset(x, scroll_y);
        self.tick(self.script.frame_ms)
    }

    /// Replay the scripted offsets, one frame each
    pub fn run_script(&mut self) -> Vec<FrameRecord> {
        let offsets = self.script.offsets.clone();
        offsets.into_iter().map(|y| self.step(y)).collect()
    }
}
