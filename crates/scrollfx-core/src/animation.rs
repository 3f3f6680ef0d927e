//! Animation engine
//!
//! An animation maps one progress value onto a set of target properties.
//! Progress comes from a bound trigger or from `drive`; animations with
//! neither are skipped.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::easing::Timing;
use crate::frame::{Fault, FaultSource};
use crate::host::{Host, TargetId};
use crate::interpolate::{interpolate, interpolate_keyframes};
use crate::trigger::{TriggerEngine, TriggerId};
use crate::value::Value;
use crate::{Error, Result};

/// Handle to a registered animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationId(Uuid);

impl AnimationId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    Tween { from: Value, to: Value },
    Keyframes(Vec<Value>),
}

/// How one property moves, plus the unit appended by the sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPropertySpec", into = "RawPropertySpec")]
pub struct PropertySpec {
    pub motion: Motion,
    pub unit: String,
}

impl PropertySpec {
    pub fn tween(from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Self {
            motion: Motion::Tween {
                from: from.into(),
                to: to.into(),
            },
            unit: String::new(),
        }
    }

    pub fn keyframes<T: Into<Value>>(frames: Vec<T>) -> Self {
        Self {
            motion: Motion::Keyframes(frames.into_iter().map(Into::into).collect()),
            unit: String::new(),
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Value at eased progress `t`; `None` for an empty keyframe list
    pub fn value_at(&self, t: f64) -> Option<Value> {
        match &self.motion {
            Motion::Tween { from, to } => Some(interpolate(from, to, t)),
            Motion::Keyframes(frames) => interpolate_keyframes(frames, t),
        }
    }
}

/// Wire shape: `{ from, to, unit }` or `{ value = [..], unit }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawPropertySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    unit: String,
}

impl TryFrom<RawPropertySpec> for PropertySpec {
    type Error = Error;

    fn try_from(raw: RawPropertySpec) -> Result<Self> {
        let motion = match (raw.from, raw.to, raw.value) {
            (_, _, Some(Value::Keyframes(frames))) => Motion::Keyframes(frames),
            (from, Some(to), _) | (from, None, Some(to)) => Motion::Tween {
                from: from.unwrap_or(Value::Number(0.0)),
                to,
            },
            (_, None, None) => {
                return Err(Error::InvalidOption(
                    "property needs `to` or `value`".to_string(),
                ))
            }
        };
        Ok(Self {
            motion,
            unit: raw.unit,
        })
    }
}

impl From<PropertySpec> for RawPropertySpec {
    fn from(spec: PropertySpec) -> Self {
        match spec.motion {
            Motion::Tween { from, to } => RawPropertySpec {
                from: Some(from),
                to: Some(to),
                value: None,
                unit: spec.unit,
            },
            Motion::Keyframes(frames) => RawPropertySpec {
                from: None,
                to: None,
                value: Some(Value::Keyframes(frames)),
                unit: spec.unit,
            },
        }
    }
}

/// Free-form hook run after the declared properties, with eased progress
pub type AnimationCallback = Box<dyn FnMut(f64, &TargetId, &mut dyn Host) -> Result<()>>;

/// Options for `create_animation`
pub struct AnimationOptions {
    target: TargetId,
    properties: Vec<(String, PropertySpec)>,
    trigger: Option<TriggerId>,
    timing: Option<Timing>,
    on_update: Option<AnimationCallback>,
    active: bool,
    label: Option<String>,
}

impl AnimationOptions {
    pub fn new(target: impl Into<TargetId>) -> Self {
        Self {
            target: target.into(),
            properties: Vec::new(),
            trigger: None,
            timing: None,
            on_update: None,
            active: true,
            label: None,
        }
    }

    /// Declare a property; later declarations of the same name replace earlier ones
    pub fn property(mut self, name: impl Into<String>, spec: PropertySpec) -> Self {
        let name = name.into();
        self.properties.retain(|(n, _)| n != &name);
        self.properties.push((name, spec));
        self
    }

    pub fn trigger(mut self, trigger: TriggerId) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn timing(mut self, timing: impl Into<Timing>) -> Self {
        self.timing = Some(timing.into());
        self
    }

    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: FnMut(f64, &TargetId, &mut dyn Host) -> Result<()> + 'static,
    {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub(crate) fn bound_trigger(&self) -> Option<TriggerId> {
        self.trigger
    }

    pub(crate) fn bind_default(mut self, trigger: TriggerId) -> Self {
        self.trigger.get_or_insert(trigger);
        self
    }
}

pub struct Animation {
    id: AnimationId,
    label: Option<String>,
    target: TargetId,
    properties: Vec<(String, PropertySpec)>,
    trigger: Option<TriggerId>,
    timing: Option<Timing>,
    on_update: Option<AnimationCallback>,
    active: bool,
    driven: Option<f64>,
    last_progress: Option<f64>,
}

impl Animation {
    pub fn id(&self) -> AnimationId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn target(&self) -> &TargetId {
        &self.target
    }

    pub fn properties(&self) -> &[(String, PropertySpec)] {
        &self.properties
    }

    pub fn trigger(&self) -> Option<TriggerId> {
        self.trigger
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Eased progress applied on the last frame it ran
    pub fn last_progress(&self) -> Option<f64> {
        self.last_progress
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("target", &self.target)
            .field("trigger", &self.trigger)
            .field("timing", &self.timing)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// Write every property of `target` at progress `t`
pub fn apply_properties(
    host: &mut dyn Host,
    target: &TargetId,
    properties: &[(String, PropertySpec)],
    t: f64,
) -> Result<()> {
    for (name, spec) in properties {
        if let Some(value) = spec.value_at(t) {
            host.apply(target, name, &value, &spec.unit)?;
        }
    }
    Ok(())
}

/// Owns the registered animations
#[derive(Default)]
pub struct AnimationEngine {
    animations: Vec<Animation>,
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, options: AnimationOptions) -> AnimationId {
        let AnimationOptions {
            target,
            properties,
            trigger,
            timing,
            on_update,
            active,
            label,
        } = options;

        let id = AnimationId::new();
        debug!(
            "Registered animation {} on {} ({} properties)",
            id,
            target,
            properties.len()
        );
        self.animations.push(Animation {
            id,
            label,
            target,
            properties,
            trigger,
            timing,
            on_update,
            active,
            driven: None,
            last_progress: None,
        });
        id
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Animation> {
        self.animations.iter()
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// Feed progress directly; a bound trigger still takes precedence
    pub fn drive(&mut self, id: AnimationId, progress: f64) -> Result<()> {
        let animation = self.get_mut(id)?;
        animation.driven = Some(if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) });
        Ok(())
    }

    pub fn set_active(&mut self, id: AnimationId, active: bool) -> Result<()> {
        self.get_mut(id)?.active = active;
        Ok(())
    }

    pub fn remove(&mut self, id: AnimationId) -> Option<Animation> {
        let index = self.animations.iter().position(|a| a.id == id)?;
        debug!("Removed animation {}", id);
        Some(self.animations.remove(index))
    }

    pub fn clear(&mut self) {
        self.animations.clear();
    }

    fn get_mut(&mut self, id: AnimationId) -> Result<&mut Animation> {
        self.animations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::AnimationNotFound(id.to_string()))
    }

    /// Apply every active animation that has a progress source
    pub fn update(&mut self, triggers: &TriggerEngine, host: &mut dyn Host, faults: &mut Vec<Fault>) {
        for animation in &mut self.animations {
            if !animation.active {
                continue;
            }

            let progress = match animation.trigger {
                Some(trigger) => match triggers.get(trigger) {
                    Some(t) => t.progress(),
                    None => continue,
                },
                None => match animation.driven {
                    Some(p) => p,
                    None => continue,
                },
            };

            if host.geometry(&animation.target).is_none() {
                faults.push(Fault::new(
                    FaultSource::Animation { id: animation.id },
                    Error::MissingTarget(animation.target.to_string()),
                ));
                continue;
            }

            let eased = match &animation.timing {
                Some(timing) => timing.apply(progress),
                None => progress,
            };
            animation.last_progress = Some(eased);

            let mut result = apply_properties(host, &animation.target, &animation.properties, eased);
            if result.is_ok() {
                if let Some(callback) = animation.on_update.as_mut() {
                    result = callback(eased, &animation.target, &mut *host);
                }
            }

            if let Err(e) = result {
                warn!("Animation {} failed: {}", animation.id, e);
                faults.push(Fault::new(FaultSource::Animation { id: animation.id }, e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::easing::Easing;
    use crate::frame::{Commands, FrameContext, FrameSample};
    use crate::host::{PropertySink, Rect, Viewport};
    use crate::page::Page;
    use crate::trigger::TriggerOptions;

    fn page() -> (Page, TargetId) {
        let mut page = Page::new(1000.0, 800.0).with_document_size(1000.0, 5000.0);
        let id = page.add("hero", Rect::new(0.0, 0.0, 1000.0, 600.0));
        (page, id)
    }

    fn tick_triggers(triggers: &mut TriggerEngine, page: &mut Page, y: f64) {
        page.set_scroll_offset(0.0, y);
        let sample = FrameSample {
            scroll_y: y,
            viewport_height: 800.0,
            ..Default::default()
        };
        let mut commands = Commands::default();
        let mut ctx = FrameContext::new(&sample, page, &mut commands);
        triggers.update(&mut ctx, &mut Vec::new(), &mut Vec::new());
    }

    #[test]
    fn test_bound_trigger_drives_properties() {
        let (mut page, hero) = page();
        let mut triggers = TriggerEngine::new();
        let trigger = triggers
            .register(TriggerOptions::scroll(0.0, 400.0), (0.8, 0.2), &page)
            .unwrap();

        let mut engine = AnimationEngine::new();
        engine.register(
            AnimationOptions::new(hero.clone())
                .property("opacity", PropertySpec::tween(1.0, 0.0))
                .property(
                    "transform",
                    PropertySpec::tween(
                        Value::transform("translateY", 0.0),
                        Value::transform("translateY", 100.0),
                    )
                    .unit("px"),
                )
                .trigger(trigger),
        );

        tick_triggers(&mut triggers, &mut page, 100.0);
        let mut faults = Vec::new();
        engine.update(&triggers, &mut page, &mut faults);

        assert!(faults.is_empty());
        assert_eq!(page.style(&hero, "opacity"), Some("0.75"));
        assert_eq!(page.style(&hero, "transform"), Some("translateY(25px)"));
    }

    #[test]
    fn test_no_source_is_skipped() {
        let (mut page, hero) = page();
        let mut engine = AnimationEngine::new();
        engine.register(AnimationOptions::new(hero.clone()).property("opacity", PropertySpec::tween(0.0, 1.0)));

        let mut faults = Vec::new();
        engine.update(&TriggerEngine::new(), &mut page, &mut faults);
        assert!(faults.is_empty());
        assert_eq!(page.style(&hero, "opacity"), None);
    }

    #[test]
    fn test_drive_clamps() {
        let (mut page, hero) = page();
        let mut engine = AnimationEngine::new();
        let id = engine.register(
            AnimationOptions::new(hero.clone()).property("width", PropertySpec::tween(0.0, 100.0).unit("%")),
        );

        engine.drive(id, 1.7).unwrap();
        engine.update(&TriggerEngine::new(), &mut page, &mut Vec::new());
        assert_eq!(page.style(&hero, "width"), Some("100%"));
    }

    #[test]
    fn test_drive_unknown_animation() {
        let mut engine = AnimationEngine::new();
        let (_, hero) = page();
        let id = engine.register(AnimationOptions::new(hero));
        engine.remove(id);
        assert!(matches!(engine.drive(id, 0.5), Err(Error::AnimationNotFound(_))));
    }

    #[test]
    fn test_inactive_is_skipped() {
        let (mut page, hero) = page();
        let mut engine = AnimationEngine::new();
        let id = engine.register(
            AnimationOptions::new(hero.clone())
                .property("opacity", PropertySpec::tween(0.0, 1.0))
                .active(false),
        );
        engine.drive(id, 0.5).unwrap();
        engine.update(&TriggerEngine::new(), &mut page, &mut Vec::new());
        assert_eq!(page.style(&hero, "opacity"), None);

        engine.set_active(id, true).unwrap();
        engine.update(&TriggerEngine::new(), &mut page, &mut Vec::new());
        assert_eq!(page.style(&hero, "opacity"), Some("0.5"));
    }

    #[test]
    fn test_timing_overshoot_is_unclamped() {
        let (mut page, hero) = page();
        let mut engine = AnimationEngine::new();
        let id = engine.register(
            AnimationOptions::new(hero.clone())
                .property("--x", PropertySpec::tween(0.0, 100.0))
                .timing(Timing::custom(|t| t * 1.5)),
        );
        engine.drive(id, 1.0).unwrap();
        engine.update(&TriggerEngine::new(), &mut page, &mut Vec::new());
        assert_eq!(page.style(&hero, "--x"), Some("150"));
        assert_eq!(engine.get(id).unwrap().last_progress(), Some(1.5));
    }

    #[test]
    fn test_keyframes_and_colors() {
        let (mut page, hero) = page();
        let mut engine = AnimationEngine::new();
        let id = engine.register(
            AnimationOptions::new(hero.clone())
                .property("--k", PropertySpec::keyframes(vec![0.0, 50.0, 100.0]))
                .property("color", PropertySpec::tween("#000000", "#ffffff"))
                .timing(Easing::Linear),
        );
        engine.drive(id, 0.75).unwrap();
        engine.update(&TriggerEngine::new(), &mut page, &mut Vec::new());
        assert_eq!(page.style(&hero, "--k"), Some("75"));
        assert_eq!(page.style(&hero, "color"), Some("#bfbfbf"));
    }

    #[test]
    fn test_callback_runs_after_properties() {
        let (mut page, hero) = page();
        let seen = Rc::new(RefCell::new(None));
        let seen_in = seen.clone();
        let mut engine = AnimationEngine::new();
        let id = engine.register(
            AnimationOptions::new(hero.clone())
                .property("opacity", PropertySpec::tween(0.0, 1.0))
                .on_update(move |p, target, host| {
                    *seen_in.borrow_mut() = Some((p, host.read(target, "opacity")));
                    Ok(())
                }),
        );
        engine.drive(id, 0.5).unwrap();
        engine.update(&TriggerEngine::new(), &mut page, &mut Vec::new());
        assert_eq!(*seen.borrow(), Some((0.5, Some("0.5".to_string()))));
    }

    #[test]
    fn test_missing_target_isolated() {
        let (mut page, hero) = page();
        let mut engine = AnimationEngine::new();
        let ghost = engine.register(AnimationOptions::new("ghost").property("opacity", PropertySpec::tween(0.0, 1.0)));
        let real = engine.register(AnimationOptions::new(hero.clone()).property("opacity", PropertySpec::tween(0.0, 1.0)));
        engine.drive(ghost, 0.5).unwrap();
        engine.drive(real, 0.5).unwrap();

        let mut faults = Vec::new();
        engine.update(&TriggerEngine::new(), &mut page, &mut faults);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].source, FaultSource::Animation { id: ghost });
        assert_eq!(page.style(&hero, "opacity"), Some("0.5"));
    }

    #[test]
    fn test_removed_trigger_stops_animation() {
        let (mut page, hero) = page();
        let mut triggers = TriggerEngine::new();
        let trigger = triggers
            .register(TriggerOptions::scroll(0.0, 400.0), (0.8, 0.2), &page)
            .unwrap();
        let mut engine = AnimationEngine::new();
        engine.register(
            AnimationOptions::new(hero.clone())
                .property("opacity", PropertySpec::tween(0.0, 1.0))
                .trigger(trigger),
        );
        triggers.remove(trigger);
        tick_triggers(&mut triggers, &mut page, 200.0);
        engine.update(&triggers, &mut page, &mut Vec::new());
        assert_eq!(page.style(&hero, "opacity"), None);
    }

    #[test]
    fn test_property_spec_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            opacity: PropertySpec,
            scale: PropertySpec,
            y: PropertySpec,
        }

        let doc: Doc = toml::from_str(
            r#"
            opacity = { from = 0, to = 1 }
            scale = { value = [1, 1.2, 1] }
            y = { value = 40, unit = "px" }
            "#,
        )
        .unwrap();

        assert_eq!(doc.opacity, PropertySpec::tween(0.0, 1.0));
        assert_eq!(doc.scale, PropertySpec::keyframes(vec![1.0, 1.2, 1.0]));
        assert_eq!(doc.y, PropertySpec::tween(0.0, 40.0).unit("px"));
    }

    #[test]
    fn test_property_spec_requires_target_value() {
        let err = toml::from_str::<PropertySpec>("from = 1").unwrap_err();
        assert!(err.to_string().contains("`to` or `value`"));
    }
}
