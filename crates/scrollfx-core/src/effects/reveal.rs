//! Reveal on scroll
//!
//! Elements start faded and offset, then transition in (via the host's
//! CSS transition) once their trigger is entered.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::easing::Easing;
use crate::engine::ScrollEngine;
use crate::host::{Device, Host, TargetId};
use crate::trigger::{TriggerId, TriggerOptions};
use crate::value::format_number;
use crate::Result;

const REVEALED_TRANSFORM: &str = "scale(1) translate(0, 0)";

// reveal ignores the engine-wide trigger thresholds
const REVEAL_START: f64 = 0.8;
const REVEAL_END: f64 = 0.2;

/// Side the element slides in from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

/// Options for [`ScrollEngine::reveal`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealOptions {
    pub origin: Origin,
    /// CSS length to slide over
    pub distance: String,
    pub duration_ms: f64,
    pub delay_ms: f64,
    /// Added per element when staggering
    pub interval_ms: f64,
    /// Starting scale
    pub scale: f64,
    /// Starting opacity
    pub opacity: f64,
    pub easing: Easing,
    pub desktop: bool,
    pub mobile: bool,
    pub once: bool,
    /// Hide again when scrolled back above the element
    pub reset: bool,
    pub stagger: bool,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            origin: Origin::Bottom,
            distance: "20px".to_string(),
            duration_ms: 600.0,
            delay_ms: 0.0,
            interval_ms: 0.0,
            scale: 1.0,
            opacity: 0.0,
            easing: Easing::EaseOutCubic,
            desktop: true,
            mobile: true,
            once: false,
            reset: false,
            stagger: true,
        }
    }
}

impl RevealOptions {
    fn enabled_on(&self, device: Device) -> bool {
        match device {
            Device::Desktop => self.desktop,
            Device::Mobile => self.mobile,
        }
    }

    /// Transform applied before the element is revealed
    pub fn hidden_transform(&self) -> String {
        let scale = format!("scale({})", format_number(self.scale));
        let d = &self.distance;
        match self.origin {
            Origin::Top => format!("{} translateY(-{})", scale, d),
            Origin::Bottom => format!("{} translateY({})", scale, d),
            Origin::Left => format!("{} translateX(-{})", scale, d),
            Origin::Right => format!("{} translateX({})", scale, d),
        }
    }
}

impl ScrollEngine {
    /// Reveal each target as it scrolls into view.
    ///
    /// Returns no triggers when the effect is disabled for the configured device.
    pub fn reveal(
        &mut self,
        targets: Vec<TargetId>,
        options: RevealOptions,
        host: &mut dyn Host,
    ) -> Result<Vec<TriggerId>> {
        let device = self.config().device;
        if !options.enabled_on(device) {
            debug!("Reveal disabled on {:?}", device);
            return Ok(Vec::new());
        }

        let hidden = options.hidden_transform();
        let opacity = format_number(options.opacity);
        let transition = format!(
            "opacity {d}ms {e}, transform {d}ms {e}",
            d = format_number(options.duration_ms),
            e = options.easing
        );
        let restore = options.reset && !options.once;

        let mut triggers = Vec::with_capacity(targets.len());
        for (index, target) in targets.into_iter().enumerate() {
            let delay = options.delay_ms
                + if options.stagger {
                    index as f64 * options.interval_ms
                } else {
                    0.0
                };

            let revealed = target.clone();
            let (reset, reset_opacity, reset_transform) = (target.clone(), opacity.clone(), hidden.clone());
            let trigger = self.create_trigger(
                TriggerOptions::element(target.clone())
                    .thresholds(REVEAL_START, REVEAL_END)
                    .label(format!("reveal {}", target))
                    .on_enter(move |_, ctx| {
                        let revealed = revealed.clone();
                        ctx.defer(delay, move |host| {
                            host.set_style(&revealed, "opacity", "1")?;
                            host.set_style(&revealed, "transform", REVEALED_TRANSFORM)
                        });
                        Ok(())
                    })
                    .on_leave_back(move |_, ctx| {
                        if restore {
                            ctx.host.set_style(&reset, "opacity", &reset_opacity)?;
                            ctx.host.set_style(&reset, "transform", &reset_transform)?;
                        }
                        Ok(())
                    }),
                &*host,
            )?;

            host.set_style(&target, "opacity", &opacity)?;
            host.set_style(&target, "transition", &transition)?;
            host.set_style(&target, "will-change", "opacity, transform")?;
            host.set_style(&target, "transform", &hidden)?;
            triggers.push(trigger);
        }

        debug!("Reveal registered for {} elements", triggers.len());
        Ok(triggers)
    }
}
