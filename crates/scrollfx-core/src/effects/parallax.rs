//! Parallax layers
//!
//! While the container is on screen, each layer is translated by its
//! distance from an anchor line in the viewport, scaled by the layer depth.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::ScrollEngine;
use crate::frame::FrameSample;
use crate::host::{Host, Rect, TargetId};
use crate::trigger::{TriggerId, TriggerOptions};
use crate::value::Value;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

/// Line in the viewport where a layer sits at rest.
/// `Start` is the top (or left) edge, `End` the bottom (or right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[serde(alias = "top", alias = "left")]
    Start,
    #[default]
    Center,
    #[serde(alias = "bottom", alias = "right")]
    End,
}

impl Anchor {
    fn offset(&self, extent: f64) -> f64 {
        match self {
            Anchor::Start => 0.0,
            Anchor::Center => extent / 2.0,
            Anchor::End => extent,
        }
    }
}

/// A node moved by the effect; `depth` falls back to the effect speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxLayer {
    pub target: TargetId,
    #[serde(default)]
    pub depth: Option<f64>,
}

impl ParallaxLayer {
    pub fn new(target: impl Into<TargetId>, depth: f64) -> Self {
        Self {
            target: target.into(),
            depth: Some(depth),
        }
    }
}

/// Options for [`ScrollEngine::parallax`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxOptions {
    /// Depth for layers without their own; negative moves against the scroll
    pub speed: f64,
    pub direction: Axis,
    pub anchor: Anchor,
    /// Nodes to move; empty means the element itself
    pub layers: Vec<ParallaxLayer>,
    /// Node whose visibility drives the effect, defaulting to the element
    pub container: Option<TargetId>,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self {
            speed: 0.5,
            direction: Axis::Vertical,
            anchor: Anchor::Center,
            layers: Vec::new(),
            container: None,
        }
    }
}

/// Signed distance of the container's leading edge from the anchor,
/// in viewport extents
fn position_factor(rect: &Rect, sample: &FrameSample, direction: Axis, anchor: Anchor) -> f64 {
    match direction {
        Axis::Vertical => {
            let extent = sample.viewport_height;
            (rect.top - sample.scroll_y - anchor.offset(extent)) / extent
        }
        Axis::Horizontal => {
            let extent = sample.viewport_width;
            (rect.left - sample.scroll_x - anchor.offset(extent)) / extent
        }
    }
}

impl ScrollEngine {
    /// Move `element` (or its layers) at a different rate than the scroll
    pub fn parallax(
        &mut self,
        element: impl Into<TargetId>,
        options: ParallaxOptions,
        host: &mut dyn Host,
    ) -> Result<TriggerId> {
        let element = element.into();
        let ParallaxOptions {
            speed,
            direction,
            anchor,
            layers,
            container,
        } = options;

        let container = container.unwrap_or_else(|| element.clone());
        let layers: Vec<(TargetId, f64)> = if layers.is_empty() {
            vec![(element.clone(), speed)]
        } else {
            layers
                .into_iter()
                .map(|layer| (layer.target, layer.depth.unwrap_or(speed)))
                .collect()
        };
        let function = match direction {
            Axis::Vertical => "translateY",
            Axis::Horizontal => "translateX",
        };

        debug!("Parallax on {} with {} layers", element, layers.len());
        let watched = container.clone();
        self.create_trigger(
            TriggerOptions::element(container)
                .thresholds(1.0, 0.0)
                .label(format!("parallax {}", element))
                .on_update(move |trigger, ctx| {
                    let rect = match ctx.host.geometry(&watched).or(trigger.geometry()) {
                        Some(rect) => rect,
                        None => return Ok(()),
                    };
                    let factor = position_factor(&rect, ctx.sample, direction, anchor);
                    for (layer, depth) in &layers {
                        let offset = factor * depth * 100.0;
                        ctx.host
                            .apply(layer, "transform", &Value::transform(function, offset), "px")?;
                    }
                    Ok(())
                }),
            &*host,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::{PropertySink, Viewport};
    use crate::page::Page;

    fn setup() -> (Page, TargetId, ScrollEngine) {
        let mut page = Page::new(1000.0, 800.0).with_document_size(2000.0, 5000.0);
        let hero = page.add("hero", Rect::new(1000.0, 0.0, 1000.0, 600.0));
        (page, hero, ScrollEngine::new(EngineConfig::default()))
    }

    #[test]
    fn test_position_factor() {
        let rect = Rect::new(1000.0, 200.0, 100.0, 100.0);
        let sample = FrameSample {
            scroll_y: 200.0,
            viewport_width: 1000.0,
            viewport_height: 800.0,
            ..Default::default()
        };
        // top on screen at 800, anchor at 400
        assert_eq!(position_factor(&rect, &sample, Axis::Vertical, Anchor::Center), 0.5);
        assert_eq!(position_factor(&rect, &sample, Axis::Vertical, Anchor::Start), 1.0);
        assert_eq!(position_factor(&rect, &sample, Axis::Vertical, Anchor::End), 0.0);
        assert_eq!(position_factor(&rect, &sample, Axis::Horizontal, Anchor::Start), 0.2);
    }

    #[test]
    fn test_element_moves_while_visible() {
        let (mut page, hero, mut engine) = setup();
        engine.parallax(hero.clone(), ParallaxOptions::default(), &mut page).unwrap();

        // off screen: trigger inactive, nothing written
        page.set_scroll_offset(0.0, 0.0);
        engine.tick(0.0, &mut page);
        assert_eq!(page.style(&hero, "transform"), None);

        // active between 1000 and 1600; top 200px above the viewport
        page.set_scroll_offset(0.0, 1200.0);
        engine.tick(16.0, &mut page);
        assert_eq!(page.style(&hero, "transform"), Some("translateY(-37.5px)"));

        page.set_scroll_offset(0.0, 1400.0);
        engine.tick(32.0, &mut page);
        assert_eq!(page.style(&hero, "transform"), Some("translateY(-50px)"));
    }

    #[test]
    fn test_layers_use_own_depth_and_keep_other_transforms() {
        let (mut page, hero, mut engine) = setup();
        let back = page.add_child(&hero, "back", Rect::new(1000.0, 0.0, 1000.0, 600.0));
        let front = page.add_child(&hero, "front", Rect::new(1000.0, 0.0, 1000.0, 600.0));
        page.set_style(&front, "transform", "scale(2)").unwrap();

        engine
            .parallax(
                hero.clone(),
                ParallaxOptions {
                    anchor: Anchor::Start,
                    layers: vec![
                        ParallaxLayer::new(back.clone(), 0.2),
                        ParallaxLayer {
                            target: front.clone(),
                            depth: None,
                        },
                    ],
                    ..Default::default()
                },
                &mut page,
            )
            .unwrap();

        // factor -200 / 800
        page.set_scroll_offset(0.0, 1200.0);
        engine.tick(0.0, &mut page);
        assert_eq!(page.style(&back, "transform"), Some("translateY(-5px)"));
        assert_eq!(page.style(&front, "transform"), Some("scale(2) translateY(-12.5px)"));
        assert_eq!(page.style(&hero, "transform"), None);
    }

    #[test]
    fn test_horizontal_uses_left_edge() {
        let (mut page, hero, mut engine) = setup();
        page.set_rect(&hero, Rect::new(1000.0, 500.0, 1000.0, 600.0)).unwrap();
        engine
            .parallax(
                hero.clone(),
                ParallaxOptions {
                    direction: Axis::Horizontal,
                    speed: -1.0,
                    ..Default::default()
                },
                &mut page,
            )
            .unwrap();

        page.set_scroll_offset(0.0, 1200.0);
        engine.tick(0.0, &mut page);
        // (500 - 500) / 1000 = 0
        assert_eq!(page.style(&hero, "transform"), Some("translateX(0px)"));
    }

    #[test]
    fn test_options_from_toml() {
        let options: ParallaxOptions = toml::from_str(
            r#"
            speed = 0.3
            anchor = "top"
            layers = [{ target = "sky", depth = 0.1 }, { target = "hills" }]
            "#,
        )
        .unwrap();
        assert_eq!(options.anchor, Anchor::Start);
        assert_eq!(options.layers[1].depth, None);
        assert_eq!(options.direction, Axis::Vertical);
    }
}
