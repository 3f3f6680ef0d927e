//! Scroll progress indicator

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use tracing::debug;

use crate::engine::ScrollEngine;
use crate::host::{Host, TargetId};
use crate::trigger::{Offset, TriggerId, TriggerOptions};
use crate::value::format_number;
use crate::Result;

use super::parallax::Axis;

/// Edge of the viewport the bar sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

pub type PercentageFormat = Rc<dyn Fn(f64) -> String>;

/// Options for [`ScrollEngine::scroll_progress`]
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ProgressOptions {
    /// Horizontal bars grow in width, vertical ones in height
    pub direction: Axis,
    pub color: String,
    /// Thickness of a horizontal bar
    pub height: String,
    /// Thickness of a vertical bar
    pub width: String,
    pub position: ProgressPosition,
    pub show_percentage: bool,
    pub z_index: i32,
    /// Measure against this node's height instead of the document
    pub container: Option<TargetId>,
    /// Percentage label text; rounds to a whole percent by default
    #[serde(skip)]
    pub format: Option<PercentageFormat>,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            direction: Axis::Horizontal,
            color: "#007bff".to_string(),
            height: "4px".to_string(),
            width: "4px".to_string(),
            position: ProgressPosition::Top,
            show_percentage: false,
            z_index: 9999,
            container: None,
            format: None,
        }
    }
}

impl fmt::Debug for ProgressOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressOptions")
            .field("direction", &self.direction)
            .field("color", &self.color)
            .field("position", &self.position)
            .field("show_percentage", &self.show_percentage)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

fn default_format(progress: f64) -> String {
    format!("{}%", (progress * 100.0).round())
}

struct ProgressView {
    bar: TargetId,
    label: Option<TargetId>,
    direction: Axis,
    format: Option<PercentageFormat>,
}

impl ProgressView {
    fn show(&self, host: &mut dyn Host, progress: f64) -> Result<()> {
        let extent = match self.direction {
            Axis::Horizontal => "width",
            Axis::Vertical => "height",
        };
        host.set_style(&self.bar, extent, &format!("{}%", format_number(progress * 100.0)))?;

        if let Some(label) = &self.label {
            let text = match &self.format {
                Some(format) => format(progress),
                None => default_format(progress),
            };
            host.set_style(label, "textContent", &text)?;
        }
        Ok(())
    }
}

/// A progress bar and its optional percentage label
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    trigger: TriggerId,
    bar: TargetId,
    label: Option<TargetId>,
    owns_bar: bool,
}

impl ProgressHandle {
    pub fn trigger(&self) -> TriggerId {
        self.trigger
    }

    pub fn bar(&self) -> &TargetId {
        &self.bar
    }

    pub fn label(&self) -> Option<&TargetId> {
        self.label.as_ref()
    }

    /// Remove the trigger and any nodes the indicator created
    pub fn destroy(self, engine: &mut ScrollEngine, host: &mut dyn Host) -> Result<()> {
        engine.remove_trigger(self.trigger)?;
        if self.owns_bar {
            host.remove_node(&self.bar)?;
        }
        if let Some(label) = &self.label {
            host.remove_node(label)?;
        }
        debug!("Removed progress indicator {}", self.bar);
        Ok(())
    }
}

fn create_bar(host: &mut dyn Host, options: &ProgressOptions) -> Result<TargetId> {
    let bar = host.create_placeholder(0.0, 0.0);
    host.append_to_root(&bar)?;
    host.set_style(&bar, "position", "fixed")?;
    host.set_style(&bar, "z-index", &options.z_index.to_string())?;

    match options.direction {
        Axis::Horizontal => {
            host.set_style(&bar, "height", &options.height)?;
            host.set_style(&bar, "width", "0%")?;
            host.set_style(&bar, "left", "0")?;
            let edge = match options.position {
                ProgressPosition::Bottom => "bottom",
                _ => "top",
            };
            host.set_style(&bar, edge, "0")?;
        }
        Axis::Vertical => {
            host.set_style(&bar, "width", &options.width)?;
            host.set_style(&bar, "height", "0%")?;
            host.set_style(&bar, "bottom", "0")?;
            let edge = match options.position {
                ProgressPosition::Left => "left",
                _ => "right",
            };
            host.set_style(&bar, edge, "0")?;
        }
    }

    host.set_style(&bar, "background-color", &options.color)?;
    host.set_style(&bar, "transform-origin", "left top")?;
    let grows = match options.direction {
        Axis::Horizontal => "width",
        Axis::Vertical => "height",
    };
    host.set_style(&bar, "will-change", grows)?;
    Ok(bar)
}

fn create_label(host: &mut dyn Host, options: &ProgressOptions) -> Result<TargetId> {
    let label = host.create_placeholder(0.0, 0.0);
    host.append_to_root(&label)?;
    let z_index = options.z_index.to_string();
    for (property, value) in [
        ("position", "fixed"),
        ("z-index", z_index.as_str()),
        ("background-color", options.color.as_str()),
        ("color", "#fff"),
        ("padding", "5px 10px"),
        ("border-radius", "3px"),
        ("font-size", "12px"),
        ("font-weight", "bold"),
    ] {
        host.set_style(&label, property, value)?;
    }

    // sits just past the bar's thickness
    match (options.direction, options.position) {
        (Axis::Horizontal, ProgressPosition::Bottom) => {
            host.set_style(&label, "bottom", &options.height)?;
            host.set_style(&label, "right", "10px")?;
        }
        (Axis::Horizontal, _) => {
            host.set_style(&label, "top", &options.height)?;
            host.set_style(&label, "right", "10px")?;
        }
        (Axis::Vertical, ProgressPosition::Left) => {
            host.set_style(&label, "left", &options.width)?;
            host.set_style(&label, "bottom", "10px")?;
        }
        (Axis::Vertical, _) => {
            host.set_style(&label, "right", &options.width)?;
            host.set_style(&label, "bottom", "10px")?;
        }
    }
    Ok(label)
}

impl ScrollEngine {
    /// Show how far the page (or `options.container`) has been scrolled.
    ///
    /// Creates a fixed bar when `bar` is `None`; an existing node is only
    /// resized.
    pub fn scroll_progress(
        &mut self,
        bar: Option<TargetId>,
        options: ProgressOptions,
        host: &mut dyn Host,
    ) -> Result<ProgressHandle> {
        let owns_bar = bar.is_none();
        let bar = match bar {
            Some(bar) => bar,
            None => create_bar(host, &options)?,
        };
        let label = if options.show_percentage {
            Some(create_label(host, &options)?)
        } else {
            None
        };

        let min_range = self.config().min_scroll_range;
        let container = options.container.clone();
        let end = Offset::computed(move |host| {
            let height = container
                .as_ref()
                .and_then(|c| host.geometry(c))
                .map(|rect| rect.height)
                .unwrap_or_else(|| host.document_size().1);
            (height - host.viewport_size().1).max(min_range)
        });

        let view = Rc::new(ProgressView {
            bar: bar.clone(),
            label: label.clone(),
            direction: options.direction,
            format: options.format,
        });
        // the ends of the range are only reached through leave events
        let (on_leave, on_leave_back) = (view.clone(), view.clone());
        let trigger = self.create_trigger(
            TriggerOptions::scroll(0.0, end)
                .label(format!("progress {}", bar))
                .on_update(move |trigger, ctx| view.show(&mut *ctx.host, trigger.progress()))
                .on_leave(move |_, ctx| on_leave.show(&mut *ctx.host, 1.0))
                .on_leave_back(move |_, ctx| on_leave_back.show(&mut *ctx.host, 0.0)),
            &*host,
        )?;

        debug!("Progress indicator on {}", bar);
        Ok(ProgressHandle {
            trigger,
            bar,
            label,
            owns_bar,
        })
    }
}
