//! Capabilities the engine consumes from its environment
//!
//! The engine never touches a document directly. Everything it reads
//! (scroll offset, geometry) or writes (styles, nodes) goes through these
//! traits, so the same engine drives a browser binding, the in-memory
//! [`Page`](crate::page::Page), or a test double.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;
use crate::Result;

/// Opaque handle naming a node on the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&TargetId> for TargetId {
    fn from(id: &TargetId) -> Self {
        id.clone()
    }
}

/// Box geometry in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top, left, width, height }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Read access to scroll position and layout
pub trait Viewport {
    /// Current scroll offset `(x, y)`
    fn scroll_offset(&self) -> (f64, f64);

    /// Visible area `(width, height)`
    fn viewport_size(&self) -> (f64, f64);

    /// Scrollable extent `(width, height)`
    fn document_size(&self) -> (f64, f64);

    /// Box of `target` in document coordinates, `None` if it no longer resolves
    fn geometry(&self, target: &TargetId) -> Option<Rect>;

    /// Move the scroll position; observed by the next frame
    fn set_scroll_offset(&mut self, x: f64, y: f64);
}

/// Write access to visual state
pub trait PropertySink {
    /// Apply `value` with `unit` to `property` on `target`.
    ///
    /// `"transform"` takes a `{ property, value }` structured value and merges
    /// that single function into the existing transform list; a text value
    /// replaces the whole list. Names starting with `--` are custom properties.
    /// Anything else goes to the native style surface, falling back to a
    /// direct property on the node.
    fn apply(&mut self, target: &TargetId, property: &str, value: &Value, unit: &str)
        -> Result<()>;

    /// Current inline value of `property`, if set
    fn read(&self, target: &TargetId, property: &str) -> Option<String>;

    /// Set a style to a literal string
    fn set_style(&mut self, target: &TargetId, property: &str, text: &str) -> Result<()> {
        self.apply(target, property, &Value::Text(text.to_string()), "")
    }
}

/// Node lifecycle for spacers, markers and progress bars
pub trait NodeOps {
    /// Create a detached node with the given box size
    fn create_placeholder(&mut self, width: f64, height: f64) -> TargetId;

    fn insert_before(&mut self, node: &TargetId, reference: &TargetId) -> Result<()>;

    fn insert_after(&mut self, node: &TargetId, reference: &TargetId) -> Result<()>;

    fn append_to_root(&mut self, node: &TargetId) -> Result<()>;

    fn remove_node(&mut self, node: &TargetId) -> Result<()>;

    fn add_class(&mut self, node: &TargetId, class: &str) -> Result<()>;

    fn remove_class(&mut self, node: &TargetId, class: &str) -> Result<()>;
}

/// Everything the engine needs from its environment
pub trait Host: Viewport + PropertySink + NodeOps {}

impl<T: Viewport + PropertySink + NodeOps + ?Sized> Host for T {}

/// Which class of device the host reports, for effects that opt out per class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Desktop,
    Mobile,
}
