//! In-memory host
//!
//! A flat node table with fixed document geometry, inline styles, classes and
//! direct properties. Layout is not computed: node boxes stay where they were
//! placed. Used by scenarios, the CLI and the viewer, and by tests throughout
//! the crate.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use tracing::trace;

use crate::host::{NodeOps, PropertySink, Rect, TargetId, Viewport};
use crate::value::Value;
use crate::{Error, Result};

/// Property names routed to the style surface rather than stored as direct properties
const STYLE_PROPERTIES: &[&str] = &[
    "background-color",
    "border-radius",
    "bottom",
    "color",
    "display",
    "filter",
    "font-size",
    "font-weight",
    "height",
    "left",
    "margin-left",
    "margin-top",
    "opacity",
    "overflow",
    "padding",
    "position",
    "right",
    "top",
    "transform",
    "transform-origin",
    "transition",
    "visibility",
    "width",
    "will-change",
    "z-index",
];

/// One node on the page
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub rect: Rect,
    pub parent: Option<TargetId>,
    pub styles: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Page {
    scroll: (f64, f64),
    viewport: (f64, f64),
    document: Option<(f64, f64)>,
    nodes: HashMap<TargetId, Node>,
    order: Vec<TargetId>,
    next_node: u64,
}

impl Page {
    /// Create an empty page with the given viewport size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scroll: (0.0, 0.0),
            viewport: (width, height),
            document: None,
            nodes: HashMap::new(),
            order: Vec::new(),
            next_node: 0,
        }
    }

    /// Fix the scrollable extent instead of deriving it from node boxes
    pub fn with_document_size(mut self, width: f64, height: f64) -> Self {
        self.document = Some((width, height));
        self
    }

    /// Add a top-level node at the end of the document
    pub fn add(&mut self, id: impl Into<TargetId>, rect: Rect) -> TargetId {
        let id = id.into();
        self.nodes.insert(id.clone(), Node { rect, ..Default::default() });
        self.order.retain(|n| n != &id);
        self.order.push(id.clone());
        id
    }

    /// Add a node nested under `parent`
    pub fn add_child(&mut self, parent: &TargetId, id: impl Into<TargetId>, rect: Rect) -> TargetId {
        let id = self.add(id, rect);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent.clone());
        }
        id
    }

    pub fn node(&self, id: &TargetId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &TargetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Attached nodes in document order
    pub fn order(&self) -> &[TargetId] {
        &self.order
    }

    pub fn style(&self, id: &TargetId, property: &str) -> Option<&str> {
        self.nodes
            .get(id)?
            .styles
            .get(&style_name(property))
            .map(String::as_str)
    }

    pub fn property(&self, id: &TargetId, name: &str) -> Option<&Value> {
        self.nodes.get(id)?.properties.get(name)
    }

    pub fn has_class(&self, id: &TargetId, class: &str) -> bool {
        self.nodes
            .get(id)
            .map(|n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn parent(&self, id: &TargetId) -> Option<&TargetId> {
        self.nodes.get(id)?.parent.as_ref()
    }

    /// Move a node's box, e.g. to simulate a reflow before `refresh`
    pub fn set_rect(&mut self, id: &TargetId, rect: Rect) -> Result<()> {
        let node = self.node_mut(id)?;
        node.rect = rect;
        Ok(())
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
        self.clamp_scroll();
    }

    fn node_mut(&mut self, id: &TargetId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| Error::MissingTarget(id.to_string()))
    }

    fn max_scroll(&self) -> (f64, f64) {
        let (dw, dh) = self.document_size();
        let (vw, vh) = self.viewport;
        ((dw - vw).max(0.0), (dh - vh).max(0.0))
    }

    fn clamp_scroll(&mut self) {
        let (mx, my) = self.max_scroll();
        self.scroll = (self.scroll.0.clamp(0.0, mx), self.scroll.1.clamp(0.0, my));
    }

    fn detach(&mut self, id: &TargetId) {
        self.order.retain(|n| n != id);
    }

    fn position_of(&self, id: &TargetId) -> Result<usize> {
        self.order
            .iter()
            .position(|n| n == id)
            .ok_or_else(|| Error::MissingTarget(id.to_string()))
    }

    fn insert_at_reference(&mut self, node: &TargetId, reference: &TargetId, after: bool) -> Result<()> {
        if !self.nodes.contains_key(node) {
            return Err(Error::MissingTarget(node.to_string()));
        }
        let parent = self.node_mut(reference)?.parent.clone();
        self.detach(node);
        let index = self.position_of(reference)? + usize::from(after);
        self.order.insert(index, node.clone());
        self.node_mut(node)?.parent = parent;
        Ok(())
    }
}

impl Viewport for Page {
    fn scroll_offset(&self) -> (f64, f64) {
        self.scroll
    }

    fn viewport_size(&self) -> (f64, f64) {
        self.viewport
    }

    fn document_size(&self) -> (f64, f64) {
        if let Some(size) = self.document {
            return size;
        }
        self.nodes.values().fold(self.viewport, |(w, h), node| {
            (w.max(node.rect.right()), h.max(node.rect.bottom()))
        })
    }

    fn geometry(&self, target: &TargetId) -> Option<Rect> {
        self.nodes.get(target).map(|n| n.rect)
    }

    fn set_scroll_offset(&mut self, x: f64, y: f64) {
        self.scroll = (x, y);
        self.clamp_scroll();
    }
}

impl PropertySink for Page {
    fn apply(&mut self, target: &TargetId, property: &str, value: &Value, unit: &str) -> Result<()> {
        let node = self.node_mut(target)?;

        if property == "transform" {
            let next = match value {
                Value::Text(text) => text.clone(),
                Value::Structured(_) => {
                    let function = value
                        .get("property")
                        .and_then(Value::as_text)
                        .ok_or_else(|| {
                            Error::InvalidOption("transform value needs a `property` name".to_string())
                        })?;
                    let amount = value.get("value").map(|v| v.to_string()).unwrap_or_default();
                    let existing = node.styles.get("transform").map(String::as_str).unwrap_or("");
                    merge_transform(existing, function, &format!("{}{}", amount, unit))?
                }
                other => {
                    return Err(Error::InvalidOption(format!(
                        "transform expects a {{property, value}} pair or text, got {}",
                        other.kind()
                    )))
                }
            };
            set_or_clear(&mut node.styles, "transform".to_string(), next);
        } else if property.starts_with("--") {
            set_or_clear(&mut node.styles, property.to_string(), format!("{}{}", value, unit));
        } else {
            let name = style_name(property);
            if STYLE_PROPERTIES.contains(&name.as_str()) {
                set_or_clear(&mut node.styles, name, format!("{}{}", value, unit));
            } else {
                node.properties.insert(property.to_string(), value.clone());
            }
        }

        trace!("{} {} = {}{}", target, property, value, unit);
        Ok(())
    }

    fn read(&self, target: &TargetId, property: &str) -> Option<String> {
        let node = self.nodes.get(target)?;
        node.styles
            .get(&style_name(property))
            .cloned()
            .or_else(|| node.properties.get(property).map(|v| v.to_string()))
    }
}

impl NodeOps for Page {
    fn create_placeholder(&mut self, width: f64, height: f64) -> TargetId {
        self.next_node += 1;
        let id = TargetId::new(format!("scrollfx-node-{}", self.next_node));
        self.nodes.insert(
            id.clone(),
            Node {
                rect: Rect::new(0.0, 0.0, width, height),
                ..Default::default()
            },
        );
        id
    }

    fn insert_before(&mut self, node: &TargetId, reference: &TargetId) -> Result<()> {
        self.insert_at_reference(node, reference, false)
    }

    fn insert_after(&mut self, node: &TargetId, reference: &TargetId) -> Result<()> {
        self.insert_at_reference(node, reference, true)
    }

    fn append_to_root(&mut self, node: &TargetId) -> Result<()> {
        self.node_mut(node)?.parent = None;
        self.detach(node);
        self.order.push(node.clone());
        Ok(())
    }

    fn remove_node(&mut self, node: &TargetId) -> Result<()> {
        self.nodes
            .remove(node)
            .ok_or_else(|| Error::MissingTarget(node.to_string()))?;
        self.detach(node);
        Ok(())
    }

    fn add_class(&mut self, node: &TargetId, class: &str) -> Result<()> {
        let node = self.node_mut(node)?;
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&mut self, node: &TargetId, class: &str) -> Result<()> {
        self.node_mut(node)?.classes.retain(|c| c != class);
        Ok(())
    }
}

/// An empty string clears the inline style, as in a browser
fn set_or_clear(styles: &mut BTreeMap<String, String>, name: String, value: String) {
    if value.is_empty() {
        styles.remove(&name);
    } else {
        styles.insert(name, value);
    }
}

/// Normalize `zIndex` style names to `z-index`; custom properties pass through
fn style_name(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Replace `function(...)` inside a transform list, or append it
pub fn merge_transform(existing: &str, function: &str, argument: &str) -> Result<String> {
    let pattern = Regex::new(&format!(r"\b{}\([^)]*\)", regex::escape(function)))
        .map_err(|e| Error::Other(e.to_string()))?;
    let replacement = format!("{}({})", function, argument);

    if pattern.is_match(existing) {
        Ok(pattern
            .replace(existing, regex::NoExpand(&replacement))
            .into_owned())
    } else {
        Ok(format!("{} {}", existing, replacement).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (Page, TargetId) {
        let mut page = Page::new(1000.0, 800.0).with_document_size(1000.0, 4000.0);
        let id = page.add("box", Rect::new(1200.0, 0.0, 400.0, 300.0));
        (page, id)
    }

    #[test]
    fn test_transform_merge_appends_then_replaces() {
        let (mut page, id) = page();
        page.apply(&id, "transform", &Value::transform("translateY", 10.0), "px").unwrap();
        page.apply(&id, "transform", &Value::transform("rotate", 45.0), "deg").unwrap();
        assert_eq!(page.style(&id, "transform"), Some("translateY(10px) rotate(45deg)"));

        page.apply(&id, "transform", &Value::transform("translateY", 20.0), "px").unwrap();
        assert_eq!(page.style(&id, "transform"), Some("translateY(20px) rotate(45deg)"));
    }

    #[test]
    fn test_transform_text_replaces_all() {
        let (mut page, id) = page();
        page.apply(&id, "transform", &Value::transform("scale", 2.0), "").unwrap();
        page.set_style(&id, "transform", "translateX(-5px)").unwrap();
        assert_eq!(page.style(&id, "transform"), Some("translateX(-5px)"));
    }

    #[test]
    fn test_transform_requires_function_name() {
        let (mut page, id) = page();
        let err = page.apply(&id, "transform", &Value::Number(3.0), "px").unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
    }

    #[test]
    fn test_merge_does_not_match_prefixed_function() {
        let merged = merge_transform("translateX(5px)", "X", "1").unwrap();
        assert_eq!(merged, "translateX(5px) X(1)");
    }

    #[test]
    fn test_custom_property() {
        let (mut page, id) = page();
        page.apply(&id, "--progress", &Value::Number(0.5), "").unwrap();
        assert_eq!(page.style(&id, "--progress"), Some("0.5"));
    }

    #[test]
    fn test_style_then_direct_property() {
        let (mut page, id) = page();
        page.apply(&id, "opacity", &Value::Number(0.25), "").unwrap();
        page.apply(&id, "zIndex", &Value::Number(3.0), "").unwrap();
        page.apply(&id, "volume", &Value::Number(0.8), "").unwrap();

        assert_eq!(page.style(&id, "opacity"), Some("0.25"));
        assert_eq!(page.style(&id, "z-index"), Some("3"));
        assert_eq!(page.property(&id, "volume"), Some(&Value::Number(0.8)));
        assert_eq!(page.read(&id, "volume"), Some("0.8".to_string()));
    }

    #[test]
    fn test_empty_style_clears() {
        let (mut page, id) = page();
        page.set_style(&id, "position", "fixed").unwrap();
        page.set_style(&id, "position", "").unwrap();
        assert_eq!(page.read(&id, "position"), None);
    }

    #[test]
    fn test_missing_target() {
        let (mut page, _) = page();
        let ghost = TargetId::new("ghost");
        let err = page.apply(&ghost, "opacity", &Value::Number(1.0), "").unwrap_err();
        assert!(matches!(err, Error::MissingTarget(name) if name == "ghost"));
    }

    #[test]
    fn test_scroll_clamps_to_document() {
        let (mut page, _) = page();
        page.set_scroll_offset(0.0, 10_000.0);
        assert_eq!(page.scroll_offset(), (0.0, 3200.0));
        page.set_scroll_offset(0.0, -50.0);
        assert_eq!(page.scroll_offset(), (0.0, 0.0));
    }

    #[test]
    fn test_node_ordering() {
        let (mut page, id) = page();
        let spacer = page.create_placeholder(400.0, 300.0);
        assert!(!page.order().contains(&spacer));

        page.insert_before(&spacer, &id).unwrap();
        assert_eq!(page.order(), &[spacer.clone(), id.clone()]);

        page.append_to_root(&spacer).unwrap();
        assert_eq!(page.order(), &[id.clone(), spacer.clone()]);

        page.insert_after(&spacer, &id).unwrap();
        assert_eq!(page.order(), &[id.clone(), spacer.clone()]);

        page.remove_node(&spacer).unwrap();
        assert_eq!(page.order(), &[id]);
        assert!(!page.contains(&spacer));
    }

    #[test]
    fn test_classes() {
        let (mut page, id) = page();
        page.add_class(&id, "pinned").unwrap();
        page.add_class(&id, "pinned").unwrap();
        assert_eq!(page.node(&id).unwrap().classes.len(), 1);
        page.remove_class(&id, "pinned").unwrap();
        assert!(!page.has_class(&id, "pinned"));
    }

    #[test]
    fn test_derived_document_size() {
        let mut page = Page::new(800.0, 600.0);
        page.add("tall", Rect::new(0.0, 0.0, 100.0, 2500.0));
        assert_eq!(page.document_size(), (800.0, 2500.0));
    }
}
