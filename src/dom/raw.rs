//! Wire types for the extraction script's payload.
//!
//! The injected script emits a flat id → node map (entries bottom-up, so a
//! child's id is always present before its parent references it), the id of
//! the document body, and the host viewport size. Individual entries are
//! kept as raw JSON here and parsed one at a time by the builder, so one
//! malformed entry can be skipped without aborting the whole build.

use crate::dom::node::{BoundingBox, ViewportInfo};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Top-level payload of one extraction round trip.
#[derive(Debug, Deserialize)]
pub struct RawSnapshot {
    /// Flat id → node-data map. Insertion order is the script's emission
    /// order, which keeps rebuilds deterministic for identical input.
    pub map: IndexMap<String, Value>,

    /// Id of the document body within `map`.
    #[serde(rename = "rootId")]
    pub root_id: String,

    /// Host viewport dimensions at snapshot time.
    #[serde(default)]
    pub viewport: Option<ViewportInfo>,
}

/// One entry of the flat map: either an element payload or a text payload.
/// Discriminated by `type == "TEXT_NODE"`, matching the script's output.
#[derive(Debug, Deserialize)]
pub struct RawNode {
    #[serde(rename = "type")]
    pub node_type: Option<String>,

    // Text payload.
    pub text: Option<String>,

    // Element payload.
    #[serde(rename = "tagName")]
    pub tag_name: Option<String>,
    pub xpath: Option<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    #[serde(default)]
    pub children: Vec<String>,

    #[serde(default, rename = "isVisible")]
    pub is_visible: bool,
    #[serde(default, rename = "isTopElement")]
    pub is_top_element: bool,
    #[serde(default, rename = "isInViewport")]
    pub is_in_viewport: bool,
    #[serde(default, rename = "shadowRoot")]
    pub shadow_root: bool,

    #[serde(rename = "cursorStyle")]
    pub cursor_style: Option<String>,
    #[serde(rename = "boundingBox")]
    pub bounding_box: Option<BoundingBox>,
    pub viewport: Option<ViewportInfo>,
}

impl RawNode {
    pub fn is_text(&self) -> bool {
        self.node_type.as_deref() == Some("TEXT_NODE")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_entry() {
        let json = serde_json::json!({"type": "TEXT_NODE", "text": "hi", "isVisible": true});
        let node: RawNode = serde_json::from_value(json).unwrap();
        assert!(node.is_text());
        assert_eq!(node.text.as_deref(), Some("hi"));
        assert!(node.is_visible);
    }

    #[test]
    fn test_element_entry() {
        let json = serde_json::json!({
            "tagName": "button",
            "xpath": "/html/body/button[1]",
            "attributes": {"id": "go"},
            "children": ["2", "3"],
            "isVisible": true,
            "isInViewport": true,
            "cursorStyle": "pointer",
            "boundingBox": {"x": 1.0, "y": 2.0, "width": 30.0, "height": 10.0}
        });
        let node: RawNode = serde_json::from_value(json).unwrap();
        assert!(!node.is_text());
        assert_eq!(node.tag_name.as_deref(), Some("button"));
        assert_eq!(node.children, vec!["2", "3"]);
        assert_eq!(node.cursor_style.as_deref(), Some("pointer"));
        assert!(node.bounding_box.is_some());
    }

    #[test]
    fn test_snapshot_payload() {
        let json = serde_json::json!({
            "rootId": "0",
            "viewport": {"width": 1280.0, "height": 720.0},
            "map": {
                "0": {"tagName": "body", "xpath": "/html/body", "children": []}
            }
        });
        let raw: RawSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(raw.root_id, "0");
        assert_eq!(raw.map.len(), 1);
        assert_eq!(raw.viewport.unwrap().width, 1280.0);
    }
}
