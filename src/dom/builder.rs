//! Reconstruction of a typed tree from the extraction script's flat map.
//!
//! The script emits entries bottom-up, children before the parents that
//! reference them, so construction is two passes over an id-indexed table
//! rather than recursion: parse everything, then link children by id. A
//! third, iterative pre-order pass classifies interactivity and assigns
//! highlight indices. Malformed entries are skipped and logged; only an
//! unresolvable root aborts the build.

use crate::dom::classifier::{self, InteractivityClassifier};
use crate::dom::node::{DomNode, ElementNode, NodeId, TextNode};
use crate::dom::raw::{RawNode, RawSnapshot};
use crate::dom::tree::{DomTree, SelectorMap};
use crate::dom::Snapshot;
use crate::error::{Result, SnapshotError};
use std::collections::HashMap;

pub struct DomSnapshotBuilder {
    viewport_expansion: i64,
}

impl DomSnapshotBuilder {
    pub fn new(viewport_expansion: i64) -> Self {
        Self { viewport_expansion }
    }

    /// Build a snapshot from one extraction payload. Consumes the payload;
    /// the raw map and the id table are gone once linking is done, which
    /// matters on pages with thousands of nodes.
    pub fn build(&self, raw: RawSnapshot) -> Result<Snapshot> {
        let mut tree = DomTree::with_capacity(raw.map.len());
        let mut id_table: HashMap<String, NodeId> = HashMap::with_capacity(raw.map.len());
        // (parent NodeId, child ids as emitted by the script)
        let mut pending_links: Vec<(NodeId, Vec<String>)> = Vec::new();

        for (raw_id, value) in raw.map {
            match parse_entry(&raw_id, value) {
                Some((node, child_ids)) => {
                    let node_id = tree.push(node);
                    if !child_ids.is_empty() {
                        pending_links.push((node_id, child_ids));
                    }
                    id_table.insert(raw_id, node_id);
                }
                None => continue,
            }
        }

        for (parent_id, child_ids) in pending_links {
            let mut children = Vec::with_capacity(child_ids.len());
            for raw_child in &child_ids {
                match id_table.get(raw_child) {
                    Some(&child_id) => {
                        children.push(child_id);
                        tree.node_mut(child_id).set_parent(parent_id);
                    }
                    // Child was filtered out of the map; not an error.
                    None => log::debug!("child id {} not in node map, skipping", raw_child),
                }
            }
            if let DomNode::Element(el) = tree.node_mut(parent_id) {
                el.children = children;
            }
        }

        let root = id_table.get(&raw.root_id).copied().ok_or_else(|| {
            SnapshotError::Structural(format!("root id {} not present in node map", raw.root_id))
        })?;
        drop(id_table);

        match tree.node_mut(root) {
            DomNode::Element(el) => el.viewport_info = raw.viewport,
            DomNode::Text(_) => {
                return Err(SnapshotError::Structural(format!(
                    "root id {} resolves to a text node",
                    raw.root_id
                )))
            }
        }
        tree.set_root(root);

        let classifier = InteractivityClassifier::new(raw.viewport, self.viewport_expansion);
        let selector_map = assign_indices(&mut tree, classifier);

        Ok(Snapshot { tree, selector_map })
    }
}

/// Classify every element and hand out highlight indices in depth-first
/// pre-order from the root, shadow-root children included like ordinary
/// ones. The order is a pure function of the tree, so rebuilding from the
/// same payload reproduces the same indices.
fn assign_indices(tree: &mut DomTree, classifier: InteractivityClassifier) -> SelectorMap {
    let mut selector_map = SelectorMap::new();
    for id in tree.dfs_pre_order() {
        if let DomNode::Element(el) = tree.node_mut(id) {
            el.is_interactive = classifier::is_interactive(el);
        } else {
            continue;
        }
        let addressable = tree
            .element(id)
            .map_or(false, |el| classifier.is_addressable(el));
        if addressable {
            let index = selector_map.register(id);
            if let DomNode::Element(el) = tree.node_mut(id) {
                el.highlight_index = Some(index);
            }
        }
    }
    selector_map
}

/// Parse one flat-map entry into a node plus its raw child ids. Returns
/// `None` (and logs) for anything malformed; one bad entry never aborts the
/// build.
fn parse_entry(raw_id: &str, value: serde_json::Value) -> Option<(DomNode, Vec<String>)> {
    let raw: RawNode = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("skipping malformed node entry {}: {}", raw_id, e);
            return None;
        }
    };

    if raw.is_text() {
        let Some(text) = raw.text else {
            log::warn!("skipping text entry {} without text", raw_id);
            return None;
        };
        let mut node = TextNode::new(text);
        node.is_visible = raw.is_visible;
        return Some((DomNode::Text(node), Vec::new()));
    }

    let (Some(tag_name), Some(xpath)) = (raw.tag_name, raw.xpath) else {
        log::warn!("skipping element entry {} without tag name or xpath", raw_id);
        return None;
    };

    let mut node = ElementNode::new(tag_name, xpath);
    node.attributes = raw.attributes;
    node.is_visible = raw.is_visible;
    node.is_top_element = raw.is_top_element;
    node.is_in_viewport = raw.is_in_viewport;
    node.shadow_root = raw.shadow_root;
    node.cursor_style = raw.cursor_style;
    node.bounding_box = raw.bounding_box;
    node.viewport_info = raw.viewport;

    Some((DomNode::Element(node), raw.children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(map: serde_json::Value, root_id: &str) -> RawSnapshot {
        serde_json::from_value(json!({
            "map": map,
            "rootId": root_id,
            "viewport": {"width": 1280.0, "height": 720.0}
        }))
        .unwrap()
    }

    fn button_entry(xpath: &str) -> serde_json::Value {
        json!({
            "tagName": "button",
            "xpath": xpath,
            "isVisible": true,
            "isInViewport": true,
            "boundingBox": {"x": 10.0, "y": 10.0, "width": 80.0, "height": 24.0},
            "children": []
        })
    }

    #[test]
    fn test_concrete_scenario() {
        // body(children=[a, b]), a: <button>, b: text("hi"); only the
        // button is addressable.
        let raw = payload(
            json!({
                "a": button_entry("/html/body/button[1]"),
                "b": {"type": "TEXT_NODE", "text": "hi", "isVisible": true},
                "root": {
                    "tagName": "body",
                    "xpath": "/html/body",
                    "isVisible": true,
                    "children": ["a", "b"]
                }
            }),
            "root",
        );

        let snapshot = DomSnapshotBuilder::new(0).build(raw).unwrap();
        let tree = &snapshot.tree;
        let root = tree.element(tree.root()).unwrap();
        assert_eq!(root.tag_name, "body");
        assert_eq!(root.children.len(), 2);

        let first = tree.node(root.children[0]).as_element().unwrap();
        assert_eq!(first.tag_name, "button");
        assert_eq!(first.highlight_index, Some(0));

        let second = tree.node(root.children[1]).as_text().unwrap();
        assert_eq!(second.text, "hi");

        assert_eq!(snapshot.selector_map.len(), 1);
        assert_eq!(snapshot.selector_map.get(0), Some(root.children[0]));
    }

    #[test]
    fn test_parent_links() {
        let raw = payload(
            json!({
                "a": button_entry("/html/body/button[1]"),
                "root": {
                    "tagName": "body", "xpath": "/html/body",
                    "isVisible": true, "children": ["a"]
                }
            }),
            "root",
        );
        let snapshot = DomSnapshotBuilder::new(0).build(raw).unwrap();
        let tree = &snapshot.tree;

        let root = tree.root();
        assert!(tree.node(root).parent().is_none());
        let button_id = tree.element(root).unwrap().children[0];
        assert_eq!(tree.node(button_id).parent(), Some(root));
    }

    #[test]
    fn test_malformed_entry_is_skipped_not_fatal() {
        let raw = payload(
            json!({
                "bad": {"attributes": "not-a-map"},
                "no_tag": {"isVisible": true},
                "a": button_entry("/html/body/button[1]"),
                "root": {
                    "tagName": "body", "xpath": "/html/body",
                    "isVisible": true,
                    "children": ["bad", "no_tag", "a"]
                }
            }),
            "root",
        );
        let snapshot = DomSnapshotBuilder::new(0).build(raw).unwrap();
        // Both broken entries dropped; the button survived.
        let root = snapshot.tree.element(snapshot.tree.root()).unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(snapshot.selector_map.len(), 1);
    }

    #[test]
    fn test_missing_root_is_structural_error() {
        let raw = payload(json!({"a": button_entry("/html/body/button[1]")}), "nope");
        let err = DomSnapshotBuilder::new(0).build(raw).unwrap_err();
        assert!(matches!(err, SnapshotError::Structural(_)));
    }

    #[test]
    fn test_text_root_is_structural_error() {
        let raw = payload(
            json!({"t": {"type": "TEXT_NODE", "text": "hi", "isVisible": true}}),
            "t",
        );
        let err = DomSnapshotBuilder::new(0).build(raw).unwrap_err();
        assert!(matches!(err, SnapshotError::Structural(_)));
    }

    #[test]
    fn test_index_assignment_order_is_pre_order() {
        // body > [div > [button b1], button b2, a link]; pre-order gives
        // b1=0, b2=1, link=2 regardless of map emission order.
        let raw = payload(
            json!({
                "b1": button_entry("/html/body/div[1]/button[1]"),
                "link": {
                    "tagName": "a", "xpath": "/html/body/a[1]",
                    "isVisible": true, "isInViewport": true,
                    "boundingBox": {"x": 0.0, "y": 300.0, "width": 40.0, "height": 12.0},
                    "children": []
                },
                "b2": button_entry("/html/body/button[1]"),
                "div": {
                    "tagName": "div", "xpath": "/html/body/div[1]",
                    "isVisible": true, "children": ["b1"]
                },
                "root": {
                    "tagName": "body", "xpath": "/html/body",
                    "isVisible": true, "children": ["div", "b2", "link"]
                }
            }),
            "root",
        );

        let snapshot = DomSnapshotBuilder::new(0).build(raw).unwrap();
        assert_eq!(snapshot.selector_map.len(), 3);
        assert_eq!(
            snapshot.selector_map.indices().collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let xpath_of = |index: usize| {
            let id = snapshot.selector_map.get(index).unwrap();
            snapshot.tree.element(id).unwrap().xpath.clone()
        };
        assert_eq!(xpath_of(0), "/html/body/div[1]/button[1]");
        assert_eq!(xpath_of(1), "/html/body/button[1]");
        assert_eq!(xpath_of(2), "/html/body/a[1]");
    }

    #[test]
    fn test_unknown_child_id_is_skipped() {
        let raw = payload(
            json!({
                "a": button_entry("/html/body/button[1]"),
                "root": {
                    "tagName": "body", "xpath": "/html/body",
                    "isVisible": true, "children": ["ghost", "a"]
                }
            }),
            "root",
        );
        let snapshot = DomSnapshotBuilder::new(0).build(raw).unwrap();
        let root = snapshot.tree.element(snapshot.tree.root()).unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_shared_child_gets_one_index() {
        // Two parents listing the same button: one element, one index.
        let raw = payload(
            json!({
                "btn": button_entry("/html/body/div[1]/button[1]"),
                "d1": {
                    "tagName": "div", "xpath": "/html/body/div[1]",
                    "isVisible": true, "children": ["btn"]
                },
                "d2": {
                    "tagName": "div", "xpath": "/html/body/div[2]",
                    "isVisible": true, "children": ["btn"]
                },
                "root": {
                    "tagName": "body", "xpath": "/html/body",
                    "isVisible": true, "children": ["d1", "d2"]
                }
            }),
            "root",
        );

        let snapshot = DomSnapshotBuilder::new(0).build(raw).unwrap();
        assert_eq!(snapshot.selector_map.len(), 1);
        assert_eq!(
            snapshot.selector_map.indices().collect::<Vec<_>>(),
            vec![0]
        );
        let id = snapshot.selector_map.get(0).unwrap();
        assert_eq!(
            snapshot.tree.element(id).unwrap().highlight_index,
            Some(0)
        );
    }

    #[test]
    fn test_cyclic_child_links_do_not_hang() {
        // div lists the root back as its own child.
        let raw = payload(
            json!({
                "a": button_entry("/html/body/div[1]/button[1]"),
                "div": {
                    "tagName": "div", "xpath": "/html/body/div[1]",
                    "isVisible": true, "children": ["a", "root"]
                },
                "root": {
                    "tagName": "body", "xpath": "/html/body",
                    "isVisible": true, "children": ["div"]
                }
            }),
            "root",
        );

        let snapshot = DomSnapshotBuilder::new(0).build(raw).unwrap();
        assert_eq!(snapshot.tree.dfs_pre_order().len(), 3);
        assert_eq!(snapshot.selector_map.len(), 1);
    }

    #[test]
    fn test_viewport_expansion_widens_inclusion() {
        let below_fold = json!({
            "a": {
                "tagName": "button", "xpath": "/html/body/button[1]",
                "isVisible": true, "isInViewport": false,
                "boundingBox": {"x": 10.0, "y": 900.0, "width": 80.0, "height": 24.0},
                "children": []
            },
            "root": {
                "tagName": "body", "xpath": "/html/body",
                "isVisible": true, "children": ["a"]
            }
        });

        let strict = DomSnapshotBuilder::new(0)
            .build(payload(below_fold.clone(), "root"))
            .unwrap();
        assert!(strict.selector_map.is_empty());

        let expanded = DomSnapshotBuilder::new(500)
            .build(payload(below_fold, "root"))
            .unwrap();
        assert_eq!(expanded.selector_map.len(), 1);
    }

    #[test]
    fn test_determinism_same_payload_same_snapshot() {
        let make = || {
            payload(
                json!({
                    "b1": button_entry("/html/body/button[1]"),
                    "b2": button_entry("/html/body/button[2]"),
                    "t": {"type": "TEXT_NODE", "text": "x", "isVisible": true},
                    "root": {
                        "tagName": "body", "xpath": "/html/body",
                        "isVisible": true, "children": ["b1", "t", "b2"]
                    }
                }),
                "root",
            )
        };
        let first = DomSnapshotBuilder::new(0).build(make()).unwrap();
        let second = DomSnapshotBuilder::new(0).build(make()).unwrap();

        assert_eq!(first.tree, second.tree);
        assert_eq!(first.selector_map, second.selector_map);
    }
}
