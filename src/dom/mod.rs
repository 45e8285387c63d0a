//! DOM snapshot model.
//!
//! One extraction round trip against the live page yields a [`Snapshot`]: a
//! typed element/text tree rebuilt from the bridge's flat node map, plus the
//! [`SelectorMap`] that addresses its interactive elements by small-integer
//! highlight index. A snapshot is self-contained and transient; it belongs
//! to the caller until discarded and is never mutated after construction.

pub mod builder;
pub mod classifier;
pub mod node;
pub mod raw;
pub mod tree;

pub use builder::DomSnapshotBuilder;
pub use classifier::InteractivityClassifier;
pub use node::{BoundingBox, DomNode, ElementNode, NodeId, TextNode, ViewportInfo};
pub use raw::{RawNode, RawSnapshot};
pub use tree::{DomTree, SelectorEntry, SelectorMap, EXPOSED_ATTRIBUTES, MAX_ENTRY_TEXT};

/// One complete page capture: the tree and its selector map.
///
/// Highlight indices are unique within this snapshot only; they reset on
/// every capture. The stored xpaths are best-effort locators that any page
/// mutation invalidates silently.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tree: DomTree,
    pub selector_map: SelectorMap,
}

impl Snapshot {
    /// The minimal snapshot for a blank placeholder page: a single invisible
    /// empty body and no addressable elements. Built without any bridge
    /// round trip.
    pub fn blank() -> Self {
        Self {
            tree: DomTree::single(ElementNode::new("body", "/html/body")),
            selector_map: SelectorMap::new(),
        }
    }

    /// Planner-facing view of one addressable element.
    pub fn entry(&self, index: usize) -> Option<SelectorEntry> {
        let id = self.selector_map.get(index)?;
        let element = self.tree.element(id)?;
        let text = self.tree.visible_text_until_interactive(id);
        Some(SelectorEntry::from_element(index, element, text))
    }

    /// All addressable elements in index order.
    pub fn entries(&self) -> Vec<SelectorEntry> {
        self.selector_map
            .indices()
            .filter_map(|index| self.entry(index))
            .collect()
    }

    /// One line per addressable element, for a planner or LLM prompt.
    pub fn describe_elements(&self) -> String {
        self.entries()
            .iter()
            .map(SelectorEntry::to_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Stored locator for an addressable element.
    pub fn xpath_of(&self, index: usize) -> Option<&str> {
        let id = self.selector_map.get(index)?;
        self.tree.element(id).map(|el| el.xpath.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_snapshot() {
        let snapshot = Snapshot::blank();
        assert!(snapshot.selector_map.is_empty());

        let root = snapshot.tree.element(snapshot.tree.root()).unwrap();
        assert_eq!(root.tag_name, "body");
        assert!(!root.is_visible);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_entry_for_missing_index() {
        let snapshot = Snapshot::blank();
        assert!(snapshot.entry(0).is_none());
        assert!(snapshot.xpath_of(0).is_none());
        assert_eq!(snapshot.describe_elements(), "");
    }
}
