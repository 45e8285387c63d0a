use crate::dom::node::{BoundingBox, DomNode, ElementNode, NodeId};
use indexmap::IndexMap;

/// Attributes worth surfacing to a planner. Everything else (style blobs,
/// framework internals) is noise at that level.
pub const EXPOSED_ATTRIBUTES: &[&str] = &[
    "id", "class", "name", "role", "type", "placeholder", "value", "href",
    "title", "alt", "aria-label", "aria-expanded", "data-action",
];

/// Upper bound on the visible text carried by one selector-map entry.
pub const MAX_ENTRY_TEXT: usize = 100;

/// Arena-backed DOM tree: one root element, nodes addressed by [`NodeId`].
///
/// The arena owns every node; children and parents are ids, so there is no
/// reference cycle to manage and traversals never recurse (pages can nest
/// thousands of levels deep).
#[derive(Debug, Clone, PartialEq)]
pub struct DomTree {
    nodes: Vec<DomNode>,
    root: NodeId,
}

impl DomTree {
    /// A tree consisting of a single element, used for blank pages.
    pub fn single(root: ElementNode) -> Self {
        Self {
            nodes: vec![DomNode::Element(root)],
            root: NodeId(0),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            // Patched by `set_root` once the root id is resolved.
            root: NodeId(0),
        }
    }

    pub(crate) fn push(&mut self, node: DomNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut DomNode {
        &mut self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementNode> {
        self.get(id).and_then(DomNode::as_element)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first pre-order ids starting at the root. Iterative with an
    /// explicit stack; children are visited in document order. A node
    /// referenced by more than one parent appears once, at its first
    /// (document-order) position, which also bounds the walk on payloads
    /// whose child links happen to form a cycle.
    pub fn dfs_pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            order.push(id);
            for &child in self.node(id).children().iter().rev() {
                if !visited[child.0] {
                    stack.push(child);
                }
            }
        }
        order
    }

    /// Whether `id` can be reached from the root via children links.
    pub fn is_reachable(&self, id: NodeId) -> bool {
        self.dfs_pre_order().contains(&id)
    }

    pub fn count_elements(&self) -> usize {
        self.dfs_pre_order()
            .iter()
            .filter(|&&id| self.element(id).is_some())
            .count()
    }

    /// Visible text under `id`, stopping at the next interactive descendant
    /// so each addressable element describes only its own label, truncated
    /// to [`MAX_ENTRY_TEXT`].
    pub fn visible_text_until_interactive(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children().iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            match self.node(current) {
                DomNode::Text(text) => {
                    if text.is_visible && !text.text.trim().is_empty() {
                        parts.push(text.text.trim());
                    }
                }
                DomNode::Element(el) => {
                    // A nested addressable element owns its own text.
                    if el.highlight_index.is_some() {
                        continue;
                    }
                    for &child in el.children.iter().rev() {
                        stack.push(child);
                    }
                }
            }
        }
        truncate_chars(&parts.join(" "), MAX_ENTRY_TEXT)
    }
}

/// Truncate at a char boundary, appending an ellipsis when anything was cut.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// Per-snapshot mapping from highlight index to node. Insertion-ordered;
/// indices are dense and unique within one snapshot, never across snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorMap {
    map: IndexMap<usize, NodeId>,
    next_index: usize,
}

impl SelectorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node and return the index assigned to it.
    pub fn register(&mut self, node: NodeId) -> usize {
        let index = self.next_index;
        self.map.insert(index, node);
        self.next_index += 1;
        index
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.map.get(&index).copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.map.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.map.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.map.iter().map(|(&idx, &node)| (idx, node))
    }
}

/// Planner-facing view of one selector-map entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorEntry {
    pub index: usize,
    pub tag_name: String,
    /// Subset of attributes listed in [`EXPOSED_ATTRIBUTES`], in document
    /// order.
    pub attributes: IndexMap<String, String>,
    pub bounding_box: Option<BoundingBox>,
    /// Visible text up to the next interactive descendant, truncated.
    pub text: String,
}

impl SelectorEntry {
    pub(crate) fn from_element(index: usize, element: &ElementNode, text: String) -> Self {
        let attributes = element
            .attributes
            .iter()
            .filter(|(key, _)| EXPOSED_ATTRIBUTES.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self {
            index,
            tag_name: element.tag_name.clone(),
            attributes,
            bounding_box: element.bounding_box,
            text,
        }
    }

    /// One-line rendering, e.g. `[3]<button id="go">Search</button>`.
    pub fn to_line(&self) -> String {
        let mut line = format!("[{}]<{}", self.index, self.tag_name);
        for (key, value) in &self.attributes {
            line.push_str(&format!(" {}=\"{}\"", key, value));
        }
        line.push('>');
        line.push_str(&self.text);
        line.push_str(&format!("</{}>", self.tag_name));
        line
    }
}
