use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Arena handle for a node in a [`DomTree`](crate::dom::DomTree).
///
/// Nodes own nothing: children and the parent back-reference are stored as
/// ids into the tree's arena, so the structure stays a plain `Vec` with no
/// reference cycles even though parents and children point at each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position in the arena. Only meaningful within the tree that issued it.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A DOM node: either an element or a terminal text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomNode {
    Element(ElementNode),
    Text(TextNode),
}

impl DomNode {
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            DomNode::Element(el) => Some(el),
            DomNode::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            DomNode::Element(_) => None,
            DomNode::Text(text) => Some(text),
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            DomNode::Element(el) => el.is_visible,
            DomNode::Text(text) => text.is_visible,
        }
    }

    /// Child ids, empty for text nodes.
    pub fn children(&self) -> &[NodeId] {
        match self {
            DomNode::Element(el) => &el.children,
            DomNode::Text(_) => &[],
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            DomNode::Element(el) => el.parent,
            DomNode::Text(text) => text.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: NodeId) {
        match self {
            DomNode::Element(el) => el.parent = Some(parent),
            DomNode::Text(text) => text.parent = Some(parent),
        }
    }
}

/// An element captured from the live page.
///
/// The `xpath` is a position-derived locator computed at snapshot time; any
/// DOM mutation after the snapshot invalidates it silently, so it is a
/// best-effort re-location key, never a permanent identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    /// Lowercase HTML tag name.
    pub tag_name: String,

    /// Position-derived xpath from the document root.
    pub xpath: String,

    /// Attributes in document order.
    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    #[serde(default)]
    pub is_visible: bool,

    #[serde(default)]
    pub is_interactive: bool,

    /// Whether the element is the topmost at its own center point
    /// (not covered by an overlay).
    #[serde(default)]
    pub is_top_element: bool,

    #[serde(default)]
    pub is_in_viewport: bool,

    /// Whether this element hosts a shadow root. Shadow children appear in
    /// `children` like ordinary ones.
    #[serde(default)]
    pub shadow_root: bool,

    /// Per-snapshot index for interactive, addressable elements. Reset on
    /// every snapshot; unique within one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_index: Option<usize>,

    /// Host viewport dimensions, reported on the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_info: Option<ViewportInfo>,

    /// Layout geometry as reported by the host. Never computed here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,

    /// Computed cursor style, one classifier input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_style: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,

    /// Back-reference; `None` only for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
}

impl ElementNode {
    pub fn new(tag_name: impl Into<String>, xpath: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            xpath: xpath.into(),
            attributes: IndexMap::new(),
            is_visible: false,
            is_interactive: false,
            is_top_element: false,
            is_in_viewport: false,
            shadow_root: false,
            highlight_index: None,
            viewport_info: None,
            bounding_box: None,
            cursor_style: None,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn id_attr(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn role(&self) -> Option<&str> {
        self.attribute("role")
    }

    /// Parsed `tabindex`, if present and numeric.
    pub fn tabindex(&self) -> Option<i32> {
        self.attribute("tabindex")?.trim().parse().ok()
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.attribute("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class_name))
            .unwrap_or(false)
    }
}

/// A terminal text run. Never has children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,

    #[serde(default)]
    pub is_visible: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_visible: false,
            parent: None,
        }
    }
}

/// Host viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportInfo {
    pub width: f64,
    pub height: f64,
}

/// Element geometry in page coordinates, reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the box occupies any area at all.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Whether the box intersects the viewport expanded by `margin` pixels
    /// on every side.
    pub fn intersects_expanded_viewport(&self, viewport: ViewportInfo, margin: f64) -> bool {
        self.x < viewport.width + margin
            && self.x + self.width > -margin
            && self.y < viewport.height + margin
            && self.y + self.height > -margin
    }
}
