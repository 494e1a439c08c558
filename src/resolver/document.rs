//! Document tree and the text-flattening capability the resolver runs on.
//!
//! The resolver never looks at markup. It only needs to walk parents,
//! tell block containers from inline ones, and read text nodes in
//! document order. Anything that can answer those questions implements
//! [`TextTree`]; [`Document`] is the in-crate arena implementation.

use crate::domain::{Caret, NodeId};

/// Element kinds the resolver distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Document root (not a block: context never extends to the whole article)
    Root,
    Paragraph,
    Heading(u8),
    ListItem,
    Quote,
    /// Generic block (div, section, ...)
    Block,
    /// Inline formatting (em, strong, a, span, ...)
    Inline,
}

impl ElementKind {
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            ElementKind::Paragraph
                | ElementKind::Heading(_)
                | ElementKind::ListItem
                | ElementKind::Quote
                | ElementKind::Block
        )
    }
}

/// Read-only view of a document tree
pub trait TextTree {
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> &[NodeId];

    /// Text of a text node; `None` for elements
    fn text(&self, node: NodeId) -> Option<&str>;

    fn is_element(&self, node: NodeId) -> bool;

    fn is_block(&self, node: NodeId) -> bool;
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(ElementKind),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-allocated document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element(ElementKind::Root),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Build a document from plain article text: one paragraph per
    /// non-blank line, no markup.
    pub fn from_article(text: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root();
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let p = doc.append_element(root, ElementKind::Paragraph);
            doc.append_text(p, line);
        }
        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn append_element(&mut self, parent: NodeId, kind: ElementKind) -> NodeId {
        self.push(parent, NodeData::Element(kind))
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push(parent, NodeData::Text(text.into()))
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        id
    }

    /// Element kind, or `None` for text nodes and unknown ids
    pub fn kind(&self, node: NodeId) -> Option<ElementKind> {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Element(kind)) => Some(*kind),
            _ => None,
        }
    }

    /// Direct children of the root that are block containers
    pub fn blocks(&self) -> Vec<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .filter(|&id| self.is_block(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

impl TextTree for Document {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.kind(node).is_some()
    }

    fn is_block(&self, node: NodeId) -> bool {
        self.kind(node).map(|k| k.is_block()).unwrap_or(false)
    }
}

/// Number of codepoints in a string
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Text nodes under `container` in document order.
///
/// A text node passed as its own container yields itself.
pub fn text_nodes<T: TextTree + ?Sized>(tree: &T, container: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![container];

    while let Some(node) = stack.pop() {
        if tree.text(node).is_some() {
            out.push(node);
            continue;
        }
        // Reverse so the leftmost child is visited first
        for &child in tree.children(node).iter().rev() {
            stack.push(child);
        }
    }

    out
}

/// Flattened text content of a container (all descendant text, no separators)
pub fn text_content<T: TextTree + ?Sized>(tree: &T, container: NodeId) -> String {
    text_nodes(tree, container)
        .into_iter()
        .filter_map(|n| tree.text(n))
        .collect()
}

/// Whether `node` is `ancestor` or one of its descendants
pub fn contains<T: TextTree + ?Sized>(tree: &T, ancestor: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if n == ancestor {
            return true;
        }
        current = tree.parent(n);
    }
    false
}

/// Offset of `caret` within the flattened text of `container`.
///
/// Sums the lengths of every text node preceding the caret's node in
/// document order, so inline elements in between never shift the result.
/// `caret.offset` may equal the node length (a boundary after its last
/// character). Returns `None` if the node is not a text node under
/// `container` or the offset is out of range.
pub fn global_offset<T: TextTree + ?Sized>(
    tree: &T,
    container: NodeId,
    caret: Caret,
) -> Option<usize> {
    let mut total = 0;
    for node in text_nodes(tree, container) {
        let len = char_len(tree.text(node)?);
        if node == caret.node {
            return (caret.offset <= len).then_some(total + caret.offset);
        }
        total += len;
    }
    None
}

/// Inverse of [`global_offset`]: the text node position holding the
/// character at `offset`. An offset equal to the total length maps to the
/// end of the last text node.
pub fn caret_at_offset<T: TextTree + ?Sized>(
    tree: &T,
    container: NodeId,
    offset: usize,
) -> Option<Caret> {
    let mut total = 0;
    let mut last = None;
    for node in text_nodes(tree, container) {
        let len = char_len(tree.text(node)?);
        if offset < total + len {
            return Some(Caret::new(node, offset - total));
        }
        total += len;
        last = Some((node, len));
    }
    match last {
        Some((node, len)) if offset == total => Some(Caret::new(node, len)),
        _ => None,
    }
}
