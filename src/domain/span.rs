//! Span and context types produced by the resolver.
//!
//! All offsets are codepoint indices, never byte indices. Byte offsets
//! would shift under multi-byte scripts (Cyrillic, Greek, Hangul) and
//! the resolver's callers count characters, not bytes.

use serde::{Deserialize, Serialize};

/// Opaque handle to a node in a document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// A position inside a text node: the character at `offset` of `node`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caret {
    /// The text node
    pub node: NodeId,
    /// Codepoint index into the node's text
    pub offset: usize,
}

impl Caret {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A resolved token or multi-token selection within a content container.
///
/// Invariant: `start_offset <= end_offset`, both measured in codepoints of
/// the flattened text content of `container`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// The span text (a single word, or a verbatim trimmed selection)
    pub text: String,

    /// Start offset within the flattened container text
    pub start_offset: usize,

    /// End offset (exclusive) within the flattened container text
    pub end_offset: usize,

    /// The container the offsets are measured against
    pub container: NodeId,

    /// Text node and local offset where the span starts
    pub anchor: Caret,
}

impl Span {
    /// Length of the span in codepoints
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }
}

/// Where the context text was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    /// Nearest block-level ancestor (paragraph, heading, list item, quote, block)
    Block,
    /// No block ancestor; the immediate parent element
    ParentElement,
    /// No parent element; the raw text node
    TextNode,
}

/// The sentence or paragraph substring surrounding a span.
///
/// Invariant: `span_offset_in_context` points at the span's start within `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    pub text: String,
    pub span_offset_in_context: usize,
    pub source: ContextSource,
}

impl ContextWindow {
    /// Context that is just the span itself
    pub fn of_span(span: &Span) -> Self {
        Self {
            text: span.text.clone(),
            span_offset_in_context: 0,
            source: ContextSource::TextNode,
        }
    }
}
