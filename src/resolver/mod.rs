//! Span resolution: from a pointer hit or a drag selection to the word or
//! phrase the reader meant, plus the sentence around it.
//!
//! # Design
//!
//! - **Platform-free**: the algorithm runs over any [`TextTree`]; hit-testing
//!   comes in through [`HitTest`].
//! - **Misses are values**: nothing here returns an error. A click on
//!   whitespace or punctuation, or an empty selection, yields `None`, which
//!   callers treat as "clear the popover".
//! - **Codepoint offsets**: offsets are computed by walking text nodes in
//!   document order, never from markup positions.
//!
//! # Example
//!
//! ```
//! use wordlens::resolver::{self, Document, LayoutMetrics, MonospaceLayout};
//!
//! let doc = Document::from_article("Han kan ikke tale dansk.");
//! let layout = MonospaceLayout::new(&doc, doc.root(), LayoutMetrics::default());
//! let point = wordlens::domain::Point::new(135.0, 12.0);
//! let res = resolver::resolve_at_point(&doc, &layout, point, doc.root()).unwrap();
//! assert_eq!(res.text, "tale");
//! ```

pub mod context;
pub mod document;
pub mod layout;
pub mod words;

pub use context::{extract_context, is_terminator, sentence_bounds, TERMINATORS};
pub use document::{
    caret_at_offset, char_len, contains, global_offset, text_content, text_nodes, Document,
    ElementKind, TextTree,
};
pub use layout::{HitTest, Layout, LayoutMetrics, MonospaceLayout};
pub use words::{expand_word, has_alphanumeric, is_word_char};

use crate::domain::{Caret, ContextWindow, NodeId, Point, Span};
use context::block_container;

/// A drag selection between two boundary carets, in either order.
///
/// Unlike a hit caret, a boundary caret's offset may equal its node's
/// length (the position after the last character).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub anchor: Caret,
    pub focus: Caret,
}

impl SelectionRange {
    pub fn new(anchor: Caret, focus: Caret) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// A resolved span together with its context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub span: Span,
    pub context: ContextWindow,
}

/// Resolve the word under a pointer position inside `root`
pub fn resolve_at_point<T, H>(tree: &T, hit: &H, point: Point, root: NodeId) -> Option<Span>
where
    T: TextTree + ?Sized,
    H: HitTest + ?Sized,
{
    let caret = hit.caret_at(point)?;
    resolve_at_caret(tree, caret, root)
}

/// Resolve the word containing the character at `caret`.
///
/// Expands to the maximal run of word characters within the caret's text
/// node. Returns `None` when the caret is outside `root`, not over a word
/// character, or the run has no letter or digit.
pub fn resolve_at_caret<T: TextTree + ?Sized>(tree: &T, caret: Caret, root: NodeId) -> Option<Span> {
    if !contains(tree, root, caret.node) {
        return None;
    }

    let chars: Vec<char> = tree.text(caret.node)?.chars().collect();
    let (start, end) = expand_word(&chars, caret.offset)?;
    let text: String = chars[start..end].iter().collect();
    if !has_alphanumeric(&text) {
        return None;
    }

    let anchor = Caret::new(caret.node, start);
    let start_offset = global_offset(tree, root, anchor)?;

    Some(Span {
        text,
        start_offset,
        end_offset: start_offset + (end - start),
        container: root,
        anchor,
    })
}

/// Resolve a drag selection to a verbatim phrase span.
///
/// The selected text is trimmed of surrounding whitespace and otherwise
/// kept as is (internal punctuation and spaces included); it is never
/// snapped to word boundaries. A selection crossing block containers gets
/// a `\n` at each block break. Offsets count document characters only,
/// so the inserted breaks widen `text` but not `end_offset - start_offset`.
pub fn resolve_from_selection<T: TextTree + ?Sized>(
    tree: &T,
    selection: &SelectionRange,
    root: NodeId,
) -> Option<Span> {
    if selection.is_collapsed() {
        return None;
    }

    let a = global_offset(tree, root, selection.anchor)?;
    let b = global_offset(tree, root, selection.focus)?;
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    if start == end {
        return None;
    }

    let raw = selected_chars(tree, root, start, end);
    let leading = raw.iter().take_while(|(c, _)| c.is_whitespace()).count();
    let trailing = raw[leading..]
        .iter()
        .rev()
        .take_while(|(c, _)| c.is_whitespace())
        .count();
    let kept = &raw[leading..raw.len() - trailing];

    let text: String = kept.iter().map(|(c, _)| *c).collect();
    if text.is_empty() || !has_alphanumeric(&text) {
        return None;
    }

    let start_offset = start + raw[..leading].iter().filter(|(_, real)| *real).count();
    let anchor = caret_at_offset(tree, root, start_offset)?;

    Some(Span {
        text,
        start_offset,
        end_offset: start_offset + kept.iter().filter(|(_, real)| *real).count(),
        container: root,
        anchor,
    })
}

/// Characters in `[start, end)` of the flattened text of `root`, with a
/// synthetic `\n` (flagged `false`) between pieces from different blocks.
fn selected_chars<T: TextTree + ?Sized>(
    tree: &T,
    root: NodeId,
    start: usize,
    end: usize,
) -> Vec<(char, bool)> {
    let mut out = Vec::with_capacity(end - start);
    let mut block: Option<Option<NodeId>> = None;
    let mut pos = 0;

    for node in text_nodes(tree, root) {
        if pos >= end {
            break;
        }
        let Some(text) = tree.text(node) else {
            continue;
        };
        let len = char_len(text);
        let (from, to) = (start.max(pos), end.min(pos + len));
        if from < to {
            let current = block_container(tree, node);
            if block.is_some_and(|previous| previous != current) {
                out.push(('\n', false));
            }
            block = Some(current);
            out.extend(text.chars().skip(from - pos).take(to - from).map(|c| (c, true)));
        }
        pos += len;
    }

    out
}

/// Attach the sentence context to a resolved span
pub fn resolve_with_context<T: TextTree + ?Sized>(tree: &T, span: Span) -> Resolution {
    let context = extract_context(tree, &span);
    Resolution { span, context }
}
