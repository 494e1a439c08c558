//! Sentence-level context extraction around a resolved span.
//!
//! Sentence boundaries come from a fixed terminator set. Abbreviations
//! such as "Mr." end a sentence like any other full stop.

use crate::domain::{ContextSource, ContextWindow, NodeId, Span};

use super::document::{global_offset, text_content, TextTree};

/// Characters that end a sentence
pub const TERMINATORS: [char; 7] = ['.', '!', '?', '。', '？', '！', '\n'];

pub fn is_terminator(c: char) -> bool {
    TERMINATORS.contains(&c)
}

/// Sentence bounds around `start..end` in `chars`.
///
/// Scans backward from `start` to just past the previous terminator
/// (terminator excluded) and forward from the span's last character to the
/// next terminator (terminator included). Missing terminators extend the
/// window to the text boundary.
pub fn sentence_bounds(chars: &[char], start: usize, end: usize) -> (usize, usize) {
    let start = start.min(chars.len());
    let end = end.clamp(start, chars.len());

    let mut ctx_start = start;
    while ctx_start > 0 && !is_terminator(chars[ctx_start - 1]) {
        ctx_start -= 1;
    }

    let scan_from = if end > start { end - 1 } else { start };
    let ctx_end = chars[scan_from..]
        .iter()
        .position(|&c| is_terminator(c))
        .map(|i| scan_from + i + 1)
        .unwrap_or(chars.len());

    (ctx_start, ctx_end)
}

/// Nearest block-level ancestor of a node
pub(crate) fn block_container<T: TextTree + ?Sized>(tree: &T, node: NodeId) -> Option<NodeId> {
    let mut current = tree.parent(node);
    while let Some(n) = current {
        if tree.is_block(n) {
            return Some(n);
        }
        current = tree.parent(n);
    }
    None
}

/// Recover the sentence surrounding `span`.
///
/// The context container is the nearest block ancestor of the span's
/// anchor node, else its parent element, else the text node itself.
/// Never fails: if the anchor cannot be located the span text is its own
/// context.
pub fn extract_context<T: TextTree + ?Sized>(tree: &T, span: &Span) -> ContextWindow {
    let anchor = span.anchor;

    let (container, source) = match block_container(tree, anchor.node) {
        Some(block) => (block, ContextSource::Block),
        None => match tree.parent(anchor.node) {
            Some(parent) if tree.is_element(parent) => (parent, ContextSource::ParentElement),
            _ => (anchor.node, ContextSource::TextNode),
        },
    };

    let flattened = text_content(tree, container);
    let Some(local_start) = global_offset(tree, container, anchor) else {
        return ContextWindow::of_span(span);
    };

    let chars: Vec<char> = flattened.chars().collect();
    let local_end = (local_start + span.len()).min(chars.len());
    let (ctx_start, ctx_end) = sentence_bounds(&chars, local_start, local_end);

    // Trim surrounding whitespace without crossing the span start
    let window = &chars[ctx_start..ctx_end];
    let leading = window
        .iter()
        .take(local_start - ctx_start)
        .take_while(|c| c.is_whitespace())
        .count();
    let trailing = window[leading..]
        .iter()
        .rev()
        .take_while(|c| c.is_whitespace())
        .count();
    let trimmed = &window[leading..window.len() - trailing];

    ContextWindow {
        text: trimmed.iter().collect(),
        span_offset_in_context: local_start - ctx_start - leading,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(s: &str, start: usize, end: usize) -> String {
        let chars: Vec<char> = s.chars().collect();
        let (a, b) = sentence_bounds(&chars, start, end);
        chars[a..b].iter().collect()
    }

    #[test]
    fn test_bounds_single_sentence() {
        assert_eq!(bounds("Han kan ikke tale dansk.", 13, 17), "Han kan ikke tale dansk.");
    }

    #[test]
    fn test_bounds_middle_sentence() {
        let text = "Hej. Han kan tale! Farvel.";
        assert_eq!(bounds(text, 13, 17), " Han kan tale!");
    }

    #[test]
    fn test_bounds_no_trailing_terminator() {
        assert_eq!(bounds("First. second part", 7, 13), " second part");
    }

    #[test]
    fn test_bounds_cjk_terminators() {
        let text = "前文。Это слово！後";
        // "слово" starts at 7
        assert_eq!(bounds(text, 7, 12), "Это слово！");
    }

    #[test]
    fn test_bounds_span_ending_on_terminator() {
        let text = "One. Two three. Four.";
        // selection "Two three." = 5..15
        assert_eq!(bounds(text, 5, 15), " Two three.");
    }

    #[test]
    fn test_bounds_newline_is_terminator() {
        assert_eq!(bounds("line one\nline two", 10, 14), "line two");
    }

    #[test]
    fn test_abbreviation_is_not_special() {
        let text = "Ask Mr. Smith now.";
        // "Smith" at 8..13
        assert_eq!(bounds(text, 8, 13), " Smith now.");
    }
}
