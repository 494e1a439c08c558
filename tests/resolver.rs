//! Span Resolver Integration Tests
//!
//! Click and drag resolution over documents laid out on the monospace grid.

use wordlens::domain::{Caret, ContextSource, Point};
use wordlens::resolver::{
    resolve_at_caret, resolve_at_point, resolve_from_selection, resolve_with_context, Document,
    ElementKind, LayoutMetrics, MonospaceLayout, SelectionRange, TextTree,
};

const SENTENCE: &str = "Han kan ikke tale dansk.";

fn laid_out(text: &str) -> (Document, MonospaceLayout) {
    let doc = Document::from_article(text);
    let layout = MonospaceLayout::new(&doc, doc.root(), LayoutMetrics::default());
    (doc, layout)
}

fn first_text(doc: &Document, paragraph: usize) -> wordlens::domain::NodeId {
    doc.children(doc.blocks()[paragraph])[0]
}

#[test]
fn test_click_inside_word_resolves_word_and_sentence() {
    let (doc, layout) = laid_out(SENTENCE);

    // Column 13 is the 't' of "tale"
    let span = resolve_at_point(&doc, &layout, Point::new(135.0, 12.0), doc.root()).unwrap();
    assert_eq!(span.text, "tale");
    assert_eq!(span.start_offset, 13);
    assert_eq!(span.end_offset, 17);

    let res = resolve_with_context(&doc, span);
    assert_eq!(res.context.text, "Han kan ikke tale dansk.");
    assert_eq!(res.context.span_offset_in_context, 13);
    assert_eq!(res.context.source, ContextSource::Block);
}

#[test]
fn test_click_anywhere_in_word_gives_same_span() {
    let (doc, layout) = laid_out(SENTENCE);
    for x in [130.0, 145.0, 155.0, 169.0] {
        let span = resolve_at_point(&doc, &layout, Point::new(x, 5.0), doc.root()).unwrap();
        assert_eq!(span.text, "tale", "x = {x}");
    }
}

#[test]
fn test_click_on_whitespace_or_punctuation_misses() {
    let (doc, layout) = laid_out(SENTENCE);
    let root = doc.root();

    // Space after "Han"
    assert!(resolve_at_point(&doc, &layout, Point::new(35.0, 12.0), root).is_none());
    // Final full stop
    assert!(resolve_at_point(&doc, &layout, Point::new(235.0, 12.0), root).is_none());
    // Past the end of the line
    assert!(resolve_at_point(&doc, &layout, Point::new(400.0, 12.0), root).is_none());
    // Below all text
    assert!(resolve_at_point(&doc, &layout, Point::new(10.0, 500.0), root).is_none());
}

#[test]
fn test_punctuation_only_run_misses() {
    let (doc, _) = laid_out("Nej -- ja.");
    let text = first_text(&doc, 0);
    // The "--" run consists of word characters but has no letter or digit
    assert!(resolve_at_caret(&doc, Caret::new(text, 4), doc.root()).is_none());
    assert_eq!(resolve_at_caret(&doc, Caret::new(text, 0), doc.root()).unwrap().text, "Nej");
}

#[test]
fn test_context_is_the_sentence_containing_the_word() {
    let (doc, layout) = laid_out("Hej. Han kan tale! Farvel.");
    let text = first_text(&doc, 0);
    let point = layout.caret_center(Caret::new(text, 9)).unwrap();

    let span = resolve_at_point(&doc, &layout, point, doc.root()).unwrap();
    assert_eq!(span.text, "kan");

    let res = resolve_with_context(&doc, span);
    assert_eq!(res.context.text, "Han kan tale!");
    assert_eq!(res.context.span_offset_in_context, 4);
}

#[test]
fn test_second_paragraph_offsets_are_global_context_is_local() {
    let (doc, layout) = laid_out("Første afsnit.\nHan kan ikke tale dansk.");
    let text = first_text(&doc, 1);
    let point = layout.caret_center(Caret::new(text, 14)).unwrap();

    let span = resolve_at_point(&doc, &layout, point, doc.root()).unwrap();
    assert_eq!(span.text, "tale");
    // "Første afsnit." is 14 codepoints
    assert_eq!(span.start_offset, 14 + 13);
    assert_eq!(span.anchor, Caret::new(text, 13));

    let res = resolve_with_context(&doc, span);
    assert_eq!(res.context.text, SENTENCE);
    assert_eq!(res.context.span_offset_in_context, 13);
}

#[test]
fn test_inline_elements_do_not_shift_offsets() {
    // <p>Han <em>kan</em> ikke <strong>tale</strong> dansk.</p>
    let mut doc = Document::new();
    let root = doc.root();
    let p = doc.append_element(root, ElementKind::Paragraph);
    doc.append_text(p, "Han ");
    let em = doc.append_element(p, ElementKind::Inline);
    doc.append_text(em, "kan");
    doc.append_text(p, " ikke ");
    let strong = doc.append_element(p, ElementKind::Inline);
    let tale = doc.append_text(strong, "tale");
    doc.append_text(p, " dansk.");

    let span = resolve_at_caret(&doc, Caret::new(tale, 2), root).unwrap();
    assert_eq!(span.text, "tale");
    assert_eq!(span.start_offset, 13);

    let res = resolve_with_context(&doc, span);
    assert_eq!(res.context.text, SENTENCE);
    assert_eq!(res.context.span_offset_in_context, 13);
    assert_eq!(res.context.source, ContextSource::Block);
}

#[test]
fn test_context_falls_back_to_parent_element() {
    // Inline element directly under the root: no block ancestor
    let mut doc = Document::new();
    let root = doc.root();
    let span_el = doc.append_element(root, ElementKind::Inline);
    let text = doc.append_text(span_el, "Et ord. Et andet ord");

    let span = resolve_at_caret(&doc, Caret::new(text, 12), root).unwrap();
    assert_eq!(span.text, "andet");

    let res = resolve_with_context(&doc, span);
    assert_eq!(res.context.source, ContextSource::ParentElement);
    assert_eq!(res.context.text, "Et andet ord");
    assert_eq!(res.context.span_offset_in_context, 3);
}

#[test]
fn test_non_latin_scripts_and_hyphens() {
    let (doc, _) = laid_out("Я не говорю по-русски.");
    let text = first_text(&doc, 0);
    let span = resolve_at_caret(&doc, Caret::new(text, 15), doc.root()).unwrap();
    assert_eq!(span.text, "по-русски");

    let (doc, _) = laid_out("저는 한국어를 배워요.");
    let text = first_text(&doc, 0);
    let span = resolve_at_caret(&doc, Caret::new(text, 4), doc.root()).unwrap();
    assert_eq!(span.text, "한국어를");
}

#[test]
fn test_drag_selection_is_verbatim_phrase() {
    let (doc, _) = laid_out(SENTENCE);
    let text = first_text(&doc, 0);

    let range = SelectionRange::new(Caret::new(text, 4), Caret::new(text, 17));
    let span = resolve_from_selection(&doc, &range, doc.root()).unwrap();
    assert_eq!(span.text, "kan ikke tale");
    assert_eq!(span.start_offset, 4);
    assert_eq!(span.end_offset, 17);

    // Dragging right-to-left gives the same span
    let reversed = SelectionRange::new(Caret::new(text, 17), Caret::new(text, 4));
    assert_eq!(resolve_from_selection(&doc, &reversed, doc.root()), Some(span));
}

#[test]
fn test_drag_selection_keeps_punctuation_and_is_not_snapped() {
    let (doc, _) = laid_out(SENTENCE);
    let text = first_text(&doc, 0);

    let range = SelectionRange::new(Caret::new(text, 8), Caret::new(text, 24));
    let span = resolve_from_selection(&doc, &range, doc.root()).unwrap();
    assert_eq!(span.text, "ikke tale dansk.");

    // Partial words stay partial
    let range = SelectionRange::new(Caret::new(text, 5), Caret::new(text, 15));
    let span = resolve_from_selection(&doc, &range, doc.root()).unwrap();
    assert_eq!(span.text, "an ikke ta");
}

#[test]
fn test_drag_selection_trims_and_shifts_start() {
    let (doc, _) = laid_out(SENTENCE);
    let text = first_text(&doc, 0);

    let range = SelectionRange::new(Caret::new(text, 3), Caret::new(text, 8));
    let span = resolve_from_selection(&doc, &range, doc.root()).unwrap();
    assert_eq!(span.text, "kan");
    assert_eq!(span.start_offset, 4);
    assert_eq!(span.anchor, Caret::new(text, 4));

    let res = resolve_with_context(&doc, span);
    assert_eq!(res.context.span_offset_in_context, 4);
}

#[test]
fn test_empty_selections_miss() {
    let (doc, _) = laid_out(SENTENCE);
    let text = first_text(&doc, 0);
    let root = doc.root();

    let collapsed = SelectionRange::new(Caret::new(text, 5), Caret::new(text, 5));
    assert!(collapsed.is_collapsed());
    assert!(resolve_from_selection(&doc, &collapsed, root).is_none());

    let space = SelectionRange::new(Caret::new(text, 3), Caret::new(text, 4));
    assert!(resolve_from_selection(&doc, &space, root).is_none());

    let stop = SelectionRange::new(Caret::new(text, 23), Caret::new(text, 24));
    assert!(resolve_from_selection(&doc, &stop, root).is_none());
}

#[test]
fn test_selection_across_paragraphs() {
    let (doc, _) = laid_out("Han kan.\nIkke tale.");
    let first = first_text(&doc, 0);
    let second = first_text(&doc, 1);

    let range = SelectionRange::new(Caret::new(first, 4), Caret::new(second, 4));
    let span = resolve_from_selection(&doc, &range, doc.root()).unwrap();
    assert_eq!(span.text, "kan.\nIkke");
    assert_eq!(span.anchor, Caret::new(first, 4));
    // Offsets count document characters; the break is not one of them
    assert_eq!(span.start_offset, 4);
    assert_eq!(span.end_offset, 12);
}

#[test]
fn test_selection_starting_at_paragraph_end_drops_the_break() {
    let (doc, _) = laid_out("Han kan.\nIkke tale.");
    let first = first_text(&doc, 0);
    let second = first_text(&doc, 1);

    // From after "kan." into the next paragraph: no leading break survives
    let range = SelectionRange::new(Caret::new(first, 8), Caret::new(second, 4));
    let span = resolve_from_selection(&doc, &range, doc.root()).unwrap();
    assert_eq!(span.text, "Ikke");
    assert_eq!(span.start_offset, 8);
    assert_eq!(span.anchor, Caret::new(second, 0));
}
