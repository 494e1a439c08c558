//! Hit-testing and span geometry.
//!
//! On a real rendering surface these come from the platform (caret-from-point
//! and client rects). [`MonospaceLayout`] is a fixed-grid stand-in that lays
//! text out in character cells, which is enough to drive the full pipeline
//! from a terminal and from tests.

use std::collections::HashMap;

use crate::domain::{Caret, NodeId, Point, Rect, Span};

use super::document::{text_nodes, TextTree};

/// Platform hit-testing primitive
pub trait HitTest {
    /// The character under `point`, or `None` if the point is not over text
    fn caret_at(&self, point: Point) -> Option<Caret>;
}

/// Geometry queries over laid-out text
pub trait Layout: HitTest {
    /// Bounding rectangle of a span's characters
    fn span_rect(&self, span: &Span) -> Option<Rect>;

    /// Bounds of the laid-out content
    fn bounds(&self) -> Rect;
}

/// Cell metrics for [`MonospaceLayout`]
#[derive(Debug, Clone, Copy)]
pub struct LayoutMetrics {
    pub char_width: f64,
    pub line_height: f64,
    /// Characters per line before hard wrapping
    pub columns: usize,
    /// Extra vertical space between block containers
    pub block_gap: f64,
    pub origin: Point,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            char_width: 10.0,
            line_height: 24.0,
            columns: 60,
            block_gap: 12.0,
            origin: Point::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct Cell {
    caret: Caret,
    rect: Rect,
}

#[derive(Debug, Clone)]
struct Line {
    top: f64,
    first_cell: usize,
    len: usize,
}

/// Character-grid layout of a container's text.
///
/// Holds one cell per codepoint of the container's flattened text, so a
/// cell index equals the container-global offset. Newlines get a
/// zero-width cell and end the line.
#[derive(Debug, Clone)]
pub struct MonospaceLayout {
    metrics: LayoutMetrics,
    cells: Vec<Cell>,
    lines: Vec<Line>,
    index: HashMap<Caret, usize>,
    height: f64,
}

impl MonospaceLayout {
    pub fn new<T: TextTree + ?Sized>(tree: &T, root: NodeId, metrics: LayoutMetrics) -> Self {
        let columns = metrics.columns.max(1);
        let mut cells: Vec<Cell> = Vec::new();
        let mut lines: Vec<Line> = Vec::new();
        let mut y = metrics.origin.y;
        let mut col = 0usize;
        let mut line_open = false;
        let mut prev_block: Option<NodeId> = None;

        for node in text_nodes(tree, root) {
            let Some(text) = tree.text(node) else {
                continue;
            };

            let block = nearest_block(tree, node, root);
            if prev_block.is_some() && prev_block != Some(block) {
                if line_open {
                    y += metrics.line_height;
                    line_open = false;
                }
                y += metrics.block_gap;
                col = 0;
            }
            prev_block = Some(block);

            for (offset, ch) in text.chars().enumerate() {
                let caret = Caret::new(node, offset);
                let x = metrics.origin.x + col as f64 * metrics.char_width;

                if ch == '\n' {
                    cells.push(Cell {
                        caret,
                        rect: Rect::new(x, y, 0.0, metrics.line_height),
                    });
                    y += metrics.line_height;
                    line_open = false;
                    col = 0;
                    continue;
                }

                if line_open && col == columns {
                    y += metrics.line_height;
                    line_open = false;
                }
                if !line_open {
                    lines.push(Line {
                        top: y,
                        first_cell: cells.len(),
                        len: 0,
                    });
                    line_open = true;
                    col = 0;
                }

                let x = metrics.origin.x + col as f64 * metrics.char_width;
                cells.push(Cell {
                    caret,
                    rect: Rect::new(x, y, metrics.char_width, metrics.line_height),
                });
                if let Some(line) = lines.last_mut() {
                    line.len += 1;
                }
                col += 1;
            }
        }

        if line_open {
            y += metrics.line_height;
        }

        let index = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (cell.caret, i))
            .collect();

        Self {
            metrics,
            cells,
            lines,
            index,
            height: y - metrics.origin.y,
        }
    }

    /// Rectangle of the character at `caret`
    pub fn caret_rect(&self, caret: Caret) -> Option<Rect> {
        self.index.get(&caret).map(|&i| self.cells[i].rect)
    }

    /// Center point of the character at `caret` (handy for synthesising clicks)
    pub fn caret_center(&self, caret: Caret) -> Option<Point> {
        self.caret_rect(caret)
            .map(|r| Point::new(r.center_x(), r.top + r.height / 2.0))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

fn nearest_block<T: TextTree + ?Sized>(tree: &T, node: NodeId, root: NodeId) -> NodeId {
    let mut current = tree.parent(node);
    while let Some(n) = current {
        if n == root || tree.is_block(n) {
            return n;
        }
        current = tree.parent(n);
    }
    root
}

impl HitTest for MonospaceLayout {
    fn caret_at(&self, point: Point) -> Option<Caret> {
        let m = &self.metrics;
        if point.x < m.origin.x {
            return None;
        }

        let line = self
            .lines
            .iter()
            .find(|l| point.y >= l.top && point.y < l.top + m.line_height)?;
        let col = ((point.x - m.origin.x) / m.char_width).floor() as usize;
        if col >= line.len {
            return None;
        }

        Some(self.cells[line.first_cell + col].caret)
    }
}

impl Layout for MonospaceLayout {
    fn span_rect(&self, span: &Span) -> Option<Rect> {
        let start = *self.index.get(&span.anchor)?;
        let end = (start + span.len()).min(self.cells.len());

        self.cells[start..end]
            .iter()
            .filter(|c| c.rect.width > 0.0)
            .map(|c| c.rect)
            .reduce(|acc, r| acc.union(&r))
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.metrics.origin.x,
            self.metrics.origin.y,
            self.metrics.columns as f64 * self.metrics.char_width,
            self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::document::Document;

    fn metrics(columns: usize) -> LayoutMetrics {
        LayoutMetrics {
            char_width: 10.0,
            line_height: 20.0,
            columns,
            block_gap: 5.0,
            origin: Point::new(0.0, 0.0),
        }
    }

    #[test]
    fn test_hit_first_paragraph() {
        let doc = Document::from_article("Han kan\nikke tale");
        let layout = MonospaceLayout::new(&doc, doc.root(), metrics(40));
        let blocks = doc.blocks();
        let first_text = doc.children(blocks[0])[0];

        let caret = layout.caret_at(Point::new(45.0, 10.0)).unwrap();
        assert_eq!(caret, Caret::new(first_text, 4));
    }

    #[test]
    fn test_hit_second_paragraph_after_gap() {
        let doc = Document::from_article("Han kan\nikke tale");
        let layout = MonospaceLayout::new(&doc, doc.root(), metrics(40));
        let second_text = doc.children(doc.blocks()[1])[0];

        // Second block starts at y = 20 + 5
        let caret = layout.caret_at(Point::new(5.0, 30.0)).unwrap();
        assert_eq!(caret, Caret::new(second_text, 0));
        assert!(layout.caret_at(Point::new(5.0, 22.0)).is_none());
    }

    #[test]
    fn test_hit_past_line_end_misses() {
        let doc = Document::from_article("kort");
        let layout = MonospaceLayout::new(&doc, doc.root(), metrics(40));
        assert!(layout.caret_at(Point::new(45.0, 10.0)).is_none());
        assert!(layout.caret_at(Point::new(-1.0, 10.0)).is_none());
    }

    #[test]
    fn test_wrapping_and_bounds() {
        let doc = Document::from_article("abcdefghij");
        let layout = MonospaceLayout::new(&doc, doc.root(), metrics(4));
        assert_eq!(layout.line_count(), 3);
        assert_eq!(layout.bounds(), Rect::new(0.0, 0.0, 40.0, 60.0));

        let text = doc.children(doc.blocks()[0])[0];
        assert_eq!(layout.caret_at(Point::new(15.0, 45.0)), Some(Caret::new(text, 9)));
    }

    #[test]
    fn test_span_rect_covers_word() {
        let doc = Document::from_article("Han kan ikke tale dansk.");
        let layout = MonospaceLayout::new(&doc, doc.root(), metrics(60));
        let text = doc.children(doc.blocks()[0])[0];
        let span = Span {
            text: "tale".to_string(),
            start_offset: 13,
            end_offset: 17,
            container: doc.root(),
            anchor: Caret::new(text, 13),
        };
        assert_eq!(layout.span_rect(&span), Some(Rect::new(130.0, 0.0, 40.0, 20.0)));
    }
}
