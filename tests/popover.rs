//! Popover Placement Integration Tests
//!
//! Placement properties over a sweep of span positions, and drag handling.

use wordlens::domain::{Point, Rect};
use wordlens::popover::{apply_drag, compute_anchor, DragState, PlacementConfig, Side};
use wordlens::resolver::{resolve_at_point, Document, Layout, LayoutMetrics, MonospaceLayout};

#[test]
fn test_right_edge_clamp_holds_for_every_span_position() {
    let config = PlacementConfig::default();
    let container = Rect::new(0.0, 0.0, 800.0, 2000.0);
    let popover_width = 300.0;
    let max_center = container.width - popover_width / 2.0 - config.margin;
    let min_center = popover_width / 2.0 + config.margin;
    let indicator_limit = popover_width / 2.0 - config.indicator_margin;

    let mut left = 0.0;
    while left < 800.0 {
        let span = Rect::new(left, 500.0, 30.0, 20.0);
        let a = compute_anchor(span, container, 1280.0, popover_width, &config);

        assert!(a.center_x <= max_center, "center {} for span at {}", a.center_x, left);
        assert!(a.center_x >= min_center, "center {} for span at {}", a.center_x, left);
        assert!(a.indicator_offset.abs() <= indicator_limit);
        left += 7.0;
    }
}

#[test]
fn test_span_at_right_edge() {
    let config = PlacementConfig::default();
    let container = Rect::new(0.0, 0.0, 800.0, 2000.0);
    let span = Rect::new(770.0, 500.0, 30.0, 20.0);

    let a = compute_anchor(span, container, 800.0, 300.0, &config);
    assert_eq!(a.center_x, 800.0 - 150.0 - 8.0);
    // Span center 785 is 143 right of the popover center, limit 134
    assert_eq!(a.indicator_offset, 134.0);
}

#[test]
fn test_viewport_narrower_than_container_bounds_the_popover() {
    let config = PlacementConfig::default();
    let container = Rect::new(100.0, 0.0, 1200.0, 2000.0);
    let span = Rect::new(850.0, 500.0, 30.0, 20.0);

    // Only 900 - 100 = 800 units of the container are visible
    let a = compute_anchor(span, container, 900.0, 300.0, &config);
    assert_eq!(a.center_x, 800.0 - 150.0 - 8.0);
}

#[test]
fn test_flip_threshold_boundary() {
    let config = PlacementConfig::default();
    let container = Rect::new(0.0, 0.0, 800.0, 2000.0);

    let just_below = Rect::new(100.0, config.flip_threshold - 1.0, 30.0, 20.0);
    let a = compute_anchor(just_below, container, 800.0, 300.0, &config);
    assert_eq!(a.side, Side::Below);
    assert_eq!(a.edge_y, just_below.bottom() + config.gap);

    let at = Rect::new(100.0, config.flip_threshold, 30.0, 20.0);
    let a = compute_anchor(at, container, 800.0, 300.0, &config);
    assert_eq!(a.side, Side::Above);
    assert_eq!(a.edge_y, at.top - config.gap);
}

#[test]
fn test_scrolled_container_measures_room_to_viewport_top() {
    let config = PlacementConfig::default();
    // Container scrolled 1000 units up; span 100 units below the viewport top
    let container = Rect::new(0.0, -1000.0, 800.0, 3000.0);
    let span = Rect::new(100.0, 100.0, 30.0, 20.0);

    let a = compute_anchor(span, container, 800.0, 300.0, &config);
    assert_eq!(a.side, Side::Below);
    assert_eq!(a.top, 1100.0);
}

#[test]
fn test_drag_moves_popover_and_hides_indicator_past_threshold() {
    let config = PlacementConfig::default();
    let container = Rect::new(0.0, 0.0, 800.0, 2000.0);
    let anchor = compute_anchor(Rect::new(300.0, 500.0, 40.0, 20.0), container, 800.0, 300.0, &config);
    let handle = Rect::new(170.0, 400.0, 300.0, 24.0);

    let mut drag = DragState::new();
    assert!(drag.begin(Point::new(200.0, 410.0), handle));
    drag.update(Point::new(215.0, 405.0));

    let pos = apply_drag(&anchor, &drag, &config);
    assert_eq!(pos.center_x, anchor.center_x + 15.0);
    assert_eq!(pos.edge_y, anchor.edge_y - 5.0);
    assert!(pos.show_indicator);

    drag.update(Point::new(221.0, 405.0));
    assert!(!apply_drag(&anchor, &drag, &config).show_indicator);

    drag.end();
    drag.update(Point::new(400.0, 400.0));
    assert_eq!(drag.offset(), (21.0, -5.0));
}

#[test]
fn test_drag_outside_handle_is_ignored() {
    let mut drag = DragState::new();
    assert!(!drag.begin(Point::new(5.0, 5.0), Rect::new(100.0, 100.0, 50.0, 20.0)));
    drag.update(Point::new(50.0, 50.0));
    assert_eq!(drag.offset(), (0.0, 0.0));
}

#[test]
fn test_anchor_from_resolved_span_geometry() {
    let doc = Document::from_article("Han kan ikke tale dansk.");
    let layout = MonospaceLayout::new(&doc, doc.root(), LayoutMetrics::default());
    let span = resolve_at_point(&doc, &layout, Point::new(135.0, 12.0), doc.root()).unwrap();

    let rect = layout.span_rect(&span).unwrap();
    assert_eq!(rect, Rect::new(130.0, 0.0, 40.0, 24.0));

    let a = compute_anchor(rect, layout.bounds(), 600.0, 300.0, &PlacementConfig::default());
    assert_eq!(a.side, Side::Below);
    assert_eq!(a.center_x, 158.0);
    assert_eq!(a.indicator_offset, -8.0);
}
