//! User drag repositioning of the popover.

use crate::domain::{Point, Rect};

use super::anchor::{PlacementConfig, PopoverAnchor, Side};

/// Accumulated drag offset for the current popover.
///
/// Reset whenever a new definition is shown, not when the anchor is merely
/// recomputed (e.g. on resize).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    dx: f64,
    dy: f64,
    /// Pointer position at the last `begin`/`update` while dragging
    last: Option<Point>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging if `point` lies on the drag handle.
    ///
    /// Returns whether a drag started.
    pub fn begin(&mut self, point: Point, handle: Rect) -> bool {
        if !handle.contains(point) {
            return false;
        }
        self.last = Some(point);
        true
    }

    /// Move the pointer; ignored unless a drag is in progress
    pub fn update(&mut self, point: Point) {
        if let Some(last) = self.last {
            self.dx += point.x - last.x;
            self.dy += point.y - last.y;
            self.last = Some(point);
        }
    }

    pub fn end(&mut self) {
        self.last = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    /// The indicator stays visible until the drag exceeds `threshold` on
    /// either axis
    pub fn indicator_visible(&self, threshold: f64) -> bool {
        self.dx.abs() <= threshold && self.dy.abs() <= threshold
    }
}

/// Final position handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPosition {
    pub side: Side,
    pub edge_y: f64,
    pub center_x: f64,
    pub indicator_offset: f64,
    pub show_indicator: bool,
}

/// Apply the accumulated drag to a computed anchor
pub fn apply_drag(anchor: &PopoverAnchor, drag: &DragState, config: &PlacementConfig) -> RenderPosition {
    let (dx, dy) = drag.offset();
    RenderPosition {
        side: anchor.side,
        edge_y: anchor.edge_y + dy,
        center_x: anchor.center_x + dx,
        indicator_offset: anchor.indicator_offset,
        show_indicator: drag.indicator_visible(config.drag_hide_threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> PopoverAnchor {
        PopoverAnchor {
            top: 300.0,
            left: 100.0,
            width: 40.0,
            height: 20.0,
            side: Side::Above,
            edge_y: 290.0,
            center_x: 120.0,
            indicator_offset: 0.0,
        }
    }

    fn handle() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 20.0)
    }

    #[test]
    fn test_drag_outside_handle_is_ignored() {
        let mut drag = DragState::new();
        assert!(!drag.begin(Point::new(50.0, 40.0), handle()));
        drag.update(Point::new(90.0, 90.0));
        assert_eq!(drag.offset(), (0.0, 0.0));
    }

    #[test]
    fn test_drag_accumulates_across_gestures() {
        let mut drag = DragState::new();
        assert!(drag.begin(Point::new(10.0, 10.0), handle()));
        drag.update(Point::new(15.0, 12.0));
        drag.update(Point::new(20.0, 14.0));
        drag.end();
        assert!(!drag.is_dragging());

        assert!(drag.begin(Point::new(50.0, 5.0), handle()));
        drag.update(Point::new(45.0, 5.0));
        drag.end();

        assert_eq!(drag.offset(), (5.0, 4.0));
    }

    #[test]
    fn test_indicator_hidden_past_threshold() {
        let config = PlacementConfig::default();
        let mut drag = DragState::new();
        drag.begin(Point::new(10.0, 10.0), handle());
        drag.update(Point::new(30.0, 10.0));

        let pos = apply_drag(&anchor(), &drag, &config);
        assert!(pos.show_indicator);
        assert_eq!(pos.center_x, 140.0);

        drag.update(Point::new(31.0, 10.0));
        let pos = apply_drag(&anchor(), &drag, &config);
        assert!(!pos.show_indicator);
    }

    #[test]
    fn test_reset_clears_offset() {
        let mut drag = DragState::new();
        drag.begin(Point::new(10.0, 10.0), handle());
        drag.update(Point::new(10.0, 60.0));
        drag.reset();
        assert_eq!(drag.offset(), (0.0, 0.0));
        assert!(!drag.is_dragging());
        assert_eq!(apply_drag(&anchor(), &drag, &PlacementConfig::default()).edge_y, 290.0);
    }
}
