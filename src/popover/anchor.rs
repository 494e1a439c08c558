//! Anchored placement of the popover around a span rectangle.

use serde::{Deserialize, Serialize};

use crate::domain::Rect;

/// Placement tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Below this much room above the span, the popover goes underneath.
    /// A fixed heuristic: the popover's rendered height is unknown until
    /// its content arrives, so it must cap its own max-height.
    #[serde(default = "default_flip_threshold")]
    pub flip_threshold: f64,

    /// Distance between span and popover edge
    #[serde(default = "default_gap")]
    pub gap: f64,

    /// Minimum distance between popover and container edges
    #[serde(default = "default_margin")]
    pub margin: f64,

    /// Minimum distance between indicator and popover edges
    #[serde(default = "default_indicator_margin")]
    pub indicator_margin: f64,

    /// Drag distance (either axis) beyond which the indicator is hidden
    #[serde(default = "default_drag_hide_threshold")]
    pub drag_hide_threshold: f64,
}

fn default_flip_threshold() -> f64 {
    220.0
}
fn default_gap() -> f64 {
    10.0
}
fn default_margin() -> f64 {
    8.0
}
fn default_indicator_margin() -> f64 {
    16.0
}
fn default_drag_hide_threshold() -> f64 {
    20.0
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            flip_threshold: default_flip_threshold(),
            gap: default_gap(),
            margin: default_margin(),
            indicator_margin: default_indicator_margin(),
            drag_hide_threshold: default_drag_hide_threshold(),
        }
    }
}

/// Which side of the span the popover sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Above,
    Below,
}

/// Popover anchor relative to the reference container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopoverAnchor {
    /// Span box, container-relative
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,

    pub side: Side,

    /// y of the popover edge facing the span: its top when `Below`,
    /// its bottom when `Above`
    pub edge_y: f64,

    /// Clamped horizontal center of the popover
    pub center_x: f64,

    /// Indicator x relative to the popover's own center
    pub indicator_offset: f64,
}

/// Place a popover of `popover_width` next to `span_rect`.
///
/// `span_rect` and `container_rect` are viewport coordinates; the result is
/// relative to the container.
pub fn compute_anchor(
    span_rect: Rect,
    container_rect: Rect,
    viewport_width: f64,
    popover_width: f64,
    config: &PlacementConfig,
) -> PopoverAnchor {
    let top = span_rect.top - container_rect.top;
    let left = span_rect.left - container_rect.left;

    // Room above is measured to whichever top edge is lower on screen
    let space_above = span_rect.top - container_rect.top.max(0.0);
    let (side, edge_y) = if space_above < config.flip_threshold {
        (Side::Below, top + span_rect.height + config.gap)
    } else {
        (Side::Above, top - config.gap)
    };

    let bound = container_rect
        .width
        .min(viewport_width - container_rect.left)
        .max(0.0);
    let half = popover_width / 2.0;
    let span_center = left + span_rect.width / 2.0;

    let min_center = config.margin + half;
    let max_center = bound - config.margin - half;
    let center_x = if min_center > max_center {
        bound / 2.0
    } else {
        span_center.clamp(min_center, max_center)
    };

    let indicator_limit = (half - config.indicator_margin).max(0.0);
    let indicator_offset = (span_center - center_x).clamp(-indicator_limit, indicator_limit);

    PopoverAnchor {
        top,
        left,
        width: span_rect.width,
        height: span_rect.height,
        side,
        edge_y,
        center_x,
        indicator_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 2000.0)
    }

    #[test]
    fn test_below_when_near_top() {
        let span = Rect::new(100.0, 50.0, 40.0, 20.0);
        let a = compute_anchor(span, container(), 800.0, 300.0, &PlacementConfig::default());
        assert_eq!(a.side, Side::Below);
        assert_eq!(a.edge_y, 80.0);
    }

    #[test]
    fn test_above_when_room() {
        let span = Rect::new(300.0, 400.0, 40.0, 20.0);
        let a = compute_anchor(span, container(), 800.0, 300.0, &PlacementConfig::default());
        assert_eq!(a.side, Side::Above);
        assert_eq!(a.edge_y, 390.0);
        assert_eq!(a.center_x, 320.0);
        assert_eq!(a.indicator_offset, 0.0);
    }

    #[test]
    fn test_left_edge_clamp() {
        let span = Rect::new(0.0, 400.0, 20.0, 20.0);
        let a = compute_anchor(span, container(), 800.0, 300.0, &PlacementConfig::default());
        assert_eq!(a.center_x, 158.0);
        // span center 10 is 148 left of the popover center; limit is 150 - 16
        assert_eq!(a.indicator_offset, -134.0);
    }

    #[test]
    fn test_container_relative_coordinates() {
        let container = Rect::new(100.0, 300.0, 600.0, 1000.0);
        let span = Rect::new(400.0, 350.0, 50.0, 20.0);
        let a = compute_anchor(span, container, 1024.0, 200.0, &PlacementConfig::default());
        assert_eq!(a.top, 50.0);
        assert_eq!(a.left, 300.0);
        // 350 - 300 = 50 above: below the span
        assert_eq!(a.side, Side::Below);
        assert_eq!(a.edge_y, 80.0);
    }

    #[test]
    fn test_popover_wider_than_container_is_centered() {
        let span = Rect::new(10.0, 400.0, 20.0, 20.0);
        let narrow = Rect::new(0.0, 0.0, 200.0, 1000.0);
        let a = compute_anchor(span, narrow, 200.0, 300.0, &PlacementConfig::default());
        assert_eq!(a.center_x, 100.0);
    }
}
