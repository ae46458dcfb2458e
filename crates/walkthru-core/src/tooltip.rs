//! Tour tooltip geometry.
//!
//! Units are whatever the host measures in (CSS pixels, terminal cells).
//! Coordinates grow right and down from the viewport's top-left corner.

use serde::{Deserialize, Serialize};

/// Anchor name that always means "middle of the viewport".
pub const CENTER_TARGET: &str = "center";

/// Distances used when laying out a tooltip, in host units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    /// Space between the anchor and the tooltip.
    pub gap: f64,
    /// Minimum distance between the tooltip and the viewport edge.
    pub edge_margin: f64,
    /// Highlight ring padding around the anchor.
    pub highlight_pad: f64,
}

impl Spacing {
    pub const PIXELS: Spacing = Spacing {
        gap: 16.0,
        edge_margin: 12.0,
        highlight_pad: 4.0,
    };

    pub const CELLS: Spacing = Spacing {
        gap: 1.0,
        edge_margin: 1.0,
        highlight_pad: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Grows the rect by `pad` on every side.
    pub fn inflate(&self, pad: f64) -> Self {
        Self::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }
}

/// Where to draw the tooltip, and the ring around its anchor if any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TooltipLayout {
    pub x: f64,
    pub y: f64,
    pub highlight: Option<Rect>,
}

/// Positions a tooltip of `size` next to `target`.
///
/// The `center` target, or an anchor `resolve` cannot find, centres the
/// tooltip in the viewport without a highlight.
pub fn place<F>(
    target: &str,
    placement: Placement,
    size: Size,
    viewport: Size,
    spacing: Spacing,
    resolve: F,
) -> TooltipLayout
where
    F: FnOnce(&str) -> Option<Rect>,
{
    let anchor = if target == CENTER_TARGET {
        None
    } else {
        resolve(target)
    };
    let Some(rect) = anchor else {
        return TooltipLayout {
            x: (viewport.width - size.width) / 2.0,
            y: (viewport.height - size.height) / 2.0,
            highlight: None,
        };
    };

    let gap = spacing.gap;
    let (x, y) = match placement {
        Placement::Top => (
            rect.center_x() - size.width / 2.0,
            rect.y - size.height - gap,
        ),
        Placement::Bottom => (rect.center_x() - size.width / 2.0, rect.bottom() + gap),
        Placement::Left => (
            rect.x - size.width - gap,
            rect.center_y() - size.height / 2.0,
        ),
        Placement::Right => (rect.right() + gap, rect.center_y() - size.height / 2.0),
        Placement::Center => (
            rect.center_x() - size.width / 2.0,
            rect.center_y() - size.height / 2.0,
        ),
    };

    let margin = spacing.edge_margin;
    TooltipLayout {
        x: clamp_axis(x, size.width, viewport.width, margin),
        y: clamp_axis(y, size.height, viewport.height, margin),
        highlight: Some(rect.inflate(spacing.highlight_pad)),
    }
}

/// Keeps `[pos, pos + len]` inside the margin; the leading edge wins when
/// the tooltip is larger than the viewport.
fn clamp_axis(pos: f64, len: f64, extent: f64, margin: f64) -> f64 {
    pos.min(extent - len - margin).max(margin)
}
