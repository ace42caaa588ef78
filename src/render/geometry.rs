//! Positions, link segments and node appearance.
//!
//! Layout space has `x` running across siblings and `y` running down the
//! levels. The drawing surface shows the tree growing left to right, so
//! projection to the screen swaps the axes.

use serde::{Deserialize, Serialize};

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Screen order `[horizontal, vertical]`.
    #[inline]
    pub fn projected(self) -> [f32; 2] {
        [self.y, self.x]
    }

    /// Inverse of [`Position::projected`].
    #[inline]
    pub fn from_screen(horizontal: f32, vertical: f32) -> Self {
        Self {
            x: vertical,
            y: horizontal,
        }
    }
}

/// The two endpoints of a link.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    pub source: Position,
    pub target: Position,
}

impl Segment {
    #[inline]
    pub fn new(source: Position, target: Position) -> Self {
        Self { source, target }
    }

    /// A zero-length segment at `point`.
    #[inline]
    pub fn collapsed(point: Position) -> Self {
        Self {
            source: point,
            target: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.source == self.target
    }

    /// The cubic Bezier a link is drawn as, in screen order.
    ///
    /// Both control points sit halfway between the levels, giving the
    /// horizontal S-curve of a left-to-right tree.
    pub fn diagonal(&self) -> Diagonal {
        let mid = (self.source.y + self.target.y) / 2.0;
        Diagonal {
            start: self.source.projected(),
            control_start: Position::new(self.source.x, mid).projected(),
            control_end: Position::new(self.target.x, mid).projected(),
            end: self.target.projected(),
        }
    }

    /// SVG path data for [`Segment::diagonal`].
    pub fn svg_path(&self) -> String {
        let d = self.diagonal();
        format!(
            "M{},{}C{},{} {},{} {},{}",
            d.start[0],
            d.start[1],
            d.control_start[0],
            d.control_start[1],
            d.control_end[0],
            d.control_end[1],
            d.end[0],
            d.end[1],
        )
    }
}

/// Control points of a link curve in screen order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagonal {
    pub start: [f32; 2],
    pub control_start: [f32; 2],
    pub control_end: [f32; 2],
    pub end: [f32; 2],
}

/// Animated visual properties of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appearance {
    pub radius: f32,
    pub label_opacity: f32,
}

impl Appearance {
    /// Effectively invisible; the start of an enter and the end of an exit.
    /// Not zero so renderers never divide by it.
    pub const HIDDEN: Self = Self {
        radius: 1e-6,
        label_opacity: 1e-6,
    };

    /// Fully drawn at `radius`.
    pub fn visible(radius: f32) -> Self {
        Self {
            radius,
            label_opacity: 1.0,
        }
    }
}
