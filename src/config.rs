//! Visual configuration.
//!
//! Every field has a default matching the classic collapsible tree, so hosts
//! only send what they want to change.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::TidyTreeConfig;

/// Space reserved around the drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 20.0,
            left: 20.0,
        }
    }
}

/// Size of the host drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The drawing area left once the margins are removed.
    pub fn inner(self, margin: &Margin) -> Self {
        Self {
            width: self.width - margin.left - margin.right,
            height: self.height - margin.top - margin.bottom,
        }
    }

    /// Whether anything can be laid out in this area.
    pub fn is_drawable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Configuration for one tree visual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeConfig {
    /// Distance between consecutive tree levels.
    pub depth_spacing: f32,
    /// Separation unit between nodes sharing a parent.
    pub sibling_separation: f32,
    /// Separation unit between neighbouring nodes with different parents.
    pub cousin_separation: f32,
    /// Margins subtracted from the viewport before layout.
    pub margin: Margin,
    /// Transition length handed to the renderer.
    pub duration_ms: u32,
    /// Radius of a fully visible node; also the click hit radius.
    pub node_radius: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            depth_spacing: 180.0,
            sibling_separation: 1.0,
            cousin_separation: 2.0,
            margin: Margin::default(),
            duration_ms: 750,
            node_radius: 10.0,
        }
    }
}

impl TreeConfig {
    /// Check values a host may have sent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("depthSpacing", self.depth_spacing),
            ("siblingSeparation", self.sibling_separation),
            ("cousinSeparation", self.cousin_separation),
        ];
        if let Some(&(field, value)) = positive
            .iter()
            .find(|(_, v)| !(v.is_finite() && *v > 0.0))
        {
            return Err(ConfigError::NotPositive { field, value });
        }

        let non_negative = [
            ("nodeRadius", self.node_radius),
            ("margin.top", self.margin.top),
            ("margin.right", self.margin.right),
            ("margin.bottom", self.margin.bottom),
            ("margin.left", self.margin.left),
        ];
        if let Some(&(field, value)) = non_negative
            .iter()
            .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
        {
            return Err(ConfigError::Negative { field, value });
        }
        Ok(())
    }

    /// Layout parameters derived from this configuration.
    pub fn tidy_tree(&self) -> TidyTreeConfig {
        TidyTreeConfig {
            sibling_separation: self.sibling_separation,
            cousin_separation: self.cousin_separation,
            depth_spacing: self.depth_spacing,
        }
    }
}
