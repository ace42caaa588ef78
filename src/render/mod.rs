//! Render-side state: geometry, visibility, the committed rendered set and
//! the enter/update/exit reconciler.
//!
//! Nothing here draws. The output of a pass is a [`RenderPass`] describing
//! start and end states; a host animates between them.

pub mod geometry;
pub mod reconcile;
pub mod rendered;
pub mod visibility;

pub use geometry::{Appearance, Diagonal, Position, Segment};
pub use reconcile::{
    LinkTransition, NodeTransition, Reconciler, RenderPass, TransitionSet, TransitionSource,
};
pub use rendered::{RenderedLink, RenderedSet, VisibleNode, VisibleTree};
pub use visibility::VisibilityState;
