//! Collapsible Tree - WASM Module
//!
//! This module provides the engine behind an animated collapsible tree
//! visual. The host hands over a flat parent/child table; the engine rebuilds
//! the tree, lays it out and tells the renderer which elements enter, move
//! and exit on every pass. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `hierarchy`: Edge table to validated tree, stable render ids
//! - `layout`: Tidy tree layout over the visible nodes
//! - `render`: Geometry, visibility state and the enter/update/exit reconciler
//! - `spatial`: R-tree spatial indexing for click hit testing
//! - `engine`: The per-visual session tying the above together

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod render;
pub mod spatial;

pub use config::{Margin, TreeConfig, Viewport};
pub use engine::TreeEngine;
pub use error::{ConfigError, StructuralError};

use hierarchy::{Columns, RenderId};
use render::{Position, RenderPass, Segment};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// SVG path data for a link between two layout-space points.
///
/// Lets renderers redraw a link at every animation frame from interpolated
/// endpoints.
#[wasm_bindgen(js_name = diagonalPath)]
pub fn diagonal_path(source_x: f32, source_y: f32, target_x: f32, target_y: f32) -> String {
    Segment::new(
        Position::new(source_x, source_y),
        Position::new(target_x, target_y),
    )
    .svg_path()
}

/// Main entry point for the tree visual.
///
/// This struct wraps the internal TreeEngine and provides the public API
/// exposed to JavaScript. Render passes come back as plain objects with
/// camelCase fields, or `undefined` when nothing needs to change.
#[wasm_bindgen]
pub struct CollapsibleTreeWasm {
    engine: TreeEngine,
}

#[wasm_bindgen]
impl CollapsibleTreeWasm {
    /// Create a new tree visual.
    ///
    /// `config` is an optional object with any of the [`TreeConfig`] fields.
    /// Throws when a spacing or separation is not positive.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CollapsibleTreeWasm, JsError> {
        let config = if config.is_undefined() || config.is_null() {
            TreeConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config.validate()?;
        Ok(Self {
            engine: TreeEngine::new(config),
        })
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replace the data and reconcile from the root.
    ///
    /// # Arguments
    ///
    /// * `parents` - Parent identifiers; `null` or `""` marks the root row
    /// * `children` - Child identifiers, one per row
    /// * `values` - Row values
    /// * `width`, `height` - Current viewport size
    ///
    /// Throws on malformed tables. Returns `undefined` when the viewport is
    /// too small to draw into.
    pub fn update(
        &mut self,
        parents: JsValue,
        children: Vec<String>,
        values: Vec<f64>,
        width: f32,
        height: f32,
    ) -> Result<JsValue, JsError> {
        let columns = Columns {
            parents: serde_wasm_bindgen::from_value(parents)?,
            children,
            values,
        };
        let pass = self.engine.update(columns, Viewport::new(width, height))?;
        to_js(pass)
    }

    /// Number of nodes in the data, visible or not.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.engine.node_count() as u32
    }

    /// Render id of a data identifier.
    #[wasm_bindgen(js_name = renderIdOf)]
    pub fn render_id_of(&self, identifier: &str) -> Option<u32> {
        self.engine.render_id_of(identifier).map(RenderId::raw)
    }

    /// Drop all state, as if the visual were recreated.
    pub fn clear(&mut self) {
        self.engine.clear();
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Toggle a node by render id.
    ///
    /// Returns `undefined` for leaves and for ids no longer on screen.
    pub fn click(&mut self, render_id: u32) -> Result<JsValue, JsError> {
        to_js(self.engine.click(RenderId(render_id)))
    }

    /// Toggle whatever node lies under a point of the drawing surface.
    #[wasm_bindgen(js_name = clickAt)]
    pub fn click_at(&mut self, x: f32, y: f32) -> Result<JsValue, JsError> {
        let p = self.to_layout(x, y);
        to_js(self.engine.click_at(p.x, p.y))
    }

    /// Render id of the node under a point of the drawing surface.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f32, y: f32) -> Option<u32> {
        let p = self.to_layout(x, y);
        self.engine.node_at(p.x, p.y).map(RenderId::raw)
    }

    // =========================================================================
    // Committed State
    // =========================================================================

    /// Render ids on screen once the last pass finishes, ascending.
    #[wasm_bindgen(js_name = renderedIds)]
    pub fn rendered_ids(&self) -> Vec<u32> {
        self.engine.rendered().ids().map(RenderId::raw).collect()
    }

    /// Committed screen positions `[h0, v0, h1, v1, ...]` in `renderedIds`
    /// order, relative to the margin-translated container.
    #[wasm_bindgen(js_name = committedPositions)]
    pub fn committed_positions(&self) -> Float32Array {
        let positions: Vec<f32> = self
            .engine
            .rendered()
            .nodes()
            .flat_map(|n| n.position.projected())
            .collect();
        Float32Array::from(&positions[..])
    }
}

impl CollapsibleTreeWasm {
    /// Surface coordinates to layout space.
    fn to_layout(&self, x: f32, y: f32) -> Position {
        let margin = &self.engine.config().margin;
        Position::from_screen(x - margin.left, y - margin.top)
    }
}

fn to_js(pass: Option<RenderPass>) -> Result<JsValue, JsError> {
    match pass {
        Some(pass) => Ok(serde_wasm_bindgen::to_value(&pass)?),
        None => Ok(JsValue::UNDEFINED),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::hierarchy::{EdgeRecord, Hierarchy};
    use crate::render::Appearance;

    fn org_chart() -> Columns {
        let rows = [
            (None, "CEO", 1.0),
            (Some("CEO"), "CTO", 2.0),
            (Some("CEO"), "CFO", 3.0),
            (Some("CTO"), "Platform", 4.0),
            (Some("CTO"), "Product", 5.0),
            (Some("Platform"), "Infra", 6.0),
            (Some("Platform"), "Tooling", 7.0),
            (Some("CFO"), "Accounting", 8.0),
        ];
        let records: Vec<_> = rows
            .iter()
            .map(|&(parent, child, value)| EdgeRecord::new(parent, child, value))
            .collect();
        Columns::from(&records[..])
    }

    /// Test the full pipeline: columns → tree → layout → reconcile → hit test,
    /// without wasm_bindgen JS types.
    #[test]
    fn test_full_pipeline() {
        let mut engine = TreeEngine::default();
        let pass = engine
            .update(org_chart(), Viewport::new(640.0, 440.0))
            .unwrap()
            .unwrap();

        assert_eq!(pass.enter.nodes.len(), 8);
        assert_eq!(pass.enter.links.len(), 7);
        for n in &pass.enter.nodes {
            assert!(
                n.to.x >= 0.0 && n.to.x <= 400.0,
                "{} out of bounds: {:?}",
                n.label,
                n.to
            );
            assert_eq!(n.from, Position::new(200.0, 0.0));
        }

        let infra = engine
            .rendered()
            .node(engine.render_id_of("Infra").unwrap())
            .unwrap();
        assert_eq!(infra.position.y, 3.0 * 180.0);
        assert!(!infra.expandable);

        // Collapse CTO by clicking where it is drawn.
        let cto = engine.render_id_of("CTO").unwrap();
        let at = engine.rendered().position_of(cto).unwrap();
        let pass = engine.click_at(at.x + 2.0, at.y - 2.0).unwrap();

        assert_eq!(pass.source, cto);
        let exiting: Vec<_> = pass.exit.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(exiting, ["Platform", "Infra", "Tooling", "Product"]);
        assert_eq!(pass.exit.links.len(), 4);
        let cto_now = engine.rendered().position_of(cto).unwrap();
        assert!(pass.exit.nodes.iter().all(|n| n.to == cto_now));
        assert_eq!(engine.rendered().len(), 4);

        // The rest of the tree re-centres but nothing else appears or leaves.
        assert!(pass.enter.is_empty());
        assert_eq!(pass.update.nodes.len(), 4);
    }

    #[test]
    fn test_nested_collapse_remembers_inner_state() {
        let mut engine = TreeEngine::default();
        let viewport = Viewport::new(640.0, 440.0);
        engine.update(org_chart(), viewport).unwrap();

        let platform = engine.render_id_of("Platform").unwrap();
        let cto = engine.render_id_of("CTO").unwrap();
        engine.click(platform).unwrap();
        engine.click(cto).unwrap();

        // Re-expanding CTO brings Platform back still collapsed.
        let pass = engine.click(cto).unwrap();
        let entering: Vec<_> = pass.enter.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(entering, ["Platform", "Product"]);
        assert!(pass.enter.node(platform).unwrap().collapsed);
        assert_eq!(pass.enter.nodes[0].from_appearance, Appearance::HIDDEN);
    }

    #[test]
    fn test_links_render_as_diagonals() {
        let mut engine = TreeEngine::default();
        let pass = engine
            .update(org_chart(), Viewport::new(640.0, 440.0))
            .unwrap()
            .unwrap();

        for link in &pass.enter.links {
            assert!(link.from.is_collapsed());
            let d = link.to.diagonal();
            assert_eq!(d.start, link.to.source.projected());
            assert_eq!(d.end, link.to.target.projected());
            assert_eq!(d.control_start[0], d.control_end[0]);
            assert!(link.to.svg_path().starts_with('M'));
        }
        assert_eq!(diagonal_path(50.0, 0.0, 25.0, 180.0), "M0,50C90,50 90,25 180,25");
    }

    #[test]
    fn test_structural_errors_surface() {
        let cycle = [
            EdgeRecord::new(None, "root", 0.0),
            EdgeRecord::new(Some("b"), "a", 0.0),
            EdgeRecord::new(Some("a"), "b", 0.0),
        ];
        assert!(matches!(
            Hierarchy::stratify(&cycle),
            Err(StructuralError::Cycle { .. })
        ));

        let mut engine = TreeEngine::default();
        let err = engine
            .update(Columns::from(&cycle[..]), Viewport::new(640.0, 440.0))
            .unwrap_err();
        assert!(err.to_string().contains("cyclic"));
        assert!(engine.rendered().is_empty());
    }

    #[test]
    fn test_custom_config() {
        let config = TreeConfig {
            depth_spacing: 100.0,
            margin: Margin {
                top: 0.0,
                right: 0.0,
                bottom: 0.0,
                left: 0.0,
            },
            duration_ms: 300,
            ..TreeConfig::default()
        };
        let mut engine = TreeEngine::new(config);
        let pass = engine
            .update(org_chart(), Viewport::new(400.0, 400.0))
            .unwrap()
            .unwrap();

        assert_eq!(pass.duration_ms, 300);
        assert_eq!(pass.enter.nodes[0].from, Position::new(200.0, 0.0));
        let product = engine.render_id_of("Product").unwrap();
        assert_eq!(engine.rendered().position_of(product).unwrap().y, 200.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::hierarchy::{EdgeRecord, Hierarchy};
    use crate::layout::TidyTreeLayout;
    use proptest::prelude::*;
    use proptest::sample::Index;

    // -- Strategy helpers --

    /// A random valid tree: node `i > 0` hangs under some earlier node, rows
    /// shuffled so parents may appear after their children.
    fn arb_tree() -> impl Strategy<Value = Vec<EdgeRecord>> {
        (1usize..40)
            .prop_flat_map(|n| prop::collection::vec(any::<Index>(), n - 1))
            .prop_map(|parents| {
                let mut rows = vec![EdgeRecord::new(None, "n0", 0.0)];
                for (i, parent) in parents.iter().enumerate() {
                    let child = i + 1;
                    rows.push(EdgeRecord::new(
                        Some(&format!("n{}", parent.index(child))),
                        &format!("n{child}"),
                        child as f64,
                    ));
                }
                rows
            })
            .prop_shuffle()
    }

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn engine_with(rows: &[EdgeRecord]) -> TreeEngine {
        let mut engine = TreeEngine::default();
        engine
            .update(Columns::from(rows), viewport())
            .expect("valid tree")
            .expect("drawable viewport");
        engine
    }

    fn expandable(engine: &TreeEngine) -> Vec<RenderId> {
        engine
            .rendered()
            .nodes()
            .filter(|n| n.expandable)
            .map(|n| n.id)
            .collect()
    }

    proptest! {
        #[test]
        fn prop_stratify_keeps_every_row(rows in arb_tree()) {
            let tree = Hierarchy::stratify(&rows).unwrap();
            prop_assert_eq!(tree.len(), rows.len());
            prop_assert_eq!(tree.node(tree.root()).identifier.as_str(), "n0");
            prop_assert_eq!(tree.preorder().len(), rows.len());
        }

        #[test]
        fn prop_second_root_rejected(rows in arb_tree(), pick in any::<Index>()) {
            prop_assume!(rows.len() > 1);
            let mut rows = rows;
            let non_roots: Vec<usize> = (0..rows.len())
                .filter(|&i| rows[i].parent.is_some())
                .collect();
            rows[non_roots[pick.index(non_roots.len())]].parent = None;
            let is_multiple_roots = matches!(
                Hierarchy::stratify(&rows),
                Err(StructuralError::MultipleRoots { .. })
            );
            prop_assert!(is_multiple_roots);
        }

        #[test]
        fn prop_no_root_rejected(rows in arb_tree()) {
            prop_assume!(rows.len() > 1);
            let mut rows = rows;
            for row in rows.iter_mut().filter(|r| r.parent.is_none()) {
                row.parent = Some("n1".to_owned());
            }
            prop_assert!(Hierarchy::stratify(&rows).is_err());
        }

        #[test]
        fn prop_dangling_parent_rejected(rows in arb_tree(), pick in any::<Index>()) {
            prop_assume!(rows.len() > 1);
            let mut rows = rows;
            let non_roots: Vec<usize> = (0..rows.len())
                .filter(|&i| rows[i].parent.is_some())
                .collect();
            rows[non_roots[pick.index(non_roots.len())]].parent = Some("missing".to_owned());
            let is_missing_parent = matches!(
                Hierarchy::stratify(&rows),
                Err(StructuralError::MissingParent { .. })
            );
            prop_assert!(is_missing_parent);
        }

        #[test]
        fn prop_layout_deterministic(rows in arb_tree(), extent in 1.0f32..2000.0) {
            let tree = Hierarchy::stratify(&rows).unwrap();
            let layout = TidyTreeLayout::with_defaults();
            let first = layout.compute(&tree, extent, |_| true);
            let second = layout.compute(&tree, extent, |_| true);
            prop_assert_eq!(first.nodes(), second.nodes());
        }

        #[test]
        fn prop_reconcile_idempotent(rows in arb_tree()) {
            let mut engine = engine_with(&rows);
            let pass = engine
                .update(Columns::from(&rows[..]), viewport())
                .unwrap()
                .unwrap();
            prop_assert!(pass.enter.is_empty());
            prop_assert!(pass.exit.is_empty());
            prop_assert!(pass.update.nodes.iter().all(|n| n.from == n.to));
            prop_assert!(pass.update.links.iter().all(|l| l.from == l.to));
        }

        #[test]
        fn prop_toggle_round_trip(rows in arb_tree(), pick in any::<Index>()) {
            let mut engine = engine_with(&rows);
            let candidates = expandable(&engine);
            prop_assume!(!candidates.is_empty());
            let target = candidates[pick.index(candidates.len())];

            let visibility = engine.visibility().clone();
            let before: Vec<_> = engine.rendered().ids().collect();

            prop_assert!(engine.click(target).is_some());
            prop_assert!(engine.click(target).is_some());

            prop_assert_eq!(engine.visibility(), &visibility);
            prop_assert_eq!(engine.rendered().ids().collect::<Vec<_>>(), before);
        }

        #[test]
        fn prop_render_ids_stable(
            rows in arb_tree(),
            clicks in prop::collection::vec(any::<Index>(), 0..8),
        ) {
            let mut engine = engine_with(&rows);
            let assigned: Vec<_> = rows
                .iter()
                .map(|r| engine.render_id_of(&r.child).unwrap())
                .collect();

            for pick in clicks {
                let candidates = expandable(&engine);
                if candidates.is_empty() {
                    break;
                }
                engine.click(candidates[pick.index(candidates.len())]);
                engine.update(Columns::from(&rows[..]), viewport()).unwrap();
            }

            for (row, id) in rows.iter().zip(assigned) {
                prop_assert_eq!(engine.render_id_of(&row.child), Some(id));
            }
        }
    }
}
