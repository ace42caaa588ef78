//! TreeEngine - the per-visual session.
//!
//! Owns everything that outlives a single call: the current hierarchy, the
//! render id table, visibility state, the committed rendered set and the hit
//! test index. Every entry point runs to completion synchronously; a pass
//! either fully succeeds or leaves the session untouched.

use std::collections::HashMap;

use log::{debug, warn};

use crate::config::{TreeConfig, Viewport};
use crate::error::StructuralError;
use crate::hierarchy::{Columns, Hierarchy, NodeIndex, RenderId, RenderIds};
use crate::layout::TidyTreeLayout;
use crate::render::{
    Position, Reconciler, RenderPass, RenderedSet, TransitionSource, VisibilityState, VisibleNode,
    VisibleTree,
};
use crate::spatial::SpatialIndex;

/// The tree visual's engine.
///
/// This struct manages:
/// - The stratified hierarchy, rebuilt on every data update
/// - Stable render ids keyed by identifier
/// - Expanded/collapsed state keyed by render id
/// - The committed rendered set and its spatial index
pub struct TreeEngine {
    config: TreeConfig,
    layout: TidyTreeLayout,
    reconciler: Reconciler,

    /// Last successfully stratified tree.
    hierarchy: Option<Hierarchy>,

    /// Identifier → render id, never reusing an id.
    ids: RenderIds,

    /// Render ids of the current hierarchy's nodes.
    render_id_of: HashMap<NodeIndex, RenderId>,

    /// Reverse of `render_id_of`.
    index_of: HashMap<RenderId, NodeIndex>,

    visibility: VisibilityState,
    rendered: RenderedSet,

    /// Hit testing over committed positions.
    spatial: SpatialIndex,

    /// Inner drawing area of the last accepted update.
    area: Option<Viewport>,
}

impl TreeEngine {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            layout: TidyTreeLayout::new(config.tidy_tree()),
            reconciler: Reconciler::new(config.node_radius, config.duration_ms),
            config,
            hierarchy: None,
            ids: RenderIds::new(),
            render_id_of: HashMap::new(),
            index_of: HashMap::new(),
            visibility: VisibilityState::new(),
            rendered: RenderedSet::new(),
            spatial: SpatialIndex::new(),
            area: None,
        }
    }

    /// Rebuild the tree from new data and reconcile from the root.
    ///
    /// Returns `Ok(None)` when the viewport leaves no room to draw. On a
    /// structural error the previous tree and rendered set are kept.
    pub fn update(
        &mut self,
        columns: Columns,
        viewport: Viewport,
    ) -> Result<Option<RenderPass>, StructuralError> {
        let area = viewport.inner(&self.config.margin);
        if !area.is_drawable() {
            debug!(
                "skipping update: no drawable area in {}x{} viewport",
                viewport.width, viewport.height
            );
            return Ok(None);
        }

        let hierarchy = columns
            .into_records()
            .and_then(|records| Hierarchy::stratify(&records))
            .inspect_err(|err| warn!("rejecting tree data: {err}"))?;

        self.adopt(hierarchy);
        self.area = Some(area);

        // Fresh data grows out of the left-center of the canvas.
        let anchor = Position::new(area.height / 2.0, 0.0);
        let Some(root) = self.root_id() else {
            return Ok(None);
        };
        Ok(self.run_pass(root, anchor))
    }

    /// Toggle a node's children and reconcile from that node.
    ///
    /// Unknown ids, nodes that are not on screen and leaves are ignored.
    pub fn click(&mut self, id: RenderId) -> Option<RenderPass> {
        let Some(previous) = self.rendered.position_of(id) else {
            debug!("ignoring click on {id}: not rendered");
            return None;
        };
        let hierarchy = self.hierarchy.as_ref()?;
        let index = *self.index_of.get(&id)?;
        if !hierarchy.node(index).has_children() {
            debug!("ignoring click on {id}: no children");
            return None;
        }

        let expanded = self.visibility.toggle(id);
        debug!("{id} {}", if expanded { "expanded" } else { "collapsed" });
        self.run_pass(id, previous)
    }

    /// Hit test at a layout-space point and click whatever is there.
    pub fn click_at(&mut self, x: f32, y: f32) -> Option<RenderPass> {
        let id = self.node_at(x, y)?;
        self.click(id)
    }

    /// The rendered node within one node radius of a layout-space point.
    pub fn node_at(&self, x: f32, y: f32) -> Option<RenderId> {
        self.spatial.nearest_within(x, y, self.config.node_radius)
    }

    /// Render id currently assigned to `identifier`.
    pub fn render_id_of(&self, identifier: &str) -> Option<RenderId> {
        self.ids.get(identifier)
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchy.as_ref()
    }

    pub fn visibility(&self) -> &VisibilityState {
        &self.visibility
    }

    pub fn rendered(&self) -> &RenderedSet {
        &self.rendered
    }

    /// Number of nodes in the data, visible or not.
    pub fn node_count(&self) -> usize {
        self.hierarchy.as_ref().map_or(0, Hierarchy::len)
    }

    /// Tear the session down to its initial state.
    pub fn clear(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Install a freshly stratified tree, carrying ids and visibility over.
    fn adopt(&mut self, hierarchy: Hierarchy) {
        self.ids.retain(|identifier| hierarchy.contains(identifier));

        self.render_id_of.clear();
        self.index_of.clear();
        for index in hierarchy.preorder() {
            let id = self.ids.assign(&hierarchy.node(index).identifier);
            self.render_id_of.insert(index, id);
            self.index_of.insert(id, index);
        }

        let index_of = &self.index_of;
        self.visibility.retain(|id| {
            index_of
                .get(&id)
                .is_some_and(|&index| hierarchy.node(index).has_children())
        });

        self.hierarchy = Some(hierarchy);
    }

    fn root_id(&self) -> Option<RenderId> {
        let hierarchy = self.hierarchy.as_ref()?;
        self.render_id_of.get(&hierarchy.root()).copied()
    }

    /// Lay out the visible tree, reconcile it against the rendered set and
    /// commit.
    fn run_pass(&mut self, source: RenderId, previous: Position) -> Option<RenderPass> {
        let hierarchy = self.hierarchy.as_ref()?;
        let area = self.area?;

        let render_id_of = &self.render_id_of;
        let visibility = &self.visibility;
        let layout = self.layout.compute(hierarchy, area.height, |index| {
            render_id_of
                .get(&index)
                .is_none_or(|&id| visibility.is_expanded(id))
        });

        let nodes = layout
            .nodes()
            .iter()
            .filter_map(|placed| {
                let id = *render_id_of.get(&placed.node)?;
                let node = hierarchy.node(placed.node);
                let expandable = node.has_children();
                Some(VisibleNode {
                    id,
                    parent: placed.parent.and_then(|p| render_id_of.get(&p).copied()),
                    label: node.identifier.clone(),
                    value: node.value,
                    position: placed.position,
                    expandable,
                    collapsed: expandable && visibility.is_collapsed(id),
                })
            })
            .collect();
        let visible = VisibleTree::new(nodes);

        let source = TransitionSource {
            id: source,
            previous,
            current: visible.position_of(source).unwrap_or(previous),
        };
        let pass = self
            .reconciler
            .reconcile(&mut self.rendered, &visible, &source);

        self.spatial.rebuild(
            self.rendered
                .nodes()
                .map(|n| (n.id, n.position.x, n.position.y)),
        );

        debug!(
            "pass from {}: {} entering, {} updating, {} exiting",
            pass.source,
            pass.enter.nodes.len(),
            pass.update.nodes.len(),
            pass.exit.nodes.len()
        );
        Some(pass)
    }
}

impl Default for TreeEngine {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}
