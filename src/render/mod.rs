use std::collections::HashSet;

use thiserror::Error;

use crate::annotate::pie::descendant_leaves;
use crate::annotate::styles::StyleMap;
use crate::metadata::MetadataRecord;
use crate::tree::NodeRef;

/// Failures surfaced by a renderer adapter. The engine recovers from all of
/// them locally; see the scale-bar fallback in particular.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer has no tree loaded")]
    NotReady,
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("renderer backend failed: {0}")]
    Backend(String),
}

/// Narrow capability interface over the external rendering library. The
/// concrete adapter absorbs all existence-probing of the underlying
/// library's dynamic surface; the engine depends on this trait only.
pub trait TreeRenderer {
    /// Apply a per-node styling override map.
    fn set_styles(&mut self, styles: &StyleMap) -> Result<(), RendererError>;

    /// Enable or disable collapsed-node pie charts, supplying the metadata
    /// payload the renderer charts from.
    fn set_pie_charts(&mut self, enabled: bool, metadata: &[MetadataRecord])
        -> Result<(), RendererError>;

    /// Toggle the collapse state of a node.
    fn collapse_node(&mut self, node_id: &str) -> Result<(), RendererError>;

    /// Unit-to-pixel ratio of the current layout.
    fn branch_scale(&self) -> Result<f64, RendererError>;

    /// Zoom level as a base-2 exponent.
    fn zoom(&self) -> Result<f64, RendererError>;

    /// Leaves of the laid-out graph, in layout order.
    fn layout_leaves(&self) -> Result<Vec<NodeRef>, RendererError>;
}

/// Renderer stand-in used by the headless driver and tests: holds a tree,
/// records the last style map, and reports a fixed view state.
#[derive(Debug, Default)]
pub struct OfflineRenderer {
    root: Option<NodeRef>,
    branch_scale: f64,
    zoom: f64,
    styles: StyleMap,
    collapsed: HashSet<String>,
    pie_charts: bool,
}

impl OfflineRenderer {
    pub fn new(root: NodeRef, branch_scale: f64, zoom: f64) -> Self {
        Self {
            root: Some(root),
            branch_scale,
            zoom,
            styles: StyleMap::new(),
            collapsed: HashSet::new(),
            pie_charts: false,
        }
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    pub fn is_collapsed(&self, node_id: &str) -> bool {
        self.collapsed.contains(node_id)
    }

    pub fn pie_charts_enabled(&self) -> bool {
        self.pie_charts
    }

    fn contains_node(&self, node_id: &str) -> bool {
        fn walk(node: &NodeRef, target: &str) -> bool {
            node.id == target || node.children.iter().any(|child| walk(child, target))
        }
        self.root
            .as_ref()
            .map(|root| walk(root, node_id))
            .unwrap_or(false)
    }
}

impl TreeRenderer for OfflineRenderer {
    fn set_styles(&mut self, styles: &StyleMap) -> Result<(), RendererError> {
        self.styles = styles.clone();
        Ok(())
    }

    fn set_pie_charts(
        &mut self,
        enabled: bool,
        _metadata: &[MetadataRecord],
    ) -> Result<(), RendererError> {
        self.pie_charts = enabled;
        Ok(())
    }

    fn collapse_node(&mut self, node_id: &str) -> Result<(), RendererError> {
        if !self.contains_node(node_id) {
            return Err(RendererError::UnknownNode(node_id.to_string()));
        }
        if !self.collapsed.remove(node_id) {
            self.collapsed.insert(node_id.to_string());
        }
        Ok(())
    }

    fn branch_scale(&self) -> Result<f64, RendererError> {
        if self.root.is_none() {
            return Err(RendererError::NotReady);
        }
        Ok(self.branch_scale)
    }

    fn zoom(&self) -> Result<f64, RendererError> {
        if self.root.is_none() {
            return Err(RendererError::NotReady);
        }
        Ok(self.zoom)
    }

    fn layout_leaves(&self) -> Result<Vec<NodeRef>, RendererError> {
        let root = self.root.as_ref().ok_or(RendererError::NotReady)?;
        Ok(descendant_leaves(root).into_iter().cloned().collect())
    }
}
