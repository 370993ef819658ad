use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::warn;

use crate::annotate::label::extract_accession_version;
use crate::annotate::pie::PieSegment;
use crate::metadata::{MetadataIndex, MetadataRecord};
use crate::render::TreeRenderer;

/// Fixed offset from the click point to the tooltip anchor.
pub const ANCHOR_OFFSET: (f32, f32) = (12.0, 12.0);

/// Estimated tooltip bounding box used for viewport clamping.
pub const TOOLTIP_SIZE: (f32, f32) = (300.0, 200.0);

/// Minimum distance kept between the tooltip box and the viewport edges
/// while not dragging.
pub const VIEWPORT_MARGIN: f32 = 10.0;

/// Grace period between a collapse toggle and the tooltip hiding, so the
/// collapse animation can start first.
pub const COLLAPSE_HIDE_DELAY: Duration = Duration::from_millis(300);

/// What the session currently inspects.
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipTarget {
    Leaf {
        id: String,
        /// Matched metadata record, or `None` when the accession has no row.
        record: Option<MetadataRecord>,
    },
    Internal {
        node_id: String,
        /// Locally cached collapse state, flipped optimistically on toggle.
        collapsed: bool,
        /// Descendant summary when a colouring field is active.
        segments: Vec<PieSegment>,
    },
}

/// Transient tooltip state machine: Hidden -> Visible(static) <->
/// Visible(dragging) -> Hidden. Created on node click, destroyed on close,
/// background click, replacement, or topology invalidation.
#[derive(Debug, Clone, Default)]
pub struct TooltipSession {
    target: Option<TooltipTarget>,
    base: (f32, f32),
    drag_offset: (f32, f32),
    drag_start: Option<(f32, f32)>,
    hide_at: Option<Instant>,
}

impl TooltipSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hidden -> Visible(static) for a clicked leaf. Resolves and stores the
    /// matched metadata record up front.
    pub fn show_leaf(&mut self, id: &str, click: (f32, f32), index: &MetadataIndex) {
        let accession = extract_accession_version(id);
        let record = index.lookup(accession).cloned();
        self.show(
            TooltipTarget::Leaf {
                id: id.to_string(),
                record,
            },
            click,
        );
    }

    /// Hidden -> Visible(static) for a clicked internal node. `segments` is
    /// empty when no colouring field is active or the aggregate had no data.
    pub fn show_internal(
        &mut self,
        node_id: &str,
        click: (f32, f32),
        collapsed: bool,
        segments: Vec<PieSegment>,
    ) {
        self.show(
            TooltipTarget::Internal {
                node_id: node_id.to_string(),
                collapsed,
                segments,
            },
            click,
        );
    }

    fn show(&mut self, target: TooltipTarget, click: (f32, f32)) {
        self.target = Some(target);
        self.base = (click.0 + ANCHOR_OFFSET.0, click.1 + ANCHOR_OFFSET.1);
        self.drag_offset = (0.0, 0.0);
        self.drag_start = None;
        self.hide_at = None;
    }

    /// Explicit close or background click: any state -> Hidden.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn visible(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&TooltipTarget> {
        self.target.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    /// Visible(static) -> Visible(dragging): pointer-down on the header.
    pub fn begin_drag(&mut self, pointer: (f32, f32)) {
        if self.visible() {
            self.drag_start = Some(pointer);
        }
    }

    /// Pointer motion while dragging; ignored otherwise.
    pub fn drag_to(&mut self, pointer: (f32, f32)) {
        if let Some(start) = self.drag_start {
            self.drag_offset = (pointer.0 - start.0, pointer.1 - start.1);
        }
    }

    /// Visible(dragging) -> Visible(static): the accumulated offset folds
    /// into the base position and resets.
    pub fn end_drag(&mut self) {
        if self.drag_start.take().is_some() {
            self.base = (
                self.base.0 + self.drag_offset.0,
                self.base.1 + self.drag_offset.1,
            );
            self.drag_offset = (0.0, 0.0);
        }
    }

    /// Effective display position. While dragging the raw offset position is
    /// returned unclamped; at rest the estimated bounding box is clamped
    /// fully inside the viewport with [`VIEWPORT_MARGIN`] on all sides.
    pub fn position(&self, viewport: (f32, f32)) -> (f32, f32) {
        if self.is_dragging() {
            return (
                self.base.0 + self.drag_offset.0,
                self.base.1 + self.drag_offset.1,
            );
        }

        let max_x = (viewport.0 - VIEWPORT_MARGIN - TOOLTIP_SIZE.0).max(VIEWPORT_MARGIN);
        let max_y = (viewport.1 - VIEWPORT_MARGIN - TOOLTIP_SIZE.1).max(VIEWPORT_MARGIN);
        (
            self.base.0.clamp(VIEWPORT_MARGIN, max_x),
            self.base.1.clamp(VIEWPORT_MARGIN, max_y),
        )
    }

    /// Collapse-toggle action on the inspected internal node: delegates to
    /// the renderer, flips the cached flag optimistically, and schedules the
    /// tooltip to hide after [`COLLAPSE_HIDE_DELAY`].
    pub fn toggle_collapse(&mut self, renderer: &mut dyn TreeRenderer, now: Instant) {
        if let Some(TooltipTarget::Internal {
            node_id, collapsed, ..
        }) = self.target.as_mut()
        {
            if let Err(err) = renderer.collapse_node(node_id) {
                warn!("collapse toggle failed for node {node_id}: {err}");
            }
            *collapsed = !*collapsed;
            self.hide_at = Some(now + COLLAPSE_HIDE_DELAY);
        }
    }

    /// Advance scheduled transitions; hides the session once a pending hide
    /// deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.hide_at {
            if now >= deadline {
                self.close();
            }
        }
    }

    /// Topology-change invalidation: hide unless the session targets a leaf
    /// whose id is still present. Internal handles have no stable identity
    /// across topologies, so internal-node sessions always hide.
    pub fn retain_nodes(&mut self, leaf_ids: &HashSet<String>) {
        let stale = match &self.target {
            Some(TooltipTarget::Leaf { id, .. }) => !leaf_ids.contains(id),
            Some(TooltipTarget::Internal { .. }) => true,
            None => false,
        };
        if stale {
            self.close();
        }
    }
}
