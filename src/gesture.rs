// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pointer gesture state machine: drag a node, pan the canvas, pinch to zoom.
//!
//! Every transition is a synchronous update driven by one input event. The
//! controller mutates the graph and viewport it is handed, but never touches
//! history; it reports `Completed` once per finished gesture and the owner
//! decides whether to snapshot.

use smallvec::SmallVec;

use crate::model::{GraphModel, NodeId, Point};
use crate::viewport::Viewport;

/// Pinches that start with the fingers closer than this never zoom.
const MIN_PINCH_DISTANCE: f64 = 1e-6;

pub type PointerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    DragNode,
    PanCanvas,
    PinchZoom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    /// `grab_offset` is the pointer position minus the node's top-left corner,
    /// in screen units at the time of the press.
    DraggingNode { node_id: NodeId, grab_offset: Point },
    PanningCanvas { last: Point },
    PinchZooming { start_distance: f64, start_zoom: f64 },
}

impl GestureState {
    pub fn kind(&self) -> Option<GestureKind> {
        match self {
            Self::Idle => None,
            Self::DraggingNode { .. } => Some(GestureKind::DragNode),
            Self::PanningCanvas { .. } => Some(GestureKind::PanCanvas),
            Self::PinchZooming { .. } => Some(GestureKind::PinchZoom),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// The event did not belong to an active gesture (stale pointer, extra finger).
    Ignored,
    Started(GestureKind),
    NodeMoved(NodeId),
    Panned,
    Zoomed,
    /// The gesture ended normally. `changed` says whether it mutated anything.
    Completed { kind: GestureKind, changed: bool },
    /// Aborted; whatever was already applied stays applied.
    Cancelled(GestureKind),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActivePointer {
    id: PointerId,
    position: Point,
}

#[derive(Debug, Clone)]
pub struct GestureController {
    state: GestureState,
    pointers: SmallVec<[ActivePointer; 2]>,
    changed: bool,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureController {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            pointers: SmallVec::new(),
            changed: false,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !self.state.is_idle()
    }

    /// The node currently being dragged, if any.
    pub fn dragged_node(&self) -> Option<&NodeId> {
        match &self.state {
            GestureState::DraggingNode { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        screen: Point,
        graph: &GraphModel,
        viewport: &Viewport,
    ) -> GestureOutcome {
        if let Some(active) = self.pointers.iter_mut().find(|p| p.id == pointer) {
            active.position = screen;
            return GestureOutcome::Ignored;
        }
        if self.pointers.len() >= 2 {
            return GestureOutcome::Ignored;
        }
        self.pointers.push(ActivePointer {
            id: pointer,
            position: screen,
        });

        if self.pointers.len() == 2 {
            let start_distance = self.pointers[0].position.distance_to(self.pointers[1].position);
            self.state = GestureState::PinchZooming {
                start_distance,
                start_zoom: viewport.zoom(),
            };
            tracing::debug!(start_distance, start_zoom = viewport.zoom(), "gesture: pinch start");
            return GestureOutcome::Started(GestureKind::PinchZoom);
        }

        self.changed = false;
        let logical = viewport.to_logical(screen);
        let hit = graph
            .node_at(logical)
            .and_then(|node_id| graph.node(node_id).map(|node| (node_id, node)));
        self.state = match hit {
            Some((node_id, node)) => {
                let grab_offset = screen - viewport.to_screen(node.position());
                tracing::debug!(node_id = %node_id, "gesture: drag start");
                GestureState::DraggingNode {
                    node_id: node_id.clone(),
                    grab_offset,
                }
            }
            None => {
                tracing::debug!(x = screen.x, y = screen.y, "gesture: pan start");
                GestureState::PanningCanvas { last: screen }
            }
        };
        match self.state.kind() {
            Some(kind) => GestureOutcome::Started(kind),
            None => GestureOutcome::Ignored,
        }
    }

    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        screen: Point,
        graph: &mut GraphModel,
        viewport: &mut Viewport,
    ) -> GestureOutcome {
        let Some(active) = self.pointers.iter_mut().find(|p| p.id == pointer) else {
            return GestureOutcome::Ignored;
        };
        active.position = screen;

        match &mut self.state {
            GestureState::Idle => GestureOutcome::Ignored,
            GestureState::DraggingNode {
                node_id,
                grab_offset,
            } => {
                let position = viewport.to_logical(screen - *grab_offset);
                let Some(node) = graph.node(node_id) else {
                    return GestureOutcome::Ignored;
                };
                if node.position() == position {
                    return GestureOutcome::Ignored;
                }
                graph.update_node_position(node_id, position);
                self.changed = true;
                GestureOutcome::NodeMoved(node_id.clone())
            }
            GestureState::PanningCanvas { last } => {
                let delta = screen - *last;
                *last = screen;
                if viewport.pan_by(delta) {
                    self.changed = true;
                    GestureOutcome::Panned
                } else {
                    GestureOutcome::Ignored
                }
            }
            GestureState::PinchZooming {
                start_distance,
                start_zoom,
            } => {
                if self.pointers.len() < 2 || *start_distance < MIN_PINCH_DISTANCE {
                    return GestureOutcome::Ignored;
                }
                let (a, b) = (self.pointers[0].position, self.pointers[1].position);
                let scale = a.distance_to(b) / *start_distance;
                if viewport.set_zoom(*start_zoom * scale, Some(a.midpoint(b))) {
                    self.changed = true;
                    GestureOutcome::Zoomed
                } else {
                    GestureOutcome::Ignored
                }
            }
        }
    }

    /// Ends the gesture on the first lifted pointer.
    ///
    /// Fingers still down are forgotten, so their later moves are ignored.
    pub fn pointer_up(&mut self, pointer: PointerId) -> GestureOutcome {
        let Some(index) = self.pointers.iter().position(|p| p.id == pointer) else {
            return GestureOutcome::Ignored;
        };
        self.pointers.remove(index);

        let Some(kind) = self.state.kind() else {
            return GestureOutcome::Ignored;
        };
        let changed = std::mem::take(&mut self.changed);
        self.reset();
        tracing::debug!(?kind, changed, "gesture: complete");
        GestureOutcome::Completed { kind, changed }
    }

    /// Back to idle without completing. Nothing already applied is undone.
    pub fn cancel(&mut self) -> GestureOutcome {
        let kind = self.state.kind();
        self.reset();
        self.changed = false;
        match kind {
            Some(kind) => {
                tracing::debug!(?kind, "gesture: cancelled");
                GestureOutcome::Cancelled(kind)
            }
            None => GestureOutcome::Ignored,
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.pointers.clear();
    }
}
