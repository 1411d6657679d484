// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Change notification for rendering hosts.
//!
//! Every committed edit produces a minimal delta naming the nodes, connections
//! and viewport that changed, so a host can redraw incrementally instead of
//! polling the whole diagram.

use std::collections::BTreeSet;

use crate::model::{Connection, ConnectionId, GraphModel, NodeId, RemovedNode};
use crate::viewport::Viewport;

/// One addressable thing a host may need to redraw.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeRef {
    Node(NodeId),
    Connection(ConnectionId),
    Viewport,
}

/// Minimal delta describing which objects changed.
///
/// This is intentionally coarse: it reports only added/removed/updated refs,
/// sorted nodes first, then connections, then the viewport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ChangeRef>,
    pub removed: Vec<ChangeRef>,
    pub updated: Vec<ChangeRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    pub fn viewport_changed(&self) -> bool {
        self.updated.contains(&ChangeRef::Viewport)
    }
}

#[derive(Debug, Default, Clone)]
pub struct DeltaBuilder {
    added: BTreeSet<ChangeRef>,
    removed: BTreeSet<ChangeRef>,
    updated: BTreeSet<ChangeRef>,
}

impl DeltaBuilder {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    pub fn record_added(&mut self, change: ChangeRef) {
        self.removed.remove(&change);
        self.updated.remove(&change);
        self.added.insert(change);
    }

    pub fn record_removed(&mut self, change: ChangeRef) {
        self.added.remove(&change);
        self.updated.remove(&change);
        self.removed.insert(change);
    }

    pub fn record_updated(&mut self, change: ChangeRef) {
        if self.added.contains(&change) || self.removed.contains(&change) {
            return;
        }
        self.updated.insert(change);
    }

    /// A node moved or resized: the node and every link drawn from it.
    pub fn record_node_geometry(&mut self, graph: &GraphModel, node_id: &NodeId) {
        self.record_updated(ChangeRef::Node(node_id.clone()));
        for connection_id in graph.incident_connections(node_id) {
            self.record_updated(ChangeRef::Connection(connection_id.clone()));
        }
    }

    pub fn record_node_removed(&mut self, removed: &RemovedNode) {
        self.record_removed(ChangeRef::Node(removed.node_id.clone()));
        for (connection_id, _) in &removed.connections {
            self.record_removed(ChangeRef::Connection(connection_id.clone()));
        }
    }

    /// Records everything that differs between two graph states.
    ///
    /// Used when contents are swapped wholesale (undo, redo, load).
    pub fn record_graph_diff(&mut self, before: &GraphModel, after: &GraphModel) {
        for (node_id, node) in before.nodes() {
            match after.node(node_id) {
                None => self.record_removed(ChangeRef::Node(node_id.clone())),
                Some(next) if next != node => self.record_updated(ChangeRef::Node(node_id.clone())),
                Some(_) => {}
            }
        }
        for node_id in after.nodes().keys() {
            if !before.contains_node(node_id) {
                self.record_added(ChangeRef::Node(node_id.clone()));
            }
        }

        for (connection_id, connection) in before.connections() {
            let change = ChangeRef::Connection(connection_id.clone());
            match after.connection(connection_id) {
                None => self.record_removed(change),
                Some(next) if next != connection || endpoints_moved(before, after, next) => {
                    self.record_updated(change)
                }
                Some(_) => {}
            }
        }
        for connection_id in after.connections().keys() {
            if before.connection(connection_id).is_none() {
                self.record_added(ChangeRef::Connection(connection_id.clone()));
            }
        }
    }

    pub fn record_viewport_diff(&mut self, before: &Viewport, after: &Viewport) {
        if before != after {
            self.record_updated(ChangeRef::Viewport);
        }
    }

    /// Drains the accumulated changes, leaving the builder empty.
    pub fn take(&mut self) -> Delta {
        std::mem::take(self).finish()
    }

    pub fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

fn endpoints_moved(before: &GraphModel, after: &GraphModel, connection: &Connection) -> bool {
    [connection.source(), connection.target()].into_iter().any(|endpoint| {
        match (before.node(endpoint), after.node(endpoint)) {
            (Some(a), Some(b)) => a.position() != b.position() || a.size() != b.size(),
            _ => true,
        }
    })
}
