// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Snapshot-based undo/redo.
//!
//! The manager keeps a sliding window of deep copies. `index` always points at
//! the snapshot that matches the live diagram; undo and redo move it and hand
//! back the snapshot to restore.

use std::collections::{BTreeMap, VecDeque};

use crate::model::{Connection, ConnectionId, Diagram, Node, NodeId};
use crate::viewport::Viewport;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// An owned copy of nodes, connections and viewport.
///
/// Nothing in a snapshot aliases the live graph, so later edits cannot reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    nodes: BTreeMap<NodeId, Node>,
    connections: BTreeMap<ConnectionId, Connection>,
    viewport: Viewport,
}

impl Snapshot {
    pub fn capture(diagram: &Diagram) -> Self {
        Self {
            nodes: diagram.graph().nodes().clone(),
            connections: diagram.graph().connections().clone(),
            viewport: *diagram.viewport(),
        }
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn connections(&self) -> &BTreeMap<ConnectionId, Connection> {
        &self.connections
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Full replace of the live contents. Ids come from the snapshot unchanged.
    pub fn restore(&self, diagram: &mut Diagram) {
        diagram
            .graph_mut()
            .replace_contents(self.nodes.clone(), self.connections.clone());
        *diagram.viewport_mut() = self.viewport;
    }

    /// True if restoring this snapshot would leave `diagram` unchanged.
    pub fn matches(&self, diagram: &Diagram) -> bool {
        self.viewport == *diagram.viewport()
            && &self.nodes == diagram.graph().nodes()
            && &self.connections == diagram.graph().connections()
    }
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    snapshots: VecDeque<Snapshot>,
    index: usize,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    /// A capacity of zero is treated as one; the current state is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            index: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Captures `diagram`, dropping any redo branch and the oldest entry once
    /// the window is full.
    pub fn record(&mut self, diagram: &Diagram) {
        self.push(Snapshot::capture(diagram));
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Steps back one entry. `None` at the earliest retained state.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    /// Steps forward one entry. `None` at the latest state.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    /// Forgets everything and starts over from `diagram` as the only entry.
    pub fn reset(&mut self, diagram: &Diagram) {
        self.snapshots.clear();
        self.index = 0;
        self.record(diagram);
    }
}
