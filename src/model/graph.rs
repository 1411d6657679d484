// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The node/connection arena.
//!
//! Connections refer to nodes by id and every node keeps the set of connection
//! ids incident to it. Both sides are updated together inside each mutation,
//! so no caller ever sees a connection whose endpoint is missing.

use std::collections::BTreeMap;
use std::fmt;

use super::connection::{Connection, ConnectionStylePatch};
use super::geometry::{Point, Size};
use super::ids::{
    connection_id_allocator, node_id_allocator, ConnectionId, ConnectionIdTag, IdAllocator,
    NodeId, NodeIdTag,
};
use super::node::{Node, NodeStylePatch, Side};

pub const DEFAULT_NODE_SIZE: Size = Size::new(120.0, 60.0);
pub const DEFAULT_SIDE_SPACING: f64 = 80.0;

/// A connection endpoint did not name an existing node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNodeError {
    node_id: NodeId,
}

impl UnknownNodeError {
    pub fn new(node_id: NodeId) -> Self {
        Self { node_id }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }
}

impl fmt::Display for UnknownNodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node (id={})", self.node_id)
    }
}

impl std::error::Error for UnknownNodeError {}

/// What `remove_node` took out of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node_id: NodeId,
    pub node: Node,
    pub connections: Vec<(ConnectionId, Connection)>,
}

#[derive(Debug, Clone)]
pub struct GraphModel {
    nodes: BTreeMap<NodeId, Node>,
    connections: BTreeMap<ConnectionId, Connection>,
    node_ids: IdAllocator<NodeIdTag>,
    connection_ids: IdAllocator<ConnectionIdTag>,
    default_node_size: Size,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphModel {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            connections: BTreeMap::new(),
            node_ids: node_id_allocator(),
            connection_ids: connection_id_allocator(),
            default_node_size: DEFAULT_NODE_SIZE,
        }
    }

    pub fn with_default_node_size(mut self, size: Size) -> Self {
        self.default_node_size = size;
        self
    }

    pub fn default_node_size(&self) -> Size {
        self.default_node_size
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn connections(&self) -> &BTreeMap<ConnectionId, Connection> {
        &self.connections
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(connection_id)
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Counter values the next node/connection allocations will use.
    pub fn next_ids(&self) -> (u64, u64) {
        (self.node_ids.next_value(), self.connection_ids.next_value())
    }

    pub fn create_node(&mut self, position: Point, text: impl Into<String>, central: bool) -> NodeId {
        let node_id = self.node_ids.allocate();
        let node = Node::new(position, self.default_node_size, text, central);
        self.nodes.insert(node_id.clone(), node);
        node_id
    }

    /// Spawns a node next to `parent` on `side` and links parent to child.
    ///
    /// The child keeps the parent's row or column and sits `spacing` away from
    /// the parent's edge.
    pub fn create_node_from_side(
        &mut self,
        parent_id: &NodeId,
        side: Side,
        spacing: f64,
        text: impl Into<String>,
    ) -> Result<(NodeId, ConnectionId), UnknownNodeError> {
        let Some(parent) = self.nodes.get(parent_id) else {
            return Err(UnknownNodeError::new(parent_id.clone()));
        };

        let Point { x, y } = parent.position();
        let Size { width, height } = parent.size();
        let position = match side {
            Side::Top => Point::new(x, y - spacing - height),
            Side::Right => Point::new(x + width + spacing, y),
            Side::Bottom => Point::new(x, y + height + spacing),
            Side::Left => Point::new(x - spacing - width, y),
        };

        let child_id = self.create_node(position, text, false);
        let connection_id = self.create_connection(parent_id, &child_id, Some(side))?;
        Ok((child_id, connection_id))
    }

    /// Removes the node and every connection touching it in one step.
    ///
    /// Returns `None` (and changes nothing) if the id is unknown.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<RemovedNode> {
        let node = self.nodes.remove(node_id)?;

        let mut connections = Vec::with_capacity(node.incident().len());
        for connection_id in node.incident() {
            let Some(connection) = self.connections.remove(connection_id) else {
                continue;
            };
            let other = if connection.source() == node_id {
                connection.target()
            } else {
                connection.source()
            };
            if let Some(other) = self.nodes.get_mut(other) {
                other.detach(connection_id);
            }
            connections.push((connection_id.clone(), connection));
        }

        Some(RemovedNode {
            node_id: node_id.clone(),
            node,
            connections,
        })
    }

    /// Links `source` to `target`.
    ///
    /// Duplicates and self-loops are allowed; de-duplication is a host policy.
    pub fn create_connection(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        side: Option<Side>,
    ) -> Result<ConnectionId, UnknownNodeError> {
        if !self.nodes.contains_key(source) {
            return Err(UnknownNodeError::new(source.clone()));
        }
        if !self.nodes.contains_key(target) {
            return Err(UnknownNodeError::new(target.clone()));
        }

        let connection_id = self.connection_ids.allocate();
        self.connections.insert(
            connection_id.clone(),
            Connection::new(source.clone(), target.clone(), side),
        );
        for endpoint in [source, target] {
            if let Some(node) = self.nodes.get_mut(endpoint) {
                node.attach(connection_id.clone());
            }
        }
        Ok(connection_id)
    }

    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        let connection = self.connections.remove(connection_id)?;
        for endpoint in [connection.source(), connection.target()] {
            if let Some(node) = self.nodes.get_mut(endpoint) {
                node.detach(connection_id);
            }
        }
        Some(connection)
    }

    pub fn update_node_text(&mut self, node_id: &NodeId, text: impl Into<String>) -> Option<&Node> {
        let node = self.nodes.get_mut(node_id)?;
        node.set_text(text);
        Some(node)
    }

    pub fn update_node_position(&mut self, node_id: &NodeId, position: Point) -> Option<&Node> {
        let node = self.nodes.get_mut(node_id)?;
        node.set_position(position);
        Some(node)
    }

    pub fn update_node_size(&mut self, node_id: &NodeId, size: Size) -> Option<&Node> {
        let node = self.nodes.get_mut(node_id)?;
        node.set_size(size);
        Some(node)
    }

    pub fn update_node_style(&mut self, node_id: &NodeId, patch: &NodeStylePatch) -> Option<&Node> {
        let node = self.nodes.get_mut(node_id)?;
        node.style_mut().apply(patch);
        Some(node)
    }

    pub fn update_connection_style(
        &mut self,
        connection_id: &ConnectionId,
        patch: &ConnectionStylePatch,
    ) -> Option<&Connection> {
        let connection = self.connections.get_mut(connection_id)?;
        connection.apply_style(patch);
        Some(connection)
    }

    /// Ids of connections whose source or target is `node_id`.
    ///
    /// Yields nothing for an unknown node.
    pub fn incident_connections<'a>(
        &'a self,
        node_id: &NodeId,
    ) -> impl Iterator<Item = &'a ConnectionId> + 'a {
        self.nodes
            .get(node_id)
            .into_iter()
            .flat_map(|node| node.incident().iter())
    }

    pub fn connections_between<'a>(
        &'a self,
        a: &'a NodeId,
        b: &'a NodeId,
    ) -> impl Iterator<Item = (&'a ConnectionId, &'a Connection)> + 'a {
        self.connections
            .iter()
            .filter(move |(_, connection)| connection.links(a, b))
    }

    /// The node under a logical point. Overlapping boxes stack in allocation
    /// order, so the most recently created node wins; ids from outside the
    /// allocator sit below allocated ones, ordered by their text.
    pub fn node_at(&self, point: Point) -> Option<&NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.contains(point))
            .max_by_key(|(node_id, _)| (self.node_ids.sequence_of(node_id), *node_id))
            .map(|(node_id, _)| node_id)
    }

    /// Replaces every node and connection, keeping their ids.
    ///
    /// Id counters only move forward past the restored ids; they never go
    /// back, so ids deleted after a snapshot are not handed out again.
    pub fn replace_contents(
        &mut self,
        nodes: BTreeMap<NodeId, Node>,
        connections: BTreeMap<ConnectionId, Connection>,
    ) {
        for node_id in nodes.keys() {
            self.node_ids.observe(node_id);
        }
        for connection_id in connections.keys() {
            self.connection_ids.observe(connection_id);
        }
        self.nodes = nodes;
        self.connections = connections;
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
    }

    /// Same nodes and connections, ignoring id counters.
    pub fn content_eq(&self, other: &GraphModel) -> bool {
        self.nodes == other.nodes && self.connections == other.connections
    }

    /// Checks referential integrity: endpoints exist and incidence sets match.
    pub fn is_consistent(&self) -> bool {
        let endpoints_exist = self.connections.iter().all(|(connection_id, connection)| {
            [connection.source(), connection.target()].into_iter().all(|endpoint| {
                self.nodes
                    .get(endpoint)
                    .is_some_and(|node| node.incident().contains(connection_id))
            })
        });
        let incidence_matches = self.nodes.iter().all(|(node_id, node)| {
            node.incident().iter().all(|connection_id| {
                self.connections
                    .get(connection_id)
                    .is_some_and(|connection| connection.touches(node_id))
            })
        });
        endpoints_exist && incidence_matches
    }
}
