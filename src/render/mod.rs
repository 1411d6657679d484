// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Screen-space projection of a diagram.
//!
//! Hosts draw from these views and never redo the viewport math themselves.
//! Connection endpoints are side-aware: a side hint pins the source to that
//! edge's midpoint and the target to the opposite edge; without a hint both
//! ends sit on the node centers.

use crate::model::{
    Connection, ConnectionId, ConnectionStyle, Diagram, GraphModel, Node, NodeId, NodeStyle,
    Point, Size,
};
use crate::viewport::Viewport;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeView<'a> {
    pub id: &'a NodeId,
    pub position: Point,
    pub size: Size,
    pub text: &'a str,
    pub style: &'a NodeStyle,
    pub central: bool,
}

impl NodeView<'_> {
    pub fn contains(&self, screen: Point) -> bool {
        screen.x >= self.position.x
            && screen.x <= self.position.x + self.size.width
            && screen.y >= self.position.y
            && screen.y <= self.position.y + self.size.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionView<'a> {
    pub id: &'a ConnectionId,
    pub start: Point,
    pub end: Point,
    /// Screen distance between the anchors.
    pub length: f64,
    /// `atan2(dy, dx)` in degrees, screen y pointing down.
    pub angle_degrees: f64,
    pub style: &'a ConnectionStyle,
}

pub fn project_node<'a>(viewport: &Viewport, id: &'a NodeId, node: &'a Node) -> NodeView<'a> {
    NodeView {
        id,
        position: viewport.to_screen(node.position()),
        size: viewport.size_to_screen(node.size()),
        text: node.text(),
        style: node.style(),
        central: node.is_central(),
    }
}

/// Logical anchor points `(start, end)` for a connection.
pub fn connection_anchors(source: &Node, target: &Node, connection: &Connection) -> (Point, Point) {
    match connection.side() {
        Some(side) => (source.side_anchor(side), target.side_anchor(side.opposite())),
        None => (source.center(), target.center()),
    }
}

/// `None` if an endpoint is missing, which the graph never allows.
pub fn project_connection<'a>(
    graph: &GraphModel,
    viewport: &Viewport,
    id: &'a ConnectionId,
    connection: &'a Connection,
) -> Option<ConnectionView<'a>> {
    let source = graph.node(connection.source())?;
    let target = graph.node(connection.target())?;
    let (start, end) = connection_anchors(source, target, connection);
    let (start, end) = (viewport.to_screen(start), viewport.to_screen(end));
    let delta = end - start;

    Some(ConnectionView {
        id,
        start,
        end,
        length: delta.length(),
        angle_degrees: delta.y.atan2(delta.x).to_degrees(),
        style: connection.style(),
    })
}

pub fn node_views(diagram: &Diagram) -> impl Iterator<Item = NodeView<'_>> {
    let viewport = *diagram.viewport();
    diagram
        .graph()
        .nodes()
        .iter()
        .map(move |(id, node)| project_node(&viewport, id, node))
}

pub fn connection_views(diagram: &Diagram) -> impl Iterator<Item = ConnectionView<'_>> {
    let viewport = *diagram.viewport();
    let graph = diagram.graph();
    graph
        .connections()
        .iter()
        .filter_map(move |(id, connection)| project_connection(graph, &viewport, id, connection))
}
