// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use super::ids::NodeId;
use super::node::Side;

pub const DEFAULT_CONNECTION_COLOR: &str = "#4a6ee0";
pub const DEFAULT_LINE_STYLE: &str = "solid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStyle {
    pub color: SmolStr,
    pub line_style: SmolStr,
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self {
            color: SmolStr::new_static(DEFAULT_CONNECTION_COLOR),
            line_style: SmolStr::new_static(DEFAULT_LINE_STYLE),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStylePatch {
    pub color: Option<SmolStr>,
    pub line_style: Option<SmolStr>,
}

/// A directed link between two nodes, stored by endpoint id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    source: NodeId,
    target: NodeId,
    side: Option<Side>,
    style: ConnectionStyle,
}

impl Connection {
    pub fn new(source: NodeId, target: NodeId, side: Option<Side>) -> Self {
        Self {
            source,
            target,
            side,
            style: ConnectionStyle::default(),
        }
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    /// Where the link anchors on the source node, if pinned to an edge.
    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn style(&self) -> &ConnectionStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: ConnectionStyle) {
        self.style = style;
    }

    pub fn apply_style(&mut self, patch: &ConnectionStylePatch) {
        if let Some(color) = &patch.color {
            self.style.color = color.clone();
        }
        if let Some(line_style) = &patch.line_style {
            self.style.line_style = line_style.clone();
        }
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }

    /// True if this connection links `a` and `b` in either direction.
    pub fn links(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }
}
