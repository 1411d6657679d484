// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: nodes, connections, the graph arena and the diagram aggregate.

pub mod connection;
pub mod diagram;
pub mod geometry;
pub mod graph;
pub mod ids;
pub mod node;

pub use connection::{Connection, ConnectionStyle, ConnectionStylePatch};
pub use diagram::Diagram;
pub use geometry::{Point, Size};
pub use graph::{
    GraphModel, RemovedNode, UnknownNodeError, DEFAULT_NODE_SIZE, DEFAULT_SIDE_SPACING,
};
pub use ids::{ConnectionId, Id, IdAllocator, IdError, NodeId};
pub use node::{Node, NodeStyle, NodeStylePatch, ParseSideError, Side};
