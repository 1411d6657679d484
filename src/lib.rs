// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nereid mind map: an interactive node-and-connection editing engine.
//!
//! [`editor::Editor`] owns the diagram (graph plus viewport), routes pointer
//! input through the gesture controller, records undo snapshots and schedules
//! auto-saves. Hosts draw from [`render`] views and persist through
//! [`store::DiagramStore`].

pub mod config;
pub mod editor;
pub mod gesture;
pub mod history;
pub mod model;
pub mod ops;
pub mod render;
pub mod store;
pub mod tui;
pub mod viewport;

pub use config::EditorConfig;
pub use editor::Editor;
pub use model::{ConnectionId, Diagram, GraphModel, NodeId, Point, Side, Size};
pub use viewport::Viewport;
