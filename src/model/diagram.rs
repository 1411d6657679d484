// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::graph::GraphModel;
use crate::viewport::Viewport;

/// The whole editable document: graph plus the view onto it.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    graph: GraphModel,
    viewport: Viewport,
    rev: u64,
}

impl Diagram {
    pub fn new(graph: GraphModel, viewport: Viewport) -> Self {
        Self {
            graph,
            viewport,
            rev: 0,
        }
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut GraphModel {
        &mut self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Split borrow for gesture handling, which mutates one side while reading the other.
    pub fn parts_mut(&mut self) -> (&mut GraphModel, &mut Viewport) {
        (&mut self.graph, &mut self.viewport)
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }

    /// Same graph contents and viewport, ignoring revision and id counters.
    pub fn content_eq(&self, other: &Diagram) -> bool {
        self.graph.content_eq(&other.graph) && self.viewport == other.viewport
    }
}
