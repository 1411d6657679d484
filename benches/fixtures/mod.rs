// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use nereid_mindmap::model::{Diagram, NodeId, Point, Side};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let path = std::env::temp_dir().join(format!(
            "nereid_mindmap_bench_{prefix}_{}_{nanos}_{counter}",
            std::process::id()
        ));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Small, Case::Medium, Case::Large];

    /// Stable case id used after the `/` in benchmark names.
    pub fn id(self) -> &'static str {
        match self {
            Case::Small => "small",
            Case::Medium => "medium",
            Case::Large => "large",
        }
    }

    pub fn node_count(self) -> usize {
        match self {
            Case::Small => 16,
            Case::Medium => 256,
            Case::Large => 2048,
        }
    }
}

/// A central node with children grown breadth-first from rotating sides,
/// plus one cross link for every seventh child.
pub fn fixture(case: Case) -> Diagram {
    let mut diagram = Diagram::default();
    let graph = diagram.graph_mut();
    let root = graph.create_node(Point::new(0.0, 0.0), "Central idea", true);

    let mut frontier = vec![root];
    let mut created = 1usize;
    let mut cursor = 0usize;
    while created < case.node_count() {
        let parent = frontier[cursor % frontier.len()].clone();
        let side = Side::ALL[created % Side::ALL.len()];
        let text = format!("idea {created:05}");
        let (child, _) = graph
            .create_node_from_side(&parent, side, 80.0, text)
            .expect("parent exists");

        if created % 7 == 0 {
            let other = frontier[(created / 7) % frontier.len()].clone();
            graph
                .create_connection(&child, &other, None)
                .expect("endpoints exist");
        }

        frontier.push(child);
        created += 1;
        cursor += 1;
    }

    diagram
}

pub fn hub(diagram: &Diagram) -> NodeId {
    diagram
        .graph()
        .nodes()
        .iter()
        .find(|(_, node)| node.is_central())
        .map(|(node_id, _)| node_id.clone())
        .expect("fixture has a central node")
}

pub fn checksum_diagram(diagram: &Diagram) -> u64 {
    let graph = diagram.graph();
    let mut acc = 0u64;
    for (node_id, node) in graph.nodes() {
        acc = acc
            .wrapping_mul(131)
            .wrapping_add(node_id.as_str().len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(node.text().len() as u64);
        acc = acc
            .wrapping_mul(131)
            .wrapping_add(node.position().x.to_bits() ^ node.position().y.to_bits());
    }
    for connection_id in graph.connections().keys() {
        acc = acc
            .wrapping_mul(131)
            .wrapping_add(connection_id.as_str().len() as u64);
    }
    acc.wrapping_mul(131).wrapping_add(diagram.viewport().zoom().to_bits())
}
