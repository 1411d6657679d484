// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::model::{Size, DEFAULT_NODE_SIZE, DEFAULT_SIDE_SPACING};
use crate::store::DEFAULT_AUTOSAVE_DELAY;

pub const DEFAULT_WHEEL_ZOOM_STEP: f64 = 0.1;
pub const DEFAULT_STORE_KEY: &str = "mind-map";

/// Tunables for an [`crate::editor::Editor`]. Zoom bounds are fixed and not part of this.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    history_capacity: usize,
    default_node_size: Size,
    side_spacing: f64,
    wheel_zoom_step: f64,
    autosave_delay: Duration,
    store_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_node_size: DEFAULT_NODE_SIZE,
            side_spacing: DEFAULT_SIDE_SPACING,
            wheel_zoom_step: DEFAULT_WHEEL_ZOOM_STEP,
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
            store_key: DEFAULT_STORE_KEY.to_owned(),
        }
    }
}

impl EditorConfig {
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    pub fn with_default_node_size(mut self, size: Size) -> Self {
        self.default_node_size = size;
        self
    }

    pub fn with_side_spacing(mut self, spacing: f64) -> Self {
        self.side_spacing = spacing;
        self
    }

    pub fn with_wheel_zoom_step(mut self, step: f64) -> Self {
        self.wheel_zoom_step = step;
        self
    }

    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay = delay;
        self
    }

    pub fn with_store_key(mut self, key: impl Into<String>) -> Self {
        self.store_key = key.into();
        self
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    pub fn default_node_size(&self) -> Size {
        self.default_node_size
    }

    pub fn side_spacing(&self) -> f64 {
        self.side_spacing
    }

    pub fn wheel_zoom_step(&self) -> f64 {
        self.wheel_zoom_step
    }

    pub fn autosave_delay(&self) -> Duration {
        self.autosave_delay
    }

    pub fn store_key(&self) -> &str {
        &self.store_key
    }
}
