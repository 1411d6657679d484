// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The editing engine a host constructs and owns.
//!
//! `Editor` ties the diagram, gesture controller, history, change delta,
//! selection and auto-save timer together. Every committed edit bumps the
//! revision, records exactly one history entry and reschedules the auto-save. Hosts feed it input events and drain
//! [`Editor::take_delta`] to redraw incrementally.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::EditorConfig;
use crate::gesture::{GestureController, GestureKind, GestureOutcome, PointerId};
use crate::history::HistoryManager;
use crate::model::{
    ConnectionId, ConnectionStylePatch, Diagram, GraphModel, NodeId, NodeStylePatch, Point, Side,
    Size, UnknownNodeError,
};
use crate::ops::{ChangeRef, Delta, DeltaBuilder};
use crate::store::{self, Autosave, DiagramDocument, DiagramStore, StoreError, WriteDurability};
use crate::viewport::Viewport;

/// Where a fresh diagram puts its central node.
pub const ROOT_POSITION: Point = Point::new(500.0, 300.0);
pub const ROOT_TEXT: &str = "Main idea";

#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    diagram: Diagram,
    history: HistoryManager,
    gestures: GestureController,
    selection: Option<NodeId>,
    delta: DeltaBuilder,
    autosave: Autosave,
    dirty: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let graph = GraphModel::new().with_default_node_size(config.default_node_size());
        Self::with_diagram(config, Diagram::new(graph, Viewport::default()))
    }

    /// Starts from an existing diagram, which becomes the earliest undo state.
    pub fn with_diagram(config: EditorConfig, diagram: Diagram) -> Self {
        let mut history = HistoryManager::new(config.history_capacity());
        history.reset(&diagram);
        let autosave = Autosave::new(config.autosave_delay());
        Self {
            config,
            diagram,
            history,
            gestures: GestureController::new(),
            selection: None,
            delta: DeltaBuilder::default(),
            autosave,
            dirty: false,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn graph(&self) -> &GraphModel {
        self.diagram.graph()
    }

    pub fn viewport(&self) -> &Viewport {
        self.diagram.viewport()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    pub fn rev(&self) -> u64 {
        self.diagram.rev()
    }

    pub fn selection(&self) -> Option<&NodeId> {
        self.selection.as_ref()
    }

    /// Edits made since the last save or load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Drains the changes accumulated since the previous call.
    pub fn take_delta(&mut self) -> Delta {
        self.delta.take()
    }

    pub fn select(&mut self, node_id: Option<NodeId>) -> bool {
        let node_id = node_id.filter(|id| self.diagram.graph().contains_node(id));
        let changed = self.selection != node_id;
        self.selection = node_id;
        changed
    }

    pub fn create_node(&mut self, position: Point, text: impl Into<String>, central: bool) -> NodeId {
        let node_id = self.diagram.graph_mut().create_node(position, text, central);
        self.delta.record_added(ChangeRef::Node(node_id.clone()));
        self.commit("create node");
        node_id
    }

    /// Gives an empty diagram its central root node and selects it.
    ///
    /// The seeded diagram becomes the earliest undo state and is not dirty,
    /// so an untouched first run writes nothing. `None` if the diagram
    /// already has nodes.
    pub fn seed_root(&mut self) -> Option<NodeId> {
        if !self.diagram.graph().is_empty() {
            return None;
        }
        let root = self
            .diagram
            .graph_mut()
            .create_node(ROOT_POSITION, ROOT_TEXT, true);
        self.delta.record_added(ChangeRef::Node(root.clone()));
        self.diagram.bump_rev();
        self.history.reset(&self.diagram);
        self.selection = Some(root.clone());
        Some(root)
    }

    /// Starts over: every node and connection goes, the view returns to
    /// zoom 1 and pan 0, and a new central root node is selected. One undo
    /// step brings the old diagram back. Ids keep counting up.
    pub fn reset(&mut self) -> NodeId {
        let mut graph = self.diagram.graph().clone();
        graph.clear();
        let root = graph.create_node(ROOT_POSITION, ROOT_TEXT, true);
        self.replace_diagram(Diagram::new(graph, Viewport::default()));
        self.selection = Some(root.clone());
        self.commit("reset");
        tracing::info!(root = %root, "diagram reset");
        root
    }

    /// Creates a node centered on a screen point.
    pub fn create_node_at_screen(&mut self, screen: Point, text: impl Into<String>) -> NodeId {
        let size = self.config.default_node_size();
        let center = self.diagram.viewport().to_logical(screen);
        let position = center - Point::new(size.width / 2.0, size.height / 2.0);
        self.create_node(position, text, false)
    }

    pub fn create_node_from_side(
        &mut self,
        parent: &NodeId,
        side: Side,
        text: impl Into<String>,
    ) -> Result<(NodeId, ConnectionId), UnknownNodeError> {
        let spacing = self.config.side_spacing();
        let (child, connection_id) =
            self.diagram
                .graph_mut()
                .create_node_from_side(parent, side, spacing, text)?;
        self.delta.record_added(ChangeRef::Node(child.clone()));
        self.delta
            .record_added(ChangeRef::Connection(connection_id.clone()));
        self.commit("create node from side");
        Ok((child, connection_id))
    }

    pub fn remove_node(&mut self, node_id: &NodeId) -> bool {
        let Some(removed) = self.diagram.graph_mut().remove_node(node_id) else {
            return false;
        };
        if self.selection.as_ref() == Some(node_id) {
            self.selection = None;
        }
        if self.gestures.dragged_node() == Some(node_id) {
            self.gestures.cancel();
        }
        self.delta.record_node_removed(&removed);
        self.commit("remove node");
        true
    }

    pub fn remove_selected(&mut self) -> bool {
        match self.selection.clone() {
            Some(node_id) => self.remove_node(&node_id),
            None => false,
        }
    }

    pub fn create_connection(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        side: Option<Side>,
    ) -> Result<ConnectionId, UnknownNodeError> {
        let connection_id = self
            .diagram
            .graph_mut()
            .create_connection(source, target, side)?;
        self.delta
            .record_added(ChangeRef::Connection(connection_id.clone()));
        self.commit("create connection");
        Ok(connection_id)
    }

    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> bool {
        if self
            .diagram
            .graph_mut()
            .remove_connection(connection_id)
            .is_none()
        {
            return false;
        }
        self.delta
            .record_removed(ChangeRef::Connection(connection_id.clone()));
        self.commit("remove connection");
        true
    }

    pub fn update_node_text(&mut self, node_id: &NodeId, text: impl Into<String>) -> bool {
        if self
            .diagram
            .graph_mut()
            .update_node_text(node_id, text)
            .is_none()
        {
            return false;
        }
        self.delta.record_updated(ChangeRef::Node(node_id.clone()));
        self.commit("edit text");
        true
    }

    pub fn update_node_position(&mut self, node_id: &NodeId, position: Point) -> bool {
        if self
            .diagram
            .graph_mut()
            .update_node_position(node_id, position)
            .is_none()
        {
            return false;
        }
        self.delta.record_node_geometry(self.diagram.graph(), node_id);
        self.commit("move node");
        true
    }

    pub fn update_node_size(&mut self, node_id: &NodeId, size: Size) -> bool {
        if self
            .diagram
            .graph_mut()
            .update_node_size(node_id, size)
            .is_none()
        {
            return false;
        }
        self.delta.record_node_geometry(self.diagram.graph(), node_id);
        self.commit("resize node");
        true
    }

    pub fn update_node_style(&mut self, node_id: &NodeId, patch: &NodeStylePatch) -> bool {
        if self
            .diagram
            .graph_mut()
            .update_node_style(node_id, patch)
            .is_none()
        {
            return false;
        }
        self.delta.record_updated(ChangeRef::Node(node_id.clone()));
        self.commit("style node");
        true
    }

    pub fn update_connection_style(
        &mut self,
        connection_id: &ConnectionId,
        patch: &ConnectionStylePatch,
    ) -> bool {
        if self
            .diagram
            .graph_mut()
            .update_connection_style(connection_id, patch)
            .is_none()
        {
            return false;
        }
        self.delta
            .record_updated(ChangeRef::Connection(connection_id.clone()));
        self.commit("style connection");
        true
    }

    pub fn zoom_by(&mut self, delta: f64, anchor: Option<Point>) -> bool {
        let changed = self.diagram.viewport_mut().zoom_by(delta, anchor);
        self.viewport_committed(changed, "zoom")
    }

    pub fn set_zoom(&mut self, zoom: f64, anchor: Option<Point>) -> bool {
        let changed = self.diagram.viewport_mut().set_zoom(zoom, anchor);
        self.viewport_committed(changed, "set zoom")
    }

    pub fn reset_zoom(&mut self) -> bool {
        let changed = self.diagram.viewport_mut().reset_zoom();
        self.viewport_committed(changed, "reset zoom")
    }

    pub fn center_view(&mut self) -> bool {
        let changed = self.diagram.viewport_mut().center();
        self.viewport_committed(changed, "center view")
    }

    pub fn pan_by(&mut self, delta: Point) -> bool {
        let changed = self.diagram.viewport_mut().pan_by(delta);
        self.viewport_committed(changed, "pan")
    }

    /// One wheel event: `notches > 0` zooms in, anchored at the cursor.
    pub fn wheel(&mut self, screen: Point, notches: f64) -> bool {
        if notches == 0.0 || !notches.is_finite() {
            return false;
        }
        self.zoom_by(self.config.wheel_zoom_step() * notches, Some(screen))
    }

    fn viewport_committed(&mut self, changed: bool, action: &'static str) -> bool {
        if changed {
            self.delta.record_updated(ChangeRef::Viewport);
            self.commit(action);
        }
        changed
    }

    pub fn pointer_down(&mut self, pointer: PointerId, screen: Point) -> GestureOutcome {
        let outcome = self.gestures.pointer_down(
            pointer,
            screen,
            self.diagram.graph(),
            self.diagram.viewport(),
        );
        match &outcome {
            GestureOutcome::Started(GestureKind::DragNode) => {
                self.selection = self.gestures.dragged_node().cloned();
            }
            GestureOutcome::Started(GestureKind::PanCanvas) => {
                self.selection = None;
            }
            _ => {}
        }
        outcome
    }

    pub fn pointer_move(&mut self, pointer: PointerId, screen: Point) -> GestureOutcome {
        let (graph, viewport) = self.diagram.parts_mut();
        let outcome = self.gestures.pointer_move(pointer, screen, graph, viewport);
        match &outcome {
            GestureOutcome::NodeMoved(node_id) => {
                self.delta.record_node_geometry(self.diagram.graph(), node_id);
            }
            GestureOutcome::Panned | GestureOutcome::Zoomed => {
                self.delta.record_updated(ChangeRef::Viewport);
            }
            _ => {}
        }
        outcome
    }

    /// Ends the gesture; a gesture that changed anything becomes one undo step.
    pub fn pointer_up(&mut self, pointer: PointerId) -> GestureOutcome {
        let outcome = self.gestures.pointer_up(pointer);
        if let GestureOutcome::Completed {
            kind,
            changed: true,
        } = &outcome
        {
            self.commit(match kind {
                GestureKind::DragNode => "drag node",
                GestureKind::PanCanvas => "pan canvas",
                GestureKind::PinchZoom => "pinch zoom",
            });
        }
        outcome
    }

    /// Abandons the active gesture. Applied moves stay, but no undo step is taken.
    pub fn cancel_gesture(&mut self) -> GestureOutcome {
        self.gestures.cancel()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.gestures.cancel();
        let before = self.diagram.clone();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        snapshot.restore(&mut self.diagram);
        tracing::info!(index = self.history.index(), "undo");
        self.after_restore(&before);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.gestures.cancel();
        let before = self.diagram.clone();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        snapshot.restore(&mut self.diagram);
        tracing::info!(index = self.history.index(), "redo");
        self.after_restore(&before);
        true
    }

    fn after_restore(&mut self, before: &Diagram) {
        self.delta
            .record_graph_diff(before.graph(), self.diagram.graph());
        self.delta
            .record_viewport_diff(before.viewport(), self.diagram.viewport());
        self.drop_stale_selection();
        self.diagram.bump_rev();
        self.touch();
    }

    /// Writes the current diagram under the configured key.
    pub fn save(&mut self, store: &mut dyn DiagramStore) -> Result<(), StoreError> {
        let key = self.config.store_key().to_owned();
        let document = store::encode(&self.diagram).map_err(|source| StoreError::Json {
            path: PathBuf::from(&key),
            source,
        })?;
        store.write(&key, &document)?;
        self.autosave.cancel();
        self.dirty = false;
        tracing::info!(
            key = %key,
            nodes = self.diagram.graph().node_count(),
            connections = self.diagram.graph().connection_count(),
            "saved diagram"
        );
        Ok(())
    }

    /// Replaces the diagram with the one stored under the configured key.
    ///
    /// `Ok(false)` if nothing is stored yet. On error the live diagram is
    /// untouched. A successful load starts a fresh undo history.
    pub fn load(&mut self, store: &dyn DiagramStore) -> Result<bool, StoreError> {
        let key = self.config.store_key().to_owned();
        let Some(json) = store.read(&key)? else {
            tracing::info!(key = %key, "nothing stored yet");
            return Ok(false);
        };
        let loaded = store::parse(&json)
            .and_then(|document| document.rebuild_into(self.diagram.graph().clone()))
            .map_err(|source| {
                tracing::warn!(key = %key, %source, "stored diagram is malformed");
                store::kv::malformed(Path::new(&key), source)
            })?;

        self.replace_diagram(loaded);
        self.history.reset(&self.diagram);
        self.autosave.cancel();
        self.dirty = false;
        tracing::info!(key = %key, nodes = self.diagram.graph().node_count(), "loaded diagram");
        Ok(true)
    }

    pub fn export_to(&self, path: &Path, durability: WriteDurability) -> Result<(), StoreError> {
        store::export_to_file(path, &self.diagram, durability)?;
        tracing::info!(path = %path.display(), "exported diagram");
        Ok(())
    }

    /// Replaces the diagram with the file's contents as one undoable step.
    ///
    /// The file is validated completely before the live diagram is touched.
    pub fn import_from(&mut self, path: &Path) -> Result<(), StoreError> {
        let document = store::read_document(path)?;
        self.import_document(document)
            .map_err(|source| store::kv::malformed(path, source))
            .map_err(|err| {
                tracing::warn!(path = %path.display(), %err, "import rejected");
                err
            })?;
        tracing::info!(path = %path.display(), "imported diagram");
        Ok(())
    }

    pub fn import_document(
        &mut self,
        document: DiagramDocument,
    ) -> Result<(), store::MalformedDocumentError> {
        let loaded = document.rebuild_into(self.diagram.graph().clone())?;
        self.replace_diagram(loaded);
        self.commit("import");
        Ok(())
    }

    /// Saves if the auto-save deadline has passed. Returns whether it wrote.
    pub fn poll_autosave(
        &mut self,
        now: Instant,
        store: &mut dyn DiagramStore,
    ) -> Result<bool, StoreError> {
        if !self.autosave.take_due(now) {
            return Ok(false);
        }
        tracing::debug!("autosave due");
        self.save(store)?;
        Ok(true)
    }

    /// Time until the pending auto-save, if one is scheduled.
    pub fn autosave_remaining(&self, now: Instant) -> Option<std::time::Duration> {
        self.autosave.remaining(now)
    }

    fn replace_diagram(&mut self, mut loaded: Diagram) {
        self.gestures.cancel();
        let before = std::mem::take(&mut self.diagram);
        loaded.set_rev(before.rev());
        self.diagram = loaded;
        self.delta
            .record_graph_diff(before.graph(), self.diagram.graph());
        self.delta
            .record_viewport_diff(before.viewport(), self.diagram.viewport());
        self.drop_stale_selection();
        self.diagram.bump_rev();
    }

    fn drop_stale_selection(&mut self) {
        if let Some(node_id) = &self.selection {
            if !self.diagram.graph().contains_node(node_id) {
                self.selection = None;
            }
        }
    }

    fn commit(&mut self, action: &'static str) {
        self.diagram.bump_rev();
        self.history.record(&self.diagram);
        self.touch();
        tracing::debug!(action, rev = self.diagram.rev(), "commit");
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.autosave.schedule(Instant::now());
    }
}
