// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use super::theme::TuiTheme;
use super::{clip_line, draw, fit_label, line_segments, App, Mode};
use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::model::{ConnectionStylePatch, NodeId, Point};
use crate::store::MemoryStore;

fn app_with(editor: Editor) -> App {
    let mut app = App::new(editor, Box::new(MemoryStore::new()), TuiTheme::monochrome());
    app.canvas = Rect::new(1, 1, 78, 21);
    app
}

fn app_with_root() -> (App, NodeId) {
    let mut editor = Editor::new(EditorConfig::default());
    let root = editor.create_node(Point::new(0.0, 0.0), "Root", true);
    (app_with(editor), root)
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn mouse(app: &mut App, kind: MouseEventKind, column: u16, row: u16) {
    app.handle_mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    });
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[test]
fn new_node_lands_at_canvas_center_and_is_selected() {
    let mut app = app_with(Editor::new(EditorConfig::default()));
    press(&mut app, KeyCode::Char('n'));

    let editor = app.editor();
    let node_id = editor.selection().cloned().expect("selected");
    let node = editor.graph().node(&node_id).expect("node");
    let center = Point::new(78.0 * 8.0 / 2.0, 21.0 * 16.0 / 2.0);
    assert!(node.center().approx_eq(center, 1e-9));

    press(&mut app, KeyCode::Char('u'));
    assert!(app.editor().graph().is_empty());
    assert_eq!(app.editor().selection(), None);
}

#[test]
fn shifted_direction_keys_spawn_children_from_the_selection() {
    let (mut app, root) = app_with_root();
    press(&mut app, KeyCode::Char('L'));
    assert_eq!(
        app.status.as_ref().map(|s| s.text.as_str()),
        Some("select a node first")
    );

    app.editor.select(Some(root.clone()));
    press(&mut app, KeyCode::Char('L'));

    let editor = app.editor();
    assert_eq!(editor.graph().node_count(), 2);
    assert_eq!(editor.graph().connection_count(), 1);
    let child = editor.selection().expect("child selected");
    assert_ne!(child, &root);
    assert_eq!(
        editor.graph().node(child).expect("child").position(),
        Point::new(200.0, 0.0)
    );
}

#[test]
fn mouse_drag_moves_a_node_as_one_undo_step() {
    let (mut app, root) = app_with_root();

    // Cell (5, 2) is screen (36, 24), inside the 120x60 root box.
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 5, 2);
    assert_eq!(app.editor().selection(), Some(&root));
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 10, 3);
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 15, 5);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 15, 5);

    let moved = app.editor().graph().node(&root).expect("root").position();
    assert_eq!(moved, Point::new(80.0, 48.0));

    press(&mut app, KeyCode::Char('u'));
    let restored = app.editor().graph().node(&root).expect("root").position();
    assert_eq!(restored, Point::new(0.0, 0.0));
}

#[test]
fn clicks_outside_the_canvas_are_ignored() {
    let (mut app, _) = app_with_root();
    let history_len = app.editor().history().len();

    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 0, 0);
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 20, 10);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 20, 10);
    mouse(&mut app, MouseEventKind::ScrollUp, 0, 30);

    assert_eq!(app.editor().history().len(), history_len);
    assert_eq!(app.editor().viewport().zoom(), 1.0);
}

#[test]
fn scroll_zooms_around_the_cursor() {
    let (mut app, _) = app_with_root();
    mouse(&mut app, MouseEventKind::ScrollUp, 11, 6);

    let viewport = app.editor().viewport();
    assert!((viewport.zoom() - 1.1).abs() < 1e-9);
    let anchor = Point::new(84.0, 88.0);
    let logical = viewport.to_logical(anchor);
    assert!(logical.approx_eq(anchor, 1e-9));
}

#[test]
fn editing_text_commits_on_enter() {
    let (mut app, root) = app_with_root();
    app.editor.select(Some(root.clone()));

    press(&mut app, KeyCode::Char('e'));
    assert!(matches!(app.mode, Mode::EditText { .. }));
    for _ in 0..4 {
        press(&mut app, KeyCode::Backspace);
    }
    for ch in "Idea".chars() {
        press(&mut app, KeyCode::Char(ch));
    }
    // Keys that normally act on the diagram are plain text while editing.
    press(&mut app, KeyCode::Char('x'));
    press(&mut app, KeyCode::Backspace);
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.editor().graph().node(&root).expect("root").text(), "Idea");
    assert_eq!(app.editor().graph().node_count(), 1);
}

#[test]
fn escape_abandons_a_text_edit() {
    let (mut app, root) = app_with_root();
    app.editor.select(Some(root.clone()));
    let rev = app.editor().rev();

    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('!'));
    press(&mut app, KeyCode::Esc);

    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.editor().graph().node(&root).expect("root").text(), "Root");
    assert_eq!(app.editor().rev(), rev);
}

#[test]
fn delete_removes_the_selection() {
    let (mut app, root) = app_with_root();
    press(&mut app, KeyCode::Delete);
    assert_eq!(app.editor().graph().node_count(), 1);

    app.editor.select(Some(root));
    press(&mut app, KeyCode::Char('x'));
    assert!(app.editor().graph().is_empty());
}

#[test]
fn tab_cycles_through_nodes_and_wraps() {
    let mut editor = Editor::new(EditorConfig::default());
    let a = editor.create_node(Point::new(0.0, 0.0), "A", false);
    let b = editor.create_node(Point::new(200.0, 0.0), "B", false);
    let mut app = app_with(editor);

    press(&mut app, KeyCode::Tab);
    assert_eq!(app.editor().selection(), Some(&a));
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.editor().selection(), Some(&b));
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.editor().selection(), Some(&a));
}

#[test]
fn save_key_writes_the_store() {
    let (mut app, _) = app_with_root();
    assert!(app.editor().is_dirty());

    press(&mut app, KeyCode::Char('s'));

    assert!(!app.editor().is_dirty());
    let stored = app
        .store
        .read(app.editor().config().store_key())
        .expect("read")
        .expect("stored");
    assert!(stored.contains("\"Root\""));
}

#[test]
fn tick_runs_a_due_autosave() {
    let config = EditorConfig::default().with_autosave_delay(Duration::from_millis(50));
    let mut editor = Editor::new(config);
    editor.create_node(Point::new(0.0, 0.0), "Root", true);
    let mut app = app_with(editor);

    app.tick(Instant::now());
    assert!(app.editor().is_dirty());

    app.tick(Instant::now() + Duration::from_secs(1));
    assert!(!app.editor().is_dirty());
    assert_eq!(app.status.as_ref().map(|s| s.text.as_str()), Some("auto-saved"));
}

#[test]
fn quit_keys_stop_the_loop() {
    let (mut app, _) = app_with_root();
    press(&mut app, KeyCode::Char('c'));
    assert!(!app.should_quit);

    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
}

#[test]
fn draws_labels_and_status() {
    let (mut app, _) = app_with_root();
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");

    terminal.draw(|frame| draw(frame, &mut app)).expect("draw");

    assert_eq!(app.canvas, Rect::new(1, 1, 78, 21));
    let text = screen_text(&terminal);
    assert!(text.contains("Root"), "{text}");
    assert!(text.contains("1 nodes 0 links"), "{text}");
    assert!(text.contains("modified"), "{text}");
}

#[test]
fn long_labels_are_truncated_to_the_box() {
    assert_eq!(fit_label("Root", 120.0), "Root");
    assert_eq!(fit_label("A rather long idea", 80.0), "A rathe~");
    assert_eq!(fit_label("first\nsecond", 120.0), "first");
    assert_eq!(fit_label("tiny", 16.0), "");
}

#[test]
fn dashed_lines_alternate() {
    let start = Point::new(0.0, 0.0);
    let end = Point::new(30.0, 0.0);
    assert_eq!(line_segments(start, end, false, 0.0), vec![(start, end)]);

    let dashes = line_segments(start, end, true, 0.0);
    assert_eq!(dashes.len(), 3);
    assert_eq!(dashes[1], (Point::new(12.0, 0.0), Point::new(18.0, 0.0)));

    // Starting 3 px into a dash finishes that dash first.
    let shifted = line_segments(start, end, true, 3.0);
    assert_eq!(shifted[0], (Point::new(0.0, 0.0), Point::new(3.0, 0.0)));
    assert_eq!(shifted[1], (Point::new(9.0, 0.0), Point::new(15.0, 0.0)));
}

#[test]
fn lines_are_clipped_to_the_canvas() {
    let (from, to) = clip_line(Point::new(-100.0, 50.0), Point::new(900.0, 50.0), 640.0, 336.0)
        .expect("crosses the canvas");
    assert!(from.approx_eq(Point::new(0.0, 50.0), 1e-9), "{from:?}");
    assert!(to.approx_eq(Point::new(640.0, 50.0), 1e-9), "{to:?}");

    let inside = (Point::new(10.0, 10.0), Point::new(20.0, 30.0));
    assert_eq!(clip_line(inside.0, inside.1, 640.0, 336.0), Some(inside));

    assert_eq!(
        clip_line(Point::new(-50.0, -50.0), Point::new(-10.0, 900.0), 640.0, 336.0),
        None
    );
    assert_eq!(
        clip_line(Point::new(0.0, f64::NAN), Point::new(10.0, 10.0), 640.0, 336.0),
        None
    );
}

#[test]
fn very_long_dashed_links_stay_cheap() {
    let start = Point::new(0.0, 100.0);
    let end = Point::new(1.2e9, 100.0);
    let (from, to) = clip_line(start, end, 640.0, 336.0).expect("crosses the canvas");
    let dashes = line_segments(from, to, true, start.distance_to(from));
    assert_eq!(dashes.len(), 54);
    assert!(dashes.iter().all(|(a, b)| a.x >= 0.0 && b.x <= 640.0));
}

#[test]
fn far_apart_dashed_link_draws() {
    let mut editor = Editor::new(EditorConfig::default());
    let a = editor.create_node(Point::new(0.0, 0.0), "A", true);
    let b = editor.create_node(Point::new(1.0e9, 0.0), "B", false);
    let link = editor.create_connection(&a, &b, None).expect("link");
    editor.update_connection_style(
        &link,
        &ConnectionStylePatch {
            line_style: Some("dashed".into()),
            ..ConnectionStylePatch::default()
        },
    );
    let mut app = app_with(editor);

    let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");
    terminal.draw(|frame| draw(frame, &mut app)).expect("draw");
    assert!(screen_text(&terminal).contains("2 nodes 1 links"));
}

#[test]
fn view_mode_blocks_edits_but_not_navigation() {
    let (mut app, root) = app_with_root();
    app.editor.select(Some(root.clone()));
    press(&mut app, KeyCode::Char('v'));
    let rev = app.editor().rev();

    for code in [
        KeyCode::Char('L'),
        KeyCode::Char('n'),
        KeyCode::Char('e'),
        KeyCode::Char('x'),
        KeyCode::Char('u'),
    ] {
        press(&mut app, code);
    }
    mouse(&mut app, MouseEventKind::Down(MouseButton::Right), 40, 10);
    assert_eq!(app.editor().rev(), rev);
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.editor().graph().node_count(), 1);
    assert_eq!(
        app.status.as_ref().map(|s| s.text.as_str()),
        Some("view mode: press v to edit")
    );

    press(&mut app, KeyCode::Char('l'));
    assert_eq!(app.editor().viewport().pan(), Point::new(-40.0, 0.0));

    press(&mut app, KeyCode::Char('v'));
    press(&mut app, KeyCode::Char('L'));
    assert_eq!(app.editor().graph().node_count(), 2);
}

#[test]
fn view_mode_clicks_select_without_dragging() {
    let (mut app, root) = app_with_root();
    press(&mut app, KeyCode::Char('v'));

    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 5, 2);
    assert_eq!(app.editor().selection(), Some(&root));
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 15, 5);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 15, 5);
    assert_eq!(
        app.editor().graph().node(&root).expect("root").position(),
        Point::ORIGIN
    );

    // Empty canvas still pans: cells (60, 15) -> (65, 15) are 40 px apart.
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 60, 15);
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 65, 15);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 65, 15);
    assert_eq!(app.editor().viewport().pan(), Point::new(40.0, 0.0));
}

#[test]
fn ctrl_n_starts_a_new_map_that_undo_takes_back() {
    let (mut app, root) = app_with_root();
    app.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL));

    let editor = app.editor();
    assert_eq!(editor.graph().node_count(), 1);
    assert!(!editor.graph().contains_node(&root));
    let fresh = editor.selection().cloned().expect("new root selected");
    assert!(editor.graph().node(&fresh).expect("root").is_central());

    press(&mut app, KeyCode::Char('u'));
    assert!(app.editor().graph().contains_node(&root));
    assert!(!app.editor().graph().contains_node(&fresh));
}

#[test]
fn view_mode_shows_in_the_frame() {
    let (mut app, _) = app_with_root();
    press(&mut app, KeyCode::Char('v'));
    app.status = None;

    let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");
    terminal.draw(|frame| draw(frame, &mut app)).expect("draw");
    let text = screen_text(&terminal);
    assert!(text.contains("mind map (view)"), "{text}");
    assert!(text.contains("view mode  v edit"), "{text}");
}
