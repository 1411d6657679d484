// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal host for the editor.
//!
//! The canvas maps one terminal cell to [`CELL_WIDTH_PX`] x [`CELL_HEIGHT_PX`]
//! screen units, so the engine sees the same coordinates a pixel host would.
//! The left mouse button drives the gesture controller as pointer `0`.

use std::error::Error;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Rectangle};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use crate::editor::Editor;
use crate::gesture::PointerId;
use crate::model::{NodeId, Point, Side};
use crate::render;
use crate::store::DiagramStore;

mod theme;

use theme::TuiTheme;

pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

const MOUSE_POINTER: PointerId = 0;
const PAN_STEP_PX: f64 = 40.0;
const NEW_NODE_TEXT: &str = "New idea";
const TICK: Duration = Duration::from_millis(250);
const DASH_PX: f64 = 6.0;

/// Runs the interactive editor until the user quits.
///
/// Pending changes are flushed to `store` on the way out. A `notice` is shown
/// as an error in the status line until the next message replaces it.
pub fn run(
    editor: Editor,
    store: Box<dyn DiagramStore>,
    notice: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(editor, store, TuiTheme::from_env());
    if let Some(text) = notice {
        app.error(text);
    }

    while !app.should_quit {
        terminal.draw(|frame| draw(frame, &mut app))?;

        let timeout = app.poll_timeout(Instant::now());
        if event::poll(timeout)? {
            app.handle_event(event::read()?);
        }
        app.tick(Instant::now());
    }

    app.flush()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    EditText { node_id: NodeId, buffer: String },
}

struct Status {
    text: String,
    error: bool,
}

pub(crate) struct App {
    editor: Editor,
    store: Box<dyn DiagramStore>,
    theme: TuiTheme,
    mode: Mode,
    status: Option<Status>,
    canvas: Rect,
    view_only: bool,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(editor: Editor, store: Box<dyn DiagramStore>, theme: TuiTheme) -> Self {
        Self {
            editor,
            store,
            theme,
            mode: Mode::Normal,
            status: None,
            canvas: Rect::default(),
            view_only: false,
            should_quit: false,
        }
    }

    pub(crate) fn editor(&self) -> &Editor {
        &self.editor
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            error: false,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            error: true,
        });
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        self.editor
            .autosave_remaining(now)
            .map_or(TICK, |remaining| remaining.min(TICK))
    }

    pub(crate) fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    /// Runs the auto-save check and drains the change delta.
    pub(crate) fn tick(&mut self, now: Instant) {
        match self.editor.poll_autosave(now, self.store.as_mut()) {
            Ok(true) => self.info("auto-saved"),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(%err, "autosave failed");
                self.error(format!("auto-save failed: {err}"));
            }
        }

        let delta = self.editor.take_delta();
        if !delta.is_empty() {
            tracing::trace!(
                added = delta.added.len(),
                removed = delta.removed.len(),
                updated = delta.updated.len(),
                "diagram changed"
            );
        }
    }

    fn flush(&mut self) -> Result<(), Box<dyn Error>> {
        if self.editor.is_dirty() {
            self.editor.save(self.store.as_mut())?;
        }
        Ok(())
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if let Mode::EditText { .. } = self.mode {
            self.handle_edit_key(key);
            return;
        }

        if self.view_only && mutates_diagram(&key) {
            self.info("view mode: press v to edit");
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('z') if ctrl => self.undo(),
            KeyCode::Char('u') => self.undo(),
            KeyCode::Char('y') if ctrl => self.redo(),
            KeyCode::Char('r') => self.redo(),
            KeyCode::Char('s') => self.save(),
            KeyCode::Delete | KeyCode::Char('x') => {
                if !self.editor.remove_selected() {
                    self.info("nothing selected");
                }
            }
            KeyCode::Esc => {
                if self.editor.gestures().is_active() {
                    self.editor.cancel_gesture();
                    self.info("gesture cancelled");
                } else {
                    self.editor.select(None);
                }
            }
            KeyCode::Char('v') => {
                self.view_only = !self.view_only;
                self.info(if self.view_only { "view mode" } else { "edit mode" });
            }
            KeyCode::Char('n') if ctrl => {
                self.editor.reset();
                self.info("new map; u brings the old one back");
            }
            KeyCode::Char('n') => {
                let node_id = self
                    .editor
                    .create_node_at_screen(self.canvas_center(), NEW_NODE_TEXT);
                self.editor.select(Some(node_id));
            }
            KeyCode::Char('K') => self.spawn_child(Side::Top),
            KeyCode::Char('L') => self.spawn_child(Side::Right),
            KeyCode::Char('J') => self.spawn_child(Side::Bottom),
            KeyCode::Char('H') => self.spawn_child(Side::Left),
            KeyCode::Left | KeyCode::Char('h') => {
                self.editor.pan_by(Point::new(PAN_STEP_PX, 0.0));
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.editor.pan_by(Point::new(-PAN_STEP_PX, 0.0));
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.editor.pan_by(Point::new(0.0, PAN_STEP_PX));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.editor.pan_by(Point::new(0.0, -PAN_STEP_PX));
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.editor.wheel(self.canvas_center(), 1.0);
            }
            KeyCode::Char('-') => {
                self.editor.wheel(self.canvas_center(), -1.0);
            }
            KeyCode::Char('0') => {
                self.editor.reset_zoom();
            }
            KeyCode::Char('c') => {
                self.editor.center_view();
            }
            KeyCode::Tab => self.cycle_selection(),
            KeyCode::Enter | KeyCode::Char('e') => self.begin_edit(),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Mode::EditText { node_id, buffer } = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                let node_id = node_id.clone();
                let text = std::mem::take(buffer);
                self.mode = Mode::Normal;
                self.editor.update_node_text(&node_id, text);
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.info("edit cancelled");
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                buffer.push(ch);
            }
            _ => {}
        }
    }

    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) {
        let screen = self.cell_to_screen(mouse.column, mouse.row);
        let inside = self.canvas_contains(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => {
                if self.view_only {
                    let logical = self.editor.viewport().to_logical(screen);
                    if let Some(node_id) = self.editor.graph().node_at(logical).cloned() {
                        self.editor.select(Some(node_id));
                        return;
                    }
                }
                self.editor.pointer_down(MOUSE_POINTER, screen);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.editor.pointer_move(MOUSE_POINTER, screen);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.editor.pointer_up(MOUSE_POINTER);
            }
            MouseEventKind::Down(MouseButton::Right) if inside && !self.view_only => {
                let node_id = self.editor.create_node_at_screen(screen, NEW_NODE_TEXT);
                self.editor.select(Some(node_id));
            }
            MouseEventKind::ScrollUp if inside => {
                self.editor.wheel(screen, 1.0);
            }
            MouseEventKind::ScrollDown if inside => {
                self.editor.wheel(screen, -1.0);
            }
            _ => {}
        }
    }

    fn undo(&mut self) {
        if !self.editor.undo() {
            self.info("nothing to undo");
        }
    }

    fn redo(&mut self) {
        if !self.editor.redo() {
            self.info("nothing to redo");
        }
    }

    fn save(&mut self) {
        match self.editor.save(self.store.as_mut()) {
            Ok(()) => self.info("saved"),
            Err(err) => {
                tracing::warn!(%err, "save failed");
                self.error(format!("save failed: {err}"));
            }
        }
    }

    fn spawn_child(&mut self, side: Side) {
        let Some(parent) = self.editor.selection().cloned() else {
            self.info("select a node first");
            return;
        };
        match self
            .editor
            .create_node_from_side(&parent, side, NEW_NODE_TEXT)
        {
            Ok((child, _)) => {
                self.editor.select(Some(child));
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    fn cycle_selection(&mut self) {
        let nodes = self.editor.graph().nodes();
        let next = match self.editor.selection() {
            Some(current) => nodes
                .range::<NodeId, _>((
                    std::ops::Bound::Excluded(current),
                    std::ops::Bound::Unbounded,
                ))
                .next()
                .or_else(|| nodes.iter().next()),
            None => nodes.iter().next(),
        }
        .map(|(node_id, _)| node_id.clone());
        self.editor.select(next);
    }

    fn begin_edit(&mut self) {
        let Some(node_id) = self.editor.selection().cloned() else {
            self.info("select a node first");
            return;
        };
        let buffer = self
            .editor
            .graph()
            .node(&node_id)
            .map(|node| node.text().to_owned())
            .unwrap_or_default();
        self.mode = Mode::EditText { node_id, buffer };
    }

    fn canvas_contains(&self, column: u16, row: u16) -> bool {
        column >= self.canvas.x
            && column < self.canvas.x + self.canvas.width
            && row >= self.canvas.y
            && row < self.canvas.y + self.canvas.height
    }

    /// Center of a terminal cell in screen units. Cells outside the canvas
    /// map to negative or overshooting coordinates so drags keep tracking.
    fn cell_to_screen(&self, column: u16, row: u16) -> Point {
        let dx = f64::from(column) - f64::from(self.canvas.x);
        let dy = f64::from(row) - f64::from(self.canvas.y);
        Point::new(
            (dx + 0.5) * CELL_WIDTH_PX,
            (dy + 0.5) * CELL_HEIGHT_PX,
        )
    }

    fn canvas_center(&self) -> Point {
        Point::new(
            f64::from(self.canvas.width) * CELL_WIDTH_PX / 2.0,
            f64::from(self.canvas.height) * CELL_HEIGHT_PX / 2.0,
        )
    }
}

pub(crate) fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.size());

    let editing = matches!(app.mode, Mode::EditText { .. });
    let title = if app.view_only {
        " mind map (view) "
    } else {
        " mind map "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.canvas_border_style(editing))
        .title(title);
    app.canvas = block.inner(chunks[0]);

    draw_canvas(frame, app, block, chunks[0]);
    frame.render_widget(status_line(app), chunks[1]);
}

fn draw_canvas(frame: &mut Frame, app: &App, block: Block<'_>, area: Rect) {
    let width = f64::from(app.canvas.width) * CELL_WIDTH_PX;
    let height = f64::from(app.canvas.height) * CELL_HEIGHT_PX;
    let diagram = app.editor.diagram();
    let selection = app.editor.selection();
    let theme = &app.theme;

    let connections: Vec<_> = render::connection_views(diagram).collect();
    let nodes: Vec<_> = render::node_views(diagram).collect();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(move |ctx| {
            // Canvas y grows upward; screen y grows downward.
            let flip = |y: f64| height - y;

            for view in &connections {
                let color = theme.connection_color(&view.style.color);
                let dashed = view.style.line_style == "dashed";
                let Some((start, end)) = clip_line(view.start, view.end, width, height) else {
                    continue;
                };
                let phase = view.start.distance_to(start);
                for (from, to) in line_segments(start, end, dashed, phase) {
                    ctx.draw(&CanvasLine {
                        x1: from.x,
                        y1: flip(from.y),
                        x2: to.x,
                        y2: flip(to.y),
                        color,
                    });
                }
            }

            for view in &nodes {
                let selected = selection == Some(view.id);
                ctx.draw(&Rectangle {
                    x: view.position.x,
                    y: flip(view.position.y + view.size.height),
                    width: view.size.width,
                    height: view.size.height,
                    color: theme.node_color(view.style, selected),
                });
            }

            ctx.layer();

            for view in &nodes {
                let selected = selection == Some(view.id);
                let label = fit_label(view.text, view.size.width);
                if label.is_empty() {
                    continue;
                }
                ctx.print(
                    view.position.x + CELL_WIDTH_PX,
                    flip(view.position.y + view.size.height / 2.0),
                    Span::styled(label, theme.label_style(view.central, selected)),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn status_line(app: &App) -> Paragraph<'static> {
    if let Mode::EditText { buffer, .. } = &app.mode {
        return Paragraph::new(format!(" edit: {buffer}_   enter keeps, esc drops"))
            .style(app.theme.status_style());
    }

    let editor = &app.editor;
    let graph = editor.graph();
    let mut summary = format!(
        " rev {} | zoom {:.2}x | {} nodes {} links",
        editor.rev(),
        editor.viewport().zoom(),
        graph.node_count(),
        graph.connection_count(),
    );
    if let Some(node) = editor.selection().and_then(|node_id| graph.node(node_id)) {
        summary.push_str(&format!(" | [{}]", node.text()));
    }
    if editor.is_dirty() {
        summary.push_str(" | modified");
    }

    let mut spans = vec![Span::raw(summary)];
    match &app.status {
        Some(status) if status.error => {
            spans.push(Span::styled(
                format!(" | {}", status.text),
                app.theme.error_style(),
            ));
        }
        Some(status) => spans.push(Span::raw(format!(" | {}", status.text))),
        None if app.view_only => spans.push(Span::raw(" | view mode  v edit  q quit")),
        None => spans.push(Span::raw(
            " | n new  HJKL child  e edit  x delete  u/r undo/redo  v view  s save  q quit",
        )),
    }

    Paragraph::new(Line::from(spans)).style(app.theme.status_style())
}

/// Keys that change the diagram; view mode ignores them.
fn mutates_diagram(key: &KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('z' | 'y' | 'n') if ctrl => true,
        KeyCode::Char('c') if ctrl => false,
        KeyCode::Char('u' | 'r' | 'x' | 'n' | 'e' | 'H' | 'J' | 'K' | 'L') => true,
        KeyCode::Delete | KeyCode::Enter => true,
        _ => false,
    }
}

/// Truncates a label to the box width, leaving one cell of padding per side.
fn fit_label(text: &str, box_width: f64) -> String {
    let cells = (box_width / CELL_WIDTH_PX).floor() - 2.0;
    if cells < 1.0 {
        return String::new();
    }
    let max = cells as usize;
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() <= max {
        return first_line.to_owned();
    }
    let mut label: String = first_line.chars().take(max.saturating_sub(1)).collect();
    label.push('~');
    label
}

/// Clips a line to `[0, width] x [0, height]`; `None` when nothing of it is
/// visible.
fn clip_line(start: Point, end: Point, width: f64, height: f64) -> Option<(Point, Point)> {
    if !start.is_finite() || !end.is_finite() {
        return None;
    }
    let delta = end - start;
    let mut enter = 0.0_f64;
    let mut leave = 1.0_f64;
    let edges = [
        (-delta.x, start.x),
        (delta.x, width - start.x),
        (-delta.y, start.y),
        (delta.y, height - start.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            enter = enter.max(t);
        } else {
            leave = leave.min(t);
        }
        if enter > leave {
            return None;
        }
    }
    Some((start + delta * enter, start + delta * leave))
}

/// Splits a line into drawable pieces; dashed lines alternate on and off.
///
/// `phase` is how far along the unclipped line `start` lies, so a clipped
/// line keeps its dash pattern in place.
fn line_segments(start: Point, end: Point, dashed: bool, phase: f64) -> Vec<(Point, Point)> {
    let length = start.distance_to(end);
    if !dashed || length <= f64::EPSILON {
        return vec![(start, end)];
    }
    let period = DASH_PX * 2.0;
    let into = phase.rem_euclid(period);
    let step = (end - start) / length;
    let mut segments = Vec::new();
    let mut offset = if into < DASH_PX { -into } else { period - into };
    while offset < length {
        let from = offset.max(0.0);
        let stop = (offset + DASH_PX).min(length);
        segments.push((start + step * from, start + step * stop));
        offset += period;
    }
    segments
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}

#[cfg(test)]
mod tests;
