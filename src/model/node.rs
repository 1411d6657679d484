// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

use super::geometry::{Point, Size};
use super::ids::ConnectionId;

pub const DEFAULT_FILL: &str = "#ffffff";
pub const DEFAULT_TEXT_COLOR: &str = "#2d3748";
pub const CENTRAL_FILL: &str = "#4a6ee0";
pub const CENTRAL_TEXT_COLOR: &str = "#ffffff";
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// An edge of a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSideError {
    value: String,
}

impl fmt::Display for ParseSideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown side {:?} (expected top/right/bottom/left)", self.value)
    }
}

impl std::error::Error for ParseSideError {}

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top" => Ok(Self::Top),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            other => Err(ParseSideError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Presentation attributes. The engine stores and persists them but never
/// interprets them.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub fill: SmolStr,
    pub text_color: SmolStr,
    pub font_size: f64,
}

impl NodeStyle {
    pub fn for_central(central: bool) -> Self {
        if central {
            Self {
                fill: SmolStr::new_static(CENTRAL_FILL),
                text_color: SmolStr::new_static(CENTRAL_TEXT_COLOR),
                font_size: DEFAULT_FONT_SIZE,
            }
        } else {
            Self::default()
        }
    }

    pub fn apply(&mut self, patch: &NodeStylePatch) {
        if let Some(fill) = &patch.fill {
            self.fill = fill.clone();
        }
        if let Some(text_color) = &patch.text_color {
            self.text_color = text_color.clone();
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
    }
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            fill: SmolStr::new_static(DEFAULT_FILL),
            text_color: SmolStr::new_static(DEFAULT_TEXT_COLOR),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStylePatch {
    pub fill: Option<SmolStr>,
    pub text_color: Option<SmolStr>,
    pub font_size: Option<f64>,
}

/// A box on the canvas.
///
/// `position` is the top-left corner in logical space. `incident` mirrors the
/// connections whose source or target is this node; the graph keeps it in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    position: Point,
    size: Size,
    text: String,
    style: NodeStyle,
    central: bool,
    incident: BTreeSet<ConnectionId>,
}

impl Node {
    pub fn new(position: Point, size: Size, text: impl Into<String>, central: bool) -> Self {
        Self {
            position,
            size,
            text: text.into(),
            style: NodeStyle::for_central(central),
            central,
            incident: BTreeSet::new(),
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn style(&self) -> &NodeStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: NodeStyle) {
        self.style = style;
    }

    pub fn style_mut(&mut self) -> &mut NodeStyle {
        &mut self.style
    }

    pub fn is_central(&self) -> bool {
        self.central
    }

    pub fn set_central(&mut self, central: bool) {
        self.central = central;
    }

    pub fn incident(&self) -> &BTreeSet<ConnectionId> {
        &self.incident
    }

    pub(crate) fn attach(&mut self, connection_id: ConnectionId) {
        self.incident.insert(connection_id);
    }

    pub(crate) fn detach(&mut self, connection_id: &ConnectionId) {
        self.incident.remove(connection_id);
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    /// Midpoint of the given edge in logical space.
    pub fn side_anchor(&self, side: Side) -> Point {
        let Point { x, y } = self.position;
        let Size { width, height } = self.size;
        match side {
            Side::Top => Point::new(x + width / 2.0, y),
            Side::Right => Point::new(x + width, y + height / 2.0),
            Side::Bottom => Point::new(x + width / 2.0, y + height),
            Side::Left => Point::new(x, y + height / 2.0),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + self.size.width
            && point.y >= self.position.y
            && point.y <= self.position.y + self.size.height
    }
}
