// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;

use ratatui::style::{Color, Modifier, Style};

use crate::model::NodeStyle;

/// Terminal colors for the canvas and status line.
///
/// Node colors come from the diagram's own hex attributes unless the
/// `NO_COLOR` convention asks for a monochrome screen.
#[derive(Debug, Clone, Default)]
pub(crate) struct TuiTheme {
    monochrome: bool,
}

impl TuiTheme {
    pub(crate) fn from_env() -> Self {
        let monochrome = env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
        Self { monochrome }
    }

    #[cfg(test)]
    pub(crate) fn monochrome() -> Self {
        Self { monochrome: true }
    }

    pub(crate) fn canvas_border_style(&self, editing: bool) -> Style {
        if editing && !self.monochrome {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    }

    /// Outline color for a node box.
    pub(crate) fn node_color(&self, style: &NodeStyle, selected: bool) -> Color {
        if self.monochrome {
            return Color::Reset;
        }
        if selected {
            return Color::Yellow;
        }
        parse_hex_color(&style.fill)
            .filter(|color| *color != Color::Rgb(0xff, 0xff, 0xff))
            .unwrap_or(Color::Gray)
    }

    pub(crate) fn label_style(&self, central: bool, selected: bool) -> Style {
        let mut style = Style::default();
        if central {
            style = style.add_modifier(Modifier::BOLD);
        }
        if selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }

    pub(crate) fn connection_color(&self, stroke: &str) -> Color {
        if self.monochrome {
            return Color::Reset;
        }
        parse_hex_color(stroke).unwrap_or(Color::DarkGray)
    }

    pub(crate) fn status_style(&self) -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    pub(crate) fn error_style(&self) -> Style {
        if self.monochrome {
            self.status_style().add_modifier(Modifier::BOLD)
        } else {
            self.status_style().fg(Color::Red)
        }
    }
}

/// Parses `#RRGGBB` or `#RGB`.
pub(crate) fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let rgb = u32::from_str_radix(hex, 16).ok()?;
            Some(Color::Rgb(
                ((rgb >> 16) & 0xFF) as u8,
                ((rgb >> 8) & 0xFF) as u8,
                (rgb & 0xFF) as u8,
            ))
        }
        3 => {
            let mut channels = hex
                .chars()
                .filter_map(|ch| ch.to_digit(16))
                .map(|digit| (digit * 0x11) as u8);
            Some(Color::Rgb(channels.next()?, channels.next()?, channels.next()?))
        }
        _ => None,
    }
}
