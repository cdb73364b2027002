use std::cmp::min;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::model::BoardStatus;

/// Colours for one theme; swapped wholesale when the user toggles dark mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub base: Color,
    pub panel: Color,
    pub highlight: Color,
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
}

pub const DARK: Palette = Palette {
    base: Color::Rgb(14, 17, 23),
    panel: Color::Rgb(22, 26, 34),
    highlight: Color::Rgb(32, 37, 47),
    accent: Color::Rgb(120, 161, 255),
    text: Color::Rgb(220, 224, 232),
    muted: Color::DarkGray,
};

pub const LIGHT: Palette = Palette {
    base: Color::Rgb(244, 245, 247),
    panel: Color::Rgb(255, 255, 255),
    highlight: Color::Rgb(221, 230, 248),
    accent: Color::Rgb(36, 88, 196),
    text: Color::Rgb(33, 37, 41),
    muted: Color::Rgb(120, 124, 130),
};

pub fn palette(dark_mode: bool) -> Palette {
    if dark_mode {
        DARK
    } else {
        LIGHT
    }
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = min(width, area.width);
    let h = min(height, area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

pub fn inset_rect(area: Rect, padding: u16) -> Rect {
    if area.width == 0 || area.height == 0 {
        return area;
    }
    let px = padding.min(area.width / 2);
    let py = padding.min(area.height / 2);
    Rect {
        x: area.x + px,
        y: area.y + py,
        width: area.width.saturating_sub(px * 2),
        height: area.height.saturating_sub(py * 2),
    }
}

pub fn accent_title(text: &str, palette: Palette) -> Line<'static> {
    Line::from(vec![Span::styled(
        text.to_owned(),
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
    )])
}

pub fn status_style(status: Option<BoardStatus>) -> Style {
    match status {
        Some(BoardStatus::Completed) => Style::default().fg(Color::Green),
        Some(BoardStatus::Active) => Style::default().fg(Color::Cyan),
        Some(BoardStatus::Dependent) => Style::default().fg(Color::Magenta),
        Some(BoardStatus::AwaitingResource) => Style::default().fg(Color::Yellow),
        None => Style::default().fg(Color::DarkGray),
    }
}

pub fn status_badge(status: Option<BoardStatus>) -> &'static str {
    match status {
        Some(BoardStatus::Completed) => "✔",
        Some(BoardStatus::Active) => "▶",
        Some(BoardStatus::Dependent) => "⧗",
        Some(BoardStatus::AwaitingResource) => "○",
        None => "·",
    }
}

/// Clamps `index` into `0..len`, or 0 for an empty list.
pub fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index.min(len - 1)
    }
}

pub fn build_help_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("← / →", "Move between buckets"),
        ("↑ / ↓ or j / k", "Move selection"),
        ("Enter", "Open the selected project or task"),
        ("n", "New project"),
        ("/", "Search projects and tasks"),
        (":", "Open a task by id"),
        ("1 / 2 / 3", "Projects, Jobs, Resources"),
        ("r", "Reload from the store"),
        ("t", "Toggle dark mode"),
        ("Tab / Shift+Tab", "Move between editor fields"),
        ("Ctrl+S", "Save the open editor"),
        ("Ctrl+D", "Delete the edited project or task"),
        ("Ctrl+N", "Add a task to the open project"),
        ("Ctrl+R", "Add a resource to the open task"),
        ("Ctrl+T / Ctrl+F", "Start or finish the open task now"),
        ("Delete / x", "Remove the selected list entry"),
        ("Esc", "Cancel or close"),
        ("q", "Quit"),
    ]
}
