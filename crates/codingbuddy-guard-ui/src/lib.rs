//! Status line rendering and a terminal color palette, the two
//! interactive-display collaborators named in SPEC_FULL §10.5.

pub mod colors;

use codingbuddy_guard_core::Decision;
use ratatui::style::{Color, Style};

/// Color convention for a decision, following the teacher UI crate's
/// permission-mode coloring (green for auto-approved, yellow otherwise).
pub fn decision_style(decision: Decision) -> Style {
    match decision {
        Decision::Safe => Style::default().fg(Color::Green),
        Decision::Unknown => Style::default().fg(Color::Yellow),
    }
}

fn glyph(decision: Decision) -> &'static str {
    match decision {
        Decision::Safe => "✓",
        Decision::Unknown => "?",
    }
}

/// Formats one status line entry: `<glyph> <command> (<reason>)`.
pub fn format_status_line(command: &str, decision: Decision, reason: &str) -> String {
    format!("{} {command} ({reason})", glyph(decision))
}
