//! Root layout computation: documents panel + chat panel + status bar.

use ratatui::layout::{Constraint, Layout, Rect};

use super::events::Focus;

/// Width of the documents panel when shown beside the chat.
pub const DOCUMENTS_PANEL_WIDTH: u16 = 44;
/// Below this terminal width only the focused panel is drawn.
pub const SPLIT_THRESHOLD: u16 = 100;

/// Computed layout regions for a single frame.
pub struct AppLayout {
    /// Documents panel (None when only the chat fits).
    pub documents: Option<Rect>,
    /// Chat panel (None when only the documents panel fits).
    pub chat: Option<Rect>,
    /// Status bar (bottom row).
    pub status: Rect,
}

impl AppLayout {
    /// Compute layout regions from the terminal area and the focused panel.
    pub fn compute(area: Rect, focus: Focus) -> Self {
        let rows = Layout::vertical([
            Constraint::Min(1),    // Panels
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        let content = rows[0];
        let status = rows[1];

        if content.width < SPLIT_THRESHOLD {
            return match focus {
                Focus::Chat => AppLayout {
                    documents: None,
                    chat: Some(content),
                    status,
                },
                Focus::Documents => AppLayout {
                    documents: Some(content),
                    chat: None,
                    status,
                },
            };
        }

        let cols = Layout::horizontal([
            Constraint::Length(DOCUMENTS_PANEL_WIDTH),
            Constraint::Min(1),
        ])
        .split(content);

        AppLayout {
            documents: Some(cols[0]),
            chat: Some(cols[1]),
            status,
        }
    }
}
