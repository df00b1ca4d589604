//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`sections`]: List of report dates, newest first
//! - [`charts`]: Regression charts of the selected date
//! - [`common`]: Shared components (header, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────┬───────────────────────────┤
//! │ Dates    │ Charts                    │
//! │          │ (charts::render)          │
//! │          │                           │
//! ├──────────┴───────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top: common::render_help
//! ```

pub mod charts;
pub mod common;
pub mod sections;
pub mod theme;

pub use theme::Theme;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::Frame;

use crate::app::App;

/// Width of the date list, borders included.
pub const SECTION_LIST_WIDTH: u16 = 22;

/// First terminal row holding a date (below the header and the list border).
pub const SECTION_LIST_TOP: u16 = 2;

/// Render the whole dashboard into `area`.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    let columns = Layout::horizontal([
        Constraint::Length(SECTION_LIST_WIDTH),
        Constraint::Min(30),
    ])
    .split(rows[1]);

    common::render_header(frame, app, rows[0]);
    sections::render(frame, app, columns[0]);
    charts::render(frame, app, columns[1]);
    common::render_status_bar(frame, app, rows[2]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
