//! Common UI components: header bar, status bar and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::ValueScale;

/// Render the header bar: report size, scale and source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" HISTWATCH ", Style::default().add_modifier(Modifier::BOLD));

    let Some(ref data) = app.data else {
        let line = Line::from(vec![title, Span::raw("│ Loading...")]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let scale = match app.scale {
        ValueScale::Percent => "percent",
        ValueScale::Raw => "raw",
    };

    let mut spans = vec![
        title,
        Span::raw("│ "),
        Span::styled(
            data.sections.len().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" dates "),
        Span::styled(
            data.chart_count().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" charts │ "),
        Span::raw(format!("scale: {} │ ", scale)),
        Span::styled(
            app.source_description().to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ];

    if !app.filter_text.is_empty() || app.filter_active {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("/{}", app.filter_text),
            Style::default().fg(app.theme.highlight),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the status bar at the bottom.
///
/// Shows temporary messages first, then load errors, then controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.load_error {
        let paragraph = Paragraph::new(format!(" Error: {} | r:retry q:quit", err))
            .style(Style::default().fg(app.theme.error));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let controls = if app.filter_active {
            "Type to filter | Enter:apply Esc:cancel"
        } else {
            "↑↓:date ←→:chart /:filter r:reload e:export ?:help q:quit"
        };
        format!(
            " Updated {:.1}s ago | {}",
            data.last_updated.elapsed().as_secs_f64(),
            controls
        )
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(" Navigation", bold)]),
        Line::from("  ↑/↓ j/k     Select date"),
        Line::from("  ←/→ h/l     Select chart"),
        Line::from("  PgUp/PgDn   Jump 10 dates"),
        Line::from("  Home/End    First/last date"),
        Line::from(""),
        Line::from(vec![Span::styled(" Filter", bold)]),
        Line::from("  /           Filter metrics by name"),
        Line::from("  c / Esc     Clear filter"),
        Line::from(""),
        Line::from(vec![Span::styled(" General", bold)]),
        Line::from("  r           Reload data"),
        Line::from("  e           Export charts to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 20u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
