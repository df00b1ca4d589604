//! Regression chart rendering.
//!
//! Each metric of the selected date gets a line chart with two series:
//! the regression in red and the reference in the theme's foreground.
//! Charts are paged so the focused one is always on screen.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{ChartTable, RegressionChart};

/// Minimum rows a single chart needs to be readable.
const MIN_CHART_HEIGHT: u16 = 10;

/// How many charts fit in `height` rows.
pub fn charts_per_page(height: u16) -> usize {
    usize::from((height / MIN_CHART_HEIGHT).max(1))
}

/// Index of the first chart on the page holding `selected`.
pub fn page_start(selected: usize, per_page: usize) -> usize {
    selected - selected % per_page.max(1)
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let charts = app.visible_charts();

    if charts.is_empty() {
        let message = match (&app.data, app.filter_text.is_empty()) {
            (None, _) => "Waiting for data...",
            (Some(_), false) => "No metric matches the filter",
            (Some(_), true) => "No regressions for this date",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let per_page = charts_per_page(area.height);
    let start = page_start(app.selected_chart, per_page);
    let page: Vec<&RegressionChart> = charts.iter().skip(start).take(per_page).copied().collect();

    let slots = Layout::vertical(vec![Constraint::Ratio(1, per_page as u32); per_page]).split(area);

    for (offset, (chart, slot)) in page.iter().zip(slots.iter()).enumerate() {
        let index = start + offset;
        render_chart(frame, app, chart, *slot, index == app.selected_chart, (index, charts.len()));
    }
}

fn render_chart(
    frame: &mut Frame,
    app: &App,
    chart: &RegressionChart,
    area: Rect,
    focused: bool,
    (index, total): (usize, usize),
) {
    let table = chart.table(app.scale);
    let regression = table.regression_points();
    let reference = table.reference_points();

    let datasets = vec![
        Dataset::default()
            .name("Regression")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.regression))
            .data(&regression),
        Dataset::default()
            .name("Reference")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.reference))
            .data(&reference),
    ];

    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", chart.metric),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("[{}/{}] ", index + 1, total)),
    ]);
    let mut block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.chart_border(focused));
    if !chart.description().is_empty() {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {} ", chart.description()),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("Bucket")
                .style(Style::default().fg(app.theme.border))
                .bounds(table.x_bounds())
                .labels(x_labels(&table)),
        )
        .y_axis(
            Axis::default()
                .title(app.scale.label())
                .style(Style::default().fg(app.theme.border))
                .bounds(table.y_bounds())
                .labels(y_labels(table.y_bounds())),
        )
        .legend_position(Some(LegendPosition::TopRight));

    frame.render_widget(widget, area);
}

/// First, middle and last bucket labels.
pub fn x_labels(table: &ChartTable) -> Vec<String> {
    let rows = &table.rows;
    match rows.len() {
        0 => Vec::new(),
        1 => vec![rows[0].label.clone()],
        2 => vec![rows[0].label.clone(), rows[1].label.clone()],
        n => vec![
            rows[0].label.clone(),
            rows[n / 2].label.clone(),
            rows[n - 1].label.clone(),
        ],
    }
}

fn y_labels([lo, hi]: [f64; 2]) -> Vec<String> {
    [lo, (lo + hi) / 2.0, hi]
        .iter()
        .map(|v| format!("{:.1}", v))
        .collect()
}
