//! Date list rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::App;

/// Render one row per report date; the selected date is highlighted.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(" Dates ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(ref data) = app.data else {
        frame.render_widget(block, area);
        return;
    };

    let items: Vec<ListItem> = data
        .sections
        .iter()
        .map(|section| {
            let matching = section
                .charts
                .iter()
                .filter(|c| app.matches_filter(&c.metric))
                .count();
            let count_style = if matching == 0 {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {} ", section.anchor())),
                Span::styled(format!("{:>3}", matching), count_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.selected);

    let selected = (!data.sections.is_empty()).then_some(app.selected_section);
    app.section_list.select(selected);
    frame.render_stateful_widget(list, area, &mut app.section_list);
}
