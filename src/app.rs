//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::NaiveDate;
use ratatui::widgets::ListState;

use crate::data::{DashboardData, DateSection, RegressionChart, ValueScale};
use crate::export::write_export;
use crate::source::DataSource;
use crate::ui::Theme;

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<DashboardData>,
    pub load_error: Option<String>,
    pub scale: ValueScale,

    // Navigation state
    pub selected_section: usize,
    pub selected_chart: usize,
    /// Date list widget state; keeps the scroll offset between frames.
    pub section_list: ListState,
    /// Date to jump to once data arrives.
    pending_anchor: Option<NaiveDate>,

    // Metric name filter
    pub filter_text: String,
    pub filter_active: bool,

    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(source: Box<dyn DataSource>, scale: ValueScale) -> Self {
        Self {
            running: true,
            show_help: false,
            source,
            data: None,
            load_error: None,
            scale,
            selected_section: 0,
            selected_chart: 0,
            section_list: ListState::default(),
            pending_anchor: None,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Open the section for `date` once the report is loaded.
    pub fn with_anchor(mut self, date: NaiveDate) -> Self {
        self.pending_anchor = Some(date);
        self
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < Duration::from_secs(3) => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source and regroup if a new report arrived.
    ///
    /// Returns `true` when the displayed data changed. The selected date is
    /// kept across reloads when it is still present.
    pub fn reload_data(&mut self) -> bool {
        let report = self.source.poll();
        self.load_error = self.source.error().map(str::to_string);

        let Some(report) = report else {
            return false;
        };

        let previous = self.selected_section().map(|s| s.date);
        let data = DashboardData::from_report(&report);

        let anchor = self.pending_anchor.take().or(previous);
        let anchored = anchor.and_then(|date| data.find_date(date));
        match anchored {
            Some(index) if Some(data.sections[index].date) != previous => {
                self.selected_section = index;
                self.selected_chart = 0;
            }
            Some(index) => self.selected_section = index,
            None => {
                self.selected_section = self
                    .selected_section
                    .min(data.sections.len().saturating_sub(1));
            }
        }

        self.data = Some(data);
        self.clamp_chart();
        true
    }

    /// Ask the source to load again, then poll it.
    pub fn force_reload(&mut self) {
        self.source.request_reload();
        self.reload_data();
        self.set_status_message(format!("Reloading {}", self.source.description()));
    }

    pub fn section_count(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.sections.len())
    }

    pub fn selected_section(&self) -> Option<&DateSection> {
        self.data.as_ref()?.sections.get(self.selected_section)
    }

    /// Charts of the selected date that match the filter.
    pub fn visible_charts(&self) -> Vec<&RegressionChart> {
        self.selected_section()
            .map(|section| {
                section
                    .charts
                    .iter()
                    .filter(|c| self.matches_filter(&c.metric))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn selected_chart(&self) -> Option<&RegressionChart> {
        self.visible_charts().get(self.selected_chart).copied()
    }

    fn clamp_chart(&mut self) {
        let max = self.visible_charts().len().saturating_sub(1);
        self.selected_chart = self.selected_chart.min(max);
    }

    /// Section shown on `row` of the date list, counting from its first
    /// visible row.
    pub fn section_at_row(&self, row: usize) -> Option<usize> {
        let index = self.section_list.offset() + row;
        (index < self.section_count()).then_some(index)
    }

    pub fn select_section(&mut self, index: usize) {
        self.set_section(index);
    }

    fn set_section(&mut self, index: usize) {
        let index = index.min(self.section_count().saturating_sub(1));
        if index != self.selected_section {
            self.selected_section = index;
            self.selected_chart = 0;
        }
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move the date selection down by n sections.
    pub fn select_next_n(&mut self, n: usize) {
        self.set_section(self.selected_section.saturating_add(n));
    }

    pub fn select_prev_n(&mut self, n: usize) {
        self.set_section(self.selected_section.saturating_sub(n));
    }

    pub fn select_first(&mut self) {
        self.set_section(0);
    }

    pub fn select_last(&mut self) {
        self.set_section(usize::MAX);
    }

    pub fn next_chart(&mut self) {
        self.selected_chart += 1;
        self.clamp_chart();
    }

    pub fn prev_chart(&mut self) {
        self.selected_chart = self.selected_chart.saturating_sub(1);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.selected_chart = 0;
    }

    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_chart = 0;
    }

    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.selected_chart = 0;
    }

    /// Case-insensitive substring match on a metric name.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Write the chart tables of all dates to `path`.
    pub fn export_view(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        write_export(path, data, self.scale)
    }
}
