use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::App;

/// File written by the `e` key.
pub const EXPORT_FILE: &str = "histwatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        // Dates
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Charts within the selected date
        KeyCode::Left | KeyCode::Char('h') => app.prev_chart(),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.next_chart(),
        KeyCode::BackTab => app.prev_chart(),

        KeyCode::Char('r') => app.force_reload(),
        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') | KeyCode::Esc => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_view(&export_path) {
                Ok(()) => app.set_status_message(format!("Exported to {}", export_path.display())),
                Err(e) => app.set_status_message(format!("Export failed: {}", e)),
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.filter_active = false,

        // Keep text but exit input mode
        KeyCode::Esc => app.cancel_filter(),

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_filter(),

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => app.filter_push(c),

        _ => {}
    }
}

/// Handle mouse events.
///
/// `list_top` is the first row of the date list and `list_width` its width;
/// clicks right of the list select nothing.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, list_top: u16, list_width: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            if mouse.column < list_width && mouse.row >= list_top {
                let row = (mouse.row - list_top) as usize;
                if let Some(index) = app.section_at_row(row) {
                    app.select_section(index);
                }
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app_with, THREE_DATES};
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn loaded() -> App {
        let mut app = app_with(&[THREE_DATES]);
        app.reload_data();
        app
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = loaded();
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.selected_section, 1);
        handle_key_event(&mut app, key(KeyCode::Char('l')));
        assert_eq!(app.selected_chart, 1);
        handle_key_event(&mut app, key(KeyCode::Left));
        assert_eq!(app.selected_chart, 0);
        handle_key_event(&mut app, key(KeyCode::End));
        assert_eq!(app.selected_section, 2);
        handle_key_event(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.selected_section, 1);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = loaded();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_filter_input() {
        let mut app = loaded();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert!(app.filter_active);
        for c in "gc".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        // 'q' is text while filtering
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.filter_text, "gcq");

        handle_key_event(&mut app, key(KeyCode::Backspace));
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.filter_active);
        assert_eq!(app.filter_text, "gc");

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(app.filter_text.is_empty());
    }

    #[test]
    fn test_mouse_click_selects_date() {
        let mut app = loaded();
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, click, 2, 20);
        assert_eq!(app.selected_section, 2);

        let scroll = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 40,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, scroll, 2, 20);
        assert_eq!(app.selected_section, 1);
    }

    #[test]
    fn test_mouse_click_accounts_for_list_scroll() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let dates: Vec<String> = (1..=30)
            .map(|day| {
                format!(
                    r#""2015-06-{day:02}": {{"GC_MS": {{"buckets": [0, 1], "regression": [0.4, 0.6], "reference": [0.5, 0.5]}}}}"#
                )
            })
            .collect();
        let json = format!("{{{}}}", dates.join(","));
        let mut app = app_with(&[json.as_str()]);
        app.reload_data();
        app.select_last();

        // Eight visible dates, so the list has to scroll to show the last one
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|frame| crate::ui::render(frame, &mut app, frame.area()))
            .unwrap();
        let offset = app.section_list.offset();
        assert!(offset > 0);

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: crate::ui::SECTION_LIST_TOP,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, click, crate::ui::SECTION_LIST_TOP, 20);
        assert_eq!(app.selected_section, offset);
    }
}
