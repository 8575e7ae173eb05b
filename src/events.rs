use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};
use crate::ui::common::tab_at;

/// Row of the tab bar, below the header.
const TAB_ROW: u16 = 1;

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

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // Direct view access: 1-9, then 0 for the tenth tab
        KeyCode::Char(c @ '0'..='9') => {
            let n = c.to_digit(10).unwrap_or(0) as usize;
            let index = if n == 0 { 9 } else { n - 1 };
            if let Some(view) = View::nth(index) {
                app.set_view(view);
            }
        }

        // Time window
        KeyCode::Char(']') | KeyCode::Char('+') => app.next_range(),
        KeyCode::Char('[') | KeyCode::Char('-') => app.prev_range(),

        KeyCode::Char('i') => app.cycle_interface(),

        KeyCode::Char('r') => app.refresh(),

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('e') => {
            let export_path = PathBuf::from("pikawatch_export.json");
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Scroll wheel zooms the time window
        MouseEventKind::ScrollUp => app.prev_range(),
        MouseEventKind::ScrollDown => app.next_range(),

        MouseEventKind::Down(MouseButton::Left) if mouse.row == TAB_ROW => {
            if let Some(view) = tab_at(mouse.column) {
                app.set_view(view);
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.refresh(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AxisConfig;
    use crate::source::ChannelSource;
    use pikawatch_types::{MetricType, RangeToken, TimeWindow};

    fn app() -> App {
        let (_tx, source) = ChannelSource::create("test");
        App::new(
            Box::new(source),
            Some("agent-1".to_string()),
            Some("monitor-1".to_string()),
            TimeWindow::Range(RangeToken::H1),
            AxisConfig::default(),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_digit_selects_view() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('4')));
        assert_eq!(app.current_view, View::Metric(MetricType::Network));
        handle_key_event(&mut app, key(KeyCode::Char('0')));
        assert_eq!(app.current_view, View::Metric(MetricType::ResponseTime));
    }

    #[test]
    fn test_range_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char(']')));
        assert_eq!(app.window, TimeWindow::Range(RangeToken::H3));
        handle_key_event(&mut app, key(KeyCode::Char('-')));
        handle_key_event(&mut app, key(KeyCode::Char('-')));
        assert_eq!(app.window, TimeWindow::Range(RangeToken::M30));
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_tab_click() {
        let mut app = app();
        handle_mouse_event(&mut app, click(9, TAB_ROW));
        assert_eq!(app.current_view, View::Metric(MetricType::Memory));

        // Clicks outside the tab row are ignored
        handle_mouse_event(&mut app, click(0, 5));
        assert_eq!(app.current_view, View::Metric(MetricType::Memory));
    }
}
