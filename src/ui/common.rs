//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_duration;

/// Render the header bar: source, entity and active window.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let entity = match app.current_view.endpoint() {
        pikawatch_client::Endpoint::MonitorHistory => {
            format!("monitor {}", app.monitor.as_deref().unwrap_or("-"))
        }
        _ => format!("agent {}", app.agent.as_deref().unwrap_or("-")),
    };

    let (status_icon, status_style) = if app.load_error.is_some() {
        ("●", Style::default().fg(app.theme.error))
    } else if app.current_chart().is_some() {
        ("●", Style::default().fg(app.theme.highlight))
    } else {
        ("○", Style::default().add_modifier(Modifier::DIM))
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", status_icon), status_style),
        Span::styled("PIKA ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::raw(app.source_description().to_string()),
        Span::raw(" │ "),
        Span::styled(entity, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" │ "),
        Span::raw(app.window.to_string()),
    ];

    if let Some(ref iface) = app.interface {
        spans.push(Span::raw(" │ if "));
        spans.push(Span::styled(iface.clone(), Style::default().fg(app.theme.highlight)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL.iter().map(|v| Line::from(v.tab_title())).collect();
    let selected = View::ALL
        .iter()
        .position(|v| *v == app.current_view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|")
        .padding("", "");

    frame.render_widget(tabs, area);
}

/// Tab under column `col` of the tab bar, matching [`render_tabs`] layout.
pub fn tab_at(col: u16) -> Option<View> {
    let mut start = 0u16;
    for view in View::ALL {
        let width = view.tab_title().chars().count() as u16;
        if col >= start && col < start + width {
            return Some(view);
        }
        // One column for the divider
        start += width + 1;
    }
    None
}

/// Render the status bar at the bottom.
///
/// Shows: data age, available controls. Also displays temporary status
/// messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "Tab:view [/]:range i:iface r:refresh e:export ?:help q:quit";

    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else if let Some(chart) = app.current_chart() {
        format!(
            " {} | {} points | Updated {} ago | {}",
            app.current_view.label(),
            chart.rows.len(),
            format_duration(chart.age()),
            controls,
        )
    } else {
        format!(" Loading... | {}", controls)
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  Tab         Next view"),
        Line::from("  1-9, 0      Jump to view"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Time Window",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ] / +       Longer range"),
        Line::from("  [ / -       Shorter range"),
        Line::from("  i           Cycle interface"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
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

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
