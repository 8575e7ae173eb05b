//! Line chart and legend table for the active view.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{axis_labels, format_value, ChartData};

/// Render the chart for the current view, or a placeholder.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chart = match app.current_chart() {
        Some(chart) if !chart.is_empty() => chart,
        _ => {
            render_placeholder(frame, app, area);
            return;
        }
    };

    let legend_height = (chart.stats.len() as u16 + 3).min(area.height / 3).max(4);
    let chunks = Layout::vertical([Constraint::Min(6), Constraint::Length(legend_height)]).split(area);

    render_chart(frame, app, chart, chunks[0]);
    render_legend(frame, app, chart, chunks[1]);
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match app.load_error {
        Some(ref err) => (format!("No data yet\n\n{}", err), Style::default().fg(app.theme.error)),
        None => ("No data yet".to_string(), Style::default().add_modifier(Modifier::DIM)),
    };

    let block = Block::default()
        .title(format!(" {} ", app.current_view.label()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let y = inner.y + inner.height.saturating_sub(3) / 2;
    let centered = Rect::new(inner.x, y, inner.width, inner.height.min(3));
    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).style(style),
        centered,
    );
}

fn render_chart(frame: &mut Frame, app: &App, chart: &ChartData, area: Rect) {
    let points: Vec<Vec<(f64, f64)>> = chart.keys.iter().map(|k| chart.points(k)).collect();

    let datasets: Vec<Dataset> = chart
        .keys
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (key, data))| {
            Dataset::default()
                .name(key.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(i)))
                .data(data)
        })
        .collect();

    let (x_min, x_max) = chart.time_bounds().unwrap_or((0, 1));
    let x_bounds = if x_min == x_max {
        [x_min as f64 - 1.0, x_max as f64 + 1.0]
    } else {
        [x_min as f64, x_max as f64]
    };

    let label_count = if area.width > 100 { 5 } else { 3 };
    let x_labels: Vec<Span> = axis_labels(&chart.rows, &chart.window, &app.axis, label_count)
        .into_iter()
        .map(Span::raw)
        .collect();

    let (y_min, y_max) = chart.value_bounds();
    let y_labels: Vec<Span> = [y_min, (y_min + y_max) / 2.0, y_max]
        .iter()
        .map(|v| Span::raw(format_value(chart.metric_type, *v)))
        .collect();

    let axis_style = Style::default().fg(app.theme.border);
    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!(
                    " {} · {} ",
                    app.current_view.label(),
                    chart.metric_type.policy().unit.suffix()
                ))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(Axis::default().style(axis_style).bounds(x_bounds).labels(x_labels))
        .y_axis(Axis::default().style(axis_style).bounds([y_min, y_max]).labels(y_labels))
        .hidden_legend_constraints((Constraint::Ratio(0, 1), Constraint::Ratio(0, 1)));

    frame.render_widget(widget, area);
}

fn render_legend(frame: &mut Frame, app: &App, chart: &ChartData, area: Rect) {
    let header = Row::new(["Series", "Latest", "Min", "Max", "Avg"]).style(app.theme.header);

    let rows: Vec<Row> = chart
        .stats
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let fmt = |v: f64| format_value(chart.metric_type, v);
            Row::new(vec![
                Cell::from(format!("■ {}", s.key)).style(Style::default().fg(app.theme.series_color(i))),
                Cell::from(fmt(s.latest)),
                Cell::from(fmt(s.min)),
                Cell::from(fmt(s.max)),
                Cell::from(fmt(s.avg)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AxisConfig;
    use crate::source::{ChannelSource, MetricsPayload};
    use pikawatch_types::{MetricSeries, RangeToken, TimeWindow};
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app, frame.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn app() -> (tokio::sync::watch::Sender<Option<MetricsPayload>>, App) {
        let (tx, source) = ChannelSource::create("test");
        let app = App::new(
            Box::new(source),
            Some("agent-1".to_string()),
            None,
            TimeWindow::Range(RangeToken::H1),
            AxisConfig::default(),
        );
        (tx, app)
    }

    #[test]
    fn test_placeholder_without_data() {
        let (_tx, app) = app();
        assert!(render_to_string(&app).contains("No data yet"));
    }

    #[test]
    fn test_placeholder_for_empty_series() {
        let (tx, mut app) = app();
        tx.send(Some(MetricsPayload::Series(Vec::new()))).unwrap();
        app.reload_data().unwrap();
        assert!(render_to_string(&app).contains("No data yet"));
    }

    #[test]
    fn test_chart_and_legend() {
        let (tx, mut app) = app();
        tx.send(Some(MetricsPayload::Series(vec![MetricSeries::new("usage")
            .point(1_000, 10.0)
            .point(61_000, 20.0)])))
            .unwrap();
        app.reload_data().unwrap();

        let screen = render_to_string(&app);
        assert!(screen.contains("usage"));
        assert!(screen.contains("20.00%"));
        assert!(!screen.contains("No data yet"));
    }
}
