//! Application state and navigation logic.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use pikawatch_client::{Endpoint, MetricsQuery};
use pikawatch_types::{MetricType, RangeToken, TimeWindow};
use tracing::debug;

use crate::data::{AxisConfig, ChartData};
use crate::source::{MetricsPayload, MetricsSource, QueryKey};
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// One agent metric type, or monitor response time.
    Metric(MetricType),
    /// Upload/download per network interface.
    Interfaces,
}

impl Default for View {
    fn default() -> Self {
        View::Metric(MetricType::Cpu)
    }
}

impl View {
    /// All views, in tab order.
    pub const ALL: [View; 10] = [
        View::Metric(MetricType::Cpu),
        View::Metric(MetricType::Memory),
        View::Metric(MetricType::Disk),
        View::Metric(MetricType::Network),
        View::Interfaces,
        View::Metric(MetricType::DiskIo),
        View::Metric(MetricType::Gpu),
        View::Metric(MetricType::Temperature),
        View::Metric(MetricType::Connections),
        View::Metric(MetricType::ResponseTime),
    ];

    fn index(self) -> usize {
        View::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        View::ALL[(self.index() + View::ALL.len() - 1) % View::ALL.len()]
    }

    /// View at a 0-based tab position.
    pub fn nth(n: usize) -> Option<Self> {
        View::ALL.get(n).copied()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Metric(MetricType::Temperature) => "Temp",
            View::Metric(MetricType::Connections) => "Conns",
            View::Metric(MetricType::ResponseTime) => "Latency",
            View::Metric(t) => t.label(),
            View::Interfaces => "Interfaces",
        }
    }

    /// Tab title including its shortcut digit.
    pub fn tab_title(&self) -> String {
        format!(" {}:{} ", (self.index() + 1) % 10, self.label())
    }

    pub fn metric_type(&self) -> MetricType {
        match self {
            View::Metric(t) => *t,
            View::Interfaces => MetricType::Network,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            View::Interfaces => Endpoint::NetworkByInterface,
            View::Metric(t) if t.is_monitor() => Endpoint::MonitorHistory,
            View::Metric(_) => Endpoint::AgentMetrics,
        }
    }
}

impl From<MetricType> for View {
    fn from(t: MetricType) -> Self {
        View::Metric(t)
    }
}

/// Build the query key for a view.
///
/// Response time is looked up by monitor id, everything else by agent id.
/// The interface filter only reaches the query for the network view.
pub fn query_key(
    view: View,
    agent: Option<&str>,
    monitor: Option<&str>,
    window: TimeWindow,
    interface: Option<&str>,
) -> Result<QueryKey> {
    let endpoint = view.endpoint();
    let entity = match endpoint {
        Endpoint::MonitorHistory => monitor.ok_or_else(|| anyhow!("no monitor id configured"))?,
        _ => agent.ok_or_else(|| anyhow!("no agent id configured"))?,
    };
    let interface = match view {
        View::Metric(MetricType::Network) => interface.map(str::to_string),
        _ => None,
    };

    let query = MetricsQuery::builder(entity, view.metric_type())
        .window(window)
        .maybe_interface(interface)
        .build()?;
    Ok(QueryKey::new(query, endpoint))
}

/// JSON document describing one chart, used by both export paths.
pub fn export_value(key: &QueryKey, chart: &ChartData) -> serde_json::Value {
    serde_json::json!({
        "query": key.to_string(),
        "metric_type": chart.metric_type.as_str(),
        "window": chart.window.to_string(),
        "series": chart.keys,
        "stats": chart.stats,
        "rows": chart.rows,
    })
}

/// Fetched payload and the chart built from it.
#[derive(Debug)]
struct CachedChart {
    payload: MetricsPayload,
    chart: ChartData,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn MetricsSource>,
    charts: HashMap<QueryKey, CachedChart>,
    pub load_error: Option<String>,

    // Query state
    pub agent: Option<String>,
    pub monitor: Option<String>,
    pub window: TimeWindow,
    pub axis: AxisConfig,
    pub interface: Option<String>,
    pub known_interfaces: Vec<String>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App and request data for the initial view.
    pub fn new(
        source: Box<dyn MetricsSource>,
        agent: Option<String>,
        monitor: Option<String>,
        window: TimeWindow,
        axis: AxisConfig,
    ) -> Self {
        let mut app = Self {
            running: true,
            current_view: View::default(),
            show_help: false,
            source,
            charts: HashMap::new(),
            load_error: None,
            agent,
            monitor,
            window,
            axis,
            interface: None,
            known_interfaces: Vec::new(),
            theme: Theme::dark(),
            status_message: None,
        };
        app.sync_request();
        app
    }

    /// Replace the theme, e.g. with [`Theme::auto_detect`].
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Key for the current view, window and interface.
    pub fn current_key(&self) -> Result<QueryKey> {
        query_key(
            self.current_view,
            self.agent.as_deref(),
            self.monitor.as_deref(),
            self.window,
            self.interface.as_deref(),
        )
    }

    /// Chart for the current key, if it has been fetched.
    pub fn current_chart(&self) -> Option<&ChartData> {
        let key = self.current_key().ok()?;
        self.charts.get(&key).map(|c| &c.chart)
    }

    /// Point the source at the current key.
    fn sync_request(&mut self) {
        match self.current_key() {
            Ok(key) => {
                debug!(key = %key, "requesting");
                self.load_error = None;
                self.source.request(key);
            }
            Err(e) => self.load_error = Some(e.to_string()),
        }
    }

    /// Poll the data source for new data.
    ///
    /// Returns Ok(true) if new data was received, Ok(false) if no new data.
    /// Rows are rebuilt only when the payload for a key actually changed.
    pub fn reload_data(&mut self) -> Result<bool> {
        let Some(update) = self.source.poll() else {
            if let Some(err) = self.source.error() {
                self.load_error = Some(err.to_string());
            }
            return Ok(false);
        };
        self.load_error = None;

        for iface in update.payload.interfaces() {
            if !self.known_interfaces.contains(&iface) {
                self.known_interfaces.push(iface);
            }
        }
        self.known_interfaces.sort();

        if let Some(cached) = self.charts.get_mut(&update.key) {
            if cached.payload == update.payload {
                cached.chart.last_updated = Instant::now();
                return Ok(true);
            }
        }

        let chart = ChartData::from_payload(
            &update.payload,
            update.key.metric_type(),
            update.key.window(),
        );
        self.charts.insert(
            update.key,
            CachedChart {
                payload: update.payload,
                chart,
            },
        );
        Ok(true)
    }

    /// Ask the source to fetch the current key again.
    pub fn refresh(&mut self) {
        self.source.refresh();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        if self.current_view != view {
            self.current_view = view;
            self.sync_request();
        }
    }

    /// Widen the window to the next range token. An explicit window
    /// switches back to the default range.
    pub fn next_range(&mut self) {
        self.set_window(match self.window {
            TimeWindow::Range(token) => TimeWindow::Range(token.next()),
            TimeWindow::Explicit { .. } => TimeWindow::Range(RangeToken::default()),
        });
    }

    /// Narrow the window to the previous range token.
    pub fn prev_range(&mut self) {
        self.set_window(match self.window {
            TimeWindow::Range(token) => TimeWindow::Range(token.prev()),
            TimeWindow::Explicit { .. } => TimeWindow::Range(RangeToken::default()),
        });
    }

    pub fn set_window(&mut self, window: TimeWindow) {
        if self.window != window {
            self.window = window;
            self.sync_request();
        }
    }

    /// Cycle the interface filter: all, then each known interface.
    pub fn cycle_interface(&mut self) {
        let next = match &self.interface {
            None => self.known_interfaces.first().cloned(),
            Some(current) => {
                let pos = self.known_interfaces.iter().position(|i| i == current);
                pos.and_then(|p| self.known_interfaces.get(p + 1)).cloned()
            }
        };
        self.interface = next;
        let label = self.interface.as_deref().unwrap_or("all").to_string();
        self.set_status_message(format!("Interface: {}", label));
        self.sync_request();
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current chart to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let key = self.current_key()?;
        let Some(cached) = self.charts.get(&key) else {
            bail!("No data to export");
        };

        let json = serde_json::to_string_pretty(&export_value(&key, &cached.chart))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
