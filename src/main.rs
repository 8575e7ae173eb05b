use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pikawatch::app::{self, App, View};
use pikawatch::config::{Overrides, Settings};
use pikawatch::data::ChartData;
use pikawatch::source::{self as sources, FileSource, HttpSource, MetricsSource};
use pikawatch::{events, ui};
use pikawatch_client::PikaClient;
use pikawatch_types::MetricType;

#[derive(Parser, Debug)]
#[command(name = "pikawatch")]
#[command(about = "Terminal dashboard for Pika Monitor agent and service metrics")]
struct Args {
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend API base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// API token sent as a bearer token
    #[arg(long)]
    token: Option<String>,

    /// Agent id for system metrics
    #[arg(short, long)]
    agent: Option<String>,

    /// Monitor id for response time
    #[arg(short, long)]
    monitor: Option<String>,

    /// Initial view / metric to export (cpu, memory, network, response_time, ...)
    #[arg(long, default_value = "cpu")]
    metric: MetricType,

    /// Relative range token (1m..30d)
    #[arg(long)]
    range: Option<String>,

    /// Explicit window start in epoch milliseconds
    #[arg(long, requires = "end")]
    start: Option<i64>,

    /// Explicit window end in epoch milliseconds
    #[arg(long, requires = "start")]
    end: Option<i64>,

    /// Network interface filter
    #[arg(short, long)]
    interface: Option<String>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Read a saved response from this JSON file instead of the API
    #[arg(short, long, conflicts_with_all = ["endpoint", "token"])]
    file: Option<PathBuf>,

    /// Fetch once, write the merged rows to this JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Log file (the terminal is owned by the UI)
    #[arg(long, default_value = "pikawatch.log")]
    log_file: PathBuf,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            token: self.token.clone(),
            agent: self.agent.clone(),
            monitor: self.monitor.clone(),
            range: self.range.clone(),
            start: self.start,
            end: self.end,
            interface: self.interface.clone(),
            refresh_secs: self.refresh,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let settings = Settings::load(args.config.as_deref(), args.overrides())?;
    info!(endpoint = %settings.endpoint, window = ?settings.window()?, "starting");

    // Owns the HTTP pollers while the UI runs on this thread
    let rt = tokio::runtime::Runtime::new()?;

    if let Some(ref export_path) = args.export {
        return export_to_file(&rt, &settings, &args, export_path);
    }

    let source: Box<dyn MetricsSource> = match args.file {
        Some(ref path) => Box::new(FileSource::new(path)),
        None => Box::new(HttpSource::new(
            build_client(&settings)?,
            rt.handle().clone(),
            settings.refresh(),
        )),
    };

    let result = run_tui(source, &settings, View::from(args.metric));
    rt.shutdown_timeout(Duration::from_secs(1));
    result
}

/// Send logs to a file for the TUI, or to stderr in export mode.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if args.export.is_some() {
        builder.with_writer(io::stderr).init();
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&args.log_file)
            .with_context(|| format!("cannot open log file {}", args.log_file.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }
    Ok(())
}

fn build_client(settings: &Settings) -> Result<PikaClient> {
    let mut builder = PikaClient::builder()
        .endpoint(&settings.endpoint)
        .timeout(settings.timeout());
    if let Some(ref token) = settings.token {
        builder = builder.token(token);
    }
    Ok(builder.build()?)
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn MetricsSource>, settings: &Settings, view: View) -> Result<()> {
    let mut app = App::new(
        source,
        settings.agent.clone(),
        settings.monitor.clone(),
        settings.window()?,
        settings.axis_config()?,
    )
    .with_theme(ui::Theme::auto_detect());
    app.interface = settings.interface.clone();
    app.set_view(view);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Sources do their own pacing; this only bounds how stale the screen gets
    let poll_interval = Duration::from_millis(250);
    let mut last_poll = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 14;

    let _ = app.reload_data();

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(10),   // Chart + legend
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);
            ui::chart::render(frame, app, chunks[2]);
            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        if last_poll.elapsed() >= poll_interval {
            let _ = app.reload_data();
            last_poll = Instant::now();
        }
    }

    Ok(())
}

/// Fetch the chart for `--metric` once and write it as JSON.
fn export_to_file(
    rt: &tokio::runtime::Runtime,
    settings: &Settings,
    args: &Args,
    export_path: &Path,
) -> Result<()> {
    let view = View::from(args.metric);
    let key = app::query_key(
        view,
        settings.agent.as_deref(),
        settings.monitor.as_deref(),
        settings.window()?,
        settings.interface.as_deref(),
    )?;
    info!(key = %key, "exporting");

    let payload = match args.file {
        Some(ref path) => {
            let mut source = FileSource::new(path);
            source.request(key.clone());
            match source.poll() {
                Some(update) => update.payload,
                None => {
                    let reason = source.error().unwrap_or("no data").to_string();
                    return Err(anyhow!("failed to read {}: {}", path.display(), reason));
                }
            }
        }
        None => {
            let client = build_client(settings)?;
            rt.block_on(sources::fetch(&client, &key))?
        }
    };

    let chart = ChartData::from_payload(&payload, key.metric_type(), key.window());
    let json = serde_json::to_string_pretty(&app::export_value(&key, &chart))?;
    std::fs::write(export_path, json)
        .with_context(|| format!("cannot write {}", export_path.display()))?;

    println!(
        "Exported {} rows of {} to: {}",
        chart.rows.len(),
        view.label(),
        export_path.display()
    );
    Ok(())
}
