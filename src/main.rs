use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use histwatch::{
    events, fetch_report, ui, write_export, App, DashboardData, DataSource, FileSource, HttpSource,
    ValueScale,
};
use histwatch_types::{parse_date, RegressionReport};

#[derive(Parser, Debug)]
#[command(name = "histwatch")]
#[command(about = "Terminal dashboard for telemetry histogram regressions")]
struct Args {
    /// Path to the regression report
    #[arg(short, long, default_value = "regressions.json", conflicts_with = "url")]
    file: PathBuf,

    /// Fetch the regression report from a URL instead of a file
    #[arg(long)]
    url: Option<String>,

    /// Open the section of this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_anchor)]
    date: Option<NaiveDate>,

    /// Show raw values instead of percentages
    #[arg(long)]
    raw: bool,

    /// Refresh interval in seconds (default: 1 for files, 60 for URLs)
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Export chart tables to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn parse_anchor(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let scale = if args.raw {
        ValueScale::Raw
    } else {
        ValueScale::Percent
    };

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
        return export_to_file(&args, export_path, scale);
    }

    if let Some(ref url) = args.url {
        return run_with_url(url, &args, scale);
    }

    let refresh = Duration::from_secs(args.refresh.unwrap_or(1));
    run_tui(Box::new(FileSource::new(&args.file)), &args, scale, refresh)
}

/// Run with a report fetched over HTTP on a background runtime
fn run_with_url(url: &str, args: &Args, scale: ValueScale) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let refetch = Duration::from_secs(args.refresh.unwrap_or(60).max(1));
    let source = HttpSource::spawn(url, refetch)?;

    run_tui(Box::new(source), args, scale, Duration::from_millis(100))
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    args: &Args,
    scale: ValueScale,
    refresh_interval: Duration,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, scale);
    if let Some(date) = args.date {
        app = app.with_anchor(date);
    }
    app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

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

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

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
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5u16.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            ui::render(frame, app, area);
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(
                    app,
                    mouse,
                    ui::SECTION_LIST_TOP,
                    ui::SECTION_LIST_WIDTH,
                ),
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Load the report once and write its chart tables
fn export_to_file(args: &Args, export_path: &Path, scale: ValueScale) -> Result<()> {
    let data = match args.url {
        Some(ref url) => {
            let rt = tokio::runtime::Runtime::new()?;
            let report: RegressionReport = rt.block_on(fetch_report(&reqwest::Client::new(), url))?;
            DashboardData::from_report(&report)
        }
        None => DashboardData::load(&args.file)?,
    };

    write_export(export_path, &data, scale)
        .with_context(|| format!("export to {} failed", export_path.display()))?;
    info!(
        path = %export_path.display(),
        dates = data.sections.len(),
        charts = data.chart_count(),
        "exported chart tables"
    );
    Ok(())
}
