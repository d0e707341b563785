use std::io::{stdout, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

mod chart;
mod format;
mod layout;
mod logs;
mod models;
mod pricing;
mod scale;
mod series;
mod stats;

use chart::StackedBarChart;
use models::ChartKind;

#[derive(Parser)]
#[command(name = "tokbar")]
#[command(about = "Stacked-bar terminal charts for Claude Code token usage", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of days to look back
    #[arg(long, default_value_t = 7)]
    days: i64,

    /// Chart body height in rows
    #[arg(long, default_value_t = 29)]
    height: usize,

    /// Which chart(s) to draw
    #[arg(long, value_enum, default_value_t = ChartSelection::Split)]
    chart: ChartSelection,

    /// Monitor mode: refresh every INTERVAL seconds
    #[arg(long, value_name = "INTERVAL", num_args = 0..=1, default_missing_value = "3600")]
    monitor: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChartSelection {
    /// I/O chart stacked above the cache chart, sharing one X-axis
    Split,
    /// All four token categories in one chart
    All,
    /// Input and output tokens only
    Io,
    /// Cache creation and cache read tokens only
    Cache,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let projects_dir = logs::claude_dir().join("projects");
    if !projects_dir.exists() {
        bail!("Projects directory not found at {}", projects_dir.display());
    }

    match cli.monitor {
        Some(interval) => monitor_loop(&cli, interval),
        None => {
            print_stats(&cli, false)?;
            Ok(())
        }
    }
}

/// Run the whole pipeline once: read, filter, aggregate, table, chart(s).
///
/// Returns `Ok(false)` when there was nothing to show; in monitor mode the
/// loop keeps running so data appearing later still gets picked up.
fn print_stats(cli: &Cli, in_monitor: bool) -> Result<bool> {
    println!("Calculating Claude Code usage...");
    println!("Showing data from last {} days", cli.days);
    if in_monitor {
        println!("Last updated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    }
    println!();

    let projects_dir = logs::claude_dir().join("projects");
    let events = logs::read_usage_events(&projects_dir)?;
    if events.is_empty() {
        println!("{}", "No usage data found.".yellow());
        return Ok(false);
    }

    let events = logs::filter_recent(events, cli.days);
    if events.is_empty() {
        println!(
            "{}",
            format!("No usage data found in the last {} days.", cli.days).yellow()
        );
        return Ok(false);
    }
    debug!("{} events after windowing", events.len());

    let breakdown = stats::model_breakdown(&events);
    println!("{}", stats::render_model_breakdown(&breakdown, cli.days));

    // The timezone is resolved here, once, and threaded down explicitly.
    let series = stats::token_breakdown_series(&events, &Local);

    match cli.chart {
        ChartSelection::Split => {
            print_chart(cli, &series, ChartKind::Io, false);
            print_chart(cli, &series, ChartKind::Cache, true);
        }
        ChartSelection::All => print_chart(cli, &series, ChartKind::All, true),
        ChartSelection::Io => print_chart(cli, &series, ChartKind::Io, true),
        ChartSelection::Cache => print_chart(cli, &series, ChartKind::Cache, true),
    }

    println!();
    Ok(true)
}

fn print_chart(
    cli: &Cli,
    series: &std::collections::HashMap<chrono::NaiveDateTime, models::TokenBreakdown>,
    kind: ChartKind,
    show_x_axis: bool,
) {
    let chart = StackedBarChart::new(series, kind)
        .with_days_back(cli.days)
        .with_height(cli.height)
        .with_x_axis(show_x_axis);
    match chart.render() {
        Ok(rendered) => print!("{}", rendered),
        Err(err) => println!("{}", err.to_string().yellow()),
    }
}

/// Interactive monitor mode: auto-refresh on a timer, plus `/refresh` and
/// `/exit` line commands.
fn monitor_loop(cli: &Cli, interval_secs: u64) -> Result<()> {
    let interval = Duration::from_secs(interval_secs.max(1));
    let commands = spawn_stdin_reader();

    println!("\n{}", "=".repeat(80));
    println!("Interactive Monitor Mode");
    println!("{}", "=".repeat(80));
    println!("Commands:");
    println!("  /refresh - Refresh statistics immediately");
    println!("  /exit    - Exit monitor mode");
    println!("  Ctrl+C   - Exit monitor mode");
    println!("\nAuto-refresh interval: {} seconds", interval.as_secs());
    println!("{}\n", "=".repeat(80));

    refresh(cli)?;
    let mut next_refresh = Instant::now() + interval;
    show_prompt();

    loop {
        let timeout = next_refresh.saturating_duration_since(Instant::now());
        match commands.recv_timeout(timeout) {
            Ok(command) => match command.as_str() {
                "/refresh" => {
                    refresh(cli)?;
                    next_refresh = Instant::now() + interval;
                    show_prompt();
                }
                "/exit" => {
                    println!("\nExiting monitor mode...");
                    break;
                }
                "" => show_prompt(),
                other => {
                    println!("Unknown command: '{}'. Available: /refresh, /exit", other);
                    show_prompt();
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                refresh(cli)?;
                next_refresh = Instant::now() + interval;
                show_prompt();
            }
            // Stdin closed; nothing more can arrive.
            Err(RecvTimeoutError::Disconnected) => {
                println!("\nMonitoring stopped.");
                break;
            }
        }
    }

    Ok(())
}

/// Clear the screen and rebuild everything from scratch. No chart state
/// survives between cycles.
fn refresh(cli: &Cli) -> Result<()> {
    crossterm::execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    print_stats(cli, true)?;
    Ok(())
}

fn show_prompt() {
    println!("\n{}", "-".repeat(80));
    print!("> ");
    let _ = stdout().flush();
}

/// Forward stdin lines (trimmed) over a channel so the monitor loop can wait
/// on either input or the refresh deadline.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(line.trim().to_string()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}
