// src/main.rs

use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use geo_audit::core::config::AuditConfig;
use geo_audit::core::models::{AuditReport, ModuleOutcome};
use geo_audit::core::scanner::AuditPipeline;
use geo_audit::logging::initialize_logging;
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

mod app;
mod ui;

use app::{App, AppState};

type AuditOutcome = Result<AuditReport, String>;

/// Generative Engine Optimization audit of a single web page.
#[derive(Debug, Parser)]
#[command(name = "geo-audit", version, about)]
struct Cli {
    /// Page to audit. Without it the interactive terminal UI starts.
    url: Option<String>,

    /// Print the full report as JSON instead of a text summary.
    #[arg(long)]
    json: bool,

    /// Path to a config.json overriding the default location.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    initialize_logging()?;
    let cli = Cli::parse();

    let config = AuditConfig::load(cli.config.as_deref())?;
    let pipeline = Arc::new(AuditPipeline::new(config)?);

    match cli.url {
        Some(url) => run_headless(&pipeline, &url, cli.json).await,
        None => run_tui(pipeline).await,
    }
}

async fn run_headless(pipeline: &AuditPipeline, url: &str, json: bool) -> Result<()> {
    let report = match pipeline.run(url).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, network = e.is_network(), "Audit failed.");
            eprintln!("geo-audit: {}", e);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text_report(&report);
    }
    Ok(())
}

fn print_text_report(report: &AuditReport) {
    println!("GEO audit: {}", report.url);
    println!("GEO score: {:.1}/100 (policy {})", report.geo_score, report.score_policy);
    if let Some(topic) = &report.topic {
        println!("Topic:     {}", topic);
    }
    println!();
    for outcome in report.modules.outcomes() {
        println!("  {:<10} {:>5.1}", outcome.module().to_string(), outcome.score_part());
    }
    println!();
    if report.recommendations.is_empty() {
        println!("No recommendations.");
    }
    for (i, rec) in report.recommendations.iter().enumerate() {
        println!("{:>2}. [{:?}] {}", i + 1, rec.severity, rec.message);
    }
    if let Some(summary) = &report.qualitative_summary {
        println!();
        println!("{}", summary);
    }
}

async fn run_tui(pipeline: Arc<AuditPipeline>) -> Result<()> {
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = App::new();
    let (tx, mut rx) = mpsc::channel::<AuditOutcome>(1);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, &tx, &pipeline)?;
        }

        if let Ok(outcome) = rx.try_recv() {
            app.finish(outcome);
        }
        app.on_tick();
    }

    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    Ok(())
}

fn handle_events(app: &mut App, tx: &mpsc::Sender<AuditOutcome>, pipeline: &Arc<AuditPipeline>) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.code == KeyCode::Tab {
            app.toggle_logs();
            return Ok(());
        }
        match app.state {
            AppState::Idle => handle_idle_input(app, key.code, tx, pipeline),
            AppState::Finished | AppState::Failed(_) => handle_finished_input(app, key.code),
            AppState::Scanning => {
                if key.code == KeyCode::Char('q') {
                    app.quit();
                }
            }
        }
    }
    Ok(())
}

fn handle_idle_input(app: &mut App, key_code: KeyCode, tx: &mpsc::Sender<AuditOutcome>, pipeline: &Arc<AuditPipeline>) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Enter => {
            if app.input.trim().is_empty() {
                return;
            }
            app.state = AppState::Scanning;
            let target = app.input.trim().to_string();
            let tx = tx.clone();
            let pipeline = Arc::clone(pipeline);
            info!(target = %target, "Audit requested from the UI.");

            tokio::spawn(async move {
                let outcome = pipeline.run(&target).await.map_err(|e| e.to_string());
                let _ = tx.send(outcome).await;
            });
        }
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('e') => app.export_report(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        KeyCode::Left => app.scroll_logs_left(),
        KeyCode::Right => app.scroll_logs_right(),
        _ => {}
    }
}
