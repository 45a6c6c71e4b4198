//! pncview CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::Event;
use pncview::ui::{DashboardView, TUI};
use pncview::{App, Config, FileTaskSource, HttpTaskSource, LayoutDirection};
use std::fs::OpenOptions;
use std::path::PathBuf;

/// Terminal dashboard for PNC task dependency graphs
#[derive(Debug, Parser)]
#[command(name = "pncview", version, about)]
struct Cli {
    /// Config file (default: ~/.config/pncview/config.yml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the task endpoint; `{url}/rest/tasks` is fetched
    #[arg(long, env = "PNCVIEW_TASKS_URL")]
    tasks_url: Option<String>,

    /// Base URL of the PNC web UI for build detail links
    #[arg(long, env = "PNCVIEW_PNC_URL")]
    pnc_url: Option<String>,

    /// Read the task list from a JSON file instead of the endpoint
    #[arg(long)]
    file: Option<PathBuf>,

    /// Layout direction once loaded (TB or LR)
    #[arg(long, default_value = "TB")]
    direction: LayoutDirection,

    /// Load once, print the graph as JSON and exit
    #[arg(long)]
    dump: bool,

    /// Log destination (interactive default: pncview.log in the temp dir)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    // The dashboard owns the terminal, so interactive runs always log to a file
    let log_path = match (&cli.log_file, cli.dump) {
        (Some(path), _) => Some(path.clone()),
        (None, false) => Some(std::env::temp_dir().join("pncview.log")),
        (None, true) => None,
    };

    if let Some(path) = log_path {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    log::info!("pncview v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(cli.config.as_deref())?
        .with_overrides(cli.tasks_url.clone(), cli.pnc_url.clone());

    let mut app = App::new(config.clone()).with_direction(cli.direction);

    if cli.dump {
        match &cli.file {
            Some(path) => app.load_graph(&FileTaskSource::new(path)).await,
            None => app.load_graph(&HttpTaskSource::new(&config)?).await,
        }
        println!("{}", serde_json::to_string_pretty(&app.snapshot())?);
        return Ok(());
    }

    match &cli.file {
        Some(path) => app.spawn_load(FileTaskSource::new(path)),
        None => app.spawn_load(HttpTaskSource::new(&config)?),
    }

    run_dashboard(&mut app)
}

/// Draw / input loop until the user quits
fn run_dashboard(app: &mut App) -> Result<()> {
    let mut tui = TUI::new()?;

    while !app.should_quit {
        app.process_events();

        tui.terminal().draw(|f| DashboardView::render(f, app))?;

        if App::should_poll_input()? {
            if let Event::Key(key) = App::read_event()? {
                app.handle_key(key);
            }
        }
    }

    log::info!("Exiting");
    Ok(())
}
