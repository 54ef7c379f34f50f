use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskboard::{
    build_router,
    client::{self, TaskApi},
    config::{Config, DEFAULT_CONFIG_FILE},
    JsonTaskStore,
};

fn cli() -> Command {
    Command::new("taskboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Task tracker: HTTP task service and terminal client")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to the JSON config file"),
        )
        .subcommand(
            Command::new("init")
                .about("Write a default config and empty task file")
                .arg(
                    Arg::new("dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Target directory (defaults to the current one)"),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the task service")
                .arg(Arg::new("host").long("host").help("Address to bind"))
                .arg(
                    Arg::new("port")
                        .long("port")
                        .value_parser(value_parser!(u16))
                        .help("Port to listen on"),
                )
                .arg(
                    Arg::new("data-file")
                        .long("data-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file holding the task collection"),
                ),
        )
        .subcommand(
            Command::new("tui").about("Open the terminal client").arg(
                Arg::new("api-url")
                    .long("api-url")
                    .help("Base URL of the task service, e.g. http://localhost:5000/api"),
            ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match matches.subcommand() {
        Some(("init", sub_matches)) => {
            let dir = sub_matches
                .get_one::<PathBuf>("dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("."));
            if Config::init(&dir)? {
                println!("Task board initialized in {}", dir.display());
            } else {
                println!("Task board already initialized in {}.", dir.display());
            }
        }
        Some(("serve", sub_matches)) => {
            let mut config = Config::load(&config_path)?;
            apply_serve_overrides(&mut config, sub_matches);
            serve(config).await?;
        }
        Some(("tui", sub_matches)) => {
            let mut config = Config::load(&config_path)?;
            if let Some(url) = sub_matches.get_one::<String>("api-url") {
                config.client.api_url = url.clone();
            }
            tui(config).await?;
        }
        _ => tui(Config::load(&config_path)?).await?,
    }
    Ok(())
}

fn apply_serve_overrides(config: &mut Config, matches: &ArgMatches) {
    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }
    if let Some(path) = matches.get_one::<PathBuf>("data-file") {
        config.server.data_file = path.clone();
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

async fn serve(config: Config) -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    let store = JsonTaskStore::open(&config.server.data_file)
        .await
        .with_context(|| {
            format!(
                "failed to open task collection {}",
                config.server.data_file.display()
            )
        })?;
    let app = build_router(Arc::new(store));

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Task service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Task service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn tui(config: Config) -> Result<()> {
    init_file_logging(&config.client.log_file)?;
    let api = TaskApi::new(config.client.api_url.clone());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = client::run_app(&mut terminal, &api, &config.client.prefs_file).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result.context("terminal client failed")
}

/// The terminal owns stdout while the client runs, so logs go to a file.
fn init_file_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
