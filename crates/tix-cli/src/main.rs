//! tix - In-memory help-desk ticket desk
//!
//! Reads one command per line from stdin. Nothing survives the process.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tix_core::{Config, IdStrategy, TicketDesk};

mod commands;
mod shell;

use commands::{Flow, Session};

#[derive(Parser)]
#[command(name = "tix")]
#[command(about = "In-memory help-desk ticket desk with single-step undo")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $TIX_CONFIG, then the user config dir)
    #[arg(long, env = "TIX_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Ticket number strategy (random, sequential)
    #[arg(long)]
    ids: Option<String>,
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(ref strategy) = cli.ids {
        config.ids.strategy = strategy.parse::<IdStrategy>()?;
    }
    if cli.no_color {
        config.display.colors = false;
    }
    Ok(config)
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    if !config.display.colors {
        colored::control::set_override(false);
    }

    tracing::debug!(strategy = %config.ids.strategy, "starting ticket desk");
    let desk = TicketDesk::from_config(&config);
    let mut session = Session::new(desk, config, cli.json);

    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = std::io::stdout().lock();

    if interactive && !cli.json {
        session.banner(&mut stdout)?;
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            write!(stdout, "tix> ")?;
            stdout.flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        if session.handle_line(&line?, &mut stdout)? == Flow::Exit {
            break;
        }
    }

    Ok(())
}
