use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{App, Commands};

mod cli;
mod config;
mod scan;
mod ui;

#[tokio::main]
async fn main() -> ExitCode {
    let app = App::parse();
    init_tracing(app.log_level());

    match run(&app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(app: &App) -> anyhow::Result<()> {
    let config = config::load(app.config.as_deref())?;
    match &app.cmd {
        Commands::Scan(args) => scan::scan(args, args.apply(config), app.quiet).await,
    }
}

fn init_tracing(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
