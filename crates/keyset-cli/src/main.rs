#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod document;
mod page;

use std::{io, process};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Cli, Command, log_page_config};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "keyset_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "keyset_cli::config";
pub const TRACING_TARGET_INPUT: &str = "keyset_cli::input";
pub const TRACING_TARGET_PAGE: &str = "keyset_cli::page";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %error,
            "command failed"
        );
    }
    eprintln!("Error: {error:#}");

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    init_tracing();
    log_startup_info();

    match cli.command {
        Command::Page(args) => {
            log_page_config(&args);

            let stdout = io::stdout();
            let pages = page::run_page(&args, &mut stdout.lock()).await?;
            tracing::info!(target: TRACING_TARGET_PAGE, pages, "pagination finished");
        }
    }

    Ok(())
}

/// Initializes tracing with environment-based filtering.
///
/// Logs go to stderr, stdout carries only result slices.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Logs startup information.
fn log_startup_info() {
    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        features = ?enabled_features(),
        "build information"
    );
}

/// Returns a list of enabled compile-time features.
fn enabled_features() -> Vec<&'static str> {
    [cfg!(feature = "dotenv").then_some("dotenv")]
        .into_iter()
        .flatten()
        .collect()
}
