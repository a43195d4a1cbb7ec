//! # TextEdit
//!
//! A tabbed text editor with a file tree sidebar.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the editor
//! cargo run
//!
//! # Run with a file
//! cargo run -- notes.txt
//!
//! # Browse another folder
//! cargo run -- --folder path/to/project
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use textedit_core::Config;
use textedit_ui::{Flags, Theme, run};

/// TextEdit - a simple tabbed text editor
#[derive(Parser, Debug)]
#[command(name = "textedit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Folder shown in the file tree (defaults to the working directory)
    #[arg(short, long, value_name = "DIR")]
    folder: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Open every tab read-only
    #[arg(short, long)]
    readonly: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Config from `--config` or the defaults, with flags applied on top.
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };
        if self.readonly {
            config.editor.read_only = true;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting TextEdit v{}", env!("CARGO_PKG_VERSION"));

    let config = args.load_config()?;
    let theme = match &config.ui.theme {
        Some(path) => Theme::load(path)
            .with_context(|| format!("Failed to load theme from {}", path.display()))?,
        None => Theme::default(),
    };

    let flags = Flags {
        file: args.file,
        folder: args.folder,
        config,
        theme,
    };

    run(flags).map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
