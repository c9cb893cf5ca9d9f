//! CTRL-B - LLM text tasks on a selection
//!
//! Command-line harness: runs one menu action against the configured Ollama
//! endpoint with the given text standing in for the page selection.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ctrlb::bridge::{LocalTabs, Overlay, OverlayPhase, Page};
use ctrlb::config::Config;
use ctrlb::engine::OllamaEngine;
use ctrlb::{CtrlError, CtrlResult, Extension};
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one menu action on the given text
    Run {
        /// Menu item id, e.g. ctrl-b-summarize or "ctrl-b-tone-Casual"
        #[arg(short, long, default_value = "ctrl-b-summarize")]
        action: String,

        /// Text standing in for the page selection
        #[arg(short, long, default_value = "")]
        text: String,

        /// Wait for the full response instead of streaming
        #[arg(long)]
        batch: bool,
    },

    /// Print the context menu tree
    Menu,

    /// Check that the Ollama endpoint is reachable
    Health,
}

/// Terminal stand-in for the page: prints overlay updates as they arrive
struct TerminalPage {
    selection: String,
    printed: String,
}

impl Page for TerminalPage {
    fn selected_text(&self) -> String {
        self.selection.clone()
    }

    fn render(&mut self, overlay: &Overlay) {
        if overlay.phase == OverlayPhase::Idle {
            return;
        }
        let mut out = std::io::stdout();
        match overlay.text.strip_prefix(self.printed.as_str()) {
            Some(rest) => {
                let _ = write!(out, "{rest}");
            }
            None => {
                let _ = write!(out, "\n{}", overlay.text);
            }
        }
        let _ = out.flush();
        self.printed = overlay.text.clone();
    }

    fn write_clipboard(&mut self, _text: &str) -> CtrlResult<()> {
        Err(CtrlError::Other(anyhow::anyhow!(
            "no clipboard in terminal mode"
        )))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging before the config is read so load warnings are shown.
    // `--verbose` and RUST_LOG pin the filter; otherwise the configured level
    // replaces the initial one once the config is loaded.
    let (initial, pinned) = if args.verbose {
        (EnvFilter::new("debug"), true)
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => (filter, true),
            Err(_) => (EnvFilter::new("info"), false),
        }
    };
    let (filter, filter_handle) = reload::Layer::new(initial);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    let mut config = Config::load()?;
    if !pinned {
        filter_handle.reload(EnvFilter::new(config.log_level.to_lowercase()))?;
    }

    info!("⌨️ CTRL-B v{} starting...", env!("CARGO_PKG_VERSION"));

    let engine = Arc::new(OllamaEngine::new(&config));

    match args.command {
        Command::Run {
            action,
            text,
            batch,
        } => {
            if batch {
                config.streaming = false;
            }
            let tabs = Arc::new(LocalTabs::new());
            let tab = tabs.open_tab(Box::new(TerminalPage {
                selection: text,
                printed: String::new(),
            }))?;

            let extension = Extension::new(config, engine, tabs)?;
            extension.handle_menu_click(&action).await;
            println!();

            let overlay = tab.overlay()?;
            if overlay.phase == OverlayPhase::Idle {
                anyhow::bail!("unknown action '{}', see `ctrlb menu`", action);
            }
        }
        Command::Menu => {
            let tabs = Arc::new(LocalTabs::new());
            let extension = Extension::new(config, engine, tabs)?;
            for item in extension.menu() {
                let depth = depth_of(extension.menu(), item.parent);
                println!("{}{}  [{}]", "  ".repeat(depth), item.label, item.id);
            }
        }
        Command::Health => {
            if engine.health_check(&config.ollama_url).await {
                println!("✅ Ollama reachable at {}", config.ollama_url);
            } else {
                anyhow::bail!("Ollama not reachable at {}", config.ollama_url);
            }
        }
    }

    Ok(())
}

fn depth_of(menu: &[ctrlb::registry::MenuItem], mut parent: Option<ctrlb::registry::ActionId>) -> usize {
    let mut depth = 0;
    while let Some(id) = parent {
        depth += 1;
        parent = menu.iter().find(|item| item.id == id).and_then(|item| item.parent);
    }
    depth
}
