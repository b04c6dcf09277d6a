//! Main application entry point

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use deck_core::{Deck, DeckConfig, Dependency, HostCapabilities, LocationBar, Presentation};

mod console;
mod input;
mod session;

use console::ConsoleRenderer;
use input::{Command, Menu};
use session::Session;

#[derive(Parser, Debug)]
#[command(name = "deckview", about = "Drive a slide deck from the console")]
struct Cli {
    /// Deck description (JSON)
    deck: PathBuf,

    /// Presentation configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial location fragment, e.g. '#/2' or '#/intro'
    #[arg(long, default_value = "")]
    hash: String,

    /// Prefix written by keyboard, swipe and menu navigation
    #[arg(long, default_value = "")]
    prefix: String,

    /// Host has no 3D transforms
    #[arg(long)]
    no_3d: bool,

    /// Host has no transforms at all; only static content is shown
    #[arg(long)]
    static_only: bool,

    /// Host feature flags checked by dependency conditions
    #[arg(long = "feature")]
    features: Vec<String>,
}

impl Cli {
    fn capabilities(&self) -> HostCapabilities {
        let mut capabilities = if self.static_only {
            HostCapabilities::static_only()
        } else {
            HostCapabilities::default()
        };
        if self.no_3d {
            capabilities.transforms_3d = false;
        }
        capabilities.features = self.features.clone();
        capabilities
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let deck = Deck::load(&cli.deck)
        .with_context(|| format!("failed to load deck {}", cli.deck.display()))?;
    let config = match &cli.config {
        Some(path) => DeckConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DeckConfig::default(),
    };

    info!("Starting deckview with {} slides", deck.len());

    let sections = deck.len();
    let mut presentation = Presentation::build(deck, config, cli.capabilities())?;

    let renderer = Arc::new(ConsoleRenderer::new());
    presentation.navigator().add_subscriber(renderer.clone());

    let location = LocationBar::new(cli.hash.as_str());
    let menu = Menu::new(cli.prefix.as_str(), sections).with_fragment(&location.fragment());

    let mut loader = |dependency: &Dependency| {
        info!("loading dependency {}", dependency.src);
    };
    presentation.start(&location, &mut loader);
    if presentation.is_disabled() {
        warn!("presentation disabled, navigation commands are ignored");
    }

    let mut session = Session::new(presentation, location, menu);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match Command::parse(&line) {
            Ok(Some(command)) => {
                if !session.handle(command) {
                    break;
                }
            }
            Ok(None) => {}
            Err(error) => eprintln!("error: {error:#}"),
        }
        stdout.flush()?;
    }

    debug!(
        "exit at slide {} ({}, menu {}), displayed {:?}",
        session.presentation().navigator().index(),
        session.location().hash(),
        session.menu().selected(),
        renderer.displayed()
    );
    Ok(())
}
