//! parley - interactive score setup in the terminal
//!
//! Resolves configuration, then lets the engine interview the user on
//! stdin/stdout and prints the collected settings.

use anyhow::{bail, Context, Result};
use clap::Parser;
use parley_cli::{Engine, Terminal, DEFAULT_MAX_ROUNDS, TERMINAL_NAME};
use parley_common::config::{ProtocolConfig, CONFIG_ENV_VAR};
use parley_common::Locale;
use std::io;
use tracing::info;

/// Command-line arguments for parley
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Interactive score setup over the parley query protocol")]
#[command(version)]
struct Args {
    /// Config file (overrides PARLEY_CONFIG and the user config file)
    #[arg(short, long)]
    config: Option<String>,

    /// Locale for yes/no answers (en, fr, de, es)
    #[arg(short, long)]
    locale: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PARLEY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Also ask for a template file from the configured directories
    #[arg(long)]
    template: bool,

    /// Rounds before giving up on unanswered questions
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ProtocolConfig::resolve(args.config.as_deref(), CONFIG_ENV_VAR)
        .context("Failed to load configuration")?;

    let level = args.log_level.as_deref().unwrap_or(&config.log_level);
    let level: tracing::Level = level
        .parse()
        .with_context(|| format!("Unknown log level '{}'", level))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();

    info!("Starting parley v{}", env!("CARGO_PKG_VERSION"));

    if let Some(code) = args.locale.as_deref() {
        config.locale = Locale::from_code(code).with_context(|| format!("Unsupported locale '{}'", code))?;
    }
    info!(
        "Locale: {}, participants: {}",
        config.locale,
        config.participants.names().join(", ")
    );

    let stdin = io::stdin();
    let mut terminal = Terminal::new(TERMINAL_NAME, stdin.lock(), io::stdout().lock());
    let mut engine = Engine::new(&config).with_max_rounds(args.max_rounds);
    engine
        .prepare_interview(&terminal, args.template)
        .context("Failed to prepare the interview")?;

    let complete = engine.drive(&mut terminal).context("Interview aborted")?;

    let mut out = terminal.into_output();
    engine.report(&mut out)?;

    if !complete {
        bail!(
            "{} question(s) still unanswered after {} rounds",
            engine.store().pending().len(),
            args.max_rounds
        );
    }
    Ok(())
}
