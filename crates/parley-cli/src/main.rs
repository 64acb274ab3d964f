//! parley - conversational content generator

mod commands;
mod config;
mod interactive;
mod render;
mod utils;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use parley_ai::{BoxedBackend, Platform, Tone, providers::EchoBackend, providers::HttpBackend};
use parley_exchange::{Exchange, ExchangeController, ExchangeHandle, ExchangeState, Snapshot};

use commands::Defaults;

/// parley - conversational content generator
#[derive(Parser, Debug, Default)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generation backend (echo, http)
    #[arg(short, long)]
    backend: Option<String>,

    /// Endpoint for the http backend
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Simulated latency of the echo backend in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Request timeout for the http backend in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Default tone for briefs and tone refinements
    #[arg(short, long)]
    tone: Option<String>,

    /// Default platform for briefs
    #[arg(short, long)]
    platform: Option<String>,

    /// Run in non-interactive mode with a single prompt
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

/// Effective settings after merging CLI args over the config file
#[derive(Debug, Clone)]
struct Settings {
    backend: String,
    endpoint: Option<String>,
    echo_delay: Duration,
    request_timeout: Duration,
    defaults: Defaults,
}

impl Settings {
    fn resolve(args: &Args, cfg: &config::Config) -> anyhow::Result<Self> {
        let backend = args
            .backend
            .clone()
            .or(cfg.backend.clone())
            .unwrap_or_else(|| "echo".to_string())
            .to_lowercase();

        let echo_delay = args
            .delay_ms
            .or(cfg.echo_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(EchoBackend::DEFAULT_DELAY);

        let request_timeout =
            Duration::from_secs(args.timeout_secs.or(cfg.request_timeout_secs).unwrap_or(60));

        let tone = match args.tone.as_ref().or(cfg.tone.as_ref()) {
            Some(tone) => tone.parse::<Tone>().context("invalid default tone")?,
            None => Tone::default(),
        };

        let platform = match args.platform.as_ref().or(cfg.platform.as_ref()) {
            Some(platform) => platform
                .parse::<Platform>()
                .context("invalid default platform")?,
            None => Platform::default(),
        };

        Ok(Self {
            backend,
            endpoint: args.endpoint.clone().or(cfg.endpoint.clone()),
            echo_delay,
            request_timeout,
            defaults: Defaults { tone, platform },
        })
    }

    fn build_backend(&self) -> anyhow::Result<BoxedBackend> {
        match self.backend.as_str() {
            "echo" => Ok(Arc::new(EchoBackend::new(self.echo_delay))),
            "http" => {
                let endpoint = self
                    .endpoint
                    .as_deref()
                    .context("the http backend needs an endpoint (--endpoint or config)")?;
                let backend = HttpBackend::with_timeout(endpoint, self.request_timeout)?;
                Ok(Arc::new(backend))
            }
            other => anyhow::bail!("Unknown backend: '{}' (expected echo or http)", other),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("parley=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();
    let settings = Settings::resolve(&args, &cfg)?;
    let backend = settings.build_backend()?;
    let backend_name = backend.name().to_string();

    let handle = Exchange::spawn(ExchangeController::new(), backend);
    tracing::debug!("exchange {} started", handle.id());

    // Non-interactive mode
    if let Some(command) = args.command {
        let result = run_command(&handle, &command).await;
        handle.shutdown();
        return result;
    }

    interactive::run(handle, settings.defaults, &backend_name).await
}

/// Submit one prompt and wait for it to settle
async fn exchange_once(handle: &ExchangeHandle, prompt: &str) -> anyhow::Result<Snapshot> {
    handle.submit(prompt).await?;
    Ok(handle.wait_for_idle().await?)
}

async fn run_command(handle: &ExchangeHandle, command: &str) -> anyhow::Result<()> {
    println!("parley> {}", command);
    println!();

    let snapshot = exchange_once(handle, command).await?;
    if let Some(turn) = snapshot.turns.last() {
        println!("{}", render::format_turn(turn));
    }

    if let ExchangeState::Errored { .. } = snapshot.state {
        std::process::exit(1);
    }
    Ok(())
}
