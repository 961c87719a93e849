//! CLI entrypoint for consensus-engine
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use consensus_application::{
    NoProgress, ProgressNotifier, RunPipelineInput, RunPipelineUseCase,
};
use consensus_domain::{ConfigIssue, PipelineStrategy, Severity};
use consensus_infrastructure::{BackendFactory, ConfigLoader, FileConfig, JsonlRunLogger};
use consensus_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use serde_json::Value;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&cli)?;

    info!("Starting consensus-engine");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        let config = load_config(&cli)?;
        println!();
        println!("{}", ConfigLoader::render(&config)?);
        return Ok(());
    }

    let config = load_config(&cli)?;
    if !config.output.color {
        ConsoleFormatter::disable_color();
    }
    check_config(&config)?;

    // === Dependency Injection ===
    let registry = BackendFactory::build_registry(&config.backends)
        .context("Failed to construct backends")?;
    info!(
        "Registered backends: {}",
        registry
            .ids()
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            ctrl_c_token.cancel();
        }
    });

    let mut use_case = RunPipelineUseCase::new(Arc::new(registry))
        .with_heuristics(config.heuristics.clone())
        .with_cancellation(token);

    if let Some(path) = &cli.run_log {
        let logger = JsonlRunLogger::new(path)
            .ok_or_else(|| anyhow!("Cannot open run log {}", path.display()))?;
        use_case = use_case.with_run_logger(Arc::new(logger));
    }

    let payload = read_payload(&cli).await?;
    let strategy = PipelineStrategy::templated(config.pipeline.structured && !cli.text);
    let input = RunPipelineInput::new(payload, config.pipeline.to_pipeline_config())
        .with_strategy(strategy);

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let report = use_case.execute_with_report(input, progress.as_ref()).await?;

    let format = cli.output_format(config.output.format);
    println!("{}", ConsoleFormatter::render(&report, format));

    Ok(())
}

/// Install the tracing subscriber; `-v` raises the level, `--log-file` redirects it
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match &cli.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();

            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();

            Ok(None)
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))
}

/// Log warnings and refuse to run on any configuration error
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in issues.iter().filter(|i| i.severity == Severity::Warning) {
        warn!("{}", issue.message);
    }

    if ConfigIssue::has_errors(&issues) {
        let errors: Vec<&str> = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .map(|i| i.message.as_str())
            .collect();
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(())
}

async fn read_payload(cli: &Cli) -> Result<Value> {
    let text = match &cli.payload {
        Some(path) if !cli.reads_stdin() => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read payload {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read payload from stdin")?;
            buf
        }
    };
    parse_payload(&text)
}

/// Parse the payload; blank input is an empty object
fn parse_payload(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(text).context("Payload is not valid JSON")
}
